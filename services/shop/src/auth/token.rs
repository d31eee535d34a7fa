//! Session token issuing and validation
//!
//! Tokens are HS256-signed JWTs carrying the user id and email. Expiry is
//! checked against the injected [`Clock`] rather than by `jsonwebtoken`, so the
//! boundary convention is explicit and testable.

use std::sync::Arc;

use anyhow::Context;
use chrono::Duration;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::clock::Clock;

/// Default lifetime of an issued token in hours
const DEFAULT_EXPIRATION_HOURS: i64 = 10_000;

/// Token failures
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("invalid token")]
    InvalidToken,

    #[error("expired token")]
    ExpiredToken,

    #[error("invalid token configuration: {0}")]
    Configuration(&'static str),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Whether a token is still accepted at exactly its `exp` second
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpiryBoundary {
    /// Valid while `now <= exp`
    #[default]
    Inclusive,
    /// Valid while `now < exp`
    Exclusive,
}

impl ExpiryBoundary {
    fn is_expired(self, now: i64, exp: i64) -> bool {
        match self {
            ExpiryBoundary::Inclusive => now > exp,
            ExpiryBoundary::Exclusive => now >= exp,
        }
    }
}

/// Token configuration
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// HMAC secret
    pub secret: String,
    /// How long an issued token stays valid
    pub lifetime: Duration,
    pub boundary: ExpiryBoundary,
}

impl TokenConfig {
    /// Create a new TokenConfig from environment variables
    ///
    /// # Environment Variables
    /// - `TOKEN_SECRET_KEY`: HMAC secret (required)
    /// - `TOKEN_EXPIRATION_HOURS`: token lifetime in hours (default: 10000)
    /// - `TOKEN_EXPIRY_BOUNDARY`: `inclusive` or `exclusive` (default: inclusive)
    pub fn from_env() -> anyhow::Result<Self> {
        let secret = std::env::var("TOKEN_SECRET_KEY")
            .map_err(|_| anyhow::anyhow!("TOKEN_SECRET_KEY environment variable not set"))?;

        let hours = match std::env::var("TOKEN_EXPIRATION_HOURS") {
            Ok(raw) => raw.trim().parse::<i64>().with_context(|| {
                format!("TOKEN_EXPIRATION_HOURS must be a whole number of hours, got {raw:?}")
            })?,
            Err(_) => DEFAULT_EXPIRATION_HOURS,
        };
        let lifetime = Duration::try_hours(hours)
            .with_context(|| format!("TOKEN_EXPIRATION_HOURS is out of range: {hours}"))?;

        let boundary = match std::env::var("TOKEN_EXPIRY_BOUNDARY") {
            Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "inclusive" => ExpiryBoundary::Inclusive,
                "exclusive" => ExpiryBoundary::Exclusive,
                _ => anyhow::bail!(
                    "TOKEN_EXPIRY_BOUNDARY must be `inclusive` or `exclusive`, got {raw:?}"
                ),
            },
            Err(_) => ExpiryBoundary::default(),
        };

        Ok(TokenConfig {
            secret,
            lifetime,
            boundary,
        })
    }
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub email: String,
    /// Issued at, seconds since epoch
    pub iat: i64,
    /// Expiration, seconds since epoch
    pub exp: i64,
}

/// Identity carried by a valid token
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenData {
    pub user_id: i64,
    pub email: String,
}

/// Issues and validates session tokens
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: Duration,
    boundary: ExpiryBoundary,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    pub fn new(config: &TokenConfig, clock: Arc<dyn Clock>) -> Result<Self, TokenError> {
        if config.secret.is_empty() {
            return Err(TokenError::Configuration("secret must not be empty"));
        }
        if config.lifetime <= Duration::zero() {
            return Err(TokenError::Configuration("lifetime must be positive"));
        }
        if clock.now().checked_add_signed(config.lifetime).is_none() {
            return Err(TokenError::Configuration(
                "lifetime puts expiry past the representable date range",
            ));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        // exp is still required, but compared against our clock below
        validation.validate_exp = false;

        Ok(TokenService {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            lifetime: config.lifetime,
            boundary: config.boundary,
            clock,
        })
    }

    /// Issue a token for the given subject
    pub fn issue(&self, user_id: i64, email: &str) -> Result<String, TokenError> {
        let now = self.clock.now();
        let expires_at = now
            .checked_add_signed(self.lifetime)
            .context("token expiry is past the representable date range")?;
        let claims = Claims {
            user_id,
            email: email.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .context("failed to sign session token")?;

        Ok(token)
    }

    /// Validate a token and return the identity it carries
    pub fn validate(&self, token: &str) -> Result<TokenData, TokenError> {
        if token.is_empty() {
            return Err(TokenError::InvalidToken);
        }

        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            debug!(error = %e, "rejected session token");
            TokenError::InvalidToken
        })?;

        let claims = data.claims;
        if self
            .boundary
            .is_expired(self.clock.now().timestamp(), claims.exp)
        {
            return Err(TokenError::ExpiredToken);
        }

        Ok(TokenData {
            user_id: claims.user_id,
            email: claims.email,
        })
    }

    /// Validate `token` and issue a new one for the same subject
    pub fn refresh(&self, token: &str) -> Result<String, TokenError> {
        let data = self.validate(token)?;
        self.issue(data.user_id, &data.email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::{DateTime, TimeZone, Utc};
    use serial_test::serial;

    fn config(boundary: ExpiryBoundary) -> TokenConfig {
        TokenConfig {
            secret: "test-secret".to_string(),
            lifetime: Duration::hours(1),
            boundary,
        }
    }

    fn service(boundary: ExpiryBoundary) -> (TokenService, Arc<ManualClock>) {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let clock = Arc::new(ManualClock::new(start));
        let service = TokenService::new(&config(boundary), clock.clone()).unwrap();
        (service, clock)
    }

    fn exp_of(token: &str) -> i64 {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(b"test-secret"),
            &validation,
        )
        .unwrap()
        .claims
        .exp
    }

    #[test]
    fn issued_token_validates_to_same_subject() {
        let (tokens, _) = service(ExpiryBoundary::Inclusive);

        let token = tokens.issue(42, "a@b.com").unwrap();
        let data = tokens.validate(&token).unwrap();

        assert_eq!(
            data,
            TokenData {
                user_id: 42,
                email: "a@b.com".to_string()
            }
        );
    }

    #[test]
    fn token_past_lifetime_is_expired() {
        let (tokens, clock) = service(ExpiryBoundary::Inclusive);
        let token = tokens.issue(42, "a@b.com").unwrap();

        clock.advance(Duration::hours(1) + Duration::seconds(1));

        assert!(matches!(
            tokens.validate(&token),
            Err(TokenError::ExpiredToken)
        ));
    }

    #[test]
    fn inclusive_boundary_accepts_exact_expiry() {
        let (tokens, clock) = service(ExpiryBoundary::Inclusive);
        let token = tokens.issue(1, "x@y.io").unwrap();

        clock.advance(Duration::hours(1));
        assert!(tokens.validate(&token).is_ok());
    }

    #[test]
    fn exclusive_boundary_rejects_exact_expiry() {
        let (tokens, clock) = service(ExpiryBoundary::Exclusive);
        let token = tokens.issue(1, "x@y.io").unwrap();

        clock.advance(Duration::hours(1));
        assert!(matches!(
            tokens.validate(&token),
            Err(TokenError::ExpiredToken)
        ));
    }

    #[test]
    fn refresh_keeps_subject_and_extends_expiry() {
        let (tokens, clock) = service(ExpiryBoundary::Inclusive);
        let original = tokens.issue(42, "a@b.com").unwrap();

        clock.advance(Duration::minutes(10));
        let refreshed = tokens.refresh(&original).unwrap();

        let data = tokens.validate(&refreshed).unwrap();
        assert_eq!(data.user_id, 42);
        assert_eq!(data.email, "a@b.com");
        assert!(exp_of(&refreshed) > exp_of(&original));
    }

    #[test]
    fn refresh_of_expired_token_fails() {
        let (tokens, clock) = service(ExpiryBoundary::Inclusive);
        let token = tokens.issue(42, "a@b.com").unwrap();

        clock.advance(Duration::hours(2));
        assert!(matches!(
            tokens.refresh(&token),
            Err(TokenError::ExpiredToken)
        ));
    }

    #[test]
    fn garbage_and_foreign_tokens_are_invalid() {
        let (tokens, clock) = service(ExpiryBoundary::Inclusive);

        assert!(matches!(tokens.validate(""), Err(TokenError::InvalidToken)));
        assert!(matches!(
            tokens.validate("not.a.jwt"),
            Err(TokenError::InvalidToken)
        ));

        let other = TokenService::new(
            &TokenConfig {
                secret: "another-secret".to_string(),
                ..config(ExpiryBoundary::Inclusive)
            },
            clock,
        )
        .unwrap();
        let foreign = other.issue(42, "a@b.com").unwrap();
        assert!(matches!(
            tokens.validate(&foreign),
            Err(TokenError::InvalidToken)
        ));
    }

    #[test]
    fn construction_requires_secret_and_lifetime() {
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(Utc::now()));

        let empty_secret = TokenConfig {
            secret: String::new(),
            ..config(ExpiryBoundary::Inclusive)
        };
        assert!(matches!(
            TokenService::new(&empty_secret, clock.clone()),
            Err(TokenError::Configuration(_))
        ));

        let zero_lifetime = TokenConfig {
            lifetime: Duration::zero(),
            ..config(ExpiryBoundary::Inclusive)
        };
        assert!(matches!(
            TokenService::new(&zero_lifetime, clock),
            Err(TokenError::Configuration(_))
        ));
    }

    #[test]
    fn construction_rejects_lifetime_past_date_range() {
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(Utc::now()));

        let endless = TokenConfig {
            lifetime: Duration::days(100_000_000),
            ..config(ExpiryBoundary::Inclusive)
        };
        assert!(matches!(
            TokenService::new(&endless, clock),
            Err(TokenError::Configuration(_))
        ));
    }

    #[test]
    fn issue_near_end_of_time_is_an_error() {
        let (tokens, clock) = service(ExpiryBoundary::Inclusive);
        clock.set(DateTime::<Utc>::MAX_UTC - Duration::minutes(30));

        assert!(matches!(
            tokens.issue(1, "a@b.com"),
            Err(TokenError::Internal(_))
        ));
    }

    #[test]
    #[serial]
    fn config_from_env_reads_overrides() {
        unsafe {
            std::env::set_var("TOKEN_SECRET_KEY", "from-env");
            std::env::set_var("TOKEN_EXPIRATION_HOURS", "2");
            std::env::set_var("TOKEN_EXPIRY_BOUNDARY", "Exclusive");
        }

        let config = TokenConfig::from_env().unwrap();
        assert_eq!(config.secret, "from-env");
        assert_eq!(config.lifetime, Duration::hours(2));
        assert_eq!(config.boundary, ExpiryBoundary::Exclusive);

        unsafe {
            std::env::remove_var("TOKEN_SECRET_KEY");
            std::env::remove_var("TOKEN_EXPIRATION_HOURS");
            std::env::remove_var("TOKEN_EXPIRY_BOUNDARY");
        }
        assert!(TokenConfig::from_env().is_err());
    }

    #[test]
    #[serial]
    fn config_from_env_rejects_unreadable_values() {
        unsafe {
            std::env::set_var("TOKEN_SECRET_KEY", "from-env");
            std::env::set_var("TOKEN_EXPIRATION_HOURS", "ten");
        }
        assert!(TokenConfig::from_env().is_err());

        unsafe {
            std::env::set_var("TOKEN_EXPIRATION_HOURS", i64::MAX.to_string());
        }
        assert!(TokenConfig::from_env().is_err());

        unsafe {
            std::env::remove_var("TOKEN_EXPIRATION_HOURS");
            std::env::set_var("TOKEN_EXPIRY_BOUNDARY", "exclusiv");
        }
        assert!(TokenConfig::from_env().is_err());

        unsafe {
            std::env::remove_var("TOKEN_EXPIRY_BOUNDARY");
        }
        let config = TokenConfig::from_env().unwrap();
        assert_eq!(config.lifetime, Duration::hours(DEFAULT_EXPIRATION_HOURS));
        assert_eq!(config.boundary, ExpiryBoundary::Inclusive);

        unsafe {
            std::env::remove_var("TOKEN_SECRET_KEY");
        }
    }
}
