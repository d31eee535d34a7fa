use std::sync::Arc;

use anyhow::Result;
use common::{
    cache::RedisPool,
    database::{health_check, init_pool},
};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use shop::{
    auth::{Argon2Hasher, TokenService},
    clock::{Clock, SystemClock},
    config::AppConfig,
    payment::HttpPaymentGateway,
    repositories::{PgCartStore, PgCategoryStore, PgOrderStore, PgProductStore, PgUserStore},
    routes,
    state::{AppState, Collaborators},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting shop service");

    let config = AppConfig::from_env()?;

    // Initialize database connection pool
    let pool = init_pool(&config.database).await?;
    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    // The catalog falls back to the database when Redis is down
    let redis = RedisPool::new(&config.redis).await?;
    match redis.health_check().await {
        Ok(true) => info!("Redis connection successful"),
        Ok(false) | Err(_) => warn!("Redis is not reachable; product listing will not be cached"),
    }

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let tokens = Arc::new(TokenService::new(&config.token, clock.clone())?);
    let gateway = HttpPaymentGateway::new(config.payment.clone())?;

    let app_state = AppState::new(Collaborators {
        users: Arc::new(PgUserStore::new(pool.clone())),
        products: Arc::new(PgProductStore::new(pool.clone())),
        carts: Arc::new(PgCartStore::new(pool.clone())),
        categories: Arc::new(PgCategoryStore::new(pool.clone())),
        orders: Arc::new(PgOrderStore::new(pool)),
        cache: Arc::new(redis),
        gateway: Arc::new(gateway),
        tokens,
        hasher: Argon2Hasher::default(),
        clock,
    });

    // Start the web server
    let app = routes::create_router(app_state);

    let bind_addr = config.server.bind_addr();
    let listener = TcpListener::bind(&bind_addr).await?;
    info!(addr = %bind_addr, "Shop service listening");

    axum::serve(listener, app).await?;

    Ok(())
}
