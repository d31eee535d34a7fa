//! Products, the cached catalog listing, and carts

use std::sync::Arc;
use std::time::Duration;

use common::{cache::KeyValueCache, error::DatabaseError};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    clock::Clock,
    models::{CartEntry, NewCartEntry, Product, ProductFilter},
    repositories::{CartStore, ProductStore},
};

/// Cache key holding the full, unfiltered product listing
pub const CATALOG_CACHE_KEY: &str = "products:all";
pub const CATALOG_CACHE_TTL: Duration = Duration::from_secs(12 * 60 * 60);

#[derive(Error, Debug)]
pub enum ProductError {
    #[error("data not found")]
    NotFound,

    #[error("invalid product id")]
    InvalidProductId,

    #[error("invalid user id")]
    InvalidUserId,

    #[error("invalid category id")]
    InvalidCategoryId,

    #[error("invalid quantity")]
    InvalidQuantity,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<DatabaseError> for ProductError {
    fn from(err: DatabaseError) -> Self {
        match err {
            // a cart entry pointing at a missing product or user
            DatabaseError::NotFound | DatabaseError::ForeignKeyViolation(_) => {
                ProductError::NotFound
            }
            other => ProductError::Internal(other.into()),
        }
    }
}

/// Read-through cache in front of the product listing.
///
/// Only the unfiltered listing is cached; entries expire after
/// [`CATALOG_CACHE_TTL`] and are never invalidated on write. A broken or
/// unreachable cache degrades to reading the store.
pub struct ProductCatalogCache {
    store: Arc<dyn ProductStore>,
    cache: Arc<dyn KeyValueCache>,
}

impl ProductCatalogCache {
    pub fn new(store: Arc<dyn ProductStore>, cache: Arc<dyn KeyValueCache>) -> Self {
        Self { store, cache }
    }

    pub async fn get_products(&self, filter: ProductFilter) -> Result<Vec<Product>, ProductError> {
        if !filter.is_unfiltered() {
            return Ok(self.store.get_products(filter).await?);
        }

        if let Some(products) = self.read_cached().await {
            debug!(count = products.len(), "Product catalog served from cache");
            return Ok(products);
        }

        let products = self.store.get_products(filter).await?;
        self.write_cached(&products).await;
        Ok(products)
    }

    async fn read_cached(&self) -> Option<Vec<Product>> {
        let payload = match self.cache.get(CATALOG_CACHE_KEY).await {
            Ok(payload) => payload?,
            Err(e) => {
                warn!(error = %e, "Product catalog cache read failed");
                return None;
            }
        };

        match serde_json::from_str(&payload) {
            Ok(products) => Some(products),
            Err(e) => {
                warn!(error = %e, "Discarding undecodable product catalog cache entry");
                None
            }
        }
    }

    async fn write_cached(&self, products: &[Product]) {
        let payload = match serde_json::to_string(products) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "Failed to encode product catalog for cache");
                return;
            }
        };

        if let Err(e) = self
            .cache
            .set(CATALOG_CACHE_KEY, &payload, CATALOG_CACHE_TTL)
            .await
        {
            warn!(error = %e, "Product catalog cache write failed");
        }
    }
}

pub struct ProductService {
    products: Arc<dyn ProductStore>,
    carts: Arc<dyn CartStore>,
    catalog: ProductCatalogCache,
    clock: Arc<dyn Clock>,
}

impl ProductService {
    pub fn new(
        products: Arc<dyn ProductStore>,
        carts: Arc<dyn CartStore>,
        cache: Arc<dyn KeyValueCache>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            catalog: ProductCatalogCache::new(products.clone(), cache),
            products,
            carts,
            clock,
        }
    }

    pub async fn get_product_by_id(&self, id: i64) -> Result<Product, ProductError> {
        if id <= 0 {
            return Err(ProductError::InvalidProductId);
        }
        Ok(self.products.get_product_by_id(id).await?)
    }

    pub async fn get_products(&self, filter: ProductFilter) -> Result<Vec<Product>, ProductError> {
        if matches!(filter.category_id, Some(id) if id <= 0) {
            return Err(ProductError::InvalidCategoryId);
        }
        self.catalog.get_products(filter).await
    }

    /// Put a product in the user's cart, replacing any previous quantity
    pub async fn add_cart_entry(
        &self,
        user_id: i64,
        product_id: i64,
        quantity: i64,
    ) -> Result<(), ProductError> {
        validate_cart_key(user_id, product_id)?;
        if quantity <= 0 {
            return Err(ProductError::InvalidQuantity);
        }

        let entry = NewCartEntry {
            user_id,
            product_id,
            quantity,
            created_at: self.clock.now(),
        };
        self.carts.add_cart_entry(&entry).await?;
        info!(user_id, product_id, quantity, "Cart entry saved");
        Ok(())
    }

    pub async fn get_carts_by_user_id(&self, user_id: i64) -> Result<Vec<CartEntry>, ProductError> {
        if user_id <= 0 {
            return Err(ProductError::InvalidUserId);
        }
        Ok(self.carts.get_carts_by_user_id(user_id).await?)
    }

    pub async fn delete_cart_entry(&self, user_id: i64, product_id: i64) -> Result<(), ProductError> {
        validate_cart_key(user_id, product_id)?;
        self.carts.delete_cart_entry(user_id, product_id).await?;
        info!(user_id, product_id, "Cart entry removed");
        Ok(())
    }
}

fn validate_cart_key(user_id: i64, product_id: i64) -> Result<(), ProductError> {
    if user_id <= 0 {
        return Err(ProductError::InvalidUserId);
    }
    if product_id <= 0 {
        return Err(ProductError::InvalidProductId);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use common::error::DatabaseResult;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn product(id: i64, category_id: i64) -> Product {
        Product {
            id,
            name: format!("Product {id}"),
            price: 1000 * id,
            description: String::new(),
            category_id,
            category_name: Some("Drinks".to_string()),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// Product store that counts listing calls
    struct CountingProducts {
        products: Vec<Product>,
        list_calls: AtomicUsize,
    }

    impl CountingProducts {
        fn new(products: Vec<Product>) -> Self {
            Self {
                products,
                list_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ProductStore for CountingProducts {
        async fn get_product_by_id(&self, id: i64) -> DatabaseResult<Product> {
            self.products
                .iter()
                .find(|p| p.id == id)
                .cloned()
                .ok_or(DatabaseError::NotFound)
        }

        async fn get_products(&self, filter: ProductFilter) -> DatabaseResult<Vec<Product>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .products
                .iter()
                .filter(|p| filter.category_id.is_none_or(|c| p.category_id == c))
                .cloned()
                .collect())
        }
    }

    #[derive(Default)]
    struct MemoryCache {
        entries: Mutex<HashMap<String, String>>,
        ttls: Mutex<Vec<Duration>>,
    }

    #[async_trait]
    impl KeyValueCache for MemoryCache {
        async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
            Ok(self.entries.lock().unwrap().get(key).cloned())
        }

        async fn set(&self, key: &str, value: &str, ttl: Duration) -> anyhow::Result<()> {
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            self.ttls.lock().unwrap().push(ttl);
            Ok(())
        }
    }

    struct DownCache;

    #[async_trait]
    impl KeyValueCache for DownCache {
        async fn get(&self, _key: &str) -> anyhow::Result<Option<String>> {
            anyhow::bail!("connection refused")
        }

        async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> anyhow::Result<()> {
            anyhow::bail!("connection refused")
        }
    }

    #[tokio::test]
    async fn second_listing_is_served_from_cache() {
        let store = Arc::new(CountingProducts::new(vec![product(1, 1), product(2, 2)]));
        let cache = Arc::new(MemoryCache::default());
        let catalog = ProductCatalogCache::new(store.clone(), cache.clone());

        let first = catalog.get_products(ProductFilter::default()).await.unwrap();
        let second = catalog.get_products(ProductFilter::default()).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(store.list_calls.load(Ordering::SeqCst), 1);
        assert_eq!(*cache.ttls.lock().unwrap(), vec![CATALOG_CACHE_TTL]);
        assert!(cache.entries.lock().unwrap().contains_key(CATALOG_CACHE_KEY));
    }

    #[tokio::test]
    async fn filtered_listing_bypasses_cache() {
        let store = Arc::new(CountingProducts::new(vec![product(1, 1), product(2, 2)]));
        let cache = Arc::new(MemoryCache::default());
        let catalog = ProductCatalogCache::new(store.clone(), cache.clone());

        let drinks = catalog
            .get_products(ProductFilter::by_category(2))
            .await
            .unwrap();
        catalog
            .get_products(ProductFilter::by_category(2))
            .await
            .unwrap();

        assert_eq!(drinks.len(), 1);
        assert_eq!(drinks[0].id, 2);
        assert_eq!(store.list_calls.load(Ordering::SeqCst), 2);
        assert!(cache.entries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn undecodable_entry_is_a_miss_and_gets_overwritten() {
        let store = Arc::new(CountingProducts::new(vec![product(1, 1)]));
        let cache = Arc::new(MemoryCache::default());
        cache
            .set(CATALOG_CACHE_KEY, "{not json", CATALOG_CACHE_TTL)
            .await
            .unwrap();
        let catalog = ProductCatalogCache::new(store.clone(), cache.clone());

        let products = catalog.get_products(ProductFilter::default()).await.unwrap();

        assert_eq!(products.len(), 1);
        assert_eq!(store.list_calls.load(Ordering::SeqCst), 1);
        let stored = cache.get(CATALOG_CACHE_KEY).await.unwrap().unwrap();
        assert!(serde_json::from_str::<Vec<Product>>(&stored).is_ok());
    }

    #[tokio::test]
    async fn unreachable_cache_falls_back_to_store() {
        let store = Arc::new(CountingProducts::new(vec![product(1, 1)]));
        let catalog = ProductCatalogCache::new(store.clone(), Arc::new(DownCache));

        let products = catalog.get_products(ProductFilter::default()).await.unwrap();
        assert_eq!(products.len(), 1);
    }

    /// Cart store backed by a map keyed on (user, product)
    #[derive(Default)]
    struct MemoryCarts {
        entries: Mutex<HashMap<(i64, i64), i64>>,
    }

    #[async_trait]
    impl CartStore for MemoryCarts {
        async fn add_cart_entry(&self, entry: &NewCartEntry) -> DatabaseResult<()> {
            if entry.product_id > 10 {
                return Err(DatabaseError::ForeignKeyViolation(
                    "product_carts_product_id_fkey".into(),
                ));
            }
            self.entries
                .lock()
                .unwrap()
                .insert((entry.user_id, entry.product_id), entry.quantity);
            Ok(())
        }

        async fn get_carts_by_user_id(&self, user_id: i64) -> DatabaseResult<Vec<CartEntry>> {
            let entries = self.entries.lock().unwrap();
            Ok(entries
                .iter()
                .filter(|((user, _), _)| *user == user_id)
                .map(|((user, product), quantity)| CartEntry {
                    user_id: *user,
                    product_id: *product,
                    product_name: format!("Product {product}"),
                    product_price: 1000,
                    quantity: *quantity,
                    created_at: Utc::now(),
                    updated_at: None,
                })
                .collect())
        }

        async fn delete_cart_entry(&self, user_id: i64, product_id: i64) -> DatabaseResult<()> {
            self.entries
                .lock()
                .unwrap()
                .remove(&(user_id, product_id))
                .map(|_| ())
                .ok_or(DatabaseError::NotFound)
        }
    }

    fn service() -> ProductService {
        ProductService::new(
            Arc::new(CountingProducts::new(vec![product(1, 1)])),
            Arc::new(MemoryCarts::default()),
            Arc::new(MemoryCache::default()),
            Arc::new(crate::clock::SystemClock),
        )
    }

    #[tokio::test]
    async fn cart_add_replaces_quantity() {
        let products = service();
        products.add_cart_entry(7, 1, 2).await.unwrap();
        products.add_cart_entry(7, 1, 5).await.unwrap();

        let cart = products.get_carts_by_user_id(7).await.unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart[0].quantity, 5);
    }

    #[tokio::test]
    async fn cart_validation_and_missing_rows() {
        let products = service();

        assert!(matches!(
            products.add_cart_entry(0, 1, 1).await,
            Err(ProductError::InvalidUserId)
        ));
        assert!(matches!(
            products.add_cart_entry(7, 1, 0).await,
            Err(ProductError::InvalidQuantity)
        ));
        assert!(matches!(
            products.add_cart_entry(7, 99, 1).await,
            Err(ProductError::NotFound)
        ));
        assert!(matches!(
            products.delete_cart_entry(7, 1).await,
            Err(ProductError::NotFound)
        ));
    }

    #[tokio::test]
    async fn product_lookup_validation() {
        let products = service();
        assert!(matches!(
            products.get_product_by_id(-1).await,
            Err(ProductError::InvalidProductId)
        ));
        assert!(matches!(
            products.get_products(ProductFilter::by_category(0)).await,
            Err(ProductError::InvalidCategoryId)
        ));
        assert_eq!(products.get_product_by_id(1).await.unwrap().id, 1);
    }
}
