//! Application state shared across handlers

use std::sync::Arc;

use common::cache::KeyValueCache;

use crate::{
    auth::{Argon2Hasher, AuthGate, TokenService},
    clock::Clock,
    payment::PaymentGateway,
    repositories::{CartStore, CategoryStore, OrderStore, ProductStore, UserStore},
    services::{CategoryService, OrderOrchestrator, ProductService, UserService},
};

/// Everything the services are built from
pub struct Collaborators {
    pub users: Arc<dyn UserStore>,
    pub products: Arc<dyn ProductStore>,
    pub carts: Arc<dyn CartStore>,
    pub categories: Arc<dyn CategoryStore>,
    pub orders: Arc<dyn OrderStore>,
    pub cache: Arc<dyn KeyValueCache>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub tokens: Arc<TokenService>,
    pub hasher: Argon2Hasher,
    pub clock: Arc<dyn Clock>,
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub gate: AuthGate,
    pub users: Arc<UserService>,
    pub products: Arc<ProductService>,
    pub categories: Arc<CategoryService>,
    pub orders: Arc<OrderOrchestrator>,
}

impl AppState {
    pub fn new(parts: Collaborators) -> Self {
        let Collaborators {
            users,
            products,
            carts,
            categories,
            orders,
            cache,
            gateway,
            tokens,
            hasher,
            clock,
        } = parts;

        AppState {
            gate: AuthGate::new(tokens.clone()),
            orders: Arc::new(OrderOrchestrator::new(
                orders,
                carts.clone(),
                users.clone(),
                gateway,
                clock.clone(),
            )),
            products: Arc::new(ProductService::new(products, carts, cache, clock.clone())),
            categories: Arc::new(CategoryService::new(categories)),
            users: Arc::new(UserService::new(users, tokens, hasher, clock)),
        }
    }
}
