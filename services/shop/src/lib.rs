//! Shop backend service
//!
//! Users, products, categories, carts and orders over HTTP. Orders are
//! charged through an external payment gateway; the product listing is cached
//! in Redis.

pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod payment;
pub mod repositories;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
pub mod task;
pub mod validation;
