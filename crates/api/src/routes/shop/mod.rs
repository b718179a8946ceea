//! Shopper-facing routes under `/api/shop`.

pub mod address;
pub mod cart;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod search;
