//! Domain models for the shop API.
//!
//! Models double as `sqlx::FromRow` targets where the table maps one-to-one
//! onto the JSON shape. Orders are assembled from several rows, so their row
//! type lives in [`crate::db::orders`].

pub mod address;
pub mod cart;
pub mod feature;
pub mod order;
pub mod product;
pub mod review;
pub mod session;
pub mod user;

pub use session::{CurrentUser, session_keys};
