//! Core types for Bazaar.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod catalog;
pub mod email;
pub mod id;
pub mod price;
pub mod rating;
pub mod status;

pub use catalog::{Page, ProductSort, SearchSort, escape_like, parse_csv_filter};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{effective_price, format_amount, line_total};
pub use rating::{Rating, RatingError, average_rating};
pub use status::*;
