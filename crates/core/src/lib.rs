//! Bazaar Core - Shared domain types.
//!
//! This crate provides types used across all Bazaar components:
//! - `api` - The REST backend consumed by the shop front-end
//! - `cli` - Command-line tools for migrations, seeding and user management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. Pricing, rating and catalogue query rules live here
//! so they can be unit tested without a running database.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, emails, statuses, money, ratings and catalogue queries

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
