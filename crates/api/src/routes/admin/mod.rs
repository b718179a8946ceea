//! Admin routes under `/api/admin`. Every handler requires the admin role
//! except the public banner listing.

pub mod features;
pub mod orders;
pub mod products;
