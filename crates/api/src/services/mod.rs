//! Business logic and outbound integrations.
//!
//! - `auth` - Registration, login and password reset
//! - `email` - SMTP delivery with askama templates
//! - `paypal` - PayPal v1 payments client
//! - `cloudinary` - Signed image upload
//! - `orders` - Checkout and payment capture
//! - `reviews` - Purchase-gated reviews and rating averages
//! - `features` - Cached homepage banners

pub mod auth;
pub mod cloudinary;
pub mod email;
pub mod features;
pub mod orders;
pub mod paypal;
pub mod reviews;
