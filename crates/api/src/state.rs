//! Application state shared across handlers.

use std::sync::Arc;

use lettre::transport::smtp::Error as SmtpError;
use sqlx::PgPool;

use crate::config::ApiConfig;
use crate::services::cloudinary::{CloudinaryClient, CloudinaryError};
use crate::services::email::EmailService;
use crate::services::features::FeatureCache;
use crate::services::paypal::{PaypalClient, PaypalError};

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("failed to build PayPal client: {0}")]
    Paypal(#[from] PaypalError),
    #[error("failed to build Cloudinary client: {0}")]
    Cloudinary(#[from] CloudinaryError),
    #[error("failed to configure SMTP transport: {0}")]
    Smtp(#[from] SmtpError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and outbound clients.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    pool: PgPool,
    paypal: PaypalClient,
    cloudinary: CloudinaryClient,
    email: Option<EmailService>,
    features: FeatureCache,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if an outbound client cannot be constructed.
    pub fn new(config: ApiConfig, pool: PgPool) -> Result<Self, StateError> {
        let paypal = PaypalClient::new(&config.paypal)?;
        let cloudinary = CloudinaryClient::new(&config.cloudinary)?;
        let email = config.email.as_ref().map(EmailService::new).transpose()?;
        if email.is_none() {
            tracing::warn!("SMTP not configured; password reset emails are disabled");
        }

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                paypal,
                cloudinary,
                email,
                features: FeatureCache::new(),
            }),
        })
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the PayPal client.
    #[must_use]
    pub fn paypal(&self) -> &PaypalClient {
        &self.inner.paypal
    }

    /// Get a reference to the Cloudinary client.
    #[must_use]
    pub fn cloudinary(&self) -> &CloudinaryClient {
        &self.inner.cloudinary
    }

    /// Get the email service, if SMTP is configured.
    #[must_use]
    pub fn email(&self) -> Option<&EmailService> {
        self.inner.email.as_ref()
    }

    /// Get the cached banner list.
    #[must_use]
    pub fn features(&self) -> &FeatureCache {
        &self.inner.features
    }
}
