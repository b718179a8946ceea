//! PayPal REST (v1 payments) client.
//!
//! Creates `sale` payments that the shopper approves on PayPal, and executes
//! them once PayPal redirects back with a payer ID. OAuth access tokens are
//! cached in memory for 30 minutes.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use bazaar_core::format_amount;

use crate::config::PaypalConfig;

/// Only USD is supported.
pub const CURRENCY: &str = "USD";

const TOKEN_CACHE_KEY: &str = "access_token";
const TOKEN_TTL: Duration = Duration::from_secs(30 * 60);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur when interacting with the PayPal API.
#[derive(Debug, Error)]
pub enum PaypalError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Executed payment was not approved.
    #[error("payment not approved (state: {0})")]
    NotApproved(String),
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Serialize)]
struct PaymentRequest<'a> {
    intent: &'static str,
    payer: Payer,
    redirect_urls: RedirectUrls<'a>,
    transactions: Vec<Transaction<'a>>,
}

#[derive(Debug, Serialize)]
struct Payer {
    payment_method: &'static str,
}

#[derive(Debug, Serialize)]
struct RedirectUrls<'a> {
    return_url: &'a str,
    cancel_url: &'a str,
}

#[derive(Debug, Serialize)]
struct Transaction<'a> {
    item_list: ItemList<'a>,
    amount: Amount,
    description: &'static str,
}

#[derive(Debug, Serialize)]
struct ItemList<'a> {
    items: Vec<Item<'a>>,
}

#[derive(Debug, Serialize)]
struct Item<'a> {
    name: &'a str,
    sku: String,
    price: String,
    currency: &'static str,
    quantity: i32,
}

#[derive(Debug, Serialize)]
struct Amount {
    currency: &'static str,
    total: String,
}

#[derive(Debug, Deserialize)]
struct PaymentResponse {
    id: String,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    links: Vec<Link>,
}

#[derive(Debug, Deserialize)]
struct Link {
    href: String,
    rel: String,
}

#[derive(Debug, Serialize)]
struct ExecuteRequest<'a> {
    payer_id: &'a str,
}

/// One purchased line as sent to PayPal.
#[derive(Debug, Clone)]
pub struct PaymentLine<'a> {
    pub name: &'a str,
    pub sku: String,
    pub unit_price: Decimal,
    pub quantity: i32,
}

/// A payment created on PayPal and awaiting shopper approval.
#[derive(Debug, Clone)]
pub struct CreatedPayment {
    pub id: String,
    pub approval_url: String,
}

fn payment_request<'a>(
    lines: &'a [PaymentLine<'a>],
    total: Decimal,
    return_url: &'a str,
    cancel_url: &'a str,
) -> PaymentRequest<'a> {
    PaymentRequest {
        intent: "sale",
        payer: Payer {
            payment_method: "paypal",
        },
        redirect_urls: RedirectUrls {
            return_url,
            cancel_url,
        },
        transactions: vec![Transaction {
            item_list: ItemList {
                items: lines
                    .iter()
                    .map(|line| Item {
                        name: line.name,
                        sku: line.sku.clone(),
                        price: format_amount(line.unit_price),
                        currency: CURRENCY,
                        quantity: line.quantity,
                    })
                    .collect(),
            },
            amount: Amount {
                currency: CURRENCY,
                total: format_amount(total),
            },
            description: "Bazaar order",
        }],
    }
}

fn approval_url(links: &[Link]) -> Option<&str> {
    links
        .iter()
        .find(|link| link.rel == "approval_url")
        .map(|link| link.href.as_str())
}

// =============================================================================
// PaypalClient
// =============================================================================

/// Client for the PayPal v1 payments API.
#[derive(Clone)]
pub struct PaypalClient {
    inner: Arc<PaypalClientInner>,
}

struct PaypalClientInner {
    client: reqwest::Client,
    base_url: String,
    client_id: String,
    client_secret: SecretString,
    token_cache: Cache<&'static str, String>,
}

impl PaypalClient {
    /// Create a new PayPal client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &PaypalConfig) -> Result<Self, PaypalError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let token_cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(TOKEN_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(PaypalClientInner {
                client,
                base_url: config.mode.api_base().to_string(),
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.clone(),
                token_cache,
            }),
        })
    }

    /// Get a cached OAuth access token, fetching a new one when expired.
    async fn access_token(&self) -> Result<String, PaypalError> {
        if let Some(token) = self.inner.token_cache.get(TOKEN_CACHE_KEY).await {
            return Ok(token);
        }

        let url = format!("{}/v1/oauth2/token", self.inner.base_url);
        let response = self
            .inner
            .client
            .post(&url)
            .basic_auth(
                &self.inner.client_id,
                Some(self.inner.client_secret.expose_secret()),
            )
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let token: TokenResponse = Self::parse_response(response).await?;
        self.inner
            .token_cache
            .insert(TOKEN_CACHE_KEY, token.access_token.clone())
            .await;

        tracing::debug!("Fetched new PayPal access token");
        Ok(token.access_token)
    }

    /// Create a `sale` payment and return its approval link.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails or no approval link is returned.
    #[instrument(skip(self, lines), fields(total = %total))]
    pub async fn create_payment(
        &self,
        lines: &[PaymentLine<'_>],
        total: Decimal,
        return_url: &str,
        cancel_url: &str,
    ) -> Result<CreatedPayment, PaypalError> {
        let token = self.access_token().await?;
        let url = format!("{}/v1/payments/payment", self.inner.base_url);
        let body = payment_request(lines, total, return_url, cancel_url);

        let response = self
            .inner
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        let payment: PaymentResponse = Self::parse_response(response).await?;
        let approval_url = approval_url(&payment.links)
            .ok_or_else(|| PaypalError::Parse("no approval_url link in response".to_string()))?
            .to_string();

        tracing::info!(payment_id = %payment.id, "PayPal payment created");
        Ok(CreatedPayment {
            id: payment.id,
            approval_url,
        })
    }

    /// Execute an approved payment.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails or the payment is not approved.
    #[instrument(skip(self))]
    pub async fn execute_payment(&self, payment_id: &str, payer_id: &str) -> Result<(), PaypalError> {
        let token = self.access_token().await?;
        let url = format!(
            "{}/v1/payments/payment/{payment_id}/execute",
            self.inner.base_url
        );

        let response = self
            .inner
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&ExecuteRequest { payer_id })
            .send()
            .await?;

        let payment: PaymentResponse = Self::parse_response(response).await?;
        match payment.state.as_deref() {
            Some("approved") => {
                tracing::info!(payment_id = %payment.id, "PayPal payment executed");
                Ok(())
            }
            other => Err(PaypalError::NotApproved(
                other.unwrap_or("unknown").to_string(),
            )),
        }
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, PaypalError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "PayPal API returned non-success status"
            );
            return Err(PaypalError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        serde_json::from_str(&body).map_err(|e| PaypalError::Parse(e.to_string()))
    }
}
