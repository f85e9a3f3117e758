//! OAuth token-broker polling
//!
//! After opening the vendor's authorize page, plugins poll a token
//! broker with a read key at a fixed interval until the user completes
//! the flow. This is the one place retries are sanctioned; the broker
//! answers 404 until the token is ready.

use crate::error::VendorError;
use jsonschema::JSONSchema;
use once_cell::sync::Lazy;
use schemars::{schema_for, JsonSchema};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct TokenEnvelope {
    access_token: String,
}

static TOKEN_SCHEMA: Lazy<Value> =
    Lazy::new(|| serde_json::to_value(schema_for!(TokenEnvelope)).expect("schema serializes"));
static TOKEN_VALIDATOR: Lazy<JSONSchema> =
    Lazy::new(|| JSONSchema::compile(&TOKEN_SCHEMA).expect("token schema compiles"));

/// Fixed-interval poller for a broker's token endpoint
#[derive(Debug, Clone)]
pub struct TokenPoller {
    http: reqwest::Client,
    poll_url: String,
    interval: Duration,
    max_attempts: u32,
}

impl TokenPoller {
    /// Create a poller with the default cadence (2.5 s, 48 attempts)
    #[must_use]
    pub fn new(poll_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            poll_url: poll_url.into(),
            interval: Duration::from_millis(2500),
            max_attempts: 48,
        }
    }

    /// Override the polling interval
    #[inline]
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Override the attempt budget
    #[inline]
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Poll until the broker hands out the access token
    ///
    /// # Errors
    /// - [`VendorError::AuthorizationTimeout`] when the attempt budget
    ///   runs out
    /// - [`VendorError::Status`] on any response other than 200 or the
    ///   broker's not-ready 404
    pub async fn poll(&self, read_key: &str) -> Result<String, VendorError> {
        let mut ticker = tokio::time::interval(self.interval);
        for attempt in 1..=self.max_attempts {
            ticker.tick().await;

            let response = self
                .http
                .get(&self.poll_url)
                .query(&[("readKey", read_key)])
                .send()
                .await?;

            match response.status().as_u16() {
                200 => {
                    let body = response.text().await?;
                    let value: Value = serde_json::from_str(&body)
                        .map_err(|e| VendorError::malformed(e.to_string()))?;
                    if let Err(errors) = TOKEN_VALIDATOR.validate(&value) {
                        let detail = errors
                            .map(|error| error.to_string())
                            .collect::<Vec<_>>()
                            .join("; ");
                        return Err(VendorError::Malformed { detail });
                    }
                    let envelope: TokenEnvelope = serde_json::from_value(value)
                        .map_err(|e| VendorError::malformed(e.to_string()))?;
                    return Ok(envelope.access_token);
                }
                // Not ready yet; keep polling.
                404 => {
                    tracing::debug!(attempt, "token not ready");
                }
                status => {
                    return Err(VendorError::Status {
                        status,
                        body: response.text().await.unwrap_or_default(),
                    });
                }
            }
        }
        Err(VendorError::AuthorizationTimeout {
            attempts: self.max_attempts,
        })
    }
}
