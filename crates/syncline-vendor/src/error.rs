//! Error types for vendor API access

/// Errors raised while talking to a vendor REST API
///
/// None of these are retried automatically; the one sanctioned retry
/// loop is the fixed-interval OAuth token poll.
#[derive(Debug, thiserror::Error)]
pub enum VendorError {
    /// The request never produced a response
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response, body attached for diagnosis
    #[error("unexpected status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly truncated by the vendor
        body: String,
    },

    /// The response parsed as JSON but violated the expected shape
    #[error("malformed response: {detail}")]
    Malformed {
        /// What the schema validation or deserialization rejected
        detail: String,
    },

    /// No access token is stored for this vendor
    #[error("no access token stored")]
    MissingToken,

    /// The token broker never completed the authorization
    #[error("authorization polling timed out after {attempts} attempts")]
    AuthorizationTimeout {
        /// How many polls were made
        attempts: u32,
    },

    /// The session fetch was cancelled
    #[error("fetch aborted")]
    Aborted,
}

impl VendorError {
    /// Build a malformed-response error
    #[inline]
    #[must_use]
    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::Malformed {
            detail: detail.into(),
        }
    }

    /// Whether re-authenticating could help
    #[inline]
    #[must_use]
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            Self::MissingToken
                | Self::Status {
                    status: 401 | 403,
                    ..
                }
        )
    }
}
