//! Syncline Vendor Access
//!
//! The vendor REST client pattern shared by the sync plugins: bearer
//! tokens behind a [`CredentialStore`] capability, schema-validated
//! response envelopes, typed errors with status and body attached,
//! bounded-concurrency pagination, and the fixed-interval OAuth token
//! poll.
//!
//! # Core Concepts
//!
//! - [`DataSource`]: the trait the sync engine consumes
//! - [`RestDataSource`]: bearer-auth client for `fields` + paginated
//!   `items` endpoints
//! - [`CredentialStore`]: get/set/clear of opaque token strings
//! - [`TokenPoller`]: the one sanctioned retry loop
//! - [`fetch_pages`] / [`abortable`]: rate-limit-respecting page fan-out
//!   and session-fetch cancellation
//!
//! # Example
//!
//! ```rust,ignore
//! use syncline_vendor::{MemoryCredentialStore, RestDataSource, DataSource};
//!
//! let store = Arc::new(MemoryCredentialStore::with_access_token(&token));
//! let source = RestDataSource::new("https://api.vendor.example/v1", "posts", store);
//! let fields = source.fetch_fields().await?;
//! let items = source.fetch_items().await?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
mod client;
mod credentials;
mod error;
mod oauth;
mod pages;

// Re-exports
pub use client::{DataSource, RestDataSource};
pub use credentials::{CredentialStore, MemoryCredentialStore, ACCESS_TOKEN_KEY};
pub use error::VendorError;
pub use oauth::TokenPoller;
pub use pages::{abortable, fetch_pages, DEFAULT_PAGE_CONCURRENCY};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
