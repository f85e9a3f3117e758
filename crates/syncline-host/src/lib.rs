//! Syncline Host Orchestration
//!
//! The plugin-host capability trait and the session orchestration that
//! drives a sync through it.
//!
//! # Core Concepts
//!
//! - [`PluginHost`]: the injected async bridge to the host runtime
//! - [`apply_sync`]: the explicit set-fields / remove / add ordering
//!   contract with batched, progress-reporting writes
//! - [`SyncEngine`]: session orchestration with a re-entrancy guard
//! - [`keys`]: the plugin-data keys that make relaunch auto-resync work
//!
//! # Example
//!
//! ```rust,ignore
//! use syncline_host::{SyncConfig, SyncEngine, SyncRequest, NoopObserver};
//!
//! let engine = SyncEngine::new(host, SyncConfig::new());
//! let configs = engine.configure_fields(&source_fields).await?;
//! let report = engine
//!     .sync_and_notify(
//!         SyncRequest { data_source_id: "posts", slug_field, configs: &configs, items: &items },
//!         &mut NoopObserver,
//!     )
//!     .await?;
//! println!("added {}, removed {}", report.added, report.removed);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
mod apply;
mod engine;
mod error;
mod host;
pub mod keys;

// Re-exports for convenience
pub use apply::{apply_sync, ApplyOutcome, NoopObserver, SyncObserver, SyncProgress};
pub use engine::{SavedSync, SyncConfig, SyncEngine, SyncReport, SyncRequest};
pub use error::{EngineError, HostError};
pub use host::{CollectionInfo, MessageVariant, PluginHost};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving a sync
    pub use crate::{
        apply_sync, EngineError, HostError, NoopObserver, PluginHost, SyncConfig, SyncEngine,
        SyncObserver, SyncReport, SyncRequest,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
