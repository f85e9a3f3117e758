//! Syncline Reconciliation
//!
//! Computes the minimal, idempotent add/remove plan that brings a
//! managed collection in line with an external data source.
//!
//! # Core Concepts
//!
//! - [`SourceItem`] / [`SyncItem`]: raw source records and their typed,
//!   host-facing projection
//! - [`FieldValue`]: the `{type, value}` wrapper with per-type coercion
//! - [`reconcile`]: the reconciliation pass itself
//! - [`ReconcileMode`] / [`ConflictPolicy`]: mirror vs merge semantics
//!
//! # Example
//!
//! ```rust,ignore
//! use syncline_reconcile::{reconcile, ReconcileInput, ReconcileMode};
//! use syncline_slug::SlugResolver;
//!
//! let plan = reconcile(input, &mut SlugResolver::new(), ReconcileMode::Mirror)?;
//! println!("add {} / remove {}", plan.to_add.len(), plan.to_remove.len());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod error;
mod item;
mod reconcile;
mod value;

pub use error::ReconcileError;
pub use item::{SourceItem, SyncItem};
pub use reconcile::{
    reconcile, reconcile_fresh, ConflictPolicy, ReconcileInput, ReconcileMode, SyncPlan,
    SyncWarning, WarningReason,
};
pub use value::{coerce_value, FieldValue, ReferenceResolver};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
