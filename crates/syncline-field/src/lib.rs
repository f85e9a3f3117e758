//! Syncline Field Model
//!
//! Typed source/collection field model with stable hash identifiers.
//!
//! # Core Concepts
//!
//! - [`StableHash`]: deterministic 8-hex-digit hash for field and item ids
//! - [`SourceField`]: one field of an external data source, as fetched
//! - [`MappedField`]: the managed-collection projection of a source field
//! - [`FieldConfig`]: the resolved source/collection pairing with
//!   enable/ignore state
//! - [`ReferenceIndex`]: sibling-collection lookup for reference fields
//!
//! # Example
//!
//! ```rust,ignore
//! use syncline_field::{compute_field_configs, ReferenceIndex, SourceField, SourceFieldType};
//!
//! let source = vec![SourceField::new("Title", SourceFieldType::String)];
//! let configs = compute_field_configs(&existing, &source, &ReferenceIndex::new());
//!
//! for config in &configs {
//!     println!("{} (new: {})", config.source.name, config.is_new);
//! }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
mod config;
mod hash;
mod mapped;
mod source;

// Re-exports
pub use config::{compute_field_configs, FieldConfig, ReferenceCandidate, ReferenceIndex};
pub use hash::{FieldId, HashError, ItemId, StableHash};
pub use mapped::{map_source_type, CollectionId, EnumCase, HostFieldType, MappedField};
pub use source::{SourceField, SourceFieldType};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
