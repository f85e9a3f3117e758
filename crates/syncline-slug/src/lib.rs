//! Syncline Slug Resolution
//!
//! Deterministic, URL-safe slugs and the stable item ids hashed from
//! them.
//!
//! # Core Concepts
//!
//! - [`slugify`]: the idempotent lowercase/strip/collapse transform
//! - [`SlugResolver`]: per-pass resolution with collision disambiguation
//! - [`CollisionSuffix`]: which of the two observed suffix formats to use
//!
//! # Example
//!
//! ```rust,ignore
//! use syncline_slug::{slugify, SlugResolver};
//!
//! let mut resolver = SlugResolver::new();
//! let resolved = resolver.resolve(Some(&raw_title), None, Some("rec1")).unwrap();
//! assert_eq!(resolved.slug, slugify("Hello World"));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod resolver;
mod slugify;

pub use resolver::{CollisionSuffix, ResolvedSlug, SlugResolver};
pub use slugify::slugify;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
