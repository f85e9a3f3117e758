//! Slug resolution with collision disambiguation
//!
//! [`SlugResolver`] turns raw slug-source values into `(slug, item id)`
//! pairs that are stable across re-syncs of the same logical record.

use crate::slugify::slugify;
use serde_json::Value;
use std::collections::HashMap;
use syncline_field::ItemId;

/// Suffix format used to disambiguate colliding slugs
///
/// Both formats exist in the wild; which one a plugin uses is part of its
/// persisted-id compatibility surface, so the choice is explicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionSuffix {
    /// Append the occurrence number (`"hello" -> "hello-2"`)
    #[default]
    Counter,
    /// Append the record's native id (`"hello" -> "hello-rec42"`)
    NativeId,
}

/// A resolved slug and the stable item id hashed from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSlug {
    /// The final, possibly disambiguated slug
    pub slug: String,
    /// djb2 hash of the slug, the item's host-facing id
    pub id: ItemId,
}

impl ResolvedSlug {
    fn new(slug: String) -> Self {
        let id = ItemId::from_slug(&slug);
        Self { slug, id }
    }
}

/// Stateful resolver for one reconciliation pass
///
/// Tracks every slug handed out so far; the first occurrence of a slug
/// keeps the bare form, later occurrences get a disambiguating suffix
/// before hashing so both records persist with distinct stable ids.
#[derive(Debug, Default)]
pub struct SlugResolver {
    suffix: CollisionSuffix,
    seen: HashMap<String, usize>,
}

impl SlugResolver {
    /// Create a resolver with the default counter suffix
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the collision suffix format
    #[inline]
    #[must_use]
    pub fn with_suffix(mut self, suffix: CollisionSuffix) -> Self {
        self.suffix = suffix;
        self
    }

    /// Resolve a slug for one source record
    ///
    /// Resolution order:
    /// 1. the raw slug-source value, when it is a non-empty string whose
    ///    slugified form is non-empty;
    /// 2. a slug already known for this record from a previous sync;
    /// 3. the record's natural identifier, as `synced-<native id>`.
    ///
    /// Returns `None` when none of the three yields a usable slug; the
    /// caller skips the record and records a warning.
    pub fn resolve(
        &mut self,
        raw: Option<&Value>,
        known_slug: Option<&str>,
        native_id: Option<&str>,
    ) -> Option<ResolvedSlug> {
        let base = raw
            .and_then(Value::as_str)
            .map(slugify)
            .filter(|slug| !slug.is_empty())
            .or_else(|| {
                known_slug
                    .map(slugify)
                    .filter(|slug| !slug.is_empty())
            })
            .or_else(|| {
                native_id
                    .map(|id| slugify(&format!("synced-{id}")))
                    .filter(|slug| !slug.is_empty())
            })?;

        let occurrence = {
            let count = self.seen.entry(base.clone()).or_insert(0);
            *count += 1;
            *count
        };

        if occurrence == 1 {
            return Some(ResolvedSlug::new(base));
        }

        let disambiguated = match (self.suffix, native_id) {
            (CollisionSuffix::NativeId, Some(id)) => slugify(&format!("{base} {id}")),
            // Counter format, also the fallback when no native id exists.
            _ => slugify(&format!("{base} {occurrence}")),
        };
        Some(ResolvedSlug::new(disambiguated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn primary_path_slugifies_raw_string() {
        let mut resolver = SlugResolver::new();
        let resolved = resolver
            .resolve(Some(&json!("Hello World")), None, None)
            .unwrap();
        assert_eq!(resolved.slug, "hello-world");
        assert_eq!(resolved.id, ItemId::from_slug("hello-world"));
    }

    #[test]
    fn non_string_raw_falls_back_to_native_id() {
        let mut resolver = SlugResolver::new();
        let resolved = resolver
            .resolve(Some(&json!(42)), None, Some("rec7"))
            .unwrap();
        assert_eq!(resolved.slug, "synced-rec7");
    }

    #[test]
    fn symbol_only_raw_falls_back_to_known_slug() {
        let mut resolver = SlugResolver::new();
        let resolved = resolver
            .resolve(Some(&json!("!!!")), Some("kept-from-last-sync"), Some("rec7"))
            .unwrap();
        assert_eq!(resolved.slug, "kept-from-last-sync");
    }

    #[test]
    fn nothing_usable_resolves_to_none() {
        let mut resolver = SlugResolver::new();
        assert!(resolver.resolve(None, None, None).is_none());
        assert!(resolver.resolve(Some(&json!(null)), None, None).is_none());
    }

    #[test]
    fn collisions_get_distinct_slugs_and_ids() {
        let mut resolver = SlugResolver::new();
        let first = resolver.resolve(Some(&json!("Hello")), None, None).unwrap();
        let second = resolver.resolve(Some(&json!("hello")), None, None).unwrap();

        assert_eq!(first.slug, "hello");
        assert_eq!(second.slug, "hello-2");
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn native_id_suffix_format() {
        let mut resolver = SlugResolver::new().with_suffix(CollisionSuffix::NativeId);
        let first = resolver
            .resolve(Some(&json!("Hello")), None, Some("a1"))
            .unwrap();
        let second = resolver
            .resolve(Some(&json!("Hello")), None, Some("b2"))
            .unwrap();

        assert_eq!(first.slug, "hello");
        assert_eq!(second.slug, "hello-b2");
    }

    #[test]
    fn native_id_suffix_falls_back_to_counter_without_id() {
        let mut resolver = SlugResolver::new().with_suffix(CollisionSuffix::NativeId);
        resolver.resolve(Some(&json!("Hello")), None, None).unwrap();
        let second = resolver.resolve(Some(&json!("Hello")), None, None).unwrap();
        assert_eq!(second.slug, "hello-2");
    }

    #[test]
    fn same_record_resolves_same_id_across_passes() {
        // A fresh resolver per pass, the way reconciliation runs.
        let id_of = |value: &Value| {
            SlugResolver::new()
                .resolve(Some(value), None, None)
                .unwrap()
                .id
        };
        assert_eq!(id_of(&json!("Hello World")), id_of(&json!("Hello World")));
    }
}
