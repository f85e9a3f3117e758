//! Field configuration merging
//!
//! [`compute_field_configs`] merges a freshly fetched source field list
//! with the managed collection's existing fields: existing mapped fields
//! are reused verbatim (preserving user renames), new ones are synthesized
//! from the type-mapping table, and reference fields are resolved against
//! the [`ReferenceIndex`] of sibling collections.

use crate::hash::FieldId;
use crate::mapped::{map_source_type, CollectionId, EnumCase, MappedField};
use crate::source::{SourceField, SourceFieldType};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A sibling collection that can satisfy a reference field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceCandidate {
    /// Host collection id
    pub collection_id: CollectionId,
    /// Display name, for the UI picker
    pub collection_name: String,
}

impl ReferenceCandidate {
    /// Create a candidate
    #[inline]
    #[must_use]
    pub fn new(collection_id: CollectionId, collection_name: impl Into<String>) -> Self {
        Self {
            collection_id,
            collection_name: collection_name.into(),
        }
    }
}

/// Index from data source id to the collections synced from it
///
/// Built once per session by scanning every host-managed collection and
/// reading its persisted data-source-id plugin data. Insertion order is
/// preserved so the first matching collection is a stable default.
#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    by_data_source: IndexMap<String, Vec<ReferenceCandidate>>,
}

impl ReferenceIndex {
    /// Create an empty index
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a collection as synced from `data_source_id`
    pub fn insert(&mut self, data_source_id: impl Into<String>, candidate: ReferenceCandidate) {
        self.by_data_source
            .entry(data_source_id.into())
            .or_default()
            .push(candidate);
    }

    /// Collections synced from the given data source, in scan order
    #[inline]
    #[must_use]
    pub fn candidates(&self, data_source_id: &str) -> &[ReferenceCandidate] {
        self.by_data_source
            .get(data_source_id)
            .map_or(&[], Vec::as_slice)
    }

    /// Number of distinct data sources indexed
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_data_source.len()
    }

    /// Whether any collection has been indexed
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_data_source.is_empty()
    }
}

/// The resolved pairing of a source field and its collection projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    /// The source field, as fetched this session
    pub source: SourceField,
    /// The collection-side field; `None` when the type is unsupported
    pub mapped: Option<MappedField>,
    /// True when no mapped field with this id existed before this session
    ///
    /// Callers typically default new fields to disabled so users opt in.
    pub is_new: bool,
    /// Excluded from both the field set and item sync
    pub ignored: bool,
    /// Reference field with no matching sibling collection
    ///
    /// Such fields are forced into the ignored set and must not be
    /// enabled until a matching collection exists.
    pub missing_reference: bool,
    /// All sibling collections that can satisfy a reference field
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reference_candidates: Vec<ReferenceCandidate>,
}

impl FieldConfig {
    /// Whether this field participates in field setup and item sync
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.ignored && self.mapped.is_some()
    }

    /// Apply a user rename to the mapped field
    ///
    /// A rename that reduces to an empty or whitespace string reverts to
    /// the original source field name rather than being persisted empty.
    pub fn rename(&mut self, name: &str) {
        if let Some(mapped) = self.mapped.as_mut() {
            let trimmed = name.trim();
            mapped.name = if trimmed.is_empty() {
                self.source.name.clone()
            } else {
                trimmed.to_string()
            };
        }
    }

    /// Toggle the ignored flag
    ///
    /// Fields with a missing reference target stay ignored regardless.
    pub fn set_ignored(&mut self, ignored: bool) {
        self.ignored = ignored || self.missing_reference;
    }
}

/// Merge source fields with the collection's existing mapped fields
///
/// For each source field: look up an existing [`MappedField`] with the
/// same id. If found, it is reused verbatim (`is_new = false`), which is
/// what preserves user renames across sessions. If not, a new mapped
/// field is synthesized via the type-mapping table (`is_new = true`).
/// Reference fields with zero candidate collections are flagged and
/// forced ignored; source types that map to nothing are ignored with
/// `mapped = None`.
#[must_use]
pub fn compute_field_configs(
    existing: &[MappedField],
    source: &[SourceField],
    references: &ReferenceIndex,
) -> Vec<FieldConfig> {
    let existing_by_id: IndexMap<FieldId, &MappedField> =
        existing.iter().map(|field| (field.id, field)).collect();

    source
        .iter()
        .map(|field| {
            let candidates = field
                .ty
                .target_data_source_id()
                .map(|id| references.candidates(id).to_vec())
                .unwrap_or_default();
            let missing_reference = field.ty.is_reference() && candidates.is_empty();

            let (mapped, is_new) = match existing_by_id.get(&field.id) {
                Some(found) => (Some((*found).clone()), false),
                None => (synthesize(field, &candidates), true),
            };

            let ignored = missing_reference || mapped.is_none();
            FieldConfig {
                source: field.clone(),
                mapped,
                is_new,
                ignored,
                missing_reference,
                reference_candidates: candidates,
            }
        })
        .collect()
}

/// Build a fresh mapped field for a source field seen for the first time
fn synthesize(field: &SourceField, candidates: &[ReferenceCandidate]) -> Option<MappedField> {
    let ty = map_source_type(&field.ty)?;
    let mut mapped = MappedField::new(field.id, field.name.clone(), ty);

    if let SourceFieldType::Enum { options } = &field.ty {
        mapped = mapped.with_cases(options.iter().map(EnumCase::from_option).collect());
    }
    if field.ty.is_reference() {
        let first = candidates.first()?;
        mapped = mapped.with_collection(first.collection_id.clone());
    }

    Some(mapped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapped::HostFieldType;

    fn index_with(data_source: &str, collection: &str) -> ReferenceIndex {
        let mut index = ReferenceIndex::new();
        index.insert(
            data_source,
            ReferenceCandidate::new(CollectionId::new(collection), collection),
        );
        index
    }

    #[test]
    fn new_fields_are_synthesized_and_flagged() {
        let source = vec![SourceField::new("Title", SourceFieldType::String)];
        let configs = compute_field_configs(&[], &source, &ReferenceIndex::new());

        assert_eq!(configs.len(), 1);
        assert!(configs[0].is_new);
        assert!(!configs[0].ignored);
        let mapped = configs[0].mapped.as_ref().unwrap();
        assert_eq!(mapped.id, FieldId::from_name("Title"));
        assert_eq!(mapped.ty, HostFieldType::PlainText);
    }

    #[test]
    fn existing_field_is_reused_verbatim_preserving_rename() {
        let source = vec![SourceField::new("Title", SourceFieldType::String)];
        let renamed = MappedField::new(FieldId::from_name("Title"), "Headline", HostFieldType::PlainText);

        let first = compute_field_configs(&[], &source, &ReferenceIndex::new());
        let second = compute_field_configs(&[renamed], &source, &ReferenceIndex::new());

        let first_mapped = first[0].mapped.as_ref().unwrap();
        let second_mapped = second[0].mapped.as_ref().unwrap();
        assert_eq!(first_mapped.id, second_mapped.id);
        assert_eq!(second_mapped.name, "Headline");
        assert!(!second[0].is_new);
    }

    #[test]
    fn enum_field_populates_cases_from_options() {
        let source = vec![SourceField::new(
            "Category",
            SourceFieldType::Enum {
                options: vec!["news".to_string(), "blog".to_string()],
            },
        )];
        let configs = compute_field_configs(&[], &source, &ReferenceIndex::new());

        let mapped = configs[0].mapped.as_ref().unwrap();
        assert_eq!(mapped.ty, HostFieldType::Enum);
        assert_eq!(mapped.cases.len(), 2);
        assert_eq!(mapped.cases[0].id, "news");
        assert_eq!(mapped.cases[0].name, "news");
    }

    #[test]
    fn reference_resolves_to_first_candidate() {
        let source = vec![SourceField::new(
            "Author",
            SourceFieldType::Reference {
                target_data_source_id: "authors".to_string(),
            },
        )];
        let configs = compute_field_configs(&[], &source, &index_with("authors", "col-authors"));

        let mapped = configs[0].mapped.as_ref().unwrap();
        assert_eq!(mapped.collection_id, Some(CollectionId::new("col-authors")));
        assert!(!configs[0].missing_reference);
        assert!(configs[0].is_active());
    }

    #[test]
    fn reference_without_candidates_is_forced_ignored() {
        let source = vec![SourceField::new(
            "Author",
            SourceFieldType::Reference {
                target_data_source_id: "authors".to_string(),
            },
        )];
        let mut configs = compute_field_configs(&[], &source, &ReferenceIndex::new());

        assert!(configs[0].missing_reference);
        assert!(configs[0].ignored);
        // Cannot be re-enabled while the reference target is missing.
        configs[0].set_ignored(false);
        assert!(configs[0].ignored);
    }

    #[test]
    fn unsupported_type_has_no_mapping_and_is_ignored() {
        let source = vec![SourceField::new(
            "Tags",
            SourceFieldType::MultiReference {
                target_data_source_id: "tags".to_string(),
            },
        )];
        let configs = compute_field_configs(&[], &source, &index_with("tags", "col-tags"));

        assert!(configs[0].mapped.is_none());
        assert!(configs[0].ignored);
        assert!(!configs[0].is_active());
    }

    #[test]
    fn empty_rename_reverts_to_source_name() {
        let source = vec![SourceField::new("Title", SourceFieldType::String)];
        let mut configs = compute_field_configs(&[], &source, &ReferenceIndex::new());

        configs[0].rename("   ");
        assert_eq!(configs[0].mapped.as_ref().unwrap().name, "Title");
        configs[0].rename("Headline");
        assert_eq!(configs[0].mapped.as_ref().unwrap().name, "Headline");
    }
}
