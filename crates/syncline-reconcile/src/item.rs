//! Source and synced item records

use crate::value::FieldValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use syncline_field::{FieldId, ItemId};

/// One record as fetched from the external data source
///
/// Raw values are kept as untyped JSON until reconciliation projects
/// them through the field configuration. Items are recomputed in full on
/// every sync; only item *ids* are diffed, never field values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SourceItem {
    /// The source's own identifier, when it has one
    pub native_id: Option<String>,
    /// Slug persisted for this record by a previous sync, if any
    pub known_slug: Option<String>,
    /// Raw values keyed by source field id
    pub fields: IndexMap<FieldId, Value>,
}

impl SourceItem {
    /// Create an empty record
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the source-native identifier
    #[inline]
    #[must_use]
    pub fn with_native_id(mut self, id: impl Into<String>) -> Self {
        self.native_id = Some(id.into());
        self
    }

    /// Set the slug remembered from a previous sync
    #[inline]
    #[must_use]
    pub fn with_known_slug(mut self, slug: impl Into<String>) -> Self {
        self.known_slug = Some(slug.into());
        self
    }

    /// Add a raw field value
    #[inline]
    #[must_use]
    pub fn with_field(mut self, id: FieldId, value: Value) -> Self {
        self.fields.insert(id, value);
        self
    }

    /// Add a raw field value keyed by field name
    #[inline]
    #[must_use]
    pub fn with_named_field(self, name: &str, value: Value) -> Self {
        self.with_field(FieldId::from_name(name), value)
    }
}

/// One record in the shape the host's `add_items` call expects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncItem {
    /// Stable id hashed from the slug
    pub id: ItemId,
    /// Resolved, possibly disambiguated slug
    pub slug: String,
    /// Typed values keyed by mapped field id
    pub field_data: IndexMap<FieldId, FieldValue>,
    /// Whether the item is a draft; always false for synced items
    pub draft: bool,
}

impl SyncItem {
    /// Create a published item
    #[inline]
    #[must_use]
    pub fn new(id: ItemId, slug: impl Into<String>, field_data: IndexMap<FieldId, FieldValue>) -> Self {
        Self {
            id,
            slug: slug.into(),
            field_data,
            draft: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_keys_fields_by_name_hash() {
        let item = SourceItem::new()
            .with_native_id("rec1")
            .with_named_field("Title", json!("Hello"));
        assert_eq!(
            item.fields.get(&FieldId::from_name("Title")),
            Some(&json!("Hello"))
        );
    }

    #[test]
    fn sync_item_serializes_camel_case() {
        let mut field_data = IndexMap::new();
        field_data.insert(
            FieldId::from_name("Body"),
            FieldValue::PlainText("x".to_string()),
        );
        let item = SyncItem::new(ItemId::from_slug("hello"), "hello", field_data);

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["draft"], false);
        assert!(json["fieldData"].is_object());
        assert_eq!(json["slug"], "hello");
    }
}
