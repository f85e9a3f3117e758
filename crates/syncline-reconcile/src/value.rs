//! Typed field values and per-type coercion
//!
//! [`FieldValue`] is the `{type, value}` wrapper the host expects for
//! item field data. [`coerce_value`] projects a raw source value through
//! a mapped field's type; coercion failures yield `None` and the caller
//! records a warning, so one bad value never fails a sync.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use syncline_field::{CollectionId, HostFieldType, ItemId, MappedField};

/// A typed field value in the host's `{type, value}` wire shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum FieldValue {
    /// Plain text
    PlainText(String),
    /// Number
    Number(f64),
    /// Boolean
    Boolean(bool),
    /// Date as a UTC RFC 3339 string
    Date(String),
    /// Color
    Color(String),
    /// Enum case id
    Enum(String),
    /// Rich text
    FormattedText(String),
    /// Image URL
    Image(String),
    /// Link URL
    Link(String),
    /// File URL
    File(String),
    /// Stable id of an item in the referenced collection
    CollectionReference(ItemId),
}

/// Slug-to-item-id lookup maps, one per referenced collection
///
/// Each map is fetched once per sync pass, before reconciliation starts,
/// so reference coercion never issues network calls.
#[derive(Debug, Clone, Default)]
pub struct ReferenceResolver {
    maps: HashMap<CollectionId, HashMap<String, ItemId>>,
}

impl ReferenceResolver {
    /// Create an empty resolver
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the slug map of a referenced collection
    pub fn insert_collection(
        &mut self,
        collection: CollectionId,
        slugs: impl IntoIterator<Item = (String, ItemId)>,
    ) {
        self.maps.insert(collection, slugs.into_iter().collect());
    }

    /// Whether a collection's slug map is already loaded
    #[inline]
    #[must_use]
    pub fn contains(&self, collection: &CollectionId) -> bool {
        self.maps.contains_key(collection)
    }

    /// Look up an item id by slug within a referenced collection
    #[inline]
    #[must_use]
    pub fn lookup(&self, collection: &CollectionId, slug: &str) -> Option<ItemId> {
        self.maps.get(collection)?.get(slug).copied()
    }
}

/// Coerce a raw source value to the mapped field's type
///
/// Returns `None` for null input, for values the target type cannot
/// represent (a non-numeric string in a number field, an unparseable
/// date), and for reference slugs with no match in the target
/// collection's slug map.
#[must_use]
pub fn coerce_value(
    raw: &Value,
    field: &MappedField,
    references: &ReferenceResolver,
) -> Option<FieldValue> {
    if raw.is_null() {
        return None;
    }
    match field.ty {
        HostFieldType::PlainText => stringify(raw).map(FieldValue::PlainText),
        HostFieldType::Color => stringify(raw).map(FieldValue::Color),
        HostFieldType::Enum => stringify(raw).map(FieldValue::Enum),
        HostFieldType::FormattedText => stringify(raw).map(FieldValue::FormattedText),
        HostFieldType::Image => stringify(raw).map(FieldValue::Image),
        HostFieldType::Link => stringify(raw).map(FieldValue::Link),
        HostFieldType::File => stringify(raw).map(FieldValue::File),
        HostFieldType::Number => coerce_number(raw).map(FieldValue::Number),
        HostFieldType::Boolean => Some(FieldValue::Boolean(coerce_boolean(raw))),
        HostFieldType::Date => coerce_date(raw).map(FieldValue::Date),
        HostFieldType::CollectionReference => {
            let collection = field.collection_id.as_ref()?;
            let slug = raw.as_str()?;
            references
                .lookup(collection, slug)
                .map(FieldValue::CollectionReference)
        }
    }
}

/// Scalar values stringify; arrays and objects do not
fn stringify(raw: &Value) -> Option<String> {
    match raw {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn coerce_number(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| !n.is_nan()),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// The fixed truthy-token set; everything else is false
fn coerce_boolean(raw: &Value) -> bool {
    match raw {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() == Some(1.0),
        Value::String(s) => {
            let token = s.trim();
            ["y", "yes", "true", "1"]
                .iter()
                .any(|t| token.eq_ignore_ascii_case(t))
        }
        _ => false,
    }
}

/// Parse a date string and normalize to UTC RFC 3339
fn coerce_date(raw: &Value) -> Option<String> {
    let text = raw.as_str()?.trim();
    let parsed = DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S").map(|dt| dt.and_utc())
        })
        .or_else(|_| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .map(|d| d.and_time(NaiveTime::MIN).and_utc())
        })
        .ok()?;
    Some(parsed.to_rfc3339())
}
