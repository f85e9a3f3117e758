//! Collection-side field model
//!
//! A [`MappedField`] is the managed-collection projection of a
//! [`SourceField`](crate::source::SourceField): same id, possibly a
//! user-renamed label, and a host type computed from the fixed mapping
//! table in [`map_source_type`].

use crate::hash::FieldId;
use crate::source::SourceFieldType;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Identifier of a managed collection
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CollectionId(String);

impl CollectionId {
    /// Wrap a host-issued collection id
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw id string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CollectionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CollectionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Field type understood by the plugin host's collection model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HostFieldType {
    /// Plain text
    PlainText,
    /// Number
    Number,
    /// Boolean
    Boolean,
    /// Date, stored as a UTC string
    Date,
    /// Color
    Color,
    /// Closed option set
    Enum,
    /// Rich text
    FormattedText,
    /// Image URL
    Image,
    /// Link URL
    Link,
    /// File URL
    File,
    /// Reference to an item of another managed collection
    CollectionReference,
}

/// One case of an enum-typed collection field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumCase {
    /// Case id (the source option string)
    pub id: String,
    /// Case label (the same option string)
    pub name: String,
}

impl EnumCase {
    /// Build a case from a source option string
    #[inline]
    #[must_use]
    pub fn from_option(option: impl Into<String>) -> Self {
        let option = option.into();
        Self {
            id: option.clone(),
            name: option,
        }
    }
}

/// A field of the managed collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappedField {
    /// Stable id; always equals the originating source field's id
    pub id: FieldId,
    /// Display name; user-editable and preserved across syncs
    pub name: String,
    /// Collection-side type
    #[serde(rename = "type")]
    pub ty: HostFieldType,
    /// Target collection, present only for reference types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<CollectionId>,
    /// Enum cases, non-empty only for enum types
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cases: Vec<EnumCase>,
}

impl MappedField {
    /// Create a plain field of the given type
    #[inline]
    #[must_use]
    pub fn new(id: FieldId, name: impl Into<String>, ty: HostFieldType) -> Self {
        Self {
            id,
            name: name.into(),
            ty,
            collection_id: None,
            cases: Vec::new(),
        }
    }

    /// Attach a reference target collection
    #[inline]
    #[must_use]
    pub fn with_collection(mut self, collection_id: CollectionId) -> Self {
        self.collection_id = Some(collection_id);
        self
    }

    /// Attach enum cases
    #[inline]
    #[must_use]
    pub fn with_cases(mut self, cases: Vec<EnumCase>) -> Self {
        self.cases = cases;
        self
    }
}

/// The fixed source-type to host-type mapping table
///
/// Returns `None` for source types the collection model cannot hold
/// (multi-references). Types this core does not recognize degrade to
/// plain text so one odd field never blocks the rest of the sync.
#[must_use]
pub fn map_source_type(ty: &SourceFieldType) -> Option<HostFieldType> {
    match ty {
        SourceFieldType::String => Some(HostFieldType::PlainText),
        SourceFieldType::Number => Some(HostFieldType::Number),
        SourceFieldType::Boolean => Some(HostFieldType::Boolean),
        SourceFieldType::Date => Some(HostFieldType::Date),
        SourceFieldType::Color => Some(HostFieldType::Color),
        SourceFieldType::Enum { .. } => Some(HostFieldType::Enum),
        SourceFieldType::FormattedText => Some(HostFieldType::FormattedText),
        SourceFieldType::Image => Some(HostFieldType::Image),
        SourceFieldType::Link => Some(HostFieldType::Link),
        SourceFieldType::File => Some(HostFieldType::File),
        SourceFieldType::Reference { .. } => Some(HostFieldType::CollectionReference),
        SourceFieldType::MultiReference { .. } => None,
        SourceFieldType::Unknown => Some(HostFieldType::PlainText),
    }
}
