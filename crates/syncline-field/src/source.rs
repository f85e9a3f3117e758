//! Source-side field model
//!
//! A [`SourceField`] describes one field of an external data source as
//! fetched at session start. Fields are immutable once fetched and are
//! re-fetched on every plugin launch.

use crate::hash::FieldId;
use serde::{Deserialize, Serialize};

/// Field type reported by an external data source
///
/// Tagged union over the closed set of types the sync core understands.
/// Unrecognized wire tags land in [`SourceFieldType::Unknown`] so a single
/// exotic field cannot fail the whole mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SourceFieldType {
    /// Plain string value
    String,
    /// Numeric value
    Number,
    /// Boolean value
    Boolean,
    /// Date or datetime value
    Date,
    /// Color value (hex or named)
    Color,
    /// Closed set of string options
    #[serde(rename_all = "camelCase")]
    Enum {
        /// The option strings, used as both case id and case label
        options: Vec<String>,
    },
    /// Rich/formatted text (HTML or markdown)
    FormattedText,
    /// Image URL
    Image,
    /// Arbitrary link URL
    Link,
    /// File URL
    File,
    /// Reference to a single record in another data source
    #[serde(rename_all = "camelCase")]
    Reference {
        /// Id of the data source the referenced records come from
        target_data_source_id: String,
    },
    /// Reference to multiple records in another data source
    #[serde(rename_all = "camelCase")]
    MultiReference {
        /// Id of the data source the referenced records come from
        target_data_source_id: String,
    },
    /// Any type this core does not recognize
    #[serde(other)]
    Unknown,
}

impl SourceFieldType {
    /// Whether this type references records in another data source
    #[inline]
    #[must_use]
    pub fn is_reference(&self) -> bool {
        matches!(self, Self::Reference { .. } | Self::MultiReference { .. })
    }

    /// The referenced data source id, for reference-typed fields
    #[inline]
    #[must_use]
    pub fn target_data_source_id(&self) -> Option<&str> {
        match self {
            Self::Reference {
                target_data_source_id,
            }
            | Self::MultiReference {
                target_data_source_id,
            } => Some(target_data_source_id),
            _ => None,
        }
    }
}

/// One field of an external data source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceField {
    /// Stable id, hashed from the field name
    pub id: FieldId,
    /// Display label as reported by the source
    pub name: String,
    /// Source-side type
    #[serde(flatten)]
    pub ty: SourceFieldType,
}

impl SourceField {
    /// Create a field, deriving its id from the name
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, ty: SourceFieldType) -> Self {
        let name = name.into();
        Self {
            id: FieldId::from_name(&name),
            name,
            ty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_id_derived_from_name() {
        let field = SourceField::new("Title", SourceFieldType::String);
        assert_eq!(field.id, FieldId::from_name("Title"));
    }

    #[test]
    fn reference_accessors() {
        let reference = SourceFieldType::Reference {
            target_data_source_id: "authors".to_string(),
        };
        assert!(reference.is_reference());
        assert_eq!(reference.target_data_source_id(), Some("authors"));

        assert!(!SourceFieldType::String.is_reference());
        assert_eq!(SourceFieldType::String.target_data_source_id(), None);
    }

    #[test]
    fn wire_shape_is_internally_tagged() {
        let field = SourceField::new(
            "Category",
            SourceFieldType::Enum {
                options: vec!["news".to_string(), "blog".to_string()],
            },
        );
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json["type"], "enum");
        assert_eq!(json["options"][0], "news");
        assert_eq!(json["name"], "Category");
    }

    #[test]
    fn unrecognized_wire_tag_becomes_unknown() {
        let json = serde_json::json!({
            "id": "0002b5c4",
            "name": "Geo",
            "type": "geopoint"
        });
        let field: SourceField = serde_json::from_value(json).unwrap();
        assert_eq!(field.ty, SourceFieldType::Unknown);
    }
}
