//! The vendor REST client pattern
//!
//! One bearer-authenticated client per data source. Every response body
//! is validated against a JSON schema before typed deserialization, so a
//! vendor shape change fails loudly as [`VendorError::Malformed`] rather
//! than syncing garbage.

use crate::credentials::{CredentialStore, ACCESS_TOKEN_KEY};
use crate::error::VendorError;
use crate::pages::{fetch_pages, DEFAULT_PAGE_CONCURRENCY};
use async_trait::async_trait;
use jsonschema::JSONSchema;
use once_cell::sync::Lazy;
use schemars::{schema_for, JsonSchema};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use syncline_field::{FieldId, SourceField, SourceFieldType};
use syncline_reconcile::SourceItem;

/// An external set of typed records that can be mirrored into a
/// managed collection
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Stable id of this data source, persisted as plugin data
    fn data_source_id(&self) -> &str;

    /// Fetch the source's field list
    async fn fetch_fields(&self) -> Result<Vec<SourceField>, VendorError>;

    /// Fetch every source record, following pagination
    async fn fetch_items(&self) -> Result<Vec<SourceItem>, VendorError>;
}

/// Bearer-authenticated REST data source
///
/// Expects the vendor to expose `GET {base}/fields` and a paginated
/// `GET {base}/items?page=N`.
pub struct RestDataSource {
    http: reqwest::Client,
    base_url: String,
    data_source_id: String,
    credentials: Arc<dyn CredentialStore>,
    token_key: String,
    page_concurrency: usize,
}

impl RestDataSource {
    /// Create a client for one vendor endpoint
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        data_source_id: impl Into<String>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            data_source_id: data_source_id.into(),
            credentials,
            token_key: ACCESS_TOKEN_KEY.to_string(),
            page_concurrency: DEFAULT_PAGE_CONCURRENCY,
        }
    }

    /// Use a different credential key (vendors store tokens under their
    /// own names)
    #[inline]
    #[must_use]
    pub fn with_token_key(mut self, key: impl Into<String>) -> Self {
        self.token_key = key.into();
        self
    }

    /// Cap simultaneous page requests
    #[inline]
    #[must_use]
    pub fn with_page_concurrency(mut self, concurrency: usize) -> Self {
        self.page_concurrency = concurrency;
        self
    }

    /// GET a path and return the validated JSON body
    async fn get_validated(
        &self,
        path: &str,
        query: &[(&str, String)],
        schema: &JSONSchema,
    ) -> Result<Value, VendorError> {
        let token = self
            .credentials
            .get(&self.token_key)
            .ok_or(VendorError::MissingToken)?;

        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
        let response = self
            .http
            .get(&url)
            .query(query)
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(VendorError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let value: Value =
            serde_json::from_str(&body).map_err(|e| VendorError::malformed(e.to_string()))?;
        validate(schema, &value)?;
        Ok(value)
    }

    async fn get_items_page(&self, page: usize) -> Result<ItemsEnvelope, VendorError> {
        let value = self
            .get_validated("items", &[("page", page.to_string())], &ITEMS_VALIDATOR)
            .await?;
        deserialize_envelope(value)
    }
}

#[async_trait]
impl DataSource for RestDataSource {
    fn data_source_id(&self) -> &str {
        &self.data_source_id
    }

    async fn fetch_fields(&self) -> Result<Vec<SourceField>, VendorError> {
        let value = self.get_validated("fields", &[], &FIELDS_VALIDATOR).await?;
        let envelope: FieldsEnvelope = deserialize_envelope(value)?;
        Ok(envelope
            .fields
            .into_iter()
            .map(WireField::into_source_field)
            .collect())
    }

    async fn fetch_items(&self) -> Result<Vec<SourceItem>, VendorError> {
        let first = self.get_items_page(1).await?;
        let total_pages = first.total_pages.unwrap_or(1).max(1) as usize;
        tracing::debug!(total_pages, "fetching items");

        let mut wire_items = first.items;
        if total_pages > 1 {
            let rest = fetch_pages(2..=total_pages, self.page_concurrency, |page| async move {
                self.get_items_page(page).await.map(|env| env.items)
            })
            .await?;
            wire_items.extend(rest);
        }

        Ok(wire_items.into_iter().map(WireItem::into_source_item).collect())
    }
}

impl std::fmt::Debug for RestDataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestDataSource")
            .field("base_url", &self.base_url)
            .field("data_source_id", &self.data_source_id)
            .field("page_concurrency", &self.page_concurrency)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct FieldsEnvelope {
    fields: Vec<WireField>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct WireField {
    name: String,
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    options: Option<Vec<String>>,
    #[serde(default)]
    target_data_source_id: Option<String>,
}

impl WireField {
    fn into_source_field(self) -> SourceField {
        let ty = match self.ty.as_str() {
            "string" => SourceFieldType::String,
            "number" => SourceFieldType::Number,
            "boolean" => SourceFieldType::Boolean,
            "date" => SourceFieldType::Date,
            "color" => SourceFieldType::Color,
            "enum" => SourceFieldType::Enum {
                options: self.options.unwrap_or_default(),
            },
            "richText" | "formattedText" => SourceFieldType::FormattedText,
            "image" => SourceFieldType::Image,
            "link" => SourceFieldType::Link,
            "file" => SourceFieldType::File,
            "reference" | "collectionReference" => SourceFieldType::Reference {
                target_data_source_id: self.target_data_source_id.unwrap_or_default(),
            },
            "multiReference" | "multiCollectionReference" => SourceFieldType::MultiReference {
                target_data_source_id: self.target_data_source_id.unwrap_or_default(),
            },
            _ => SourceFieldType::Unknown,
        };
        SourceField::new(self.name, ty)
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct ItemsEnvelope {
    items: Vec<WireItem>,
    #[serde(default)]
    total_pages: Option<u32>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct WireItem {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    slug: Option<String>,
    #[serde(default)]
    fields: HashMap<String, Value>,
}

impl WireItem {
    fn into_source_item(self) -> SourceItem {
        let mut item = SourceItem::new();
        item.native_id = self.id;
        item.known_slug = self.slug;
        item.fields = self
            .fields
            .into_iter()
            .map(|(name, value)| (FieldId::from_name(&name), value))
            .collect();
        item
    }
}

// ---------------------------------------------------------------------
// Response schemas
// ---------------------------------------------------------------------

static FIELDS_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::to_value(schema_for!(FieldsEnvelope)).expect("schema serializes")
});
static FIELDS_VALIDATOR: Lazy<JSONSchema> =
    Lazy::new(|| JSONSchema::compile(&FIELDS_SCHEMA).expect("fields schema compiles"));

static ITEMS_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::to_value(schema_for!(ItemsEnvelope)).expect("schema serializes")
});
static ITEMS_VALIDATOR: Lazy<JSONSchema> =
    Lazy::new(|| JSONSchema::compile(&ITEMS_SCHEMA).expect("items schema compiles"));

fn validate(schema: &JSONSchema, value: &Value) -> Result<(), VendorError> {
    if let Err(errors) = schema.validate(value) {
        let detail = errors
            .map(|error| error.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(VendorError::Malformed { detail });
    }
    Ok(())
}

fn deserialize_envelope<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, VendorError> {
    serde_json::from_value(value).map_err(|e| VendorError::malformed(e.to_string()))
}
