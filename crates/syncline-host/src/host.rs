//! The plugin-host capability trait
//!
//! The host bridge is injected as an explicit capability object into
//! every function that needs host I/O, never referenced as ambient
//! global state, so the reconciliation logic runs under test without a
//! live host.

use crate::error::HostError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use syncline_field::{CollectionId, ItemId, MappedField};
use syncline_reconcile::SyncItem;

/// Severity of a user-visible host message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MessageVariant {
    /// Neutral information
    Info,
    /// Operation succeeded
    Success,
    /// Something is off but the plugin continues
    Warning,
    /// Operation failed
    Error,
}

/// A host-managed collection visible to the plugin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionInfo {
    /// Host collection id
    pub id: CollectionId,
    /// Display name
    pub name: String,
}

/// Async bridge to the plugin host
///
/// Mirrors the host's own surface; semantics of each call (atomicity,
/// ordering, error shape) are the host's, not ours. Mutating calls are
/// never retried here; a failed mutation surfaces to the caller and the
/// next idempotent re-sync self-heals.
#[async_trait]
pub trait PluginHost: Send + Sync {
    /// Fields currently configured on the managed collection
    async fn get_fields(&self) -> Result<Vec<MappedField>, HostError>;

    /// Replace the managed collection's field set
    async fn set_fields(&self, fields: &[MappedField]) -> Result<(), HostError>;

    /// Ids of every item currently persisted in the managed collection
    async fn get_item_ids(&self) -> Result<Vec<ItemId>, HostError>;

    /// Upsert items into the managed collection
    async fn add_items(&self, items: &[SyncItem]) -> Result<(), HostError>;

    /// Remove items from the managed collection
    async fn remove_items(&self, ids: &[ItemId]) -> Result<(), HostError>;

    /// Read a plugin-scoped key/value pair on the managed collection
    async fn get_plugin_data(&self, key: &str) -> Result<Option<String>, HostError>;

    /// Write a plugin-scoped key/value pair on the managed collection
    async fn set_plugin_data(&self, key: &str, value: &str) -> Result<(), HostError>;

    /// All collections the host manages for this plugin
    async fn list_collections(&self) -> Result<Vec<CollectionInfo>, HostError>;

    /// Read a plugin-scoped key/value pair on a sibling collection
    async fn get_collection_plugin_data(
        &self,
        collection: &CollectionId,
        key: &str,
    ) -> Result<Option<String>, HostError>;

    /// Slug/id pairs of a sibling collection's items
    ///
    /// Fetched once per referenced collection to build the slug lookup
    /// used by reference coercion.
    async fn get_collection_item_slugs(
        &self,
        collection: &CollectionId,
    ) -> Result<Vec<(String, ItemId)>, HostError>;

    /// Show a toast; the plugin stays open
    async fn notify(&self, message: &str, variant: MessageVariant);

    /// Close the plugin with a final message
    async fn close_plugin(&self, message: &str, variant: MessageVariant);
}
