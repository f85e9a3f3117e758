//! Testing utilities for the Syncline workspace
//!
//! Shared fixtures plus [`MemoryHost`], an in-memory [`PluginHost`]
//! that records mutation order and supports failure injection.

#![allow(missing_docs)]

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use syncline_field::{CollectionId, FieldId, ItemId, MappedField, SourceField, SourceFieldType};
use syncline_host::{CollectionInfo, HostError, MessageVariant, PluginHost};
use syncline_reconcile::{SourceItem, SyncItem};

/// In-memory plugin host for tests
///
/// Mutations are applied to plain maps and their order is recorded so
/// tests can assert the set-fields / remove / add contract.
#[derive(Debug, Default)]
pub struct MemoryHost {
    fields: Mutex<Vec<MappedField>>,
    items: DashMap<ItemId, SyncItem>,
    plugin_data: DashMap<String, String>,
    collections: Mutex<Vec<CollectionInfo>>,
    collection_data: DashMap<(CollectionId, String), String>,
    collection_slugs: DashMap<CollectionId, Vec<(String, ItemId)>>,
    calls: Mutex<Vec<&'static str>>,
    notifications: Mutex<Vec<(String, MessageVariant)>>,
    closed: Mutex<Option<(String, MessageVariant)>>,
    fail_adds: AtomicBool,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sibling collection, optionally tagged with the data
    /// source it was synced from.
    pub fn seed_collection(&self, id: &str, name: &str, data_source: Option<&str>) {
        let collection = CollectionId::new(id);
        self.collections.lock().push(CollectionInfo {
            id: collection.clone(),
            name: name.to_string(),
        });
        if let Some(data_source) = data_source {
            self.collection_data.insert(
                (collection, "dataSourceId".to_string()),
                data_source.to_string(),
            );
        }
    }

    /// Seed the slug/id pairs of a sibling collection.
    pub fn seed_collection_slugs(&self, id: &str, slugs: &[(&str, ItemId)]) {
        self.collection_slugs.insert(
            CollectionId::new(id),
            slugs
                .iter()
                .map(|(slug, item)| ((*slug).to_string(), *item))
                .collect(),
        );
    }

    /// Make every `add_items` call fail until reset.
    pub fn fail_adds(&self, fail: bool) {
        self.fail_adds.store(fail, Ordering::SeqCst);
    }

    pub fn stored_fields(&self) -> Vec<MappedField> {
        self.fields.lock().clone()
    }

    pub fn stored_item_ids(&self) -> Vec<ItemId> {
        let mut ids: Vec<ItemId> = self.items.iter().map(|entry| *entry.key()).collect();
        ids.sort_unstable();
        ids
    }

    pub fn stored_item(&self, id: ItemId) -> Option<SyncItem> {
        self.items.get(&id).map(|entry| entry.clone())
    }

    pub fn stored_plugin_data(&self, key: &str) -> Option<String> {
        self.plugin_data.get(key).map(|entry| entry.clone())
    }

    /// Names of the mutating calls, in the order they arrived.
    pub fn mutation_calls(&self) -> Vec<&'static str> {
        self.calls.lock().clone()
    }

    pub fn notifications(&self) -> Vec<(String, MessageVariant)> {
        self.notifications.lock().clone()
    }

    pub fn close_message(&self) -> Option<(String, MessageVariant)> {
        self.closed.lock().clone()
    }
}

#[async_trait]
impl PluginHost for MemoryHost {
    async fn get_fields(&self) -> Result<Vec<MappedField>, HostError> {
        Ok(self.fields.lock().clone())
    }

    async fn set_fields(&self, fields: &[MappedField]) -> Result<(), HostError> {
        self.calls.lock().push("set_fields");
        *self.fields.lock() = fields.to_vec();
        Ok(())
    }

    async fn get_item_ids(&self) -> Result<Vec<ItemId>, HostError> {
        Ok(self.stored_item_ids())
    }

    async fn add_items(&self, items: &[SyncItem]) -> Result<(), HostError> {
        self.calls.lock().push("add_items");
        if self.fail_adds.load(Ordering::SeqCst) {
            return Err(HostError::call_failed("add_items", "injected failure"));
        }
        for item in items {
            self.items.insert(item.id, item.clone());
        }
        Ok(())
    }

    async fn remove_items(&self, ids: &[ItemId]) -> Result<(), HostError> {
        self.calls.lock().push("remove_items");
        for id in ids {
            self.items.remove(id);
        }
        Ok(())
    }

    async fn get_plugin_data(&self, key: &str) -> Result<Option<String>, HostError> {
        Ok(self.plugin_data.get(key).map(|entry| entry.clone()))
    }

    async fn set_plugin_data(&self, key: &str, value: &str) -> Result<(), HostError> {
        self.calls.lock().push("set_plugin_data");
        self.plugin_data.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn list_collections(&self) -> Result<Vec<CollectionInfo>, HostError> {
        Ok(self.collections.lock().clone())
    }

    async fn get_collection_plugin_data(
        &self,
        collection: &CollectionId,
        key: &str,
    ) -> Result<Option<String>, HostError> {
        Ok(self
            .collection_data
            .get(&(collection.clone(), key.to_string()))
            .map(|entry| entry.clone()))
    }

    async fn get_collection_item_slugs(
        &self,
        collection: &CollectionId,
    ) -> Result<Vec<(String, ItemId)>, HostError> {
        Ok(self
            .collection_slugs
            .get(collection)
            .map(|entry| entry.clone())
            .unwrap_or_default())
    }

    async fn notify(&self, message: &str, variant: MessageVariant) {
        self.notifications.lock().push((message.to_string(), variant));
    }

    async fn close_plugin(&self, message: &str, variant: MessageVariant) {
        *self.closed.lock() = Some((message.to_string(), variant));
    }
}

pub fn text_source_field(name: &str) -> SourceField {
    SourceField::new(name, SourceFieldType::String)
}

pub fn reference_source_field(name: &str, target: &str) -> SourceField {
    SourceField::new(
        name,
        SourceFieldType::Reference {
            target_data_source_id: target.to_string(),
        },
    )
}

pub fn item_with(fields: &[(&str, Value)]) -> SourceItem {
    fields
        .iter()
        .fold(SourceItem::new(), |item, (name, value)| {
            item.with_named_field(name, value.clone())
        })
}

pub fn field_id(name: &str) -> FieldId {
    FieldId::from_name(name)
}
