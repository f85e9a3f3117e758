//! Session orchestration
//!
//! [`SyncEngine`] ties the pieces together the way a plugin session
//! runs: scan collections for the reference index, merge field
//! configurations, reconcile fetched items, apply the plan. Terminal
//! failures end in a host `notify` toast or, when the bridge itself is
//! gone, `close_plugin`; there is no silent failure path.

use crate::apply::{apply_sync, SyncObserver};
use crate::error::{EngineError, HostError};
use crate::host::{MessageVariant, PluginHost};
use crate::keys;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use syncline_field::{
    compute_field_configs, FieldConfig, FieldId, HostFieldType, ItemId, MappedField,
    ReferenceCandidate, ReferenceIndex, SourceField,
};
use syncline_reconcile::{
    reconcile, ReconcileInput, ReconcileMode, ReferenceResolver, SourceItem, SyncWarning,
};
use syncline_slug::{CollisionSuffix, SlugResolver};

/// Tunables for one engine instance
#[derive(Debug, Clone, Copy)]
pub struct SyncConfig {
    /// Items per `add_items` batch
    pub batch_size: usize,
    /// Slug collision suffix format
    pub collision_suffix: CollisionSuffix,
    /// Mirror or merge reconciliation
    pub mode: ReconcileMode,
}

impl SyncConfig {
    /// Create the default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a batch size
    #[inline]
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// With a collision suffix format
    #[inline]
    #[must_use]
    pub fn with_collision_suffix(mut self, suffix: CollisionSuffix) -> Self {
        self.collision_suffix = suffix;
        self
    }

    /// With a reconciliation mode
    #[inline]
    #[must_use]
    pub fn with_mode(mut self, mode: ReconcileMode) -> Self {
        self.mode = mode;
        self
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            batch_size: 50,
            collision_suffix: CollisionSuffix::Counter,
            mode: ReconcileMode::Mirror,
        }
    }
}

/// The sync configuration persisted by a previous session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedSync {
    /// The data source that was synced
    pub data_source_id: String,
    /// The field that drove slug resolution
    pub slug_field: FieldId,
}

/// Inputs for one sync pass
#[derive(Debug)]
pub struct SyncRequest<'a> {
    /// Which data source the items came from
    pub data_source_id: &'a str,
    /// Which source field drives slug resolution
    pub slug_field: FieldId,
    /// The session's (possibly user-edited) field configuration
    pub configs: &'a [FieldConfig],
    /// The freshly fetched source items
    pub items: &'a [SourceItem],
}

/// Aggregate result of one sync pass
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    /// Items written
    pub added: usize,
    /// Items removed
    pub removed: usize,
    /// Items skipped (unresolvable slug, merge conflicts)
    pub skipped: usize,
    /// Add batches that failed
    pub failed_batches: usize,
    /// Every per-item warning recorded while reconciling
    pub warnings: Vec<SyncWarning>,
}

/// Session-scoped sync orchestrator
///
/// Holds the injected host bridge and a `syncing` guard that refuses
/// re-entrant syncs; the UI disables its submit control off the same
/// state.
pub struct SyncEngine {
    config: SyncConfig,
    host: Arc<dyn PluginHost>,
    syncing: AtomicBool,
}

impl SyncEngine {
    /// Create an engine around an injected host bridge
    #[inline]
    #[must_use]
    pub fn new(host: Arc<dyn PluginHost>, config: SyncConfig) -> Self {
        Self {
            config,
            host,
            syncing: AtomicBool::new(false),
        }
    }

    /// Get the configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Whether a sync pass is currently running
    #[inline]
    #[must_use]
    pub fn is_syncing(&self) -> bool {
        self.syncing.load(Ordering::SeqCst)
    }

    /// Scan every managed collection once and index it by the data
    /// source it was synced from
    ///
    /// # Errors
    /// Any [`HostError`] from the collection scan.
    pub async fn build_reference_index(&self) -> Result<ReferenceIndex, HostError> {
        let mut index = ReferenceIndex::new();
        for info in self.host.list_collections().await? {
            let data_source = self
                .host
                .get_collection_plugin_data(&info.id, keys::DATA_SOURCE_ID)
                .await?;
            if let Some(data_source) = data_source {
                index.insert(
                    data_source,
                    ReferenceCandidate::new(info.id.clone(), info.name.clone()),
                );
            }
        }
        tracing::debug!(data_sources = index.len(), "reference index built");
        Ok(index)
    }

    /// Merge the session's source fields with the collection's existing
    /// fields
    ///
    /// # Errors
    /// Any [`HostError`] from reading fields or scanning collections.
    pub async fn configure_fields(
        &self,
        source_fields: &[SourceField],
    ) -> Result<Vec<FieldConfig>, EngineError> {
        let existing = self.host.get_fields().await?;
        let references = self.build_reference_index().await?;
        Ok(compute_field_configs(&existing, source_fields, &references))
    }

    /// The sync configuration a previous session persisted, if any
    ///
    /// A corrupt saved slug-field id is treated as no saved state, so the
    /// user is re-prompted instead of the launch failing.
    ///
    /// # Errors
    /// Any [`HostError`] from the plugin-data reads.
    pub async fn saved_sync(&self) -> Result<Option<SavedSync>, EngineError> {
        let data_source_id = self.host.get_plugin_data(keys::DATA_SOURCE_ID).await?;
        let slug_field = self.host.get_plugin_data(keys::SLUG_FIELD_ID).await?;
        match (data_source_id, slug_field) {
            (Some(data_source_id), Some(raw)) => match raw.parse::<FieldId>() {
                Ok(slug_field) => Ok(Some(SavedSync {
                    data_source_id,
                    slug_field,
                })),
                Err(error) => {
                    tracing::warn!(%error, "ignoring corrupt saved slug field id");
                    Ok(None)
                }
            },
            _ => Ok(None),
        }
    }

    /// Run one full sync pass
    ///
    /// # Errors
    /// - [`EngineError::SyncInProgress`] when called re-entrantly
    /// - [`EngineError::MissingDataSource`] before any mutation when the
    ///   request has no data source
    /// - reconciliation and host errors, propagated
    pub async fn run_sync(
        &self,
        request: SyncRequest<'_>,
        observer: &mut dyn SyncObserver,
    ) -> Result<SyncReport, EngineError> {
        if self.syncing.swap(true, Ordering::SeqCst) {
            return Err(EngineError::SyncInProgress);
        }
        let result = self.run_locked(request, observer).await;
        self.syncing.store(false, Ordering::SeqCst);
        result
    }

    /// Run a sync pass and route the outcome to the user
    ///
    /// Success and non-fatal failure end in a `notify` toast; a dead host
    /// bridge ends in `close_plugin`.
    ///
    /// # Errors
    /// Same as [`SyncEngine::run_sync`]; the error is returned after
    /// being surfaced.
    pub async fn sync_and_notify(
        &self,
        request: SyncRequest<'_>,
        observer: &mut dyn SyncObserver,
    ) -> Result<SyncReport, EngineError> {
        match self.run_sync(request, observer).await {
            Ok(report) => {
                let message = if report.skipped > 0 {
                    format!("Synced {} items (skipped: {})", report.added, report.skipped)
                } else {
                    format!("Synced {} items", report.added)
                };
                self.host.notify(&message, MessageVariant::Success).await;
                Ok(report)
            }
            Err(error) => {
                if error.is_fatal() {
                    self.host
                        .close_plugin(&error.to_string(), MessageVariant::Error)
                        .await;
                } else {
                    self.host.notify(&error.to_string(), MessageVariant::Error).await;
                }
                Err(error)
            }
        }
    }

    async fn run_locked(
        &self,
        request: SyncRequest<'_>,
        observer: &mut dyn SyncObserver,
    ) -> Result<SyncReport, EngineError> {
        if request.data_source_id.trim().is_empty() {
            return Err(EngineError::MissingDataSource);
        }
        tracing::info!(
            data_source = request.data_source_id,
            items = request.items.len(),
            "starting sync"
        );

        let existing: HashSet<ItemId> = self.host.get_item_ids().await?.into_iter().collect();
        let references = self.load_reference_maps(request.configs).await?;

        let mut resolver = SlugResolver::new().with_suffix(self.config.collision_suffix);
        let plan = reconcile(
            ReconcileInput {
                items: request.items,
                configs: request.configs,
                slug_field: request.slug_field,
                existing: &existing,
                references: &references,
            },
            &mut resolver,
            self.config.mode,
        )?;
        tracing::debug!(
            to_add = plan.to_add.len(),
            to_remove = plan.to_remove.len(),
            warnings = plan.warnings.len(),
            "plan computed"
        );

        let fields: Vec<MappedField> = request
            .configs
            .iter()
            .filter(|config| config.is_active())
            .filter_map(|config| config.mapped.clone())
            .collect();

        let outcome = apply_sync(
            self.host.as_ref(),
            &plan,
            &fields,
            request.data_source_id,
            request.slug_field,
            self.config.batch_size,
            observer,
        )
        .await?;

        let report = SyncReport {
            added: outcome.added,
            removed: outcome.removed,
            skipped: plan.skipped(),
            failed_batches: outcome.failed_batches,
            warnings: plan.warnings,
        };
        tracing::info!(
            added = report.added,
            removed = report.removed,
            skipped = report.skipped,
            failed_batches = report.failed_batches,
            "sync complete"
        );
        Ok(report)
    }

    /// Fetch the slug map of every referenced collection, once each
    async fn load_reference_maps(
        &self,
        configs: &[FieldConfig],
    ) -> Result<ReferenceResolver, HostError> {
        let mut references = ReferenceResolver::new();
        for config in configs.iter().filter(|c| c.is_active()) {
            let Some(mapped) = config.mapped.as_ref() else {
                continue;
            };
            if mapped.ty != HostFieldType::CollectionReference {
                continue;
            }
            let Some(collection) = mapped.collection_id.as_ref() else {
                continue;
            };
            if references.contains(collection) {
                continue;
            }
            let slugs = self.host.get_collection_item_slugs(collection).await?;
            references.insert_collection(collection.clone(), slugs);
        }
        Ok(references)
    }
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("config", &self.config)
            .field("syncing", &self.syncing)
            .finish_non_exhaustive()
    }
}
