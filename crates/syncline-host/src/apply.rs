//! Applying a sync plan to the host
//!
//! [`apply_sync`] is the one place that encodes the mutation ordering
//! contract: `set_fields` precedes `remove_items` precedes `add_items`,
//! so items never reference a field the collection schema does not hold
//! yet. There are no partial-application retries and no rollback.

use crate::error::HostError;
use crate::host::PluginHost;
use crate::keys;
use syncline_field::{FieldId, MappedField};
use syncline_reconcile::SyncPlan;

/// Progress of a batched item write, reported before each batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncProgress {
    /// 1-based index of the batch about to be written
    pub batch_index: usize,
    /// Total number of batches
    pub batch_total: usize,
    /// Items written so far
    pub items_done: usize,
    /// Items in the whole plan
    pub items_total: usize,
}

/// Receiver for batch progress, e.g. a UI progress bar
pub trait SyncObserver: Send {
    /// Called before each `add_items` batch goes out
    fn on_progress(&mut self, progress: &SyncProgress) {
        let _ = progress;
    }
}

/// Observer that ignores progress
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SyncObserver for NoopObserver {}

/// Counts from one applied sync plan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyOutcome {
    /// Items written through `add_items`
    pub added: usize,
    /// Items removed
    pub removed: usize,
    /// Add batches that failed; the remaining batches still ran
    pub failed_batches: usize,
}

/// Apply a plan: set fields, remove stale items, add in batches,
/// persist the sync configuration
///
/// Adds are chunked to `batch_size` and written sequentially; a failed
/// batch is counted and the loop continues. Failures of `set_fields`,
/// `remove_items` or the plugin-data writes surface directly.
///
/// # Errors
/// Any [`HostError`] from the non-batched calls.
pub async fn apply_sync(
    host: &dyn PluginHost,
    plan: &SyncPlan,
    fields: &[MappedField],
    data_source_id: &str,
    slug_field: FieldId,
    batch_size: usize,
    observer: &mut dyn SyncObserver,
) -> Result<ApplyOutcome, HostError> {
    let batch_size = batch_size.max(1);

    tracing::debug!(fields = fields.len(), "writing field configuration");
    host.set_fields(fields).await?;

    if !plan.to_remove.is_empty() {
        tracing::debug!(removing = plan.to_remove.len(), "removing stale items");
        host.remove_items(&plan.to_remove).await?;
    }

    let items_total = plan.to_add.len();
    let batch_total = items_total.div_ceil(batch_size);
    let mut added = 0;
    let mut failed_batches = 0;

    for (index, batch) in plan.to_add.chunks(batch_size).enumerate() {
        observer.on_progress(&SyncProgress {
            batch_index: index + 1,
            batch_total,
            items_done: added,
            items_total,
        });
        match host.add_items(batch).await {
            Ok(()) => added += batch.len(),
            Err(error) => {
                tracing::warn!(batch = index + 1, %error, "add batch failed, continuing");
                failed_batches += 1;
            }
        }
    }

    host.set_plugin_data(keys::DATA_SOURCE_ID, data_source_id).await?;
    host.set_plugin_data(keys::SLUG_FIELD_ID, &slug_field.to_string())
        .await?;

    Ok(ApplyOutcome {
        added,
        removed: plan.to_remove.len(),
        failed_batches,
    })
}
