//! The reconciliation pass
//!
//! [`reconcile`] computes the minimal add/remove plan that brings a
//! managed collection's item set in line with the current state of an
//! external data source. The pass is idempotent: re-running it with an
//! unchanged source re-adds identical items (an upsert) and removes
//! nothing.

use crate::error::ReconcileError;
use crate::item::{SourceItem, SyncItem};
use crate::value::{coerce_value, FieldValue, ReferenceResolver};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use syncline_field::{FieldConfig, FieldId, HostFieldType, ItemId};
use syncline_slug::SlugResolver;

/// What to do when the destination already has an item with a slug
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
    /// Never overwrite an existing item; the only implemented policy
    #[default]
    Skip,
    /// Overwrite the existing item's fields
    ///
    /// Surfaced as a disabled placeholder; the merge semantics are an
    /// unresolved product decision and selecting this policy fails with
    /// [`ReconcileError::PolicyNotImplemented`].
    UpdateExisting,
}

/// How the source set relates to the destination collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconcileMode {
    /// The collection mirrors the source: upsert every source item and
    /// remove items that disappeared from the source
    #[default]
    Mirror,
    /// Merge into a collection that may hold foreign items: no removals,
    /// conflicts handled per the policy
    Merge {
        /// Conflict handling for items that already exist
        policy: ConflictPolicy,
    },
}

/// Why an item or field was skipped during reconciliation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarningReason {
    /// The chosen slug field held no usable value and no fallback existed
    MissingSlugValue,
    /// The raw item carried a field with no active configuration
    UnmappedField(FieldId),
    /// A reference slug had no match in the target collection
    UnresolvedReference {
        /// The reference field
        field: FieldId,
        /// The slug that failed to resolve
        slug: String,
    },
    /// The raw value could not be coerced to the mapped type
    CoercionFailed(FieldId),
    /// Merge mode skipped an item that already exists downstream
    SkippedExisting(ItemId),
}

/// A non-fatal problem recorded while reconciling one item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncWarning {
    /// The source record's native id, when known
    pub native_id: Option<String>,
    /// What went wrong
    pub reason: WarningReason,
}

/// The computed add/remove plan for one sync pass
#[derive(Debug, Clone, Default)]
pub struct SyncPlan {
    /// Items to upsert, in source order
    pub to_add: Vec<SyncItem>,
    /// Ids present downstream but absent from the source
    pub to_remove: Vec<ItemId>,
    /// Per-item problems; the sync continues past every one of them
    pub warnings: Vec<SyncWarning>,
}

impl SyncPlan {
    /// Number of items skipped rather than added
    #[inline]
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.warnings
            .iter()
            .filter(|w| {
                matches!(
                    w.reason,
                    WarningReason::MissingSlugValue | WarningReason::SkippedExisting(_)
                )
            })
            .count()
    }
}

/// Everything a reconciliation pass reads
#[derive(Debug)]
pub struct ReconcileInput<'a> {
    /// Freshly fetched source records
    pub items: &'a [SourceItem],
    /// The session's field configuration
    pub configs: &'a [FieldConfig],
    /// Which source field drives slug resolution
    pub slug_field: FieldId,
    /// Item ids currently persisted in the collection
    pub existing: &'a HashSet<ItemId>,
    /// Slug maps of referenced collections
    pub references: &'a ReferenceResolver,
}

/// Compute the add/remove plan for one pass
///
/// Every id resolved from the source is pruned from a working copy of
/// the existing-id set; whatever remains afterwards is exactly the
/// removal set. Items whose slug cannot be resolved are skipped with a
/// warning, never failing the pass.
///
/// # Errors
/// - [`ReconcileError::UnknownSlugField`] when the slug field is not in
///   the field configuration
/// - [`ReconcileError::PolicyNotImplemented`] for the update-existing
///   conflict policy
pub fn reconcile(
    input: ReconcileInput<'_>,
    resolver: &mut SlugResolver,
    mode: ReconcileMode,
) -> Result<SyncPlan, ReconcileError> {
    if let ReconcileMode::Merge {
        policy: ConflictPolicy::UpdateExisting,
    } = mode
    {
        return Err(ReconcileError::PolicyNotImplemented);
    }
    if !input.configs.iter().any(|c| c.source.id == input.slug_field) {
        return Err(ReconcileError::UnknownSlugField(input.slug_field));
    }

    let active: HashMap<FieldId, &FieldConfig> = input
        .configs
        .iter()
        .filter(|c| c.is_active())
        .map(|c| (c.source.id, c))
        .collect();

    let mut unsynced: HashSet<ItemId> = input.existing.clone();
    let mut plan = SyncPlan::default();

    for item in input.items {
        let raw_slug = item.fields.get(&input.slug_field);
        let Some(resolved) = resolver.resolve(
            raw_slug,
            item.known_slug.as_deref(),
            item.native_id.as_deref(),
        ) else {
            tracing::warn!(native_id = ?item.native_id, "skipping item with unresolvable slug");
            plan.warnings.push(SyncWarning {
                native_id: item.native_id.clone(),
                reason: WarningReason::MissingSlugValue,
            });
            continue;
        };

        unsynced.remove(&resolved.id);

        if let ReconcileMode::Merge { .. } = mode {
            if input.existing.contains(&resolved.id) {
                plan.warnings.push(SyncWarning {
                    native_id: item.native_id.clone(),
                    reason: WarningReason::SkippedExisting(resolved.id),
                });
                continue;
            }
        }

        let field_data = project_fields(item, &active, input.references, &mut plan.warnings);
        plan.to_add.push(SyncItem::new(resolved.id, resolved.slug, field_data));
    }

    if matches!(mode, ReconcileMode::Mirror) {
        plan.to_remove = unsynced.into_iter().collect();
        plan.to_remove.sort_unstable();
    }

    Ok(plan)
}

/// Project one item's raw values through the active field configuration
fn project_fields(
    item: &SourceItem,
    active: &HashMap<FieldId, &FieldConfig>,
    references: &ReferenceResolver,
    warnings: &mut Vec<SyncWarning>,
) -> IndexMap<FieldId, FieldValue> {
    let mut field_data = IndexMap::new();

    for (field_id, raw) in &item.fields {
        let Some(config) = active.get(field_id) else {
            tracing::warn!(field = %field_id, "skipping value for field missing from configuration");
            warnings.push(SyncWarning {
                native_id: item.native_id.clone(),
                reason: WarningReason::UnmappedField(*field_id),
            });
            continue;
        };
        // Active configs always carry a mapped field.
        let Some(mapped) = config.mapped.as_ref() else {
            continue;
        };

        if raw.is_null() {
            continue;
        }
        match coerce_value(raw, mapped, references) {
            Some(value) => {
                field_data.insert(*field_id, value);
            }
            None => {
                let reason = if mapped.ty == HostFieldType::CollectionReference {
                    WarningReason::UnresolvedReference {
                        field: *field_id,
                        slug: raw.as_str().unwrap_or_default().to_string(),
                    }
                } else {
                    WarningReason::CoercionFailed(*field_id)
                };
                tracing::warn!(field = %field_id, "skipping value that failed coercion");
                warnings.push(SyncWarning {
                    native_id: item.native_id.clone(),
                    reason,
                });
            }
        }
    }

    field_data
}

/// Convenience: reconcile raw values absent any prior state
///
/// Used by first-run flows where the collection is empty and every item
/// is new.
///
/// # Errors
/// Same as [`reconcile`].
pub fn reconcile_fresh(
    items: &[SourceItem],
    configs: &[FieldConfig],
    slug_field: FieldId,
    resolver: &mut SlugResolver,
) -> Result<SyncPlan, ReconcileError> {
    reconcile(
        ReconcileInput {
            items,
            configs,
            slug_field,
            existing: &HashSet::new(),
            references: &ReferenceResolver::new(),
        },
        resolver,
        ReconcileMode::Mirror,
    )
}
