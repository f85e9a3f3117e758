//! Error types for reconciliation

use syncline_field::FieldId;

/// Errors that fail a reconciliation pass outright
///
/// Everything else (bad slugs, unresolvable references, coercion
/// failures) is a [`SyncWarning`](crate::SyncWarning), never an error.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// The chosen slug field is not part of the field configuration
    #[error("slug field {0} is not in the field configuration")]
    UnknownSlugField(FieldId),

    /// The update-existing conflict policy has no implemented semantics
    #[error("the update-existing conflict policy is not implemented")]
    PolicyNotImplemented,
}
