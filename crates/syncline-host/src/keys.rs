//! Plugin-data keys persisted on the managed collection
//!
//! Values are plain strings; there is no schema versioning. The pair
//! below is what lets a relaunch auto-resync without re-prompting.

/// Key holding the id of the data source this collection syncs from
pub const DATA_SOURCE_ID: &str = "dataSourceId";

/// Key holding the id of the field that drives slug resolution
pub const SLUG_FIELD_ID: &str = "slugFieldId";
