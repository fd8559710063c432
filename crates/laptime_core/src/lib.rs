//! Core logic for the lap board: a contact table with lap-time columns and
//! the bar chart projected from it.
//! This crate is the single source of truth for table and chart invariants.

pub mod chart;
pub mod config;
pub mod db;
pub mod duration;
pub mod logging;
pub mod model;
pub mod repo;
pub mod seed;
pub mod service;
pub mod store;
pub mod sync;

pub use chart::model::ChartModel;
pub use chart::projector::{project, project_record, ProjectionError, ProjectionResult};
pub use config::{BoardConfig, ConfigError};
pub use duration::{format_duration, parse_duration, DurationParseError};
pub use logging::{default_log_level, init_logging, logging_status, LogSettings, LoggingError};
pub use model::attribute::{AttributeError, AttributeSet, AttributeSpec};
pub use model::record::{Column, ColumnSelector, NewRecord, Record, RecordId};
pub use model::series::Series;
pub use repo::contact_repo::{ContactRepository, RepoError, RepoResult, SqliteContactRepository};
pub use seed::sample_contacts;
pub use service::contact_service::{ContactService, ServiceError, ServiceResult};
pub use store::row_store::{RowStore, SortKey, SortOrder, StoreError, StoreResult, ViewQuery};
pub use sync::bridge::{RowEvent, RowObserver, SubscriptionId, SyncBridge};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
