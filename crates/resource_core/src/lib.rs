//! Generic relational resource data-access layer.
//!
//! Resource managers run create/get/update/delete/list for any record type
//! implementing [`Resource`], returning a closed [`ResourceError`] set and
//! exchanging identifiers as canonical UUID text.

pub mod db;
pub mod error;
pub mod id;
pub mod logging;
pub mod manager;
pub mod model;
pub mod query;
pub mod store;

pub use db::{open_db, open_db_in_memory, DbError, DbOptions, DbResult};
pub use error::{translate_store_error, ResourceError, ResourceResult};
pub use id::{IdFormatError, RecordId};
pub use logging::{default_log_level, init_logging, logging_status, LogSettings};
pub use manager::ResourceManager;
pub use model::envelope::RecordEnvelope;
pub use model::{Patch, Resource};
pub use query::{
    FieldFilterBuilder, FilterValue, ListParams, ListQueryBuilder, QueryBuildError, SelectQuery,
    SortOrder,
};
pub use store::{SqliteStore, StoreClient};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
