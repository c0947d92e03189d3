//! Minuta Store — SQLite company registry.
//!
//! Two tables: `companies` holds the listing columns, `companies_data` the
//! full spreadsheet row as JSON. Contract generation only reads
//! [`SqliteStore::get_company`]; the importer writes through
//! [`SqliteStore::sync_companies`].

pub mod schema;
pub mod sqlite;
pub mod types;

pub use sqlite::SqliteStore;
pub use types::*;
