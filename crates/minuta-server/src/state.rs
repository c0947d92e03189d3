//! Shared application state.

use std::path::PathBuf;

use minuta_contract::ContractGenerator;
use minuta_core::MinutaConfig;
use minuta_store::SqliteStore;

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: MinutaConfig,
    pub store: SqliteStore,
    pub generator: ContractGenerator,
}

impl AppState {
    pub fn new(config: MinutaConfig, store: SqliteStore, generator: ContractGenerator) -> Self {
        Self {
            config,
            store,
            generator,
        }
    }

    /// Path of a generated contract, or `None` for names that could escape
    /// the output directory or are not documents.
    pub fn contract_path(&self, filename: &str) -> Option<PathBuf> {
        is_safe_filename(filename).then(|| self.config.output_dir.join(filename))
    }
}

pub fn is_safe_filename(filename: &str) -> bool {
    filename.len() > ".docx".len()
        && filename.ends_with(".docx")
        && !filename.contains("..")
        && !filename.contains('/')
        && !filename.contains('\\')
}
