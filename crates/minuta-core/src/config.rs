//! Configuration and data directory management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Paths to all Minuta data directories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root data directory (e.g., `data/`).
    pub root: PathBuf,
    /// Company database directory (`data/db/`).
    pub db: PathBuf,
    /// Contract templates (`data/templates/`).
    pub templates: PathBuf,
}

impl DataPaths {
    /// Create data paths from a root directory. Creates directories if needed.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        let paths = Self {
            db: root.join("db"),
            templates: root.join("templates"),
            root,
        };
        paths.ensure_dirs()?;
        Ok(paths)
    }

    /// Create all required directories.
    fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.db)?;
        std::fs::create_dir_all(&self.templates)?;
        Ok(())
    }

    /// Default location of the contract template.
    pub fn default_template(&self) -> PathBuf {
        self.templates.join("contrato.docx")
    }
}

/// Top-level Minuta configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinutaConfig {
    /// HTTP server port.
    pub port: u16,
    /// Data directory paths.
    pub data_paths: DataPaths,
    /// Contract template used by the generator.
    pub template_path: PathBuf,
    /// Where generated and edited contracts are written.
    pub output_dir: PathBuf,
    /// Executable used for document-to-PDF conversion.
    pub pdf_converter: String,
    /// Upper bound on a single PDF conversion, in seconds.
    pub convert_timeout_secs: u64,
}

impl MinutaConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env(data_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(5000);

        let data_paths = DataPaths::new(data_dir)?;

        let template_path = std::env::var("MINUTA_TEMPLATE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_paths.default_template());

        let output_dir = std::env::var("MINUTA_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| std::env::temp_dir());
        std::fs::create_dir_all(&output_dir)?;

        let pdf_converter =
            std::env::var("MINUTA_PDF_CONVERTER").unwrap_or_else(|_| "soffice".to_string());

        let convert_timeout_secs = std::env::var("MINUTA_CONVERT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(60);

        Ok(Self {
            port,
            data_paths,
            template_path,
            output_dir,
            pdf_converter,
            convert_timeout_secs,
        })
    }

    pub fn convert_timeout(&self) -> Duration {
        Duration::from_secs(self.convert_timeout_secs)
    }
}
