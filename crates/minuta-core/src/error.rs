//! Error types for Minuta.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Required generation fields are empty. Lists every missing field.
    #[error("Missing required fields: {}", missing.join(", "))]
    Validation { missing: Vec<String> },

    #[error("Template not found: {}", .0.display())]
    TemplateLoad(PathBuf),

    #[error("Document error: {0}")]
    Docx(String),

    #[error("Reconstruction error: {0}")]
    Reconstruction(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Field names carried by a validation failure, empty for other variants.
    pub fn missing_fields(&self) -> &[String] {
        match self {
            Self::Validation { missing } => missing,
            _ => &[],
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_lists_all_fields() {
        let err = Error::Validation {
            missing: vec!["legal_name".into(), "address".into()],
        };
        assert_eq!(err.to_string(), "Missing required fields: legal_name, address");
        assert_eq!(err.missing_fields().len(), 2);
    }

    #[test]
    fn test_missing_fields_empty_for_other_variants() {
        let err = Error::NotFound("12345".into());
        assert!(err.missing_fields().is_empty());
    }
}
