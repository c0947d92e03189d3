//! Edit Reconstructor: rebuild a document from edited plain text.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::table_json;
use minuta_core::{Error, Result};
use minuta_docx::Document;

/// `<dir>/<stem>_edited.<ext>` for `original`.
pub fn edited_path(original: &Path) -> PathBuf {
    let stem = original
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "contrato".to_string());
    let name = match original.extension() {
        Some(ext) => format!("{}_edited.{}", stem, ext.to_string_lossy()),
        None => format!("{}_edited", stem),
    };
    original.with_file_name(name)
}

/// Build a fresh document from the plain representation, one pass.
///
/// Marker lines become tables; a marker line whose payload does not decode
/// is kept as a literal paragraph and the pass continues.
pub fn build_document(edited: &str) -> Document {
    let mut doc = Document::new();
    for (number, line) in edited.split('\n').enumerate() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if table_json::is_table_line(line) {
            match table_json::parse(line) {
                Ok(rows) => {
                    doc.add_table(&rows);
                    continue;
                }
                Err(e) => warn!("Line {}: table kept as text: {}", number + 1, e),
            }
        }
        doc.add_paragraph(line);
    }
    doc
}

/// Write the edited document next to `original`; returns its path.
pub fn reconstruct(original: &Path, edited: &str) -> Result<PathBuf> {
    let output = edited_path(original);
    let mut doc = build_document(edited);
    doc.save(&output)
        .map_err(|e| Error::Reconstruction(format!("{}: {}", output.display(), e)))?;
    info!("Reconstructed document written to {}", output.display());
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use minuta_docx::{wml, Block};
    use tempfile::TempDir;

    #[test]
    fn test_edited_path() {
        assert_eq!(
            edited_path(Path::new("/tmp/contrato_123_ab.docx")),
            PathBuf::from("/tmp/contrato_123_ab_edited.docx")
        );
        assert_eq!(edited_path(Path::new("x")), PathBuf::from("x_edited"));
    }

    #[test]
    fn test_ragged_table_is_padded() {
        let doc = build_document(r#"[TABLE_JSON][["A","B","C"],["D"]][/TABLE_JSON]"#);
        let blocks = doc.blocks();
        assert_eq!(blocks.len(), 1);
        let Block::Table(table) = blocks[0] else {
            panic!("expected a table");
        };
        assert_eq!(
            wml::table_cells(table),
            vec![vec!["A", "B", "C"], vec!["D", "", ""]]
        );
    }

    #[test]
    fn test_malformed_table_becomes_paragraph() {
        let doc = build_document("antes\n[TABLE_JSON]{not valid json[/TABLE_JSON]\ndepois");
        assert_eq!(
            doc.paragraph_texts(),
            ["antes", "[TABLE_JSON]{not valid json[/TABLE_JSON]", "depois"]
        );
        assert_eq!(doc.tables().count(), 0);
    }

    #[test]
    fn test_empty_lines_and_crlf() {
        let doc = build_document("um\r\n\r\ndois\r\n");
        assert_eq!(doc.paragraph_texts(), ["um", "", "dois", ""]);
    }

    #[test]
    fn test_reconstruct_writes_next_to_original() {
        let dir = TempDir::new().unwrap();
        let original = dir.path().join("contrato.docx");

        let path = reconstruct(&original, "Linha 1\nLinha 2").unwrap();
        assert_eq!(path, dir.path().join("contrato_edited.docx"));
        assert_eq!(
            Document::open(&path).unwrap().paragraph_texts(),
            ["Linha 1", "Linha 2"]
        );
    }

    #[test]
    fn test_unwritable_output_is_an_error() {
        let dir = TempDir::new().unwrap();
        // The parent of the output is a regular file.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();
        let err = reconstruct(&blocker.join("c.docx"), "texto").unwrap_err();
        assert!(matches!(err, Error::Reconstruction(_)));
    }
}
