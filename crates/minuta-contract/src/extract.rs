//! Content Extractor: a document as newline-joined editable text.

use std::path::Path;

use tracing::{debug, warn};

use crate::table_json;
use minuta_core::Result;
use minuta_docx::{scan, wml, Block, Document};

/// Plain representation of the document at `path`.
///
/// Never fails. When the document cannot be fully read, only the top-level
/// paragraph text is returned (tables lost), and if even that scan fails the
/// result is empty.
pub fn extract(path: &Path) -> String {
    match extract_full(path) {
        Ok(text) => text,
        Err(e) => {
            warn!("Full extraction of {} failed, degrading: {}", path.display(), e);
            match scan::paragraph_texts(path) {
                Ok(lines) => lines.join("\n"),
                Err(e) => {
                    warn!("Paragraph scan of {} failed: {}", path.display(), e);
                    String::new()
                }
            }
        }
    }
}

/// Strict extraction; errors instead of degrading.
pub fn extract_full(path: &Path) -> Result<String> {
    let doc = Document::open(path)?;
    render(&doc)
}

/// Walk the body in document order. Empty paragraphs become empty lines;
/// tables with any text become a marker line between two blank lines.
pub fn render(doc: &Document) -> Result<String> {
    let mut lines = Vec::new();
    let mut skipped = 0usize;

    for block in doc.blocks() {
        match block {
            Block::Paragraph(p) => lines.push(wml::paragraph_text(p)),
            Block::Table(t) => {
                let rows: Vec<Vec<String>> = wml::table_cells(t)
                    .into_iter()
                    .map(|row| row.into_iter().map(|c| c.trim().to_string()).collect())
                    .collect();
                if rows.iter().flatten().all(|c| c.is_empty()) {
                    skipped += 1;
                    continue;
                }
                lines.push(String::new());
                lines.push(table_json::encode(&rows)?);
                lines.push(String::new());
            }
        }
    }

    debug!("Extracted {} lines ({} empty tables skipped)", lines.len(), skipped);
    Ok(lines.join("\n"))
}
