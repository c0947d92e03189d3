//! Template inspection: which `[FIELD]` tokens a template carries.

use std::collections::BTreeSet;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::error;

use minuta_core::Result;
use minuta_docx::{wml, Document};

static FIELD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]+)\]").unwrap());

/// Health report for a template file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateInfo {
    pub valid: bool,
    pub path: String,
    pub paragraphs_count: usize,
    pub tables_count: usize,
    pub fields_found: Vec<String>,
    pub error: Option<String>,
}

/// Distinct field names in `text`, brackets stripped.
pub fn fields_in(text: &str) -> impl Iterator<Item = &str> {
    FIELD_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
}

fn document_fields(doc: &Document) -> Vec<String> {
    let mut fields = BTreeSet::new();
    for paragraph in doc.paragraphs() {
        let text = wml::paragraph_text(paragraph);
        fields.extend(fields_in(&text).map(String::from));
    }
    for table in doc.tables() {
        for row in wml::table_cells(table) {
            for cell in row {
                fields.extend(fields_in(&cell).map(String::from));
            }
        }
    }
    fields.into_iter().collect()
}

/// Sorted field names found in body paragraphs and table cells.
///
/// An unreadable template yields an empty list.
pub fn template_fields(path: &Path) -> Vec<String> {
    match Document::open(path) {
        Ok(doc) => document_fields(&doc),
        Err(e) => {
            error!("Could not read template fields from {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

fn try_inspect(path: &Path) -> Result<TemplateInfo> {
    let doc = Document::open(path)?;
    Ok(TemplateInfo {
        valid: true,
        path: path.display().to_string(),
        paragraphs_count: doc.paragraphs().count(),
        tables_count: doc.tables().count(),
        fields_found: document_fields(&doc),
        error: None,
    })
}

/// Never fails; a broken template is reported with `valid: false`.
pub fn inspect(path: &Path) -> TemplateInfo {
    try_inspect(path).unwrap_or_else(|e| TemplateInfo {
        valid: false,
        path: path.display().to_string(),
        paragraphs_count: 0,
        tables_count: 0,
        fields_found: Vec::new(),
        error: Some(e.to_string()),
    })
}
