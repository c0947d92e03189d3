//! The inline table micro-format.
//!
//! A table travels through the plain representation as one line:
//! `[TABLE_JSON]<json array of arrays of strings>[/TABLE_JSON]`.

use thiserror::Error;

pub const TABLE_BEGIN: &str = "[TABLE_JSON]";
pub const TABLE_END: &str = "[/TABLE_JSON]";

/// Why a marked line could not be read back as a table.
#[derive(Debug, Error)]
pub enum TableParseError {
    #[error("line is not framed by [TABLE_JSON]…[/TABLE_JSON]")]
    Unframed,
    #[error("invalid table JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("table has no columns")]
    Empty,
}

/// Serialize rows as a single marker line.
pub fn encode(rows: &[Vec<String>]) -> Result<String, serde_json::Error> {
    Ok(format!("{}{}{}", TABLE_BEGIN, serde_json::to_string(rows)?, TABLE_END))
}

/// Whether `line` is framed as a table, payload unchecked.
pub fn is_table_line(line: &str) -> bool {
    let line = line.trim();
    line.len() >= TABLE_BEGIN.len() + TABLE_END.len()
        && line.starts_with(TABLE_BEGIN)
        && line.ends_with(TABLE_END)
}

/// Decode a marker line into row-major cell strings.
pub fn parse(line: &str) -> Result<Vec<Vec<String>>, TableParseError> {
    if !is_table_line(line) {
        return Err(TableParseError::Unframed);
    }
    let line = line.trim();
    let payload = &line[TABLE_BEGIN.len()..line.len() - TABLE_END.len()];
    let rows: Vec<Vec<String>> = serde_json::from_str(payload)?;
    if rows.iter().all(Vec::is_empty) {
        return Err(TableParseError::Empty);
    }
    Ok(rows)
}
