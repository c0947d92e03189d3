//! Streaming paragraph scan that does not build a tree.
//!
//! Used as the fallback reader when a document cannot be fully loaded:
//! it only needs well-formed start/end tags around the paragraphs it reads.

use std::path::Path;

use quick_xml::escape::unescape;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::package::{DocxPackage, DOCUMENT_PART};
use minuta_core::{Error, Result};

/// Texts of body paragraphs outside tables, in document order.
pub fn paragraph_texts(path: &Path) -> Result<Vec<String>> {
    let package = DocxPackage::open(path)?;
    let bytes = package
        .part(DOCUMENT_PART)
        .ok_or_else(|| Error::Docx(format!("missing part {}", DOCUMENT_PART)))?;
    scan_paragraphs(bytes)
}

/// Scan raw document XML for top-level paragraph text.
pub fn scan_paragraphs(bytes: &[u8]) -> Result<Vec<String>> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();

    let mut lines = Vec::new();
    let mut table_depth = 0usize;
    let mut paragraph_depth = 0usize;
    let mut in_text = false;
    let mut current = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"w:tbl" => table_depth += 1,
                b"w:p" if table_depth == 0 => {
                    paragraph_depth += 1;
                    if paragraph_depth == 1 {
                        current.clear();
                    }
                }
                b"w:t" => in_text = true,
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:p" if table_depth == 0 && paragraph_depth == 0 => lines.push(String::new()),
                b"w:tab" if paragraph_depth > 0 => current.push('\t'),
                b"w:br" | b"w:cr" if paragraph_depth > 0 => current.push('\n'),
                _ => {}
            },
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:tbl" => table_depth = table_depth.saturating_sub(1),
                b"w:p" if table_depth == 0 && paragraph_depth > 0 => {
                    paragraph_depth -= 1;
                    if paragraph_depth == 0 {
                        lines.push(std::mem::take(&mut current));
                    }
                }
                b"w:t" => in_text = false,
                _ => {}
            },
            Ok(Event::Text(t)) if in_text && paragraph_depth > 0 => {
                let raw = std::str::from_utf8(&t).map_err(|e| Error::Docx(e.to_string()))?;
                current.push_str(&unescape(raw).unwrap_or(raw.into()));
            }
            Ok(Event::GeneralRef(r)) if in_text && paragraph_depth > 0 => {
                let name = std::str::from_utf8(&r).map_err(|e| Error::Docx(e.to_string()))?;
                let raw = format!("&{};", name);
                current.push_str(&unescape(&raw).unwrap_or(raw.as_str().into()));
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(Error::Docx(format!("XML: {}", e))),
        }
        buf.clear();
    }

    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_skips_tables() {
        let xml = br#"<w:document><w:body>
<w:p><w:r><w:t>Antes</w:t></w:r></w:p>
<w:tbl><w:tr><w:tc><w:p><w:r><w:t>celula</w:t></w:r></w:p></w:tc></w:tr></w:tbl>
<w:p/>
<w:p><w:r><w:t>Depois &amp; fim</w:t></w:r></w:p>
</w:body></w:document>"#;
        let lines = scan_paragraphs(xml).unwrap();
        assert_eq!(lines, ["Antes", "", "Depois & fim"]);
    }

    #[test]
    fn test_scan_reports_broken_xml() {
        assert!(scan_paragraphs(b"<w:body><w:p></w:body>").is_err());
    }
}
