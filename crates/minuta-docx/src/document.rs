//! A `.docx` opened for reading and editing.

use std::path::Path;

use crate::package::{DocxPackage, DOCUMENT_PART};
use crate::wml::{self, P, SECT_PR, TBL};
use crate::xml::{self, Element, Node, XmlDocument};
use minuta_core::{Error, Result};

/// A top-level body item, in document order.
#[derive(Debug, Clone, Copy)]
pub enum Block<'a> {
    Paragraph(&'a Element),
    Table(&'a Element),
}

/// Package plus the parsed main document part.
#[derive(Debug, Clone)]
pub struct Document {
    package: DocxPackage,
    xml: XmlDocument,
}

impl Document {
    /// Open a `.docx` and parse its main document part.
    pub fn open(path: &Path) -> Result<Self> {
        let package = DocxPackage::open(path)?;
        Self::from_package(package)
    }

    /// An empty A4 document on the default blank package.
    pub fn new() -> Self {
        Self {
            package: DocxPackage::blank(),
            xml: XmlDocument::new(blank_root()),
        }
    }

    fn from_package(package: DocxPackage) -> Result<Self> {
        let bytes = package
            .part(DOCUMENT_PART)
            .ok_or_else(|| Error::Docx(format!("missing part {}", DOCUMENT_PART)))?;
        let xml = xml::parse(bytes)?;
        if xml.root.child("w:body").is_none() {
            return Err(Error::Docx("document has no w:body".into()));
        }
        Ok(Self { package, xml })
    }

    pub fn body(&self) -> &Element {
        // Presence checked at construction.
        self.xml
            .root
            .child("w:body")
            .unwrap_or(&self.xml.root)
    }

    fn body_mut(&mut self) -> &mut Element {
        let root = &mut self.xml.root;
        let index = match root
            .children
            .iter()
            .position(|n| n.as_element().is_some_and(|e| e.is("w:body")))
        {
            Some(index) => index,
            None => {
                root.children.push(Node::Element(Element::new("w:body")));
                root.children.len() - 1
            }
        };
        match &mut root.children[index] {
            Node::Element(body) => body,
            _ => unreachable!("index points at w:body"),
        }
    }

    /// Top-level paragraphs and tables in document order.
    pub fn blocks(&self) -> Vec<Block<'_>> {
        self.body()
            .elements()
            .filter_map(|e| match e.name.as_str() {
                P => Some(Block::Paragraph(e)),
                TBL => Some(Block::Table(e)),
                _ => None,
            })
            .collect()
    }

    pub fn paragraphs(&self) -> impl Iterator<Item = &Element> {
        self.body().children_named(P)
    }

    pub fn tables(&self) -> impl Iterator<Item = &Element> {
        self.body().children_named(TBL)
    }

    pub fn paragraphs_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.body_mut().children_named_mut(P)
    }

    pub fn tables_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.body_mut().children_named_mut(TBL)
    }

    /// Texts of the top-level paragraphs.
    pub fn paragraph_texts(&self) -> Vec<String> {
        self.paragraphs().map(wml::paragraph_text).collect()
    }

    /// Append a block before the trailing section properties.
    fn push_block(&mut self, block: Element) {
        let body = self.body_mut();
        let position = body
            .children
            .iter()
            .rposition(|n| n.as_element().is_some_and(|e| e.is(SECT_PR)))
            .unwrap_or(body.children.len());
        body.children.insert(position, Node::Element(block));
    }

    pub fn add_paragraph(&mut self, text: &str) {
        self.push_block(wml::make_paragraph(text));
    }

    /// Append a grid table; see [`wml::make_table`] for ragged rows.
    pub fn add_table(&mut self, rows: &[Vec<String>]) {
        self.push_block(wml::make_table(rows));
    }

    /// Serialize the document part and write the whole package to `path`.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        let bytes = xml::write(&self.xml)?;
        self.package.set_part(DOCUMENT_PART, bytes);
        self.package.save(path)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

fn blank_root() -> Element {
    let section = Element::new(SECT_PR)
        .with_child(
            Element::new("w:pgSz")
                .with_attr("w:w", "11906")
                .with_attr("w:h", "16838"),
        )
        .with_child(
            Element::new("w:pgMar")
                .with_attr("w:top", "1417")
                .with_attr("w:right", "1701")
                .with_attr("w:bottom", "1417")
                .with_attr("w:left", "1701")
                .with_attr("w:header", "708")
                .with_attr("w:footer", "708")
                .with_attr("w:gutter", "0"),
        );
    Element::new("w:document")
        .with_attr("xmlns:w", wml::W_NS)
        .with_attr("xmlns:r", wml::R_NS)
        .with_child(Element::new("w:body").with_child(section))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_new_document_is_empty() {
        let doc = Document::new();
        assert!(doc.blocks().is_empty());
        assert!(doc.body().child(SECT_PR).is_some());
    }

    #[test]
    fn test_blocks_keep_document_order() {
        let mut doc = Document::new();
        doc.add_paragraph("first");
        doc.add_table(&[vec!["A".into()]]);
        doc.add_paragraph("");

        let kinds: Vec<&str> = doc
            .blocks()
            .iter()
            .map(|b| match b {
                Block::Paragraph(_) => "p",
                Block::Table(_) => "tbl",
            })
            .collect();
        assert_eq!(kinds, ["p", "tbl", "p"]);
        // Section properties stay last.
        let last = doc.body().elements().last().unwrap();
        assert!(last.is(SECT_PR));
    }

    #[test]
    fn test_save_and_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.docx");

        let mut doc = Document::new();
        doc.add_paragraph("Cláusula primeira");
        doc.add_paragraph("");
        doc.add_paragraph("Fim & cia");
        doc.save(&path).unwrap();

        let reopened = Document::open(&path).unwrap();
        assert_eq!(
            reopened.paragraph_texts(),
            ["Cláusula primeira", "", "Fim & cia"]
        );
    }

    #[test]
    fn test_paragraphs_mut_edits_are_saved() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("edit.docx");

        let mut doc = Document::new();
        doc.add_paragraph("antes");
        for p in doc.paragraphs_mut() {
            wml::set_paragraph_text(p, "depois");
        }
        doc.save(&path).unwrap();

        assert_eq!(Document::open(&path).unwrap().paragraph_texts(), ["depois"]);
    }

    #[test]
    fn test_open_without_body_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nobody.docx");
        let mut package = DocxPackage::blank();
        package.set_part(DOCUMENT_PART, b"<w:document/>".to_vec());
        package.save(&path).unwrap();

        assert!(Document::open(&path).is_err());
    }
}
