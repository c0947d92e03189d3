//! WordprocessingML helpers: paragraphs, runs and tables over the XML tree.

use crate::xml::{Element, Node};

pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

pub const P: &str = "w:p";
pub const P_PR: &str = "w:pPr";
pub const R: &str = "w:r";
pub const R_PR: &str = "w:rPr";
pub const T: &str = "w:t";
pub const TBL: &str = "w:tbl";
pub const TR: &str = "w:tr";
pub const TC: &str = "w:tc";
pub const TC_PR: &str = "w:tcPr";
pub const SECT_PR: &str = "w:sectPr";

/// Containers whose runs still belong to the enclosing paragraph.
const RUN_CONTAINERS: &[&str] = &["w:hyperlink", "w:ins", "w:smartTag", "w:fldSimple"];

// ---------------------------------------------------------------
// Runs
// ---------------------------------------------------------------

/// Visible text of a run; tabs and breaks map to `\t` and `\n`.
///
/// A soft break therefore reads back as a paragraph boundary once the
/// text goes through extraction and reconstruction.
pub fn run_text(run: &Element) -> String {
    let mut out = String::new();
    for child in run.elements() {
        match child.name.as_str() {
            "w:t" => out.push_str(&child.text()),
            "w:tab" => out.push('\t'),
            "w:br" | "w:cr" => out.push('\n'),
            "w:noBreakHyphen" => out.push('-'),
            _ => {}
        }
    }
    out
}

fn is_run_content(e: &Element) -> bool {
    matches!(
        e.name.as_str(),
        "w:t" | "w:tab" | "w:br" | "w:cr" | "w:noBreakHyphen"
    )
}

fn text_nodes(text: &str) -> Vec<Element> {
    let mut nodes = Vec::new();
    let mut pending = String::new();
    let flush = |pending: &mut String, nodes: &mut Vec<Element>| {
        if !pending.is_empty() {
            nodes.push(
                Element::new(T)
                    .with_attr("xml:space", "preserve")
                    .with_text(std::mem::take(pending)),
            );
        }
    };
    for c in text.chars() {
        match c {
            '\t' => {
                flush(&mut pending, &mut nodes);
                nodes.push(Element::new("w:tab"));
            }
            '\n' => {
                flush(&mut pending, &mut nodes);
                nodes.push(Element::new("w:br"));
            }
            '\r' => {}
            _ => pending.push(c),
        }
    }
    flush(&mut pending, &mut nodes);
    nodes
}

/// Replace a run's text, keeping its run properties.
pub fn set_run_text(run: &mut Element, text: &str) {
    run.remove_children_where(is_run_content);
    run.children
        .extend(text_nodes(text).into_iter().map(Node::Element));
}

/// Mark a run bold, creating `w:rPr` when absent.
pub fn set_run_bold(run: &mut Element) {
    if run.child(R_PR).is_none() {
        run.children.insert(0, Node::Element(Element::new(R_PR)));
    }
    let Some(props) = run.child_mut(R_PR) else {
        return;
    };
    if let Some(bold) = props.child_mut("w:b") {
        bold.remove_attr("w:val");
        return;
    }
    // w:b follows w:rStyle and w:rFonts in the schema sequence.
    let position = props
        .children
        .iter()
        .position(|n| {
            n.as_element()
                .is_some_and(|e| !e.is("w:rStyle") && !e.is("w:rFonts"))
        })
        .unwrap_or(props.children.len());
    props
        .children
        .insert(position, Node::Element(Element::new("w:b")));
}

pub fn is_bold(run: &Element) -> bool {
    run.child(R_PR)
        .and_then(|p| p.child("w:b"))
        .is_some_and(|b| !matches!(b.attr("w:val"), Some("0") | Some("false")))
}

pub fn make_run(text: &str, props: Option<Element>) -> Element {
    let mut run = Element::new(R);
    if let Some(props) = props {
        run.children.push(Node::Element(props));
    }
    set_run_text(&mut run, text);
    run
}

// ---------------------------------------------------------------
// Paragraphs
// ---------------------------------------------------------------

/// All runs of a paragraph in document order, including hyperlinked runs.
pub fn runs(paragraph: &Element) -> Vec<&Element> {
    fn collect<'a>(el: &'a Element, out: &mut Vec<&'a Element>) {
        for child in el.elements() {
            if child.is(R) {
                out.push(child);
            } else if RUN_CONTAINERS.contains(&child.name.as_str()) {
                collect(child, out);
            }
        }
    }
    let mut out = Vec::new();
    collect(paragraph, &mut out);
    out
}

pub fn runs_mut(paragraph: &mut Element) -> Vec<&mut Element> {
    fn collect<'a>(el: &'a mut Element, out: &mut Vec<&'a mut Element>) {
        for child in el.elements_mut() {
            if child.is(R) {
                out.push(child);
            } else if RUN_CONTAINERS.contains(&child.name.as_str()) {
                collect(child, out);
            }
        }
    }
    let mut out = Vec::new();
    collect(paragraph, &mut out);
    out
}

pub fn paragraph_text(paragraph: &Element) -> String {
    runs(paragraph).into_iter().map(run_text).collect()
}

/// Replace all paragraph content with a single run carrying `text`.
///
/// Paragraph properties survive, and the new run inherits the first run's
/// properties so the replaced text keeps its look.
pub fn set_paragraph_text(paragraph: &mut Element, text: &str) {
    let first_props = runs(paragraph)
        .first()
        .and_then(|r| r.child(R_PR))
        .cloned();
    paragraph.children.retain(|node| match node {
        Node::Element(e) => e.is(P_PR),
        _ => false,
    });
    if !text.is_empty() {
        paragraph
            .children
            .push(Node::Element(make_run(text, first_props)));
    }
}

pub fn make_paragraph(text: &str) -> Element {
    let mut paragraph = Element::new(P);
    if !text.is_empty() {
        paragraph.children.push(Node::Element(make_run(text, None)));
    }
    paragraph
}

// ---------------------------------------------------------------
// Tables
// ---------------------------------------------------------------

/// Cell text: the cell's paragraphs joined by newlines.
pub fn cell_text(cell: &Element) -> String {
    cell.children_named(P)
        .map(paragraph_text)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Cell texts, row-major.
pub fn table_cells(table: &Element) -> Vec<Vec<String>> {
    table
        .children_named(TR)
        .map(|row| row.children_named(TC).map(cell_text).collect())
        .collect()
}

pub fn cells_mut(table: &mut Element) -> Vec<&mut Element> {
    table
        .children_named_mut(TR)
        .flat_map(|row| row.children_named_mut(TC))
        .collect()
}

/// Replace a cell's content with one paragraph holding `text`.
///
/// The first paragraph is reused so its paragraph and run properties are kept.
pub fn set_cell_text(cell: &mut Element, text: &str) {
    let mut first = cell
        .child(P)
        .cloned()
        .unwrap_or_else(|| Element::new(P));
    set_paragraph_text(&mut first, text);
    cell.children.retain(|node| match node {
        Node::Element(e) => e.is(TC_PR),
        _ => false,
    });
    cell.children.push(Node::Element(first));
}

/// Build a grid table. Column count is the longest row; short rows get
/// empty cells.
pub fn make_table(rows: &[Vec<String>]) -> Element {
    let cols = rows.iter().map(Vec::len).max().unwrap_or(0);

    let props = Element::new("w:tblPr")
        .with_child(Element::new("w:tblStyle").with_attr("w:val", "TableGrid"))
        .with_child(
            Element::new("w:tblW")
                .with_attr("w:w", "0")
                .with_attr("w:type", "auto"),
        )
        .with_child(Element::new("w:tblLook").with_attr("w:val", "04A0"));

    let mut grid = Element::new("w:tblGrid");
    for _ in 0..cols {
        grid.children.push(Node::Element(Element::new("w:gridCol")));
    }

    let mut table = Element::new(TBL).with_child(props).with_child(grid);
    for row in rows {
        let mut tr = Element::new(TR);
        for col in 0..cols {
            let text = row.get(col).map(String::as_str).unwrap_or("");
            let tc = Element::new(TC)
                .with_child(
                    Element::new(TC_PR).with_child(
                        Element::new("w:tcW")
                            .with_attr("w:w", "0")
                            .with_attr("w:type", "auto"),
                    ),
                )
                .with_child(make_paragraph(text));
            tr.children.push(Node::Element(tc));
        }
        table.children.push(Node::Element(tr));
    }
    table
}
