//! Minuta Docx — `.docx` packages as editable paragraph/run/table trees.
//!
//! Only the main document part is parsed; every other part of the package
//! (styles, numbering, headers, media) is carried through byte-for-byte.

pub mod document;
pub mod package;
pub mod scan;
pub mod wml;
pub mod xml;

pub use document::{Block, Document};
pub use package::DocxPackage;
