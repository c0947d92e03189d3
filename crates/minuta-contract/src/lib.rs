//! Minuta Contract — fill the contract template, and round-trip it through
//! an editable plain-text form.
//!
//! ```text
//! CompanyRecord ─▶ ContractGenerator::generate ─▶ .docx
//!                                                  │
//!                    extract::extract ◀────────────┘
//!                         │ (user edits the text)
//!                         ▼
//!              reconstruct::reconstruct ─▶ <stem>_edited.docx
//! ```

pub mod contractor;
pub mod extract;
pub mod filler;
pub mod naming;
pub mod reconstruct;
pub mod table_json;
pub mod template;

pub use extract::extract;
pub use filler::{ContractGenerator, GeneratedContract};
pub use reconstruct::reconstruct;
pub use template::TemplateInfo;
