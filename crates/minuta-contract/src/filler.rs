//! Template Filler: company data into the contract template.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::{naming, template};
use minuta_core::{CompanyRecord, ContractData, Error, Result};
use minuta_docx::{wml, Document};
use minuta_signatory::{Signatory, SignatoryClause, SignatoryClauseBuilder};

pub const LEGAL_NAME_TOKEN: &str = "[LEGAL_NAME]";
pub const TAX_ID_TOKEN: &str = "[TAX_ID]";
pub const ADDRESS_TOKEN: &str = "[ADDRESS]";

/// Signature-block paragraphs of the template, matched on trimmed text.
pub const LEGACY_SIGNATORY_NAMES: [&str; 3] = [
    "GF SERVIÇOS ADMINISTRATIVOS LTDA.",
    "E.REEVE SERVIÇOS CONTÁBEIS LTDA.",
    "HR HILL GESTÃO DE PESSOAS LTDA.",
];

/// A paragraph holding both is the template's signatory clause.
pub const CLAUSE_MARKERS: [&str; 2] = ["GF SERVIÇOS ADMINISTRATIVOS", "E.REEVE SERVIÇOS CONTÁBEIS"];

/// Paragraphs and cells holding this phrase are emptied.
pub const BLANK_MARKER: &str = "INTENCIONALMENTE EM BRANCO";

/// Result of one fill.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedContract {
    pub path: PathBuf,
    pub file_name: String,
    pub data: ContractData,
    pub signatories: Vec<Signatory>,
    pub replacements: usize,
}

/// Fills one template into many contracts.
#[derive(Debug, Clone)]
pub struct ContractGenerator {
    template_path: PathBuf,
    output_dir: PathBuf,
    clauses: SignatoryClauseBuilder,
}

impl ContractGenerator {
    /// Fails with [`Error::TemplateLoad`] when the template is absent.
    pub fn new(template_path: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Result<Self> {
        let template_path = template_path.into();
        if !template_path.is_file() {
            return Err(Error::TemplateLoad(template_path));
        }
        Ok(Self {
            template_path,
            output_dir: output_dir.into(),
            clauses: SignatoryClauseBuilder::default(),
        })
    }

    pub fn with_clause_builder(mut self, clauses: SignatoryClauseBuilder) -> Self {
        self.clauses = clauses;
        self
    }

    pub fn template_path(&self) -> &Path {
        &self.template_path
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn clause(&self, record: &CompanyRecord) -> SignatoryClause {
        self.clauses.build(record)
    }

    pub fn template_fields(&self) -> Vec<String> {
        template::template_fields(&self.template_path)
    }

    pub fn validate_template(&self) -> template::TemplateInfo {
        template::inspect(&self.template_path)
    }

    /// Fill the template for `record` into a fresh file in the output dir.
    pub fn generate(&self, record: &CompanyRecord) -> Result<GeneratedContract> {
        self.generate_with(record, &record.contract_data())
    }

    /// Like [`generate`](Self::generate) with explicit contract data; the
    /// record still drives the signatory clause.
    pub fn generate_with(
        &self,
        record: &CompanyRecord,
        data: &ContractData,
    ) -> Result<GeneratedContract> {
        let extension = self
            .template_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("docx");
        let file_name = naming::output_file_name(data, Utc::now(), extension);
        let path = self.output_dir.join(&file_name);
        self.fill_to(record, data, &path)
    }

    /// Fill the template over an existing contract at `target`.
    pub fn regenerate(
        &self,
        record: &CompanyRecord,
        data: &ContractData,
        target: &Path,
    ) -> Result<GeneratedContract> {
        self.fill_to(record, data, target)
    }

    fn fill_to(
        &self,
        record: &CompanyRecord,
        data: &ContractData,
        path: &Path,
    ) -> Result<GeneratedContract> {
        if let Err(e) = data.validate() {
            warn!("Contract for '{}' not generated: {}", record.cod, e);
            return Err(e);
        }
        info!("Generating contract for {}", data.legal_name);

        match self.try_fill(record, data, path) {
            Ok(contract) => {
                info!(
                    "Contract generated: {} ({} replacements)",
                    contract.path.display(),
                    contract.replacements
                );
                Ok(contract)
            }
            Err(e) => {
                error!("Contract generation failed for {}: {}", data.legal_name, e);
                Err(e)
            }
        }
    }

    fn try_fill(
        &self,
        record: &CompanyRecord,
        data: &ContractData,
        path: &Path,
    ) -> Result<GeneratedContract> {
        let clause = self.clauses.build(record);
        let mut doc = Document::open(&self.template_path)?;

        let anchors = replace_anchors(&mut doc, &clause.signatories);
        let mut replacements = fill_paragraphs(&mut doc, &clause.text, data);
        replacements += fill_tables(&mut doc, data);
        debug!("{} anchors, {} placeholder replacements", anchors, replacements);

        doc.save(path)?;
        Ok(GeneratedContract {
            path: path.to_path_buf(),
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            data: data.clone(),
            signatories: clause.signatories,
            replacements,
        })
    }
}

/// Rename the signature-block anchors after the new signatories, pairwise
/// in order. Returns how many were renamed.
fn replace_anchors(doc: &mut Document, signatories: &[Signatory]) -> usize {
    let anchors = doc
        .paragraphs_mut()
        .filter(|p| LEGACY_SIGNATORY_NAMES.contains(&wml::paragraph_text(p).trim()))
        .take(LEGACY_SIGNATORY_NAMES.len());

    let mut renamed = 0;
    for (paragraph, signatory) in anchors.zip(signatories) {
        wml::set_paragraph_text(paragraph, &signatory.legal_name.to_uppercase());
        renamed += 1;
    }
    renamed
}

fn placeholders(data: &ContractData) -> [(&'static str, &str); 3] {
    [
        (LEGAL_NAME_TOKEN, data.legal_name.as_str()),
        (TAX_ID_TOKEN, data.tax_id.as_str()),
        (ADDRESS_TOKEN, data.address.as_str()),
    ]
}

/// `text` with every placeholder substituted, and the substitution count.
fn substitute(text: &str, data: &ContractData) -> (String, usize) {
    let mut out = text.to_string();
    let mut count = 0;
    for (token, value) in placeholders(data) {
        let hits = out.matches(token).count();
        if hits > 0 {
            out = out.replace(token, value);
            count += hits;
        }
    }
    (out, count)
}

fn fill_paragraphs(doc: &mut Document, clause_text: &str, data: &ContractData) -> usize {
    let mut count = 0;
    for paragraph in doc.paragraphs_mut() {
        let text = wml::paragraph_text(paragraph);
        if CLAUSE_MARKERS.iter().all(|m| text.contains(m)) {
            wml::set_paragraph_text(paragraph, clause_text);
        } else if text.contains(BLANK_MARKER) {
            wml::set_paragraph_text(paragraph, "");
        } else {
            for run in wml::runs_mut(paragraph) {
                let (filled, hits) = substitute(&wml::run_text(run), data);
                if hits > 0 {
                    wml::set_run_text(run, &filled);
                    wml::set_run_bold(run);
                    count += hits;
                }
            }
        }
    }
    count
}

fn fill_tables(doc: &mut Document, data: &ContractData) -> usize {
    let mut count = 0;
    for table in doc.tables_mut() {
        for cell in wml::cells_mut(table) {
            let text = wml::cell_text(cell);
            if text.contains(BLANK_MARKER) {
                wml::set_cell_text(cell, "");
                continue;
            }
            let (filled, hits) = substitute(&text, data);
            if hits > 0 {
                wml::set_cell_text(cell, &filled);
                count += hits;
            }
        }
    }
    count
}
