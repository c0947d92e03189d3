//! Signatory clause builder.
//!
//! Collects the billing providers a company record names, resolves each one
//! against the registry and renders the lettered contracting-party clause.
//! Building never fails: any problem with the record yields the fixed
//! three-provider fallback so contract generation is never blocked.

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::registry::DEFAULT_PROVIDER_NAMES;
use crate::resolver::CompanyResolver;
use minuta_core::CompanyRecord;

/// Spreadsheet columns naming the provider billed for each service line.
pub const BILLABLE_SERVICE_FIELDS: [&str; 10] = [
    "Faturamento Contábil",
    "Faturamento Fiscal",
    "Faturamento Departamento Pessoal",
    "Faturamento Societário",
    "Faturamento Financeiro",
    "Faturamento BPO",
    "Faturamento Consultoria",
    "Faturamento Auditoria",
    "Faturamento Jurídico",
    "Faturamento Tecnologia",
];

/// Letters a) through j).
pub const MAX_SIGNATORIES: usize = 10;

/// Tax id written for providers missing from the registry.
pub const UNRESOLVED_TAX_ID: &str = "00.000.000/0000-00";

/// Registered office shared by every provider of the group.
pub const STANDARD_ADDRESS: &str =
    "Avenida Paulista, nº 1.000, 10º andar, Bela Vista, São Paulo/SP, CEP 01310-100";

/// Fallback parties, already in the order the clause lists them.
const FALLBACK_SIGNATORIES: [(&str, &str); 3] = [
    ("E.REEVE SERVIÇOS CONTÁBEIS LTDA.", "23.456.789/0001-01"),
    ("GF SERVIÇOS ADMINISTRATIVOS LTDA.", "12.345.678/0001-90"),
    ("HR HILL GESTÃO DE PESSOAS LTDA.", "34.567.890/0001-12"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Signatory {
    pub legal_name: String,
    pub tax_id: String,
}

/// Rendered clause text plus the parties it lists, in the same order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignatoryClause {
    pub text: String,
    pub signatories: Vec<Signatory>,
}

impl SignatoryClause {
    pub fn from_signatories(signatories: Vec<Signatory>) -> Self {
        Self {
            text: render_clause(&signatories),
            signatories,
        }
    }

    /// The fixed clause used whenever a record cannot be read.
    pub fn fallback() -> Self {
        Self::from_signatories(
            FALLBACK_SIGNATORIES
                .iter()
                .map(|(legal_name, tax_id)| Signatory {
                    legal_name: legal_name.to_string(),
                    tax_id: tax_id.to_string(),
                })
                .collect(),
        )
    }
}

#[derive(Debug, Error)]
pub enum ClauseError {
    #[error("billing field '{field}' holds a structured value")]
    StructuredValue { field: String },
}

#[derive(Debug, Clone, Default)]
pub struct SignatoryClauseBuilder {
    resolver: CompanyResolver,
}

impl SignatoryClauseBuilder {
    pub fn new(resolver: CompanyResolver) -> Self {
        Self { resolver }
    }

    /// Build the clause for `record`, falling back on any error.
    pub fn build(&self, record: &CompanyRecord) -> SignatoryClause {
        match self.try_build(record) {
            Ok(clause) => clause,
            Err(e) => {
                warn!("Signatory clause fallback for '{}': {}", record.cod, e);
                SignatoryClause::fallback()
            }
        }
    }

    pub fn try_build(&self, record: &CompanyRecord) -> Result<SignatoryClause, ClauseError> {
        let mut names = provider_names(record)?;
        if names.is_empty() {
            debug!("No billing providers on '{}', using defaults", record.cod);
            names = DEFAULT_PROVIDER_NAMES.iter().map(|s| s.to_string()).collect();
        }

        let mut seen = HashSet::new();
        let signatories: Vec<Signatory> = names
            .iter()
            .map(|name| self.resolve_signatory(name))
            .filter(|s| seen.insert(s.legal_name.clone()))
            .take(MAX_SIGNATORIES)
            .collect();

        Ok(SignatoryClause::from_signatories(signatories))
    }

    fn resolve_signatory(&self, name: &str) -> Signatory {
        match self.resolver.resolve(name) {
            Some(entry) => Signatory {
                legal_name: entry.legal_name.to_string(),
                tax_id: entry.tax_id.to_string(),
            },
            None => {
                warn!("Provider '{}' not in registry, using placeholder data", name);
                Signatory {
                    legal_name: format!("{} LTDA.", name.to_uppercase()),
                    tax_id: UNRESOLVED_TAX_ID.to_string(),
                }
            }
        }
    }
}

/// Distinct, trimmed provider names from the billing fields, sorted.
///
/// Reads the nested detail map, or the record itself when the map is
/// missing or unparseable.
pub fn provider_names(record: &CompanyRecord) -> Result<BTreeSet<String>, ClauseError> {
    let source: Map<String, Value> = record.detail_map().unwrap_or_else(|| record.as_map());

    let mut names = BTreeSet::new();
    for field in BILLABLE_SERVICE_FIELDS {
        let value = match source.get(field) {
            None | Some(Value::Null) => continue,
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            Some(Value::Array(_)) | Some(Value::Object(_)) => {
                return Err(ClauseError::StructuredValue {
                    field: field.to_string(),
                })
            }
        };
        if !value.is_empty() {
            names.insert(value);
        }
    }
    Ok(names)
}

/// `"<letter>) <NAME>, inscrita no CNPJ sob o nº <id>, com sede à <address>"`
/// per party, joined with `"; "` and `"; e "` before the last.
pub fn render_clause(signatories: &[Signatory]) -> String {
    let items: Vec<String> = signatories
        .iter()
        .zip('a'..='z')
        .map(|(s, letter)| {
            format!(
                "{}) {}, inscrita no CNPJ sob o nº {}, com sede à {}",
                letter,
                s.legal_name.to_uppercase(),
                s.tax_id,
                STANDARD_ADDRESS
            )
        })
        .collect();
    join_items(&items)
}

pub fn join_items(items: &[String]) -> String {
    match items.split_last() {
        None => String::new(),
        Some((last, [])) => last.clone(),
        Some((last, rest)) => format!("{}; e {}", rest.join("; "), last),
    }
}
