//! Static provider registry.

use serde::Serialize;

/// A provider the group bills through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProviderEntry {
    /// Short name as typed in the spreadsheet.
    pub reference_name: &'static str,
    pub legal_name: &'static str,
    pub tax_id: &'static str,
}

const fn entry(
    reference_name: &'static str,
    legal_name: &'static str,
    tax_id: &'static str,
) -> ProviderEntry {
    ProviderEntry {
        reference_name,
        legal_name,
        tax_id,
    }
}

pub const DEFAULT_REGISTRY: &[ProviderEntry] = &[
    entry("GF SERVIÇOS", "GF SERVIÇOS ADMINISTRATIVOS LTDA.", "12.345.678/0001-90"),
    entry("E.REEVE SERVIÇOS", "E.REEVE SERVIÇOS CONTÁBEIS LTDA.", "23.456.789/0001-01"),
    entry("HR HILL", "HR HILL GESTÃO DE PESSOAS LTDA.", "34.567.890/0001-12"),
    entry("GO FURTHER CONSULTORIA", "GO FURTHER CONSULTORIA EMPRESARIAL LTDA.", "45.678.901/0001-23"),
    entry("ATLAS AUDITORIA", "ATLAS AUDITORIA INDEPENDENTE S/S", "56.789.012/0001-34"),
    entry("NORTE BPO FINANCEIRO", "NORTE BPO FINANCEIRO LTDA.", "67.890.123/0001-45"),
    entry("VERTICE TECNOLOGIA", "VÉRTICE TECNOLOGIA DA INFORMAÇÃO LTDA.", "78.901.234/0001-56"),
    entry("PRISMA JURIDICO", "PRISMA ASSESSORIA JURÍDICA LTDA.", "89.012.345/0001-67"),
    entry("SOLAR GESTAO FISCAL", "SOLAR GESTÃO FISCAL E TRIBUTÁRIA LTDA.", "90.123.456/0001-78"),
    entry("ORION FOLHA", "ORION PROCESSAMENTO DE FOLHA LTDA.", "01.234.567/0001-89"),
];

/// Providers used when a record names none.
pub const DEFAULT_PROVIDER_NAMES: [&str; 3] = ["GF SERVIÇOS", "E.REEVE SERVIÇOS", "HR HILL"];
