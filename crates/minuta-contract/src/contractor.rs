//! Recover contractor data from edited contract text.
//!
//! The contracting party is introduced as
//! `<name>, inscrita no CNPJ sob o nº <tax id>, com sede à <address>, neste ato …`.
//! Reading that line back lets an edited contract be regenerated from the
//! template with full formatting instead of being rebuilt from plain text.

use once_cell::sync::Lazy;
use regex::Regex;

use minuta_core::ContractData;

static CONTRACTOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?im)([^,\n]*?),\s*inscrita no CNPJ sob o nº ([0-9/.,-]+),\s*com sede à ([^,\n]+(?:,[^,\n]+)*?)(,\s*neste ato|$)",
    )
    .unwrap()
});

/// Items of the signatory clause open with `a) `, `b) `, ...
static CLAUSE_ITEM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z]\)\s").unwrap());

struct Candidate {
    data: ContractData,
    represented: bool,
}

fn candidate(caps: &regex::Captures<'_>) -> Option<Candidate> {
    let name = caps.get(1)?.as_str().trim();
    if CLAUSE_ITEM_RE.is_match(name) {
        return None;
    }
    // `CONTRATANTE: ACME LTDA` names the party after its label.
    let legal_name = name.rsplit_once(": ").map_or(name, |(_, n)| n).trim();
    let tax_id = caps.get(2)?.as_str().trim().trim_end_matches([',', '.']);
    let address = caps.get(3)?.as_str().trim();
    if legal_name.is_empty() || tax_id.is_empty() || address.is_empty() {
        return None;
    }
    Some(Candidate {
        data: ContractData {
            legal_name: legal_name.to_string(),
            tax_id: tax_id.to_string(),
            address: address.to_string(),
        },
        represented: caps.get(4).is_some_and(|m| !m.as_str().is_empty()),
    })
}

/// Contractor line in `text`, fields trimmed.
///
/// Signatory clause items are skipped. A line closing with `, neste ato`
/// wins over one that runs to the end of the line.
pub fn parse(text: &str) -> Option<ContractData> {
    let mut fallback = None;
    for caps in CONTRACTOR_RE.captures_iter(text) {
        let Some(found) = candidate(&caps) else {
            continue;
        };
        if found.represented {
            return Some(found.data);
        }
        fallback.get_or_insert(found.data);
    }
    fallback
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_neste_ato() {
        let text = "CONTRATANTE\nACME COMERCIO LTDA, inscrita no CNPJ sob o nº 12.345.678/0001-90, \
                    com sede à Rua das Flores, 10, Centro, Campinas/SP, neste ato representada.";
        let data = parse(text).unwrap();
        assert_eq!(data.legal_name, "ACME COMERCIO LTDA");
        assert_eq!(data.tax_id, "12.345.678/0001-90");
        assert_eq!(data.address, "Rua das Flores, 10, Centro, Campinas/SP");
    }

    #[test]
    fn test_parse_to_end_of_line() {
        let text = "Beta S/A, INSCRITA NO CNPJ SOB O Nº 98.765.432/0001-10, com sede à Av. Brasil, 500\nCLÁUSULA 1";
        let data = parse(text).unwrap();
        assert_eq!(data.legal_name, "Beta S/A");
        assert_eq!(data.tax_id, "98.765.432/0001-10");
        assert_eq!(data.address, "Av. Brasil, 500");
    }

    #[test]
    fn test_skips_signatory_clause() {
        let text = "CONTRATO DE PRESTAÇÃO DE SERVIÇOS\n\
                    a) E.REEVE SERVIÇOS CONTÁBEIS LTDA., inscrita no CNPJ sob o nº 23.456.789/0001-01, \
                    com sede à Avenida Paulista, 1000; e b) GF SERVIÇOS ADMINISTRATIVOS LTDA., \
                    inscrita no CNPJ sob o nº 12.345.678/0001-90, com sede à Avenida Paulista, 1000\n\
                    CONTRATANTE: ACME LTDA, inscrita no CNPJ sob o nº 11.222.333/0001-44, \
                    com sede à Rua A, 1, neste ato representada.";
        let data = parse(text).unwrap();
        assert_eq!(data.legal_name, "ACME LTDA");
        assert_eq!(data.tax_id, "11.222.333/0001-44");
        assert_eq!(data.address, "Rua A, 1");
    }

    #[test]
    fn test_prefers_represented_party() {
        let text = "Beta S/A, inscrita no CNPJ sob o nº 98.765.432/0001-10, com sede à Av. Brasil, 500\n\
                    Gama LTDA, inscrita no CNPJ sob o nº 11.111.111/0001-11, com sede à Rua B, 2, neste ato";
        assert_eq!(parse(text).unwrap().legal_name, "Gama LTDA");
    }

    #[test]
    fn test_only_clause_items() {
        let text = "a) HR HILL GESTÃO DE PESSOAS LTDA., inscrita no CNPJ sob o nº 34.567.890/0001-12, \
                    com sede à Avenida Paulista, 1000";
        assert!(parse(text).is_none());
    }

    #[test]
    fn test_no_contractor_line() {
        assert!(parse("Nenhum dado aqui").is_none());
        assert!(parse("").is_none());
    }
}
