//! Company records as supplied by the store, and the contract data derived from them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// One business entity from the company registry.
///
/// Named fields cover what contract generation needs; `details` is the nested
/// spreadsheet row (a JSON object, or the raw JSON string as stored) and
/// `extra` keeps any other column the importer produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    #[serde(default)]
    pub cod: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CompanyRecord {
    /// Build a bare record carrying only contract data.
    pub fn from_contract_data(data: &ContractData) -> Self {
        Self {
            legal_name: Some(data.legal_name.clone()),
            tax_id: Some(data.tax_id.clone()),
            address: Some(data.address.clone()),
            ..Default::default()
        }
    }

    /// The nested detail map, if present and parseable.
    pub fn detail_map(&self) -> Option<Map<String, Value>> {
        match &self.details {
            Some(Value::Object(map)) => Some(map.clone()),
            Some(Value::String(raw)) => serde_json::from_str::<Map<String, Value>>(raw).ok(),
            _ => None,
        }
    }

    /// The record itself viewed as a flat field map.
    pub fn as_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    /// First non-empty string found under any of `keys`, detail map first.
    pub fn lookup(&self, keys: &[&str]) -> Option<String> {
        let details = self.detail_map().unwrap_or_default();
        for source in [&details, &self.extra] {
            for key in keys {
                if let Some(value) = source.get(*key).and_then(non_empty_value) {
                    return Some(value);
                }
            }
        }
        None
    }

    /// Derive the filler input, honoring the locale-specific column names.
    pub fn contract_data(&self) -> ContractData {
        let legal_name = non_empty(&self.legal_name)
            .or_else(|| self.lookup(&["Razão Social", "razao_social"]))
            .or_else(|| non_empty(&self.name))
            .unwrap_or_default();
        let tax_id = non_empty(&self.tax_id)
            .or_else(|| self.lookup(&["CNPJ", "cnpj", "documento"]))
            .unwrap_or_default();
        let address = non_empty(&self.address)
            .or_else(|| self.lookup(&["Endereço", "endereco"]))
            .unwrap_or_default();

        ContractData {
            legal_name,
            tax_id,
            address,
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn non_empty_value(value: &Value) -> Option<String> {
    let s = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// The three values substituted into the contract template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractData {
    pub legal_name: String,
    pub tax_id: String,
    pub address: String,
}

impl ContractData {
    /// Names of the required fields that are empty, in declaration order.
    pub fn missing_fields(&self) -> Vec<String> {
        [
            ("legal_name", &self.legal_name),
            ("tax_id", &self.tax_id),
            ("address", &self.address),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name.to_string())
        .collect()
    }

    /// Fail with every missing field at once.
    pub fn validate(&self) -> Result<()> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation { missing })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_reports_all_missing() {
        let data = ContractData {
            legal_name: String::new(),
            tax_id: "X".into(),
            address: "  ".into(),
        };
        let err = data.validate().unwrap_err();
        assert_eq!(err.missing_fields(), ["legal_name", "address"]);
    }

    #[test]
    fn test_validate_ok() {
        let data = ContractData {
            legal_name: "ACME LTDA".into(),
            tax_id: "12.345.678/0001-90".into(),
            address: "Rua A, 1".into(),
        };
        assert!(data.validate().is_ok());
    }

    #[test]
    fn test_contract_data_from_locale_columns() {
        let record: CompanyRecord = serde_json::from_value(json!({
            "cod": "101",
            "name": "Acme",
            "Razão Social": "ACME COMERCIO LTDA",
            "CNPJ": "12.345.678/0001-90",
            "Endereço": "Rua das Flores, 10",
        }))
        .unwrap();

        let data = record.contract_data();
        assert_eq!(data.legal_name, "ACME COMERCIO LTDA");
        assert_eq!(data.tax_id, "12.345.678/0001-90");
        assert_eq!(data.address, "Rua das Flores, 10");
    }

    #[test]
    fn test_contract_data_falls_back_to_name() {
        let record = CompanyRecord {
            cod: "7".into(),
            name: Some("Padaria Central".into()),
            ..Default::default()
        };
        let data = record.contract_data();
        assert_eq!(data.legal_name, "Padaria Central");
        assert!(data.tax_id.is_empty());
    }

    #[test]
    fn test_detail_map_parses_raw_string() {
        let record = CompanyRecord {
            details: Some(Value::String(r#"{"Faturamento Contábil": "GF"}"#.into())),
            ..Default::default()
        };
        let map = record.detail_map().unwrap();
        assert_eq!(map["Faturamento Contábil"], "GF");
    }

    #[test]
    fn test_detail_map_unparseable_is_none() {
        let record = CompanyRecord {
            details: Some(Value::String("{broken".into())),
            ..Default::default()
        };
        assert!(record.detail_map().is_none());
    }

    #[test]
    fn test_as_map_flattens_extra() {
        let mut record = CompanyRecord {
            cod: "1".into(),
            ..Default::default()
        };
        record
            .extra
            .insert("Faturamento Fiscal".into(), json!("HR HILL"));
        let map = record.as_map();
        assert_eq!(map["cod"], "1");
        assert_eq!(map["Faturamento Fiscal"], "HR HILL");
    }
}
