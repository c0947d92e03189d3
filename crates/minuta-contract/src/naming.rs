//! Output file names for generated contracts.

use chrono::{DateTime, SecondsFormat, Utc};
use sha2::{Digest, Sha256};

use minuta_core::ContractData;

/// Digits of a tax id, punctuation dropped.
pub fn tax_digits(tax_id: &str) -> String {
    tax_id.chars().filter(char::is_ascii_digit).collect()
}

/// First 8 hex chars of SHA-256 over tax id, legal name and timestamp.
pub fn short_digest(data: &ContractData, at: DateTime<Utc>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data.tax_id.as_bytes());
    hasher.update(b"|");
    hasher.update(data.legal_name.as_bytes());
    hasher.update(b"|");
    hasher.update(at.to_rfc3339_opts(SecondsFormat::Nanos, true).as_bytes());
    hex::encode(&hasher.finalize()[..4])
}

/// `contrato_<digits>_<digest>.<extension>`
pub fn output_file_name(data: &ContractData, at: DateTime<Utc>, extension: &str) -> String {
    format!(
        "contrato_{}_{}.{}",
        tax_digits(&data.tax_id),
        short_digest(data, at),
        extension
    )
}
