//! Minuta Core — error type, configuration, company records.

pub mod config;
pub mod error;
pub mod record;

pub use config::{DataPaths, MinutaConfig};
pub use error::{Error, Result};
pub use record::{CompanyRecord, ContractData};
