//! Row and report types for the company store.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Listing row from `companies`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanySummary {
    pub cod: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
}

/// One normalized row produced by the spreadsheet importer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyImport {
    pub cod: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub group_name: Option<String>,
    /// Every other spreadsheet column, stored as the company's detail map.
    #[serde(default)]
    pub extra_data: Map<String, Value>,
}

/// Counts from one sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub processed_count: usize,
    pub companies_new: usize,
    pub companies_updated: usize,
    pub companies_data_new: usize,
    pub companies_data_updated: usize,
    pub timestamp: String,
}
