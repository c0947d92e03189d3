//! SQLite-backed company store.

use std::path::{Path, PathBuf};

use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::schema::SCHEMA_SQL;
use crate::types::*;
use minuta_core::{CompanyRecord, Error, Result};

fn db_err(e: rusqlite::Error) -> Error {
    Error::Database(e.to_string())
}

fn digits(s: &str) -> String {
    s.chars().filter(char::is_ascii_digit).collect()
}

/// Keyed company store over a single SQLite connection.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl SqliteStore {
    /// Open or create the store.
    ///
    /// `db_dir` is the directory (e.g., `data/db/`). The file will be `db_dir/minuta.db`.
    pub fn open(db_dir: impl AsRef<Path>) -> Result<Self> {
        let db_dir = db_dir.as_ref();
        std::fs::create_dir_all(db_dir)?;
        let db_path = db_dir.join("minuta.db");

        let conn = Self::create_connection(&db_path)?;
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| Error::Database(format!("Schema init failed: {}", e)))?;

        let store = Self {
            conn: Mutex::new(conn),
            db_path,
        };
        info!(
            "SqliteStore initialized: {} companies, path={}",
            store.count_companies()?,
            store.db_path.display()
        );
        Ok(store)
    }

    fn create_connection(db_path: &Path) -> Result<Connection> {
        let conn = Connection::open(db_path).map_err(db_err)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA foreign_keys = ON;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(db_err)?;
        Ok(conn)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    // ---------------------------------------------------------------
    // Lookup
    // ---------------------------------------------------------------

    /// Full record by company code, or by tax id (digits compared).
    ///
    /// The stored detail map becomes the record's `details`; legal name,
    /// tax id and address are filled from it when present.
    pub fn get_company(&self, identifier: &str) -> Result<Option<CompanyRecord>> {
        let conn = self.conn.lock();

        let mut basic = Self::basic_row(&conn, identifier)?;
        if basic.is_none() {
            if let Some(cod) = Self::cod_for_tax_id(&conn, identifier)? {
                basic = Self::basic_row(&conn, &cod)?;
            }
        }
        let Some(summary) = basic else {
            debug!("No company for '{}'", identifier);
            return Ok(None);
        };

        let raw: Option<String> = conn
            .query_row(
                "SELECT companie_data FROM companies_data WHERE cod = ?1",
                params![summary.cod],
                |row| row.get(0),
            )
            .optional()
            .map_err(db_err)?
            .flatten();
        let details = match raw.as_deref().filter(|s| !s.is_empty()) {
            Some(raw) => serde_json::from_str::<Map<String, Value>>(raw).unwrap_or_else(|e| {
                warn!("Bad detail JSON for company {}: {}", summary.cod, e);
                Map::new()
            }),
            None => Map::new(),
        };

        let mut record = CompanyRecord {
            cod: summary.cod,
            name: summary.name,
            group_name: summary.group_name,
            details: Some(Value::Object(details)),
            ..Default::default()
        };
        let data = record.contract_data();
        let non_empty = |s: String| Some(s).filter(|s| !s.is_empty());
        record.legal_name = non_empty(data.legal_name);
        record.tax_id = non_empty(data.tax_id);
        record.address = non_empty(data.address);
        Ok(Some(record))
    }

    fn basic_row(conn: &Connection, cod: &str) -> Result<Option<CompanySummary>> {
        conn.prepare_cached("SELECT cod, name, group_name FROM companies WHERE cod = ?1")
            .map_err(db_err)?
            .query_row(params![cod], Self::row_to_summary)
            .optional()
            .map_err(db_err)
    }

    /// Scan stored detail maps for a matching `cnpj`/`CNPJ`.
    fn cod_for_tax_id(conn: &Connection, identifier: &str) -> Result<Option<String>> {
        let wanted = digits(identifier);
        if wanted.is_empty() {
            return Ok(None);
        }

        let mut stmt = conn
            .prepare("SELECT cod, companie_data FROM companies_data ORDER BY cod")
            .map_err(db_err)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?))
            })
            .map_err(db_err)?;

        for (cod, raw) in rows.filter_map(|r| r.ok()) {
            let Some(data) = raw.and_then(|r| serde_json::from_str::<Map<String, Value>>(&r).ok())
            else {
                continue;
            };
            let tax_id = ["cnpj", "CNPJ"]
                .iter()
                .filter_map(|k| data.get(*k).and_then(Value::as_str))
                .find(|s| !s.is_empty());
            if tax_id.is_some_and(|t| digits(t) == wanted) {
                return Ok(Some(cod));
            }
        }
        Ok(None)
    }

    // ---------------------------------------------------------------
    // Listing
    // ---------------------------------------------------------------

    /// Companies whose name or code contains `query`; all when empty.
    pub fn search_companies(&self, query: &str, limit: usize) -> Result<Vec<CompanySummary>> {
        let conn = self.conn.lock();
        let query = query.trim();
        let mut stmt;
        let rows = if query.is_empty() {
            stmt = conn
                .prepare_cached("SELECT cod, name, group_name FROM companies ORDER BY name LIMIT ?1")
                .map_err(db_err)?;
            stmt.query_map(params![limit as i64], Self::row_to_summary)
        } else {
            stmt = conn
                .prepare_cached(
                    "SELECT cod, name, group_name FROM companies
                     WHERE name LIKE ?1 OR cod LIKE ?1 ORDER BY name LIMIT ?2",
                )
                .map_err(db_err)?;
            stmt.query_map(
                params![format!("%{}%", query), limit as i64],
                Self::row_to_summary,
            )
        }
        .map_err(db_err)?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    pub fn count_companies(&self) -> Result<i64> {
        let conn = self.conn.lock();
        conn.query_row("SELECT COUNT(*) FROM companies", [], |row| row.get(0))
            .map_err(db_err)
    }

    /// Codes of companies with no stored detail map.
    pub fn companies_without_details(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT c.cod FROM companies c
                 LEFT JOIN companies_data cd ON c.cod = cd.cod
                 WHERE cd.cod IS NULL OR cd.companie_data IS NULL OR cd.companie_data = ''
                 ORDER BY c.cod",
            )
            .map_err(db_err)?;
        let rows = stmt.query_map([], |row| row.get(0)).map_err(db_err)?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    fn row_to_summary(row: &rusqlite::Row<'_>) -> rusqlite::Result<CompanySummary> {
        Ok(CompanySummary {
            cod: row.get(0)?,
            name: row.get(1)?,
            group_name: row.get(2)?,
        })
    }

    // ---------------------------------------------------------------
    // Sync
    // ---------------------------------------------------------------

    /// Upsert the importer's rows into both tables in one transaction.
    pub fn sync_companies(&self, companies: &[CompanyImport]) -> Result<SyncReport> {
        let now = Utc::now();
        let millis = now.timestamp_millis();
        let mut report = SyncReport {
            processed_count: companies.len(),
            timestamp: now.to_rfc3339(),
            ..Default::default()
        };

        let mut conn = self.conn.lock();
        let tx = conn.transaction().map_err(db_err)?;
        for company in companies {
            let extra = serde_json::to_string(&company.extra_data)?;

            let exists = tx
                .query_row(
                    "SELECT 1 FROM companies WHERE cod = ?1",
                    params![company.cod],
                    |_| Ok(()),
                )
                .optional()
                .map_err(db_err)?
                .is_some();
            if exists {
                tx.execute(
                    "UPDATE companies SET name = ?2, group_name = ?3, updated_at = ?4 WHERE cod = ?1",
                    params![company.cod, company.name, company.group_name, millis],
                )
                .map_err(db_err)?;
                report.companies_updated += 1;
            } else {
                tx.execute(
                    "INSERT INTO companies (cod, name, group_name, updated_at) VALUES (?1, ?2, ?3, ?4)",
                    params![company.cod, company.name, company.group_name, millis],
                )
                .map_err(db_err)?;
                report.companies_new += 1;
            }

            let data_exists = tx
                .query_row(
                    "SELECT 1 FROM companies_data WHERE cod = ?1",
                    params![company.cod],
                    |_| Ok(()),
                )
                .optional()
                .map_err(db_err)?
                .is_some();
            if data_exists {
                tx.execute(
                    "UPDATE companies_data SET name = ?2, group_name = ?3, companie_data = ?4,
                     updated_at = ?5 WHERE cod = ?1",
                    params![company.cod, company.name, company.group_name, extra, millis],
                )
                .map_err(db_err)?;
                report.companies_data_updated += 1;
            } else {
                tx.execute(
                    "INSERT INTO companies_data (cod, name, group_name, companie_data, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![company.cod, company.name, company.group_name, extra, millis],
                )
                .map_err(db_err)?;
                report.companies_data_new += 1;
            }
        }
        tx.commit().map_err(db_err)?;

        info!(
            "Synced {} companies: {} new, {} updated",
            report.processed_count, report.companies_new, report.companies_updated
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn test_store() -> (SqliteStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::open(dir.path()).unwrap();
        (store, dir)
    }

    fn import(cod: &str, name: &str, extra: Value) -> CompanyImport {
        CompanyImport {
            cod: cod.into(),
            name: Some(name.into()),
            group_name: Some("Grupo A".into()),
            extra_data: match extra {
                Value::Object(map) => map,
                _ => Map::new(),
            },
        }
    }

    fn seed(store: &SqliteStore) {
        store
            .sync_companies(&[
                import(
                    "101",
                    "Acme",
                    json!({
                        "Razão Social": "ACME COMERCIO LTDA",
                        "CNPJ": "12.345.678/0001-90",
                        "Endereço": "Rua das Flores, 10",
                        "Faturamento Contábil": "GF SERVIÇOS",
                    }),
                ),
                import("102", "Padaria Central", json!({})),
            ])
            .unwrap();
    }

    #[test]
    fn test_sync_counts_new_then_updated() {
        let (store, _dir) = test_store();
        let first = store
            .sync_companies(&[import("1", "A", json!({})), import("2", "B", json!({}))])
            .unwrap();
        assert_eq!(first.processed_count, 2);
        assert_eq!(first.companies_new, 2);
        assert_eq!(first.companies_data_new, 2);
        assert_eq!(first.companies_updated, 0);

        let second = store
            .sync_companies(&[import("2", "B2", json!({})), import("3", "C", json!({}))])
            .unwrap();
        assert_eq!(second.companies_new, 1);
        assert_eq!(second.companies_updated, 1);
        assert_eq!(second.companies_data_updated, 1);
        assert_eq!(store.count_companies().unwrap(), 3);
        assert_eq!(
            store.get_company("2").unwrap().unwrap().name.as_deref(),
            Some("B2")
        );
    }

    #[test]
    fn test_get_company_by_code() {
        let (store, _dir) = test_store();
        seed(&store);

        let record = store.get_company("101").unwrap().unwrap();
        assert_eq!(record.cod, "101");
        assert_eq!(record.legal_name.as_deref(), Some("ACME COMERCIO LTDA"));
        assert_eq!(record.tax_id.as_deref(), Some("12.345.678/0001-90"));
        assert_eq!(record.address.as_deref(), Some("Rua das Flores, 10"));
        let details = record.detail_map().unwrap();
        assert_eq!(details["Faturamento Contábil"], "GF SERVIÇOS");
    }

    #[test]
    fn test_get_company_by_tax_id_digits() {
        let (store, _dir) = test_store();
        seed(&store);

        let record = store.get_company("12345678000190").unwrap().unwrap();
        assert_eq!(record.cod, "101");
        let record = store.get_company("12.345.678/0001-90").unwrap().unwrap();
        assert_eq!(record.cod, "101");
        assert!(store.get_company("99.999.999/0001-99").unwrap().is_none());
        assert!(store.get_company("").unwrap().is_none());
    }

    #[test]
    fn test_legal_name_falls_back_to_name() {
        let (store, _dir) = test_store();
        seed(&store);

        let record = store.get_company("102").unwrap().unwrap();
        assert_eq!(record.legal_name.as_deref(), Some("Padaria Central"));
        assert!(record.tax_id.is_none());
        assert_eq!(record.contract_data().missing_fields(), ["tax_id", "address"]);
    }

    #[test]
    fn test_search_and_missing_details() {
        let (store, _dir) = test_store();
        seed(&store);
        store
            .conn
            .lock()
            .execute(
                "INSERT INTO companies (cod, name, group_name) VALUES ('103', 'Sem Dados', NULL)",
                [],
            )
            .unwrap();

        let hits = store.search_companies("pada", 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].cod, "102");
        assert_eq!(store.search_companies("10", 10).unwrap().len(), 3);
        assert_eq!(store.search_companies("", 2).unwrap().len(), 2);

        assert_eq!(store.companies_without_details().unwrap(), ["103"]);
    }
}
