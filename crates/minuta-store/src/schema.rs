//! Database schema SQL.

pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS companies (
    cod TEXT PRIMARY KEY,
    name TEXT,
    group_name TEXT,
    updated_at INTEGER
);

CREATE INDEX IF NOT EXISTS idx_companies_name ON companies(name);

CREATE TABLE IF NOT EXISTS companies_data (
    cod TEXT PRIMARY KEY REFERENCES companies(cod) ON DELETE CASCADE,
    name TEXT,
    group_name TEXT,
    companie_data TEXT,
    updated_at INTEGER
);
"#;
