//! Company registry lookups.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use super::{blocking, error_json, error_response};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/companies", get(search_companies))
        .route("/companies/{id}", get(get_company))
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    50
}

/// GET /api/companies?q=&limit= — search by name or code.
async fn search_companies(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Response {
    let result = blocking(move || {
        let companies = state.store.search_companies(&params.q, params.limit)?;
        let total = state.store.count_companies()?;
        Ok::<_, minuta_core::Error>((companies, total))
    })
    .await;

    match result {
        Ok(Ok((companies, total))) => Json(serde_json::json!({
            "companies": companies,
            "count": companies.len(),
            "total": total,
        }))
        .into_response(),
        Ok(Err(e)) => error_response(&e),
        Err(response) => response,
    }
}

/// GET /api/companies/{id} — full record by code or CNPJ.
async fn get_company(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    let lookup = blocking(move || state.store.get_company(&id)).await;

    match lookup {
        Ok(Ok(Some(record))) => {
            let data = record.contract_data();
            Json(serde_json::json!({
                "company": record,
                "contract_data": data,
                "missing_fields": data.missing_fields(),
            }))
            .into_response()
        }
        Ok(Ok(None)) => error_json(StatusCode::NOT_FOUND, "Company not found"),
        Ok(Err(e)) => error_response(&e),
        Err(response) => response,
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{send_json, test_app};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_search_companies() {
        let (app, _state, _dir) = test_app();
        let (status, body) = send_json(&app, "GET", "/api/companies?q=pada", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);
        assert_eq!(body["total"], 2);
        assert_eq!(body["companies"][0]["cod"], "102");
    }

    #[tokio::test]
    async fn test_get_company_by_cnpj() {
        let (app, _state, _dir) = test_app();
        let (status, body) = send_json(&app, "GET", "/api/companies/12345678000190", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["company"]["cod"], "101");
        assert_eq!(body["contract_data"]["legal_name"], "ACME COMERCIO LTDA");
        assert_eq!(body["missing_fields"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_unknown_company() {
        let (app, _state, _dir) = test_app();
        let (status, body) = send_json(&app, "GET", "/api/companies/999", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].is_string());
    }
}
