//! HTTP route handlers.

pub mod companies;
pub mod contracts;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use minuta_core::Error;

/// Build the main Axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(contracts::routes())
        .merge(companies::routes())
}

/// `{"error": message}` with `status`.
pub(crate) fn error_json(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}

/// Map a core error onto a response.
pub(crate) fn error_response(err: &Error) -> Response {
    match err {
        Error::Validation { missing } => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": err.to_string(),
                "missing_fields": missing,
            })),
        )
            .into_response(),
        Error::NotFound(_) => error_json(StatusCode::NOT_FOUND, err.to_string()),
        _ => error_json(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

/// Run blocking document or database work off the async runtime.
pub(crate) async fn blocking<T, F>(f: F) -> Result<T, Response>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| error_response(&Error::Internal(e.to_string())))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use minuta_contract::ContractGenerator;
    use minuta_core::{DataPaths, MinutaConfig};
    use minuta_docx::Document;
    use minuta_store::{CompanyImport, SqliteStore};
    use tempfile::TempDir;
    use tower::ServiceExt;

    pub fn test_app() -> (Router, Arc<AppState>, TempDir) {
        let dir = TempDir::new().unwrap();
        let data_paths = DataPaths::new(dir.path().join("data")).unwrap();
        let output_dir = dir.path().join("out");
        std::fs::create_dir_all(&output_dir).unwrap();

        let template_path = data_paths.default_template();
        let mut template = Document::new();
        template.add_paragraph("CONTRATO DE PRESTAÇÃO DE SERVIÇOS");
        template.add_paragraph(
            "a) GF SERVIÇOS ADMINISTRATIVOS LTDA., ...; e b) E.REEVE SERVIÇOS CONTÁBEIS LTDA., ...",
        );
        template.add_paragraph(
            "CONTRATANTE: [LEGAL_NAME], inscrita no CNPJ sob o nº [TAX_ID], com sede à [ADDRESS], neste ato representada.",
        );
        template.add_table(&[vec!["Contratante".into(), "[LEGAL_NAME]".into()]]);
        template.save(&template_path).unwrap();

        let config = MinutaConfig {
            port: 0,
            template_path: template_path.clone(),
            output_dir: output_dir.clone(),
            pdf_converter: "minuta-no-such-converter".into(),
            convert_timeout_secs: 5,
            data_paths,
        };
        let store = SqliteStore::open(&config.data_paths.db).unwrap();
        let mut extra = serde_json::Map::new();
        extra.insert("Razão Social".into(), "ACME COMERCIO LTDA".into());
        extra.insert("CNPJ".into(), "12.345.678/0001-90".into());
        extra.insert("Endereço".into(), "Rua das Flores, 10".into());
        extra.insert("Faturamento Contábil".into(), "HR HILL".into());
        store
            .sync_companies(&[
                CompanyImport {
                    cod: "101".into(),
                    name: Some("Acme".into()),
                    group_name: None,
                    extra_data: extra,
                },
                CompanyImport {
                    cod: "102".into(),
                    name: Some("Padaria Central".into()),
                    ..Default::default()
                },
            ])
            .unwrap();

        let generator = ContractGenerator::new(template_path, output_dir).unwrap();
        let state = Arc::new(AppState::new(config, store, generator));
        (build_router(state.clone()), state, dir)
    }

    /// Send one request; returns status and body bytes.
    pub async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, Vec<u8>) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    pub async fn send_json(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let (status, bytes) = send(app, method, uri, body).await;
        (status, serde_json::from_slice(&bytes).unwrap())
    }
}
