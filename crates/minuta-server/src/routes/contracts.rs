//! Contract generation, download, editing and conversion.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::info;

use super::{blocking, error_json, error_response};
use crate::convert::convert_to_pdf;
use crate::state::AppState;
use minuta_contract::{contractor, extract, reconstruct};
use minuta_core::{CompanyRecord, Error};

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/contracts/generate", post(generate_contract))
        .route("/contracts/preview", post(preview_contract))
        .route("/contracts/download/{filename}", get(download_contract))
        .route(
            "/contracts/content/{filename}",
            get(get_content).put(put_content),
        )
        .route("/contracts/update/{filename}", post(update_contract))
        .route("/contracts/pdf/{filename}", get(contract_pdf))
        .route("/contracts/template/info", get(template_info))
}

#[derive(Debug, Deserialize)]
struct CompanyRequest {
    cnpj: String,
}

#[derive(Debug, Deserialize)]
struct ContentRequest {
    content: String,
}

fn download_url(filename: &str) -> String {
    format!("/api/contracts/download/{}", filename)
}

/// Resolve `filename` inside the output directory; 400 for unsafe names,
/// 404 when absent.
fn existing_contract(state: &AppState, filename: &str) -> Result<std::path::PathBuf, Response> {
    let path = state
        .contract_path(filename)
        .ok_or_else(|| error_json(StatusCode::BAD_REQUEST, "Invalid filename"))?;
    if !path.is_file() {
        return Err(error_json(StatusCode::NOT_FOUND, "Contract not found"));
    }
    Ok(path)
}

fn file_response(bytes: Vec<u8>, content_type: &str, filename: &str) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    )
        .into_response()
}

/// POST /api/contracts/generate — fill the template for a company.
async fn generate_contract(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CompanyRequest>,
) -> Response {
    let result = blocking(move || {
        let record = state
            .store
            .get_company(&req.cnpj)?
            .ok_or_else(|| Error::NotFound(format!("company {}", req.cnpj)))?;
        state.generator.generate(&record)
    })
    .await;

    match result {
        Ok(Ok(contract)) => Json(serde_json::json!({
            "success": true,
            "download_url": download_url(&contract.file_name),
            "filename": contract.file_name,
            "company": contract.data,
            "signatories": contract.signatories,
            "replacements": contract.replacements,
        }))
        .into_response(),
        Ok(Err(e)) => error_response(&e),
        Err(response) => response,
    }
}

/// POST /api/contracts/preview — what generation would use, without writing.
async fn preview_contract(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CompanyRequest>,
) -> Response {
    let lookup = blocking(move || {
        let record = state.store.get_company(&req.cnpj)?;
        Ok::<_, Error>(record.map(|r| {
            let clause = state.generator.clause(&r);
            (r, clause)
        }))
    })
    .await;

    match lookup {
        Ok(Ok(Some((record, clause)))) => {
            let data = record.contract_data();
            let missing = data.missing_fields();
            let can_generate = missing.is_empty();
            Json(serde_json::json!({
                "company_info": {
                    "cod": record.cod,
                    "name": record.name,
                    "group_name": record.group_name,
                },
                "contract_data": data,
                "missing_fields": missing,
                "can_generate": can_generate,
                "signatories": clause.signatories,
                "signatory_clause": clause.text,
            }))
            .into_response()
        }
        Ok(Ok(None)) => error_json(StatusCode::NOT_FOUND, "Company not found"),
        Ok(Err(e)) => error_response(&e),
        Err(response) => response,
    }
}

/// GET /api/contracts/download/{filename}
async fn download_contract(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Response {
    let path = match existing_contract(&state, &filename) {
        Ok(path) => path,
        Err(response) => return response,
    };
    match tokio::fs::read(&path).await {
        Ok(bytes) => file_response(bytes, DOCX_MIME, &filename),
        Err(e) => error_response(&Error::Io(e)),
    }
}

/// GET /api/contracts/content/{filename} — editable plain text.
async fn get_content(State(state): State<Arc<AppState>>, Path(filename): Path<String>) -> Response {
    let path = match existing_contract(&state, &filename) {
        Ok(path) => path,
        Err(response) => return response,
    };
    match blocking(move || extract(&path)).await {
        Ok(content) => Json(serde_json::json!({
            "filename": filename,
            "content": content,
        }))
        .into_response(),
        Err(response) => response,
    }
}

/// PUT /api/contracts/content/{filename} — rebuild from edited text.
async fn put_content(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
    Json(req): Json<ContentRequest>,
) -> Response {
    let path = match existing_contract(&state, &filename) {
        Ok(path) => path,
        Err(response) => return response,
    };
    match blocking(move || reconstruct(&path, &req.content)).await {
        Ok(Ok(edited)) => {
            let edited_name = edited
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            info!("Contract {} edited as {}", filename, edited_name);
            Json(serde_json::json!({
                "success": true,
                "filename": edited_name,
                "download_url": download_url(&edited_name),
            }))
            .into_response()
        }
        Ok(Err(e)) => error_response(&e),
        Err(response) => response,
    }
}

/// POST /api/contracts/update/{filename} — regenerate from the template
/// using the contractor line found in the edited text.
async fn update_contract(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
    Json(req): Json<ContentRequest>,
) -> Response {
    let path = match existing_contract(&state, &filename) {
        Ok(path) => path,
        Err(response) => return response,
    };
    let Some(data) = contractor::parse(&req.content) else {
        return error_json(
            StatusCode::BAD_REQUEST,
            "Contractor data not found in the edited text",
        );
    };

    let result = blocking(move || {
        let record = state
            .store
            .get_company(&data.tax_id)?
            .unwrap_or_else(|| CompanyRecord::from_contract_data(&data));
        state.generator.regenerate(&record, &data, &path)
    })
    .await;

    match result {
        Ok(Ok(contract)) => Json(serde_json::json!({
            "success": true,
            "filename": filename,
            "download_url": download_url(&filename),
            "company": contract.data,
        }))
        .into_response(),
        Ok(Err(e)) => error_response(&e),
        Err(response) => response,
    }
}

/// GET /api/contracts/pdf/{filename} — PDF, or the document itself when
/// conversion is unavailable.
async fn contract_pdf(State(state): State<Arc<AppState>>, Path(filename): Path<String>) -> Response {
    let path = match existing_contract(&state, &filename) {
        Ok(path) => path,
        Err(response) => return response,
    };
    let output = convert_to_pdf(
        &state.config.pdf_converter,
        &path,
        state.config.convert_timeout(),
    )
    .await;

    let (content_type, name) = if output == path {
        (DOCX_MIME, filename)
    } else {
        let name = output
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        ("application/pdf", name)
    };
    match tokio::fs::read(&output).await {
        Ok(bytes) => file_response(bytes, content_type, &name),
        Err(e) => error_response(&Error::Io(e)),
    }
}

/// GET /api/contracts/template/info
async fn template_info(State(state): State<Arc<AppState>>) -> Response {
    match blocking(move || state.generator.validate_template()).await {
        Ok(info) => Json(info).into_response(),
        Err(response) => response,
    }
}
