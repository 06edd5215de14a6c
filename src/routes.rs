use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::Engine;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    catalog::module_summary,
    config::AppConfig,
    error::ReportError,
    layout::Document,
    models::{ModuleCollectionPayload, ModuleProgressPayload, MoodEntriesReportData, NhsPrepData, ReportData},
    report::{
        generate_module_pdf, generate_modules_pdf, generate_mood_entries_pdf, generate_nhs_prep_pdf,
        generate_progress_report_pdf, progress_export_filename, RenderOptions, ReportKind,
    },
    store::ReportStore,
};

#[derive(Debug, Clone)]
pub struct StoredReport {
    pub id: Uuid,
    pub kind: ReportKind,
    pub filename: String,
    pub document: Document,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub id: Uuid,
    pub kind: ReportKind,
    pub filename: String,
    pub page_count: usize,
    pub created_at: DateTime<Utc>,
}

impl From<&StoredReport> for ReportSummary {
    fn from(r: &StoredReport) -> Self {
        Self {
            id: r.id,
            kind: r.kind,
            filename: r.filename.clone(),
            page_count: r.document.page_count(),
            created_at: r.created_at,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<ReportStore>>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let store = ReportStore::new(config.store_capacity);
        Self { store: Arc::new(RwLock::new(store)), config: Arc::new(config) }
    }

    fn options(&self) -> RenderOptions { RenderOptions::new(self.config.layout()) }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/reports/progress", post(create_progress_report))
        .route("/api/reports/mood-entries", post(create_mood_entries_report))
        .route("/api/reports/nhs-prep", post(create_nhs_prep_report))
        .route("/api/reports/module", post(create_module_report))
        .route("/api/reports/modules", post(create_modules_report))
        .route("/api/reports/:id", get(get_report).delete(delete_report))
        .route("/api/reports/:id/pdf", get(export_pdf))
        .route("/api/reports/:id/pdf-base64", get(export_pdf_base64))
        .route("/api/reports/:id/text", get(export_text))
        .route("/api/progress/export", post(export_progress_json))
        .route("/api/modules/:week", get(get_module))
        .with_state(state)
}

fn error_response(err: ReportError) -> Response {
    let status = if err.is_missing_input() { StatusCode::UNPROCESSABLE_ENTITY } else { StatusCode::INTERNAL_SERVER_ERROR };
    tracing::error!("❌ {}", err);
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}

/// Malformed request bodies get the same `{ "error" }` shape as report failures.
fn rejection_response(rejection: JsonRejection) -> Response {
    let message = rejection.body_text();
    tracing::warn!("⚠️ Rejected payload: {}", message);
    (rejection.status(), Json(json!({ "error": message }))).into_response()
}

async fn archive(dir: std::path::PathBuf, report: &StoredReport) {
    let path = dir.join(format!("{}-{}", report.id, report.filename));
    let document = report.document.clone();
    let saved = tokio::task::spawn_blocking(move || {
        let result = document.save(&path);
        (path, result)
    })
    .await;
    match saved {
        Ok((path, Ok(()))) => tracing::info!("📦 Archived report to {}", path.display()),
        Ok((path, Err(e))) => tracing::warn!("⚠️ Could not archive report to {}: {}", path.display(), e),
        Err(e) => tracing::warn!("⚠️ Archive task failed: {}", e),
    }
}

async fn store_report(state: &AppState, kind: ReportKind, result: Result<Document, ReportError>) -> Response {
    let document = match result {
        Ok(document) => document,
        Err(e) => return error_response(e),
    };
    let created_at = Utc::now();
    let report = StoredReport {
        id: Uuid::new_v4(),
        kind,
        filename: kind.filename(created_at.date_naive()),
        document,
        created_at,
    };
    let summary = ReportSummary::from(&report);
    if let Some(dir) = state.config.archive_dir.clone() {
        archive(dir, &report).await;
    }
    tracing::info!("✅ Stored {} {} ({} pages)", kind.name(), report.id, summary.page_count);
    let evicted = state.store.write().insert(report);
    if !evicted.is_empty() {
        tracing::debug!(count = evicted.len(), "evicted oldest reports");
    }
    (StatusCode::CREATED, Json(summary)).into_response()
}

pub async fn create_progress_report(
    State(state): State<AppState>,
    payload: Result<Json<ReportData>, JsonRejection>,
) -> Response {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => return rejection_response(rejection),
    };
    tracing::info!("🚀 Generating progress report");
    let result = generate_progress_report_pdf(&body, &state.options());
    store_report(&state, ReportKind::Progress, result).await
}

pub async fn create_mood_entries_report(
    State(state): State<AppState>,
    payload: Result<Json<MoodEntriesReportData>, JsonRejection>,
) -> Response {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => return rejection_response(rejection),
    };
    tracing::info!("🚀 Generating mood report for {} entries", body.entries.len());
    let result = generate_mood_entries_pdf(&body, &state.options());
    store_report(&state, ReportKind::MoodEntries, result).await
}

pub async fn create_nhs_prep_report(
    State(state): State<AppState>,
    payload: Result<Json<NhsPrepData>, JsonRejection>,
) -> Response {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => return rejection_response(rejection),
    };
    tracing::info!("🚀 Generating NHS transition report");
    let result = generate_nhs_prep_pdf(&body, &state.options());
    store_report(&state, ReportKind::NhsPrep, result).await
}

pub async fn create_module_report(
    State(state): State<AppState>,
    payload: Result<Json<ModuleProgressPayload>, JsonRejection>,
) -> Response {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => return rejection_response(rejection),
    };
    tracing::info!("🚀 Generating module report for week {}", body.module.week);
    let result = generate_module_pdf(&body, &state.options());
    store_report(&state, ReportKind::Module, result).await
}

pub async fn create_modules_report(
    State(state): State<AppState>,
    payload: Result<Json<ModuleCollectionPayload>, JsonRejection>,
) -> Response {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => return rejection_response(rejection),
    };
    tracing::info!("🚀 Generating report for {} modules", body.modules.len());
    let result = generate_modules_pdf(&body, &state.options());
    store_report(&state, ReportKind::Modules, result).await
}

pub async fn get_report(Path(id): Path<Uuid>, State(state): State<AppState>) -> Response {
    match state.store.read().get(&id) {
        Some(report) => Json(ReportSummary::from(report)).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

pub async fn delete_report(Path(id): Path<Uuid>, State(state): State<AppState>) -> StatusCode {
    match state.store.write().remove(&id) {
        Some(report) => {
            tracing::info!("🗑️ Deleted {} {}", report.kind.name(), id);
            StatusCode::NO_CONTENT
        }
        None => StatusCode::NOT_FOUND,
    }
}

fn lookup(state: &AppState, id: &Uuid) -> Option<(String, Document)> {
    state.store.read().get(id).map(|r| (r.filename.clone(), r.document.clone()))
}

pub async fn export_pdf(Path(id): Path<Uuid>, State(state): State<AppState>) -> Response {
    let Some((filename, document)) = lookup(&state, &id) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    match document.to_pdf_bytes() {
        Ok(bytes) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "application/pdf".to_string()),
                (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", filename)),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn export_pdf_base64(Path(id): Path<Uuid>, State(state): State<AppState>) -> Response {
    let Some((filename, document)) = lookup(&state, &id) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    match document.to_pdf_bytes() {
        Ok(bytes) => Json(json!({
            "filename": filename,
            "pageCount": document.page_count(),
            "pdfBase64": base64::engine::general_purpose::STANDARD.encode(bytes),
        }))
        .into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn export_text(Path(id): Path<Uuid>, State(state): State<AppState>) -> Response {
    match lookup(&state, &id) {
        Some((_, document)) => {
            ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], document.to_plain_text()).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Echoes the caller's progress payload back as a JSON download stamped
/// with `exportedAt`.
pub async fn export_progress_json(Json(body): Json<serde_json::Value>) -> Response {
    let now = Utc::now();
    let exported = match body {
        serde_json::Value::Object(mut map) => {
            map.insert("exportedAt".to_string(), json!(now));
            serde_json::Value::Object(map)
        }
        other => json!({ "data": other, "exportedAt": now }),
    };
    let bytes = match serde_json::to_vec_pretty(&exported) {
        Ok(bytes) => bytes,
        Err(e) => return error_response(ReportError::Io(e.into())),
    };
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", progress_export_filename(now.date_naive()))),
        ],
        bytes,
    )
        .into_response()
}

pub async fn get_module(Path(week): Path<u32>) -> Response {
    match module_summary(week) {
        Some(summary) => Json(summary).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
