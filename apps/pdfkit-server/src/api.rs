//! API handlers for the PDF toolkit server
//!
//! Three session-scoped tab flows, each Upload → Configure → Process →
//! Download:
//! - Merge: ordered multi-file list, reorder, concatenate
//! - Split: single file, mode-driven page ranges, per-output download
//! - Convert: single file, text extraction, edit, TXT/DOCX export
//!
//! File payloads cross the JSON boundary base64-encoded; downloads are
//! served as raw bytes with a Content-Disposition filename.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use pdfkit_core::{DocumentInfo, ExportFormat, FileUpload, OutputFile, SplitMode};

use crate::error::ServerError;
use crate::AppState;

/// Build the API router; middleware layers are applied by the caller.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/api/sessions", post(handle_create_session))
        .route("/api/sessions/:id", delete(handle_delete_session))
        .route(
            "/api/sessions/:id/merge/files",
            post(handle_merge_add_files).get(handle_merge_list_files),
        )
        .route("/api/sessions/:id/merge/reorder", post(handle_merge_reorder))
        .route("/api/sessions/:id/merge/process", post(handle_merge_process))
        .route("/api/sessions/:id/merge/download", get(handle_merge_download))
        .route("/api/sessions/:id/merge", delete(handle_merge_clear))
        .route("/api/sessions/:id/split/file", post(handle_split_upload))
        .route("/api/sessions/:id/split/process", post(handle_split_process))
        .route("/api/sessions/:id/split/outputs", get(handle_split_outputs))
        .route(
            "/api/sessions/:id/split/download/:index",
            get(handle_split_download),
        )
        .route("/api/sessions/:id/split", delete(handle_split_clear))
        .route("/api/sessions/:id/convert/file", post(handle_convert_upload))
        .route(
            "/api/sessions/:id/convert/extract",
            post(handle_convert_extract),
        )
        .route("/api/sessions/:id/convert/text", put(handle_convert_update_text))
        .route(
            "/api/sessions/:id/convert/export/:format",
            get(handle_convert_export),
        )
        .route("/api/sessions/:id/convert", delete(handle_convert_clear))
        .with_state(state)
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "pdfkit-server",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
pub struct CreateSessionResponse {
    pub success: bool,
    pub session_id: String,
}

/// Handler: POST /api/sessions
pub async fn handle_create_session(
    State(state): State<Arc<AppState>>,
) -> Json<CreateSessionResponse> {
    let session_id = state.sessions.create().await;
    info!("Created session {}", session_id);
    Json(CreateSessionResponse {
        success: true,
        session_id,
    })
}

#[derive(Serialize)]
pub struct OkResponse {
    pub success: bool,
}

/// Handler: DELETE /api/sessions/:id
pub async fn handle_delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<OkResponse>, ServerError> {
    if !state.sessions.remove(&id).await {
        return Err(ServerError::SessionNotFound(id));
    }
    info!("Deleted session {}", id);
    Ok(Json(OkResponse { success: true }))
}

/// One file in an upload request, base64-encoded.
#[derive(Deserialize)]
pub struct UploadEntry {
    pub filename: String,

    /// Content type declared by the upload layer.
    #[serde(default = "default_content_type")]
    pub content_type: String,

    /// Base64-encoded file bytes.
    pub data_base64: String,
}

fn default_content_type() -> String {
    "application/pdf".to_string()
}

impl UploadEntry {
    /// Decode the transport encoding; malformed base64 is a request-level
    /// failure, unlike a non-PDF payload which is rejected per entry.
    fn decode(self) -> Result<FileUpload, ServerError> {
        let bytes = BASE64.decode(&self.data_base64).map_err(|e| {
            ServerError::InvalidRequest(format!("invalid base64 for '{}': {}", self.filename, e))
        })?;
        Ok(FileUpload {
            filename: self.filename,
            content_type: self.content_type,
            bytes,
        })
    }
}

/// Metadata for one processed output.
#[derive(Serialize)]
pub struct OutputInfo {
    pub index: usize,
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
    pub size_display: String,
}

impl OutputInfo {
    fn from_output(index: usize, output: &OutputFile) -> Self {
        Self {
            index,
            filename: output.filename.clone(),
            page_count: output.page_count,
            size_display: output.size_display.clone(),
        }
    }
}

/// Serve a processed output as a file download.
fn download_response(
    filename: &str,
    mime_type: &str,
    bytes: Vec<u8>,
) -> (StatusCode, [(String, String); 2], Vec<u8>) {
    (
        StatusCode::OK,
        [
            ("Content-Type".to_string(), mime_type.to_string()),
            (
                "Content-Disposition".to_string(),
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    )
}

// ---- Merge tab ----

#[derive(Deserialize)]
pub struct AddFilesRequest {
    pub files: Vec<UploadEntry>,
}

#[derive(Serialize)]
pub struct RejectedEntry {
    pub filename: String,
    pub error: String,
}

#[derive(Serialize)]
pub struct AddFilesResponse {
    pub success: bool,
    pub added: Vec<DocumentInfo>,
    pub rejected: Vec<RejectedEntry>,
    /// List length after the append.
    pub count: usize,
}

/// Handler: POST /api/sessions/:id/merge/files
pub async fn handle_merge_add_files(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<AddFilesRequest>,
) -> Result<Json<AddFilesResponse>, ServerError> {
    let mut files = Vec::with_capacity(req.files.len());
    for entry in req.files {
        files.push(entry.decode()?);
    }

    state
        .sessions
        .with_session(&id, |session| {
            let outcome = session.merge.add_files(files);
            info!(
                "Merge upload: {} added, {} rejected",
                outcome.added.len(),
                outcome.rejected.len()
            );
            Ok(Json(AddFilesResponse {
                success: true,
                count: session.merge.len(),
                added: outcome.added,
                rejected: outcome
                    .rejected
                    .into_iter()
                    .map(|r| RejectedEntry {
                        filename: r.filename,
                        error: r.error.to_string(),
                    })
                    .collect(),
            }))
        })
        .await
}

#[derive(Serialize)]
pub struct FileListResponse {
    pub success: bool,
    pub files: Vec<DocumentInfo>,
}

/// Handler: GET /api/sessions/:id/merge/files
pub async fn handle_merge_list_files(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<FileListResponse>, ServerError> {
    state
        .sessions
        .with_session(&id, |session| {
            Ok(Json(FileListResponse {
                success: true,
                files: session.merge.documents().collect(),
            }))
        })
        .await
}

#[derive(Deserialize)]
pub struct ReorderRequest {
    pub from: usize,
    pub to: usize,
}

/// Handler: POST /api/sessions/:id/merge/reorder
pub async fn handle_merge_reorder(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ReorderRequest>,
) -> Result<Json<FileListResponse>, ServerError> {
    debug!("Reorder {} -> {} in session {}", req.from, req.to, id);
    state
        .sessions
        .with_session(&id, |session| {
            session.merge.reorder(req.from, req.to)?;
            Ok(Json(FileListResponse {
                success: true,
                files: session.merge.documents().collect(),
            }))
        })
        .await
}

#[derive(Serialize)]
pub struct ProcessResponse {
    pub success: bool,
    pub output: OutputInfo,
}

/// Handler: POST /api/sessions/:id/merge/process
pub async fn handle_merge_process(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ProcessResponse>, ServerError> {
    state
        .sessions
        .with_session(&id, |session| {
            let output = session.merge.process()?;
            info!(
                "Merged session {}: {} pages, {}",
                id,
                output.page_count.unwrap_or(0),
                output.size_display
            );
            Ok(Json(ProcessResponse {
                success: true,
                output: OutputInfo::from_output(0, output),
            }))
        })
        .await
}

/// Handler: GET /api/sessions/:id/merge/download
pub async fn handle_merge_download(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<(StatusCode, [(String, String); 2], Vec<u8>), ServerError> {
    state
        .sessions
        .with_session(&id, |session| {
            let output = session.merge.output().ok_or(ServerError::OutputNotReady)?;
            Ok(download_response(
                &output.filename,
                "application/pdf",
                output.bytes.clone(),
            ))
        })
        .await
}

/// Handler: DELETE /api/sessions/:id/merge
pub async fn handle_merge_clear(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<OkResponse>, ServerError> {
    state
        .sessions
        .with_session(&id, |session| {
            session.merge.clear();
            Ok(Json(OkResponse { success: true }))
        })
        .await
}

// ---- Split tab ----

#[derive(Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub file: DocumentInfo,
}

/// Handler: POST /api/sessions/:id/split/file
pub async fn handle_split_upload(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(entry): Json<UploadEntry>,
) -> Result<Json<UploadResponse>, ServerError> {
    let upload = entry.decode()?;
    state
        .sessions
        .with_session(&id, |session| {
            let file = session.split.set_file(upload)?;
            info!("Split upload: {} ({} pages)", file.filename, file.page_count);
            Ok(Json(UploadResponse {
                success: true,
                file,
            }))
        })
        .await
}

#[derive(Serialize)]
pub struct SplitProcessResponse {
    pub success: bool,
    pub outputs: Vec<OutputInfo>,
    pub count: usize,
}

/// Handler: POST /api/sessions/:id/split/process
///
/// The body is the split mode itself, e.g. `{"mode":"ranges","pages_per_file":4}`.
pub async fn handle_split_process(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(mode): Json<SplitMode>,
) -> Result<Json<SplitProcessResponse>, ServerError> {
    state
        .sessions
        .with_session(&id, |session| {
            let outputs = session.split.process(&mode)?;
            info!("Split session {} into {} outputs", id, outputs.len());
            let outputs: Vec<OutputInfo> = outputs
                .iter()
                .enumerate()
                .map(|(i, o)| OutputInfo::from_output(i, o))
                .collect();
            Ok(Json(SplitProcessResponse {
                success: true,
                count: outputs.len(),
                outputs,
            }))
        })
        .await
}

#[derive(Serialize)]
pub struct SplitOutputsResponse {
    pub success: bool,
    pub outputs: Vec<OutputInfo>,
}

/// Handler: GET /api/sessions/:id/split/outputs
pub async fn handle_split_outputs(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SplitOutputsResponse>, ServerError> {
    state
        .sessions
        .with_session(&id, |session| {
            Ok(Json(SplitOutputsResponse {
                success: true,
                outputs: session
                    .split
                    .outputs()
                    .iter()
                    .enumerate()
                    .map(|(i, o)| OutputInfo::from_output(i, o))
                    .collect(),
            }))
        })
        .await
}

/// Handler: GET /api/sessions/:id/split/download/:index
pub async fn handle_split_download(
    State(state): State<Arc<AppState>>,
    Path((id, index)): Path<(String, usize)>,
) -> Result<(StatusCode, [(String, String); 2], Vec<u8>), ServerError> {
    state
        .sessions
        .with_session(&id, |session| {
            let output = session.split.output(index)?;
            Ok(download_response(
                &output.filename,
                "application/pdf",
                output.bytes.clone(),
            ))
        })
        .await
}

/// Handler: DELETE /api/sessions/:id/split
pub async fn handle_split_clear(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<OkResponse>, ServerError> {
    state
        .sessions
        .with_session(&id, |session| {
            session.split.clear();
            Ok(Json(OkResponse { success: true }))
        })
        .await
}

// ---- Convert tab ----

/// Handler: POST /api/sessions/:id/convert/file
pub async fn handle_convert_upload(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(entry): Json<UploadEntry>,
) -> Result<Json<UploadResponse>, ServerError> {
    let upload = entry.decode()?;
    state
        .sessions
        .with_session(&id, |session| {
            let file = session.convert.set_file(upload)?;
            info!(
                "Convert upload: {} ({} pages)",
                file.filename, file.page_count
            );
            Ok(Json(UploadResponse {
                success: true,
                file,
            }))
        })
        .await
}

#[derive(Serialize)]
pub struct ExtractResponse {
    pub success: bool,
    pub text: String,
}

/// Handler: POST /api/sessions/:id/convert/extract
pub async fn handle_convert_extract(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ExtractResponse>, ServerError> {
    state
        .sessions
        .with_session(&id, |session| {
            let text = session.convert.extract()?;
            info!("Extracted {} chars in session {}", text.len(), id);
            Ok(Json(ExtractResponse {
                success: true,
                text: text.to_string(),
            }))
        })
        .await
}

#[derive(Deserialize)]
pub struct UpdateTextRequest {
    pub text: String,
}

/// Handler: PUT /api/sessions/:id/convert/text
///
/// Stores the latest full string; debouncing is the client's concern.
pub async fn handle_convert_update_text(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateTextRequest>,
) -> Result<Json<OkResponse>, ServerError> {
    state
        .sessions
        .with_session(&id, |session| {
            session.convert.update_text(req.text);
            Ok(Json(OkResponse { success: true }))
        })
        .await
}

/// Handler: GET /api/sessions/:id/convert/export/:format
pub async fn handle_convert_export(
    State(state): State<Arc<AppState>>,
    Path((id, format)): Path<(String, String)>,
) -> Result<(StatusCode, [(String, String); 2], Vec<u8>), ServerError> {
    let format: ExportFormat = format.parse().map_err(ServerError::InvalidRequest)?;

    state
        .sessions
        .with_session(&id, |session| {
            let output = session.convert.export(format)?;
            info!("Export {} from session {}", output.filename, id);
            Ok(download_response(
                &output.filename,
                format.mime_type(),
                output.bytes,
            ))
        })
        .await
}

/// Handler: DELETE /api/sessions/:id/convert
pub async fn handle_convert_clear(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<OkResponse>, ServerError> {
    state
        .sessions
        .with_session(&id, |session| {
            session.convert.clear();
            Ok(Json(OkResponse { success: true }))
        })
        .await
}
