use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use review_flow_shared::{
    catalog::{ProductListResponse, ProductResponse, SheetGrid},
    ops::{
        ActivityResponse, RecentFilesResponse, StatsSnapshot, UploadOutcome, UploadResponse,
        WorkflowStatusUpdate, WorkflowStatusView,
    },
    Acknowledged, AuthCheckResponse, CommentRecord, CommentSummary, HealthResponse, LoginRequest,
    LoginResponse, SectionComments,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    auth,
    comment_gateway::SubmissionError,
    products::CatalogError,
    state::AppState,
};

const APP_NAME: &str = "Review Flow Backend";

const ALLOWED_IMAGE_TYPES: &[&str] = &["image/png", "image/jpeg", "image/jpg"];
const MAX_UPLOAD_FILES: usize = 20;
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Rows shown by the quick sheet preview.
const PREVIEW_ROWS: usize = 10;
/// Row cap for the live grid, to stay under upstream limits.
const GRID_ROWS: usize = 500;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

#[derive(Debug, Deserialize)]
pub struct SectionQuery {
    #[serde(default)]
    pub section: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SheetPreviewResponse {
    pub values: Vec<Vec<String>>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        app: APP_NAME.to_string(),
    })
}

// --- Auth ---

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if !state.config.auth_enabled() {
        return Err(error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Auth is not configured",
        ));
    }
    let Some(role) = auth::resolve_role(&state, &request.password) else {
        return Err(error_response(StatusCode::UNAUTHORIZED, "Wrong password"));
    };
    let token = auth::issue_token(&state.config.jwt_secret, role)
        .map_err(|err| internal_error("Failed to issue token", err))?;
    Ok(Json(LoginResponse {
        token,
        role: role.to_string(),
    }))
}

pub async fn auth_check(State(state): State<AppState>, headers: HeaderMap) -> Json<AuthCheckResponse> {
    if !state.config.auth_enabled() {
        return Json(AuthCheckResponse {
            protected: false,
            valid: None,
            role: None,
        });
    }
    let role = auth::bearer_token(&headers)
        .and_then(|token| auth::verify_token(&state.config.jwt_secret, &token));
    Json(AuthCheckResponse {
        protected: true,
        valid: Some(role.is_some()),
        role,
    })
}

// --- Activity feed, stats, recent files, workflow status ---

pub async fn activity(State(state): State<AppState>) -> Json<ActivityResponse> {
    Json(ActivityResponse {
        activities: state.ops.activities(),
    })
}

pub async fn stats(State(state): State<AppState>) -> Json<StatsSnapshot> {
    Json(state.ops.stats_snapshot())
}

pub async fn trigger_stat(State(state): State<AppState>) -> Json<Acknowledged> {
    state.ops.bump_triggers();
    state.ops.record_activity("trigger", "Generation workflow triggered");
    Json(Acknowledged::ok())
}

pub async fn recent_files(State(state): State<AppState>) -> Json<RecentFilesResponse> {
    Json(RecentFilesResponse {
        files: state.ops.recent_files(),
    })
}

pub async fn workflow_status_update(
    State(state): State<AppState>,
    Json(update): Json<WorkflowStatusUpdate>,
) -> Json<Acknowledged> {
    if !update.workflow_id.is_empty() {
        state
            .ops
            .update_workflow(&update.workflow_id, update.status, update.step);
    }
    Json(Acknowledged::ok())
}

pub async fn workflow_status_get(
    State(state): State<AppState>,
    Path(workflow_id): Path<String>,
) -> Json<WorkflowStatusView> {
    Json(state.ops.workflow_view(&workflow_id))
}

// --- Automation proxy ---

pub async fn generate(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Response, ApiError> {
    let ack = state
        .gateway
        .trigger_generation(&payload)
        .await
        .map_err(|err| internal_error("Workflow trigger failed", err))?;

    let status = StatusCode::from_u16(ack.status).unwrap_or(StatusCode::BAD_GATEWAY);
    if status.is_success() {
        Ok((status, Json(ack.body)).into_response())
    } else {
        let message = ack
            .body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Workflow error")
            .to_string();
        Ok((status, Json(serde_json::json!({ "error": message }))).into_response())
    }
}

// --- Uploads ---

pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut uploads: Vec<UploadOutcome> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| internal_error("Malformed multipart body", err))?
    {
        if field.name() != Some("images") {
            continue;
        }
        let name = field.file_name().unwrap_or("unnamed").to_string();
        let mime = field.content_type().unwrap_or_default().to_string();
        let data = match field.bytes().await {
            Ok(data) => data,
            Err(err) => {
                uploads.push(failed_upload(name, 0, format!("read error: {err}")));
                continue;
            },
        };
        let size = data.len() as u64;

        if uploads.len() >= MAX_UPLOAD_FILES {
            uploads.push(failed_upload(name, size, "too many files (max 20)"));
            continue;
        }
        if !ALLOWED_IMAGE_TYPES.contains(&mime.as_str()) {
            uploads.push(failed_upload(name, size, "only PNG and JPG are allowed"));
            continue;
        }
        if data.len() > MAX_UPLOAD_BYTES {
            uploads.push(failed_upload(name, size, "file exceeds 10 MiB"));
            continue;
        }

        match state.drive.upload_image(&name, &mime, data.to_vec()).await {
            Ok(file_id) => uploads.push(UploadOutcome {
                name: name.clone(),
                id: Some(file_id),
                size,
                success: true,
                error: None,
            }),
            Err(err) => uploads.push(failed_upload(name.clone(), size, format!("{err:#}"))),
        }
        state.ops.push_recent_file(name, size);
    }

    if uploads.is_empty() {
        return Err(error_response(StatusCode::BAD_REQUEST, "No image uploaded"));
    }

    let success_count = uploads.iter().filter(|outcome| outcome.success).count();
    state.ops.bump_uploads();
    state
        .ops
        .record_activity("upload", format!("{success_count} files uploaded"));

    Ok(Json(UploadResponse {
        uploads,
    }))
}

fn failed_upload(name: String, size: u64, error: impl Into<String>) -> UploadOutcome {
    UploadOutcome {
        name,
        id: None,
        size,
        success: false,
        error: Some(error.into()),
    }
}

// --- Sheet grid ---

pub async fn sheet_preview(
    State(state): State<AppState>,
) -> Result<Json<SheetPreviewResponse>, ApiError> {
    let values = state
        .sheets
        .fetch_product_rows(PREVIEW_ROWS)
        .await
        .map_err(|err| internal_error("Failed to read sheet preview", err))?;
    Ok(Json(SheetPreviewResponse {
        values,
    }))
}

pub async fn sheet_data(State(state): State<AppState>) -> Result<Json<SheetGrid>, ApiError> {
    let values = state
        .sheets
        .fetch_product_rows(GRID_ROWS)
        .await
        .map_err(|err| internal_error("Failed to read sheet data", err))?;
    let row_count = values.len();
    Ok(Json(SheetGrid {
        values,
        last_update: Utc::now().to_rfc3339(),
        row_count,
    }))
}

// --- File store ---

pub async fn storage_quota(
    State(state): State<AppState>,
) -> Result<Json<review_flow_shared::ops::StorageQuota>, ApiError> {
    let quota = state
        .drive
        .quota()
        .await
        .map_err(|err| internal_error("Failed to read storage quota", err))?;
    Ok(Json(quota))
}

pub async fn drive_image(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> Response {
    match state.drive.download(&file_id).await {
        Ok((bytes, content_type)) => (
            [
                (header::CONTENT_TYPE, content_type),
                (header::CACHE_CONTROL, "public, max-age=3600".to_string()),
            ],
            bytes,
        )
            .into_response(),
        Err(err) => {
            tracing::warn!(file_id, "image proxy failed: {err:#}");
            error_response(StatusCode::NOT_FOUND, "Image not found").into_response()
        },
    }
}

// --- Product catalog ---

pub async fn products_list(
    State(state): State<AppState>,
) -> Result<Json<ProductListResponse>, ApiError> {
    let products = state.catalog.list().await.map_err(catalog_error)?;
    Ok(Json(ProductListResponse {
        products,
    }))
}

pub async fn product_detail(
    State(state): State<AppState>,
    Path(sku): Path<String>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = state.catalog.detail(&sku).await.map_err(catalog_error)?;
    Ok(Json(ProductResponse {
        product,
    }))
}

// --- Comments ---

pub async fn comments_summary(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<CommentSummary>, ApiError> {
    let summary = state
        .comments
        .summary(&product_id)
        .await
        .map_err(|err| internal_error("Failed to read comment summary", err))?;
    Ok(Json(summary))
}

pub async fn comments_for_section(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    Query(query): Query<SectionQuery>,
) -> Result<Json<SectionComments>, ApiError> {
    let Some(section) = query.section.filter(|value| !value.is_empty()) else {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "section query parameter required",
        ));
    };
    let items = state
        .comments
        .section_items(&product_id, &section)
        .await
        .map_err(|err| internal_error("Failed to read comments", err))?;
    Ok(Json(items))
}

pub async fn comments_invalidate(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Json<Acknowledged> {
    state.comments.invalidate(&product_id);
    Json(Acknowledged::ok())
}

pub async fn comments_submit(
    State(state): State<AppState>,
    Json(record): Json<CommentRecord>,
) -> Result<Json<Acknowledged>, ApiError> {
    state.gateway.submit(&record).await.map_err(|err| match &err {
        SubmissionError::EmptyComment => error_response(StatusCode::BAD_REQUEST, &err.to_string()),
        SubmissionError::NotConfigured => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string())
        },
        SubmissionError::Transport(_) | SubmissionError::Rejected(_) => {
            error_response(StatusCode::BAD_GATEWAY, &err.to_string())
        },
    })?;

    state.ops.record_activity(
        "comment",
        format!("Comment submitted for {}/{}", record.product_id, record.section),
    );
    Ok(Json(Acknowledged::ok()))
}

// --- Error helpers ---

fn catalog_error(err: CatalogError) -> ApiError {
    match &err {
        CatalogError::MissingSkuColumn => error_response(StatusCode::BAD_REQUEST, &err.to_string()),
        CatalogError::NotFound(_) | CatalogError::EmptySheet => {
            error_response(StatusCode::NOT_FOUND, &err.to_string())
        },
        CatalogError::Upstream(_) => internal_error("Failed to read product sheet", err),
    }
}

fn internal_error(message: &str, err: impl std::fmt::Display) -> ApiError {
    tracing::error!("{}: {}", message, err);
    error_response(StatusCode::INTERNAL_SERVER_ERROR, message)
}

fn error_response(status: StatusCode, message: &str) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
            code: status.as_u16(),
        }),
    )
}
