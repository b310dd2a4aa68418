//! Issue report handlers: submission, triage, assignment, comments,
//! evidence upload and download, and admin statistics.

use axum::body::Body;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tokio_util::io::ReaderStream;

use civica_core::error::CoreError;
use civica_core::report::{self, ReportStatus};
use civica_core::types::DbId;
use civica_core::upload::{self, UploadKind};
use civica_db::models::report::{
    CreateReport, Report, ReportComment, ReportResponse, ReportStats, ReportWithNames,
};
use civica_db::repositories::ReportRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: ReportStatus,
}

#[derive(Debug, Deserialize)]
pub struct TriageRequest {
    pub status: ReportStatus,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub assigned_to: DbId,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub text: String,
}

/// Load a report or 404.
async fn load_report(state: &AppState, id: DbId) -> AppResult<Report> {
    ReportRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Report",
                id,
            })
        })
}

/// Submitter-or-admin gate shared by the detail, comment, and evidence routes.
fn require_submitter_or_admin(report: &Report, user: &AuthUser) -> Result<(), AppError> {
    if report.submitted_by != user.user_id && !user.is_admin() {
        return Err(CoreError::Forbidden(
            "Only the report submitter or an admin may access this report".into(),
        )
        .into());
    }
    Ok(())
}

/// Report listing scoped by role: admins see every report with names
/// resolved, citizens see their own submissions. Newest first.
///
/// `GET /api/reports`
pub async fn list_reports(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Response> {
    if user.is_admin() {
        let reports = ReportRepo::list_all(&state.pool).await?;
        return Ok(Json(DataResponse { data: reports }).into_response());
    }
    let reports = ReportRepo::list_by_submitter(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse { data: reports }).into_response())
}

/// Report detail with its comment thread. Submitter or admin only.
///
/// `GET /api/reports/{id}`
pub async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<ReportResponse>>> {
    let report = load_report(&state, id).await?;
    require_submitter_or_admin(&report, &user)?;

    let comments = ReportRepo::list_comments(&state.pool, id).await?;

    Ok(Json(DataResponse {
        data: ReportResponse { report, comments },
    }))
}

/// Submit a new report. Starts as `pending`, unassigned.
///
/// `POST /api/reports`
pub async fn create_report(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateReport>,
) -> AppResult<(StatusCode, Json<DataResponse<Report>>)> {
    if req.title.trim().is_empty() {
        return Err(CoreError::Validation("Title must not be empty".into()).into());
    }
    if req.description.trim().is_empty() {
        return Err(CoreError::Validation("Description must not be empty".into()).into());
    }
    if req.location.trim().is_empty() {
        return Err(CoreError::Validation("Location must not be empty".into()).into());
    }

    let report = ReportRepo::create(&state.pool, user.user_id, &req).await?;

    tracing::info!(report_id = report.id, user_id = user.user_id, "report submitted");

    Ok((StatusCode::CREATED, Json(DataResponse { data: report })))
}

/// Set the report status. Admin only; accepts the full status set.
///
/// `PATCH /api/reports/{id}/status`
pub async fn update_report_status(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    RequireAdmin(admin): RequireAdmin,
    Json(req): Json<StatusUpdateRequest>,
) -> AppResult<Json<DataResponse<Report>>> {
    let updated = ReportRepo::update_status(&state.pool, id, req.status)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Report",
            id,
        })?;

    tracing::info!(
        report_id = id,
        admin_id = admin.user_id,
        status = %req.status,
        "report status changed"
    );

    Ok(Json(DataResponse { data: updated }))
}

/// Assign a report to an admin. The assignee id is stored verbatim.
///
/// `PUT /api/reports/{id}/assign`
pub async fn assign_report(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    RequireAdmin(admin): RequireAdmin,
    Json(req): Json<AssignRequest>,
) -> AppResult<Json<DataResponse<Report>>> {
    let updated = ReportRepo::assign(&state.pool, id, req.assigned_to)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Report",
            id,
        })?;

    tracing::info!(
        report_id = id,
        admin_id = admin.user_id,
        assigned_to = req.assigned_to,
        "report assigned"
    );

    Ok(Json(DataResponse { data: updated }))
}

/// Comments for a report. Submitter or admin only.
///
/// `GET /api/reports/{id}/comments`
pub async fn list_report_comments(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<ReportComment>>>> {
    let report = load_report(&state, id).await?;
    require_submitter_or_admin(&report, &user)?;

    let comments = ReportRepo::list_comments(&state.pool, id).await?;
    Ok(Json(DataResponse { data: comments }))
}

/// Append a comment. Submitter or admin only.
///
/// `POST /api/reports/{id}/comments`
pub async fn add_report_comment(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    user: AuthUser,
    Json(req): Json<CommentRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<ReportComment>>)> {
    report::validate_comment(&req.text)?;

    let report = load_report(&state, id).await?;
    require_submitter_or_admin(&report, &user)?;

    let comment = ReportRepo::add_comment(&state.pool, id, user.user_id, req.text.trim()).await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: comment })))
}

/// Upload or replace evidence for a report. Submitter or admin only.
///
/// Expects a multipart form with a `file` field. The stored filename is
/// derived from the report id and timestamp.
///
/// `POST /api/reports/{id}/evidence`
pub async fn upload_evidence(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    user: AuthUser,
    mut multipart: Multipart,
) -> AppResult<Json<DataResponse<Report>>> {
    let report = load_report(&state, id).await?;
    require_submitter_or_admin(&report, &user)?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart payload: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field.content_type().unwrap_or("").to_string();
        let original_name = field.file_name().unwrap_or("upload").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {e}")))?;

        upload::validate_upload(UploadKind::ReportEvidence, &content_type, bytes.len())?;

        let filename = upload::stored_filename(
            "evidence",
            id,
            &original_name,
            chrono::Utc::now().timestamp(),
        );
        let dir = state.config.upload_dir.join("evidence");
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::InternalError(format!("Failed to create upload dir: {e}")))?;
        tokio::fs::write(dir.join(&filename), &bytes)
            .await
            .map_err(|e| AppError::InternalError(format!("Failed to store upload: {e}")))?;

        // Only the filename is stored; the download route re-derives the
        // on-disk path and performs its own access check.
        let updated = ReportRepo::set_evidence_path(&state.pool, id, &filename)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Report",
                id,
            })?;

        tracing::info!(report_id = id, %filename, "evidence stored");

        return Ok(Json(DataResponse { data: updated }));
    }

    Err(AppError::BadRequest("Missing 'file' field in multipart payload".into()))
}

/// Stream an evidence file back to its report's submitter or an admin.
///
/// The filename is validated against traversal, then resolved to its owning
/// report; evidence is never served anonymously or cross-user.
///
/// `GET /api/reports/evidence/{filename}`
pub async fn serve_evidence(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    user: AuthUser,
) -> AppResult<Response> {
    upload::validate_served_filename(&filename)?;

    let report = ReportRepo::find_by_evidence_path(&state.pool, &filename)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!(
                "No report references evidence file '{filename}'"
            )))
        })?;
    require_submitter_or_admin(&report, &user)?;

    let path = state.config.upload_dir.join("evidence").join(&filename);
    let file = tokio::fs::File::open(&path)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to open evidence file: {e}")))?;

    let content_type = match filename.rsplit_once('.').map(|(_, ext)| ext) {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("mp4") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    };

    let stream = ReaderStream::new(file);
    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{filename}\""),
        )
        .body(Body::from_stream(stream))
        .map_err(|e| AppError::InternalError(format!("Failed to build response: {e}")))?;

    Ok(response)
}

/// Admin listing: all reports with submitter and assignee names.
///
/// `GET /api/reports/admin/all`
pub async fn admin_list_reports(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<ReportWithNames>>>> {
    let reports = ReportRepo::list_all(&state.pool).await?;
    Ok(Json(DataResponse { data: reports }))
}

/// Admin triage: set a final disposition and append an optional note.
/// Accepts only `pending`, `resolved`, and `rejected`.
///
/// `PUT /api/reports/admin/{id}/status`
pub async fn admin_triage_report(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    RequireAdmin(admin): RequireAdmin,
    Json(req): Json<TriageRequest>,
) -> AppResult<Json<DataResponse<Report>>> {
    report::validate_triage_status(req.status)?;

    let note = req.note.as_deref().map(str::trim).filter(|n| !n.is_empty());
    let updated = ReportRepo::update_status_with_note(&state.pool, id, req.status, note)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Report",
            id,
        })?;

    tracing::info!(
        report_id = id,
        admin_id = admin.user_id,
        status = %req.status,
        "report triaged"
    );

    Ok(Json(DataResponse { data: updated }))
}

/// Aggregate statistics for the admin dashboard.
///
/// `GET /api/reports/admin/stats`
pub async fn report_stats(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<ReportStats>>> {
    let stats = ReportRepo::stats(&state.pool).await?;
    Ok(Json(DataResponse { data: stats }))
}
