//! Petition handlers: browsing, creation, editing, signing, progress
//! updates, image upload, admin review, and the deadline sweep.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use civica_core::error::CoreError;
use civica_core::petition::{
    self, PetitionStatus, ReviewStatus, ANONYMOUS_SIGNER_NAME,
};
use civica_core::types::{DbId, Timestamp};
use civica_core::upload::{self, UploadKind};
use civica_db::models::petition::{
    CreatePetition, Petition, PetitionResponse, PetitionUpdate, Signature, UpdatePetition,
};
use civica_db::repositories::{PetitionRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreatePetitionRequest {
    pub title: String,
    pub description: String,
    pub category: String,
    /// Optional; absent or sub-minimum values fall back to the default goal.
    pub goal: Option<i32>,
    pub deadline: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct SignRequest {
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SignResponse {
    pub signature: Signature,
    pub signature_count: i64,
    pub status: PetitionStatus,
}

#[derive(Debug, Deserialize)]
pub struct AddUpdateRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub review_status: ReviewStatus,
    #[serde(default)]
    pub review_notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SweepResponse {
    pub expired: u64,
}

/// Load a petition or 404.
async fn load_petition(state: &AppState, id: DbId) -> AppResult<Petition> {
    PetitionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Petition",
                id,
            })
        })
}

/// Creator-or-admin authorization gate shared by edit, update, and upload.
fn require_creator_or_admin(petition: &Petition, user: &AuthUser) -> Result<(), AppError> {
    if petition.created_by != user.user_id && !user.is_admin() {
        return Err(CoreError::Forbidden(
            "Only the petition creator or an admin may do this".into(),
        )
        .into());
    }
    Ok(())
}

/// Public petition listing: approved and still-pending petitions, newest
/// first, with signature counts.
///
/// `GET /api/petitions`
pub async fn list_petitions(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<PetitionResponse>>>> {
    let summaries = PetitionRepo::list_public(&state.pool).await?;
    let data = summaries.iter().map(PetitionResponse::from_summary).collect();
    Ok(Json(DataResponse { data }))
}

/// Petitions created by the authenticated user, regardless of review status.
///
/// `GET /api/petitions/user`
pub async fn list_my_petitions(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<PetitionResponse>>>> {
    let summaries = PetitionRepo::list_by_creator(&state.pool, user.user_id).await?;
    let data = summaries.iter().map(PetitionResponse::from_summary).collect();
    Ok(Json(DataResponse { data }))
}

/// Petition detail with signatures and progress updates.
///
/// `GET /api/petitions/{id}`
pub async fn get_petition(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<PetitionResponse>>> {
    let petition = PetitionRepo::find_detailed(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Petition",
            id,
        })?;
    Ok(Json(DataResponse { data: petition }))
}

/// Create a petition. Starts `active` with review `pending`.
///
/// `POST /api/petitions`
pub async fn create_petition(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreatePetitionRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Petition>>)> {
    if req.title.trim().is_empty() {
        return Err(CoreError::Validation("Title must not be empty".into()).into());
    }
    if req.description.trim().is_empty() {
        return Err(CoreError::Validation("Description must not be empty".into()).into());
    }
    petition::validate_deadline(req.deadline, chrono::Utc::now())?;

    let created = PetitionRepo::create(
        &state.pool,
        &CreatePetition {
            title: req.title.trim().to_string(),
            description: req.description,
            category: req.category,
            goal: petition::resolve_goal(req.goal),
            deadline: req.deadline,
            created_by: user.user_id,
        },
    )
    .await?;

    tracing::info!(petition_id = created.id, user_id = user.user_id, "petition created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

/// Edit a petition. Creator or admin only, and only while `active`.
///
/// `PUT /api/petitions/{id}`
pub async fn update_petition(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    user: AuthUser,
    Json(req): Json<UpdatePetition>,
) -> AppResult<Json<DataResponse<Petition>>> {
    let existing = load_petition(&state, id).await?;
    require_creator_or_admin(&existing, &user)?;
    petition::validate_editable(existing.status)?;

    if let Some(deadline) = req.deadline {
        petition::validate_deadline(deadline, chrono::Utc::now())?;
    }
    if let Some(goal) = req.goal {
        if goal < petition::MIN_GOAL {
            return Err(CoreError::Validation(format!(
                "Goal must be at least {}",
                petition::MIN_GOAL
            ))
            .into());
        }
    }

    let updated = PetitionRepo::update(&state.pool, id, &req)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Petition",
            id,
        })?;

    Ok(Json(DataResponse { data: updated }))
}

/// Delete a petition. Creator only; signatures and updates cascade.
///
/// `DELETE /api/petitions/{id}`
pub async fn delete_petition(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<serde_json::Value>>> {
    let existing = load_petition(&state, id).await?;
    if existing.created_by != user.user_id {
        return Err(CoreError::Forbidden("Only the petition creator may delete it".into()).into());
    }

    PetitionRepo::delete(&state.pool, id).await?;

    // Removing the stored image is best effort: a leftover file never fails
    // the request.
    if let Some(image_path) = &existing.image_path {
        if let Some(filename) = image_path.rsplit('/').next() {
            let path = state.config.upload_dir.join("petitions").join(filename);
            if let Err(e) = tokio::fs::remove_file(&path).await {
                tracing::warn!(petition_id = id, error = %e, "failed to remove petition image");
            }
        }
    }

    tracing::info!(petition_id = id, user_id = user.user_id, "petition deleted");

    Ok(Json(DataResponse {
        data: serde_json::json!({ "deleted": true }),
    }))
}

/// Sign a petition on behalf of the authenticated user.
///
/// The signer name is snapshotted: token claim first, then the user row,
/// then the anonymous fallback. The signable check, duplicate check, and
/// goal flip run atomically in the repository transaction.
///
/// `POST /api/petitions/{id}/sign`
pub async fn sign_petition(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    user: AuthUser,
    Json(req): Json<SignRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<SignResponse>>)> {
    let signer_name = match &user.name {
        Some(name) if !name.trim().is_empty() => name.clone(),
        _ => UserRepo::find_by_id(&state.pool, user.user_id)
            .await?
            .map(|u| u.name)
            .unwrap_or_else(|| ANONYMOUS_SIGNER_NAME.to_string()),
    };

    let outcome = PetitionRepo::sign(
        &state.pool,
        id,
        user.user_id,
        &signer_name,
        req.comment.as_deref(),
    )
    .await?;

    if outcome.status == PetitionStatus::Completed {
        tracing::info!(petition_id = id, "petition reached its signature goal");
    }

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: SignResponse {
                signature: outcome.signature,
                signature_count: outcome.signature_count,
                status: outcome.status,
            },
        }),
    ))
}

/// Append a progress update. Creator or admin only.
///
/// `POST /api/petitions/{id}/updates`
pub async fn add_petition_update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    user: AuthUser,
    Json(req): Json<AddUpdateRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<PetitionUpdate>>)> {
    if req.text.trim().is_empty() {
        return Err(CoreError::Validation("Update text must not be empty".into()).into());
    }

    let existing = load_petition(&state, id).await?;
    require_creator_or_admin(&existing, &user)?;

    let update = PetitionRepo::add_update(&state.pool, id, req.text.trim(), user.user_id).await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: update })))
}

/// Upload or replace the petition image. Creator or admin only.
///
/// Expects a multipart form with an `image` field. The stored filename is
/// derived from the petition id and timestamp; only the sanitized extension
/// of the original name survives.
///
/// `POST /api/petitions/{id}/image`
pub async fn upload_petition_image(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    user: AuthUser,
    mut multipart: Multipart,
) -> AppResult<Json<DataResponse<Petition>>> {
    let existing = load_petition(&state, id).await?;
    require_creator_or_admin(&existing, &user)?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart payload: {e}")))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let content_type = field.content_type().unwrap_or("").to_string();
        let original_name = field.file_name().unwrap_or("upload").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {e}")))?;

        upload::validate_upload(UploadKind::PetitionImage, &content_type, bytes.len())?;

        let filename = upload::stored_filename(
            "petition",
            id,
            &original_name,
            chrono::Utc::now().timestamp(),
        );
        let dir = state.config.upload_dir.join("petitions");
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::InternalError(format!("Failed to create upload dir: {e}")))?;
        tokio::fs::write(dir.join(&filename), &bytes)
            .await
            .map_err(|e| AppError::InternalError(format!("Failed to store upload: {e}")))?;

        // Stored as the public path under the static /uploads mount.
        let image_path = format!("/uploads/petitions/{filename}");
        let updated = PetitionRepo::set_image_path(&state.pool, id, &image_path)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Petition",
                id,
            })?;

        tracing::info!(petition_id = id, %filename, "petition image stored");

        return Ok(Json(DataResponse { data: updated }));
    }

    Err(AppError::BadRequest("Missing 'image' field in multipart payload".into()))
}

/// Admin listing: every petition regardless of review status.
///
/// `GET /api/petitions/admin/all`
pub async fn admin_list_petitions(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<PetitionResponse>>>> {
    let summaries = PetitionRepo::list_all(&state.pool).await?;
    let data = summaries.iter().map(PetitionResponse::from_summary).collect();
    Ok(Json(DataResponse { data }))
}

/// Record a review verdict. Rejecting the review also rejects the petition.
///
/// `PUT /api/petitions/admin/{id}/review`
pub async fn review_petition(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    RequireAdmin(admin): RequireAdmin,
    Json(req): Json<ReviewRequest>,
) -> AppResult<Json<DataResponse<Petition>>> {
    petition::validate_review_verdict(req.review_status)?;

    let updated = PetitionRepo::set_review(
        &state.pool,
        id,
        req.review_status,
        req.review_notes.as_deref(),
        admin.user_id,
    )
    .await?
    .ok_or(CoreError::NotFound {
        entity: "Petition",
        id,
    })?;

    tracing::info!(
        petition_id = id,
        reviewer_id = admin.user_id,
        verdict = %req.review_status,
        "petition reviewed"
    );

    Ok(Json(DataResponse { data: updated }))
}

/// Deadline sweep: expire every active petition whose deadline has passed.
/// Idempotent; callable by anyone (typically a scheduler).
///
/// `POST /api/petitions/check-deadlines`
pub async fn check_deadlines(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<SweepResponse>>> {
    let expired = PetitionRepo::expire_past_deadline(&state.pool).await?;
    if expired > 0 {
        tracing::info!(expired, "deadline sweep expired petitions");
    }
    Ok(Json(DataResponse {
        data: SweepResponse { expired },
    }))
}
