//! Admin account handlers: gated self-registration, admin login, and user
//! management.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use civica_core::error::CoreError;
use civica_core::roles::{ROLE_ADMIN, ROLE_CITIZEN};
use civica_core::types::DbId;
use civica_db::models::user::{CreateUser, UpdateUser, UserResponse};
use civica_db::repositories::UserRepo;

use crate::auth::jwt::generate_token;
use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::handlers::auth::{AuthResponse, LoginRequest, MIN_PASSWORD_LENGTH};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AdminRegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Must match the `ADMIN_SETUP_SECRET` the server was booted with.
    pub setup_secret: String,
}

/// Register a new admin account. Gated by the deployment's setup secret;
/// a wrong secret is a 403, not a validation error.
///
/// `POST /api/admin/register`
pub async fn register_admin(
    State(state): State<AppState>,
    Json(req): Json<AdminRegisterRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<AuthResponse>>)> {
    if req.setup_secret != state.config.admin_setup_secret {
        tracing::warn!(email = %req.email, "admin registration with wrong setup secret");
        return Err(CoreError::Forbidden("Invalid admin setup secret".into()).into());
    }

    if req.name.trim().is_empty() {
        return Err(CoreError::Validation("Name must not be empty".into()).into());
    }
    if !req.email.contains('@') {
        return Err(CoreError::Validation("Invalid email address".into()).into());
    }
    crate::auth::password::validate_password_strength(&req.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let password_hash = hash_password(&req.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            name: req.name.trim().to_string(),
            email: req.email.trim().to_lowercase(),
            password_hash,
            role: ROLE_ADMIN.to_string(),
        },
    )
    .await?;

    let token = generate_token(user.id, &user.role, Some(&user.name), &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation failed: {e}")))?;

    tracing::info!(user_id = user.id, "admin registered");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: AuthResponse {
                token,
                user: UserResponse::from(&user),
            },
        }),
    ))
}

/// Authenticate an admin. A valid citizen credential is rejected here; the
/// admin login issues tokens only for admin accounts.
///
/// `POST /api/admin/login`
pub async fn login_admin(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<DataResponse<AuthResponse>>> {
    let user = UserRepo::find_by_email(&state.pool, &req.email.trim().to_lowercase())
        .await?
        .ok_or_else(|| CoreError::Unauthorized("Invalid email or password".into()))?;

    let valid = verify_password(&req.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification failed: {e}")))?;
    if !valid {
        return Err(CoreError::Unauthorized("Invalid email or password".into()).into());
    }

    if user.role != ROLE_ADMIN {
        return Err(CoreError::Forbidden("Admin role required".into()).into());
    }

    let token = generate_token(user.id, &user.role, Some(&user.name), &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation failed: {e}")))?;

    tracing::info!(user_id = user.id, "admin logged in");

    Ok(Json(DataResponse {
        data: AuthResponse {
            token,
            user: UserResponse::from(&user),
        },
    }))
}

/// List every user account, newest first.
///
/// `GET /api/admin/users`
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let users = UserRepo::list(&state.pool).await?;
    let data = users.iter().map(UserResponse::from).collect();
    Ok(Json(DataResponse { data }))
}

/// Fetch a single user account.
///
/// `GET /api/admin/users/{id}`
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "User", id })?;
    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}

/// Update a user's name, email, or role.
///
/// `PUT /api/admin/users/{id}`
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    RequireAdmin(_admin): RequireAdmin,
    Json(req): Json<UpdateUser>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    if let Some(role) = &req.role {
        if role != ROLE_CITIZEN && role != ROLE_ADMIN {
            return Err(CoreError::Validation(format!(
                "Invalid role '{role}'. Must be '{ROLE_CITIZEN}' or '{ROLE_ADMIN}'"
            ))
            .into());
        }
    }
    if let Some(email) = &req.email {
        if !email.contains('@') {
            return Err(CoreError::Validation("Invalid email address".into()).into());
        }
    }

    let user = UserRepo::update(&state.pool, id, &req)
        .await?
        .ok_or(CoreError::NotFound { entity: "User", id })?;

    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}

/// Delete a user account. Admins may not delete their own account.
///
/// `DELETE /api/admin/users/{id}`
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    RequireAdmin(admin): RequireAdmin,
) -> AppResult<Json<DataResponse<serde_json::Value>>> {
    if id == admin.user_id {
        return Err(CoreError::Validation("You cannot delete your own account".into()).into());
    }

    let deleted = UserRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(CoreError::NotFound { entity: "User", id }.into());
    }

    tracing::info!(user_id = id, admin_id = admin.user_id, "user deleted");

    Ok(Json(DataResponse {
        data: serde_json::json!({ "deleted": true }),
    }))
}
