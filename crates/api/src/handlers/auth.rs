//! Citizen authentication handlers: registration, login, and the
//! current-user endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use civica_core::error::CoreError;
use civica_core::roles::ROLE_CITIZEN;
use civica_db::models::user::{CreateUser, UserResponse};
use civica_db::repositories::UserRepo;

use crate::auth::jwt::generate_token;
use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Minimum password length for registration.
pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token plus the safe user representation, returned by register and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

/// Shared validation for registration input.
fn validate_registration(name: &str, email: &str, password: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation("Name must not be empty".into()).into());
    }
    if !email.contains('@') {
        return Err(CoreError::Validation("Invalid email address".into()).into());
    }
    validate_password_strength(password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    Ok(())
}

/// Register a new citizen account and issue a token.
///
/// `POST /api/auth/register`
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<AuthResponse>>)> {
    validate_registration(&req.name, &req.email, &req.password)?;

    let password_hash = hash_password(&req.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {e}")))?;

    // Duplicate emails surface as a unique violation on uq_users_email,
    // which the error layer maps to 409.
    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            name: req.name.trim().to_string(),
            email: req.email.trim().to_lowercase(),
            password_hash,
            role: ROLE_CITIZEN.to_string(),
        },
    )
    .await?;

    let token = generate_token(user.id, &user.role, Some(&user.name), &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation failed: {e}")))?;

    tracing::info!(user_id = user.id, "citizen registered");

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

/// Authenticate a citizen and issue a token.
///
/// `POST /api/auth/login`
pub async fn login(
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

    let token = generate_token(user.id, &user.role, Some(&user.name), &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation failed: {e}")))?;

    tracing::info!(user_id = user.id, "citizen logged in");

    Ok(Json(DataResponse {
        data: AuthResponse {
            token,
            user: UserResponse::from(&user),
        },
    }))
}

/// Return the authenticated user's profile.
///
/// `GET /api/auth/me`
pub async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let record = UserRepo::find_by_id(&state.pool, user.user_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "User",
            id: user.user_id,
        })?;

    Ok(Json(DataResponse {
        data: UserResponse::from(&record),
    }))
}
