use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use tracing::info;
use validator::Validate;

use crate::db::models::NewUser;
use crate::extract::Json;
use crate::middleware::auth::{AuthUser, StaffUser};
use crate::router::PortalState;
use crate::service::password::hash_password;
use crate::types::users::{
    RegisterRequest, RegisterResponse, UpdateUserRequest, UserRecord, normalize_email,
};
use crate::PortalError;

/// POST /api/users/register/ -> creates an inactive account.
pub async fn register_handler(
    State(state): State<PortalState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), PortalError> {
    req.validate()?;
    if req.password != req.password2 {
        return Err(PortalError::BadRequest("Passwords don't match".to_string()));
    }

    let user = state
        .storage
        .create_user(NewUser {
            email: normalize_email(&req.email),
            user_name: req.user_name,
            organization: req.organization,
            password_hash: hash_password(&req.password)?,
            is_active: false,
            is_staff: false,
            is_superuser: false,
        })
        .await?;
    info!(user_id = user.id, email = %user.email, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User created successfully",
            user: user.into(),
        }),
    ))
}

/// GET /api/users/me/
pub async fn me_handler(AuthUser(user): AuthUser) -> Json<UserRecord> {
    Json(user.into())
}

/// GET /api/users/users/ (staff only)
pub async fn list_users_handler(
    State(state): State<PortalState>,
    _staff: StaffUser,
) -> Result<Json<Vec<UserRecord>>, PortalError> {
    let users = state.storage.list_users().await?;
    Ok(Json(users.into_iter().map(UserRecord::from).collect()))
}

/// GET /api/users/users/{id}/ (staff only)
pub async fn user_detail_handler(
    State(state): State<PortalState>,
    _staff: StaffUser,
    Path(id): Path<i64>,
) -> Result<Json<UserRecord>, PortalError> {
    state
        .storage
        .user_by_id(id)
        .await?
        .map(|u| Json(u.into()))
        .ok_or_else(user_not_found)
}

/// PATCH /api/users/users/{id}/ (staff only) -> toggles `is_active` / `is_staff`.
pub async fn update_user_handler(
    State(state): State<PortalState>,
    StaffUser(admin): StaffUser,
    Path(id): Path<i64>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserRecord>, PortalError> {
    let user = state
        .storage
        .update_user_flags(id, req.is_active, req.is_staff)
        .await?
        .ok_or_else(user_not_found)?;
    info!(
        admin_id = admin.id,
        user_id = user.id,
        is_active = user.is_active,
        is_staff = user.is_staff,
        "user flags updated"
    );
    Ok(Json(user.into()))
}

fn user_not_found() -> PortalError {
    PortalError::NotFound("User not found".to_string())
}
