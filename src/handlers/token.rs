use axum::extract::State;
use tracing::info;

use crate::extract::Json;
use crate::router::PortalState;
use crate::service::password::verify_password;
use crate::service::tokens::TokenType;
use crate::types::users::{AccessToken, RefreshRequest, TokenPair, TokenRequest, normalize_email};
use crate::PortalError;

const BAD_CREDENTIALS: &str = "No active account found with the given credentials";

/// POST /api/token/ -> issues an access/refresh pair for an active account.
pub async fn obtain_token_handler(
    State(state): State<PortalState>,
    Json(req): Json<TokenRequest>,
) -> Result<Json<TokenPair>, PortalError> {
    let rejected = || PortalError::Unauthorized(BAD_CREDENTIALS.to_string());

    let user = state
        .storage
        .user_by_email(&normalize_email(&req.email))
        .await?
        .ok_or_else(rejected)?;
    if !verify_password(&req.password, &user.password_hash)? || !user.is_active {
        return Err(rejected());
    }

    let pair = state.tokens.issue_pair(user.id)?;
    state.storage.touch_last_login(user.id).await?;
    info!(user_id = user.id, "token pair issued");
    Ok(Json(pair))
}

/// POST /api/token/refresh/ -> exchanges a refresh token for a new access token.
pub async fn refresh_token_handler(
    State(state): State<PortalState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<AccessToken>, PortalError> {
    let claims = state.tokens.verify(&req.refresh, TokenType::Refresh)?;
    let active = state
        .storage
        .user_by_id(claims.user_id)
        .await?
        .is_some_and(|u| u.is_active);
    if !active {
        return Err(PortalError::Unauthorized(BAD_CREDENTIALS.to_string()));
    }
    let access = state.tokens.issue(claims.user_id, TokenType::Access)?;
    Ok(Json(AccessToken { access }))
}
