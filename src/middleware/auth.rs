use axum::RequestPartsExt;
use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::{header::AUTHORIZATION, request::Parts};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use tracing::debug;

use crate::db::models::DbUser;
use crate::error::PortalError;
use crate::router::PortalState;
use crate::service::tokens::TokenType;

/// An active user resolved from `Authorization: Bearer <access token>`.
#[derive(Debug, Clone)]
pub struct AuthUser(pub DbUser);

/// An authenticated user with `is_staff` set.
#[derive(Debug, Clone)]
pub struct StaffUser(pub DbUser);

async fn authenticate(parts: &mut Parts, state: &PortalState) -> Result<DbUser, PortalError> {
    let TypedHeader(Authorization(bearer)) = parts
        .extract::<TypedHeader<Authorization<Bearer>>>()
        .await
        .map_err(|_| {
            PortalError::Unauthorized("Authentication credentials were not provided.".to_string())
        })?;

    let claims = state.tokens.verify(bearer.token(), TokenType::Access)?;
    let user = state
        .storage
        .user_by_id(claims.user_id)
        .await?
        .ok_or_else(|| PortalError::Unauthorized("User not found".to_string()))?;
    if !user.is_active {
        debug!(user_id = user.id, "token presented for inactive user");
        return Err(PortalError::Unauthorized("User is inactive".to_string()));
    }
    Ok(user)
}

impl FromRequestParts<PortalState> for AuthUser {
    type Rejection = PortalError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &PortalState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(parts, state).await.map(Self)
    }
}

/// No `Authorization` header yields `None`; a bad one is still rejected.
impl OptionalFromRequestParts<PortalState> for AuthUser {
    type Rejection = PortalError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &PortalState,
    ) -> Result<Option<Self>, Self::Rejection> {
        if !parts.headers.contains_key(AUTHORIZATION) {
            return Ok(None);
        }
        authenticate(parts, state).await.map(|u| Some(Self(u)))
    }
}

impl FromRequestParts<PortalState> for StaffUser {
    type Rejection = PortalError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &PortalState,
    ) -> Result<Self, Self::Rejection> {
        let user = authenticate(parts, state).await?;
        if !user.is_staff {
            return Err(PortalError::Forbidden(
                "You do not have permission to perform this action.".to_string(),
            ));
        }
        Ok(Self(user))
    }
}
