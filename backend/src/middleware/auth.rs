//! Bearer-token identity resolution
//!
//! Identity is a thin external collaborator of the store: a request either
//! carries a bearer token the service knows, yielding an owner id, or no
//! `Authorization` header at all, yielding the anonymous identity. An unknown
//! or malformed token is rejected rather than downgraded to anonymous.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
};

use crate::{state::AppState, types::AppError};

/// The caller's identity as resolved from the request
#[derive(Debug, Clone)]
pub enum Identity {
    /// Authenticated caller with its owner id
    Owner(String),
    /// Request without credentials, served from the anonymous pool
    Anonymous,
}

impl Identity {
    /// The owner id, if authenticated
    #[must_use]
    pub fn owner(&self) -> Option<&str> {
        match self {
            Self::Owner(owner) => Some(owner),
            Self::Anonymous => None,
        }
    }

    /// The owner id, or a 401 rejection for anonymous callers
    ///
    /// # Errors
    ///
    /// Returns `AppError` with status 401 when the identity is anonymous
    pub fn require_owner(&self) -> Result<&str, AppError> {
        self.owner().ok_or_else(|| {
            AppError::new(
                StatusCode::UNAUTHORIZED,
                "missing_auth",
                "Authentication required",
                false,
            )
        })
    }
}

impl FromRequestParts<AppState> for Identity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get(AUTHORIZATION) else {
            return Ok(Self::Anonymous);
        };

        let token = header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| {
                AppError::new(
                    StatusCode::UNAUTHORIZED,
                    "invalid_token",
                    "Malformed Authorization header",
                    false,
                )
            })?;

        state
            .api_keys
            .get(token)
            .map(|owner| Self::Owner(owner.clone()))
            .ok_or_else(|| {
                AppError::new(
                    StatusCode::UNAUTHORIZED,
                    "invalid_token",
                    "Unknown bearer token",
                    false,
                )
            })
    }
}
