use axum::{
    extract::{Path, Request},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
    Extension,
};
use serde::Serialize;
use std::collections::HashMap;

use crate::auth::{decode_token, Claims};
use crate::error::ApiError;

/// Authenticated user context extracted from JWT
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub username: String,
    pub is_admin: bool,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            username: claims.username,
            is_admin: claims.is_admin,
        }
    }
}

/// Verify an optional bearer token and store the user on the request.
///
/// A missing or invalid token is not an error here; the route guards below
/// decide whether the route needs a user at all.
pub async fn authenticate_jwt(headers: HeaderMap, mut request: Request, next: Next) -> Response {
    if let Some(token) = extract_jwt_from_headers(&headers) {
        match decode_token(&token) {
            Ok(claims) => {
                request.extensions_mut().insert(AuthUser::from(claims));
            }
            Err(e) => tracing::debug!("Ignoring bad token: {}", e),
        }
    }
    next.run(request).await
}

/// Bearer token from the Authorization header, if one is present
fn extract_jwt_from_headers(headers: &HeaderMap) -> Option<String> {
    let auth_str = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = auth_str
        .strip_prefix("Bearer ")
        .or_else(|| auth_str.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Route guard: any logged-in user.
pub async fn ensure_logged_in(
    user: Option<Extension<AuthUser>>,
    request: Request,
    next: Next,
) -> Response {
    match user {
        Some(_) => next.run(request).await,
        None => ApiError::unauthorized("Authentication required").into_response(),
    }
}

/// Route guard: admins only.
pub async fn ensure_admin(user: Option<Extension<AuthUser>>, request: Request, next: Next) -> Response {
    match user {
        Some(Extension(user)) if user.is_admin => next.run(request).await,
        Some(Extension(user)) => {
            tracing::warn!("Refused admin route to non-admin {}", user.username);
            ApiError::unauthorized("Admin access required").into_response()
        }
        None => ApiError::unauthorized("Authentication required").into_response(),
    }
}

/// Route guard: admins, or the user named by the `:username` path segment.
pub async fn ensure_admin_or_user(
    user: Option<Extension<AuthUser>>,
    Path(params): Path<HashMap<String, String>>,
    request: Request,
    next: Next,
) -> Response {
    let target = params.get("username").map(String::as_str);
    match user {
        Some(Extension(user)) if is_admin_or_self(&user, target) => next.run(request).await,
        Some(Extension(user)) => {
            tracing::warn!("Refused {} access to account {:?}", user.username, target);
            ApiError::unauthorized("Not allowed for this account").into_response()
        }
        None => ApiError::unauthorized("Authentication required").into_response(),
    }
}

fn is_admin_or_self(user: &AuthUser, target: Option<&str>) -> bool {
    user.is_admin || target == Some(user.username.as_str())
}
