use crate::AppState;
use crate::api::error::AppError;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

pub const SESSION_COOKIE: &str = "gallery_session";

/// Session token from `Authorization: Bearer` or, failing that, the session cookie.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    bearer.or_else(|| {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|h| h.to_str().ok())
            .flat_map(|h| h.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
            .map(|(_, value)| value.to_string())
    })
}

pub fn session_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn clear_session_cookie(secure: bool) -> String {
    session_cookie("", 0, secure)
}

/// Guards JSON endpoints: no valid session means `401`.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = session_token(req.headers()).ok_or(AppError::Unauthenticated)?;
    let user = state.auth_service.current_user(&token).await?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Guards HTML pages: no valid session means a redirect to the login form.
pub async fn page_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(token) = session_token(req.headers()) else {
        return Redirect::to("/login").into_response();
    };

    match state.auth_service.current_user(&token).await {
        Ok(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(AppError::Unauthenticated) => Redirect::to("/login").into_response(),
        Err(e) => e.into_response(),
    }
}
