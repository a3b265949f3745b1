use crate::AppState;
use crate::api::error::AppError;
use crate::api::handlers::pages::{login_form, register_form};
use crate::api::middleware::auth::{clear_session_cookie, session_cookie, session_token};
use crate::models::{LoginForm, NewUser};
use crate::utils::auth::validate_jwt;
use axum::{
    Form,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};

pub async fn register(State(state): State<AppState>, Form(form): Form<NewUser>) -> Response {
    match state.auth_service.register(form).await {
        Ok(_) => Redirect::to("/login").into_response(),
        Err(AppError::Validation(msg)) => {
            (StatusCode::BAD_REQUEST, register_form(Some(&msg))).into_response()
        }
        Err(e @ AppError::DuplicateUsername) => {
            (StatusCode::CONFLICT, register_form(Some(&e.to_string()))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    match state.auth_service.login(form).await {
        Ok(session) => {
            let max_age = (session.expires_at - chrono::Utc::now()).num_seconds().max(0);
            let cookie = session_cookie(&session.token, max_age, state.config.secure_cookies);
            ([(header::SET_COOKIE, cookie)], Redirect::to("/")).into_response()
        }
        Err(e @ AppError::InvalidCredentials) => {
            (StatusCode::UNAUTHORIZED, login_form(Some(&e.to_string()))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Revokes the caller's session, if any, and always clears the cookie.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, AppError> {
    if let Some(token) = session_token(&headers) {
        // Expired or forged tokens have no session worth revoking
        if let Ok(claims) = validate_jwt(&token, &state.config.jwt_secret) {
            state.auth_service.logout(&claims.jti).await?;
        }
    }

    let cookie = clear_session_cookie(state.config.secure_cookies);
    Ok(([(header::SET_COOKIE, cookie)], Redirect::to("/login")).into_response())
}
