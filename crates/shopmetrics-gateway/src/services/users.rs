//! Account and authentication endpoints.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use shopmetrics_core::events::user;
use shopmetrics_core::{wrap, AuthOp};

use crate::accounts::AccountError;
use crate::app_state::AppState;
use crate::error::{ApiError, ApiResult};

/// Failed logins from one address that flag a brute-force attempt (and every
/// multiple of it after).
pub const BRUTE_FORCE_THRESHOLD: u64 = 5;
const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub source: Option<String>,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let email = req.email.trim();
    if email.len() < 3 || !email.contains('@') {
        return Err(ApiError::BadRequest("email is not valid".into()));
    }
    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    let source = req.source.as_deref().unwrap_or(user::DEFAULT_SOURCE);

    state
        .accounts()
        .register(email, &req.password)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let reg = state.registry();
    user::registered(reg, source);
    user::email_verification(reg, "sent");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered", "email": email })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub method: Option<String>,
}

/// First hop of `x-forwarded-for`, else `unknown`.
fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("unknown")
        .to_string()
}

/// True on every multiple of [`BRUTE_FORCE_THRESHOLD`].
fn is_brute_force(failures: u64) -> bool {
    failures > 0 && failures % BRUTE_FORCE_THRESHOLD == 0
}

pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<Value>> {
    let reg = state.registry();
    let method = req.method.as_deref().unwrap_or(user::DEFAULT_LOGIN_METHOD);

    let outcome = wrap(reg, AuthOp::new("login"), async {
        state.accounts().login(&req.email, &req.password)
    })
    .await;

    match outcome {
        Ok(token) => {
            user::login_attempted(reg, true, method);
            user::session_created(reg);
            user::jwt_issued(reg, user::DEFAULT_TOKEN_TYPE);
            user::active_sessions(reg, state.accounts().active_sessions() as u64);
            Ok(Json(json!({
                "token": token,
                "token_type": user::DEFAULT_TOKEN_TYPE,
            })))
        }
        Err(_) => {
            let ip = client_ip(&headers);
            user::login_attempted(reg, false, method);
            user::failed_login_from(reg, &ip);

            let failures = state.accounts().record_failure(&ip);
            if is_brute_force(failures) {
                tracing::warn!(%ip, failures, "repeated failed logins");
                user::suspicious_activity(reg, "brute_force");
            }
            Err(ApiError::Unauthorized("invalid credentials".into()))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub token: String,
}

pub async fn logout(
    State(state): State<AppState>,
    Json(req): Json<LogoutRequest>,
) -> ApiResult<Json<Value>> {
    let reg = state.registry();
    let closed = wrap(reg, AuthOp::new("logout"), async {
        if state.accounts().logout(&req.token) {
            Ok(())
        } else {
            Err(AccountError::InvalidCredentials)
        }
    })
    .await;

    match closed {
        Ok(()) => {
            user::jwt_validated(reg, "valid");
            user::jwt_revoked(reg, "logout");
            user::active_sessions(reg, state.accounts().active_sessions() as u64);
            Ok(Json(json!({ "message": "Logged out" })))
        }
        Err(_) => {
            user::jwt_validated(reg, "invalid");
            Err(ApiError::Unauthorized("unknown session".into()))
        }
    }
}
