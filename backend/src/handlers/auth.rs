use axum::{
    extract::{Extension, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    config::Config,
    models::{
        login_log::NewLoginLog,
        session::SessionEndPayload,
        user::{LoginResponse, RequestOtpPayload, User, UserResponse, VerifyOtpPayload},
    },
    repositories::{activity_logs, login_logs, otps, sessions, users},
    utils::{
        browser,
        email::EmailService,
        jwt::{create_access_token, decode_expired_claims, verify_access_token, Claims},
        net, otp,
    },
};

type HandlerError = (StatusCode, Json<Value>);
type HandlerResult<T> = Result<T, HandlerError>;

pub async fn request_otp(
    State((pool, config)): State<(PgPool, Config)>,
    headers: HeaderMap,
    Json(payload): Json<RequestOtpPayload>,
) -> HandlerResult<Json<Value>> {
    payload
        .validate()
        .map_err(|_| bad_request("Invalid email address"))?;

    let user = users::find_by_email(&pool, &payload.email)
        .await
        .map_err(|_| internal_error("Database error"))?
        .ok_or_else(|| not_found("User not found"))?;

    let code = otp::generate_otp();
    let expires_at = Utc::now() + Duration::minutes(config.otp_expiry_minutes);
    otps::insert(&pool, &payload.email, &code, expires_at)
        .await
        .map_err(|_| internal_error("Failed to store OTP"))?;

    // Stale codes are useless past their window; sweep them while we are here.
    if let Err(err) = otps::delete_expired(&pool, Utc::now()).await {
        tracing::warn!(error = ?err, "Failed to sweep expired OTPs");
    }

    dispatch_otp_email(payload.email.clone(), code);

    record_login_log(&pool, Some(user.id), &payload.email, &headers, "login", false).await;

    Ok(Json(json!({"message": "OTP sent successfully"})))
}

pub async fn verify_otp(
    State((pool, config)): State<(PgPool, Config)>,
    headers: HeaderMap,
    Json(payload): Json<VerifyOtpPayload>,
) -> HandlerResult<Json<LoginResponse>> {
    payload
        .validate()
        .map_err(|_| bad_request("Invalid email or OTP format"))?;
    if !otp::is_valid_otp_format(&payload.otp) {
        return Err(bad_request("Invalid or expired OTP"));
    }

    let valid_otp = otps::find_valid(&pool, &payload.email, &payload.otp, Utc::now())
        .await
        .map_err(|_| internal_error("Database error"))?
        .ok_or_else(|| bad_request("Invalid or expired OTP"))?;

    let user = users::find_by_email(&pool, &payload.email)
        .await
        .map_err(|_| internal_error("Database error"))?
        .filter(|user| user.is_active)
        .ok_or_else(|| unauthorized("User not found or inactive"))?;

    otps::mark_used(&pool, valid_otp.id)
        .await
        .map_err(|_| internal_error("Failed to mark OTP as used"))?;
    users::stamp_last_login(&pool, user.id)
        .await
        .map_err(|_| internal_error("Failed to update last login"))?;

    let token = create_access_token(
        user.id,
        user.email.clone(),
        user.role.as_str().to_string(),
        &config.jwt_secret,
        config.jwt_expiration_hours,
    )
    .map_err(|_| internal_error("Token creation error"))?;

    record_login_log(&pool, Some(user.id), &payload.email, &headers, "login", true).await;

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
        user: UserResponse::from(user),
    }))
}

pub async fn me(Extension(user): Extension<User>) -> Json<UserResponse> {
    Json(UserResponse::from(user))
}

pub async fn logout(Extension(_user): Extension<User>) -> Json<Value> {
    // Stateless JWT: nothing to revoke server-side. The client clears its
    // cached credential and reports the session end separately.
    Json(json!({"message": "Logout successful"}))
}

/// Session-end report from a watchdog, explicit logout, or page unload.
///
/// Must never fail the client's termination flow: every internal failure is
/// logged and swallowed, and the response is 200 regardless. The credential
/// may arrive in the Authorization header or, for the beacon transport, in
/// the body; an expired-but-parseable token is still accepted so the audit
/// trail records who ended the session.
pub async fn session_end(
    State((pool, config)): State<(PgPool, Config)>,
    headers: HeaderMap,
    Json(payload): Json<SessionEndPayload>,
) -> Json<Value> {
    let Some(claims) = resolve_session_end_claims(&headers, payload.token.as_deref(), &config)
    else {
        tracing::warn!(
            reason = payload.reason.as_str(),
            "session-end without resolvable credential"
        );
        return Json(json!({"message": "Session end recorded"}));
    };

    let ended_at = payload.timestamp.unwrap_or_else(Utc::now);
    let mut session_id = 0_i64;

    if let Some(session_token) = payload.session_token.as_deref() {
        match sessions::close_once(&pool, session_token, payload.reason, ended_at).await {
            Ok(closed) => {
                if !closed {
                    tracing::debug!(
                        reason = payload.reason.as_str(),
                        "session already closed or unknown token"
                    );
                }
                if let Ok(Some(session)) = sessions::find_by_token(&pool, session_token).await {
                    session_id = session.id;
                }
            }
            Err(err) => {
                tracing::warn!(error = ?err, "Failed to close session row");
            }
        }
    }

    record_login_log(
        &pool,
        claims.user_id(),
        &claims.email,
        &headers,
        payload.reason.as_str(),
        true,
    )
    .await;

    let ip = net::extract_client_ip(&headers);
    let user_agent = net::extract_user_agent(&headers);
    let fingerprint = browser::resolve(&user_agent);
    let details = json!({
        "reason": payload.reason.as_str(),
        "sessionDuration": payload.session_duration,
        "browserName": fingerprint.browser_name,
        "deviceType": fingerprint.device_type.as_str(),
        "operatingSystem": fingerprint.operating_system,
    });
    if let Err(err) = activity_logs::insert(
        &pool,
        claims.user_id(),
        "session",
        session_id,
        payload.reason.activity_action(),
        details,
        &ip,
        &user_agent,
    )
    .await
    {
        tracing::warn!(error = ?err, "Failed to record session-end activity log");
    }

    Json(json!({"message": "Session end recorded"}))
}

fn resolve_session_end_claims(
    headers: &HeaderMap,
    body_token: Option<&str>,
    config: &Config,
) -> Option<Claims> {
    let header_token = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    for token in [header_token, body_token].into_iter().flatten() {
        if let Ok(claims) = verify_access_token(token, &config.jwt_secret) {
            return Some(claims);
        }
        if let Ok(claims) = decode_expired_claims(token, &config.jwt_secret) {
            return Some(claims);
        }
    }
    None
}

async fn record_login_log(
    pool: &PgPool,
    user_id: Option<i64>,
    email: &str,
    headers: &HeaderMap,
    session_type: &str,
    success: bool,
) {
    let ip_address = net::extract_client_ip(headers);
    let user_agent = net::extract_user_agent(headers);
    let fingerprint = browser::resolve(&user_agent);

    let log = NewLoginLog {
        user_id,
        email: email.to_string(),
        ip_address,
        user_agent,
        browser_name: fingerprint.browser_name,
        device_type: fingerprint.device_type.as_str().to_string(),
        operating_system: fingerprint.operating_system,
        session_type: session_type.to_string(),
        success,
    };
    if let Err(err) = login_logs::insert(pool, &log).await {
        tracing::warn!(error = ?err, session_type, "Failed to record login log");
    }
}

fn dispatch_otp_email(email: String, code: String) {
    // SMTP transport is blocking; deliver off the request path. Failures are
    // logged by the service, never surfaced to the login flow.
    tokio::task::spawn_blocking(move || match EmailService::new() {
        Ok(service) => service.send_otp(&email, &code),
        Err(err) => tracing::warn!(error = ?err, "Email service unavailable"),
    });
}

fn handler_error(status: StatusCode, message: &'static str) -> HandlerError {
    (status, Json(json!({ "message": message })))
}

fn bad_request(message: &'static str) -> HandlerError {
    handler_error(StatusCode::BAD_REQUEST, message)
}

fn unauthorized(message: &'static str) -> HandlerError {
    handler_error(StatusCode::UNAUTHORIZED, message)
}

fn not_found(message: &'static str) -> HandlerError {
    handler_error(StatusCode::NOT_FOUND, message)
}

fn internal_error(message: &'static str) -> HandlerError {
    handler_error(StatusCode::INTERNAL_SERVER_ERROR, message)
}
