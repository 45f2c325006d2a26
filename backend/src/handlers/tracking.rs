use axum::{
    extract::{Extension, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    config::Config,
    models::{
        page_view::{EndPageViewPayload, StartPageViewPayload, StartPageViewResponse},
        session::SessionAnalytics,
        user::User,
    },
    repositories::{page_views, sessions},
    utils::{browser, jwt::verify_access_token, net, time},
};

type HandlerError = (StatusCode, Json<Value>);
type HandlerResult<T> = Result<T, HandlerError>;

/// Opens a page view, lazily creating the session row the first time a
/// session token is seen. The session captures the client address, raw
/// user agent and the server-resolved fingerprint at creation time; the
/// client's own classification is display-only.
pub async fn start_page_view(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(user): Extension<User>,
    headers: HeaderMap,
    Json(payload): Json<StartPageViewPayload>,
) -> HandlerResult<Json<StartPageViewResponse>> {
    payload
        .validate()
        .map_err(|_| bad_request("Invalid page view payload"))?;

    let session = match sessions::find_by_token(&pool, &payload.session_token)
        .await
        .map_err(|_| internal_error("Database error"))?
    {
        Some(session) => session,
        None => {
            let ip_address = net::extract_client_ip(&headers);
            let user_agent = net::extract_user_agent(&headers);
            let fingerprint = browser::resolve(&user_agent);
            sessions::insert(
                &pool,
                &sessions::NewSession {
                    user_id: user.id,
                    session_token: &payload.session_token,
                    ip_address: &ip_address,
                    user_agent: &user_agent,
                    browser_name: &fingerprint.browser_name,
                    device_type: fingerprint.device_type.as_str(),
                    operating_system: &fingerprint.operating_system,
                },
            )
            .await
            .map_err(|_| internal_error("Failed to create session"))?
        }
    };

    let page_view = page_views::insert(
        &pool,
        session.id,
        user.id,
        &payload.page_path,
        payload.page_title.as_deref(),
        payload.referrer.as_deref(),
    )
    .await
    .map_err(|_| internal_error("Failed to create page view"))?;

    sessions::increment_total_pages(&pool, session.id)
        .await
        .map_err(|_| internal_error("Failed to update session"))?;

    Ok(Json(StartPageViewResponse {
        page_view_id: page_view.id,
        session_id: session.id,
    }))
}

/// Closes a page view in place.
///
/// The beacon transport cannot set headers, so the credential may ride in
/// the body instead. Requires a resolvable credential (401 otherwise), but
/// past that point degrades to a logged warning plus success so the
/// navigation or unload that triggered the close is never blocked.
pub async fn end_page_view(
    State((pool, config)): State<(PgPool, Config)>,
    headers: HeaderMap,
    Json(payload): Json<EndPageViewPayload>,
) -> HandlerResult<Json<Value>> {
    let header_token = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));
    let credential = [header_token, payload.token.as_deref()]
        .into_iter()
        .flatten()
        .find_map(|token| verify_access_token(token, &config.jwt_secret).ok());
    if credential.is_none() {
        return Err(unauthorized("Access token required"));
    }

    let exit_time = payload.exit_time.unwrap_or_else(Utc::now);
    match page_views::close(
        &pool,
        payload.page_view_id,
        exit_time,
        payload.duration,
        payload.scroll_depth,
        payload.interactions,
    )
    .await
    {
        Ok(true) => {}
        Ok(false) => {
            tracing::warn!(page_view_id = payload.page_view_id, "Unknown page view id");
        }
        Err(err) => {
            tracing::warn!(error = ?err, "Failed to close page view");
        }
    }

    Ok(Json(json!({"message": "Page view recorded"})))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionAnalyticsQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub user_id: Option<i64>,
}

/// Admin listing of sessions with their nested, ordered page views.
/// Date filters are calendar dates interpreted in the configured timezone.
pub async fn session_analytics(
    State((pool, config)): State<(PgPool, Config)>,
    Query(query): Query<SessionAnalyticsQuery>,
) -> HandlerResult<Json<Vec<SessionAnalytics>>> {
    let tz = &config.time_zone;
    let filters = sessions::SessionFilters {
        start_date: query
            .start_date
            .and_then(|date| time::start_of_day_utc(tz, date)),
        end_date: query.end_date.and_then(|date| time::end_of_day_utc(tz, date)),
        user_id: query.user_id,
    };

    let rows = sessions::list_for_analytics(&pool, &filters)
        .await
        .map_err(|_| internal_error("Database error"))?;

    let mut result = Vec::with_capacity(rows.len());
    for row in rows {
        let page_views = page_views::list_for_session(&pool, row.id)
            .await
            .map_err(|_| internal_error("Database error"))?;
        result.push(SessionAnalytics {
            id: row.id,
            user_id: row.user_id,
            user_name: row.user_name,
            user_email: row.user_email,
            start_time: row.start_time,
            end_time: row.end_time,
            duration: row.duration,
            total_pages: row.total_pages,
            browser_name: row.browser_name,
            device_type: row.device_type,
            operating_system: row.operating_system,
            end_reason: row.end_reason,
            page_views,
        });
    }

    Ok(Json(result))
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

fn internal_error(message: &'static str) -> HandlerError {
    handler_error(StatusCode::INTERNAL_SERVER_ERROR, message)
}
