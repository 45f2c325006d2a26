mod support;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

use bondcrm_backend::models::user::UserRole;
use bondcrm_backend::utils::jwt::Claims;
use support::{
    get_request, json_request, response_json, seed_user, test_app, test_config, test_pool,
    unique_suffix,
};

fn session_token() -> String {
    format!("session_{}_{}", Utc::now().timestamp_millis(), unique_suffix())
}

#[tokio::test]
async fn start_page_view_reuses_session_for_known_token() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let config = test_config();
    let app = test_app(pool.clone(), &config);
    let user = seed_user(&pool, UserRole::Sales).await;
    let token = support::token_for(&user, &config);
    let tracking_token = session_token();

    // First sight of the token lazily creates the session.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/page-tracking/start",
            Some(&token),
            json!({
                "sessionToken": tracking_token,
                "pagePath": "/dashboard",
                "pageTitle": "Dashboard",
                "referrer": ""
            }),
        ))
        .await
        .expect("first start");
    assert_eq!(response.status(), StatusCode::OK);
    let first = response_json(response).await;
    let session_id = first["sessionId"].as_i64().expect("session id");
    let first_view = first["pageViewId"].as_i64().expect("page view id");

    // Same token again (page reload) must not create a second session row.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/page-tracking/start",
            Some(&token),
            json!({
                "sessionToken": tracking_token,
                "pagePath": "/leads",
                "pageTitle": "Lead Management"
            }),
        ))
        .await
        .expect("second start");
    assert_eq!(response.status(), StatusCode::OK);
    let second = response_json(response).await;
    assert_eq!(second["sessionId"].as_i64(), Some(session_id));
    assert_ne!(second["pageViewId"].as_i64(), Some(first_view));

    let (row_count, total_pages): (i64, i32) = sqlx::query_as(
        "SELECT COUNT(*) OVER (), total_pages FROM user_sessions WHERE session_token = $1",
    )
    .bind(&tracking_token)
    .fetch_one(&pool)
    .await
    .expect("session row");
    assert_eq!(row_count, 1);
    assert_eq!(total_pages, 2);

    // The session captured the server-resolved fingerprint.
    let (browser, device): (Option<String>, Option<String>) = sqlx::query_as(
        "SELECT browser_name, device_type FROM user_sessions WHERE session_token = $1",
    )
    .bind(&tracking_token)
    .fetch_one(&pool)
    .await
    .expect("fingerprint columns");
    assert_eq!(browser.as_deref(), Some("Unknown"));
    assert_eq!(device.as_deref(), Some("desktop"));
}

#[tokio::test]
async fn end_page_view_accepts_body_credential_and_clamps_scroll() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let config = test_config();
    let app = test_app(pool.clone(), &config);
    let user = seed_user(&pool, UserRole::Rm).await;
    let token = support::token_for(&user, &config);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/page-tracking/start",
            Some(&token),
            json!({
                "sessionToken": session_token(),
                "pagePath": "/customers",
                "pageTitle": "Customer Management"
            }),
        ))
        .await
        .expect("start");
    let body = response_json(response).await;
    let page_view_id = body["pageViewId"].as_i64().expect("page view id");

    // No credential anywhere: rejected.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/page-tracking/end",
            None,
            json!({"pageViewId": page_view_id}),
        ))
        .await
        .expect("end without credential");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Beacon path: credential in the body, no Authorization header.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/page-tracking/end",
            None,
            json!({
                "pageViewId": page_view_id,
                "duration": 42,
                "scrollDepth": 180,
                "interactions": 7,
                "token": token
            }),
        ))
        .await
        .expect("end with body credential");
    assert_eq!(response.status(), StatusCode::OK);

    let (exit_set, duration, scroll, interactions): (bool, Option<i32>, Option<i32>, i32) =
        sqlx::query_as(
            "SELECT exit_time IS NOT NULL, duration, scroll_depth, interactions \
             FROM page_views WHERE id = $1",
        )
        .bind(page_view_id)
        .fetch_one(&pool)
        .await
        .expect("page view row");
    assert!(exit_set);
    assert_eq!(duration, Some(42));
    assert_eq!(scroll, Some(100));
    assert_eq!(interactions, 7);
}

#[tokio::test]
async fn session_end_closes_once_and_never_fails_the_client() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let config = test_config();
    let app = test_app(pool.clone(), &config);
    let user = seed_user(&pool, UserRole::Support).await;
    let token = support::token_for(&user, &config);
    let tracking_token = session_token();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/page-tracking/start",
            Some(&token),
            json!({
                "sessionToken": tracking_token,
                "pagePath": "/support-tickets",
                "pageTitle": "Support Tickets"
            }),
        ))
        .await
        .expect("start");
    assert_eq!(response.status(), StatusCode::OK);

    // First terminator wins.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/session-end",
            Some(&token),
            json!({
                "reason": "timeout",
                "sessionDuration": 900,
                "sessionToken": tracking_token
            }),
        ))
        .await
        .expect("first session-end");
    assert_eq!(response.status(), StatusCode::OK);

    // A racing second report must not overwrite the recorded reason.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/session-end",
            Some(&token),
            json!({
                "reason": "browser_close",
                "sessionToken": tracking_token
            }),
        ))
        .await
        .expect("second session-end");
    assert_eq!(response.status(), StatusCode::OK);

    let (end_set, reason, duration): (bool, Option<String>, Option<i32>) = sqlx::query_as(
        "SELECT end_time IS NOT NULL, end_reason, duration FROM user_sessions \
         WHERE session_token = $1",
    )
    .bind(&tracking_token)
    .fetch_one(&pool)
    .await
    .expect("session row");
    assert!(end_set);
    assert_eq!(reason.as_deref(), Some("timeout"));
    assert!(duration.expect("duration") >= 0);

    // Audit rows carry the reason-specific action.
    let actions: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM activity_logs WHERE user_id = $1 AND action = 'auto_logout_timeout'",
    )
    .bind(user.id)
    .fetch_one(&pool)
    .await
    .expect("count activity logs");
    assert_eq!(actions, 1);

    let timeout_logs: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM login_logs WHERE user_id = $1 AND session_type = 'timeout'",
    )
    .bind(user.id)
    .fetch_one(&pool)
    .await
    .expect("count login logs");
    assert_eq!(timeout_logs, 1);
}

#[tokio::test]
async fn session_end_tolerates_expired_credential() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let config = test_config();
    let app = test_app(pool.clone(), &config);
    let user = seed_user(&pool, UserRole::Viewer).await;

    let expired = Claims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        role: "viewer".into(),
        exp: (Utc::now() - Duration::hours(2)).timestamp(),
        iat: (Utc::now() - Duration::hours(26)).timestamp(),
        jti: Uuid::new_v4().to_string(),
    };
    let expired_token = encode(
        &Header::default(),
        &expired,
        &EncodingKey::from_secret(config.jwt_secret.as_ref()),
    )
    .expect("encode expired token");

    // Beacon body delivery with an expired credential: still 200, still
    // attributed to the user in the audit trail.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/session-end",
            None,
            json!({
                "reason": "browser_close",
                "token": expired_token
            }),
        ))
        .await
        .expect("session-end with expired token");
    assert_eq!(response.status(), StatusCode::OK);

    let rows: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM login_logs WHERE user_id = $1 AND session_type = 'browser_close'",
    )
    .bind(user.id)
    .fetch_one(&pool)
    .await
    .expect("count login logs");
    assert_eq!(rows, 1);

    // No credential at all: still 200, nothing attributed.
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/session-end",
            None,
            json!({"reason": "logout"}),
        ))
        .await
        .expect("session-end without credential");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn session_analytics_is_admin_only_and_nests_page_views() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let config = test_config();
    let app = test_app(pool.clone(), &config);
    let admin = seed_user(&pool, UserRole::Admin).await;
    let member = seed_user(&pool, UserRole::Sales).await;
    let admin_token = support::token_for(&admin, &config);
    let member_token = support::token_for(&member, &config);
    let tracking_token = session_token();

    for path in ["/dashboard", "/reports"] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/page-tracking/start",
                Some(&member_token),
                json!({
                    "sessionToken": tracking_token,
                    "pagePath": path
                }),
            ))
            .await
            .expect("start page view");
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(get_request("/api/session-analytics", Some(&member_token)))
        .await
        .expect("analytics as member");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let uri = format!("/api/session-analytics?userId={}", member.id);
    let response = app
        .clone()
        .oneshot(get_request(&uri, Some(&admin_token)))
        .await
        .expect("analytics as admin");
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let sessions = body.as_array().expect("array");
    let session = sessions
        .iter()
        .find(|s| s["userId"].as_i64() == Some(member.id))
        .expect("member session present");
    assert_eq!(session["totalPages"].as_i64(), Some(2));
    let views = session["pageViews"].as_array().expect("page views");
    assert_eq!(views.len(), 2);
    assert_eq!(views[0]["pagePath"], "/dashboard");
    assert_eq!(views[1]["pagePath"], "/reports");

    let response = app
        .oneshot(get_request("/api/login-logs", Some(&member_token)))
        .await
        .expect("login logs as member");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
