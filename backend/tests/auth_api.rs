mod support;

use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

use bondcrm_backend::models::user::UserRole;
use support::{
    get_request, json_request, response_json, seed_user, test_app, test_config, test_pool,
};

#[tokio::test]
async fn request_otp_unknown_email_returns_not_found() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let config = test_config();
    let app = test_app(pool, &config);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/request-otp",
            None,
            json!({"email": "nobody@example.com"}),
        ))
        .await
        .expect("call request-otp");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn otp_codes_are_single_use_within_their_window() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let config = test_config();
    let app = test_app(pool.clone(), &config);
    let user = seed_user(&pool, UserRole::Sales).await;

    // Request a code for the seeded account.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/request-otp",
            None,
            json!({"email": user.email}),
        ))
        .await
        .expect("call request-otp");
    assert_eq!(response.status(), StatusCode::OK);

    // The code is stored with an expiry and delivered out of band; read it
    // back directly for the test.
    let code: String =
        sqlx::query_scalar("SELECT otp FROM otps WHERE email = $1 ORDER BY created_at DESC LIMIT 1")
            .bind(&user.email)
            .fetch_one(&pool)
            .await
            .expect("stored otp");
    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_digit()));

    // Wrong code is rejected.
    let wrong = if code == "111111" { "222222" } else { "111111" };
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/verify-otp",
            None,
            json!({"email": user.email, "otp": wrong}),
        ))
        .await
        .expect("call verify-otp");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Correct code within the window returns a credential.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/verify-otp",
            None,
            json!({"email": user.email, "otp": code}),
        ))
        .await
        .expect("call verify-otp");
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let token = body["token"].as_str().expect("token").to_string();
    assert_eq!(body["user"]["email"], user.email.as_str());
    assert_eq!(body["user"]["role"], "sales");

    // The same code a second time is invalid (marked used).
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/verify-otp",
            None,
            json!({"email": user.email, "otp": code}),
        ))
        .await
        .expect("call verify-otp again");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // The issued credential authenticates /api/auth/me.
    let response = app
        .clone()
        .oneshot(get_request("/api/auth/me", Some(&token)))
        .await
        .expect("call me");
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["id"], user.id);

    // Both attempts were logged: one pre-verification, one success.
    let logged: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM login_logs WHERE email = $1 AND session_type = 'login'",
    )
    .bind(&user.email)
    .fetch_one(&pool)
    .await
    .expect("count login logs");
    assert!(logged >= 2);
}

#[tokio::test]
async fn inactive_user_cannot_verify() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let config = test_config();
    let app = test_app(pool.clone(), &config);
    let user = seed_user(&pool, UserRole::Viewer).await;
    sqlx::query("UPDATE users SET is_active = FALSE WHERE id = $1")
        .bind(user.id)
        .execute(&pool)
        .await
        .expect("deactivate user");

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/request-otp",
            None,
            json!({"email": user.email}),
        ))
        .await
        .expect("call request-otp");
    assert_eq!(response.status(), StatusCode::OK);

    let code: String =
        sqlx::query_scalar("SELECT otp FROM otps WHERE email = $1 ORDER BY created_at DESC LIMIT 1")
            .bind(&user.email)
            .fetch_one(&pool)
            .await
            .expect("stored otp");

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/verify-otp",
            None,
            json!({"email": user.email, "otp": code}),
        ))
        .await
        .expect("call verify-otp");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn protected_routes_reject_missing_and_garbled_tokens() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let config = test_config();
    let app = test_app(pool, &config);

    let response = app
        .clone()
        .oneshot(get_request("/api/auth/me", None))
        .await
        .expect("call me without token");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(get_request("/api/auth/me", Some("not-a-jwt")))
        .await
        .expect("call me with bad token");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
