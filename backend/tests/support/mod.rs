#![allow(dead_code)]

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{header, Request};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::env;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use bondcrm_backend::{
    build_router,
    config::Config,
    models::user::{User, UserRole},
    utils::jwt::create_access_token,
};

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Connects to the database named by `TEST_DATABASE_URL` and applies
/// migrations. Returns `None` (tests print a notice and pass) when the
/// variable is unset, so the suite does not require a local Postgres.
pub async fn test_pool() -> Option<PgPool> {
    let Ok(url) = env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set; skipping database-backed test");
        return None;
    };
    env::set_var("SMTP_SKIP_SEND", "true");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("connect to test database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("run migrations");
    Some(pool)
}

pub fn test_config() -> Config {
    Config {
        database_url: env::var("TEST_DATABASE_URL").unwrap_or_default(),
        jwt_secret: "test-secret-key".to_string(),
        jwt_expiration_hours: 24,
        otp_expiry_minutes: 10,
        time_zone: chrono_tz::UTC,
        rate_limit_otp_max_requests: 1000,
        rate_limit_otp_window_seconds: 1,
    }
}

pub fn test_app(pool: PgPool, config: &Config) -> Router {
    build_router(pool, config.clone())
}

/// Distinct suffix per call so parallel tests never collide on unique
/// columns (emails, session tokens).
pub fn unique_suffix() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .subsec_nanos();
    let count = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{}-{}-{}", std::process::id(), nanos, count)
}

pub async fn seed_user(pool: &PgPool, role: UserRole) -> User {
    let email = format!("user-{}@example.com", unique_suffix());
    sqlx::query_as::<_, User>(
        "INSERT INTO users (email, name, phone, role, is_active) \
         VALUES ($1, $2, NULL, $3, TRUE) \
         RETURNING id, email, name, phone, LOWER(role) as role, is_active, last_login, \
         created_at, updated_at",
    )
    .bind(&email)
    .bind("Test User")
    .bind(role.as_str())
    .fetch_one(pool)
    .await
    .expect("seed user")
}

pub fn token_for(user: &User, config: &Config) -> String {
    create_access_token(
        user.id,
        user.email.clone(),
        user.role.as_str().to_string(),
        &config.jwt_secret,
        config.jwt_expiration_hours,
    )
    .expect("create token")
}

/// Builds a JSON request carrying a fake peer address so the rate-limit
/// layer can extract a key outside a real TCP accept loop.
pub fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::USER_AGENT, "bondcrm-tests/1.0");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let mut request = builder
        .body(Body::from(body.to_string()))
        .expect("build request");
    request
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 41000))));
    request
}

pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::USER_AGENT, "bondcrm-tests/1.0");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let mut request = builder.body(Body::empty()).expect("build request");
    request
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 41000))));
    request
}

pub async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse json body")
}
