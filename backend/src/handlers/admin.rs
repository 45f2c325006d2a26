//! Admin-only handlers: user management and audit listings.

use axum::{
    extract::{Extension, Path, State},
    http::HeaderMap,
    Json,
};
use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    handlers::log_activity,
    models::{
        activity_log::ActivityLog,
        login_log::LoginLog,
        user::{CreateUser, UpdateUser, User, UserResponse},
    },
    repositories::{activity_logs, login_logs, users},
    utils::email::EmailService,
};

/// The seeded administrator account; it can never be deactivated.
const SYSTEM_ADMIN_USER_ID: i64 = 1;

pub async fn get_users(
    State((pool, _config)): State<(PgPool, Config)>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let users = users::list_all(&pool).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

pub async fn create_user(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(actor): Extension<User>,
    headers: HeaderMap,
    Json(payload): Json<CreateUser>,
) -> Result<Json<UserResponse>, AppError> {
    payload.validate()?;

    if users::find_by_email(&pool, &payload.email).await?.is_some() {
        return Err(AppError::BadRequest("Email already registered".to_string()));
    }

    let user = users::insert(&pool, &payload).await?;

    let email = user.email.clone();
    let name = user.name.clone();
    tokio::task::spawn_blocking(move || match EmailService::new() {
        Ok(service) => service.send_welcome_email(&email, &name),
        Err(err) => tracing::warn!(error = ?err, "Email service unavailable"),
    });

    log_activity(
        &pool,
        &actor,
        "user",
        user.id,
        "create",
        json!({"userName": user.name, "userRole": user.role.as_str()}),
        &headers,
    )
    .await;

    Ok(Json(UserResponse::from(user)))
}

pub async fn update_user(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(actor): Extension<User>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(payload): Json<UpdateUser>,
) -> Result<Json<UserResponse>, AppError> {
    payload.validate()?;

    let mut user = users::find_by_id(&pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if payload.is_active == Some(false) && user.id == SYSTEM_ADMIN_USER_ID {
        return Err(AppError::Forbidden(
            "Cannot deactivate the system administrator account".to_string(),
        ));
    }

    if let Some(name) = payload.name {
        user.name = name;
    }
    if let Some(phone) = payload.phone {
        user.phone = Some(phone);
    }
    if let Some(role) = payload.role {
        user.role = role;
    }
    if let Some(is_active) = payload.is_active {
        user.is_active = is_active;
    }
    user.updated_at = Utc::now();

    sqlx::query(
        "UPDATE users SET name = $1, phone = $2, role = $3, is_active = $4, updated_at = $5 \
         WHERE id = $6",
    )
    .bind(&user.name)
    .bind(&user.phone)
    .bind(user.role.as_str())
    .bind(user.is_active)
    .bind(user.updated_at)
    .bind(user.id)
    .execute(&pool)
    .await?;

    log_activity(
        &pool,
        &actor,
        "user",
        user.id,
        "update",
        json!({"userName": user.name}),
        &headers,
    )
    .await;

    Ok(Json(UserResponse::from(user)))
}

pub async fn get_login_logs(
    State((pool, _config)): State<(PgPool, Config)>,
) -> Result<Json<Vec<LoginLog>>, AppError> {
    let logs = login_logs::list_recent(&pool, 100).await?;
    Ok(Json(logs))
}

pub async fn get_activity_logs(
    State((pool, _config)): State<(PgPool, Config)>,
) -> Result<Json<Vec<ActivityLog>>, AppError> {
    let logs = activity_logs::list_recent(&pool, 50).await?;
    Ok(Json(logs))
}
