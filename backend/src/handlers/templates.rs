use axum::{
    extract::{Extension, State},
    http::HeaderMap,
    Json,
};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    handlers::{leads::require_role, log_activity},
    models::{
        email_template::{CreateEmailTemplate, EmailTemplate},
        user::{User, UserRole},
    },
};

const TEMPLATE_COLUMNS: &str =
    "id, name, subject, body, category, is_active, created_by, created_at, updated_at";

pub async fn list_templates(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(_user): Extension<User>,
) -> Result<Json<Vec<EmailTemplate>>, AppError> {
    let templates = sqlx::query_as::<_, EmailTemplate>(&format!(
        "SELECT {TEMPLATE_COLUMNS} FROM email_templates ORDER BY created_at DESC"
    ))
    .fetch_all(&pool)
    .await?;

    Ok(Json(templates))
}

pub async fn create_template(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(user): Extension<User>,
    headers: HeaderMap,
    Json(payload): Json<CreateEmailTemplate>,
) -> Result<Json<EmailTemplate>, AppError> {
    require_role(&user, &[UserRole::Admin, UserRole::Sales])?;
    payload.validate()?;

    let template = sqlx::query_as::<_, EmailTemplate>(&format!(
        "INSERT INTO email_templates (name, subject, body, category, is_active, created_by) \
         VALUES ($1, $2, $3, $4, TRUE, $5) \
         RETURNING {TEMPLATE_COLUMNS}"
    ))
    .bind(&payload.name)
    .bind(&payload.subject)
    .bind(&payload.body)
    .bind(&payload.category)
    .bind(user.id)
    .fetch_one(&pool)
    .await?;

    log_activity(
        &pool,
        &user,
        "template",
        template.id,
        "create",
        json!({"templateName": template.name}),
        &headers,
    )
    .await;

    Ok(Json(template))
}
