use serde_json::Value;
use sqlx::{types::Json, PgPool};

use crate::models::activity_log::ActivityLog;

#[allow(clippy::too_many_arguments)]
pub async fn insert(
    pool: &PgPool,
    user_id: Option<i64>,
    entity_type: &str,
    entity_id: i64,
    action: &str,
    details: Value,
    ip_address: &str,
    user_agent: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO activity_logs \
         (user_id, entity_type, entity_id, action, details, ip_address, user_agent) \
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(user_id)
    .bind(entity_type)
    .bind(entity_id)
    .bind(action)
    .bind(Json(details))
    .bind(ip_address)
    .bind(user_agent)
    .execute(pool)
    .await
    .map(|_| ())
}

pub async fn list_recent(pool: &PgPool, limit: i64) -> Result<Vec<ActivityLog>, sqlx::Error> {
    sqlx::query_as::<_, ActivityLog>(
        "SELECT id, user_id, entity_type, entity_id, action, details, ip_address, \
         user_agent, created_at \
         FROM activity_logs ORDER BY created_at DESC, id DESC LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}
