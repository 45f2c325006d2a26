use axum::http::HeaderMap;
use serde_json::Value;
use sqlx::PgPool;

use crate::models::user::User;
use crate::repositories::activity_logs;
use crate::utils::net;

pub mod admin;
pub mod auth;
pub mod customers;
pub mod dashboard;
pub mod leads;
pub mod rfqs;
pub mod templates;
pub mod tickets;
pub mod tracking;

/// Appends a business-activity audit row. Best-effort: a failed audit write
/// is logged server-side and never fails the request that triggered it.
pub(crate) async fn log_activity(
    pool: &PgPool,
    user: &User,
    entity_type: &str,
    entity_id: i64,
    action: &str,
    details: Value,
    headers: &HeaderMap,
) {
    let ip = net::extract_client_ip(headers);
    let user_agent = net::extract_user_agent(headers);
    if let Err(err) = activity_logs::insert(
        pool,
        Some(user.id),
        entity_type,
        entity_id,
        action,
        details,
        &ip,
        &user_agent,
    )
    .await
    {
        tracing::warn!(
            error = ?err,
            entity_type,
            entity_id,
            action,
            "Failed to record activity log"
        );
    }
}
