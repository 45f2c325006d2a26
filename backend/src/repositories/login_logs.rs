use sqlx::PgPool;

use crate::models::login_log::{LoginLog, NewLoginLog};

pub async fn insert(pool: &PgPool, log: &NewLoginLog) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO login_logs \
         (user_id, email, ip_address, user_agent, browser_name, device_type, \
          operating_system, session_type, success) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(log.user_id)
    .bind(&log.email)
    .bind(&log.ip_address)
    .bind(&log.user_agent)
    .bind(&log.browser_name)
    .bind(&log.device_type)
    .bind(&log.operating_system)
    .bind(&log.session_type)
    .bind(log.success)
    .execute(pool)
    .await
    .map(|_| ())
}

pub async fn list_recent(pool: &PgPool, limit: i64) -> Result<Vec<LoginLog>, sqlx::Error> {
    sqlx::query_as::<_, LoginLog>(
        "SELECT id, user_id, email, ip_address, user_agent, browser_name, device_type, \
         operating_system, session_type, success, created_at \
         FROM login_logs ORDER BY created_at DESC, id DESC LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}
