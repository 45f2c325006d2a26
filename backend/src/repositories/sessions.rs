use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::models::session::{SessionEndReason, UserSession};

const SESSION_COLUMNS: &str = "id, user_id, session_token, start_time, end_time, duration, \
     total_pages, ip_address, user_agent, browser_name, device_type, operating_system, \
     end_reason, created_at";

#[derive(Debug, Clone, Default)]
pub struct SessionFilters {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub user_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct NewSession<'a> {
    pub user_id: i64,
    pub session_token: &'a str,
    pub ip_address: &'a str,
    pub user_agent: &'a str,
    pub browser_name: &'a str,
    pub device_type: &'a str,
    pub operating_system: &'a str,
}

pub async fn find_by_token(
    pool: &PgPool,
    session_token: &str,
) -> Result<Option<UserSession>, sqlx::Error> {
    sqlx::query_as::<_, UserSession>(&format!(
        "SELECT {SESSION_COLUMNS} FROM user_sessions WHERE session_token = $1"
    ))
    .bind(session_token)
    .fetch_optional(pool)
    .await
}

pub async fn insert(pool: &PgPool, session: &NewSession<'_>) -> Result<UserSession, sqlx::Error> {
    sqlx::query_as::<_, UserSession>(&format!(
        "INSERT INTO user_sessions \
         (user_id, session_token, start_time, total_pages, ip_address, user_agent, \
          browser_name, device_type, operating_system) \
         VALUES ($1, $2, $3, 0, $4, $5, $6, $7, $8) \
         RETURNING {SESSION_COLUMNS}"
    ))
    .bind(session.user_id)
    .bind(session.session_token)
    .bind(Utc::now())
    .bind(session.ip_address)
    .bind(session.user_agent)
    .bind(session.browser_name)
    .bind(session.device_type)
    .bind(session.operating_system)
    .fetch_one(pool)
    .await
}

pub async fn increment_total_pages(pool: &PgPool, session_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE user_sessions SET total_pages = total_pages + 1 WHERE id = $1")
        .bind(session_id)
        .execute(pool)
        .await
        .map(|_| ())
}

/// Closes a session, first writer wins.
///
/// End time, reason and duration are set together in a single statement
/// guarded by `end_time IS NULL`, so racing termination paths (both
/// watchdogs firing, or a watchdog racing a manual logout) leave exactly
/// one of them recorded. Returns whether this call did the close.
pub async fn close_once(
    pool: &PgPool,
    session_token: &str,
    reason: SessionEndReason,
    ended_at: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE user_sessions \
         SET end_time = $1, \
             end_reason = $2, \
             duration = GREATEST(0, EXTRACT(EPOCH FROM ($1 - start_time))::integer) \
         WHERE session_token = $3 AND end_time IS NULL",
    )
    .bind(ended_at)
    .bind(reason.as_str())
    .bind(session_token)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Sessions matching the optional filters, newest first, joined with the
/// owning user's name and email for the analytics listing.
pub async fn list_for_analytics(
    pool: &PgPool,
    filters: &SessionFilters,
) -> Result<Vec<SessionAnalyticsRow>, sqlx::Error> {
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
        "SELECT s.id, s.user_id, u.name AS user_name, u.email AS user_email, \
         s.start_time, s.end_time, s.duration, s.total_pages, s.browser_name, \
         s.device_type, s.operating_system, s.end_reason \
         FROM user_sessions s LEFT JOIN users u ON u.id = s.user_id",
    );
    let mut has_clause = false;
    if let Some(start) = filters.start_date.as_ref() {
        push_clause(&mut builder, &mut has_clause);
        builder.push("s.start_time >= ").push_bind(start.to_owned());
    }
    if let Some(end) = filters.end_date.as_ref() {
        push_clause(&mut builder, &mut has_clause);
        builder.push("s.start_time <= ").push_bind(end.to_owned());
    }
    if let Some(user_id) = filters.user_id {
        push_clause(&mut builder, &mut has_clause);
        builder.push("s.user_id = ").push_bind(user_id);
    }
    builder.push(" ORDER BY s.start_time DESC");

    builder
        .build_query_as::<SessionAnalyticsRow>()
        .fetch_all(pool)
        .await
}

fn push_clause(builder: &mut QueryBuilder<'_, Postgres>, has_clause: &mut bool) {
    if *has_clause {
        builder.push(" AND ");
    } else {
        builder.push(" WHERE ");
        *has_clause = true;
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct SessionAnalyticsRow {
    pub id: i64,
    pub user_id: i64,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration: Option<i32>,
    pub total_pages: i32,
    pub browser_name: Option<String>,
    pub device_type: Option<String>,
    pub operating_system: Option<String>,
    pub end_reason: Option<SessionEndReason>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_filters_default_all_none() {
        let filters = SessionFilters::default();
        assert!(filters.start_date.is_none());
        assert!(filters.end_date.is_none());
        assert!(filters.user_id.is_none());
    }
}
