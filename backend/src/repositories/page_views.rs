use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::page_view::{PageView, PageViewSummary};

const PAGE_VIEW_COLUMNS: &str = "id, session_id, user_id, page_path, page_title, entry_time, \
     exit_time, duration, scroll_depth, interactions, referrer, created_at";

pub async fn insert(
    pool: &PgPool,
    session_id: i64,
    user_id: i64,
    page_path: &str,
    page_title: Option<&str>,
    referrer: Option<&str>,
) -> Result<PageView, sqlx::Error> {
    sqlx::query_as::<_, PageView>(&format!(
        "INSERT INTO page_views \
         (session_id, user_id, page_path, page_title, entry_time, interactions, referrer) \
         VALUES ($1, $2, $3, $4, $5, 0, $6) \
         RETURNING {PAGE_VIEW_COLUMNS}"
    ))
    .bind(session_id)
    .bind(user_id)
    .bind(page_path)
    .bind(page_title)
    .bind(Utc::now())
    .bind(referrer)
    .fetch_one(pool)
    .await
}

/// Writes the close-time snapshot onto an open page view.
///
/// Clamps scroll depth into 0..=100 rather than rejecting out-of-range
/// reports; the close path must not fail the client's navigation.
pub async fn close(
    pool: &PgPool,
    page_view_id: i64,
    exit_time: DateTime<Utc>,
    duration: Option<i32>,
    scroll_depth: Option<i32>,
    interactions: Option<i32>,
) -> Result<bool, sqlx::Error> {
    let scroll_depth = scroll_depth.map(|depth| depth.clamp(0, 100));
    let result = sqlx::query(
        "UPDATE page_views \
         SET exit_time = $1, \
             duration = COALESCE($2, GREATEST(0, EXTRACT(EPOCH FROM ($1 - entry_time))::integer)), \
             scroll_depth = COALESCE($3, scroll_depth), \
             interactions = COALESCE($4, interactions) \
         WHERE id = $5",
    )
    .bind(exit_time)
    .bind(duration)
    .bind(scroll_depth)
    .bind(interactions)
    .bind(page_view_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn find_by_id(
    pool: &PgPool,
    page_view_id: i64,
) -> Result<Option<PageView>, sqlx::Error> {
    sqlx::query_as::<_, PageView>(&format!(
        "SELECT {PAGE_VIEW_COLUMNS} FROM page_views WHERE id = $1"
    ))
    .bind(page_view_id)
    .fetch_optional(pool)
    .await
}

/// Page views of one session, in entry order, for the analytics listing.
pub async fn list_for_session(
    pool: &PgPool,
    session_id: i64,
) -> Result<Vec<PageViewSummary>, sqlx::Error> {
    sqlx::query_as::<_, PageViewSummary>(
        "SELECT page_path, page_title, entry_time, exit_time, duration, scroll_depth, interactions \
         FROM page_views WHERE session_id = $1 ORDER BY entry_time ASC",
    )
    .bind(session_id)
    .fetch_all(pool)
    .await
}
