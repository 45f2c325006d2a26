use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::otp::Otp;

pub async fn insert(
    pool: &PgPool,
    email: &str,
    otp: &str,
    expires_at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO otps (email, otp, expires_at, is_used) VALUES ($1, $2, $3, FALSE)")
        .bind(email)
        .bind(otp)
        .bind(expires_at)
        .execute(pool)
        .await
        .map(|_| ())
}

/// Finds a matching, unused, non-expired code for the email.
pub async fn find_valid(
    pool: &PgPool,
    email: &str,
    otp: &str,
    now: DateTime<Utc>,
) -> Result<Option<Otp>, sqlx::Error> {
    sqlx::query_as::<_, Otp>(
        "SELECT id, email, otp, expires_at, is_used, created_at FROM otps \
         WHERE email = $1 AND otp = $2 AND is_used = FALSE AND expires_at > $3 \
         ORDER BY created_at DESC LIMIT 1",
    )
    .bind(email)
    .bind(otp)
    .bind(now)
    .fetch_optional(pool)
    .await
}

pub async fn mark_used(pool: &PgPool, otp_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE otps SET is_used = TRUE WHERE id = $1")
        .bind(otp_id)
        .execute(pool)
        .await
        .map(|_| ())
}

/// Removes expired codes. Run opportunistically; codes are tiny rows but
/// there is no reason to retain them past their window.
pub async fn delete_expired(pool: &PgPool, now: DateTime<Utc>) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM otps WHERE expires_at < $1")
        .bind(now)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
