use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
/// Append-only audit row for one authentication lifecycle event.
///
/// `session_type` distinguishes how the row was produced: "login" for OTP
/// request/verify attempts, or a session end reason ("logout", "timeout",
/// "browser_close"). Rows are never mutated or deleted.
pub struct LoginLog {
    pub id: i64,
    pub user_id: Option<i64>,
    pub email: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub browser_name: Option<String>,
    pub device_type: Option<String>,
    pub operating_system: Option<String>,
    pub session_type: String,
    pub success: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
/// Fields captured when appending a login log row.
pub struct NewLoginLog {
    pub user_id: Option<i64>,
    pub email: String,
    pub ip_address: String,
    pub user_agent: String,
    pub browser_name: String,
    pub device_type: String,
    pub operating_system: String,
    pub session_type: String,
    pub success: bool,
}
