//! Models for tracked browser sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
/// Database representation of one authenticated browser session.
///
/// The token is minted client-side on the first post-login page view and
/// stays stable across reloads; a row is created lazily when the server
/// first sees an unknown token. `end_time`, `end_reason` and `duration`
/// are set together, exactly once, by whichever termination path wins.
/// Rows are never deleted (audit retention).
pub struct UserSession {
    pub id: i64,
    pub user_id: i64,
    pub session_token: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    /// Seconds between start and end; always `end_time - start_time`.
    pub duration: Option<i32>,
    pub total_pages: i32,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub browser_name: Option<String>,
    pub device_type: Option<String>,
    pub operating_system: Option<String>,
    pub end_reason: Option<SessionEndReason>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
/// How a session ended. Closed set so reason handling stays exhaustive.
pub enum SessionEndReason {
    /// The user clicked log out.
    Logout,
    /// The inactivity watchdog fired after 15 minutes without input.
    Timeout,
    /// The visibility watchdog fired with the tab still hidden.
    BrowserClose,
}

impl SessionEndReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionEndReason::Logout => "logout",
            SessionEndReason::Timeout => "timeout",
            SessionEndReason::BrowserClose => "browser_close",
        }
    }

    /// Maps the reason to the activity-log action recorded alongside it.
    pub fn activity_action(&self) -> &'static str {
        match self {
            SessionEndReason::Logout => "session_end",
            SessionEndReason::Timeout => "auto_logout_timeout",
            SessionEndReason::BrowserClose => "auto_logout_browser_close",
        }
    }
}

impl Serialize for SessionEndReason {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SessionEndReason {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "logout" => Ok(SessionEndReason::Logout),
            "timeout" => Ok(SessionEndReason::Timeout),
            "browser_close" => Ok(SessionEndReason::BrowserClose),
            other => Err(serde::de::Error::unknown_variant(
                other,
                &["logout", "timeout", "browser_close"],
            )),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
/// Client report that a session has ended, delivered via fetch or beacon.
pub struct SessionEndPayload {
    pub reason: SessionEndReason,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub session_duration: Option<i64>,
    /// Credential for the beacon path, which cannot set headers.
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub session_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
/// One session with its ordered page views, for the admin analytics view.
pub struct SessionAnalytics {
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
    pub page_views: Vec<crate::models::page_view::PageViewSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_reason_serde_round_trip() {
        for (reason, text) in [
            (SessionEndReason::Logout, "\"logout\""),
            (SessionEndReason::Timeout, "\"timeout\""),
            (SessionEndReason::BrowserClose, "\"browser_close\""),
        ] {
            let parsed: SessionEndReason = serde_json::from_str(text).unwrap();
            assert_eq!(parsed, reason);
            assert_eq!(serde_json::to_string(&reason).unwrap(), text);
        }
    }

    #[test]
    fn end_reason_rejects_open_strings() {
        let result: Result<SessionEndReason, _> = serde_json::from_str("\"crashed\"");
        assert!(result.is_err());
    }

    #[test]
    fn activity_actions_match_reasons() {
        assert_eq!(SessionEndReason::Logout.activity_action(), "session_end");
        assert_eq!(
            SessionEndReason::Timeout.activity_action(),
            "auto_logout_timeout"
        );
        assert_eq!(
            SessionEndReason::BrowserClose.activity_action(),
            "auto_logout_browser_close"
        );
    }

    #[test]
    fn session_end_payload_accepts_minimal_body() {
        let payload: SessionEndPayload =
            serde_json::from_str(r#"{"reason":"timeout"}"#).unwrap();
        assert_eq!(payload.reason, SessionEndReason::Timeout);
        assert!(payload.token.is_none());
        assert!(payload.session_token.is_none());
        assert!(payload.session_duration.is_none());
    }
}
