use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
/// One continuous visit to one logical page within a session.
///
/// Scroll depth and interaction count only ever increase while the view is
/// open; the close step writes the final snapshot together with the exit
/// time. The server does not enforce a single open view per session, so
/// concurrent tabs can produce overlapping rows.
pub struct PageView {
    pub id: i64,
    pub session_id: i64,
    pub user_id: i64,
    pub page_path: String,
    pub page_title: Option<String>,
    pub entry_time: DateTime<Utc>,
    pub exit_time: Option<DateTime<Utc>>,
    /// Seconds between entry and exit.
    pub duration: Option<i32>,
    /// Max percentage of scrollable height reached, 0-100.
    pub scroll_depth: Option<i32>,
    pub interactions: i32,
    pub referrer: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
/// Opens a page view; lazily creates the session on first sight of the token.
pub struct StartPageViewPayload {
    #[validate(length(min = 1, max = 128))]
    pub session_token: String,
    #[validate(length(min = 1, max = 512))]
    pub page_path: String,
    #[serde(default)]
    pub page_title: Option<String>,
    #[serde(default)]
    pub referrer: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartPageViewResponse {
    pub page_view_id: i64,
    pub session_id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Closes a page view. May arrive via beacon, hence the optional body token.
pub struct EndPageViewPayload {
    pub page_view_id: i64,
    #[serde(default)]
    pub exit_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration: Option<i32>,
    #[serde(default)]
    pub scroll_depth: Option<i32>,
    #[serde(default)]
    pub interactions: Option<i32>,
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
/// Page view fields surfaced in the admin analytics listing.
pub struct PageViewSummary {
    pub page_path: String,
    pub page_title: Option<String>,
    pub entry_time: DateTime<Utc>,
    pub exit_time: Option<DateTime<Utc>>,
    pub duration: Option<i32>,
    pub scroll_depth: Option<i32>,
    pub interactions: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_payload_tolerates_missing_optionals() {
        let payload: EndPageViewPayload =
            serde_json::from_str(r#"{"pageViewId": 12}"#).unwrap();
        assert_eq!(payload.page_view_id, 12);
        assert!(payload.exit_time.is_none());
        assert!(payload.token.is_none());
    }

    #[test]
    fn start_payload_validates_lengths() {
        let payload = StartPageViewPayload {
            session_token: String::new(),
            page_path: "/dashboard".into(),
            page_title: None,
            referrer: None,
        };
        assert!(validator::Validate::validate(&payload).is_err());

        let payload = StartPageViewPayload {
            session_token: "session_1700000000000_abc123def".into(),
            page_path: "/dashboard".into(),
            page_title: Some("Dashboard".into()),
            referrer: None,
        };
        assert!(validator::Validate::validate(&payload).is_ok());
    }
}
