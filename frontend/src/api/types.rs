//! DTOs mirroring the backend's request/response shapes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Why a session ended. Must round-trip to the backend's closed set.
pub enum SessionEndReason {
    Logout,
    Timeout,
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
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEndPayload {
    pub reason: SessionEndReason,
    pub timestamp: String,
    pub session_duration: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartPageViewPayload {
    pub session_token: String,
    pub page_path: String,
    pub page_title: String,
    pub referrer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartPageViewResponse {
    pub page_view_id: i64,
    pub session_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndPageViewPayload {
    pub page_view_id: i64,
    pub exit_time: String,
    pub duration: i64,
    pub scroll_depth: i32,
    pub interactions: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardKpis {
    pub total_leads: i64,
    pub active_customers: i64,
    pub pending_rfqs: i64,
    pub open_tickets: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentActivity {
    pub id: i64,
    pub user_id: Option<i64>,
    pub user_name: Option<String>,
    pub entity_type: String,
    pub entity_id: i64,
    pub action: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageViewSummary {
    pub page_path: String,
    pub page_title: Option<String>,
    pub entry_time: String,
    pub exit_time: Option<String>,
    pub duration: Option<i64>,
    pub scroll_depth: Option<i32>,
    pub interactions: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionAnalytics {
    pub id: i64,
    pub user_id: i64,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub start_time: String,
    pub end_time: Option<String>,
    pub duration: Option<i64>,
    pub total_pages: i32,
    pub browser_name: Option<String>,
    pub device_type: Option<String>,
    pub operating_system: Option<String>,
    pub end_reason: Option<SessionEndReason>,
    pub page_views: Vec<PageViewSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_end_payload_omits_absent_tokens() {
        let payload = SessionEndPayload {
            reason: SessionEndReason::Timeout,
            timestamp: "2025-01-01T00:00:00Z".into(),
            session_duration: 900,
            token: None,
            session_token: None,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["reason"], "timeout");
        assert_eq!(json["sessionDuration"], 900);
        assert!(json.get("token").is_none());
        assert!(json.get("sessionToken").is_none());
    }

    #[test]
    fn end_reason_wire_values_match_server() {
        assert_eq!(
            serde_json::to_string(&SessionEndReason::BrowserClose).unwrap(),
            "\"browser_close\""
        );
        let parsed: SessionEndReason = serde_json::from_str("\"logout\"").unwrap();
        assert_eq!(parsed, SessionEndReason::Logout);
    }
}
