//! Delivery of "this session/page view ended" signals.
//!
//! Primary transport is an ordinary authenticated request. When that cannot
//! complete (the page may already be tearing down), the payload is handed to
//! `navigator.sendBeacon`, which the browser flushes even during unload.
//! Beacons cannot carry headers, so the credential is embedded in the body.

use chrono::Utc;

use crate::api::{
    client::cached_token, ApiClient, EndPageViewPayload, SessionEndPayload, SessionEndReason,
};
use crate::tracking::state::OpenPageView;

pub fn build_session_end_payload(
    reason: SessionEndReason,
    session_duration: i64,
    token: Option<String>,
    session_token: Option<String>,
) -> SessionEndPayload {
    SessionEndPayload {
        reason,
        timestamp: Utc::now().to_rfc3339(),
        session_duration,
        token,
        session_token,
    }
}

pub fn build_end_page_view_payload(view: &OpenPageView, now_ms: f64) -> EndPageViewPayload {
    let duration = ((now_ms - view.entry_time_ms) / 1000.0).max(0.0) as i64;
    EndPageViewPayload {
        page_view_id: view.page_view_id,
        exit_time: Utc::now().to_rfc3339(),
        duration,
        scroll_depth: view.max_scroll_depth,
        interactions: view.interactions,
        token: None,
    }
}

/// Fire-and-forget delivery that survives page teardown. Returns whether
/// the browser accepted the payload for sending.
pub fn send_beacon(url: &str, body: &str) -> bool {
    let Some(window) = web_sys::window() else {
        return false;
    };
    window
        .navigator()
        .send_beacon_with_opt_str(url, Some(body))
        .unwrap_or(false)
}

/// Reports a session end: authenticated request first, beacon fallback.
/// Never propagates a failure; the worst case is a session row left open.
pub async fn deliver_session_end(api: &ApiClient, mut payload: SessionEndPayload) {
    if api.session_end(&payload).await.is_ok() {
        return;
    }

    payload.token = cached_token();
    let Ok(body) = serde_json::to_string(&payload) else {
        return;
    };
    let url = format!("{}/auth/session-end", api.resolved_base_url().await);
    if !send_beacon(&url, &body) {
        log::warn!("session-end delivery failed on both transports");
    }
}

/// Closes a page view: authenticated request first, beacon fallback.
pub async fn deliver_page_view_end(api: &ApiClient, mut payload: EndPageViewPayload) {
    if api.end_page_view(&payload).await.is_ok() {
        return;
    }

    payload.token = cached_token();
    let Ok(body) = serde_json::to_string(&payload) else {
        return;
    };
    let url = format!("{}/page-tracking/end", api.resolved_base_url().await);
    if !send_beacon(&url, &body) {
        log::warn!("page-view-end delivery failed on both transports");
    }
}

/// Unload path: no time for a request/response round trip, beacon only.
/// Fully synchronous so the handler can run to completion before teardown.
pub fn send_page_view_end_beacon(payload: &EndPageViewPayload) {
    let mut payload = payload.clone();
    payload.token = cached_token();
    let Ok(body) = serde_json::to_string(&payload) else {
        return;
    };
    let url = format!(
        "{}/page-tracking/end",
        crate::config::cached_api_base_url_or_default()
    );
    send_beacon(&url, &body);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_end_payload_carries_reason_and_duration() {
        let payload = build_session_end_payload(
            SessionEndReason::Timeout,
            900,
            None,
            Some("session_1700000000000_abc123xyz".into()),
        );
        assert_eq!(payload.reason, SessionEndReason::Timeout);
        assert_eq!(payload.session_duration, 900);
        assert_eq!(
            payload.session_token.as_deref(),
            Some("session_1700000000000_abc123xyz")
        );
        assert!(payload.token.is_none());
    }

    #[test]
    fn page_view_end_duration_derives_from_entry_time() {
        let view = OpenPageView {
            page_view_id: 7,
            session_id: 3,
            page_path: "/reports".into(),
            entry_time_ms: 1_000_000.0,
            max_scroll_depth: 62,
            interactions: 14,
        };
        let payload = build_end_page_view_payload(&view, 1_090_000.0);
        assert_eq!(payload.page_view_id, 7);
        assert_eq!(payload.duration, 90);
        assert_eq!(payload.scroll_depth, 62);
        assert_eq!(payload.interactions, 14);

        // A skewed clock must not produce a negative duration.
        let payload = build_end_page_view_payload(&view, 990_000.0);
        assert_eq!(payload.duration, 0);
    }
}
