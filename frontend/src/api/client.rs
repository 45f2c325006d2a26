use reqwest::{Client, StatusCode};
use serde_json::json;

use crate::{api::types::*, config, utils::storage as storage_utils};

pub const TOKEN_KEY: &str = "token";
pub const SESSION_TOKEN_KEY: &str = "sessionToken";
pub const CURRENT_USER_KEY: &str = "currentUser";

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Option<String>,
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: None,
        }
    }

    pub fn new_with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: Some(base_url.into()),
        }
    }

    pub async fn resolved_base_url(&self) -> String {
        if let Some(base) = &self.base_url {
            base.clone()
        } else {
            config::await_api_base_url().await
        }
    }

    fn get_auth_headers(&self) -> Result<reqwest::header::HeaderMap, String> {
        let mut headers = reqwest::header::HeaderMap::new();

        let storage = storage_utils::local_storage()?;
        let token = storage
            .get_item(TOKEN_KEY)
            .map_err(|_| "Failed to get token")?
            .ok_or("No token")?;

        headers.insert(
            reqwest::header::AUTHORIZATION,
            format!("Bearer {}", token)
                .parse()
                .map_err(|_| "Invalid token format")?,
        );

        Ok(headers)
    }

    fn handle_unauthorized_status(status: StatusCode) {
        if status == StatusCode::UNAUTHORIZED {
            Self::clear_auth_session();
            Self::redirect_to_login_if_needed();
        }
    }

    pub fn clear_auth_session() {
        if let Ok(storage) = storage_utils::local_storage() {
            let _ = storage.remove_item(TOKEN_KEY);
            let _ = storage.remove_item(SESSION_TOKEN_KEY);
            let _ = storage.remove_item(CURRENT_USER_KEY);
        }
    }

    fn redirect_to_login_if_needed() {
        if let Some(window) = web_sys::window() {
            let location = window.location();
            if let Ok(pathname) = location.pathname() {
                if pathname == "/login" {
                    return;
                }
            }
            let _ = location.set_href("/login");
        }
    }

    pub async fn request_otp(&self, email: &str) -> Result<(), String> {
        let base_url = self.resolved_base_url().await;
        let response = self
            .client
            .post(format!("{}/auth/request-otp", base_url))
            .json(&json!({ "email": email }))
            .send()
            .await
            .map_err(|e| format!("Request failed: {}", e))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(parse_error(response).await)
        }
    }

    pub async fn verify_otp(&self, email: &str, otp: &str) -> Result<LoginResponse, String> {
        let base_url = self.resolved_base_url().await;
        let response = self
            .client
            .post(format!("{}/auth/verify-otp", base_url))
            .json(&json!({ "email": email, "otp": otp }))
            .send()
            .await
            .map_err(|e| format!("Request failed: {}", e))?;

        if response.status().is_success() {
            let login_response: LoginResponse = response
                .json()
                .await
                .map_err(|e| format!("Failed to parse response: {}", e))?;
            persist_session(&login_response)?;
            Ok(login_response)
        } else {
            Err(parse_error(response).await)
        }
    }

    pub async fn get_me(&self) -> Result<UserResponse, String> {
        let headers = self.get_auth_headers()?;
        let base_url = self.resolved_base_url().await;
        let response = self
            .client
            .get(format!("{}/auth/me", base_url))
            .headers(headers)
            .send()
            .await
            .map_err(|e| format!("Request failed: {}", e))?;

        let status = response.status();
        Self::handle_unauthorized_status(status);
        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| format!("Failed to parse response: {}", e))
        } else {
            Err(parse_error(response).await)
        }
    }

    pub async fn logout(&self) -> Result<(), String> {
        let headers = self.get_auth_headers()?;
        let base_url = self.resolved_base_url().await;
        let response = self
            .client
            .post(format!("{}/auth/logout", base_url))
            .headers(headers)
            .json(&json!({}))
            .send()
            .await
            .map_err(|e| format!("Request failed: {}", e))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(parse_error(response).await)
        }
    }

    /// Session-end report over the primary transport. The caller falls back
    /// to a beacon when this cannot complete (e.g. mid-unload).
    pub async fn session_end(&self, payload: &SessionEndPayload) -> Result<(), String> {
        let headers = self.get_auth_headers()?;
        let base_url = self.resolved_base_url().await;
        let response = self
            .client
            .post(format!("{}/auth/session-end", base_url))
            .headers(headers)
            .json(payload)
            .send()
            .await
            .map_err(|e| format!("Request failed: {}", e))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(parse_error(response).await)
        }
    }

    pub async fn start_page_view(
        &self,
        payload: &StartPageViewPayload,
    ) -> Result<StartPageViewResponse, String> {
        let headers = self.get_auth_headers()?;
        let base_url = self.resolved_base_url().await;
        let response = self
            .client
            .post(format!("{}/page-tracking/start", base_url))
            .headers(headers)
            .json(payload)
            .send()
            .await
            .map_err(|e| format!("Request failed: {}", e))?;

        let status = response.status();
        Self::handle_unauthorized_status(status);
        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| format!("Failed to parse response: {}", e))
        } else {
            Err(parse_error(response).await)
        }
    }

    pub async fn end_page_view(&self, payload: &EndPageViewPayload) -> Result<(), String> {
        let headers = self.get_auth_headers()?;
        let base_url = self.resolved_base_url().await;
        let response = self
            .client
            .post(format!("{}/page-tracking/end", base_url))
            .headers(headers)
            .json(payload)
            .send()
            .await
            .map_err(|e| format!("Request failed: {}", e))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(parse_error(response).await)
        }
    }

    pub async fn get_dashboard_kpis(&self) -> Result<DashboardKpis, String> {
        let headers = self.get_auth_headers()?;
        let base_url = self.resolved_base_url().await;
        let response = self
            .client
            .get(format!("{}/dashboard/kpis", base_url))
            .headers(headers)
            .send()
            .await
            .map_err(|e| format!("Request failed: {}", e))?;

        let status = response.status();
        Self::handle_unauthorized_status(status);
        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| format!("Failed to parse response: {}", e))
        } else {
            Err(parse_error(response).await)
        }
    }

    pub async fn get_recent_activities(&self) -> Result<Vec<RecentActivity>, String> {
        let headers = self.get_auth_headers()?;
        let base_url = self.resolved_base_url().await;
        let response = self
            .client
            .get(format!("{}/dashboard/recent-activities", base_url))
            .headers(headers)
            .send()
            .await
            .map_err(|e| format!("Request failed: {}", e))?;

        let status = response.status();
        Self::handle_unauthorized_status(status);
        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| format!("Failed to parse response: {}", e))
        } else {
            Err(parse_error(response).await)
        }
    }

    pub async fn get_session_analytics(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
        user_id: Option<i64>,
    ) -> Result<Vec<SessionAnalytics>, String> {
        let headers = self.get_auth_headers()?;
        let base_url = self.resolved_base_url().await;
        let mut url = format!("{}/session-analytics", base_url);
        let mut query_params = Vec::new();
        if let Some(start) = start_date {
            query_params.push(format!("startDate={}", start));
        }
        if let Some(end) = end_date {
            query_params.push(format!("endDate={}", end));
        }
        if let Some(user_id) = user_id {
            query_params.push(format!("userId={}", user_id));
        }
        if !query_params.is_empty() {
            url.push('?');
            url.push_str(&query_params.join("&"));
        }

        let response = self
            .client
            .get(&url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| format!("Request failed: {}", e))?;

        let status = response.status();
        Self::handle_unauthorized_status(status);
        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| format!("Failed to parse response: {}", e))
        } else {
            Err(parse_error(response).await)
        }
    }
}

async fn parse_error(response: reqwest::Response) -> String {
    response
        .json::<ApiError>()
        .await
        .map(|e| e.message)
        .unwrap_or_else(|_| "Request failed".to_string())
}

pub fn cached_token() -> Option<String> {
    storage_utils::local_storage()
        .ok()
        .and_then(|storage| storage.get_item(TOKEN_KEY).ok().flatten())
}

fn persist_session(response: &LoginResponse) -> Result<(), String> {
    let storage = storage_utils::local_storage()?;
    storage
        .set_item(TOKEN_KEY, &response.token)
        .map_err(|_| "Failed to store token")?;
    let user_json =
        serde_json::to_string(&response.user).map_err(|_| "Failed to serialize user profile")?;
    storage
        .set_item(CURRENT_USER_KEY, &user_json)
        .map_err(|_| "Failed to store user profile")?;
    Ok(())
}
