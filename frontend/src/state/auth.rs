use leptos::*;

use crate::api::{
    client::{cached_token, ApiClient},
    SessionEndReason, UserResponse,
};
use crate::tracking::{self, TrackingContext};

type AuthContext = (ReadSignal<AuthState>, WriteSignal<AuthState>);

#[derive(Debug, Clone, Default)]
pub struct AuthState {
    pub user: Option<UserResponse>,
    pub is_authenticated: bool,
    pub loading: bool,
}

impl AuthState {
    pub fn has_role(&self, roles: &[&str]) -> bool {
        self.user
            .as_ref()
            .map(|user| roles.contains(&user.role.as_str()))
            .unwrap_or(false)
    }
}

fn create_auth_context() -> AuthContext {
    // A hide-time snapshot may be waiting after a reload; restore it before
    // deciding whether a credential exists.
    tracking::token::restore_from_backup();

    let (auth_state, set_auth_state) = create_signal(AuthState::default());

    if cached_token().is_none() {
        return (auth_state, set_auth_state);
    }

    set_auth_state.update(|state| state.loading = true);
    let api_client = use_context::<ApiClient>().unwrap_or_default();
    let set_auth_for_check = set_auth_state;
    spawn_local(async move {
        match api_client.get_me().await {
            Ok(user) => set_auth_for_check.update(|state| {
                state.user = Some(user);
                state.is_authenticated = true;
                state.loading = false;
            }),
            Err(_) => set_auth_for_check.update(|state| {
                state.user = None;
                state.is_authenticated = false;
                state.loading = false;
            }),
        }
    });

    (auth_state, set_auth_state)
}

#[component]
pub fn AuthProvider(children: Children) -> impl IntoView {
    let ctx = create_auth_context();
    provide_context::<AuthContext>(ctx);
    view! { <>{children()}</> }
}

pub fn use_auth() -> AuthContext {
    use_context::<AuthContext>().unwrap_or_else(|| create_signal(AuthState::default()))
}

pub async fn request_otp(email: String, api: &ApiClient) -> Result<(), String> {
    api.request_otp(&email).await
}

pub async fn login(
    email: String,
    otp: String,
    api: &ApiClient,
    set_auth_state: WriteSignal<AuthState>,
) -> Result<(), String> {
    set_auth_state.update(|state| state.loading = true);

    match api.verify_otp(&email, &otp).await {
        Ok(response) => {
            set_auth_state.update(|state| {
                state.user = Some(response.user);
                state.is_authenticated = true;
                state.loading = false;
            });
            Ok(())
        }
        Err(error) => {
            set_auth_state.update(|state| state.loading = false);
            Err(error)
        }
    }
}

/// Manual logout. The tracking controller (when mounted) owns the
/// termination side effects: session-end delivery, watchdog teardown and
/// local-state clearing. The server call is fire-and-forget, matching the
/// "never block the user's logout" policy.
pub fn logout(
    api: ApiClient,
    tracking: Option<TrackingContext>,
    set_auth_state: WriteSignal<AuthState>,
) {
    if let Some(controller) = tracking {
        controller.terminate(SessionEndReason::Logout);
    } else {
        ApiClient::clear_auth_session();
    }

    spawn_local(async move {
        let _ = api.logout().await;
    });

    set_auth_state.update(|state| {
        state.user = None;
        state.is_authenticated = false;
        state.loading = false;
    });
}

pub fn use_request_otp_action() -> Action<String, Result<(), String>> {
    let api = use_context::<ApiClient>().unwrap_or_default();
    create_action(move |email: &String| {
        let email = email.clone();
        let api = api.clone();
        async move { request_otp(email, &api).await }
    })
}

pub fn use_login_action() -> Action<(String, String), Result<(), String>> {
    let (_auth, set_auth) = use_auth();
    let api = use_context::<ApiClient>().unwrap_or_default();
    create_action(move |(email, otp): &(String, String)| {
        let email = email.clone();
        let otp = otp.clone();
        let api = api.clone();
        async move { login(email, otp, &api, set_auth).await }
    })
}

pub fn use_logout_action() -> Action<(), Result<(), String>> {
    let (_auth, set_auth) = use_auth();
    let api = use_context::<ApiClient>().unwrap_or_default();
    let tracking = tracking::use_tracking();
    create_action(move |_: &()| {
        let api = api.clone();
        let tracking = tracking.clone();
        async move {
            logout(api, tracking, set_auth);
            Ok(())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_role_checks_current_user() {
        let state = AuthState {
            user: Some(UserResponse {
                id: 1,
                email: "admin@example.com".into(),
                name: "Admin".into(),
                role: "admin".into(),
            }),
            is_authenticated: true,
            loading: false,
        };
        assert!(state.has_role(&["admin"]));
        assert!(state.has_role(&["admin", "sales"]));
        assert!(!state.has_role(&["sales"]));

        let anonymous = AuthState::default();
        assert!(!anonymous.has_role(&["admin"]));
    }
}
