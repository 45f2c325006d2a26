use leptos::*;

use crate::state::auth::use_auth;

/// Landing route: forwards to the dashboard or the login form.
#[component]
pub fn HomePage() -> impl IntoView {
    let (auth, _) = use_auth();

    create_effect(move |_| {
        let state = auth.get();
        if state.loading {
            return;
        }
        let target = if state.is_authenticated {
            "/dashboard"
        } else {
            "/login"
        };
        if let Some(win) = web_sys::window() {
            let _ = win.location().set_href(target);
        }
    });

    view! { <crate::components::layout::LoadingSpinner /> }
}
