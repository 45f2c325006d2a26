pub mod api;
pub mod components;
pub mod config;
pub mod pages;
pub mod state;
pub mod tracking;
pub mod utils;

#[cfg(target_arch = "wasm32")]
pub fn start_app() {
    use leptos::*;
    use leptos_router::*;

    use crate::api::ApiClient;
    use crate::components::guard::{RequireAdmin, RequireAuth};
    use crate::pages::{
        dashboard::DashboardPage, home::HomePage, login::LoginPage,
        session_analytics::SessionAnalyticsPage,
    };
    use crate::state::auth::AuthProvider;
    use crate::tracking::TrackingProvider;

    mount_to_body(|| {
        provide_context(ApiClient::new());
        view! {
            <AuthProvider>
                <Router>
                    <TrackingProvider>
                        <Routes>
                            <Route path="/" view=HomePage/>
                            <Route path="/login" view=LoginPage/>
                            <Route path="/dashboard" view=ProtectedDashboard/>
                            <Route path="/session-analytics" view=ProtectedSessionAnalytics/>
                        </Routes>
                    </TrackingProvider>
                </Router>
            </AuthProvider>
        }
    });

    #[component]
    fn ProtectedDashboard() -> impl IntoView {
        view! { <RequireAuth><DashboardPage/></RequireAuth> }
    }

    #[component]
    fn ProtectedSessionAnalytics() -> impl IntoView {
        view! { <RequireAdmin><SessionAnalyticsPage/></RequireAdmin> }
    }
}
