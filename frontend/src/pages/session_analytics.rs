use leptos::*;

use crate::api::{ApiClient, SessionAnalytics, SessionEndReason};
use crate::components::layout::Header;

fn end_reason_label(reason: Option<SessionEndReason>) -> &'static str {
    match reason {
        Some(SessionEndReason::Logout) => "logout",
        Some(SessionEndReason::Timeout) => "timeout",
        Some(SessionEndReason::BrowserClose) => "browser close",
        None => "active",
    }
}

fn format_duration(duration: Option<i64>) -> String {
    match duration {
        Some(seconds) => format!("{}m {}s", seconds / 60, seconds % 60),
        None => "-".into(),
    }
}

/// Admin view over tracked sessions and their page-view journeys.
#[component]
pub fn SessionAnalyticsPage() -> impl IntoView {
    let api = use_context::<ApiClient>().unwrap_or_default();

    let sessions = create_local_resource(
        || (),
        move |_| {
            let api = api.clone();
            async move {
                api.get_session_analytics(None, None, None)
                    .await
                    .unwrap_or_default()
            }
        },
    );

    view! {
        <div class="min-h-screen bg-gray-50">
            <Header />
            <main class="p-6">
                <h2 class="text-lg font-semibold text-gray-900 mb-4">"Session Analytics"</h2>
                <div class="space-y-4">
                    {move || {
                        sessions
                            .get()
                            .unwrap_or_default()
                            .into_iter()
                            .map(session_card)
                            .collect_view()
                    }}
                </div>
            </main>
        </div>
    }
}

fn session_card(session: SessionAnalytics) -> impl IntoView {
    let who = session
        .user_name
        .or(session.user_email)
        .unwrap_or_else(|| format!("user #{}", session.user_id));
    let device = format!(
        "{} / {} / {}",
        session.browser_name.unwrap_or_else(|| "Unknown".into()),
        session.device_type.unwrap_or_else(|| "desktop".into()),
        session.operating_system.unwrap_or_else(|| "Unknown".into()),
    );

    view! {
        <div class="bg-white rounded-lg shadow p-4">
            <div class="flex items-center justify-between mb-2">
                <div>
                    <p class="font-medium text-gray-900">{who}</p>
                    <p class="text-xs text-gray-500">{device}</p>
                </div>
                <div class="text-right">
                    <p class="text-sm text-gray-700">
                        {format!("{} pages, {}", session.total_pages, format_duration(session.duration))}
                    </p>
                    <p class="text-xs text-gray-500">
                        {end_reason_label(session.end_reason)}
                    </p>
                </div>
            </div>
            <div class="divide-y text-sm text-gray-600">
                {session
                    .page_views
                    .into_iter()
                    .map(|view| {
                        view! {
                            <div class="py-1 flex justify-between">
                                <span>
                                    {view.page_title.unwrap_or_else(|| view.page_path.clone())}
                                </span>
                                <span class="text-xs text-gray-400">
                                    {format!(
                                        "{}s, scroll {}%, {} interactions",
                                        view.duration.unwrap_or(0),
                                        view.scroll_depth.unwrap_or(0),
                                        view.interactions
                                    )}
                                </span>
                            </div>
                        }
                    })
                    .collect_view()}
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_reason_labels_cover_the_closed_set() {
        assert_eq!(end_reason_label(Some(SessionEndReason::Logout)), "logout");
        assert_eq!(end_reason_label(Some(SessionEndReason::Timeout)), "timeout");
        assert_eq!(
            end_reason_label(Some(SessionEndReason::BrowserClose)),
            "browser close"
        );
        assert_eq!(end_reason_label(None), "active");
    }

    #[test]
    fn durations_render_minutes_and_seconds() {
        assert_eq!(format_duration(Some(0)), "0m 0s");
        assert_eq!(format_duration(Some(95)), "1m 35s");
        assert_eq!(format_duration(None), "-");
    }
}
