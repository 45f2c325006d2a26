use leptos::*;

use crate::api::ApiClient;
use crate::components::layout::Header;

#[component]
pub fn DashboardPage() -> impl IntoView {
    let api = use_context::<ApiClient>().unwrap_or_default();

    let kpis = create_local_resource(
        || (),
        {
            let api = api.clone();
            move |_| {
                let api = api.clone();
                async move { api.get_dashboard_kpis().await.ok() }
            }
        },
    );

    let activities = create_local_resource(
        || (),
        move |_| {
            let api = api.clone();
            async move { api.get_recent_activities().await.unwrap_or_default() }
        },
    );

    view! {
        <div class="min-h-screen bg-gray-50">
            <Header />
            <main class="p-6">
                <h2 class="text-lg font-semibold text-gray-900 mb-4">"Overview"</h2>
                <div class="grid grid-cols-2 lg:grid-cols-4 gap-4 mb-8">
                    {move || {
                        let kpis = kpis.get().flatten();
                        let card = |label: &str, value: Option<i64>| {
                            let value = value.map(|v| v.to_string()).unwrap_or_else(|| "-".into());
                            view! {
                                <div class="bg-white rounded-lg shadow p-4">
                                    <p class="text-xs text-gray-500">{label.to_string()}</p>
                                    <p class="text-2xl font-bold text-gray-900">{value}</p>
                                </div>
                            }
                        };
                        view! {
                            <>
                                {card("Total Leads", kpis.as_ref().map(|k| k.total_leads))}
                                {card("Active Customers", kpis.as_ref().map(|k| k.active_customers))}
                                {card("Pending RFQs", kpis.as_ref().map(|k| k.pending_rfqs))}
                                {card("Open Tickets", kpis.as_ref().map(|k| k.open_tickets))}
                            </>
                        }
                    }}
                </div>

                <h2 class="text-lg font-semibold text-gray-900 mb-4">"Recent activity"</h2>
                <div class="bg-white rounded-lg shadow divide-y">
                    {move || {
                        activities
                            .get()
                            .unwrap_or_default()
                            .into_iter()
                            .map(|activity| {
                                let who = activity.user_name.unwrap_or_else(|| "System".into());
                                view! {
                                    <div class="px-4 py-3 text-sm text-gray-700">
                                        {format!(
                                            "{} {} {} #{}",
                                            who, activity.action, activity.entity_type,
                                            activity.entity_id
                                        )}
                                    </div>
                                }
                            })
                            .collect_view()
                    }}
                </div>
            </main>
        </div>
    }
}
