use leptos::*;

use crate::state::auth::{use_auth, use_logout_action};

#[component]
pub fn LoadingSpinner() -> impl IntoView {
    view! {
        <div class="flex items-center justify-center min-h-screen">
            <div class="animate-spin rounded-full h-10 w-10 border-b-2 border-blue-700"></div>
        </div>
    }
}

#[component]
pub fn Header() -> impl IntoView {
    let (auth, _) = use_auth();
    let logout = use_logout_action();

    let user_label = move || {
        auth.get()
            .user
            .map(|user| format!("{} ({})", user.name, user.role))
            .unwrap_or_default()
    };

    view! {
        <header class="bg-white border-b border-gray-200 px-6 py-4 flex items-center justify-between">
            <div>
                <h1 class="text-xl font-bold text-gray-900">"BondCRM"</h1>
                <p class="text-xs text-gray-500">"SEBI Registered OBPP"</p>
            </div>
            <div class="flex items-center gap-4">
                <span class="text-sm text-gray-600">{user_label}</span>
                <button
                    class="text-sm text-red-600 hover:text-red-800"
                    on:click=move |_| {
                        logout.dispatch(());
                    }
                >
                    "Log out"
                </button>
            </div>
        </header>
    }
}
