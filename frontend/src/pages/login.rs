use leptos::*;
use leptos_router::use_navigate;

use crate::state::auth::{use_login_action, use_request_otp_action};

/// Two-step OTP login: request a code for an email, then verify it.
#[component]
pub fn LoginPage() -> impl IntoView {
    let (email, set_email) = create_signal(String::new());
    let (otp, set_otp) = create_signal(String::new());
    let (code_requested, set_code_requested) = create_signal(false);
    let (error, set_error) = create_signal(Option::<String>::None);

    let request_otp = use_request_otp_action();
    let login = use_login_action();

    create_effect(move |_| {
        if let Some(result) = request_otp.value().get() {
            match result {
                Ok(()) => {
                    set_error.set(None);
                    set_code_requested.set(true);
                }
                Err(message) => set_error.set(Some(message)),
            }
        }
    });

    create_effect(move |_| {
        if let Some(result) = login.value().get() {
            match result {
                Ok(()) => {
                    set_error.set(None);
                    let navigate = use_navigate();
                    navigate("/dashboard", Default::default());
                }
                Err(message) => set_error.set(Some(message)),
            }
        }
    });

    let pending = move || request_otp.pending().get() || login.pending().get();

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if code_requested.get() {
            login.dispatch((email.get(), otp.get()));
        } else {
            request_otp.dispatch(email.get());
        }
    };

    view! {
        <div class="min-h-screen flex items-center justify-center bg-gray-50">
            <div class="w-full max-w-md bg-white rounded-lg shadow p-8">
                <h1 class="text-2xl font-bold text-gray-900 mb-1">"BondCRM"</h1>
                <p class="text-sm text-gray-500 mb-6">"Sign in with a one-time passcode"</p>

                <form on:submit=on_submit>
                    <label class="block text-sm font-medium text-gray-700 mb-1">"Email"</label>
                    <input
                        type="email"
                        class="w-full border rounded px-3 py-2 mb-4"
                        prop:value=email
                        prop:disabled=code_requested
                        on:input=move |ev| set_email.set(event_target_value(&ev))
                    />

                    <Show when=move || code_requested.get() fallback=|| ()>
                        <label class="block text-sm font-medium text-gray-700 mb-1">
                            "Verification code"
                        </label>
                        <input
                            type="text"
                            inputmode="numeric"
                            maxlength="6"
                            class="w-full border rounded px-3 py-2 mb-4 tracking-widest"
                            prop:value=otp
                            on:input=move |ev| set_otp.set(event_target_value(&ev))
                        />
                    </Show>

                    <Show when=move || error.get().is_some() fallback=|| ()>
                        <p class="text-sm text-red-600 mb-4">
                            {move || error.get().unwrap_or_default()}
                        </p>
                    </Show>

                    <button
                        type="submit"
                        class="w-full bg-blue-700 text-white rounded py-2 disabled:opacity-50"
                        prop:disabled=pending
                    >
                        {move || if code_requested.get() { "Verify and sign in" } else { "Send code" }}
                    </button>
                </form>

                <Show when=move || code_requested.get() fallback=|| ()>
                    <button
                        class="w-full text-sm text-gray-500 mt-3"
                        on:click=move |_| {
                            set_code_requested.set(false);
                            set_otp.set(String::new());
                        }
                    >
                        "Use a different email"
                    </button>
                </Show>
            </div>
        </div>
    }
}
