//! The per-login tracking controller: owns the shared tracking state, both
//! watchdogs, and the page-view recorder, and is the single place allowed
//! to run termination side effects.

use leptos::*;
use leptos_router::use_location;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::api::{
    client::{cached_token, ApiClient},
    SessionEndReason, StartPageViewPayload,
};
use crate::state::auth::use_auth;
use crate::tracking::{
    page_title_for, reporter,
    state::{OpenPageView, SessionTrackingState, TrackingPhase},
    token,
    watchdog::Watchdog,
    HIDDEN_TIMEOUT_SECONDS, INACTIVITY_TIMEOUT_SECONDS,
};

pub type TrackingContext = Rc<TrackingController>;

pub struct TrackingController {
    api: ApiClient,
    state: RefCell<SessionTrackingState>,
    inactivity: Watchdog,
    visibility: Watchdog,
    weak_self: RefCell<Weak<TrackingController>>,
}

fn now_ms() -> f64 {
    js_sys::Date::now()
}

impl TrackingController {
    pub fn new(api: ApiClient) -> Rc<Self> {
        let controller = Rc::new(Self {
            api,
            state: RefCell::new(SessionTrackingState::new(now_ms())),
            inactivity: Watchdog::new(),
            visibility: Watchdog::new(),
            weak_self: RefCell::new(Weak::new()),
        });
        *controller.weak_self.borrow_mut() = Rc::downgrade(&controller);
        controller
    }

    /// A terminated controller can serve the next login in the same page
    /// lifetime: the first authenticated navigation starts a fresh tracking
    /// session. While a termination is still delivering, nothing restarts.
    fn ensure_session(&self) -> bool {
        let phase = self.state.borrow().phase;
        match phase {
            TrackingPhase::Active => true,
            TrackingPhase::Terminating => false,
            TrackingPhase::Terminated => {
                *self.state.borrow_mut() = SessionTrackingState::new(now_ms());
                true
            }
        }
    }

    /// Page-view recorder, navigation step: close the previous view, reuse
    /// or mint the session token, open the next view. Arriving on a page is
    /// also a qualifying activity, so the inactivity deadline re-arms.
    pub fn handle_route_change(self: &Rc<Self>, path: String) {
        if !self.ensure_session() {
            return;
        }
        self.record_activity();

        let this = Rc::clone(self);
        spawn_local(async move {
            let previous = this.state.borrow_mut().take_open_view();
            if let Some(view) = previous {
                let payload = reporter::build_end_page_view_payload(&view, now_ms());
                reporter::deliver_page_view_end(&this.api, payload).await;
            }

            let Some(session_token) = token::mint_or_restore() else {
                return;
            };
            this.state.borrow_mut().session_token = Some(session_token.clone());

            let referrer = web_sys::window()
                .and_then(|w| w.document())
                .map(|d| d.referrer())
                .unwrap_or_default();
            let payload = StartPageViewPayload {
                session_token,
                page_path: path.clone(),
                page_title: page_title_for(&path),
                referrer,
            };
            match this.api.start_page_view(&payload).await {
                Ok(response) => {
                    this.state.borrow_mut().open_view(OpenPageView {
                        page_view_id: response.page_view_id,
                        session_id: response.session_id,
                        page_path: path,
                        entry_time_ms: now_ms(),
                        max_scroll_depth: 0,
                        interactions: 0,
                    });
                }
                Err(err) => log::warn!("failed to start page tracking: {}", err),
            }
        });
    }

    /// A qualifying input event: stamp the activity time and push the
    /// inactivity deadline out again.
    pub fn record_activity(self: &Rc<Self>) {
        {
            let mut state = self.state.borrow_mut();
            if !state.is_active() {
                return;
            }
            state.record_activity(now_ms());
        }

        let weak = self.weak_self.borrow().clone();
        self.inactivity.arm(INACTIVITY_TIMEOUT_SECONDS * 1000, move || {
            if let Some(controller) = weak.upgrade() {
                controller.terminate(SessionEndReason::Timeout);
            }
        });
    }

    pub fn note_interaction(&self) {
        self.state.borrow_mut().note_interaction();
    }

    pub fn note_scroll_depth(&self, percent: i32) {
        self.state.borrow_mut().note_scroll_depth(percent);
    }

    /// Tab went hidden: snapshot for the refresh-vs-close heuristic, close
    /// the open view, and arm the hidden-tab deadline.
    pub fn handle_hidden(self: &Rc<Self>) {
        {
            let mut state = self.state.borrow_mut();
            if !state.is_active() {
                return;
            }
            state.mark_hidden(now_ms());
        }

        token::backup_for_reload();

        let this = Rc::clone(self);
        spawn_local(async move {
            let view = this.state.borrow_mut().take_open_view();
            if let Some(view) = view {
                let payload = reporter::build_end_page_view_payload(&view, now_ms());
                reporter::deliver_page_view_end(&this.api, payload).await;
            }
        });

        let weak = self.weak_self.borrow().clone();
        self.visibility.arm(HIDDEN_TIMEOUT_SECONDS * 1000, move || {
            if let Some(controller) = weak.upgrade() {
                controller.terminate(SessionEndReason::BrowserClose);
            }
        });
    }

    /// Tab visible again before the deadline: stand down, no side effects.
    pub fn handle_visible(&self) {
        self.state.borrow_mut().mark_visible();
        self.visibility.cancel();
    }

    /// Page teardown: there is no time for a request/response round trip,
    /// so the open view is flushed by beacon only. The session itself is
    /// not ended here; a refresh reuses the token on the next load and a
    /// real close is picked up by the hidden-tab deadline.
    pub fn handle_unload(&self) {
        token::backup_for_reload();

        let view = self.state.borrow_mut().take_open_view();
        if let Some(view) = view {
            let payload = reporter::build_end_page_view_payload(&view, now_ms());
            reporter::send_page_view_end_beacon(&payload);
        }
    }

    /// Termination entry point for all paths: manual logout, inactivity
    /// timeout, hidden-tab timeout. Effectively-once: only the caller that
    /// wins the `Active -> Terminating` transition delivers anything.
    pub fn terminate(self: &Rc<Self>, reason: SessionEndReason) {
        if !self.state.borrow_mut().begin_termination() {
            return;
        }
        self.inactivity.cancel();
        self.visibility.cancel();

        let this = Rc::clone(self);
        spawn_local(async move {
            let view = this.state.borrow_mut().take_open_view();
            if let Some(view) = view {
                let payload = reporter::build_end_page_view_payload(&view, now_ms());
                reporter::deliver_page_view_end(&this.api, payload).await;
            }

            let (duration, session_token) = {
                let state = this.state.borrow();
                (state.session_duration_seconds(), state.session_token.clone())
            };
            let payload = reporter::build_session_end_payload(
                reason,
                duration,
                cached_token(),
                session_token,
            );
            reporter::deliver_session_end(&this.api, payload).await;

            ApiClient::clear_auth_session();
            token::clear();
            this.state.borrow_mut().finish_termination();

            // Auto-logouts land the user back on the login page; a manual
            // logout's own UI handles navigation.
            if reason != SessionEndReason::Logout {
                if let Some(window) = web_sys::window() {
                    let _ = window.location().set_href("/login");
                }
            }
        });
    }
}

/// Mounts the tracking subsystem for everything beneath it. Watchdogs and
/// recorders only engage while a user is authenticated.
#[component]
pub fn TrackingProvider(children: Children) -> impl IntoView {
    let api = use_context::<ApiClient>().unwrap_or_default();
    let controller: TrackingContext = TrackingController::new(api);
    provide_context::<TrackingContext>(Rc::clone(&controller));

    let (auth, _) = use_auth();
    let location = use_location();

    let route_controller = Rc::clone(&controller);
    create_effect(move |_| {
        let state = auth.get();
        let path = location.pathname.get();
        if state.is_authenticated {
            route_controller.handle_route_change(path);
        }
    });

    attach_browser_listeners(&controller);

    view! { <>{children()}</> }
}

pub fn use_tracking() -> Option<TrackingContext> {
    use_context::<TrackingContext>()
}

#[cfg(target_arch = "wasm32")]
fn attach_browser_listeners(controller: &TrackingContext) {
    use leptos::ev;

    use crate::utils::browser::{current_user_agent, get_browser_info};

    // Local classification, for diagnostics only; the values the server
    // persists are re-derived from the request header.
    let fingerprint = get_browser_info(&current_user_agent());
    log::debug!(
        "client fingerprint: {} / {} / {}",
        fingerprint.browser_name,
        fingerprint.device_type,
        fingerprint.operating_system
    );

    fn document_visible() -> bool {
        web_sys::window()
            .and_then(|w| w.document())
            .map(|d| d.visibility_state() == web_sys::VisibilityState::Visible)
            .unwrap_or(true)
    }

    fn current_scroll_percent() -> Option<i32> {
        let window = web_sys::window()?;
        let document = window.document()?;
        let root = document.document_element()?;
        let scroll_top = window.scroll_y().ok()?;
        let viewport = window.inner_height().ok()?.as_f64()?;
        Some(crate::tracking::state::scroll_percent(
            scroll_top,
            root.scroll_height() as f64,
            viewport,
        ))
    }

    // Inactivity watchdog inputs: pointer-down/move, key presses, scrolls,
    // touches and clicks, counted only while the tab is foreground.
    let activity = Rc::clone(controller);
    let mousedown = window_event_listener(ev::mousedown, {
        let activity = Rc::clone(&activity);
        move |_| {
            if document_visible() {
                activity.record_activity();
            }
        }
    });
    let mousemove = window_event_listener(ev::mousemove, {
        let activity = Rc::clone(&activity);
        move |_| {
            if document_visible() {
                activity.record_activity();
            }
        }
    });
    let keydown = window_event_listener(ev::keydown, {
        let activity = Rc::clone(&activity);
        move |_| {
            if document_visible() {
                activity.record_activity();
                activity.note_interaction();
            }
        }
    });
    let touchstart = window_event_listener(ev::touchstart, {
        let activity = Rc::clone(&activity);
        move |_| {
            if document_visible() {
                activity.record_activity();
            }
        }
    });
    let click = window_event_listener(ev::click, {
        let activity = Rc::clone(&activity);
        move |_| {
            if document_visible() {
                activity.record_activity();
                activity.note_interaction();
            }
        }
    });
    let submit = window_event_listener(ev::submit, {
        let activity = Rc::clone(&activity);
        move |_| {
            if document_visible() {
                activity.note_interaction();
            }
        }
    });

    // Page-view recorder input: max scroll depth, monotonic per view.
    let scroll = window_event_listener(ev::scroll, {
        let activity = Rc::clone(&activity);
        move |_| {
            if document_visible() {
                activity.record_activity();
            }
            if let Some(percent) = current_scroll_percent() {
                activity.note_scroll_depth(percent);
            }
        }
    });

    // Visibility watchdog input. The event fires on document and bubbles
    // to window.
    let visibility = window_event_listener(ev::Custom::<web_sys::Event>::new("visibilitychange"), {
        let controller = Rc::clone(controller);
        move |_| {
            if document_visible() {
                controller.handle_visible();
            } else {
                controller.handle_hidden();
            }
        }
    });

    // Unload: flush the open view over the beacon transport.
    let unload = window_event_listener(ev::beforeunload, {
        let controller = Rc::clone(controller);
        move |_| controller.handle_unload()
    });

    // Listeners live for the whole app; keep their handles from dropping.
    store_value((
        mousedown, mousemove, keydown, touchstart, click, submit, scroll, visibility, unload,
    ));
}

#[cfg(not(target_arch = "wasm32"))]
fn attach_browser_listeners(_controller: &TrackingContext) {
    // No browser event sources outside the WASM build (SSR test renders).
}
