//! The tracking subsystem's state, held by one controller per authenticated
//! session instead of ambient module-level globals.
//!
//! Termination is modelled as `Active -> Terminating -> Terminated`; only
//! the trigger that takes the first transition performs delivery side
//! effects, so racing watchdogs and unload handlers cannot double-send.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingPhase {
    Active,
    Terminating,
    Terminated,
}

#[derive(Debug, Clone)]
/// The page view currently open in this tab, mirrored client-side.
pub struct OpenPageView {
    pub page_view_id: i64,
    pub session_id: i64,
    pub page_path: String,
    pub entry_time_ms: f64,
    pub max_scroll_depth: i32,
    pub interactions: i32,
}

#[derive(Debug)]
pub struct SessionTrackingState {
    pub phase: TrackingPhase,
    pub last_activity_ms: f64,
    pub started_at_ms: f64,
    pub hidden_since_ms: Option<f64>,
    pub session_token: Option<String>,
    pub open_page_view: Option<OpenPageView>,
}

impl SessionTrackingState {
    pub fn new(now_ms: f64) -> Self {
        Self {
            phase: TrackingPhase::Active,
            last_activity_ms: now_ms,
            started_at_ms: now_ms,
            hidden_since_ms: None,
            session_token: None,
            open_page_view: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.phase == TrackingPhase::Active
    }

    /// A qualifying user input event. Feeds both the inactivity deadline and
    /// the duration reported in the termination payload.
    pub fn record_activity(&mut self, now_ms: f64) {
        if self.is_active() {
            self.last_activity_ms = now_ms;
        }
    }

    pub fn mark_hidden(&mut self, now_ms: f64) {
        if self.is_active() {
            self.hidden_since_ms = Some(now_ms);
        }
    }

    pub fn mark_visible(&mut self) {
        self.hidden_since_ms = None;
    }

    /// Takes the `Active -> Terminating` transition. Returns `true` for the
    /// single caller allowed to run the delivery side effects; every later
    /// or concurrent trigger observes `false` and must no-op.
    pub fn begin_termination(&mut self) -> bool {
        if self.phase == TrackingPhase::Active {
            self.phase = TrackingPhase::Terminating;
            true
        } else {
            false
        }
    }

    pub fn finish_termination(&mut self) {
        self.phase = TrackingPhase::Terminated;
    }

    /// Elapsed session time for the audit payload, anchored on the last
    /// qualifying activity rather than wall-clock "now" so an idle tab
    /// reports the span the user was actually present for.
    pub fn session_duration_seconds(&self) -> i64 {
        let elapsed_ms = self.last_activity_ms - self.started_at_ms;
        (elapsed_ms / 1000.0).max(0.0) as i64
    }

    pub fn open_view(&mut self, view: OpenPageView) {
        self.open_page_view = Some(view);
    }

    pub fn take_open_view(&mut self) -> Option<OpenPageView> {
        self.open_page_view.take()
    }

    /// Scroll depth is the max percentage reached; it never decreases
    /// within one page view.
    pub fn note_scroll_depth(&mut self, percent: i32) {
        if let Some(view) = self.open_page_view.as_mut() {
            let clamped = percent.clamp(0, 100);
            if clamped > view.max_scroll_depth {
                view.max_scroll_depth = clamped;
            }
        }
    }

    pub fn note_interaction(&mut self) {
        if let Some(view) = self.open_page_view.as_mut() {
            view.interactions += 1;
        }
    }
}

/// Scroll position as a percentage of scrollable height. Zero when the page
/// does not scroll.
pub fn scroll_percent(scroll_top: f64, scroll_height: f64, viewport_height: f64) -> i32 {
    let scrollable = scroll_height - viewport_height;
    if scrollable <= 0.0 {
        return 0;
    }
    ((scroll_top / scrollable) * 100.0).round().clamp(0.0, 100.0) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> SessionTrackingState {
        SessionTrackingState::new(1_000_000.0)
    }

    #[test]
    fn begin_termination_succeeds_exactly_once() {
        let mut state = state();
        assert!(state.begin_termination());
        // Both watchdogs racing, or unload firing after a watchdog: no-ops.
        assert!(!state.begin_termination());
        state.finish_termination();
        assert!(!state.begin_termination());
        assert_eq!(state.phase, TrackingPhase::Terminated);
    }

    #[test]
    fn activity_updates_stop_after_termination_begins() {
        let mut state = state();
        state.record_activity(1_060_000.0);
        assert_eq!(state.last_activity_ms, 1_060_000.0);

        state.begin_termination();
        state.record_activity(1_120_000.0);
        assert_eq!(state.last_activity_ms, 1_060_000.0);
    }

    #[test]
    fn session_duration_anchors_on_last_activity() {
        let mut state = state();
        state.record_activity(1_000_000.0 + 600_000.0); // 10 minutes in
        assert_eq!(state.session_duration_seconds(), 600);
    }

    #[test]
    fn session_duration_never_negative() {
        let mut state = state();
        state.last_activity_ms = state.started_at_ms - 5_000.0;
        assert_eq!(state.session_duration_seconds(), 0);
    }

    #[test]
    fn hidden_marker_clears_on_visible() {
        let mut state = state();
        state.mark_hidden(1_005_000.0);
        assert_eq!(state.hidden_since_ms, Some(1_005_000.0));
        state.mark_visible();
        assert!(state.hidden_since_ms.is_none());
    }

    #[test]
    fn scroll_depth_is_monotonic_within_a_view() {
        let mut state = state();
        state.open_view(OpenPageView {
            page_view_id: 1,
            session_id: 1,
            page_path: "/dashboard".into(),
            entry_time_ms: 1_000_000.0,
            max_scroll_depth: 0,
            interactions: 0,
        });

        state.note_scroll_depth(40);
        state.note_scroll_depth(25);
        state.note_scroll_depth(180);
        let view = state.take_open_view().expect("open view");
        assert_eq!(view.max_scroll_depth, 100);
    }

    #[test]
    fn interactions_accumulate_on_open_view() {
        let mut state = state();
        state.note_interaction(); // no open view yet: ignored
        state.open_view(OpenPageView {
            page_view_id: 2,
            session_id: 1,
            page_path: "/leads".into(),
            entry_time_ms: 1_000_000.0,
            max_scroll_depth: 0,
            interactions: 0,
        });
        state.note_interaction();
        state.note_interaction();
        assert_eq!(state.open_page_view.as_ref().unwrap().interactions, 2);
    }

    #[test]
    fn scroll_percent_handles_unscrollable_pages() {
        assert_eq!(scroll_percent(0.0, 800.0, 800.0), 0);
        assert_eq!(scroll_percent(100.0, 700.0, 800.0), 0);
    }

    #[test]
    fn scroll_percent_scales_to_full_range() {
        assert_eq!(scroll_percent(0.0, 2000.0, 1000.0), 0);
        assert_eq!(scroll_percent(500.0, 2000.0, 1000.0), 50);
        assert_eq!(scroll_percent(1000.0, 2000.0, 1000.0), 100);
        // Overscroll (rubber-banding) clamps.
        assert_eq!(scroll_percent(1200.0, 2000.0, 1000.0), 100);
    }
}
