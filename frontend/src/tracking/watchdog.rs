//! A deadline timer that fires a side effect unless reset or cancelled.

use gloo_timers::callback::Timeout;
use std::cell::RefCell;

#[derive(Default)]
pub struct Watchdog {
    timer: RefCell<Option<Timeout>>,
}

impl Watchdog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms (or re-arms) the deadline. Replacing the previous timer drops
    /// it, which cancels the pending callback.
    pub fn arm<F>(&self, delay_ms: u32, on_fire: F)
    where
        F: FnOnce() + 'static,
    {
        let timeout = Timeout::new(delay_ms, on_fire);
        *self.timer.borrow_mut() = Some(timeout);
    }

    pub fn cancel(&self) {
        self.timer.borrow_mut().take();
    }

    pub fn is_armed(&self) -> bool {
        self.timer.borrow().is_some()
    }
}
