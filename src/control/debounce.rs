//! Unanimity debounce over a fixed window of boolean samples.
//!
//! ```text
//!   record(true) ──▶ [ F T T T T T ] ──▶ is_confirmed()       = false
//!   record(true) ──▶ [ T T T T T T ] ──▶ is_confirmed()       = true
//!   record(false)──▶ [ T T T T T F ] ──▶ neither confirmed
//! ```
//!
//! A condition is confirmed only when the window is full and every slot
//! agrees.  Until the first `window` samples have arrived neither
//! [`is_confirmed`](ConditionBuffer::is_confirmed) nor
//! [`is_confirmed_false`](ConditionBuffer::is_confirmed_false) holds.

use heapless::Deque;

/// Largest supported debounce window.
pub const MAX_DEBOUNCE_WINDOW: usize = 16;

/// Default number of agreeing samples required to act.
pub const DEFAULT_DEBOUNCE_WINDOW: usize = 6;

/// Rolling history of one boolean trigger.
#[derive(Debug, Clone)]
pub struct ConditionBuffer {
    samples: Deque<bool, MAX_DEBOUNCE_WINDOW>,
    window: usize,
}

impl ConditionBuffer {
    /// `window` is clamped to `1..=MAX_DEBOUNCE_WINDOW`.
    pub fn new(window: usize) -> Self {
        Self {
            samples: Deque::new(),
            window: window.clamp(1, MAX_DEBOUNCE_WINDOW),
        }
    }

    /// Push the latest evaluation, evicting the oldest once full.
    pub fn record(&mut self, sample: bool) {
        if self.samples.len() == self.window {
            self.samples.pop_front();
        }
        // Cannot fail: len < window <= capacity after the pop above.
        let _ = self.samples.push_back(sample);
    }

    /// Every slot holds `true`.
    pub fn is_confirmed(&self) -> bool {
        self.is_unanimous(true)
    }

    /// Every slot holds `false`.
    pub fn is_confirmed_false(&self) -> bool {
        self.is_unanimous(false)
    }

    /// Number of trailing samples equal to the newest one.
    pub fn streak(&self) -> usize {
        match self.samples.back() {
            Some(&last) => self.samples.iter().rev().take_while(|&&s| s == last).count(),
            None => 0,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    fn is_unanimous(&self, value: bool) -> bool {
        self.samples.len() == self.window && self.samples.iter().all(|&s| s == value)
    }
}

impl Default for ConditionBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_window_is_not_confirmed() {
        let mut buf = ConditionBuffer::new(6);
        for _ in 0..5 {
            buf.record(true);
            assert!(!buf.is_confirmed());
            assert!(!buf.is_confirmed_false());
        }
        buf.record(true);
        assert!(buf.is_confirmed());
    }

    #[test]
    fn single_dissent_breaks_confirmation() {
        let mut buf = ConditionBuffer::new(6);
        for _ in 0..6 {
            buf.record(true);
        }
        buf.record(false);
        assert!(!buf.is_confirmed());
        assert!(!buf.is_confirmed_false());
        assert_eq!(buf.streak(), 1);
    }

    #[test]
    fn length_never_exceeds_window() {
        let mut buf = ConditionBuffer::new(3);
        for i in 0..20 {
            buf.record(i % 2 == 0);
            assert!(buf.len() <= 3);
        }
    }

    #[test]
    fn window_is_clamped() {
        assert_eq!(ConditionBuffer::new(0).window(), 1);
        assert_eq!(ConditionBuffer::new(100).window(), MAX_DEBOUNCE_WINDOW);
    }

    #[test]
    fn false_run_confirms_false() {
        let mut buf = ConditionBuffer::default();
        for _ in 0..DEFAULT_DEBOUNCE_WINDOW {
            buf.record(false);
        }
        assert!(buf.is_confirmed_false());
        assert_eq!(buf.streak(), DEFAULT_DEBOUNCE_WINDOW);
    }
}
