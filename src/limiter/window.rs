//! Window State Module
//!
//! Per-client counter for a single fixed window.

// == Window State ==
/// Request count for one client within the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowState {
    /// Attempts counted in this window, admitted or not
    pub count: u64,
    /// When the window ends (Unix milliseconds)
    pub reset_at: u64,
}

impl WindowState {
    // == Constructor ==
    /// Opens an empty window starting at `now_ms`.
    pub fn open(now_ms: u64, window_ms: u64) -> Self {
        Self {
            count: 0,
            reset_at: now_ms.saturating_add(window_ms),
        }
    }

    /// Whether the window has ended at `now_ms`.
    pub fn is_elapsed(&self, now_ms: u64) -> bool {
        now_ms >= self.reset_at
    }

    // == Record ==
    /// Counts one attempt, first rolling the window forward from `now_ms`
    /// if it has ended. Returns the new count.
    pub fn record(&mut self, now_ms: u64, window_ms: u64) -> u64 {
        if self.is_elapsed(now_ms) {
            *self = Self::open(now_ms, window_ms);
        }
        self.count += 1;
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_open() {
        let window = WindowState::open(1_000, 500);
        assert_eq!(window.count, 0);
        assert_eq!(window.reset_at, 1_500);
    }

    #[test]
    fn test_window_record_increments() {
        let mut window = WindowState::open(0, 1_000);

        assert_eq!(window.record(0, 1_000), 1);
        assert_eq!(window.record(999, 1_000), 2);
        assert_eq!(window.reset_at, 1_000);
    }

    #[test]
    fn test_window_rolls_from_now_not_from_boundary() {
        let mut window = WindowState::open(0, 1_000);
        window.record(0, 1_000);

        // Several windows were skipped; the new one starts at the call
        assert_eq!(window.record(3_700, 1_000), 1);
        assert_eq!(window.reset_at, 4_700);
    }

    #[test]
    fn test_window_boundary_is_inclusive() {
        let window = WindowState::open(0, 1_000);
        assert!(!window.is_elapsed(999));
        assert!(window.is_elapsed(1_000));
    }
}
