use std::time::Duration;

use tracing::trace;

/// Maximum gap between two taps to treat them as a double-tap.
pub const DOUBLE_TAP_WINDOW: Duration = Duration::from_millis(300);

/// Tap position in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TapPoint {
    pub x: f64,
    pub y: f64,
}

impl TapPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Request to flip the zoom state of the current item.
///
/// Carries no scale: the zoom controller picks `max_zoom` or 1 depending on
/// its own state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToggleZoomIntent {
    pub at: TapPoint,
}

/// Turns pairs of quick taps into a single toggle-zoom intent.
#[derive(Debug, Clone)]
pub struct DoubleTapDetector {
    window: Duration,
    last_tap: Option<(Duration, TapPoint)>,
}

impl Default for DoubleTapDetector {
    fn default() -> Self {
        Self::new(DOUBLE_TAP_WINDOW)
    }
}

impl DoubleTapDetector {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_tap: None,
        }
    }

    /// Feed one tap. Returns an intent when it completes a double-tap.
    pub fn on_tap(&mut self, timestamp: Duration, at: TapPoint) -> Option<ToggleZoomIntent> {
        let is_double = self.last_tap.is_some_and(|(last, _)| {
            timestamp
                .checked_sub(last)
                .is_some_and(|gap| gap < self.window)
        });

        if is_double {
            // Consume the pair so a rapid third tap starts over.
            self.last_tap = None;
            trace!(?timestamp, "double tap");
            return Some(ToggleZoomIntent { at });
        }

        self.last_tap = Some((timestamp, at));
        None
    }

    /// Forget any pending first tap.
    pub fn reset(&mut self) {
        self.last_tap = None;
    }

    pub fn has_pending_tap(&self) -> bool {
        self.last_tap.is_some()
    }
}
