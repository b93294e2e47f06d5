//! Close-request debouncing.
//!
//! A swipe-dismiss and the close button can both fire within a few frames.
//! The first request starts a fade-out; every later one is swallowed, and the
//! host close callback is reported exactly once.

use std::time::Duration;

use tracing::debug;

/// Overlay fade-out length before the host close callback runs.
pub const CLOSE_FADE_DURATION: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CloseMode {
    /// Fade the overlay, then fire the callback.
    #[default]
    AfterFade,
    /// Fire at once; the host's own modal dismissal animates.
    Immediate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseState {
    Idle,
    Closing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseRequest {
    /// Fade started; the callback fires from a later `tick`.
    Started,
    /// Callback must fire now.
    Fire,
    /// Already closing.
    Ignored,
}

#[derive(Debug, Clone)]
pub struct CloseDebouncer {
    mode: CloseMode,
    fade: Duration,
    state: CloseState,
    started_at: Duration,
    fired: bool,
}

impl Default for CloseDebouncer {
    fn default() -> Self {
        Self::new(CloseMode::default(), CLOSE_FADE_DURATION)
    }
}

impl CloseDebouncer {
    pub fn new(mode: CloseMode, fade: Duration) -> Self {
        Self {
            mode,
            fade,
            state: CloseState::Idle,
            started_at: Duration::ZERO,
            fired: false,
        }
    }

    pub fn state(&self) -> CloseState {
        self.state
    }

    pub fn is_closing(&self) -> bool {
        self.state == CloseState::Closing
    }

    /// Whether the host callback has been reported.
    pub fn has_fired(&self) -> bool {
        self.fired
    }

    pub fn request_close(&mut self, now: Duration) -> CloseRequest {
        if self.state == CloseState::Closing {
            debug!("duplicate close request ignored");
            return CloseRequest::Ignored;
        }
        self.state = CloseState::Closing;
        self.started_at = now;

        if self.mode == CloseMode::Immediate || self.fade.is_zero() {
            self.fired = true;
            return CloseRequest::Fire;
        }
        CloseRequest::Started
    }

    /// Advance the fade. Returns `true` exactly once, when the callback must fire.
    pub fn tick(&mut self, now: Duration) -> bool {
        if self.state != CloseState::Closing || self.fired {
            return false;
        }
        if now.saturating_sub(self.started_at) < self.fade {
            return false;
        }
        self.fired = true;
        true
    }

    /// Overlay opacity: 1 while idle, linear 1 -> 0 over the fade.
    pub fn opacity(&self, now: Duration) -> f64 {
        match self.state {
            CloseState::Idle => 1.0,
            CloseState::Closing if self.mode == CloseMode::Immediate => 1.0,
            CloseState::Closing => {
                if self.fade.is_zero() {
                    return 0.0;
                }
                let elapsed = now.saturating_sub(self.started_at).as_secs_f64();
                (1.0 - elapsed / self.fade.as_secs_f64()).clamp(0.0, 1.0)
            }
        }
    }
}
