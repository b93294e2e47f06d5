//! Per-item zoom/pan state machine.
//!
//! Consumes the scroll samples of one item's zoomable scroll view and decides
//! two things: whether the item is zoomed (which locks page swiping), and
//! whether a vertical flick should dismiss the viewer. Dismissal is velocity
//! based: a partial swipe at high speed closes, a slow drag never does.

use std::time::Duration;

use tracing::{debug, trace};

use super::double_tap::ToggleZoomIntent;

/// Vertical settle velocity (viewport heights per second) above which an
/// unzoomed item requests close.
pub const SWIPE_CLOSE_VELOCITY: f64 = 1.55;
/// Vertical drag distance at which dismiss feedback reaches full strength.
pub const SWIPE_CLOSE_OFFSET: f64 = 75.0;
/// Opacity of the item at full dismiss feedback.
const DISMISS_MIN_OPACITY: f64 = 0.5;

/// One observation from the host's native scroll/zoom view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSample {
    pub vertical_offset: f64,
    pub velocity_y: f64,
    pub zoom_scale: f64,
    pub timestamp: Duration,
}

impl GestureSample {
    pub fn new(vertical_offset: f64, velocity_y: f64, zoom_scale: f64, timestamp: Duration) -> Self {
        Self {
            vertical_offset,
            velocity_y,
            zoom_scale,
            timestamp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomState {
    pub is_zoomed: bool,
    /// Always >= 1.
    pub zoom_scale: f64,
}

impl ZoomState {
    pub const UNZOOMED: ZoomState = ZoomState {
        is_zoomed: false,
        zoom_scale: 1.0,
    };
}

impl Default for ZoomState {
    fn default() -> Self {
        Self::UNZOOMED
    }
}

/// What the shell has to act on after a sample or tap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ZoomEvent {
    /// Zoom flipped. `target_scale` is set when the host has to drive the
    /// native zoom itself (double-tap); pinches already moved it.
    ZoomChanged {
        zoomed: bool,
        target_scale: Option<f64>,
    },
    /// Flick-to-dismiss fired for this gesture.
    RequestClose,
}

#[derive(Debug, Clone)]
pub struct ZoomController {
    state: ZoomState,
    max_zoom: f64,
    swipe_to_close: bool,
    close_velocity: f64,
    vertical_offset: f64,
    // A gesture runs from its first scroll sample to its settle.
    settled: bool,
    zoom_changed_in_gesture: bool,
}

impl ZoomController {
    pub fn new(max_zoom: f64, swipe_to_close: bool) -> Self {
        Self {
            state: ZoomState::UNZOOMED,
            max_zoom: max_zoom.max(1.0),
            swipe_to_close,
            close_velocity: SWIPE_CLOSE_VELOCITY,
            vertical_offset: 0.0,
            settled: false,
            zoom_changed_in_gesture: false,
        }
    }

    pub fn with_close_velocity(mut self, velocity: f64) -> Self {
        self.close_velocity = velocity.abs();
        self
    }

    pub fn state(&self) -> ZoomState {
        self.state
    }

    pub fn is_zoomed(&self) -> bool {
        self.state.is_zoomed
    }

    pub fn max_zoom(&self) -> f64 {
        self.max_zoom
    }

    /// Paging and zooming are mutually exclusive within one item.
    pub fn page_swipe_enabled(&self) -> bool {
        !self.state.is_zoomed
    }

    /// Update the zoom ceiling after the fit transform changed.
    ///
    /// A ceiling of 1 leaves nothing to zoom into, so a zoomed item drops back
    /// to unzoomed and the change is reported.
    pub fn set_max_zoom(&mut self, max_zoom: f64) -> Option<ZoomEvent> {
        self.max_zoom = max_zoom.max(1.0);
        if self.state.zoom_scale > self.max_zoom {
            self.state.zoom_scale = self.max_zoom;
        }
        if self.state.is_zoomed && self.state.zoom_scale <= 1.0 {
            self.state = ZoomState::UNZOOMED;
            self.vertical_offset = 0.0;
            debug!("zoom ceiling collapsed, unzooming");
            return Some(ZoomEvent::ZoomChanged {
                zoomed: false,
                target_scale: Some(1.0),
            });
        }
        None
    }

    /// Live sample while the finger is down or momentum is running.
    pub fn on_scroll(&mut self, sample: GestureSample) -> Option<ZoomEvent> {
        if self.settled {
            self.settled = false;
            self.zoom_changed_in_gesture = false;
        }

        let event = self.apply_zoom_scale(sample.zoom_scale);
        if self.state.is_zoomed {
            self.vertical_offset = 0.0;
        } else {
            self.vertical_offset = sample.vertical_offset;
        }
        event
    }

    /// End-of-drag sample. Decides zoom state and flick-to-dismiss.
    pub fn on_settle(&mut self, sample: GestureSample) -> Option<ZoomEvent> {
        let duplicate = self.settled;
        self.settled = true;
        self.vertical_offset = 0.0;

        if let Some(event) = self.apply_zoom_scale(sample.zoom_scale) {
            return Some(event);
        }
        if duplicate || self.zoom_changed_in_gesture {
            return None;
        }

        let flick = sample.velocity_y.abs() > self.close_velocity;
        if flick && self.swipe_to_close && !self.state.is_zoomed && sample.zoom_scale <= 1.0 {
            debug!(velocity_y = sample.velocity_y, "flick to dismiss");
            return Some(ZoomEvent::RequestClose);
        }
        None
    }

    /// Apply a double-tap. Zooms to `max_zoom` or back to 1.
    pub fn toggle(&mut self, intent: ToggleZoomIntent) -> Option<ZoomEvent> {
        if self.state.is_zoomed {
            self.state = ZoomState::UNZOOMED;
            trace!(at = ?intent.at, "double tap zoom out");
            return Some(ZoomEvent::ZoomChanged {
                zoomed: false,
                target_scale: Some(1.0),
            });
        }

        // Nothing to zoom into when the fit is already at native size.
        if self.max_zoom <= 1.0 {
            return None;
        }
        self.state = ZoomState {
            is_zoomed: true,
            zoom_scale: self.max_zoom,
        };
        self.vertical_offset = 0.0;
        trace!(at = ?intent.at, scale = self.max_zoom, "double tap zoom in");
        Some(ZoomEvent::ZoomChanged {
            zoomed: true,
            target_scale: Some(self.max_zoom),
        })
    }

    /// Back to unzoomed with no gesture in progress. Returns whether it was zoomed.
    pub fn reset(&mut self) -> bool {
        let was_zoomed = self.state.is_zoomed;
        self.state = ZoomState::UNZOOMED;
        self.vertical_offset = 0.0;
        self.settled = false;
        self.zoom_changed_in_gesture = false;
        was_zoomed
    }

    /// Item opacity while dragging vertically, fading toward dismissal.
    pub fn dismiss_opacity(&self) -> f64 {
        if self.state.is_zoomed || !self.swipe_to_close {
            return 1.0;
        }
        let progress = (self.vertical_offset.abs() / SWIPE_CLOSE_OFFSET).min(1.0);
        1.0 - (1.0 - DISMISS_MIN_OPACITY) * progress
    }

    fn apply_zoom_scale(&mut self, zoom_scale: f64) -> Option<ZoomEvent> {
        if !zoom_scale.is_finite() {
            return None;
        }
        let scale = zoom_scale.clamp(1.0, self.max_zoom);
        let zoomed = scale > 1.0;
        self.state.zoom_scale = scale;

        if zoomed == self.state.is_zoomed {
            return None;
        }
        self.state.is_zoomed = zoomed;
        self.zoom_changed_in_gesture = true;
        debug!(zoomed, scale, "pinch zoom changed");
        Some(ZoomEvent::ZoomChanged {
            zoomed,
            target_scale: None,
        })
    }
}
