//! Gesture interpretation for a single lightbox item.
//!
//! - `ZoomController` - pinch/double-tap zoom state and flick-to-dismiss
//! - `DoubleTapDetector` - classifies tap pairs into toggle-zoom intents

pub mod double_tap;
pub mod zoom;

pub use double_tap::*;
pub use zoom::*;
