//! Viewer configuration.
//!
//! Defaults match a phone-style lightbox. Every field can be overridden from
//! the environment (`LIGHTBOX_*`) for the demo binary and for tuning on device.

use std::time::Duration;

use crate::gesture::{DOUBLE_TAP_WINDOW, SWIPE_CLOSE_VELOCITY};
use crate::models::MediaKind;
use crate::viewer::{CloseMode, CLOSE_FADE_DURATION};

const DEFAULT_DELAY_LONG_PRESS_MS: u64 = 800;

fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name).ok().and_then(|v| {
        match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        }
    })
}

fn env_millis(name: &str) -> Option<Duration> {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_millis)
}

fn env_f64(name: &str) -> Option<f64> {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v > 0.0)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    /// Enables flick-to-dismiss on unzoomed items.
    pub swipe_to_close_enabled: bool,
    /// `None` means images only.
    pub double_tap_to_zoom_enabled: Option<bool>,
    /// Passed through to the host's long-press handling.
    pub delay_before_long_press: Duration,
    /// Hide header/footer while an item is zoomed.
    pub hide_chrome_on_zoom: bool,
    pub close_mode: CloseMode,
    pub close_fade: Duration,
    pub double_tap_window: Duration,
    pub swipe_close_velocity: f64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            swipe_to_close_enabled: true,
            double_tap_to_zoom_enabled: None,
            delay_before_long_press: Duration::from_millis(DEFAULT_DELAY_LONG_PRESS_MS),
            hide_chrome_on_zoom: true,
            close_mode: CloseMode::AfterFade,
            close_fade: CLOSE_FADE_DURATION,
            double_tap_window: DOUBLE_TAP_WINDOW,
            swipe_close_velocity: SWIPE_CLOSE_VELOCITY,
        }
    }
}

impl ViewerConfig {
    /// Defaults with `LIGHTBOX_*` environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(v) = env_flag("LIGHTBOX_SWIPE_TO_CLOSE") {
            config.swipe_to_close_enabled = v;
        }
        if let Some(v) = env_flag("LIGHTBOX_DOUBLE_TAP_ZOOM") {
            config.double_tap_to_zoom_enabled = Some(v);
        }
        if let Some(v) = env_millis("LIGHTBOX_LONG_PRESS_MS") {
            config.delay_before_long_press = v;
        }
        if let Some(v) = env_flag("LIGHTBOX_HIDE_CHROME_ON_ZOOM") {
            config.hide_chrome_on_zoom = v;
        }
        if let Some(v) = env_flag("LIGHTBOX_CLOSE_IMMEDIATE") {
            config.close_mode = if v {
                CloseMode::Immediate
            } else {
                CloseMode::AfterFade
            };
        }
        if let Some(v) = env_millis("LIGHTBOX_CLOSE_FADE_MS") {
            config.close_fade = v;
        }
        if let Some(v) = env_millis("LIGHTBOX_DOUBLE_TAP_MS") {
            config.double_tap_window = v;
        }
        if let Some(v) = env_f64("LIGHTBOX_SWIPE_CLOSE_VELOCITY") {
            config.swipe_close_velocity = v;
        }
        config
    }

    pub fn with_swipe_to_close(mut self, enabled: bool) -> Self {
        self.swipe_to_close_enabled = enabled;
        self
    }

    pub fn with_double_tap_to_zoom(mut self, enabled: bool) -> Self {
        self.double_tap_to_zoom_enabled = Some(enabled);
        self
    }

    pub fn with_close_mode(mut self, mode: CloseMode) -> Self {
        self.close_mode = mode;
        self
    }

    pub fn with_hide_chrome_on_zoom(mut self, hide: bool) -> Self {
        self.hide_chrome_on_zoom = hide;
        self
    }

    /// Double-tap zoom for a given kind; videos opt out unless forced on.
    pub fn double_tap_enabled_for(&self, kind: MediaKind) -> bool {
        self.double_tap_to_zoom_enabled
            .unwrap_or(kind != MediaKind::Video)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ViewerConfig::default();
        assert!(config.swipe_to_close_enabled);
        assert_eq!(config.delay_before_long_press, Duration::from_millis(800));
        assert!(config.double_tap_enabled_for(MediaKind::Image));
        assert!(!config.double_tap_enabled_for(MediaKind::Video));
    }

    #[test]
    fn test_explicit_double_tap_applies_to_all_kinds() {
        let on = ViewerConfig::default().with_double_tap_to_zoom(true);
        assert!(on.double_tap_enabled_for(MediaKind::Video));
        let off = ViewerConfig::default().with_double_tap_to_zoom(false);
        assert!(!off.double_tap_enabled_for(MediaKind::Image));
    }

    #[test]
    fn test_env_overrides() {
        std::env::set_var("LIGHTBOX_SWIPE_TO_CLOSE", "off");
        std::env::set_var("LIGHTBOX_LONG_PRESS_MS", "450");
        std::env::set_var("LIGHTBOX_SWIPE_CLOSE_VELOCITY", "not-a-number");
        let config = ViewerConfig::from_env();
        std::env::remove_var("LIGHTBOX_SWIPE_TO_CLOSE");
        std::env::remove_var("LIGHTBOX_LONG_PRESS_MS");
        std::env::remove_var("LIGHTBOX_SWIPE_CLOSE_VELOCITY");

        assert!(!config.swipe_to_close_enabled);
        assert_eq!(config.delay_before_long_press, Duration::from_millis(450));
        assert_eq!(config.swipe_close_velocity, SWIPE_CLOSE_VELOCITY);
    }
}
