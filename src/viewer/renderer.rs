use tracing::{debug, warn};

use crate::models::MediaKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Loading,
    Loaded,
    /// Decode or network failure reported by the platform widget. Not retried.
    Failed,
}

#[derive(Debug, Clone, Default)]
pub struct ImageRenderer {
    load: LoadState,
}

#[derive(Debug, Clone, Default)]
pub struct VideoRenderer {
    load: LoadState,
    current: bool,
    stopped: bool,
}

impl VideoRenderer {
    /// Plays only while it is the current page and has loaded.
    pub fn should_play(&self) -> bool {
        self.current && self.load == LoadState::Loaded && !self.stopped
    }
}

/// Renderer state for one item, selected by `MediaKind`.
#[derive(Debug, Clone)]
pub enum MediaRenderer {
    Image(ImageRenderer),
    Video(VideoRenderer),
}

impl MediaRenderer {
    pub fn for_kind(kind: MediaKind) -> Self {
        match kind {
            MediaKind::Image => Self::Image(ImageRenderer::default()),
            MediaKind::Video => Self::Video(VideoRenderer::default()),
        }
    }

    pub fn load_state(&self) -> LoadState {
        match self {
            Self::Image(r) => r.load,
            Self::Video(r) => r.load,
        }
    }

    fn load_mut(&mut self) -> &mut LoadState {
        match self {
            Self::Image(r) => &mut r.load,
            Self::Video(r) => &mut r.load,
        }
    }

    pub fn on_loaded(&mut self) {
        *self.load_mut() = LoadState::Loaded;
    }

    pub fn on_error(&mut self, message: &str) {
        warn!("media failed to load: {}", message);
        *self.load_mut() = LoadState::Failed;
    }

    /// Placeholder stays up until the media both loaded and has a usable size.
    pub fn show_placeholder(&self, has_dimensions: bool) -> bool {
        !has_dimensions || self.load_state() != LoadState::Loaded
    }

    pub fn set_current(&mut self, current: bool) {
        if let Self::Video(r) = self {
            r.current = current;
            if current {
                r.stopped = false;
            }
        }
    }

    /// Halt playback ahead of a dismissal.
    pub fn stop(&mut self) {
        if let Self::Video(r) = self {
            if r.should_play() {
                debug!("stopping video playback");
            }
            r.stopped = true;
        }
    }

    pub fn is_playing(&self) -> bool {
        match self {
            Self::Image(_) => false,
            Self::Video(r) => r.should_play(),
        }
    }
}
