//! Paged media lightbox core.
//!
//! Turns raw gesture samples from a host pager and per-item zoom views into
//! fit transforms, zoom state, page index changes and one debounced close.
//! The host owns rendering; this crate owns the decisions.

pub mod config;
pub mod error;
pub mod gesture;
pub mod image_loader;
pub mod layout;
pub mod models;
pub mod pager;
pub mod resolve;
pub mod scanner;
pub mod viewer;

pub use config::ViewerConfig;
pub use error::{ResolveError, ResolveResult};
pub use layout::{compute_transform, FitTransform, Size, ViewportGeometry};
pub use models::{MediaItem, MediaKey, MediaKind};
pub use viewer::{PagerCommands, RenderFrame, ViewerHandle, ViewerHost, ViewerShell};
