//! Intrinsic dimension resolution for media items.
//!
//! - `DimensionResolver` - the collaborator interface the viewer consumes
//! - `FileResolver` - reads image headers from local files
//! - `ResolveQueue` - background worker pool with an LRU of resolved sizes

pub mod queue;

pub use queue::*;

use crate::error::{ResolveError, ResolveResult};
use crate::image_loader;
use crate::layout::Size;
use crate::models::{MediaItem, MediaKind};

/// Yields the intrinsic size of a media item, or a failure the viewer treats
/// as "dimensions unknown".
pub trait DimensionResolver: Send + Sync {
    fn resolve(&self, item: &MediaItem) -> ResolveResult<Size>;
}

/// Resolves local image files. Video probing belongs to the platform player.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileResolver;

impl DimensionResolver for FileResolver {
    fn resolve(&self, item: &MediaItem) -> ResolveResult<Size> {
        match item.kind {
            MediaKind::Image => image_loader::read_dimensions(&item.source)
                .map_err(|err| ResolveError::from_loader(item.source.clone(), err)),
            MediaKind::Video => Err(ResolveError::Unsupported {
                path: item.source.clone(),
                kind: item.kind,
            }),
        }
    }
}
