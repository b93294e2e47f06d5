use std::path::{Path, PathBuf};

use xxhash_rust::xxh3::xxh3_64;

use crate::layout::Size;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" | "png" | "webp" | "gif" | "bmp" | "tiff" | "tif" => Some(Self::Image),
            "webm" | "mp4" | "mkv" | "avi" | "mov" | "m4v" => Some(Self::Video),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

/// Stable identity of a media item, independent of its position in the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MediaKey(u64);

impl MediaKey {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Hash of the source locator.
    pub fn from_source(source: &Path) -> Self {
        Self(xxh3_64(source.as_os_str().as_encoded_bytes()))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Per-item decoration state, resolved by the host before handing items over.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFlags {
    pub favorite: bool,
    pub hidden: bool,
    pub deleted: bool,
    /// Titles of albums containing this item.
    pub albums: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct MediaItem {
    pub key: MediaKey,
    pub kind: MediaKind,
    /// Opaque locator handed to the renderer.
    pub source: PathBuf,
    /// Intrinsic pixel size, `None` until resolved.
    pub dimensions: Option<Size>,
    pub flags: ItemFlags,
}

impl MediaItem {
    pub fn new(source: PathBuf, kind: MediaKind) -> Self {
        Self {
            key: MediaKey::from_source(&source),
            kind,
            source,
            dimensions: None,
            flags: ItemFlags::default(),
        }
    }

    /// Create an item from a file path, detecting the kind by extension.
    pub fn from_path(path: PathBuf) -> Option<Self> {
        let kind = MediaKind::from_path(&path)?;
        Some(Self::new(path, kind))
    }

    pub fn with_key(mut self, key: MediaKey) -> Self {
        self.key = key;
        self
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.dimensions = Some(Size::from_pixels(width, height));
        self
    }

    pub fn with_flags(mut self, flags: ItemFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Check if this is a video file based on media kind
    pub fn is_video(&self) -> bool {
        self.kind == MediaKind::Video
    }

    /// Dimensions are known and usable for a fit transform.
    pub fn has_dimensions(&self) -> bool {
        self.dimensions.is_some_and(|d| d.is_positive())
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.dimensions.map(|d| d.aspect_ratio()).unwrap_or(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(MediaKind::from_extension("JPG"), Some(MediaKind::Image));
        assert_eq!(MediaKind::from_extension("mov"), Some(MediaKind::Video));
        assert_eq!(MediaKind::from_extension("txt"), None);
        assert_eq!(
            MediaKind::from_path(Path::new("/photos/IMG_0001.HEIC")),
            None
        );
        assert_eq!(
            MediaKind::from_path(Path::new("/photos/clip.mp4")),
            Some(MediaKind::Video)
        );
    }

    #[test]
    fn test_key_is_stable_per_source() {
        let a = MediaItem::from_path(PathBuf::from("/a/1.jpg")).unwrap();
        let b = MediaItem::from_path(PathBuf::from("/a/1.jpg")).unwrap();
        let c = MediaItem::from_path(PathBuf::from("/a/2.jpg")).unwrap();
        assert_eq!(a.key, b.key);
        assert_ne!(a.key, c.key);
        assert_eq!(a.with_key(MediaKey::new(7)).key.value(), 7);
    }

    #[test]
    fn test_dimensions() {
        let item = MediaItem::new(PathBuf::from("x.png"), MediaKind::Image);
        assert!(!item.has_dimensions());
        assert_eq!(item.aspect_ratio(), 1.0);

        let item = item.with_dimensions(1920, 1080);
        assert!(item.has_dimensions());
        assert!((item.aspect_ratio() - 16.0 / 9.0).abs() < 1e-9);

        let zero = MediaItem::new(PathBuf::from("y.png"), MediaKind::Image).with_dimensions(0, 10);
        assert!(!zero.has_dimensions());
    }
}
