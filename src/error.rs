//! Errors from the media dimension resolution boundary.
//!
//! None of these reach the host: the viewer treats every variant as
//! "dimensions unknown" and keeps the loading placeholder up.

use std::path::PathBuf;

use thiserror::Error;

use crate::models::MediaKind;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode dimensions of {path:?}: {message}")]
    Decode { path: PathBuf, message: String },

    #[error("no dimension probe for {kind:?} media: {path:?}")]
    Unsupported { path: PathBuf, kind: MediaKind },

    #[error("dimension resolver has shut down")]
    Disconnected,
}

impl ResolveError {
    /// Wrap a loader failure, keeping I/O errors distinguishable.
    pub fn from_loader(path: PathBuf, err: anyhow::Error) -> Self {
        match err.downcast::<std::io::Error>() {
            Ok(source) => Self::Io { path, source },
            Err(err) => Self::Decode {
                path,
                message: format!("{err:#}"),
            },
        }
    }
}

pub type ResolveResult<T> = std::result::Result<T, ResolveError>;
