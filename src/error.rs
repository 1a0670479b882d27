//! # Error Handling
//!
//! One error type covers the whole texture pipeline. Every variant that
//! relates to a file carries that file's path, because the batch reports
//! failures per file and must never leave the user guessing which texture
//! broke.
//!
//! ## Classification
//!
//! - **Fatal** errors ([`TextureError::is_fatal`]) stop the run before any
//!   file is touched: an unknown filter or an invalid configuration would
//!   invalidate every result in the batch.
//! - Everything else is **per-file**: it is recorded in the summary and the
//!   batch moves on to the next texture.
//!
//! ## Usage
//!
//! ```rust
//! use texture_pow2::error::TextureError;
//!
//! let err: TextureError = "sharpen".parse::<texture_pow2::ResampleFilter>().unwrap_err().into();
//! assert!(err.is_fatal());
//! assert_eq!(err.category(), "filter");
//! ```

use std::io;
use std::path::{Path, PathBuf};

use pow2_scale::cpu::ScaleError;
use pow2_scale::filter::UnsupportedFilter;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TextureError {
    /// Zero-sized, corrupt, or undecodable image data.
    #[error("{}: invalid image: {reason}", path.display())]
    InvalidImage { path: PathBuf, reason: String },

    /// Unknown resampling filter identifier.
    #[error(transparent)]
    UnsupportedFilter(#[from] UnsupportedFilter),

    /// Unreadable or unwritable path.
    #[error("{}: {operation} failed: {source}", path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}: could not encode as {format}: {source}", path.display())]
    Encode {
        path: PathBuf,
        format: String,
        #[source]
        source: image::ImageError,
    },

    #[error("{}: resize failed: {source}", path.display())]
    Resize {
        path: PathBuf,
        #[source]
        source: ScaleError,
    },

    /// Another texture in the batch already maps to the same output file.
    #[error("{}: output {} is already written by {}", path.display(), output.display(), claimed_by.display())]
    OutputCollision {
        path: PathBuf,
        output: PathBuf,
        claimed_by: PathBuf,
    },

    #[error("invalid configuration for `{field}`: {reason}")]
    Config { field: &'static str, reason: String },

    #[error("could not serialise report: {0}")]
    Report(#[from] serde_json::Error),
}

pub type TextureResult<T> = Result<T, TextureError>;

impl TextureError {
    pub fn invalid_image(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidImage {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    pub fn config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Config {
            field,
            reason: reason.into(),
        }
    }

    /// Short category name, used as the `kind` field in reports.
    pub fn category(&self) -> &'static str {
        match self {
            TextureError::InvalidImage { .. } => "invalid_image",
            TextureError::UnsupportedFilter(_) => "filter",
            TextureError::Io { .. } => "io",
            TextureError::Encode { .. } => "encode",
            TextureError::Resize { .. } => "resize",
            TextureError::OutputCollision { .. } => "output_collision",
            TextureError::Config { .. } => "config",
            TextureError::Report(_) => "report",
        }
    }

    /// Errors that invalidate the whole batch and must stop it up front.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            TextureError::UnsupportedFilter(_) | TextureError::Config { .. }
        )
    }

    /// File the error refers to, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            TextureError::InvalidImage { path, .. }
            | TextureError::Io { path, .. }
            | TextureError::Encode { path, .. }
            | TextureError::Resize { path, .. }
            | TextureError::OutputCollision { path, .. } => Some(path),
            TextureError::UnsupportedFilter(_)
            | TextureError::Config { .. }
            | TextureError::Report(_) => None,
        }
    }
}
