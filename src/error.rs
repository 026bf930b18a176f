use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the network and its input helpers.
///
/// Forward evaluation only ever fails with `ShapeMismatch`; the other
/// variants come from the edges (image files, config files).
#[derive(Debug, Error)]
pub enum Error {
    #[error("shape mismatch in {op}: expected {expected}, got {actual}")]
    ShapeMismatch {
        op: &'static str,
        expected: String,
        actual: String,
    },

    #[error("failed to decode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("cannot access {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config in {}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    pub(crate) fn shape(op: &'static str, expected: impl ToString, actual: impl ToString) -> Error {
        Error::ShapeMismatch {
            op,
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Error {
        Error::Io { path: path.into(), source }
    }

    pub fn is_shape_mismatch(&self) -> bool {
        matches!(self, Error::ShapeMismatch { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
