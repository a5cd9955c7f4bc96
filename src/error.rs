use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MapperError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("frame size {actual:?} does not match background model size {expected:?}")]
    FrameSizeMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("failed to read frame {path}: {source}")]
    Frame {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("camera error: {0}")]
    Camera(String),

    #[error("{0} already exists")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, MapperError>;
