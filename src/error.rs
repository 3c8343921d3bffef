use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("failed to read {path:?}: {source}")]
    Read { path: PathBuf, source: std::io::Error },

    #[error("failed to decode image {path:?}: {message}")]
    Decode { path: PathBuf, message: String },

    #[error("failed to create texture for {path:?}: {message}")]
    Texture { path: PathBuf, message: String },

    #[error("failed to start ffmpeg for {path:?}: {source}")]
    Spawn { path: PathBuf, source: std::io::Error },
}
