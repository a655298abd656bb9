use thiserror::Error;

#[derive(Debug, Error)]
pub enum RigError {
    #[error("failed to parse rig config: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("invalid rig config: {message}")]
    InvalidConfig { message: String },

    #[error("invalid camera geometry: {width}x{height}")]
    InvalidCamera { width: f32, height: f32 },

    #[error("scene node not found: {path}")]
    MissingNode { path: String },

    #[error("scene path {path} resolved {found} nodes, expected {expected}")]
    NodeCountMismatch {
        path: String,
        expected: usize,
        found: usize,
    },
}

pub type Result<T> = std::result::Result<T, RigError>;
