use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("pose has {actual} vertices but the figure has {expected}")]
    PoseLength { expected: usize, actual: usize },

    #[error("edge {edge:?} refers to a vertex outside 0..{vertices}")]
    InvalidEdge {
        edge: (usize, usize),
        vertices: usize,
    },

    #[error("malformed fragment: {0}")]
    Fragment(String),
}

pub type Result<T> = std::result::Result<T, Error>;
