#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("malformed path geometry: {0:?}")]
    MalformedPath(String),
    #[error("unknown visual handle {0}")]
    UnknownHandle(usize),
    #[error("scene JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("scene JSON5 error: {0}")]
    Json5(#[from] json5::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
