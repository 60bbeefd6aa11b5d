use derive_more::Display;

/// Error type shared by every layer. Nothing here is fatal to the host:
/// callers degrade to a status string or keep the last good state.
#[derive(Debug, Clone, PartialEq, Display)]
pub enum AppError {
    #[display(fmt = "Network error: {}", _0)]
    Network(String),
    #[display(fmt = "Storage error: {}", _0)]
    Storage(String),
    #[display(fmt = "Parse error: {}", _0)]
    Parse(String),
    #[display(fmt = "Rendering error: {}", _0)]
    Rendering(String),
    #[display(fmt = "Validation error: {}", _0)]
    Validation(String),
}

impl std::error::Error for AppError {}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        AppError::Parse(error.to_string())
    }
}

pub type NetworkResult<T> = Result<T, AppError>;
pub type StorageResult<T> = Result<T, AppError>;
pub type RenderingResult<T> = Result<T, AppError>;
