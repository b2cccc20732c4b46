use thiserror::Error;

#[derive(Debug, Error)]
pub enum GcpError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("no candidate with {target} colors found for p={ratio} after {attempts} attempts")]
    TargetUnreachable {
        ratio: f64,
        target: usize,
        attempts: usize,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GcpError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        GcpError::InvalidParameter(message.into())
    }
}

pub type Result<T> = std::result::Result<T, GcpError>;
