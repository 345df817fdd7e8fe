use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("unknown response category '{0}'")]
    UnknownResponse(String),
    #[error("unknown intervention marker '{0}'")]
    UnknownMarker(String),
    #[error("invalid {kind} status code {code}")]
    InvalidStatusCode { kind: &'static str, code: u8 },
}

pub type Result<T> = std::result::Result<T, ModelError>;
