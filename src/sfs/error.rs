use crate::version::ApiVersion;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SfsError {
    #[error("Invalid API version format: '{0}' (expected \"<major>.<minor>\")")]
    InvalidVersionFormat(String),

    #[error("Operation '{operation}' is not supported at API version {version}")]
    UnsupportedVersion {
        operation: String,
        version: ApiVersion,
    },

    #[error("Incompatible API version: {0}")]
    IncompatibleVersion(String),

    #[error("Operation '{operation}' already has a candidate covering {existing}; refusing {new}")]
    OverlappingVersions {
        operation: String,
        existing: String,
        new: String,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    NoUniqueMatch(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("Unable to establish connection: {0}")]
    Transport(String),

    #[error("{0}")]
    CommandError(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SfsError {
    /// Builds the error for a non-2xx response.
    ///
    /// `message` is the text extracted from the fault body; it is decorated
    /// with the status code and, when the service sent one, the request id.
    pub fn from_status(status: u16, message: &str, request_id: Option<&str>) -> Self {
        let mut text = format!("{} (HTTP {})", message, status);
        if let Some(id) = request_id {
            text.push_str(&format!(" (Request-ID: {})", id));
        }
        match status {
            400 => SfsError::BadRequest(text),
            404 => SfsError::NotFound(text),
            409 => SfsError::Conflict(text),
            _ => SfsError::Http {
                status,
                message: text,
            },
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            SfsError::BadRequest(_) => Some(400),
            SfsError::NotFound(_) => Some(404),
            SfsError::Conflict(_) => Some(409),
            SfsError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SfsError>;
