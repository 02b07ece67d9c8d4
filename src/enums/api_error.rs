use std::error::Error;
use std::fmt;

/// Structured failure returned by every `GithubApi` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    NotFound(String),
    RateLimited { retry_after_secs: Option<u64> },
    Forbidden(String),
    Http { status: u16, message: String },
    Transport(String),
    Decode(String),
}

impl ApiError {
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub const fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ApiError::NotFound(resource) => write!(f, "Not Found: {}", resource),
            ApiError::RateLimited { retry_after_secs: Some(secs) } => {
                write!(f, "Rate Limited: retry after {}s", secs)
            }
            ApiError::RateLimited { retry_after_secs: None } => write!(f, "Rate Limited"),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::Http { status, message } => write!(f, "HTTP {}: {}", status, message),
            ApiError::Transport(msg) => write!(f, "Network Error: {}", msg),
            ApiError::Decode(msg) => write!(f, "Serialization Error: {}", msg),
        }
    }
}

impl Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            ApiError::Decode(error.to_string())
        } else {
            ApiError::Transport(error.to_string())
        }
    }
}
