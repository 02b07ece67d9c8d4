use std::time::Duration;
use thiserror::Error;
use crate::enums::api_error::ApiError;
use crate::enums::resource_class::ResourceClass;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("invalid configuration for '{field}': {message}")]
    Configuration {
        field: String,
        message: String,
    },

    #[error("unknown resource class '{0}': no limit configured")]
    UnknownResource(ResourceClass),

    #[error("operation cancelled")]
    Cancelled,

    #[error("scan timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("{operation} failed: {source}")]
    Api {
        operation: String,
        #[source]
        source: ApiError,
    },

    #[error("configuration file error at '{path}': {reason}")]
    ConfigFile {
        path: String,
        reason: String,
    },

    #[error("failed to render output: {0}")]
    Output(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl MonitorError {
    pub fn config_error(field: &str, message: impl Into<String>) -> Self {
        Self::Configuration {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn api_error(operation: impl Into<String>, source: ApiError) -> Self {
        Self::Api {
            operation: operation.into(),
            source,
        }
    }

    /// True for caller-driven stops (cancellation or deadline), as opposed to
    /// server or configuration failures.
    pub const fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Timeout(_))
    }

    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::Api { .. } | Self::Timeout(_) | Self::Cancelled => true,
            Self::Configuration { .. }
            | Self::UnknownResource(_)
            | Self::ConfigFile { .. }
            | Self::Output(_)
            | Self::Io(_) => false,
        }
    }

    pub const fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Configuration { .. } | Self::UnknownResource(_) => ErrorSeverity::Critical,
            Self::ConfigFile { .. } | Self::Io(_) | Self::Output(_) => ErrorSeverity::High,
            Self::Api { .. } | Self::Timeout(_) => ErrorSeverity::Medium,
            Self::Cancelled => ErrorSeverity::Low,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    pub const fn emoji(self) -> &'static str {
        match self {
            Self::Low => "🟢",
            Self::Medium => "🟡",
            Self::High => "🟠",
            Self::Critical => "🔴",
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

/// Result type alias for monitor operations
pub type MonitorResult<T> = Result<T, MonitorError>;

/// Error handler for consistent error reporting at the CLI boundary
pub struct ErrorHandler;

impl ErrorHandler {
    pub fn handle_error(error: &MonitorError) {
        let severity = error.severity();

        log::error!("[{}] {:?}", severity.name(), error);
        eprintln!("{} {}", severity.emoji(), error);

        if let MonitorError::Configuration { .. } | MonitorError::ConfigFile { .. } = error {
            eprintln!("💡 Run 'deploy-watch validate' to check your configuration");
        }

        if error.is_recoverable() {
            eprintln!("🔄 This error is recoverable - you can retry the operation");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_is_distinguished_from_server_errors() {
        assert!(MonitorError::Cancelled.is_cancellation());
        assert!(MonitorError::Timeout(Duration::from_secs(60)).is_cancellation());

        let api = MonitorError::api_error("list repositories", ApiError::Forbidden("no".into()));
        assert!(!api.is_cancellation());
        assert!(api.is_recoverable());
    }

    #[test]
    fn configuration_errors_are_fatal() {
        let error = MonitorError::config_error("rate_limits.environments", "must be positive");
        assert!(!error.is_recoverable());
        assert_eq!(error.severity(), ErrorSeverity::Critical);
        assert_eq!(
            error.to_string(),
            "invalid configuration for 'rate_limits.environments': must be positive"
        );
    }
}
