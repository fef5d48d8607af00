//! Error kinds surfaced to the orchestration layer

use std::time::Duration;
use thiserror::Error;

/// Boxed underlying cause carried by wrapped errors
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Classification of a failure reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformErrorKind {
    NotFound,
    Conflict,
    Authentication,
    Other,
}

impl std::fmt::Display for PlatformErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlatformErrorKind::NotFound => write!(f, "not found"),
            PlatformErrorKind::Conflict => write!(f, "conflict"),
            PlatformErrorKind::Authentication => write!(f, "authentication"),
            PlatformErrorKind::Other => write!(f, "platform"),
        }
    }
}

/// Errors raised by drivers and PaaS clients
#[derive(Error, Debug)]
pub enum PaasError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Deployment failed: {message}")]
    Deployment {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Platform error ({kind}): {message}")]
    Platform {
        kind: PlatformErrorKind,
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Service instance already exists: {0}")]
    DuplicateService(String),

    #[error("Timeout: {name} not running after {waited:?}")]
    Timeout { name: String, waited: Duration },
}

impl PaasError {
    pub fn deployment(message: impl Into<String>) -> Self {
        PaasError::Deployment {
            message: message.into(),
            source: None,
        }
    }

    pub fn platform(kind: PlatformErrorKind, message: impl Into<String>) -> Self {
        PaasError::Platform {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::platform(PlatformErrorKind::NotFound, message)
    }

    /// Attach the original cause to a deployment or platform error
    pub fn with_source(mut self, cause: impl Into<BoxError>) -> Self {
        match &mut self {
            PaasError::Deployment { source, .. } | PaasError::Platform { source, .. } => {
                *source = Some(cause.into());
            }
            _ => {}
        }
        self
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            PaasError::Platform {
                kind: PlatformErrorKind::NotFound,
                ..
            }
        )
    }
}

pub type Result<T> = std::result::Result<T, PaasError>;
