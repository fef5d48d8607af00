//! Cloud Foundry adapter error types

use cfpaas_core::{PaasError, PlatformErrorKind};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CfError {
    #[error("cf CLI not found. Please install the Cloud Foundry CLI v8")]
    CliNotFound,

    #[error("cf authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("cf command failed: {0}")]
    CommandFailed(String),

    #[error("Cloud Controller error {code} {title}: {detail}")]
    Api {
        code: i64,
        title: String,
        detail: String,
    },

    #[error("Domain not found: {0}")]
    DomainNotFound(String),

    #[error("Artifact not found: {0}")]
    ArtifactNotFound(String),

    #[error("Artifact download failed: {0}")]
    Download(#[from] reqwest::Error),

    #[error("Unexpected Cloud Controller response: {0}")]
    UnexpectedResponse(String),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CfError>;

impl CfError {
    /// Platform classification of this failure
    pub fn kind(&self) -> PlatformErrorKind {
        match self {
            CfError::AuthenticationFailed(_) => PlatformErrorKind::Authentication,
            CfError::CommandFailed(output) => classify_output(output),
            CfError::Api { code, title, detail } => classify_api(*code, title, detail),
            CfError::DomainNotFound(_) | CfError::ArtifactNotFound(_) => {
                PlatformErrorKind::NotFound
            }
            _ => PlatformErrorKind::Other,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == PlatformErrorKind::NotFound
    }

    /// Failures that happen before anything is pushed
    fn is_deployment_input(&self) -> bool {
        matches!(
            self,
            CfError::DomainNotFound(_) | CfError::ArtifactNotFound(_) | CfError::Download(_)
        )
    }
}

/// Classify the text the cf CLI prints on failure
pub fn classify_output(output: &str) -> PlatformErrorKind {
    let output = output.to_lowercase();
    if output.contains("not found") || output.contains("does not exist") {
        PlatformErrorKind::NotFound
    } else if output.contains("already exists")
        || output.contains("is taken")
        || output.contains("already taken")
    {
        PlatformErrorKind::Conflict
    } else if output.contains("not logged in")
        || output.contains("credentials were rejected")
        || output.contains("authentication")
        || output.contains("unauthorized")
    {
        PlatformErrorKind::Authentication
    } else {
        PlatformErrorKind::Other
    }
}

fn classify_api(code: i64, title: &str, detail: &str) -> PlatformErrorKind {
    match (code, title) {
        (10010, _) | (_, "CF-ResourceNotFound") => PlatformErrorKind::NotFound,
        (10002, _) | (1000, _) | (_, "CF-NotAuthenticated") | (_, "CF-InvalidAuthToken") => {
            PlatformErrorKind::Authentication
        }
        _ => classify_output(detail),
    }
}

impl From<CfError> for PaasError {
    fn from(err: CfError) -> Self {
        let message = err.to_string();
        if matches!(err, CfError::CliNotFound) {
            PaasError::Configuration(message)
        } else if err.is_deployment_input() {
            PaasError::deployment(message).with_source(err)
        } else {
            PaasError::platform(err.kind(), message).with_source(err)
        }
    }
}

/// Wrap a failure of the push phase as a deployment error
pub(crate) fn deployment_error(app: &str, err: CfError) -> PaasError {
    match err.kind() {
        PlatformErrorKind::Authentication => err.into(),
        _ if err.is_deployment_input() => err.into(),
        _ => PaasError::deployment(format!("push of {} failed: {}", app, err)).with_source(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_cli_output() {
        assert_eq!(
            classify_output("App 'shop' not found."),
            PlatformErrorKind::NotFound
        );
        assert_eq!(
            classify_output("Service instance orders-db does not exist."),
            PlatformErrorKind::NotFound
        );
        assert_eq!(
            classify_output("The app name is taken: shop"),
            PlatformErrorKind::Conflict
        );
        assert_eq!(
            classify_output("Not logged in. Use 'cf login' to log in."),
            PlatformErrorKind::Authentication
        );
        assert_eq!(
            classify_output("Credentials were rejected, please try again."),
            PlatformErrorKind::Authentication
        );
        assert_eq!(
            classify_output("Insufficient resources"),
            PlatformErrorKind::Other
        );
    }

    #[test]
    fn test_classify_api_errors() {
        let not_found = CfError::Api {
            code: 10010,
            title: "CF-ResourceNotFound".to_string(),
            detail: "App not found".to_string(),
        };
        assert!(not_found.is_not_found());

        let auth = CfError::Api {
            code: 1000,
            title: "CF-InvalidAuthToken".to_string(),
            detail: "Invalid Auth Token".to_string(),
        };
        assert_eq!(auth.kind(), PlatformErrorKind::Authentication);

        let taken = CfError::Api {
            code: 10008,
            title: "CF-UnprocessableEntity".to_string(),
            detail: "Route already exists".to_string(),
        };
        assert_eq!(taken.kind(), PlatformErrorKind::Conflict);
    }

    #[test]
    fn test_into_paas_error() {
        let err: PaasError = CfError::CommandFailed("App 'shop' not found.".to_string()).into();
        assert!(err.is_not_found());
        assert!(std::error::Error::source(&err).is_some());

        let err: PaasError = CfError::CliNotFound.into();
        assert!(matches!(err, PaasError::Configuration(_)));

        let err: PaasError = CfError::ArtifactNotFound("/tmp/app.war".to_string()).into();
        assert!(matches!(err, PaasError::Deployment { .. }));
    }

    #[test]
    fn test_deployment_error_keeps_auth() {
        let err = deployment_error("shop", CfError::AuthenticationFailed("expired".into()));
        assert!(matches!(
            err,
            PaasError::Platform {
                kind: PlatformErrorKind::Authentication,
                ..
            }
        ));

        let err = deployment_error("shop", CfError::CommandFailed("staging failed".into()));
        assert!(matches!(err, PaasError::Deployment { .. }));
    }
}
