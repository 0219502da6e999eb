//! Error types for the build pipeline

use thiserror::Error;

use crate::host::HostError;

/// Errors that end a build
#[derive(Error, Debug)]
pub enum PipelineError {
    /// No enabled scene to build
    #[error("No scenes configured: enable at least one scene in the build settings")]
    NoScenesConfigured,

    /// The toolchain ran and reported a failed build
    #[error("Build failed with {} error(s)", messages.len())]
    ToolchainFailure {
        /// Error-severity messages from every build step
        messages: Vec<String>,
    },

    /// A host collaborator failed in a way the pipeline cannot recover from
    #[error("Unexpected build fault: {source}")]
    UnexpectedFault {
        #[source]
        /// Underlying host error
        source: HostError,
    },
}

impl From<HostError> for PipelineError {
    fn from(source: HostError) -> Self {
        Self::UnexpectedFault { source }
    }
}

impl From<crate::host::SettingsError> for PipelineError {
    fn from(source: crate::host::SettingsError) -> Self {
        Self::UnexpectedFault {
            source: HostError::Settings(source),
        }
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(source: std::io::Error) -> Self {
        Self::UnexpectedFault {
            source: HostError::Io(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toolchain_failure_message_counts_errors() {
        let err = PipelineError::ToolchainFailure {
            messages: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(err.to_string(), "Build failed with 2 error(s)");
    }

    #[test]
    fn test_io_error_becomes_unexpected_fault() {
        let err: PipelineError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert!(matches!(
            err,
            PipelineError::UnexpectedFault {
                source: HostError::Io(_)
            }
        ));
    }
}
