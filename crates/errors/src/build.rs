//! Extension build error types

use std::borrow::Cow;
use std::path::PathBuf;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum BuildError {
    #[error(
        "ERROR: Failed to build native extension.\n\n{output}\n\nGem files will remain installed in {} for inspection.\nResults logged to {}",
        .install_dir.display(),
        .log_path.display()
    )]
    ExtensionFailed {
        output: String,
        install_dir: PathBuf,
        log_path: PathBuf,
    },

    #[error("{command} failed ({status})")]
    CommandFailed { command: String, status: String },

    #[error("failed to spawn {command}: {message}")]
    SpawnFailed { command: String, message: String },

    #[error("No builder for extension '{descriptor}'")]
    NoBuilder { descriptor: String },

    #[error("cannot enter build directory {path}: {message}")]
    WorkingDirectory { path: String, message: String },
}

impl UserFacingError for BuildError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::ExtensionFailed { .. } | Self::CommandFailed { .. } => Some(
                "Inspect the build log; missing system headers or libraries are the usual cause.",
            ),
            Self::SpawnFailed { .. } => {
                Some("Make sure the build tools (make, rake, a C compiler) are on PATH.")
            }
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::ExtensionFailed { .. } => "build.extension_failed",
            Self::CommandFailed { .. } => "build.command_failed",
            Self::SpawnFailed { .. } => "build.spawn_failed",
            Self::NoBuilder { .. } => "build.no_builder",
            Self::WorkingDirectory { .. } => "build.working_directory",
        };
        Some(code)
    }
}
