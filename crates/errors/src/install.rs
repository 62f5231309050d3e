//! Installation system error types

use std::borrow::Cow;

use crate::{ErrorKind, UserFacingError};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum InstallError {
    #[error("invalid package file {path}: {message}")]
    InvalidPackageFile { path: String, message: String },

    #[error("{package} requires runtime version {required}, running {actual}")]
    RuntimeVersionMismatch {
        package: String,
        required: String,
        actual: String,
    },

    #[error("{package} requires tool version {required}, running {actual}")]
    ToolVersionMismatch {
        package: String,
        required: String,
        actual: String,
    },

    #[error("{package} requires {name} ({constraint})")]
    DependencyUnsatisfied {
        package: String,
        name: String,
        constraint: String,
    },

    #[error("unsigned package rejected by security policy: {package}")]
    UnsignedPackage { package: String },

    #[error("signature verification failed for {package}: {reason}")]
    SignatureInvalid { package: String, reason: String },

    #[error("permission denied: cannot write to {path}")]
    PermissionDenied { path: String },

    #[error("attempt to install file outside destination: {path} ({reason})")]
    PathTraversal { path: String, reason: String },

    #[error("destination must be an absolute path: {path}")]
    RelativeDestination { path: String },

    #[error("filesystem operation failed: {operation} on {path}: {message}")]
    FilesystemError {
        operation: String,
        path: String,
        message: String,
    },

    #[error("executable not found in package: {path}")]
    MissingExecutable { path: String },
}

impl InstallError {
    /// Classify this error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidPackageFile { .. } => ErrorKind::Format,
            Self::RuntimeVersionMismatch { .. }
            | Self::ToolVersionMismatch { .. }
            | Self::DependencyUnsatisfied { .. } => ErrorKind::Incompatibility,
            Self::UnsignedPackage { .. } | Self::SignatureInvalid { .. } => ErrorKind::Security,
            Self::PermissionDenied { .. } => ErrorKind::Permission,
            Self::PathTraversal { .. } => ErrorKind::PathTraversal,
            Self::RelativeDestination { .. } => ErrorKind::InvalidArgument,
            Self::FilesystemError { .. } | Self::MissingExecutable { .. } => ErrorKind::Io,
        }
    }
}

impl UserFacingError for InstallError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::InvalidPackageFile { .. } => {
                Some("Re-fetch the package archive; the local copy appears to be corrupt.")
            }
            Self::DependencyUnsatisfied { .. } => Some(
                "Install the missing dependency first, or pass --ignore-dependencies to skip the check.",
            ),
            Self::RuntimeVersionMismatch { .. } | Self::ToolVersionMismatch { .. } => {
                Some("Upgrade the runtime or tool, or pick a package version that supports it.")
            }
            Self::UnsignedPackage { .. } => {
                Some("Only signed packages are accepted; relax the security policy to install it.")
            }
            Self::PermissionDenied { .. } => Some(
                "Install into a directory you own, or re-run with sufficient privileges.",
            ),
            Self::PathTraversal { .. } => {
                Some("The archive is malformed or malicious; do not install it.")
            }
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::FilesystemError { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::InvalidPackageFile { .. } => "install.invalid_package_file",
            Self::RuntimeVersionMismatch { .. } => "install.runtime_version_mismatch",
            Self::ToolVersionMismatch { .. } => "install.tool_version_mismatch",
            Self::DependencyUnsatisfied { .. } => "install.dependency_unsatisfied",
            Self::UnsignedPackage { .. } => "install.unsigned_package",
            Self::SignatureInvalid { .. } => "install.signature_invalid",
            Self::PermissionDenied { .. } => "install.permission_denied",
            Self::PathTraversal { .. } => "install.path_traversal",
            Self::RelativeDestination { .. } => "install.relative_destination",
            Self::FilesystemError { .. } => "install.filesystem_error",
            Self::MissingExecutable { .. } => "install.missing_executable",
        };
        Some(code)
    }
}
