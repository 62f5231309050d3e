//! Package archive and specification error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum PackageError {
    #[error("invalid package format: {message}")]
    InvalidFormat { message: String },

    #[error("invalid specification: {message}")]
    InvalidSpecification { message: String },

    #[error("invalid dependency {input}: {message}")]
    InvalidDependency { input: String, message: String },
}

impl UserFacingError for PackageError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::InvalidFormat { .. } => Some("The archive is corrupt; fetch it again."),
            Self::InvalidSpecification { .. } | Self::InvalidDependency { .. } => {
                Some("Fix the package metadata and rebuild the archive.")
            }
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::InvalidFormat { .. } => "package.invalid_format",
            Self::InvalidSpecification { .. } => "package.invalid_specification",
            Self::InvalidDependency { .. } => "package.invalid_dependency",
        };
        Some(code)
    }
}
