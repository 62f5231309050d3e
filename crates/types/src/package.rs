//! Package-related type definitions

use crate::version::{self, VersionSpec};
use rgem_errors::PackageError;
use semver::Version;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path};

/// A runtime dependency on another installed package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    #[serde(default)]
    pub requirement: VersionSpec,
}

impl Dependency {
    /// Create a dependency on `name` matching `requirement`
    pub fn new(name: impl Into<String>, requirement: VersionSpec) -> Self {
        Self {
            name: name.into(),
            requirement,
        }
    }

    /// Parse a dependency from a string (e.g., "rake >= 12.0, < 14")
    ///
    /// # Errors
    ///
    /// Returns `PackageError::InvalidDependency` if the name is missing or the
    /// constraint list is malformed.
    pub fn parse(s: &str) -> Result<Self, PackageError> {
        let invalid = |message: String| PackageError::InvalidDependency {
            input: s.to_string(),
            message,
        };

        let s = s.trim();
        let split = s
            .find(|c: char| c.is_whitespace() || "=!<>~".contains(c))
            .unwrap_or(s.len());
        let (name, requirement) = s.split_at(split);

        if name.is_empty() {
            return Err(invalid("missing package name".to_string()));
        }

        let requirement = requirement
            .parse::<VersionSpec>()
            .map_err(|e| invalid(e.to_string()))?;

        Ok(Self::new(name, requirement))
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.requirement)
    }
}

fn default_bindir() -> String {
    "bin".to_string()
}

fn default_require_paths() -> Vec<String> {
    vec!["lib".to_string()]
}

/// Parsed package metadata, immutable once read from an archive
///
/// The same structure is persisted as TOML under `specifications/` after a
/// successful install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specification {
    pub name: String,
    #[serde(with = "version::lenient")]
    pub version: Version,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Target platform; `None` or `"ruby"` means platform independent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_runtime_version: Option<VersionSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_tool_version: Option<VersionSpec>,
    #[serde(default = "default_bindir")]
    pub bindir: String,
    /// Executable names relative to `bindir`
    #[serde(default)]
    pub executables: Vec<String>,
    /// Build descriptor paths relative to the package root
    #[serde(default)]
    pub extensions: Vec<String>,
    #[serde(default = "default_require_paths")]
    pub require_paths: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_install_message: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

impl Specification {
    /// Create a specification with defaults for everything but name and version
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        Self {
            name: name.into(),
            version,
            summary: None,
            platform: None,
            required_runtime_version: None,
            required_tool_version: None,
            bindir: default_bindir(),
            executables: Vec::new(),
            extensions: Vec::new(),
            require_paths: default_require_paths(),
            post_install_message: None,
            dependencies: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_executable(mut self, name: impl Into<String>) -> Self {
        self.executables.push(name.into());
        self
    }

    #[must_use]
    pub fn with_extension(mut self, descriptor: impl Into<String>) -> Self {
        self.extensions.push(descriptor.into());
        self
    }

    #[must_use]
    pub fn with_dependency(mut self, dependency: Dependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    #[must_use]
    pub fn with_required_runtime_version(mut self, requirement: VersionSpec) -> Self {
        self.required_runtime_version = Some(requirement);
        self
    }

    #[must_use]
    pub fn with_required_tool_version(mut self, requirement: VersionSpec) -> Self {
        self.required_tool_version = Some(requirement);
        self
    }

    #[must_use]
    pub fn with_post_install_message(mut self, message: impl Into<String>) -> Self {
        self.post_install_message = Some(message.into());
        self
    }

    #[must_use]
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    /// `name-version`, plus `-platform` for platform-specific packages
    #[must_use]
    pub fn full_name(&self) -> String {
        match self.platform.as_deref() {
            Some(platform) if !platform.is_empty() && platform != "ruby" => {
                format!("{}-{}-{platform}", self.name, self.version)
            }
            _ => format!("{}-{}", self.name, self.version),
        }
    }

    /// File name of the persisted specification
    #[must_use]
    pub fn spec_file_name(&self) -> String {
        format!("{}.spec", self.full_name())
    }

    /// Check the fields that become file system paths
    ///
    /// # Errors
    ///
    /// Returns `PackageError::InvalidSpecification` if the name is empty or
    /// contains path separators, or if the bin directory, an executable or an
    /// extension descriptor is not a plain relative path.
    pub fn validate(&self) -> Result<(), PackageError> {
        let invalid = |message: String| PackageError::InvalidSpecification { message };

        if self.name.trim().is_empty() {
            return Err(invalid("package name is empty".to_string()));
        }
        if self.name.contains(['/', '\\']) || self.name.starts_with('.') {
            return Err(invalid(format!("invalid package name: {}", self.name)));
        }
        if let Some(platform) = &self.platform {
            if platform.contains(['/', '\\']) {
                return Err(invalid(format!("invalid platform: {platform}")));
            }
        }

        let relative = std::iter::once(("bindir", &self.bindir))
            .chain(self.executables.iter().map(|e| ("executable", e)))
            .chain(self.extensions.iter().map(|e| ("extension", e)))
            .chain(self.require_paths.iter().map(|e| ("require path", e)));
        for (field, value) in relative {
            if !is_plain_relative(value) {
                return Err(invalid(format!("{field} must be a relative path: {value}")));
            }
        }

        Ok(())
    }

    /// Serialize for the `specifications/` directory
    ///
    /// # Errors
    ///
    /// Returns an error if TOML serialization fails.
    pub fn to_toml_string(&self) -> Result<String, rgem_errors::Error> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Read back a persisted specification
    ///
    /// # Errors
    ///
    /// Returns `PackageError::InvalidSpecification` if the text is not a valid
    /// specification.
    pub fn from_toml_str(input: &str) -> Result<Self, PackageError> {
        toml::from_str(input).map_err(|e| PackageError::InvalidSpecification {
            message: e.to_string(),
        })
    }
}

impl fmt::Display for Specification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

fn is_plain_relative(value: &str) -> bool {
    let path = Path::new(value);
    !value.is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
