//! Process-level facts an install depends on

use rgem_builder::BuildSettings;
use rgem_config::{Config, Platform};
use rgem_errors::{ConfigError, Error};
use rgem_types::{parse_version, Version};
use std::ffi::OsString;
use std::path::PathBuf;

/// Version of this installer, checked against `required_tool_version`
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// The runtime, tool and directories installs are performed against
#[derive(Debug, Clone)]
pub struct InstallEnvironment {
    /// Default install root
    pub home: PathBuf,
    /// Default launcher directory
    pub bin_dir: PathBuf,
    /// Interpreter name as matched in shebang lines
    pub runtime_name: String,
    pub runtime_executable: PathBuf,
    pub runtime_version: Version,
    pub tool_version: Version,
    pub platform: Platform,
    pub program_prefix: String,
    pub program_suffix: String,
    pub build: BuildSettings,
    /// `PATH` used to warn about an unreachable bin directory
    pub search_path: Option<OsString>,
}

impl InstallEnvironment {
    /// Build the environment from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined or a
    /// configured version is invalid.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let home = config.home()?;
        let runtime_version =
            parse_version(&config.runtime.version).map_err(|_| ConfigError::InvalidValue {
                field: "runtime.version".to_string(),
                value: config.runtime.version.clone(),
            })?;

        Ok(Self {
            bin_dir: config.bin_dir_for(&home),
            home,
            runtime_name: config.runtime.name.clone(),
            runtime_executable: config.runtime.executable.clone(),
            runtime_version,
            tool_version: tool_version(),
            platform: Platform::current(),
            program_prefix: config.install.program_prefix.clone(),
            program_suffix: config.install.program_suffix.clone(),
            build: BuildSettings::from_config(config),
            search_path: std::env::var_os("PATH"),
        })
    }

    /// Environment rooted at `home` with default runtime settings
    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        let config = Config::default();
        Self {
            bin_dir: config.bin_dir_for(&home),
            home,
            runtime_name: config.runtime.name.clone(),
            runtime_executable: config.runtime.executable.clone(),
            runtime_version: parse_version(&config.runtime.version)
                .unwrap_or_else(|_| Version::new(0, 0, 0)),
            tool_version: tool_version(),
            platform: Platform::current(),
            program_prefix: String::new(),
            program_suffix: String::new(),
            build: BuildSettings::from_config(&config),
            search_path: std::env::var_os("PATH"),
        }
    }

    /// Launcher file name for an executable
    #[must_use]
    pub fn formatted_program_name(&self, name: &str) -> String {
        format!("{}{name}{}", self.program_prefix, self.program_suffix)
    }
}

fn tool_version() -> Version {
    parse_version(TOOL_VERSION).unwrap_or_else(|_| Version::new(0, 0, 0))
}
