#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for rgem
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/rgem/config.toml)
//! - Environment variables

pub mod constants;
pub mod platform;

pub use platform::Platform;

use rgem_errors::{ConfigError, Error};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub paths: PathConfig,

    #[serde(default)]
    pub install: InstallConfig,

    #[serde(default)]
    pub runtime: RuntimeConfig,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub security: SecurityConfig,
}

/// Path configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PathConfig {
    /// Install root holding `gems/`, `specifications/` and `cache/`
    pub home: Option<PathBuf>,
    /// Where launchers go; defaults to `<home>/bin`
    pub bin_dir: Option<PathBuf>,
}

/// Install behaviour defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallConfig {
    #[serde(default = "default_wrappers")]
    pub wrappers: bool,
    #[serde(default)]
    pub env_shebang: bool,
    #[serde(default)]
    pub ignore_dependencies: bool,
    #[serde(default)]
    pub program_prefix: String,
    #[serde(default)]
    pub program_suffix: String,
}

/// The language runtime packages are installed for
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Interpreter name as it appears in shebang lines
    #[serde(default = "default_runtime_name")]
    pub name: String,
    #[serde(default = "default_runtime_executable")]
    pub executable: PathBuf,
    #[serde(default = "default_runtime_version")]
    pub version: String,
}

/// Extension build configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    #[serde(default = "default_make_program")]
    pub make_program: String,
    #[serde(default = "default_rake_program")]
    pub rake_program: String,
    /// Extra arguments passed to configure steps
    #[serde(default)]
    pub build_args: Vec<String>,
}

/// Signature policy
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SecurityConfig {
    #[serde(default)]
    pub only_signed: bool,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            wrappers: default_wrappers(),
            env_shebang: false,
            ignore_dependencies: false,
            program_prefix: String::new(),
            program_suffix: String::new(),
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            name: default_runtime_name(),
            executable: default_runtime_executable(),
            version: default_runtime_version(),
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            make_program: default_make_program(),
            rake_program: default_rake_program(),
            build_args: Vec::new(),
        }
    }
}

// Default value functions for serde
fn default_wrappers() -> bool {
    true
}

fn default_runtime_name() -> String {
    "ruby".to_string()
}

fn default_runtime_executable() -> PathBuf {
    PathBuf::from("/usr/bin/ruby")
}

fn default_runtime_version() -> String {
    "3.3.0".to_string()
}

fn default_make_program() -> String {
    "make".to_string()
}

fn default_rake_program() -> String {
    "rake".to_string()
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir
            .join(constants::CONFIG_DIR)
            .join(constants::CONFIG_FILE))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path).map_err(|_| ConfigError::NotFound {
            path: path.display().to_string(),
        })?;

        Self::from_toml_str(&contents)
    }

    /// Parse configuration text
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ParseError` for invalid TOML or mistyped values.
    pub fn from_toml_str(contents: &str) -> Result<Self, Error> {
        toml::from_str(contents)
            .map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })
            .map_err(Into::into)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if config_path.exists() {
            tracing::debug!(path = %config_path.display(), "loading configuration");
            Self::load_from_file(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path),
            None => Self::load(),
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        self.merge_vars(|key| std::env::var(key).ok())
    }

    /// Merge overrides from an arbitrary variable source
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for unparseable boolean values.
    pub fn merge_vars<F>(&mut self, lookup: F) -> Result<(), Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(home) = lookup("RGEM_HOME") {
            self.paths.home = Some(PathBuf::from(home));
        }

        if let Some(bin_dir) = lookup("RGEM_BIN_DIR") {
            self.paths.bin_dir = Some(PathBuf::from(bin_dir));
        }

        if let Some(wrappers) = lookup("RGEM_WRAPPERS") {
            self.install.wrappers = parse_bool("RGEM_WRAPPERS", wrappers)?;
        }

        if let Some(env_shebang) = lookup("RGEM_ENV_SHEBANG") {
            self.install.env_shebang = parse_bool("RGEM_ENV_SHEBANG", env_shebang)?;
        }

        if let Some(runtime) = lookup("RGEM_RUNTIME") {
            let path = PathBuf::from(&runtime);
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                self.runtime.name = name.to_string();
            }
            self.runtime.executable = path;
        }

        if let Some(version) = lookup("RGEM_RUNTIME_VERSION") {
            self.runtime.version = version;
        }

        if let Some(make) = lookup("MAKE") {
            if !make.trim().is_empty() {
                self.build.make_program = make;
            }
        }

        Ok(())
    }

    /// Get the install root (with default)
    ///
    /// # Errors
    ///
    /// Returns an error if no home is configured and the user's home
    /// directory cannot be determined.
    pub fn home(&self) -> Result<PathBuf, Error> {
        if let Some(home) = &self.paths.home {
            return Ok(home.clone());
        }
        let user_home = dirs::home_dir().ok_or_else(|| ConfigError::NotFound {
            path: "home directory".to_string(),
        })?;
        Ok(user_home.join(constants::DEFAULT_HOME))
    }

    /// Get the bin directory for a given install root
    #[must_use]
    pub fn bin_dir_for(&self, home: &Path) -> PathBuf {
        self.paths
            .bin_dir
            .clone()
            .unwrap_or_else(|| home.join(constants::BIN_DIR))
    }
}

fn parse_bool(field: &str, value: String) -> Result<bool, Error> {
    match value.as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value,
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.install.wrappers);
        assert!(!config.install.env_shebang);
        assert_eq!(config.runtime.name, "ruby");
        assert_eq!(config.runtime.version, "3.3.0");
        assert_eq!(config.build.make_program, "make");
        assert!(!config.security.only_signed);
    }

    #[test]
    fn test_partial_file_keeps_section_defaults() {
        let config = Config::from_toml_str(
            r#"
            [install]
            env_shebang = true

            [build]
            build_args = ["--with-ssl-dir=/opt/ssl"]
            "#,
        )
        .unwrap();

        assert!(config.install.env_shebang);
        assert!(config.install.wrappers);
        assert_eq!(config.build.rake_program, "rake");
        assert_eq!(config.build.build_args, vec!["--with-ssl-dir=/opt/ssl"]);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[paths]\nhome = \"/srv/gems\"\n").unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.home().unwrap(), PathBuf::from("/srv/gems"));
        assert_eq!(
            config.bin_dir_for(Path::new("/srv/gems")),
            PathBuf::from("/srv/gems/bin")
        );

        assert!(Config::load_from_file(&dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_invalid_toml() {
        assert!(Config::from_toml_str("[install]\nwrappers = \"maybe\"").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .merge_vars(vars(&[
                ("RGEM_HOME", "/tmp/root"),
                ("RGEM_WRAPPERS", "0"),
                ("RGEM_RUNTIME", "/opt/ruby/bin/ruby3.2"),
                ("RGEM_RUNTIME_VERSION", "3.2.2"),
                ("MAKE", "gmake"),
            ]))
            .unwrap();

        assert_eq!(config.paths.home, Some(PathBuf::from("/tmp/root")));
        assert!(!config.install.wrappers);
        assert_eq!(config.runtime.name, "ruby3.2");
        assert_eq!(
            config.runtime.executable,
            PathBuf::from("/opt/ruby/bin/ruby3.2")
        );
        assert_eq!(config.runtime.version, "3.2.2");
        assert_eq!(config.build.make_program, "gmake");
    }

    #[test]
    fn test_invalid_env_bool() {
        let mut config = Config::default();
        let err = config
            .merge_vars(vars(&[("RGEM_ENV_SHEBANG", "often")]))
            .unwrap_err();
        assert!(err.to_string().contains("RGEM_ENV_SHEBANG"));
    }

    #[test]
    fn test_platform_capabilities() {
        assert!(Platform::Unix.supports_symlinks());
        assert!(!Platform::Windows.supports_symlinks());
        assert_eq!(Platform::Windows.path_separator(), ';');
    }
}
