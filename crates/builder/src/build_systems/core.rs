//! Shared inputs of an extension build

use crate::utils::executor::run_command;
use rgem_config::Config;
use rgem_errors::Error;
use rgem_events::{EventEmitter, EventSender};
use std::path::{Path, PathBuf};

/// Programs and arguments used by every builder
#[derive(Debug, Clone)]
pub struct BuildSettings {
    /// Interpreter used to run `extconf` and `mkrf_conf` scripts
    pub runtime: PathBuf,
    pub make_program: String,
    pub rake_program: String,
    /// Extra arguments forwarded to configure steps
    pub build_args: Vec<String>,
    /// Extra environment for build commands
    pub env: Vec<(String, String)>,
}

impl BuildSettings {
    /// Derive settings from the loaded configuration
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            runtime: config.runtime.executable.clone(),
            make_program: config.build.make_program.clone(),
            rake_program: config.build.rake_program.clone(),
            build_args: config.build.build_args.clone(),
            env: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_build_args(mut self, args: Vec<String>) -> Self {
        self.build_args = args;
        self
    }
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Everything a builder needs for one descriptor
#[derive(Debug, Clone, Copy)]
pub struct BuildJob<'a> {
    /// Full name of the package being built, for reporting
    pub package: &'a str,
    /// Absolute path of the descriptor
    pub descriptor: &'a Path,
    /// Directory containing the descriptor; commands run here
    pub build_dir: &'a Path,
    /// Package install directory (`gems/<full-name>`)
    pub install_dir: &'a Path,
    /// Where compiled artifacts are installed
    pub lib_dir: &'a Path,
    pub settings: &'a BuildSettings,
    pub events: Option<&'a EventSender>,
}

impl BuildJob<'_> {
    /// File name of the descriptor, as passed to the interpreter
    #[must_use]
    pub fn descriptor_name(&self) -> String {
        self.descriptor
            .file_name()
            .map_or_else(
                || self.descriptor.display().to_string(),
                |n| n.to_string_lossy().into_owned(),
            )
    }

    /// `RUBYARCHDIR=<lib> RUBYLIBDIR=<lib>`
    #[must_use]
    pub fn destination_args(&self) -> Vec<String> {
        let lib = self.lib_dir.display();
        vec![format!("RUBYARCHDIR={lib}"), format!("RUBYLIBDIR={lib}")]
    }

    /// Run a command in the build directory
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned or fails.
    pub fn run(&self, program: &str, args: &[String], output: &mut Vec<String>) -> Result<(), Error> {
        run_command(self, program, args, self.build_dir, output)
    }

    /// Run the runtime on the descriptor with the configured build arguments
    ///
    /// # Errors
    ///
    /// Returns an error if the script fails.
    pub fn run_descriptor(&self, output: &mut Vec<String>) -> Result<(), Error> {
        let mut args = vec![self.descriptor_name()];
        args.extend(self.settings.build_args.iter().cloned());
        let runtime = self.settings.runtime.to_string_lossy();
        self.run(&runtime, &args, output)
    }

    /// `make` followed by `make install`, each with `extra` appended
    ///
    /// # Errors
    ///
    /// Returns an error if either make invocation fails.
    pub fn make(&self, extra: &[String], output: &mut Vec<String>) -> Result<(), Error> {
        let make = &self.settings.make_program;
        self.run(make, extra, output)?;

        let mut install = vec!["install".to_string()];
        install.extend(extra.iter().cloned());
        self.run(make, &install, output)
    }
}

impl EventEmitter for BuildJob<'_> {
    fn event_sender(&self) -> Option<&EventSender> {
        self.events
    }

    fn correlation_id(&self) -> Option<&str> {
        Some(self.package)
    }
}
