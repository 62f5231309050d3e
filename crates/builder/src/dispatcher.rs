//! Runs every extension of a package through its builder

use crate::build_systems::{BuildJob, BuildSettings, BuilderKind, BuilderRegistry};
use crate::workdir::WorkingDirGuard;
use rgem_config::constants::BUILD_LOG;
use rgem_errors::{BuildError, Error, UserFacingError};
use rgem_events::{AppEvent, BuildEvent, EventEmitter, EventSender, FailureContext};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// What happened to one descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExtensionStatus {
    /// Builder succeeded; `output` is the command transcript
    Built { output: Vec<String> },
    /// No builder matched the descriptor
    NoBuilder { diagnostic: String },
    /// Not attempted because a rake build already ran
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionOutcome {
    /// Descriptor as listed in the specification
    pub descriptor: String,
    pub kind: BuilderKind,
    pub status: ExtensionStatus,
}

/// Per-descriptor outcomes in specification order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildResults {
    pub extensions: Vec<ExtensionOutcome>,
}

impl BuildResults {
    /// Descriptors that built successfully
    pub fn built(&self) -> impl Iterator<Item = &ExtensionOutcome> {
        self.extensions
            .iter()
            .filter(|e| matches!(e.status, ExtensionStatus::Built { .. }))
    }

    /// Recorded no-builder diagnostics
    pub fn diagnostics(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().filter_map(|e| match &e.status {
            ExtensionStatus::NoBuilder { diagnostic } => Some(diagnostic.as_str()),
            _ => None,
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}

/// Dispatches extension descriptors to builders
#[derive(Debug, Clone)]
pub struct ExtensionDispatcher {
    registry: BuilderRegistry,
    settings: BuildSettings,
    event_sender: Option<EventSender>,
}

impl ExtensionDispatcher {
    #[must_use]
    pub fn new(settings: BuildSettings) -> Self {
        Self {
            registry: BuilderRegistry::new(),
            settings,
            event_sender: None,
        }
    }

    /// Replace the builder table
    #[must_use]
    pub fn with_registry(mut self, registry: BuilderRegistry) -> Self {
        self.registry = registry;
        self
    }

    #[must_use]
    pub fn with_event_sender(mut self, sender: EventSender) -> Self {
        self.event_sender = Some(sender);
        self
    }

    #[must_use]
    pub fn settings(&self) -> &BuildSettings {
        &self.settings
    }

    /// Build every extension of `package` installed in `install_dir`
    ///
    /// Descriptors are relative to `install_dir`. Once a rake build has run,
    /// the remaining descriptors are skipped.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::ExtensionFailed` for the first failing build,
    /// after writing its transcript to `gem_make.out` next to the descriptor.
    /// Files already installed are left in place.
    pub fn build_all(
        &self,
        package: &str,
        install_dir: &Path,
        lib_dir: &Path,
        extensions: &[String],
    ) -> Result<BuildResults, Error> {
        let mut results = BuildResults::default();
        let mut ran_rake = false;

        for descriptor in extensions {
            let kind = BuilderKind::classify(Path::new(descriptor));

            if ran_rake {
                tracing::debug!(descriptor = %descriptor, "skipping extension after rake build");
                self.emit(AppEvent::Build(BuildEvent::Skipped {
                    package: package.to_string(),
                    descriptor: PathBuf::from(descriptor),
                    reason: "a rake build already ran for this package".to_string(),
                }));
                results.extensions.push(ExtensionOutcome {
                    descriptor: descriptor.clone(),
                    kind,
                    status: ExtensionStatus::Skipped,
                });
                continue;
            }

            let Some(builder) = self.registry.get(kind) else {
                let diagnostic = BuildError::NoBuilder {
                    descriptor: descriptor.clone(),
                }
                .to_string();
                self.emit(AppEvent::Build(BuildEvent::NoBuilder {
                    package: package.to_string(),
                    descriptor: PathBuf::from(descriptor),
                }));
                self.emit_warning(diagnostic.clone());
                results.extensions.push(ExtensionOutcome {
                    descriptor: descriptor.clone(),
                    kind,
                    status: ExtensionStatus::NoBuilder { diagnostic },
                });
                continue;
            };

            let descriptor_path = install_dir.join(descriptor);
            let build_dir = descriptor_path
                .parent()
                .map_or_else(|| install_dir.to_path_buf(), Path::to_path_buf);

            tracing::debug!(descriptor = %descriptor, builder = builder.name(), "building extension");
            if let Some(build_system) = kind.build_system() {
                self.emit(AppEvent::Build(BuildEvent::Started {
                    package: package.to_string(),
                    descriptor: descriptor_path.clone(),
                    build_system,
                }));
            }

            let job = BuildJob {
                package,
                descriptor: &descriptor_path,
                build_dir: &build_dir,
                install_dir,
                lib_dir,
                settings: &self.settings,
                events: self.event_sender.as_ref(),
            };

            let started = Instant::now();
            let mut output = Vec::new();
            let outcome = std::fs::create_dir_all(lib_dir)
                .map_err(|e| Error::io_with_path(&e, lib_dir))
                .and_then(|()| WorkingDirGuard::enter(&build_dir))
                .and_then(|_cwd| builder.build(&job, &mut output));

            if let Err(err) = outcome {
                output.push(err.user_message().into_owned());
                return Err(self.record_failure(
                    package,
                    install_dir,
                    &descriptor_path,
                    &build_dir,
                    output,
                ));
            }

            self.emit(AppEvent::Build(BuildEvent::Completed {
                package: package.to_string(),
                descriptor: descriptor_path.clone(),
                duration: started.elapsed(),
            }));
            results.extensions.push(ExtensionOutcome {
                descriptor: descriptor.clone(),
                kind,
                status: ExtensionStatus::Built { output },
            });

            if kind == BuilderKind::TaskRunner {
                ran_rake = true;
            }
        }

        Ok(results)
    }

    fn record_failure(
        &self,
        package: &str,
        install_dir: &Path,
        descriptor: &Path,
        build_dir: &Path,
        output: Vec<String>,
    ) -> Error {
        let transcript = output.join("\n");
        let log_dir = if build_dir.is_dir() {
            build_dir
        } else {
            install_dir
        };
        let log_path = log_dir.join(BUILD_LOG);

        if let Err(e) = std::fs::write(&log_path, format!("{transcript}\n")) {
            tracing::warn!(path = %log_path.display(), error = %e, "could not write build log");
        }

        let error = BuildError::ExtensionFailed {
            output: transcript,
            install_dir: install_dir.to_path_buf(),
            log_path: log_path.clone(),
        };
        self.emit(AppEvent::Build(BuildEvent::Failed {
            package: package.to_string(),
            descriptor: descriptor.to_path_buf(),
            log_path,
            failure: FailureContext::from_error(&error),
        }));
        error.into()
    }
}

impl EventEmitter for ExtensionDispatcher {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }
}
