//! Extension build strategies
//!
//! A package lists build descriptors (`ext/foo/extconf.rb`,
//! `ext/bar/configure`, `ext/Rakefile`). Each descriptor is classified by its
//! file name into a [`BuilderKind`] and handed to the [`ExtensionBuilder`]
//! registered for that kind.

use rgem_errors::Error;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

mod configure;
mod core;
mod ext_conf;
mod rake;

pub use configure::ConfigureBuilder;
pub use core::{BuildJob, BuildSettings};
pub use ext_conf::ExtConfBuilder;
pub use rake::RakeBuilder;

/// Build strategy selected by a descriptor's file name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuilderKind {
    ExtConf,
    Configure,
    TaskRunner,
    Unknown,
}

impl BuilderKind {
    /// Classify a descriptor by case-insensitive file name match
    ///
    /// `extconf` wins over `configure`, which wins over `Rakefile` and
    /// `mkrf_conf`.
    #[must_use]
    pub fn classify(descriptor: &Path) -> Self {
        let Some(name) = descriptor.file_name().and_then(|n| n.to_str()) else {
            return Self::Unknown;
        };
        let name = name.to_ascii_lowercase();

        if name.contains("extconf") {
            Self::ExtConf
        } else if name.contains("configure") {
            Self::Configure
        } else if name.contains("rakefile") || name.contains("mkrf_conf") {
            Self::TaskRunner
        } else {
            Self::Unknown
        }
    }

    /// Event-level name of the build system, `None` when no builder applies
    #[must_use]
    pub fn build_system(self) -> Option<rgem_events::BuildSystem> {
        match self {
            Self::ExtConf => Some(rgem_events::BuildSystem::ExtConf),
            Self::Configure => Some(rgem_events::BuildSystem::Configure),
            Self::TaskRunner => Some(rgem_events::BuildSystem::Rake),
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for BuilderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ExtConf => "extconf",
            Self::Configure => "configure",
            Self::TaskRunner => "rake",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Trait for extension build implementations
///
/// `output` already holds whatever earlier steps printed; implementations
/// append to it and leave it in place on failure so it can be written to
/// the build log.
pub trait ExtensionBuilder: Send + Sync {
    /// Run the build for `job.descriptor`
    ///
    /// # Errors
    ///
    /// Returns an error if any build command fails.
    fn build(&self, job: &BuildJob<'_>, output: &mut Vec<String>) -> Result<(), Error>;

    /// Get builder name
    fn name(&self) -> &'static str;
}

/// Registry of available extension builders
#[derive(Clone)]
pub struct BuilderRegistry {
    builders: HashMap<BuilderKind, Arc<dyn ExtensionBuilder>>,
}

impl BuilderRegistry {
    /// Create a new registry with the three standard builders
    #[must_use]
    pub fn new() -> Self {
        Self::empty()
            .with(BuilderKind::ExtConf, Arc::new(ExtConfBuilder))
            .with(BuilderKind::Configure, Arc::new(ConfigureBuilder))
            .with(BuilderKind::TaskRunner, Arc::new(RakeBuilder))
    }

    /// A registry with no builders; every descriptor becomes a diagnostic
    #[must_use]
    pub fn empty() -> Self {
        Self {
            builders: HashMap::new(),
        }
    }

    /// Register (or replace) the builder for a kind
    #[must_use]
    pub fn with(mut self, kind: BuilderKind, builder: Arc<dyn ExtensionBuilder>) -> Self {
        self.register(kind, builder);
        self
    }

    pub fn register(&mut self, kind: BuilderKind, builder: Arc<dyn ExtensionBuilder>) {
        if kind != BuilderKind::Unknown {
            self.builders.insert(kind, builder);
        }
    }

    /// Get the builder for a kind
    #[must_use]
    pub fn get(&self, kind: BuilderKind) -> Option<&dyn ExtensionBuilder> {
        self.builders.get(&kind).map(AsRef::as_ref)
    }
}

impl Default for BuilderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BuilderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self
            .builders
            .iter()
            .map(|(kind, builder)| format!("{kind}={}", builder.name()))
            .collect();
        names.sort();
        f.debug_struct("BuilderRegistry")
            .field("builders", &names)
            .finish()
    }
}
