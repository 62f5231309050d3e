use serde::{Deserialize, Serialize};
use rgem_types::Version;
use std::path::PathBuf;
use std::time::Duration;

use super::FailureContext;

/// Stage of an install, reported on failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallPhase {
    ReadArchive,
    Policy,
    DependencyCheck,
    Permission,
    Extract,
    Stubs,
    Extensions,
    Metadata,
}

/// Installation domain events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InstallEvent {
    /// Installation started for a package
    Started {
        package: String,
        version: Version,
        install_root: PathBuf,
        force: bool,
    },

    /// Archive entries written into the package directory
    Extracted {
        package: String,
        package_dir: PathBuf,
        files: usize,
    },

    /// Launchers written into the bin directory
    StubsGenerated {
        package: String,
        bin_dir: PathBuf,
        stubs: Vec<PathBuf>,
        wrappers: bool,
    },

    /// Specification persisted under `specifications/`
    SpecificationWritten { package: String, path: PathBuf },

    /// Message the package author wants shown after install
    PostInstallMessage { package: String, message: String },

    /// Installation completed successfully
    Completed {
        package: String,
        version: Version,
        package_dir: PathBuf,
        duration: Duration,
    },

    /// Installation failed
    Failed {
        package: String,
        phase: InstallPhase,
        failure: FailureContext,
    },
}
