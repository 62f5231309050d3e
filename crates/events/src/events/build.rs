use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::FailureContext;

/// Native extension build strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildSystem {
    ExtConf,
    Configure,
    Rake,
}

/// Extension build events for the event system
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BuildEvent {
    /// Building an extension descriptor started
    Started {
        package: String,
        descriptor: PathBuf,
        build_system: BuildSystem,
    },

    /// External command launched
    CommandStarted {
        package: String,
        command: String,
        working_dir: PathBuf,
    },

    /// Descriptor that matched no builder
    NoBuilder { package: String, descriptor: PathBuf },

    /// Descriptor skipped after a rake build already ran
    Skipped {
        package: String,
        descriptor: PathBuf,
        reason: String,
    },

    /// Extension built
    Completed {
        package: String,
        descriptor: PathBuf,
        duration: Duration,
    },

    /// Extension build failed; `log_path` holds the transcript
    Failed {
        package: String,
        descriptor: PathBuf,
        log_path: PathBuf,
        failure: FailureContext,
    },
}
