#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Native extension building for rgem
//!
//! Packages ship build descriptors for their native extensions. The
//! [`ExtensionDispatcher`] picks a builder for each descriptor, runs it with
//! the process inside the descriptor's directory and turns a failure into a
//! `BuildError::ExtensionFailed` that points at the `gem_make.out`
//! transcript. Builders shell out to the runtime, `make` and `rake` and
//! trust their exit status.

mod build_systems;
mod dispatcher;
mod utils;
mod workdir;

pub use build_systems::{
    BuildJob, BuildSettings, BuilderKind, BuilderRegistry, ConfigureBuilder, ExtConfBuilder,
    ExtensionBuilder, RakeBuilder,
};
pub use dispatcher::{BuildResults, ExtensionDispatcher, ExtensionOutcome, ExtensionStatus};
pub use utils::executor::{display_command, run_command};
pub use workdir::WorkingDirGuard;
