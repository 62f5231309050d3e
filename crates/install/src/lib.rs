#![warn(clippy::pedantic)]
#![deny(clippy::all)]

//! Package installation for rgem
//!
//! This crate takes a parsed package archive through compatibility checks,
//! secure extraction, launcher generation and native extension builds, and
//! records the result in the install root.

#[macro_use]
mod macros;
mod api;
mod archive;
mod environment;
mod extract;
mod gate;
mod index;
mod installer;
pub mod stubs;

pub use archive::{ArchiveReader, PackageArchive};
pub use environment::{InstallEnvironment, TOOL_VERSION};
pub use extract::extract;
pub use gate::{check_policy, DependencyGate};
pub use index::{InstalledPackages, SpecificationIndex, StaticIndex};
pub use installer::Installer;
pub use stubs::StubGenerator;

// Re-export the public API surface from api module
pub use api::config::{SecurityPolicy, SignatureVerdict};
pub use api::context::InstallContext;
pub use api::result::InstallRecord;

// Re-export EventSender for use by macros and contexts
pub use rgem_events::EventSender;
