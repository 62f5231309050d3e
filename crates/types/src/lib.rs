#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for the rgem installer
//!
//! This crate provides the data model shared by every stage of an install:
//! package specifications, dependency requirements, archive file entries and
//! version constraints.

pub mod archive;
pub mod package;
pub mod version;

// Re-export commonly used types
pub use archive::FileEntry;
pub use package::{Dependency, Specification};
pub use semver::Version;
pub use version::{parse_version, VersionConstraint, VersionSpec};
