//! Fixed names of the install root layout
//!
//! These are not configurable; every install root uses the same layout so a
//! root can be shared between tool versions.

/// Default install root, relative to the user's home directory
pub const DEFAULT_HOME: &str = ".rgem";

pub const GEMS_DIR: &str = "gems";
pub const SPECIFICATIONS_DIR: &str = "specifications";
pub const CACHE_DIR: &str = "cache";
pub const BIN_DIR: &str = "bin";

/// Extension of persisted specifications
pub const SPEC_EXTENSION: &str = "spec";

/// Transcript left next to a failed extension build
pub const BUILD_LOG: &str = "gem_make.out";

/// Config file location under the user's config directory
pub const CONFIG_DIR: &str = "rgem";
pub const CONFIG_FILE: &str = "config.toml";
