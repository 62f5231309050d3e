use rgem_builder::BuildResults;
use rgem_types::Specification;
use serde::Serialize;
use std::path::PathBuf;

/// A completed install
#[derive(Debug, Clone, Serialize)]
pub struct InstallRecord {
    pub specification: Specification,
    /// The persisted specification file
    pub loaded_from: PathBuf,
    /// `<root>/gems/<full-name>`
    pub package_dir: PathBuf,
    /// Files written from the archive
    pub installed_files: Vec<PathBuf>,
    /// Launchers written into the bin directory
    pub stubs: Vec<PathBuf>,
    pub extensions: BuildResults,
}

impl InstallRecord {
    #[must_use]
    pub fn full_name(&self) -> String {
        self.specification.full_name()
    }
}
