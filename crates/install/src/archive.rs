//! Boundary to the package archive reader
//!
//! Container parsing lives outside this crate. A reader turns an archive
//! path into metadata plus ordered file entries.

use rgem_errors::PackageError;
use rgem_types::{FileEntry, Specification};
use std::path::Path;

/// A parsed package archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageArchive {
    pub specification: Specification,
    pub entries: Vec<FileEntry>,
}

impl PackageArchive {
    pub fn new(specification: Specification, entries: Vec<FileEntry>) -> Self {
        Self {
            specification,
            entries,
        }
    }
}

/// Reads an archive file into a [`PackageArchive`]
pub trait ArchiveReader {
    /// # Errors
    ///
    /// Returns `PackageError::InvalidFormat` when the archive is malformed.
    fn read(&self, path: &Path) -> Result<PackageArchive, PackageError>;
}

/// An already parsed archive reads as itself, whatever the path
impl ArchiveReader for PackageArchive {
    fn read(&self, _path: &Path) -> Result<PackageArchive, PackageError> {
        Ok(self.clone())
    }
}

impl<F> ArchiveReader for F
where
    F: Fn(&Path) -> Result<PackageArchive, PackageError>,
{
    fn read(&self, path: &Path) -> Result<PackageArchive, PackageError> {
        self(path)
    }
}
