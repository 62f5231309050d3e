//! Archive file entries

use std::fmt;

/// One file from a package archive, as produced by the archive reader
#[derive(Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Path relative to the package root, `/` separated
    pub path: String,
    pub contents: Vec<u8>,
    /// Unix permission bits to apply after writing
    pub mode: Option<u32>,
}

impl FileEntry {
    pub fn new(path: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
            mode: None,
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: u32) -> Self {
        self.mode = Some(mode);
        self
    }
}

// Contents can be large binaries, only their size is interesting in logs
impl fmt::Debug for FileEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileEntry")
            .field("path", &self.path)
            .field("len", &self.contents.len())
            .field("mode", &self.mode.map(|m| format!("{m:o}")))
            .finish()
    }
}
