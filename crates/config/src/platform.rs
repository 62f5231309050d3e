//! Host platform detection

use serde::{Deserialize, Serialize};

/// Platform family the installer is running on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Unix,
    Windows,
}

impl Platform {
    /// Detect the platform this binary was compiled for
    #[must_use]
    pub fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Unix
        }
    }

    /// Whether executables need a `.cmd` launcher next to the wrapper
    #[must_use]
    pub fn is_windows(self) -> bool {
        self == Self::Windows
    }

    /// Whether stubs may be symlinks
    #[must_use]
    pub fn supports_symlinks(self) -> bool {
        !self.is_windows()
    }

    /// Separator used in the `PATH` environment variable
    #[must_use]
    pub fn path_separator(self) -> char {
        match self {
            Self::Unix => ':',
            Self::Windows => ';',
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::current()
    }
}
