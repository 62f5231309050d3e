//! Launchers for package executables
//!
//! Each declared executable gets an entry in the bin directory, either a
//! wrapper script that re-enters the runtime or a symlink into the
//! package's own version directory.

mod interpreter;
mod symlink;
mod wrapper;

pub use interpreter::{first_line, shebang};
pub use symlink::{embedded_version, link_action, LinkAction};
pub use wrapper::{cmd_script, wrapper_script};

use crate::environment::InstallEnvironment;
use rgem_errors::{Error, InstallError};
use rgem_events::{EventEmitter, EventSender};
use rgem_types::Specification;
use std::path::{Path, PathBuf};

/// Writes launchers for one package
pub struct StubGenerator<'a> {
    env: &'a InstallEnvironment,
    wrappers: bool,
    env_shebang: bool,
    event_sender: Option<&'a EventSender>,
}

impl<'a> StubGenerator<'a> {
    #[must_use]
    pub fn new(env: &'a InstallEnvironment) -> Self {
        Self {
            env,
            wrappers: true,
            env_shebang: false,
            event_sender: None,
        }
    }

    #[must_use]
    pub fn with_wrappers(mut self, wrappers: bool) -> Self {
        self.wrappers = wrappers;
        self
    }

    #[must_use]
    pub fn with_env_shebang(mut self, env_shebang: bool) -> Self {
        self.env_shebang = env_shebang;
        self
    }

    #[must_use]
    pub fn with_event_sender(mut self, sender: Option<&'a EventSender>) -> Self {
        self.event_sender = sender;
        self
    }

    /// Generate launchers in `bin_dir` for the executables of `spec`
    /// installed in `package_dir`
    ///
    /// Returns the paths of the launchers, including links left untouched.
    ///
    /// # Errors
    ///
    /// Returns `InstallError::PermissionDenied` if `bin_dir` is not writable,
    /// `InstallError::MissingExecutable` if a declared executable was not in
    /// the archive and `InstallError::FilesystemError` for other I/O failures.
    pub fn generate(
        &self,
        spec: &Specification,
        package_dir: &Path,
        bin_dir: &Path,
    ) -> Result<Vec<PathBuf>, Error> {
        if spec.executables.is_empty() {
            return Ok(Vec::new());
        }

        ensure_writable_dir(bin_dir)?;

        let sources: Vec<(String, PathBuf)> = spec
            .executables
            .iter()
            .map(|exe| source_path(package_dir, spec, exe).map(|p| (exe.clone(), p)))
            .collect::<Result<_, _>>()?;

        for (_, source) in &sources {
            make_executable(source)?;
        }

        let use_wrappers = if self.wrappers {
            true
        } else if self.env.platform.supports_symlinks() {
            false
        } else {
            self.emit_warning(
                "Unable to use symlinks on this platform, installing wrapper scripts instead",
            );
            true
        };

        let mut stubs = Vec::new();
        for (exe, source) in &sources {
            let basename = Path::new(exe)
                .file_name()
                .map_or_else(|| exe.clone(), |n| n.to_string_lossy().into_owned());
            let launcher = bin_dir.join(self.env.formatted_program_name(&basename));

            if use_wrappers {
                stubs.extend(self.write_wrapper(spec, exe, source, &launcher)?);
            } else {
                stubs.push(self.write_symlink(spec, source, &launcher)?);
            }
        }

        self.check_path(bin_dir);
        Ok(stubs)
    }

    fn write_wrapper(
        &self,
        spec: &Specification,
        exe: &str,
        source: &Path,
        launcher: &Path,
    ) -> Result<Vec<PathBuf>, Error> {
        let contents = std::fs::read(source).map_err(|e| fs_error("read", source, &e))?;
        let original = first_line(&contents);
        let directive = shebang(
            original.as_deref(),
            &self.env.runtime_name,
            &self.env.runtime_executable,
            self.env_shebang,
        );

        // A stale symlink would make the write land in the package
        remove_existing(launcher)?;
        std::fs::write(launcher, wrapper_script(&directive, &spec.name, exe))
            .map_err(|e| fs_error("write", launcher, &e))?;
        set_executable(launcher)?;
        tracing::debug!(launcher = %launcher.display(), "wrote wrapper");

        let mut written = vec![launcher.to_path_buf()];
        if self.env.platform.is_windows() {
            let mut cmd = launcher.as_os_str().to_owned();
            cmd.push(".cmd");
            let cmd = PathBuf::from(cmd);
            std::fs::write(&cmd, cmd_script(&self.env.runtime_executable, launcher))
                .map_err(|e| fs_error("write", &cmd, &e))?;
            written.push(cmd);
        }
        Ok(written)
    }

    fn write_symlink(
        &self,
        spec: &Specification,
        source: &Path,
        launcher: &Path,
    ) -> Result<PathBuf, Error> {
        match link_action(launcher, &spec.name, &spec.version) {
            LinkAction::Keep { existing } => {
                tracing::debug!(
                    launcher = %launcher.display(),
                    %existing,
                    installing = %spec.version,
                    "leaving newer symlink in place"
                );
                return Ok(launcher.to_path_buf());
            }
            LinkAction::Replace => remove_existing(launcher)?,
            LinkAction::Create => {}
        }

        symlink::create(source, launcher).map_err(|e| fs_error("symlink", launcher, &e))?;
        tracing::debug!(launcher = %launcher.display(), target = %source.display(), "linked executable");
        Ok(launcher.to_path_buf())
    }

    fn check_path(&self, bin_dir: &Path) {
        let Some(search_path) = &self.env.search_path else {
            return;
        };
        let on_path = std::env::split_paths(search_path).any(|dir| same_dir(&dir, bin_dir));
        if !on_path {
            self.emit_warning(format!(
                "You don't have {} in your PATH, executables from this package will not run.",
                bin_dir.display()
            ));
        }
    }
}

impl EventEmitter for StubGenerator<'_> {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender
    }
}

fn source_path(package_dir: &Path, spec: &Specification, exe: &str) -> Result<PathBuf, Error> {
    let path = package_dir.join(&spec.bindir).join(exe);
    if path.is_file() {
        Ok(path)
    } else {
        Err(InstallError::MissingExecutable {
            path: path.display().to_string(),
        }
        .into())
    }
}

/// Create `dir` if needed and prove it accepts new files
pub(crate) fn ensure_writable_dir(dir: &Path) -> Result<(), Error> {
    let denied = || -> Error {
        InstallError::PermissionDenied {
            path: dir.display().to_string(),
        }
        .into()
    };

    std::fs::create_dir_all(dir).map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => denied(),
        _ => fs_error("create_dir_all", dir, &e),
    })?;
    tempfile::tempfile_in(dir).map_err(|_| denied())?;
    Ok(())
}

fn same_dir(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn remove_existing(path: &Path) -> Result<(), Error> {
    match std::fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => Err(fs_error(
            "remove",
            path,
            &std::io::Error::other("a directory is in the way"),
        )),
        Ok(_) => std::fs::remove_file(path).map_err(|e| fs_error("remove", path, &e)),
        Err(_) => Ok(()),
    }
}

/// Add execute bits to an extracted executable
fn make_executable(path: &Path) -> Result<(), Error> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(path)
            .map_err(|e| fs_error("metadata", path, &e))?
            .permissions()
            .mode();
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode | 0o111))
            .map_err(|e| fs_error("chmod", path, &e))?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}

fn set_executable(path: &Path) -> Result<(), Error> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
            .map_err(|e| fs_error("chmod", path, &e))?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}

fn fs_error(operation: &str, path: &Path, err: &std::io::Error) -> Error {
    InstallError::FilesystemError {
        operation: operation.to_string(),
        path: path.display().to_string(),
        message: err.to_string(),
    }
    .into()
}
