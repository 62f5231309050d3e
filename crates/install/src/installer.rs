//! Install orchestration
//!
//! Sequences the gate, extraction, launchers, extension builds and metadata
//! persistence for one archive. Stages fail fast and nothing already written
//! is rolled back.

use crate::api::context::InstallContext;
use crate::api::result::InstallRecord;
use crate::archive::{ArchiveReader, PackageArchive};
use crate::environment::InstallEnvironment;
use crate::extract::extract;
use crate::gate::{check_policy, DependencyGate};
use crate::index::{InstalledPackages, SpecificationIndex};
use crate::stubs::{ensure_writable_dir, StubGenerator};
use rgem_builder::{BuildResults, BuilderRegistry, ExtensionDispatcher};
use rgem_config::constants::{CACHE_DIR, GEMS_DIR, SPECIFICATIONS_DIR};
use rgem_errors::{Error, InstallError};
use rgem_events::{AppEvent, EventEmitter, FailureContext, InstallEvent, InstallPhase};
use rgem_types::Specification;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Installs package archives into an install root
pub struct Installer<R> {
    env: InstallEnvironment,
    reader: R,
    index: Option<Box<dyn InstalledPackages>>,
    builders: BuilderRegistry,
}

impl<R> std::fmt::Debug for Installer<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Installer")
            .field("env", &self.env)
            .field("builders", &self.builders)
            .finish_non_exhaustive()
    }
}

impl<R: ArchiveReader> Installer<R> {
    /// Create an installer reading archives with `reader`
    ///
    /// Dependencies are checked against the specifications already
    /// installed in the target root unless an index is supplied.
    pub fn new(env: InstallEnvironment, reader: R) -> Self {
        Self {
            env,
            reader,
            index: None,
            builders: BuilderRegistry::new(),
        }
    }

    /// Answer dependency queries from `index`
    #[must_use]
    pub fn with_index(mut self, index: impl InstalledPackages + 'static) -> Self {
        self.index = Some(Box::new(index));
        self
    }

    /// Replace the extension builder table
    #[must_use]
    pub fn with_builders(mut self, builders: BuilderRegistry) -> Self {
        self.builders = builders;
        self
    }

    #[must_use]
    pub fn environment(&self) -> &InstallEnvironment {
        &self.env
    }

    /// Install the archive at `archive_path`
    ///
    /// # Errors
    ///
    /// Returns the error of the first failing stage. An
    /// `InstallEvent::Failed` naming the stage is emitted first.
    pub fn install(&self, archive_path: &Path, ctx: &InstallContext) -> Result<InstallRecord, Error> {
        let label = archive_label(archive_path);
        let archive = self
            .read_archive(archive_path)
            .map_err(|e| fail(ctx, &label, InstallPhase::ReadArchive, e))?;
        let package = archive.specification.full_name();

        let root = self
            .install_root(ctx)
            .map_err(|e| fail(ctx, &package, InstallPhase::Permission, e))?;
        ctx.emit(AppEvent::Install(InstallEvent::Started {
            package: package.clone(),
            version: archive.specification.version.clone(),
            install_root: root.clone(),
            force: ctx.force,
        }));

        let started = Instant::now();
        let record = self
            .install_archive(archive_path, archive, &root, ctx)
            .map_err(|(phase, e)| fail(ctx, &package, phase, e))?;

        ctx.emit(AppEvent::Install(InstallEvent::Completed {
            package,
            version: record.specification.version.clone(),
            package_dir: record.package_dir.clone(),
            duration: started.elapsed(),
        }));
        Ok(record)
    }

    /// Extract the archive at `archive_path` into `destination` only
    ///
    /// No compatibility checks, launchers, builds or metadata.
    ///
    /// # Errors
    ///
    /// Returns `InstallError::InvalidPackageFile` for an unreadable archive
    /// and the extractor's errors otherwise.
    pub fn unpack(&self, archive_path: &Path, destination: &Path) -> Result<Vec<PathBuf>, Error> {
        let archive = self.read_archive(archive_path)?;
        let destination = absolute(destination)?;
        let files = extract(&destination, &archive.entries)?;
        tracing::debug!(
            package = %archive.specification.full_name(),
            destination = %destination.display(),
            files = files.len(),
            "unpacked archive"
        );
        Ok(files)
    }

    fn read_archive(&self, archive_path: &Path) -> Result<PackageArchive, Error> {
        let invalid = |message: String| -> Error {
            InstallError::InvalidPackageFile {
                path: archive_path.display().to_string(),
                message,
            }
            .into()
        };

        let archive = self
            .reader
            .read(archive_path)
            .map_err(|e| invalid(e.to_string()))?;
        archive
            .specification
            .validate()
            .map_err(|e| invalid(e.to_string()))?;
        Ok(archive)
    }

    fn install_root(&self, ctx: &InstallContext) -> Result<PathBuf, Error> {
        let root = ctx.install_dir.as_deref().unwrap_or(&self.env.home);
        absolute(root)
    }

    fn bin_dir(&self, ctx: &InstallContext, root: &Path) -> Result<PathBuf, Error> {
        match (&ctx.bin_dir, &ctx.install_dir) {
            (Some(bin_dir), _) => absolute(bin_dir),
            (None, Some(_)) => Ok(root.join(rgem_config::constants::BIN_DIR)),
            (None, None) => absolute(&self.env.bin_dir),
        }
    }

    fn install_archive(
        &self,
        archive_path: &Path,
        archive: PackageArchive,
        root: &Path,
        ctx: &InstallContext,
    ) -> Result<InstallRecord, (InstallPhase, Error)> {
        let PackageArchive {
            specification: spec,
            entries,
        } = archive;
        let at = |phase: InstallPhase| move |e: Error| (phase, e);

        check_policy(ctx.security_policy.as_ref(), &ctx.signature, &spec)
            .map_err(at(InstallPhase::Policy))?;
        self.check_dependencies(&spec, root, ctx)
            .map_err(at(InstallPhase::DependencyCheck))?;

        ensure_writable_dir(root).map_err(at(InstallPhase::Permission))?;

        let package_dir = root.join(GEMS_DIR).join(spec.full_name());
        std::fs::create_dir_all(&package_dir)
            .map_err(|e| Error::io_with_path(&e, &package_dir))
            .map_err(at(InstallPhase::Extract))?;
        let installed_files = extract(&package_dir, &entries).map_err(at(InstallPhase::Extract))?;
        ctx.emit(AppEvent::Install(InstallEvent::Extracted {
            package: spec.full_name(),
            package_dir: package_dir.clone(),
            files: installed_files.len(),
        }));

        let stubs = self
            .generate_stubs(&spec, &package_dir, root, ctx)
            .map_err(at(InstallPhase::Stubs))?;

        let extensions = self
            .build_extensions(&spec, &package_dir, ctx)
            .map_err(at(InstallPhase::Extensions))?;

        let loaded_from = self
            .write_metadata(archive_path, &spec, root, ctx)
            .map_err(at(InstallPhase::Metadata))?;

        if let Some(message) = &spec.post_install_message {
            ctx.emit(AppEvent::Install(InstallEvent::PostInstallMessage {
                package: spec.full_name(),
                message: message.clone(),
            }));
        }

        Ok(InstallRecord {
            specification: spec,
            loaded_from,
            package_dir,
            installed_files,
            stubs,
            extensions,
        })
    }

    fn check_dependencies(
        &self,
        spec: &Specification,
        root: &Path,
        ctx: &InstallContext,
    ) -> Result<(), Error> {
        let default_index;
        let index: &dyn InstalledPackages = match &self.index {
            Some(index) => index.as_ref(),
            None => {
                default_index = SpecificationIndex::new([root.to_path_buf()]);
                &default_index
            }
        };

        DependencyGate::new(&self.env.runtime_version, &self.env.tool_version, index).check(
            spec,
            ctx.force,
            ctx.ignore_dependencies,
        )
    }

    fn generate_stubs(
        &self,
        spec: &Specification,
        package_dir: &Path,
        root: &Path,
        ctx: &InstallContext,
    ) -> Result<Vec<PathBuf>, Error> {
        let bin_dir = self.bin_dir(ctx, root)?;
        let stubs = StubGenerator::new(&self.env)
            .with_wrappers(ctx.wrappers)
            .with_env_shebang(ctx.env_shebang)
            .with_event_sender(ctx.event_sender.as_ref())
            .generate(spec, package_dir, &bin_dir)?;

        if !stubs.is_empty() {
            ctx.emit(AppEvent::Install(InstallEvent::StubsGenerated {
                package: spec.full_name(),
                bin_dir,
                stubs: stubs.clone(),
                wrappers: ctx.wrappers,
            }));
        }
        Ok(stubs)
    }

    fn build_extensions(
        &self,
        spec: &Specification,
        package_dir: &Path,
        ctx: &InstallContext,
    ) -> Result<BuildResults, Error> {
        if spec.extensions.is_empty() {
            return Ok(BuildResults::default());
        }

        let mut settings = self.env.build.clone();
        if !ctx.build_args.is_empty() {
            settings = settings.with_build_args(ctx.build_args.clone());
        }

        let mut dispatcher =
            ExtensionDispatcher::new(settings).with_registry(self.builders.clone());
        if let Some(sender) = &ctx.event_sender {
            dispatcher = dispatcher.with_event_sender(sender.clone());
        }

        let lib_dir = package_dir.join(spec.require_paths.first().map_or("lib", String::as_str));
        dispatcher.build_all(&spec.full_name(), package_dir, &lib_dir, &spec.extensions)
    }

    fn write_metadata(
        &self,
        archive_path: &Path,
        spec: &Specification,
        root: &Path,
        ctx: &InstallContext,
    ) -> Result<PathBuf, Error> {
        let spec_dir = root.join(SPECIFICATIONS_DIR);
        let cache_dir = root.join(CACHE_DIR);
        for dir in [&spec_dir, &cache_dir] {
            std::fs::create_dir_all(dir).map_err(|e| Error::io_with_path(&e, dir))?;
        }

        let spec_path = spec_dir.join(spec.spec_file_name());
        std::fs::write(&spec_path, spec.to_toml_string()?)
            .map_err(|e| Error::io_with_path(&e, &spec_path))?;
        ctx.emit(AppEvent::Install(InstallEvent::SpecificationWritten {
            package: spec.full_name(),
            path: spec_path.clone(),
        }));

        let cached = cache_dir.join(archive_label(archive_path));
        if cached.exists() {
            tracing::debug!(path = %cached.display(), "archive already cached");
        } else {
            std::fs::copy(archive_path, &cached)
                .map_err(|e| Error::io_with_path(&e, archive_path))?;
        }

        Ok(spec_path)
    }
}

fn fail(ctx: &InstallContext, package: &str, phase: InstallPhase, error: Error) -> Error {
    tracing::debug!(package, ?phase, %error, "install failed");
    ctx.emit(AppEvent::Install(InstallEvent::Failed {
        package: package.to_string(),
        phase,
        failure: FailureContext::from_error(&error),
    }));
    error
}

fn archive_label(archive_path: &Path) -> String {
    archive_path.file_name().map_or_else(
        || archive_path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}

fn absolute(path: &Path) -> Result<PathBuf, Error> {
    std::path::absolute(path).map_err(|e| Error::io_with_path(&e, path))
}
