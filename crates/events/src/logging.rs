//! Bridge from events to `tracing`

use crate::{AppEvent, BuildEvent, EventMessage, GeneralEvent, InstallEvent};
use tracing::Level;

macro_rules! at_level {
    ($level:expr, $($arg:tt)+) => {
        match $level {
            Level::ERROR => tracing::error!($($arg)+),
            Level::WARN => tracing::warn!($($arg)+),
            Level::INFO => tracing::info!($($arg)+),
            Level::DEBUG => tracing::debug!($($arg)+),
            Level::TRACE => tracing::trace!($($arg)+),
        }
    };
}

/// Log an event through `tracing` at the level recorded in its metadata
pub fn log_event(message: &EventMessage) {
    let meta = &message.meta;
    let level = meta.tracing_level();
    let source = meta.source.as_str();
    let correlation = meta.correlation_id.as_deref().unwrap_or("");

    match &message.event {
        AppEvent::General(event) => match event {
            GeneralEvent::Notice { message } => {
                at_level!(level, source, correlation, "{message}");
            }
            GeneralEvent::Warning { message, context } => {
                at_level!(level, source, correlation, context = ?context, "{message}");
            }
            GeneralEvent::Error { message, details } => {
                at_level!(level, source, correlation, details = ?details, "{message}");
            }
            GeneralEvent::DebugLog { message, context } => {
                at_level!(level, source, correlation, context = ?context, "{message}");
            }
        },

        AppEvent::Install(event) => match event {
            InstallEvent::Started {
                package,
                version,
                install_root,
                force,
            } => {
                at_level!(
                    level,
                    source,
                    correlation,
                    package = %package,
                    version = %version,
                    install_root = %install_root.display(),
                    force,
                    "Package installation started"
                );
            }
            InstallEvent::Extracted {
                package,
                package_dir,
                files,
            } => {
                at_level!(
                    level,
                    source,
                    correlation,
                    package = %package,
                    package_dir = %package_dir.display(),
                    files,
                    "Package files extracted"
                );
            }
            InstallEvent::StubsGenerated {
                package,
                bin_dir,
                stubs,
                wrappers,
            } => {
                at_level!(
                    level,
                    source,
                    correlation,
                    package = %package,
                    bin_dir = %bin_dir.display(),
                    stubs = stubs.len(),
                    wrappers,
                    "Executable stubs generated"
                );
            }
            InstallEvent::SpecificationWritten { package, path } => {
                at_level!(
                    level,
                    source,
                    correlation,
                    package = %package,
                    path = %path.display(),
                    "Specification written"
                );
            }
            InstallEvent::PostInstallMessage { package, message } => {
                at_level!(level, source, correlation, package = %package, "{message}");
            }
            InstallEvent::Completed {
                package,
                version,
                package_dir,
                duration,
            } => {
                at_level!(
                    level,
                    source,
                    correlation,
                    package = %package,
                    version = %version,
                    package_dir = %package_dir.display(),
                    duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
                    "Package installation completed"
                );
            }
            InstallEvent::Failed {
                package,
                phase,
                failure,
            } => {
                at_level!(
                    level,
                    source,
                    correlation,
                    package = %package,
                    phase = ?phase,
                    code = ?failure.code,
                    hint = ?failure.hint,
                    "Package installation failed: {}",
                    failure.message
                );
            }
        },

        AppEvent::Build(event) => match event {
            BuildEvent::Started {
                package,
                descriptor,
                build_system,
            } => {
                at_level!(
                    level,
                    source,
                    correlation,
                    package = %package,
                    descriptor = %descriptor.display(),
                    build_system = ?build_system,
                    "Building native extension"
                );
            }
            BuildEvent::CommandStarted {
                package,
                command,
                working_dir,
            } => {
                at_level!(
                    level,
                    source,
                    correlation,
                    package = %package,
                    working_dir = %working_dir.display(),
                    "{command}"
                );
            }
            BuildEvent::NoBuilder { package, descriptor } => {
                at_level!(
                    level,
                    source,
                    correlation,
                    package = %package,
                    descriptor = %descriptor.display(),
                    "No builder for extension"
                );
            }
            BuildEvent::Skipped {
                package,
                descriptor,
                reason,
            } => {
                at_level!(
                    level,
                    source,
                    correlation,
                    package = %package,
                    descriptor = %descriptor.display(),
                    "Skipped extension: {reason}"
                );
            }
            BuildEvent::Completed {
                package,
                descriptor,
                duration,
            } => {
                at_level!(
                    level,
                    source,
                    correlation,
                    package = %package,
                    descriptor = %descriptor.display(),
                    duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
                    "Extension built"
                );
            }
            BuildEvent::Failed {
                package,
                descriptor,
                log_path,
                failure,
            } => {
                at_level!(
                    level,
                    source,
                    correlation,
                    package = %package,
                    descriptor = %descriptor.display(),
                    log_path = %log_path.display(),
                    code = ?failure.code,
                    "Extension build failed"
                );
            }
        },
    }
}
