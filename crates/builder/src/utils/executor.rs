//! External command execution with transcript capture

use crate::build_systems::BuildJob;
use rgem_errors::{BuildError, Error};
use rgem_events::{AppEvent, BuildEvent, EventEmitter};
use std::path::Path;
use std::process::{Command, Stdio};

/// Render a command line the way it is echoed into the transcript
#[must_use]
pub fn display_command(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run `program args` inside `dir`, appending the command line and its output
/// to `output`
///
/// # Errors
///
/// Returns `BuildError::SpawnFailed` if the program cannot be started and
/// `BuildError::CommandFailed` if it exits unsuccessfully.
pub fn run_command(
    job: &BuildJob<'_>,
    program: &str,
    args: &[String],
    dir: &Path,
    output: &mut Vec<String>,
) -> Result<(), Error> {
    let command_line = display_command(program, args);
    output.push(command_line.clone());

    tracing::debug!(command = %command_line, dir = %dir.display(), "running build command");
    job.emit(AppEvent::Build(BuildEvent::CommandStarted {
        package: job.package.to_string(),
        command: command_line.clone(),
        working_dir: dir.to_path_buf(),
    }));

    let result = Command::new(program)
        .args(args)
        .current_dir(dir)
        .envs(job.settings.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .stdin(Stdio::null())
        .output()
        .map_err(|e| BuildError::SpawnFailed {
            command: command_line.clone(),
            message: e.to_string(),
        })?;

    append_stream(output, &result.stdout);
    append_stream(output, &result.stderr);

    if result.status.success() {
        Ok(())
    } else {
        Err(BuildError::CommandFailed {
            command: command_line,
            status: result.status.to_string(),
        }
        .into())
    }
}

fn append_stream(output: &mut Vec<String>, bytes: &[u8]) {
    let text = String::from_utf8_lossy(bytes);
    output.extend(text.lines().map(str::to_string));
}
