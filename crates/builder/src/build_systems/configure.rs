//! Autoconf-style `configure` scripts

use super::{BuildJob, ExtensionBuilder};
use rgem_errors::Error;

/// Runs `sh ./configure --prefix=<install_dir> <build_args>`, then make
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigureBuilder;

impl ConfigureBuilder {
    fn configure_args(job: &BuildJob<'_>) -> Vec<String> {
        let mut args = vec![format!("./{}", job.descriptor_name())];
        if !job
            .settings
            .build_args
            .iter()
            .any(|arg| arg.starts_with("--prefix="))
        {
            args.push(format!("--prefix={}", job.install_dir.display()));
        }
        args.extend(job.settings.build_args.iter().cloned());
        args
    }
}

impl ExtensionBuilder for ConfigureBuilder {
    fn build(&self, job: &BuildJob<'_>, output: &mut Vec<String>) -> Result<(), Error> {
        job.run("sh", &Self::configure_args(job), output)?;
        job.make(&[], output)
    }

    fn name(&self) -> &'static str {
        "configure"
    }
}
