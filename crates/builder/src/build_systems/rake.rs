//! Rake-driven builds (`Rakefile`, `mkrf_conf`)

use super::{BuildJob, ExtensionBuilder};
use rgem_errors::Error;

/// Runs `mkrf_conf` scripts first when given one, then
/// `rake RUBYARCHDIR=<lib> RUBYLIBDIR=<lib>`
#[derive(Debug, Clone, Copy, Default)]
pub struct RakeBuilder;

impl ExtensionBuilder for RakeBuilder {
    fn build(&self, job: &BuildJob<'_>, output: &mut Vec<String>) -> Result<(), Error> {
        if job
            .descriptor_name()
            .to_ascii_lowercase()
            .contains("mkrf_conf")
        {
            job.run_descriptor(output)?;
        }
        job.run(&job.settings.rake_program, &job.destination_args(), output)
    }

    fn name(&self) -> &'static str {
        "rake"
    }
}
