//! `extconf` scripts: generate a Makefile with the runtime, then make

use super::{BuildJob, ExtensionBuilder};
use rgem_errors::Error;

/// Runs `<runtime> extconf.rb <build_args>`, `make` and `make install`
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtConfBuilder;

impl ExtensionBuilder for ExtConfBuilder {
    fn build(&self, job: &BuildJob<'_>, output: &mut Vec<String>) -> Result<(), Error> {
        job.run_descriptor(output)?;
        job.make(&job.destination_args(), output)
    }

    fn name(&self) -> &'static str {
        "extconf"
    }
}
