//! Wrapper script launchers

use std::path::Path;

/// Body of a wrapper that activates `package` and loads `executable`
///
/// A leading `_VERSION_` argument selects which installed version runs.
#[must_use]
pub fn wrapper_script(shebang: &str, package: &str, executable: &str) -> String {
    format!(
        r#"{shebang}
#
# This file was generated by rgem.
#
# The application '{package}' is installed as part of a package, and
# this file is here to facilitate running it.
#

require 'rubygems'

version = ">= 0"

if ARGV.first =~ /^_(.*)_$/ and Gem::Version.correct? $1 then
  version = $1
  ARGV.shift
end

gem '{package}', version
load Gem.bin_path('{package}', '{executable}', version)
"#
    )
}

/// Windows launcher that runs `wrapper` with the runtime
#[must_use]
pub fn cmd_script(runtime: &Path, wrapper: &Path) -> String {
    format!(
        "@ECHO OFF\r\n@\"{}\" \"{}\" %*\r\n",
        runtime.display(),
        wrapper.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapper_selects_version_and_loads() {
        let script = wrapper_script("#!/usr/bin/ruby -w", "rack", "rackup");
        assert!(script.starts_with("#!/usr/bin/ruby -w\n"));
        assert!(script.contains("ARGV.first =~ /^_(.*)_$/"));
        assert!(script.contains("gem 'rack', version"));
        assert!(script.contains("load Gem.bin_path('rack', 'rackup', version)"));
    }

    #[test]
    fn test_cmd_forwards_arguments() {
        let cmd = cmd_script(Path::new("C:/Ruby/bin/ruby.exe"), Path::new("C:/gems/bin/rackup"));
        assert_eq!(cmd, "@ECHO OFF\r\n@\"C:/Ruby/bin/ruby.exe\" \"C:/gems/bin/rackup\" %*\r\n");
    }
}
