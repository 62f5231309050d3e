//! Interpreter directive for generated wrappers

use regex::Regex;
use std::path::Path;

/// Compute the wrapper's `#!` line from the executable's first line
///
/// - `env_shebang`: always `#!/usr/bin/env <runtime>`
/// - a directive that names the runtime: the interpreter token is replaced
///   by `runtime_executable`, trailing flags are kept
/// - any other directive is kept as is
/// - no directive: `#!<runtime_executable>`
#[must_use]
pub fn shebang(
    first_line: Option<&str>,
    runtime_name: &str,
    runtime_executable: &Path,
    env_shebang: bool,
) -> String {
    if env_shebang {
        return format!("#!/usr/bin/env {runtime_name}");
    }

    let interpreter = format!("#!{}", runtime_executable.display());
    let Some(line) = first_line.map(str::trim_end).filter(|l| l.starts_with("#!")) else {
        return interpreter;
    };

    let pattern = format!(r"\A#!.*?{}\S*", regex::escape(runtime_name));
    match Regex::new(&pattern) {
        Ok(re) => re
            .replace(line, regex::NoExpand(&interpreter))
            .trim()
            .to_string(),
        Err(_) => line.to_string(),
    }
}

/// First line of `contents`, without the line terminator
#[must_use]
pub fn first_line(contents: &[u8]) -> Option<String> {
    let end = contents
        .iter()
        .position(|&b| b == b'\n')
        .unwrap_or(contents.len());
    let line = String::from_utf8_lossy(&contents[..end]);
    (!line.is_empty()).then(|| line.trim_end_matches('\r').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const RUBY: &str = "/opt/ruby/bin/ruby";

    fn rewrite(line: Option<&str>) -> String {
        shebang(line, "ruby", Path::new(RUBY), false)
    }

    #[test]
    fn test_env_line_keeps_flags() {
        assert_eq!(rewrite(Some("#!/usr/bin/env ruby -w")), "#!/opt/ruby/bin/ruby -w");
    }

    #[test]
    fn test_versioned_interpreter_is_replaced() {
        assert_eq!(
            rewrite(Some("#!/usr/local/bin/ruby1.9 --disable-gems")),
            "#!/opt/ruby/bin/ruby --disable-gems"
        );
        assert_eq!(rewrite(Some("#!/usr/bin/ruby\r")), "#!/opt/ruby/bin/ruby");
    }

    #[test]
    fn test_missing_directive_is_synthesized() {
        assert_eq!(rewrite(None), "#!/opt/ruby/bin/ruby");
        assert_eq!(rewrite(Some("puts 'hi'")), "#!/opt/ruby/bin/ruby");
    }

    #[test]
    fn test_foreign_interpreter_is_kept() {
        assert_eq!(rewrite(Some("#!/bin/sh -e  ")), "#!/bin/sh -e");
    }

    #[test]
    fn test_env_shebang_ignores_original() {
        assert_eq!(
            shebang(Some("#!/usr/bin/ruby -w"), "ruby", Path::new(RUBY), true),
            "#!/usr/bin/env ruby"
        );
    }

    #[test]
    fn test_first_line() {
        assert_eq!(first_line(b"#!/usr/bin/env ruby\r\nputs 1\n").as_deref(), Some("#!/usr/bin/env ruby"));
        assert_eq!(first_line(b"").as_deref(), None);
        assert_eq!(first_line(b"single").as_deref(), Some("single"));
    }
}
