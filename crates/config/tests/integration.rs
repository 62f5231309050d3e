//! Integration tests for config

#[cfg(test)]
mod tests {
    use rgem_config::*;
    use std::io::Write;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Mutex to ensure env var tests don't run concurrently
    static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[paths]
home = "/srv/rgem"
bin_dir = "/usr/local/bin"

[install]
wrappers = false
program_suffix = "3.3"

[runtime]
name = "ruby"
executable = "/opt/ruby/bin/ruby"
version = "3.3.4"

[build]
make_program = "gmake"

[security]
only_signed = true
"#
        )
        .unwrap();

        let config = Config::load_or_default(Some(temp_file.path())).unwrap();
        assert_eq!(config.home().unwrap(), PathBuf::from("/srv/rgem"));
        assert_eq!(
            config.bin_dir_for(Path::new("/srv/rgem")),
            PathBuf::from("/usr/local/bin")
        );
        assert!(!config.install.wrappers);
        assert_eq!(config.install.program_suffix, "3.3");
        assert_eq!(config.runtime.executable, PathBuf::from("/opt/ruby/bin/ruby"));
        assert_eq!(config.build.make_program, "gmake");
        assert_eq!(config.build.rake_program, "rake");
        assert!(config.security.only_signed);
    }

    #[test]
    fn test_env_overrides_file() {
        let _guard = ENV_TEST_MUTEX
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let mut config = Config::from_toml_str("[paths]\nhome = \"/srv/rgem\"\n").unwrap();
        std::env::set_var("RGEM_HOME", "/tmp/rgem-env-home");
        std::env::set_var("RGEM_ENV_SHEBANG", "yes");
        let merged = config.merge_env();
        std::env::remove_var("RGEM_HOME");
        std::env::remove_var("RGEM_ENV_SHEBANG");

        merged.unwrap();
        assert_eq!(config.home().unwrap(), PathBuf::from("/tmp/rgem-env-home"));
        assert!(config.install.env_shebang);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load_or_default(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(err.to_string().contains("nope.toml"));
    }

    #[test]
    fn test_current_platform() {
        let platform = Platform::current();
        assert_eq!(platform.is_windows(), cfg!(windows));
        assert_eq!(platform.supports_symlinks(), !cfg!(windows));
    }
}
