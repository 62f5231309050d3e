//! Integration tests for types

#[cfg(test)]
mod tests {
    use rgem_types::*;
    use std::str::FromStr;

    fn v(s: &str) -> Version {
        parse_version(s).unwrap()
    }

    #[test]
    fn test_version_spec_complex() {
        let spec = VersionSpec::from_str(">= 1.2.0, < 2.0.0, != 1.5.0").unwrap();

        assert!(!spec.matches(&v("1.1.9")));
        assert!(spec.matches(&v("1.2.0")));
        assert!(spec.matches(&v("1.4.9")));
        assert!(!spec.matches(&v("1.5.0"))); // Excluded
        assert!(spec.matches(&v("1.5.1")));
        assert!(spec.matches(&v("1.9.9")));
        assert!(!spec.matches(&v("2.0.0")));
    }

    #[test]
    fn test_pessimistic_ranges() {
        let minor = VersionSpec::from_str("~> 2.2").unwrap();
        assert!(minor.matches(&v("2.2.0")));
        assert!(minor.matches(&v("2.9.1")));
        assert!(!minor.matches(&v("3.0.0")));

        let patch = VersionSpec::from_str("~> 2.2.8").unwrap();
        assert!(patch.matches(&v("2.2.10")));
        assert!(!patch.matches(&v("2.3.0")));
    }

    #[test]
    fn test_specification_toml_round_trip() {
        let spec = Specification::new("nokogiri", v("1.16.0"))
            .with_platform("x86_64-linux")
            .with_executable("nokogiri")
            .with_extension("ext/nokogiri/extconf.rb")
            .with_dependency(Dependency::parse("racc ~> 1.4").unwrap())
            .with_required_runtime_version(">= 3.0".parse().unwrap())
            .with_post_install_message("Enjoy!");

        let text = spec.to_toml_string().unwrap();
        let parsed = Specification::from_toml_str(&text).unwrap();

        assert_eq!(parsed, spec);
        assert_eq!(parsed.full_name(), "nokogiri-1.16.0-x86_64-linux");
        assert_eq!(parsed.spec_file_name(), "nokogiri-1.16.0-x86_64-linux.spec");
    }

    #[test]
    fn test_minimal_specification_defaults() {
        let spec = Specification::from_toml_str("name = \"rack\"\nversion = \"2.2\"\n").unwrap();

        assert_eq!(spec.version, v("2.2.0"));
        assert_eq!(spec.bindir, "bin");
        assert_eq!(spec.require_paths, vec!["lib"]);
        assert!(spec.dependencies.is_empty());
        assert!(spec.validate().is_ok());
    }
}
