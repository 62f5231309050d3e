//! Integration tests for error types

#[cfg(test)]
mod tests {
    use rgem_errors::*;
    use std::path::PathBuf;

    #[test]
    fn test_error_conversion() {
        let install_err = InstallError::PermissionDenied {
            path: "/opt/gems".into(),
        };
        let err: Error = install_err.into();
        assert!(matches!(err, Error::Install(_)));
        assert_eq!(err.kind(), ErrorKind::Permission);
    }

    #[test]
    fn test_error_display() {
        let err = InstallError::PathTraversal {
            path: "../../etc/passwd".into(),
            reason: "parent directory reference".into(),
        };
        assert_eq!(
            err.to_string(),
            "attempt to install file outside destination: ../../etc/passwd (parent directory reference)"
        );
    }

    #[test]
    fn test_no_builder_message_names_descriptor() {
        let err = BuildError::NoBuilder {
            descriptor: "ext/build.sh".into(),
        };
        assert_eq!(err.to_string(), "No builder for extension 'ext/build.sh'");
        assert_eq!(err.user_code(), Some("build.no_builder"));
    }

    #[test]
    fn test_extension_failure_message() {
        let err = BuildError::ExtensionFailed {
            output: "checking for zlib... no".into(),
            install_dir: PathBuf::from("/r/gems/native-1.0.0"),
            log_path: PathBuf::from("/r/gems/native-1.0.0/ext/native/gem_make.out"),
        };
        let message = err.to_string();
        assert!(message.contains("checking for zlib... no"));
        assert!(message.contains("remain installed in /r/gems/native-1.0.0"));
        assert!(message.ends_with("Results logged to /r/gems/native-1.0.0/ext/native/gem_make.out"));
        assert_eq!(Error::from(err).kind(), ErrorKind::ExtensionBuild);
    }

    #[test]
    fn test_kinds_are_distinguishable() {
        let cases: Vec<(Error, ErrorKind)> = vec![
            (
                InstallError::InvalidPackageFile {
                    path: "foo.gem".into(),
                    message: "truncated".into(),
                }
                .into(),
                ErrorKind::Format,
            ),
            (
                InstallError::DependencyUnsatisfied {
                    package: "sinatra-4.0.0".into(),
                    name: "rack".into(),
                    constraint: ">= 3.0.0".into(),
                }
                .into(),
                ErrorKind::Incompatibility,
            ),
            (
                InstallError::UnsignedPackage {
                    package: "foo-1.0.0".into(),
                }
                .into(),
                ErrorKind::Security,
            ),
            (
                InstallError::RelativeDestination {
                    path: "gems/foo-1.0.0".into(),
                }
                .into(),
                ErrorKind::InvalidArgument,
            ),
            (
                InstallError::PathTraversal {
                    path: "../evil".into(),
                    reason: "parent directory reference".into(),
                }
                .into(),
                ErrorKind::PathTraversal,
            ),
            (
                PackageError::InvalidFormat {
                    message: "bad".into(),
                }
                .into(),
                ErrorKind::Format,
            ),
            (
                ConfigError::NotFound {
                    path: "config.toml".into(),
                }
                .into(),
                ErrorKind::Config,
            ),
            (
                std::io::Error::other("disk on fire").into(),
                ErrorKind::Io,
            ),
        ];

        for (err, kind) in cases {
            assert_eq!(err.kind(), kind, "{err}");
        }
    }

    #[test]
    fn test_user_facing() {
        let err: Error = InstallError::DependencyUnsatisfied {
            package: "sinatra-4.0.0".into(),
            name: "rack".into(),
            constraint: ">= 3.0.0".into(),
        }
        .into();
        assert_eq!(err.user_code(), Some("install.dependency_unsatisfied"));
        assert!(err.user_hint().is_some());
        assert!(!err.is_retryable());

        let io = Error::io_with_path(
            &std::io::Error::from(std::io::ErrorKind::NotFound),
            "/tmp/missing",
        );
        assert!(io.is_retryable());
        assert_eq!(io.user_code(), Some("error.io"));
    }
}
