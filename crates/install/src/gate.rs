//! Compatibility checks that run before anything is written

use crate::api::config::{SecurityPolicy, SignatureVerdict};
use crate::index::InstalledPackages;
use rgem_errors::{Error, InstallError};
use rgem_types::{Specification, Version};

/// Enforce the signature policy
///
/// Runs regardless of `force`. With no policy nothing is checked.
///
/// # Errors
///
/// Returns `InstallError::SignatureInvalid` for an invalid signature and
/// `InstallError::UnsignedPackage` for an unsigned package under an
/// only-signed policy.
pub fn check_policy(
    policy: Option<&SecurityPolicy>,
    verdict: &SignatureVerdict,
    spec: &Specification,
) -> Result<(), Error> {
    let Some(policy) = policy else {
        return Ok(());
    };

    match verdict {
        SignatureVerdict::Verified => Ok(()),
        SignatureVerdict::Invalid { reason } => Err(InstallError::SignatureInvalid {
            package: spec.full_name(),
            reason: reason.clone(),
        }
        .into()),
        SignatureVerdict::Unsigned if policy.only_signed => Err(InstallError::UnsignedPackage {
            package: spec.full_name(),
        }
        .into()),
        SignatureVerdict::Unsigned => Ok(()),
    }
}

/// Runtime, tool and dependency requirements of a package
pub struct DependencyGate<'a> {
    runtime_version: &'a Version,
    tool_version: &'a Version,
    index: &'a dyn InstalledPackages,
}

impl<'a> DependencyGate<'a> {
    pub fn new(
        runtime_version: &'a Version,
        tool_version: &'a Version,
        index: &'a dyn InstalledPackages,
    ) -> Self {
        Self {
            runtime_version,
            tool_version,
            index,
        }
    }

    /// Check `spec` against the running versions and installed packages
    ///
    /// `force` skips every check; `ignore_dependencies` skips only the
    /// dependency queries.
    ///
    /// # Errors
    ///
    /// Returns the first failed requirement as an incompatibility error.
    pub fn check(
        &self,
        spec: &Specification,
        force: bool,
        ignore_dependencies: bool,
    ) -> Result<(), Error> {
        if force {
            tracing::debug!(package = %spec.full_name(), "dependency gate bypassed");
            return Ok(());
        }

        if let Some(required) = &spec.required_runtime_version {
            if !required.matches(self.runtime_version) {
                return Err(InstallError::RuntimeVersionMismatch {
                    package: spec.full_name(),
                    required: required.to_string(),
                    actual: self.runtime_version.to_string(),
                }
                .into());
            }
        }

        if let Some(required) = &spec.required_tool_version {
            if !required.matches(self.tool_version) {
                return Err(InstallError::ToolVersionMismatch {
                    package: spec.full_name(),
                    required: required.to_string(),
                    actual: self.tool_version.to_string(),
                }
                .into());
            }
        }

        if ignore_dependencies {
            return Ok(());
        }

        for dependency in &spec.dependencies {
            if self.index.satisfies(&dependency.name, &dependency.requirement) == 0 {
                return Err(InstallError::DependencyUnsatisfied {
                    package: spec.full_name(),
                    name: dependency.name.clone(),
                    constraint: dependency.requirement.to_string(),
                }
                .into());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::StaticIndex;
    use rgem_errors::ErrorKind;
    use rgem_types::{parse_version, Dependency};

    fn v(s: &str) -> Version {
        parse_version(s).unwrap()
    }

    fn spec() -> Specification {
        Specification::new("sinatra", v("4.0.0"))
            .with_dependency(Dependency::parse("rack >= 3.0").unwrap())
            .with_dependency(Dependency::parse("tilt ~> 2.0").unwrap())
    }

    #[test]
    fn test_all_dependencies_satisfied() {
        let index = StaticIndex::new()
            .with("rack", v("3.0.9"))
            .with("tilt", v("2.3.0"));
        let (runtime, tool) = (v("3.3.0"), v("0.1.0"));
        let gate = DependencyGate::new(&runtime, &tool, &index);

        assert!(gate.check(&spec(), false, false).is_ok());
    }

    #[test]
    fn test_first_missing_dependency_is_reported() {
        let index = StaticIndex::new().with("rack", v("2.2.8"));
        let (runtime, tool) = (v("3.3.0"), v("0.1.0"));
        let gate = DependencyGate::new(&runtime, &tool, &index);

        let err = gate.check(&spec(), false, false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Incompatibility);
        let message = err.to_string();
        assert!(message.contains("rack"), "{message}");
        assert!(message.contains(">= 3.0.0"), "{message}");
    }

    #[test]
    fn test_ignore_dependencies_and_force() {
        let index = StaticIndex::new();
        let (runtime, tool) = (v("2.7.0"), v("0.1.0"));
        let gate = DependencyGate::new(&runtime, &tool, &index);

        assert!(gate.check(&spec(), false, true).is_ok());

        let picky = spec().with_required_runtime_version(">= 3.0".parse().unwrap());
        assert!(gate.check(&picky, false, true).is_err());
        assert!(gate.check(&picky, true, false).is_ok());
    }

    #[test]
    fn test_runtime_checked_before_dependencies() {
        let index = StaticIndex::new();
        let (runtime, tool) = (v("2.7.0"), v("0.1.0"));
        let gate = DependencyGate::new(&runtime, &tool, &index);

        let picky = spec().with_required_runtime_version(">= 3.0".parse().unwrap());
        let err = gate.check(&picky, false, false).unwrap_err();
        assert!(matches!(
            err,
            Error::Install(InstallError::RuntimeVersionMismatch { .. })
        ));

        let tool_picky = spec().with_required_tool_version(">= 1.0".parse().unwrap());
        let err = gate.check(&tool_picky, false, true).unwrap_err();
        assert!(matches!(
            err,
            Error::Install(InstallError::ToolVersionMismatch { .. })
        ));
    }

    #[test]
    fn test_policy() {
        let spec = spec();
        let strict = SecurityPolicy::only_signed();
        let lax = SecurityPolicy::default();
        let invalid = SignatureVerdict::Invalid {
            reason: "digest mismatch".to_string(),
        };

        assert!(check_policy(None, &invalid, &spec).is_ok());
        assert!(check_policy(Some(&strict), &SignatureVerdict::Verified, &spec).is_ok());
        assert!(check_policy(Some(&lax), &SignatureVerdict::Unsigned, &spec).is_ok());

        let err = check_policy(Some(&strict), &SignatureVerdict::Unsigned, &spec).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Security);
        assert!(check_policy(Some(&lax), &invalid, &spec).is_err());
    }
}
