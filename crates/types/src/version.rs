//! Version parsing and constraint matching
//!
//! Versions are dotted numeric strings. Missing minor/patch parts default to
//! zero, so `1.2` and `1.2.0` are the same version.
//!
//! Constraints:
//! - `= 1.2.3` / `== 1.2.3` / `1.2.3` - Exact version
//! - `!= 1.5.0` - Exclude version
//! - `> 1.0`, `>= 1.2`, `< 2.0`, `<= 2.0.0` - Comparisons
//! - `~> 1.2` - Pessimistic (>= 1.2, < 2.0); `~> 1.2.3` means (>= 1.2.3, < 1.3.0)
//! - Multiple constraints: `>= 1.2, < 2.0, != 1.5.0`

use rgem_errors::VersionError;
use semver::Version;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Parse a possibly shortened version string (`1`, `1.2`, `1.2.3-rc1`)
///
/// Up to four numeric release segments are accepted. The first three map to
/// major, minor and patch; a fourth is kept as build metadata, so
/// `1.2.3.4` sorts after `1.2.3` and before `1.2.4`. A dotted segment that
/// starts with a letter begins the pre-release, so `2.0.0.pre` parses as
/// `2.0.0-pre` and sorts before `2.0.0`.
///
/// # Errors
///
/// Returns `VersionError::InvalidVersion` if the input is not a dotted
/// version of that shape.
pub fn parse_version(input: &str) -> Result<Version, VersionError> {
    let (version, _) = parse_with_precision(input)?;
    Ok(version)
}

/// Parse a version and report how many release segments were written out
fn parse_with_precision(input: &str) -> Result<(Version, u8), VersionError> {
    let trimmed = input.trim();
    let invalid = || VersionError::InvalidVersion {
        input: input.to_string(),
    };

    let split = trimmed.find(['-', '+']).unwrap_or(trimmed.len());
    let (release, suffix) = trimmed.split_at(split);

    let segments: Vec<&str> = release.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(invalid());
    }

    let numeric = segments
        .iter()
        .take_while(|s| s.bytes().all(|b| b.is_ascii_digit()))
        .count();
    let (numbers, dotted_pre) = segments.split_at(numeric);
    if numbers.is_empty()
        || numbers.len() > 4
        || dotted_pre
            .first()
            .is_some_and(|s| !s.starts_with(|c: char| c.is_ascii_alphabetic()))
    {
        return Err(invalid());
    }

    let (core, extra) = numbers.split_at(numbers.len().min(3));
    let mut padded = core.join(".");
    for _ in core.len()..3 {
        padded.push_str(".0");
    }
    if !dotted_pre.is_empty() {
        if suffix.starts_with('-') {
            return Err(invalid());
        }
        padded.push('-');
        padded.push_str(&dotted_pre.join("."));
    }
    if !extra.is_empty() {
        if suffix.contains('+') {
            return Err(invalid());
        }
        padded.push('+');
        padded.push_str(&extra.join("."));
    }
    padded.push_str(suffix);

    let version = Version::parse(&padded).map_err(|e| VersionError::ParseError {
        message: format!("{input}: {e}"),
    })?;
    let precision = u8::try_from(numbers.len()).unwrap_or(4);
    Ok((version, precision))
}

/// A single version constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionConstraint {
    Exact(Version),
    NotEqual(Version),
    Greater(Version),
    GreaterEqual(Version),
    Less(Version),
    LessEqual(Version),
    /// `~>`: at least `version`, below the next release at `precision - 1` segments
    Pessimistic { version: Version, precision: u8 },
}

impl VersionConstraint {
    /// Check if a version satisfies this constraint
    #[must_use]
    pub fn matches(&self, version: &Version) -> bool {
        match self {
            Self::Exact(v) => version == v,
            Self::NotEqual(v) => version != v,
            Self::Greater(v) => version > v,
            Self::GreaterEqual(v) => version >= v,
            Self::Less(v) => version < v,
            Self::LessEqual(v) => version <= v,
            Self::Pessimistic { version: v, .. } => {
                version >= v
                    && self
                        .pessimistic_ceiling()
                        .is_none_or(|ceiling| *version < ceiling)
            }
        }
    }

    /// Exclusive upper bound of a pessimistic constraint
    ///
    /// `None` when bumping the segment would overflow, leaving the range
    /// unbounded above.
    fn pessimistic_ceiling(&self) -> Option<Version> {
        match self {
            Self::Pessimistic { version, precision } if *precision >= 4 => version
                .patch
                .checked_add(1)
                .map(|patch| Version::new(version.major, version.minor, patch)),
            Self::Pessimistic { version, precision: 3 } => version
                .minor
                .checked_add(1)
                .map(|minor| Version::new(version.major, minor, 0)),
            Self::Pessimistic { version, .. } => version
                .major
                .checked_add(1)
                .map(|major| Version::new(major, 0, 0)),
            _ => None,
        }
    }

    /// Parse a single constraint from a string
    fn parse(s: &str) -> Result<Self, VersionError> {
        let s = s.trim();
        let operators: [(&str, fn(Version, u8) -> Self); 9] = [
            ("~>", |v, p| Self::Pessimistic {
                version: v,
                precision: p,
            }),
            ("~=", |v, p| Self::Pessimistic {
                version: v,
                precision: p,
            }),
            (">=", |v, _| Self::GreaterEqual(v)),
            ("<=", |v, _| Self::LessEqual(v)),
            ("!=", |v, _| Self::NotEqual(v)),
            ("==", |v, _| Self::Exact(v)),
            (">", |v, _| Self::Greater(v)),
            ("<", |v, _| Self::Less(v)),
            ("=", |v, _| Self::Exact(v)),
        ];

        for (op, build) in operators {
            if let Some(rest) = s.strip_prefix(op) {
                let (version, precision) = parse_with_precision(rest)?;
                return Ok(build(version, precision));
            }
        }

        // A bare version is an exact requirement
        if s.starts_with(|c: char| c.is_ascii_digit()) {
            let (version, _) = parse_with_precision(s)?;
            return Ok(Self::Exact(version));
        }

        Err(VersionError::InvalidConstraint {
            input: s.to_string(),
        })
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(v) => write!(f, "= {v}"),
            Self::NotEqual(v) => write!(f, "!= {v}"),
            Self::Greater(v) => write!(f, "> {v}"),
            Self::GreaterEqual(v) => write!(f, ">= {v}"),
            Self::Less(v) => write!(f, "< {v}"),
            Self::LessEqual(v) => write!(f, "<= {v}"),
            Self::Pessimistic { version, precision } => {
                let parts = [version.major, version.minor, version.patch];
                let shown: Vec<String> = parts
                    .iter()
                    .take(usize::from((*precision).clamp(1, 3)))
                    .map(ToString::to_string)
                    .collect();
                write!(f, "~> {}", shown.join("."))?;
                if *precision >= 4 && !version.build.is_empty() {
                    write!(f, ".{}", version.build)?;
                }
                if !version.pre.is_empty() {
                    write!(f, "-{}", version.pre)?;
                }
                Ok(())
            }
        }
    }
}

/// A version requirement made of zero or more constraints that must all hold
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionSpec {
    constraints: Vec<VersionConstraint>,
}

impl VersionSpec {
    /// A requirement every version satisfies
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Create a version spec from a single constraint
    #[must_use]
    pub fn single(constraint: VersionConstraint) -> Self {
        Self {
            constraints: vec![constraint],
        }
    }

    /// Create an exact version spec
    #[must_use]
    pub fn exact(version: Version) -> Self {
        Self::single(VersionConstraint::Exact(version))
    }

    /// Check if a version satisfies all constraints
    #[must_use]
    pub fn matches(&self, version: &Version) -> bool {
        self.constraints.iter().all(|c| c.matches(version))
    }

    /// Get the constraints
    #[must_use]
    pub fn constraints(&self) -> &[VersionConstraint] {
        &self.constraints
    }

    /// Check if this spec has any constraints
    #[must_use]
    pub fn is_any(&self) -> bool {
        self.constraints.is_empty()
    }
}

impl FromStr for VersionSpec {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if s.is_empty() || s == "*" {
            return Ok(Self::any());
        }

        let constraints = s
            .split(',')
            .map(VersionConstraint::parse)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { constraints })
    }
}

impl TryFrom<String> for VersionSpec {
    type Error = VersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<VersionSpec> for String {
    fn from(spec: VersionSpec) -> Self {
        spec.to_string()
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.constraints.is_empty() {
            write!(f, ">= 0")
        } else {
            let strs: Vec<_> = self.constraints.iter().map(ToString::to_string).collect();
            write!(f, "{}", strs.join(", "))
        }
    }
}

/// Serde adapter that accepts shortened versions (`1.2`) on input
pub mod lenient {
    use semver::Version;
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::missing_errors_doc)]
    pub fn serialize<S>(version: &Version, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(&version.to_string())
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Version, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_version(&raw).map_err(serde::de::Error::custom)
    }
}
