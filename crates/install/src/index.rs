//! Installed package queries used by the dependency gate

use rgem_config::constants::{SPECIFICATIONS_DIR, SPEC_EXTENSION};
use rgem_types::{Specification, Version, VersionSpec};
use std::path::{Path, PathBuf};

/// Answers "how many installed packages satisfy this requirement?"
pub trait InstalledPackages {
    fn satisfies(&self, name: &str, requirement: &VersionSpec) -> usize;
}

impl<T: InstalledPackages + ?Sized> InstalledPackages for &T {
    fn satisfies(&self, name: &str, requirement: &VersionSpec) -> usize {
        (**self).satisfies(name, requirement)
    }
}

impl<T: InstalledPackages + ?Sized> InstalledPackages for Box<T> {
    fn satisfies(&self, name: &str, requirement: &VersionSpec) -> usize {
        (**self).satisfies(name, requirement)
    }
}

/// Fixed in-memory set of installed packages
#[derive(Debug, Clone, Default)]
pub struct StaticIndex {
    packages: Vec<(String, Version)>,
}

impl StaticIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, version: Version) -> Self {
        self.insert(name, version);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, version: Version) {
        self.packages.push((name.into(), version));
    }
}

impl InstalledPackages for StaticIndex {
    fn satisfies(&self, name: &str, requirement: &VersionSpec) -> usize {
        self.packages
            .iter()
            .filter(|(n, v)| n == name && requirement.matches(v))
            .count()
    }
}

/// Reads `specifications/*.spec` under one or more install roots
///
/// The directories are scanned on every query, so packages installed after
/// construction are seen.
#[derive(Debug, Clone, Default)]
pub struct SpecificationIndex {
    roots: Vec<PathBuf>,
}

impl SpecificationIndex {
    pub fn new(roots: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            roots: roots.into_iter().collect(),
        }
    }

    /// All readable specifications, in root order then file name order
    #[must_use]
    pub fn specifications(&self) -> Vec<Specification> {
        self.roots
            .iter()
            .flat_map(|root| read_specifications(&root.join(SPECIFICATIONS_DIR)))
            .collect()
    }
}

impl InstalledPackages for SpecificationIndex {
    fn satisfies(&self, name: &str, requirement: &VersionSpec) -> usize {
        self.specifications()
            .iter()
            .filter(|spec| spec.name == name && requirement.matches(&spec.version))
            .count()
    }
}

fn read_specifications(dir: &Path) -> Vec<Specification> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == SPEC_EXTENSION))
        .collect();
    paths.sort();

    paths
        .into_iter()
        .filter_map(|path| {
            let parsed = std::fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|text| Specification::from_toml_str(&text).map_err(|e| e.to_string()));
            match parsed {
                Ok(spec) => Some(spec),
                Err(error) => {
                    tracing::debug!(path = %path.display(), %error, "skipping unreadable specification");
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rgem_types::parse_version;

    fn req(s: &str) -> VersionSpec {
        s.parse().unwrap()
    }

    #[test]
    fn test_static_index_counts_matches() {
        let index = StaticIndex::new()
            .with("rack", parse_version("2.2.8").unwrap())
            .with("rack", parse_version("3.0.9").unwrap())
            .with("rake", parse_version("13.1").unwrap());

        assert_eq!(index.satisfies("rack", &req(">= 2.0")), 2);
        assert_eq!(index.satisfies("rack", &req("~> 3.0")), 1);
        assert_eq!(index.satisfies("rack", &req("< 2")), 0);
        assert_eq!(index.satisfies("json", &VersionSpec::any()), 0);
    }

    #[test]
    fn test_specification_index_reads_spec_files() {
        let dir = tempfile::tempdir().unwrap();
        let specs = dir.path().join(SPECIFICATIONS_DIR);
        std::fs::create_dir_all(&specs).unwrap();

        let spec = Specification::new("rake", parse_version("13.1.0").unwrap());
        std::fs::write(
            specs.join(spec.spec_file_name()),
            spec.to_toml_string().unwrap(),
        )
        .unwrap();
        std::fs::write(specs.join("broken-1.0.0.spec"), "not = [valid").unwrap();
        std::fs::write(specs.join("notes.txt"), "ignored").unwrap();

        let index = SpecificationIndex::new([dir.path().to_path_buf()]);
        assert_eq!(index.specifications().len(), 1);
        assert_eq!(index.satisfies("rake", &req(">= 13")), 1);
        assert_eq!(index.satisfies("rake", &req(">= 14")), 0);

        let missing = SpecificationIndex::new([dir.path().join("nowhere")]);
        assert_eq!(missing.satisfies("rake", &VersionSpec::any()), 0);
    }
}
