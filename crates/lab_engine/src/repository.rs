use std::fs;
use std::path::{Path, PathBuf};

use lab_core::{EndpointSummary, VersionSelector};
use lab_logging::lab_warn;

use crate::InputError;

const VERSION_PREFIX: &str = "version";

/// On-disk model tree: `<root>/<endpoint>/versionNNNN/`.
#[derive(Debug, Clone)]
pub struct ModelRepository {
    root: PathBuf,
}

impl ModelRepository {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn endpoint_dir(&self, endpoint: &str) -> PathBuf {
        self.root.join(endpoint)
    }

    pub fn version_dir(&self, endpoint: &str, version: u32) -> PathBuf {
        self.endpoint_dir(endpoint)
            .join(format!("{VERSION_PREFIX}{version:04}"))
    }

    /// Version numbers of `endpoint`, ascending.
    pub fn versions(&self, endpoint: &str) -> Result<Vec<u32>, InputError> {
        let dir = self.endpoint_dir(endpoint);
        let entries =
            fs::read_dir(&dir).map_err(|_| InputError::UnknownEndpoint(endpoint.to_string()))?;
        let mut versions: Vec<u32> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| parse_version_dir(&entry.file_name().to_string_lossy()))
            .collect();
        versions.sort_unstable();
        Ok(versions)
    }

    /// Resolves a version selector to an existing version directory.
    pub fn resolve(
        &self,
        endpoint: &str,
        selector: VersionSelector,
    ) -> Result<PathBuf, InputError> {
        let versions = self.versions(endpoint)?;
        let version = match selector {
            VersionSelector::Last => *versions
                .last()
                .ok_or_else(|| InputError::NoVersions(endpoint.to_string()))?,
            VersionSelector::Number(version) if versions.contains(&version) => version,
            VersionSelector::Number(version) => {
                return Err(InputError::UnknownVersion {
                    endpoint: endpoint.to_string(),
                    version,
                })
            }
        };
        Ok(self.version_dir(endpoint, version))
    }

    /// All endpoints with at least one version directory, sorted by name.
    pub fn list(&self) -> Vec<EndpointSummary> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) => {
                lab_warn!("Cannot list models under {:?}: {}", self.root, err);
                return Vec::new();
            }
        };
        let mut endpoints: Vec<EndpointSummary> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().into_owned();
                let versions = self.versions(&name).ok()?;
                (!versions.is_empty()).then_some(EndpointSummary { name, versions })
            })
            .collect();
        endpoints.sort_by(|a, b| a.name.cmp(&b.name));
        endpoints
    }

    /// Files in a version directory matching `<prefix>*.<extension>`, sorted.
    pub fn artifacts(
        &self,
        endpoint: &str,
        version: u32,
        prefix: &str,
        extension: &str,
    ) -> Vec<PathBuf> {
        let dir = self.version_dir(endpoint, version);
        let Ok(entries) = fs::read_dir(&dir) else {
            return Vec::new();
        };
        let mut files: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path.extension().is_some_and(|ext| ext == extension)
                    && path
                        .file_name()
                        .is_some_and(|name| name.to_string_lossy().starts_with(prefix))
            })
            .collect();
        files.sort();
        files
    }

    /// Named files of a version directory that exist on disk.
    pub fn existing_files(&self, endpoint: &str, version: u32, names: &[&str]) -> Vec<PathBuf> {
        let dir = self.version_dir(endpoint, version);
        names
            .iter()
            .map(|name| dir.join(name))
            .filter(|path| path.is_file())
            .collect()
    }
}

fn parse_version_dir(name: &str) -> Option<u32> {
    let digits = name.strip_prefix(VERSION_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_dir_names_parse() {
        assert_eq!(parse_version_dir("version0000"), Some(0));
        assert_eq!(parse_version_dir("version0012"), Some(12));
        assert_eq!(parse_version_dir("version"), None);
        assert_eq!(parse_version_dir("version00a1"), None);
        assert_eq!(parse_version_dir("series"), None);
    }
}
