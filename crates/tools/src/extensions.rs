//! Extension discovery and loading.
//!
//! Extensions are task manifests. A [`ExtensionSource`] enumerates them as
//! cheap [`ExtensionDescriptor`]s; the manifest is only read when the
//! descriptor is loaded. Discovery can be re-run at any time and always
//! yields the same order for the same directory contents.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::tasks::{TaskManifest, TaskRegistry};

/// File suffix of task manifests in an extension directory.
pub const MANIFEST_SUFFIX: &str = ".toml";

/// Default extension directory, relative to the working directory.
pub const DEFAULT_TASKS_DIR: &str = "tasks";

#[derive(Error, Debug)]
pub enum ExtensionError {
    #[error("cannot read extension directory {path}: {source}")]
    Discover {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read extension {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed extension {id}: {source}")]
    Parse {
        id: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("extension {id}: {reason}")]
    Invalid { id: String, reason: String },

    #[error("task '{name}' from {id} is already registered by {existing}")]
    DuplicateTask {
        name: String,
        id: String,
        existing: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Origin {
    File(PathBuf),
    Inline(TaskManifest),
}

/// A discovered, not yet loaded, extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionDescriptor {
    pub id: String,
    origin: Origin,
}

impl ExtensionDescriptor {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let id = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            id,
            origin: Origin::File(path),
        }
    }

    pub fn inline(id: impl Into<String>, manifest: TaskManifest) -> Self {
        Self {
            id: id.into(),
            origin: Origin::Inline(manifest),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.origin {
            Origin::File(path) => Some(path),
            Origin::Inline(_) => None,
        }
    }

    /// Read and parse the manifest.
    pub fn load(&self) -> Result<TaskManifest, ExtensionError> {
        let manifest = match &self.origin {
            Origin::Inline(manifest) => manifest.clone(),
            Origin::File(path) => {
                let content = fs::read_to_string(path).map_err(|source| ExtensionError::Read {
                    path: path.clone(),
                    source,
                })?;
                toml::from_str(&content).map_err(|source| ExtensionError::Parse {
                    id: self.id.clone(),
                    source,
                })?
            }
        };
        self.check(&manifest)?;
        Ok(manifest)
    }

    fn check(&self, manifest: &TaskManifest) -> Result<(), ExtensionError> {
        let reason = if manifest.name.trim().is_empty() {
            "task name is empty"
        } else if manifest.program.trim().is_empty() {
            "task program is empty"
        } else {
            return Ok(());
        };
        Err(ExtensionError::Invalid {
            id: self.id.clone(),
            reason: reason.to_string(),
        })
    }
}

/// Enumerates extensions. Each call to `discover` starts over.
pub trait ExtensionSource {
    fn discover(&self) -> Result<Vec<ExtensionDescriptor>, ExtensionError>;
}

/// Manifests stored as files in one directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
    suffix: String,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            suffix: MANIFEST_SUFFIX.to_string(),
        }
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }
}

impl ExtensionSource for DirectorySource {
    /// List files ending in the suffix, sorted by file name. Symlinks are
    /// followed; a dangling link is an error.
    fn discover(&self) -> Result<Vec<ExtensionDescriptor>, ExtensionError> {
        let discover_err = |source| ExtensionError::Discover {
            path: self.dir.clone(),
            source,
        };

        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(discover_err)? {
            let entry = entry.map_err(discover_err)?;
            if !entry.file_name().to_string_lossy().ends_with(&self.suffix) {
                continue;
            }
            let path = entry.path();
            let metadata = fs::metadata(&path).map_err(|source| ExtensionError::Discover {
                path: path.clone(),
                source,
            })?;
            if metadata.is_file() {
                paths.push(path);
            }
        }
        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        debug!(dir = %self.dir.display(), count = paths.len(), "discovered extensions");
        Ok(paths.into_iter().map(ExtensionDescriptor::file).collect())
    }
}

/// Extensions declared in code.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    manifests: Vec<(String, TaskManifest)>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, id: impl Into<String>, manifest: TaskManifest) -> Self {
        self.manifests.push((id.into(), manifest));
        self
    }
}

impl ExtensionSource for StaticSource {
    fn discover(&self) -> Result<Vec<ExtensionDescriptor>, ExtensionError> {
        Ok(self
            .manifests
            .iter()
            .map(|(id, manifest)| ExtensionDescriptor::inline(id.clone(), manifest.clone()))
            .collect())
    }
}

/// Load every extension from `source` into `registry`, once each, in
/// discovery order. Returns the number loaded.
///
/// With `skip` set nothing is discovered. Any discovery, parse or
/// registration failure aborts loading.
pub fn load_extensions(
    source: &dyn ExtensionSource,
    skip: bool,
    registry: &mut TaskRegistry,
) -> Result<usize, ExtensionError> {
    if skip {
        info!("extension loading skipped");
        return Ok(0);
    }

    let descriptors = source.discover()?;
    for descriptor in &descriptors {
        let manifest = descriptor.load()?;
        let name = manifest.name.clone();
        registry
            .register(manifest, &descriptor.id)
            .map_err(|existing| ExtensionError::DuplicateTask {
                name: name.clone(),
                id: descriptor.id.clone(),
                existing,
            })?;
        debug!(id = %descriptor.id, task = %name, "loaded extension");
    }

    info!(count = descriptors.len(), "extensions loaded");
    Ok(descriptors.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(name: &str) -> TaskManifest {
        TaskManifest {
            name: name.to_string(),
            description: None,
            program: "true".to_string(),
            args: Vec::new(),
            network: None,
        }
    }

    #[test]
    fn test_static_source_loads_in_order() {
        let source = StaticSource::new()
            .with("builtin:b", manifest("b"))
            .with("builtin:a", manifest("a"));
        let mut registry = TaskRegistry::new();
        assert_eq!(load_extensions(&source, false, &mut registry).unwrap(), 2);
        let names: Vec<&str> = registry.iter().map(|t| t.manifest.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(registry.get("a").unwrap().origin, "builtin:a");
    }

    #[test]
    fn test_skip_loads_nothing() {
        let source = StaticSource::new().with("builtin:a", manifest("a"));
        let mut registry = TaskRegistry::new();
        assert_eq!(load_extensions(&source, true, &mut registry).unwrap(), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_skip_ignores_missing_directory() {
        let source = DirectorySource::new("/nonexistent/chainconf-tasks");
        let mut registry = TaskRegistry::new();
        assert_eq!(load_extensions(&source, true, &mut registry).unwrap(), 0);
    }

    #[test]
    fn test_missing_directory_is_fatal() {
        let source = DirectorySource::new("/nonexistent/chainconf-tasks");
        let mut registry = TaskRegistry::new();
        let err = load_extensions(&source, false, &mut registry).unwrap_err();
        assert!(matches!(err, ExtensionError::Discover { .. }));
    }

    #[test]
    fn test_duplicate_task_aborts() {
        let source = StaticSource::new()
            .with("one", manifest("deploy"))
            .with("two", manifest("deploy"));
        let mut registry = TaskRegistry::new();
        let err = load_extensions(&source, false, &mut registry).unwrap_err();
        assert!(matches!(
            err,
            ExtensionError::DuplicateTask { ref name, ref id, ref existing }
                if name == "deploy" && id == "two" && existing == "one"
        ));
    }

    #[test]
    fn test_empty_program_rejected() {
        let mut bad = manifest("x");
        bad.program = "  ".to_string();
        let err = ExtensionDescriptor::inline("bad", bad).load().unwrap_err();
        assert!(matches!(err, ExtensionError::Invalid { .. }));
    }

    #[test]
    fn test_file_descriptor_id_is_file_name() {
        let descriptor = ExtensionDescriptor::file("/some/dir/deploy.toml");
        assert_eq!(descriptor.id, "deploy.toml");
        assert_eq!(descriptor.path(), Some(Path::new("/some/dir/deploy.toml")));
    }
}
