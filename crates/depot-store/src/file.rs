use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use depot_core::{Coordinate, VersionRecord};
use depot_util::errors::DepotError;

use crate::{MemoryStore, ProjectStore};

/// JSON snapshot persistence around a [`MemoryStore`].
///
/// The snapshot is a flat map of owner key to record. Loading missing
/// files yields an empty store; saving always rewrites the whole file.
pub struct FileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl FileStore {
    pub fn open(path: &Path) -> miette::Result<Self> {
        let inner = MemoryStore::new();
        if path.is_file() {
            let raw = std::fs::read_to_string(path).map_err(DepotError::Io)?;
            let snapshot: BTreeMap<String, VersionRecord> =
                serde_json::from_str(&raw).map_err(|e| DepotError::Store {
                    message: format!("malformed snapshot {}: {e}", path.display()),
                })?;
            for (key, record) in snapshot {
                let Some(coordinate) = Coordinate::parse(&key) else {
                    tracing::warn!("skipping snapshot entry with bad key {key}");
                    continue;
                };
                inner.upsert(&coordinate, record);
            }
            tracing::debug!("loaded {} records from {}", inner.len(), path.display());
        }
        Ok(Self {
            path: path.to_path_buf(),
            inner,
        })
    }

    pub fn save(&self) -> miette::Result<()> {
        let snapshot: BTreeMap<String, VersionRecord> =
            self.inner.entries().into_iter().collect();
        let raw = serde_json::to_string_pretty(&snapshot).map_err(|e| DepotError::Store {
            message: format!("serializing snapshot: {e}"),
        })?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(DepotError::Io)?;
        }
        std::fs::write(&self.path, raw).map_err(DepotError::Io)?;
        tracing::debug!("wrote {} records to {}", self.inner.len(), self.path.display());
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProjectStore for FileStore {
    fn find(&self, group: &str, artifact: &str, version: &str) -> Option<VersionRecord> {
        self.inner.find(group, artifact, version)
    }

    fn get_dependencies(
        &self,
        coordinates: &[Coordinate],
        transitive: bool,
    ) -> std::collections::BTreeSet<Coordinate> {
        self.inner.get_dependencies(coordinates, transitive)
    }

    fn upsert(&self, coordinate: &Coordinate, record: VersionRecord) {
        self.inner.upsert(coordinate, record);
    }
}
