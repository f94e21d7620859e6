use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

use depot_core::{Coordinate, VersionRecord};

use crate::ProjectStore;

/// In-memory project store, keyed by owner key.
///
/// Backs tests and CLI fixture universes; also the write-back target of a
/// resolution run before a snapshot is persisted.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, VersionRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(entries: Vec<(Coordinate, VersionRecord)>) -> Self {
        let store = Self::new();
        for (coordinate, record) in entries {
            store.upsert(&coordinate, record);
        }
        store
    }

    pub fn len(&self) -> usize {
        self.records.read().expect("store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of all records, sorted by owner key.
    pub fn entries(&self) -> Vec<(String, VersionRecord)> {
        let guard = self.records.read().expect("store lock poisoned");
        let mut entries: Vec<(String, VersionRecord)> = guard
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

impl ProjectStore for MemoryStore {
    fn find(&self, group: &str, artifact: &str, version: &str) -> Option<VersionRecord> {
        let key = format!("{group}:{artifact}:{version}");
        self.records
            .read()
            .expect("store lock poisoned")
            .get(&key)
            .cloned()
    }

    fn get_dependencies(
        &self,
        coordinates: &[Coordinate],
        transitive: bool,
    ) -> BTreeSet<Coordinate> {
        let guard = self.records.read().expect("store lock poisoned");
        let mut out = BTreeSet::new();
        for coordinate in coordinates {
            let Some(record) = guard.get(&coordinate.owner_key()) else {
                tracing::warn!("no stored record for {coordinate}");
                continue;
            };
            out.extend(record.direct_dependencies.iter().cloned());
            if transitive {
                out.extend(record.transitive_report.closure.iter().cloned());
            }
        }
        out
    }

    fn upsert(&self, coordinate: &Coordinate, record: VersionRecord) {
        self.records
            .write()
            .expect("store lock poisoned")
            .insert(coordinate.owner_key(), record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depot_core::DependencyReport;

    fn coord(s: &str) -> Coordinate {
        Coordinate::parse(s).unwrap()
    }

    #[test]
    fn upsert_and_find() {
        let store = MemoryStore::new();
        let c = coord("org.example:lib:1.0.0");
        store.upsert(
            &c,
            VersionRecord {
                direct_dependencies: vec![coord("org.dep:dep:1.0.0")],
                ..VersionRecord::default()
            },
        );
        let record = store.find("org.example", "lib", "1.0.0").unwrap();
        assert_eq!(record.direct_dependencies.len(), 1);
        assert!(store.find("org.example", "lib", "9.9.9").is_none());
    }

    #[test]
    fn dependencies_direct_vs_transitive() {
        let store = MemoryStore::new();
        let c = coord("org.example:lib:1.0.0");
        let direct = coord("org.dep:dep:1.0.0");
        let deep = coord("org.deep:deep:1.0.0");
        store.upsert(
            &c,
            VersionRecord {
                direct_dependencies: vec![direct.clone()],
                transitive_report: DependencyReport::valid(BTreeSet::from([
                    direct.clone(),
                    deep.clone(),
                ])),
                ..VersionRecord::default()
            },
        );

        let direct_only = store.get_dependencies(std::slice::from_ref(&c), false);
        assert_eq!(direct_only, BTreeSet::from([direct.clone()]));

        let all = store.get_dependencies(&[c], true);
        assert_eq!(all, BTreeSet::from([direct, deep]));
    }

    #[test]
    fn missing_record_contributes_nothing() {
        let store = MemoryStore::new();
        let deps = store.get_dependencies(&[coord("org.ghost:ghost:1.0.0")], true);
        assert!(deps.is_empty());
    }
}
