use std::collections::{BTreeSet, HashMap};

use depot_core::{Coordinate, DeclaredDependency};
use depot_util::errors::DepotError;
use depot_util::DepotResult;

use crate::ArtifactRepository;

/// In-memory artifact repository backed by a declaration table.
///
/// Serves tests and CLI universe fixtures; coordinates not present in the
/// table behave like unpublished versions.
#[derive(Debug, Default)]
pub struct FixtureRepository {
    declarations: HashMap<String, Vec<DeclaredDependency>>,
}

impl FixtureRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a published coordinate with its declared dependencies.
    pub fn publish(&mut self, coordinate: Coordinate, deps: Vec<DeclaredDependency>) {
        self.declarations.insert(coordinate.owner_key(), deps);
    }

    pub fn contains(&self, coordinate: &Coordinate) -> bool {
        self.declarations.contains_key(&coordinate.owner_key())
    }
}

impl ArtifactRepository for FixtureRepository {
    fn find_dependencies(
        &self,
        group: &str,
        artifact: &str,
        version: &str,
    ) -> DepotResult<BTreeSet<DeclaredDependency>> {
        let key = format!("{group}:{artifact}:{version}");
        match self.declarations.get(&key) {
            Some(deps) => Ok(deps.iter().cloned().collect()),
            None => Err(DepotError::MissingCoordinate { coordinate: key }.into()),
        }
    }
}
