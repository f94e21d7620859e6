//! Universe fixtures: a TOML description of published versions, their
//! declared dependencies, and exclusion flags, loaded into the store and
//! fixture repository the commands run against.

use std::collections::BTreeSet;
use std::path::Path;

use depot_core::{Coordinate, DeclaredDependency, VersionRecord};
use depot_registry::{ArtifactRepository, FixtureRepository};
use depot_solve::DependencyProvider;
use depot_store::{MemoryStore, ProjectStore};
use depot_util::errors::DepotError;
use depot_util::DepotResult;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct UniverseFile {
    #[serde(default)]
    pub component: Vec<ComponentEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ComponentEntry {
    pub coordinate: String,
    #[serde(default)]
    pub dependencies: Vec<DependencyEntry>,
    #[serde(default)]
    pub excluded: bool,
    #[serde(default)]
    pub exclusion_reason: Option<String>,
}

/// A dependency in a universe file: shorthand coordinate string, or a
/// detailed form carrying exclusion patterns.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum DependencyEntry {
    Short(String),
    Detailed {
        coordinate: String,
        #[serde(default)]
        exclude: Vec<String>,
    },
}

/// A loaded universe: fixture repository plus store with any pre-marked
/// excluded versions.
pub struct Universe {
    pub repository: FixtureRepository,
    pub store: MemoryStore,
    pub components: Vec<Coordinate>,
}

pub fn load(path: &Path) -> DepotResult<Universe> {
    let raw = std::fs::read_to_string(path).map_err(|e| DepotError::Input {
        message: format!("cannot read universe {}: {e}", path.display()),
    })?;
    let file: UniverseFile = toml::from_str(&raw).map_err(|e| DepotError::Input {
        message: format!("malformed universe {}: {e}", path.display()),
    })?;

    let mut repository = FixtureRepository::new();
    let store = MemoryStore::new();
    let mut components = Vec::new();

    for entry in file.component {
        let coordinate = parse_coordinate(&entry.coordinate)?;
        let mut declared = Vec::new();
        for dep in entry.dependencies {
            declared.push(parse_dependency(dep)?);
        }

        if entry.excluded {
            let mut record = VersionRecord::from_declared(declared.clone());
            record.exclude(entry.exclusion_reason.as_deref().unwrap_or("excluded"));
            store.upsert(&coordinate, record);
        }

        repository.publish(coordinate.clone(), declared);
        components.push(coordinate);
    }

    tracing::debug!(
        "loaded universe with {} components from {}",
        components.len(),
        path.display()
    );
    Ok(Universe {
        repository,
        store,
        components,
    })
}

pub fn parse_coordinate(s: &str) -> DepotResult<Coordinate> {
    match Coordinate::parse(s) {
        Some(c) if c.version.is_some() => Ok(c),
        _ => Err(DepotError::Input {
            message: format!("'{s}' is not a group:artifact:version coordinate"),
        }
        .into()),
    }
}

fn parse_dependency(entry: DependencyEntry) -> DepotResult<DeclaredDependency> {
    match entry {
        DependencyEntry::Short(s) => Ok(DeclaredDependency::plain(parse_coordinate(&s)?)),
        DependencyEntry::Detailed { coordinate, exclude } => {
            let mut exclusions = Vec::new();
            for pattern in exclude {
                let Some(parsed) = Coordinate::parse(&pattern) else {
                    return Err(DepotError::Input {
                        message: format!("'{pattern}' is not a valid exclusion pattern"),
                    }
                    .into());
                };
                exclusions.push(parsed);
            }
            Ok(DeclaredDependency {
                coordinate: parse_coordinate(&coordinate)?,
                exclusions,
            })
        }
    }
}

impl Universe {
    /// Direct dependencies of a component as declared in the fixture.
    pub fn direct(&self, coordinate: &Coordinate) -> Vec<Coordinate> {
        let Some(version) = coordinate.version.as_deref() else {
            return Vec::new();
        };
        self.repository
            .find_dependencies(&coordinate.group, &coordinate.artifact, version)
            .map(|deps| deps.into_iter().map(|d| d.coordinate).collect())
            .unwrap_or_default()
    }
}

/// Dependency graph access for the constraint encoder, straight off the
/// fixture declarations.
impl DependencyProvider for Universe {
    fn direct(&self, coordinate: &Coordinate) -> DepotResult<Vec<Coordinate>> {
        Ok(Universe::direct(self, coordinate))
    }

    fn transitive(&self, coordinate: &Coordinate) -> DepotResult<BTreeSet<Coordinate>> {
        let mut out = BTreeSet::new();
        let mut queue = vec![coordinate.clone()];
        while let Some(next) = queue.pop() {
            for dep in Universe::direct(self, &next) {
                if out.insert(dep.clone()) {
                    queue.push(dep);
                }
            }
        }
        Ok(out)
    }
}
