use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::coordinate::Coordinate;

/// The outcome of a transitive dependency computation.
///
/// `valid = false` is viral: any consumer building on an invalid report
/// must itself produce an invalid report rather than use a partial closure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyReport {
    pub closure: BTreeSet<Coordinate>,
    pub valid: bool,
}

impl DependencyReport {
    pub fn valid(closure: BTreeSet<Coordinate>) -> Self {
        Self {
            closure,
            valid: true,
        }
    }

    /// An empty, poisoned report. Carried by excluded versions and produced
    /// whenever a branch of the walk fails.
    pub fn invalid() -> Self {
        Self {
            closure: BTreeSet::new(),
            valid: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.closure.is_empty()
    }
}

/// Persisted state of one published coordinate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VersionRecord {
    /// Dependencies declared directly by this version.
    pub direct_dependencies: Vec<Coordinate>,
    /// Exclusion rules declared by dependencies, keyed by the owner key
    /// (`group:artifact:version`) of the dependency declaring them.
    /// The values may be version-less patterns until expanded.
    pub exclusions: BTreeMap<String, Vec<Coordinate>>,
    /// The computed transitive closure for this version.
    pub transitive_report: DependencyReport,
    /// An excluded version never contributes dependencies; its report
    /// stays empty and invalid.
    pub excluded: bool,
    pub exclusion_reason: Option<String>,
    pub evicted: bool,
}

impl VersionRecord {
    /// A record synthesized from raw repository metadata, before its
    /// transitive report has been computed.
    pub fn from_declared(deps: Vec<DeclaredDependency>) -> Self {
        let mut direct = Vec::new();
        let mut exclusions: BTreeMap<String, Vec<Coordinate>> = BTreeMap::new();
        for dep in deps {
            if !dep.exclusions.is_empty() {
                exclusions
                    .entry(dep.coordinate.owner_key())
                    .or_default()
                    .extend(dep.exclusions);
            }
            direct.push(dep.coordinate);
        }
        Self {
            direct_dependencies: direct,
            exclusions,
            ..Self::default()
        }
    }

    /// Mark this record excluded. Drops any previously computed closure.
    pub fn exclude(&mut self, reason: &str) {
        self.excluded = true;
        self.exclusion_reason = Some(reason.to_string());
        self.transitive_report = DependencyReport::invalid();
    }
}

/// A raw dependency declaration as served by an artifact repository:
/// the dependency coordinate plus any exclusion rules it declares.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeclaredDependency {
    pub coordinate: Coordinate,
    #[serde(default)]
    pub exclusions: Vec<Coordinate>,
}

impl DeclaredDependency {
    pub fn plain(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            exclusions: Vec::new(),
        }
    }
}

/// One contested `(group, artifact)`: which versions are wanted, and by whom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictEntry {
    pub group: String,
    pub artifact: String,
    /// Version string mapped to the coordinates that pulled it in.
    pub version_origins: BTreeMap<String, Vec<Coordinate>>,
}

/// The human-facing answer of the diagnostic path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionResponse {
    pub failure_reason: Option<String>,
    pub conflicts: Vec<ConflictEntry>,
}

impl std::fmt::Display for ResolutionResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.failure_reason {
            Some(ref reason) => writeln!(f, "{reason}")?,
            None => writeln!(f, "resolution succeeded")?,
        }
        for conflict in &self.conflicts {
            writeln!(f, "  {}:{}", conflict.group, conflict.artifact)?;
            for (version, origins) in &conflict.version_origins {
                let wanted_by: Vec<String> = origins.iter().map(|c| c.to_string()).collect();
                writeln!(f, "    {} wanted by {}", version, wanted_by.join(", "))?;
            }
        }
        Ok(())
    }
}
