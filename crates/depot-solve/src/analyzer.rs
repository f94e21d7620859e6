//! Conflict analyzer: turn a solver verdict into a human-readable
//! [`ResolutionResponse`].
//!
//! Root-level conflicts are expected (the caller asked for those versions
//! explicitly) and therefore suppressed; only purely transitive conflicts
//! where several distinct origins pull in several distinct versions are
//! reported.

use std::collections::{BTreeMap, BTreeSet};

use depot_core::{ConflictEntry, Coordinate, ResolutionResponse};

use crate::solver::Verdict;

pub const REASON_SATISFIABLE: &str = "resolution is satisfiable; nothing to explain";
pub const REASON_UNKNOWN: &str = "solver returned no verdict";
pub const REASON_UNSATISFIABLE: &str = "no joint version selection satisfies the requirements";

/// Explain a solver verdict against the original root requirements.
pub fn explain_failure(
    verdict: &Verdict,
    original_requirements: &[Coordinate],
) -> ResolutionResponse {
    let diagnostics = match verdict {
        Verdict::Satisfiable(_) => {
            return ResolutionResponse {
                failure_reason: Some(REASON_SATISFIABLE.to_string()),
                conflicts: Vec::new(),
            };
        }
        Verdict::Unknown => {
            return ResolutionResponse {
                failure_reason: Some(REASON_UNKNOWN.to_string()),
                conflicts: Vec::new(),
            };
        }
        Verdict::Unsatisfiable(diagnostics) => diagnostics,
    };

    let root_keys: BTreeSet<String> = original_requirements.iter().map(|c| c.ga_key()).collect();

    let mut conflicts = Vec::new();
    for (ga_key, versions) in &diagnostics.conflicting_versions {
        if root_keys.contains(ga_key) {
            tracing::debug!("suppressing root-level conflict on {ga_key}");
            continue;
        }
        if versions.len() < 2 {
            continue;
        }

        let mut version_origins: BTreeMap<String, Vec<Coordinate>> = BTreeMap::new();
        let mut distinct_origins: BTreeSet<Coordinate> = BTreeSet::new();
        for coordinate in versions {
            let origins: Vec<Coordinate> = diagnostics
                .dependency_origins
                .get(coordinate)
                .map(|set| set.iter().cloned().collect())
                .unwrap_or_default();
            distinct_origins.extend(origins.iter().cloned());
            let version = coordinate.version.clone().unwrap_or_default();
            version_origins.insert(version, origins);
        }

        // One caller asking for one thing is not a conflict worth a report.
        if distinct_origins.len() < 2 {
            continue;
        }

        let Some((group, artifact)) = ga_key.split_once(':') else {
            continue;
        };
        conflicts.push(ConflictEntry {
            group: group.to_string(),
            artifact: artifact.to_string(),
            version_origins,
        });
    }

    ResolutionResponse {
        failure_reason: Some(REASON_UNSATISFIABLE.to_string()),
        conflicts,
    }
}
