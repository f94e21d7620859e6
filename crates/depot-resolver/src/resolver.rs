//! Transitive dependency resolution: the walk over stored and freshly
//! fetched version records that produces a [`DependencyReport`].
//!
//! Graph-semantic failures (excluded versions, poisoned upstream reports,
//! cycles) never cross the public boundary as errors; they surface as
//! `valid = false` reports plus log messages. The exceptions are
//! `MissingCoordinate` and `RepositoryAccess`, which mean the input data
//! itself could not be obtained and therefore propagate to the caller.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use depot_core::version::ComponentVersion;
use depot_core::{Coordinate, DependencyReport, VersionRecord};
use depot_registry::ArtifactRepository;
use depot_store::ProjectStore;
use depot_util::DepotResult;

use crate::context::{CachedRecord, WalkerContext};
use crate::{exclusions, overrides};

/// The dependency resolution engine.
///
/// Reads records through the store provider, falls back to the artifact
/// repository for coordinates the store does not know, and writes records
/// back only at the top level after a full resolution succeeds.
pub struct Resolver {
    store: Arc<dyn ProjectStore>,
    repository: Arc<dyn ArtifactRepository>,
}

impl Resolver {
    pub fn new(store: Arc<dyn ProjectStore>, repository: Arc<dyn ArtifactRepository>) -> Self {
        Self { store, repository }
    }

    /// Compute the full dependency closure of one version, including the
    /// version itself, and persist the refreshed record on success.
    ///
    /// An invalid resolution yields an empty list; the failure is logged
    /// and the store is left untouched.
    pub fn compute_dependencies(
        &self,
        group: &str,
        artifact: &str,
        version: &str,
    ) -> DepotResult<Vec<Coordinate>> {
        let coordinate = Coordinate::new(group, artifact, version);
        let ctx = WalkerContext::new();
        let report = self.resolve_with_context(&ctx, std::slice::from_ref(&coordinate))?;

        if !report.valid {
            tracing::warn!("resolution of {coordinate} produced an invalid report");
            return Ok(Vec::new());
        }

        if let Some(cached) = ctx.get(&coordinate) {
            let mut record = cached.record.clone();
            let mut closure = report.closure.clone();
            closure.remove(&coordinate);
            record.transitive_report = DependencyReport::valid(closure);
            self.store.upsert(&coordinate, record);
        }

        Ok(report.closure.into_iter().collect())
    }

    /// Recompute and replace `record.transitive_report` in place.
    ///
    /// The record itself is used as the in-flight state for its own
    /// coordinate, so a not-yet-persisted record resolves consistently.
    pub fn set_transitive_dependencies(
        &self,
        coordinate: &Coordinate,
        record: &mut VersionRecord,
    ) -> DepotResult<()> {
        if record.excluded {
            record.transitive_report = DependencyReport::invalid();
            return Ok(());
        }

        let ctx = WalkerContext::new();
        let seed = record.clone();
        ctx.get_or_compute(coordinate, || Ok(CachedRecord::fresh(seed)))?;

        let report = self.resolve_with_context(&ctx, std::slice::from_ref(coordinate))?;
        record.transitive_report = if report.valid {
            let mut closure = report.closure;
            closure.remove(coordinate);
            DependencyReport::valid(closure)
        } else {
            DependencyReport::invalid()
        };
        Ok(())
    }

    /// Resolve one or more requested coordinates against a shared context.
    ///
    /// The context may be shared across threads resolving other requests
    /// of the same refresh; records are loaded at most once per context.
    pub fn resolve_with_context(
        &self,
        ctx: &WalkerContext,
        requested: &[Coordinate],
    ) -> DepotResult<DependencyReport> {
        // Load the requested records up front; their exclusion
        // declarations shape the rest of the walk.
        let mut exclusion_map: BTreeMap<String, Vec<Coordinate>> = BTreeMap::new();
        for coordinate in requested {
            let cached = self.load(ctx, coordinate)?;
            for (owner, patterns) in &cached.record.exclusions {
                exclusion_map
                    .entry(owner.clone())
                    .or_default()
                    .extend(patterns.iter().cloned());
            }
        }

        // Lookup for the override engine and exclusion resolver: walks
        // through the shared context, loading records on demand.
        let lookup = |coords: &[Coordinate], transitive: bool| -> DepotResult<BTreeSet<Coordinate>> {
            if !transitive {
                return Ok(ctx.dependencies_of(coords, false));
            }
            let mut out = BTreeSet::new();
            for coordinate in coords {
                let mut stack = Vec::new();
                let report = self.walk(ctx, coordinate, &mut stack)?;
                if report.valid {
                    out.extend(report.closure);
                } else {
                    tracing::warn!("lookup of {coordinate} hit an invalid branch");
                }
            }
            Ok(out)
        };

        let losers = if exclusion_map.is_empty() {
            BTreeSet::new()
        } else {
            let expanded = exclusions::expand_exclusions(&exclusion_map, &lookup)?;
            exclusions::losing_set(&expanded)
        };

        let mut accumulated: BTreeSet<Coordinate> = BTreeSet::new();
        for coordinate in requested {
            let mut stack = Vec::new();
            let report = self.walk(ctx, coordinate, &mut stack)?;
            if !report.valid {
                return Ok(DependencyReport::invalid());
            }
            let mut contribution: Vec<Coordinate> = report.closure.into_iter().collect();
            if !losers.is_empty() {
                contribution = overrides::strip(&contribution, &losers, &lookup)?;
            }
            accumulated.extend(contribution);
        }

        // Requested versions override whatever else the walk dragged in
        // for the same (group, artifact).
        let survivors: Vec<Coordinate> = accumulated.into_iter().collect();
        let overridden = overrides::override_with(&survivors, requested, &lookup)?;

        let mut closure: BTreeSet<Coordinate> = overridden.into_iter().collect();
        closure.extend(requested.iter().cloned());
        Ok(DependencyReport::valid(closure))
    }

    /// One branch of the walk: the dependency closure of `coordinate`
    /// (not including the coordinate itself).
    fn walk(
        &self,
        ctx: &WalkerContext,
        coordinate: &Coordinate,
        stack: &mut Vec<Coordinate>,
    ) -> DepotResult<DependencyReport> {
        if stack.contains(coordinate) {
            tracing::error!(
                "dependency cycle through {coordinate} (chain: {})",
                stack
                    .iter()
                    .map(|c| c.to_string())
                    .collect::<Vec<_>>()
                    .join(" -> ")
            );
            return Ok(DependencyReport::invalid());
        }

        let cached = self.load(ctx, coordinate)?;

        if cached.record.excluded {
            tracing::warn!(
                "{coordinate} is excluded{}",
                cached
                    .record
                    .exclusion_reason
                    .as_deref()
                    .map(|r| format!(": {r}"))
                    .unwrap_or_default()
            );
            return Ok(DependencyReport::invalid());
        }

        if let Some(report) = cached.report() {
            if !report.valid {
                tracing::debug!("{coordinate} carries an invalid report, poisoning branch");
                return Ok(DependencyReport::invalid());
            }
            let mut closure: BTreeSet<Coordinate> =
                cached.record.direct_dependencies.iter().cloned().collect();
            closure.extend(report.closure);
            return Ok(DependencyReport::valid(closure));
        }

        // No usable report yet: compute it from the direct dependencies.
        stack.push(coordinate.clone());
        let mut closure: BTreeSet<Coordinate> =
            cached.record.direct_dependencies.iter().cloned().collect();
        let mut valid = true;
        for dep in &cached.record.direct_dependencies {
            let child = self.walk(ctx, dep, stack)?;
            if !child.valid {
                valid = false;
                break;
            }
            closure.extend(child.closure);
        }
        stack.pop();

        let report = if valid {
            DependencyReport::valid(closure)
        } else {
            DependencyReport::invalid()
        };
        cached.set_report(report.clone());
        Ok(report)
    }

    /// Fetch a record through the context: store first, then the artifact
    /// repository for coordinates the store does not know yet.
    ///
    /// Stored reports are trusted as-is except for snapshot-like versions,
    /// whose closures are recomputed on every resolution touching them.
    fn load(
        &self,
        ctx: &WalkerContext,
        coordinate: &Coordinate,
    ) -> DepotResult<Arc<CachedRecord>> {
        ctx.get_or_compute(coordinate, || {
            let Some(version) = coordinate.version.as_deref() else {
                return Err(depot_util::errors::DepotError::Input {
                    message: format!("cannot resolve version-less coordinate {coordinate}"),
                }
                .into());
            };

            if let Some(record) =
                self.store
                    .find(&coordinate.group, &coordinate.artifact, version)
            {
                if ComponentVersion::parse(version).is_snapshot() {
                    tracing::debug!("recomputing closure for snapshot {coordinate}");
                    return Ok(CachedRecord::fresh(record));
                }
                return Ok(CachedRecord::stored(record));
            }

            tracing::debug!("{coordinate} not in store, fetching from repository");
            let declared = self.repository.find_dependencies(
                &coordinate.group,
                &coordinate.artifact,
                version,
            )?;
            Ok(CachedRecord::fresh(VersionRecord::from_declared(
                declared.into_iter().collect(),
            )))
        })
    }

    /// Non-fatal validation of a version's direct dependencies.
    ///
    /// `version_id` is the version string of the declaring component.
    pub fn validate_dependencies(deps: &[Coordinate], version_id: &str) -> Vec<String> {
        let mut messages = Vec::new();
        let release = !ComponentVersion::parse(version_id).is_prerelease();
        let mut seen: HashMap<String, String> = HashMap::new();

        for dep in deps {
            let Some(version) = dep.version.as_deref() else {
                messages.push(format!("dependency {dep} has no version"));
                continue;
            };
            if release && ComponentVersion::parse(version).is_prerelease() {
                messages.push(format!(
                    "pre-release dependency {dep} not allowed in a release version"
                ));
            }
            if let Some(previous) = seen.insert(dep.ga_key(), version.to_string()) {
                if previous != version {
                    messages.push(format!(
                        "multiple versions of {} declared: {previous} and {version}",
                        dep.ga_key()
                    ));
                }
            }
        }

        messages
    }
}
