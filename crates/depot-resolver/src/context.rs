//! Per-resolution memoization: cached version records and the dependency
//! sets computed for them during one resolution run.
//!
//! The context is created fresh for every resolution invocation and
//! discarded at the end; it holds no cross-call state, has no eviction and
//! no TTL. It is the only structure in the engine that must tolerate
//! concurrent access: one resolution run may fan out across threads (e.g.
//! resolving several artifact types of one version refresh), all sharing
//! one context.

use std::collections::BTreeSet;
use std::sync::{Arc, Condvar, Mutex, RwLock};

use dashmap::DashMap;
use depot_core::{Coordinate, DependencyReport, VersionRecord};
use depot_util::DepotResult;

/// A record cached for the duration of one resolution run.
///
/// `report` is the dependency closure computed for this coordinate during
/// the current run; `None` until the walk reaches it. Records loaded from
/// the store may arrive with their persisted report pre-filled when that
/// report can be trusted as-is.
#[derive(Debug)]
pub struct CachedRecord {
    pub record: VersionRecord,
    report: RwLock<Option<DependencyReport>>,
}

impl CachedRecord {
    /// A record whose closure must be computed in this run.
    pub fn fresh(record: VersionRecord) -> Self {
        Self {
            record,
            report: RwLock::new(None),
        }
    }

    /// A store-loaded record whose persisted report is taken as-is.
    pub fn stored(record: VersionRecord) -> Self {
        let report = record.transitive_report.clone();
        Self {
            record,
            report: RwLock::new(Some(report)),
        }
    }

    pub fn report(&self) -> Option<DependencyReport> {
        self.report.read().expect("report lock poisoned").clone()
    }

    pub fn set_report(&self, report: DependencyReport) {
        *self.report.write().expect("report lock poisoned") = Some(report);
    }
}

/// Gate other threads park on while one thread runs the supplier.
#[derive(Debug, Default)]
struct Gate {
    done: Mutex<bool>,
    cv: Condvar,
}

impl Gate {
    fn wait(&self) {
        let mut done = self.done.lock().expect("gate lock poisoned");
        while !*done {
            done = self.cv.wait(done).expect("gate lock poisoned");
        }
    }

    fn open(&self) {
        *self.done.lock().expect("gate lock poisoned") = true;
        self.cv.notify_all();
    }
}

#[derive(Debug)]
enum Slot {
    Pending(Arc<Gate>),
    Filled(Arc<CachedRecord>),
}

/// Compute-once-per-key cache of version records for one resolution run.
pub struct WalkerContext {
    slots: DashMap<Coordinate, Slot>,
}

impl WalkerContext {
    pub fn new() -> Self {
        Self {
            slots: DashMap::new(),
        }
    }

    pub fn get(&self, coordinate: &Coordinate) -> Option<Arc<CachedRecord>> {
        match self.slots.get(coordinate).as_deref() {
            Some(Slot::Filled(record)) => Some(record.clone()),
            _ => None,
        }
    }

    /// Return the cached record for `coordinate`, or invoke `supplier`
    /// exactly once to produce it.
    ///
    /// Concurrent callers for the same key park until the computing thread
    /// fills the slot. The supplier runs outside any map lock, so it may
    /// itself consult the context for other keys. If the supplier fails,
    /// the slot is cleared and the error propagates; a later caller may
    /// then attempt the computation again.
    pub fn get_or_compute<F>(
        &self,
        coordinate: &Coordinate,
        supplier: F,
    ) -> DepotResult<Arc<CachedRecord>>
    where
        F: FnOnce() -> DepotResult<CachedRecord>,
    {
        let mut supplier = Some(supplier);
        loop {
            enum Step {
                Done(Arc<CachedRecord>),
                Wait(Arc<Gate>),
                Compute(Arc<Gate>),
            }

            let step = match self.slots.entry(coordinate.clone()) {
                dashmap::mapref::entry::Entry::Occupied(entry) => match entry.get() {
                    Slot::Filled(record) => Step::Done(record.clone()),
                    Slot::Pending(gate) => Step::Wait(gate.clone()),
                },
                dashmap::mapref::entry::Entry::Vacant(entry) => {
                    let gate = Arc::new(Gate::default());
                    entry.insert(Slot::Pending(gate.clone()));
                    Step::Compute(gate)
                }
            };

            match step {
                Step::Done(record) => return Ok(record),
                Step::Wait(gate) => {
                    gate.wait();
                    // The slot is now filled, or was cleared by a failed
                    // compute; loop to re-inspect.
                }
                Step::Compute(gate) => {
                    let supplier = supplier.take().expect("supplier consumed twice");
                    match supplier() {
                        Ok(cached) => {
                            let cached = Arc::new(cached);
                            self.slots
                                .insert(coordinate.clone(), Slot::Filled(cached.clone()));
                            gate.open();
                            return Ok(cached);
                        }
                        Err(e) => {
                            self.slots.remove(coordinate);
                            gate.open();
                            return Err(e);
                        }
                    }
                }
            }
        }
    }

    /// Dependencies of the given coordinates, read from already-cached
    /// records only. Callers must have populated the records first; a
    /// coordinate without a cached record contributes nothing.
    pub fn dependencies_of(
        &self,
        coordinates: &[Coordinate],
        transitive: bool,
    ) -> BTreeSet<Coordinate> {
        let mut out = BTreeSet::new();
        for coordinate in coordinates {
            let Some(cached) = self.get(coordinate) else {
                debug_assert!(false, "dependencies_of on unpopulated {coordinate}");
                tracing::warn!("dependencies_of: no cached record for {coordinate}");
                continue;
            };
            out.extend(cached.record.direct_dependencies.iter().cloned());
            if transitive {
                match cached.report() {
                    Some(report) => out.extend(report.closure),
                    None => out.extend(cached.record.transitive_report.closure.iter().cloned()),
                }
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl Default for WalkerContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn coord(s: &str) -> Coordinate {
        Coordinate::parse(s).unwrap()
    }

    fn record_with_deps(deps: &[&str]) -> VersionRecord {
        VersionRecord {
            direct_dependencies: deps.iter().map(|s| coord(s)).collect(),
            ..VersionRecord::default()
        }
    }

    #[test]
    fn supplier_runs_once_per_key() {
        let ctx = WalkerContext::new();
        let calls = AtomicUsize::new(0);
        let c = coord("org.example:lib:1.0.0");

        for _ in 0..3 {
            ctx.get_or_compute(&c, || {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(CachedRecord::fresh(record_with_deps(&[])))
            })
            .unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(ctx.len(), 1);
    }

    #[test]
    fn supplier_runs_once_under_contention() {
        let ctx = WalkerContext::new();
        let calls = AtomicUsize::new(0);
        let c = coord("org.example:lib:1.0.0");

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    ctx.get_or_compute(&c, || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        // Give the other threads time to pile up on the gate.
                        std::thread::sleep(std::time::Duration::from_millis(10));
                        Ok(CachedRecord::fresh(record_with_deps(&["org.dep:dep:1.0.0"])))
                    })
                    .unwrap();
                });
            }
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failed_compute_clears_the_slot() {
        let ctx = WalkerContext::new();
        let c = coord("org.example:lib:1.0.0");

        let err = ctx.get_or_compute(&c, || {
            Err(depot_util::errors::DepotError::Generic {
                message: "boom".into(),
            }
            .into())
        });
        assert!(err.is_err());
        assert!(ctx.is_empty());

        // A later caller computes successfully.
        ctx.get_or_compute(&c, || Ok(CachedRecord::fresh(record_with_deps(&[]))))
            .unwrap();
        assert_eq!(ctx.len(), 1);
    }

    #[test]
    fn dependencies_of_reads_cached_records() {
        let ctx = WalkerContext::new();
        let a = coord("org.a:a:1.0.0");
        let b = coord("org.b:b:1.0.0");

        ctx.get_or_compute(&a, || {
            let cached = CachedRecord::fresh(record_with_deps(&["org.b:b:1.0.0"]));
            cached.set_report(DependencyReport::valid(BTreeSet::from([
                b.clone(),
                coord("org.c:c:1.0.0"),
            ])));
            Ok(cached)
        })
        .unwrap();

        let direct = ctx.dependencies_of(std::slice::from_ref(&a), false);
        assert_eq!(direct, BTreeSet::from([b.clone()]));

        let transitive = ctx.dependencies_of(&[a], true);
        assert_eq!(
            transitive,
            BTreeSet::from([b, coord("org.c:c:1.0.0")])
        );
    }
}
