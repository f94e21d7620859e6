//! Dependency resolution engine: transitive closure computation over stored
//! version records, override and exclusion semantics, and the per-resolution
//! walker context shared across recursive calls and parallel fan-out.

pub mod context;
pub mod exclusions;
pub mod graph;
pub mod overrides;
pub mod resolver;

use std::collections::BTreeSet;

use depot_core::Coordinate;
use depot_util::DepotResult;

pub use context::WalkerContext;
pub use graph::ClosureGraph;
pub use resolver::Resolver;

/// Dependency lookup used by the override engine and exclusion resolver:
/// `(coordinates, transitive)` to the set of dependencies they introduce.
pub type LookupFn<'a> = dyn Fn(&[Coordinate], bool) -> DepotResult<BTreeSet<Coordinate>> + 'a;
