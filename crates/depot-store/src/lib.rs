//! Project metadata store: the narrow persistence interface the resolver
//! reads through, with an in-memory implementation and a JSON snapshot
//! adapter. The storage schema itself is not part of the resolution
//! contract; these are adapters around [`ProjectStore`].

pub mod file;
pub mod memory;

use std::collections::BTreeSet;

use depot_core::{Coordinate, VersionRecord};

pub use file::FileStore;
pub use memory::MemoryStore;

/// Read/write access to persisted version records.
///
/// `find` and `get_dependencies` serve the resolver's read path;
/// `upsert` is called only at the top level after a full resolution
/// succeeds. Implementations must be safe to share across the parallel
/// fan-out of one resolution run.
pub trait ProjectStore: Send + Sync {
    fn find(&self, group: &str, artifact: &str, version: &str) -> Option<VersionRecord>;

    /// Dependencies of the given coordinates as recorded in the store:
    /// direct dependencies, plus the stored transitive closure when
    /// `transitive` is set. Coordinates without a record contribute
    /// nothing.
    fn get_dependencies(
        &self,
        coordinates: &[Coordinate],
        transitive: bool,
    ) -> BTreeSet<Coordinate>;

    fn upsert(&self, coordinate: &Coordinate, record: VersionRecord);
}
