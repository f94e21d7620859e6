//! Artifact repository access: the narrow interface through which the
//! resolver obtains raw dependency declarations for coordinates the store
//! does not know yet, plus concrete adapters (remote Maven-layout
//! repositories over HTTP, in-memory fixtures for tests and CLI universes).

pub mod checksum;
pub mod fixture;
pub mod http;
pub mod pom;
pub mod repository;

use std::collections::BTreeSet;

use depot_core::DeclaredDependency;
use depot_util::DepotResult;

pub use fixture::FixtureRepository;
pub use http::HttpRepository;
pub use repository::RemoteRegistry;

/// Source of raw dependency declarations for a published coordinate.
///
/// Unlike the graph-semantic failures inside the resolver, errors from this
/// interface propagate: they mean the input data itself could not be
/// obtained (`RepositoryAccess`), or the coordinate does not exist anywhere
/// (`MissingCoordinate`).
pub trait ArtifactRepository: Send + Sync {
    fn find_dependencies(
        &self,
        group: &str,
        artifact: &str,
        version: &str,
    ) -> DepotResult<BTreeSet<DeclaredDependency>>;
}
