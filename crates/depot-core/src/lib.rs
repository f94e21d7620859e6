//! Core data types for the Depot metadata repository: coordinate model,
//! persisted version records, dependency reports, and the component version
//! ordering used for validation and solver weights.

pub mod coordinate;
pub mod record;
pub mod version;

pub use coordinate::Coordinate;
pub use record::{
    ConflictEntry, DeclaredDependency, DependencyReport, ResolutionResponse, VersionRecord,
};
pub use version::ComponentVersion;
