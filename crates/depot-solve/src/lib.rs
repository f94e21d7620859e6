//! The constraint path: encoding a resolution problem (required
//! coordinates, their alternative versions, and the reachable dependency
//! graph) into a weighted CNF instance, solving it, and explaining
//! unsatisfiable outcomes.
//!
//! The CNF representation is solver-agnostic; any backend implementing
//! [`SatSolver`] can be swapped in. The built-in [`DpllSolver`] is a
//! reference backend, not part of the encoding contract.

pub mod analyzer;
pub mod cnf;
pub mod encoder;
pub mod solver;

pub use analyzer::explain_failure;
pub use cnf::{Clause, CnfInstance, Formula, Literal, Variable};
pub use encoder::{encode, DependencyProvider};
pub use solver::{Assignment, ConflictDiagnostics, DpllSolver, SatSolver, Verdict};
