//! The narrow solve interface and the built-in reference backend.
//!
//! Any backend implementing [`SatSolver`] can replace [`DpllSolver`]; the
//! encoding in [`crate::encoder`] is the contract, not this solver. The
//! reference backend does unit propagation plus weight-preferring
//! branching, which approximates the "prefer newer versions" behavior a
//! real MaxSAT optimizer would guarantee.

use std::collections::{BTreeMap, BTreeSet};

use depot_core::Coordinate;

use crate::cnf::{CnfInstance, Literal, Variable};

/// Solver outcome for an encoded instance.
#[derive(Debug, Clone)]
pub enum Verdict {
    Satisfiable(Assignment),
    Unsatisfiable(ConflictDiagnostics),
    /// The backend gave up without a verdict.
    Unknown,
}

/// A satisfying assignment, as the set of variables set true.
#[derive(Debug, Clone, Default)]
pub struct Assignment {
    pub true_vars: BTreeSet<Variable>,
}

impl Assignment {
    /// The coordinates selected by this assignment.
    pub fn selected(&self, instance: &CnfInstance) -> BTreeSet<Coordinate> {
        self.true_vars
            .iter()
            .filter_map(|v| instance.coordinate_of(*v).cloned())
            .collect()
    }
}

/// Structural diagnostics extracted from an unsatisfiable instance.
#[derive(Debug, Clone, Default)]
pub struct ConflictDiagnostics {
    /// Per `group:artifact`, the versions implied by the requirements.
    /// Only artifacts with more than one implied version appear.
    pub conflicting_versions: BTreeMap<String, BTreeSet<Coordinate>>,
    /// Per implied coordinate, the coordinates that require it.
    pub dependency_origins: BTreeMap<Coordinate, BTreeSet<Coordinate>>,
}

/// The narrow interface a solver backend must honor.
pub trait SatSolver {
    fn solve(&self, instance: &CnfInstance) -> Verdict;
}

/// Reference DPLL backend.
#[derive(Debug, Default)]
pub struct DpllSolver;

impl DpllSolver {
    pub fn new() -> Self {
        Self
    }
}

impl SatSolver for DpllSolver {
    fn solve(&self, instance: &CnfInstance) -> Verdict {
        // Branch order: heaviest first, so newer versions are tried before
        // older ones.
        let mut order: Vec<Variable> = instance.reverse.keys().copied().collect();
        order.sort_by_key(|v| std::cmp::Reverse(instance.weights.get(v).copied().unwrap_or(1)));

        let clauses: Vec<&[Literal]> = instance
            .formula
            .clauses
            .iter()
            .map(|c| c.literals.as_slice())
            .collect();

        match dpll(&clauses, &order, BTreeMap::new()) {
            Some(model) => Verdict::Satisfiable(Assignment {
                true_vars: model
                    .into_iter()
                    .filter_map(|(v, value)| value.then_some(v))
                    .collect(),
            }),
            None => Verdict::Unsatisfiable(diagnose(instance)),
        }
    }
}

/// Plain recursive DPLL over immutable clause slices.
fn dpll(
    clauses: &[&[Literal]],
    order: &[Variable],
    mut assignment: BTreeMap<Variable, bool>,
) -> Option<BTreeMap<Variable, bool>> {
    // Unit propagation to fixpoint.
    loop {
        let mut changed = false;
        for clause in clauses {
            let mut satisfied = false;
            let mut unassigned: Option<Literal> = None;
            let mut unassigned_count = 0usize;

            for literal in *clause {
                match assignment.get(&literal.variable) {
                    Some(&value) => {
                        if value != literal.negated {
                            satisfied = true;
                            break;
                        }
                    }
                    None => {
                        unassigned = Some(*literal);
                        unassigned_count += 1;
                    }
                }
            }

            if satisfied {
                continue;
            }
            match unassigned_count {
                0 => return None, // every literal false
                1 => {
                    let literal = unassigned.expect("counted one unassigned literal");
                    assignment.insert(literal.variable, !literal.negated);
                    changed = true;
                }
                _ => {}
            }
        }
        if !changed {
            break;
        }
    }

    let Some(next) = order.iter().find(|v| !assignment.contains_key(*v)) else {
        return Some(assignment);
    };

    for value in [true, false] {
        let mut attempt = assignment.clone();
        attempt.insert(*next, value);
        if let Some(model) = dpll(clauses, order, attempt) {
            return Some(model);
        }
    }
    None
}

/// Derive conflict diagnostics from the structure of an unsatisfiable
/// instance: seed with positive unit clauses (requirements and forced
/// winners), propagate along dependency implications, and report every
/// artifact for which more than one version ends up implied.
fn diagnose(instance: &CnfInstance) -> ConflictDiagnostics {
    let mut forced_off: BTreeSet<Variable> = BTreeSet::new();
    let mut implied: BTreeSet<Variable> = BTreeSet::new();
    let mut implications: Vec<(Variable, Variable)> = Vec::new();

    for clause in &instance.formula.clauses {
        match clause.literals.as_slice() {
            [single] => {
                if single.negated {
                    forced_off.insert(single.variable);
                } else {
                    implied.insert(single.variable);
                }
            }
            [a, b] if a.negated && !b.negated => implications.push((a.variable, b.variable)),
            [a, b] if b.negated && !a.negated => implications.push((b.variable, a.variable)),
            _ => {}
        }
    }
    implied.retain(|v| !forced_off.contains(v));

    // Propagate to fixpoint.
    loop {
        let mut changed = false;
        for (parent, dep) in &implications {
            if implied.contains(parent) && !forced_off.contains(dep) && implied.insert(*dep) {
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    let mut diagnostics = ConflictDiagnostics::default();

    for (parent, dep) in &implications {
        if implied.contains(parent) && implied.contains(dep) {
            let (Some(parent), Some(dep)) = (
                instance.coordinate_of(*parent),
                instance.coordinate_of(*dep),
            ) else {
                continue;
            };
            diagnostics
                .dependency_origins
                .entry(dep.clone())
                .or_default()
                .insert(parent.clone());
        }
    }

    let mut versions_by_ga: BTreeMap<String, BTreeSet<Coordinate>> = BTreeMap::new();
    for variable in &implied {
        if let Some(coordinate) = instance.coordinate_of(*variable) {
            versions_by_ga
                .entry(coordinate.ga_key())
                .or_default()
                .insert(coordinate.clone());
        }
    }
    diagnostics.conflicting_versions = versions_by_ga
        .into_iter()
        .filter(|(_, versions)| versions.len() > 1)
        .collect();

    diagnostics
}
