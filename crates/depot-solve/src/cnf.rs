//! Solver-agnostic CNF representation.
//!
//! A [`Clause`] is a disjunction of literals, a [`Formula`] a conjunction
//! of clauses:
//!
//! - `[a]` — a must hold (assertion)
//! - `[¬a]` — a must not hold
//! - `[¬a, b]` — a implies b
//! - `[¬a, ¬b]` — a and b cannot hold together

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use depot_core::Coordinate;

/// Opaque variable id, bound 1:1 to a coordinate by the instance maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Variable(pub u32);

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Literal {
    pub variable: Variable,
    pub negated: bool,
}

impl Literal {
    pub fn positive(variable: Variable) -> Self {
        Self {
            variable,
            negated: false,
        }
    }

    pub fn negative(variable: Variable) -> Self {
        Self {
            variable,
            negated: true,
        }
    }

    /// Truth value under a set of variables assigned true.
    pub fn holds(&self, true_vars: &BTreeSet<Variable>) -> bool {
        true_vars.contains(&self.variable) != self.negated
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "¬{}", self.variable)
        } else {
            write!(f, "{}", self.variable)
        }
    }
}

/// A disjunction of literals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub literals: Vec<Literal>,
}

impl Clause {
    pub fn new(literals: Vec<Literal>) -> Self {
        Self { literals }
    }

    pub fn unit(literal: Literal) -> Self {
        Self::new(vec![literal])
    }

    pub fn binary(a: Literal, b: Literal) -> Self {
        Self::new(vec![a, b])
    }

    pub fn holds(&self, true_vars: &BTreeSet<Variable>) -> bool {
        self.literals.iter().any(|l| l.holds(true_vars))
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.literals.iter().map(|l| l.to_string()).collect();
        write!(f, "({})", parts.join(" ∨ "))
    }
}

/// A conjunction of clauses.
#[derive(Debug, Clone, Default)]
pub struct Formula {
    pub clauses: Vec<Clause>,
}

impl Formula {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, clause: Clause) {
        self.clauses.push(clause);
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Evaluate the whole formula under a complete assignment, given as
    /// the set of variables assigned true.
    pub fn holds(&self, true_vars: &BTreeSet<Variable>) -> bool {
        self.clauses.iter().all(|c| c.holds(true_vars))
    }
}

/// An encoded resolution problem, opaque to any specific solver backend.
#[derive(Debug, Clone, Default)]
pub struct CnfInstance {
    /// Coordinate to variable; total over every coordinate the encoder saw.
    pub variables: BTreeMap<Coordinate, Variable>,
    /// Variable back to coordinate; the exact inverse of `variables`.
    pub reverse: BTreeMap<Variable, Coordinate>,
    /// Per-variable weight: the version's rank within its
    /// `(group, artifact)`, ascending, so higher weight means newer.
    pub weights: BTreeMap<Variable, u64>,
    pub formula: Formula,
}

impl CnfInstance {
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    pub fn coordinate_of(&self, variable: Variable) -> Option<&Coordinate> {
        self.reverse.get(&variable)
    }

    pub fn variable_of(&self, coordinate: &Coordinate) -> Option<Variable> {
        self.variables.get(coordinate).copied()
    }
}
