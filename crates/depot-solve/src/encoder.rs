//! Constraint encoder: a set of required coordinates (each optionally
//! with acceptable alternative versions) plus the reachable dependency
//! graph, encoded as a weighted CNF instance.
//!
//! Within the required list, the last occurrence of a `(group, artifact)`
//! wins; every earlier occurrence becomes a loser forced off by unit
//! clauses. This last-wins rule is specific to the encoding path and
//! deliberately distinct from the closure-side override engine.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use depot_core::version::ComponentVersion;
use depot_core::Coordinate;
use depot_util::DepotResult;

use crate::cnf::{Clause, CnfInstance, Literal, Variable};

/// Dependency graph access for the encoder.
pub trait DependencyProvider {
    /// Direct dependencies of a coordinate.
    fn direct(&self, coordinate: &Coordinate) -> DepotResult<Vec<Coordinate>>;

    /// Full transitive closure of a coordinate (not including itself).
    fn transitive(&self, coordinate: &Coordinate) -> DepotResult<BTreeSet<Coordinate>>;
}

struct EncoderState {
    instance: CnfInstance,
    next: u32,
}

impl EncoderState {
    fn new() -> Self {
        Self {
            instance: CnfInstance::default(),
            next: 0,
        }
    }

    fn var(&mut self, coordinate: &Coordinate) -> Variable {
        if let Some(v) = self.instance.variables.get(coordinate) {
            return *v;
        }
        let v = Variable(self.next);
        self.next += 1;
        self.instance.variables.insert(coordinate.clone(), v);
        self.instance.reverse.insert(v, coordinate.clone());
        v
    }
}

/// Encode a resolution problem into a weighted CNF instance.
pub fn encode(
    required: &[Coordinate],
    alternatives: &BTreeMap<Coordinate, Vec<Coordinate>>,
    provider: &dyn DependencyProvider,
) -> DepotResult<CnfInstance> {
    // Last occurrence of each (group, artifact) in the required list wins.
    let mut winner_by_ga: HashMap<String, Coordinate> = HashMap::new();
    for coordinate in required {
        winner_by_ga.insert(coordinate.ga_key(), coordinate.clone());
    }

    let mut override_pairs: Vec<(Coordinate, Coordinate)> = Vec::new();
    let mut seen_losers: HashSet<Coordinate> = HashSet::new();
    for coordinate in required {
        let winner = &winner_by_ga[&coordinate.ga_key()];
        if winner != coordinate && seen_losers.insert(coordinate.clone()) {
            override_pairs.push((coordinate.clone(), winner.clone()));
        }
    }

    let override_map: HashMap<Coordinate, Coordinate> = override_pairs.iter().cloned().collect();
    let subst =
        |c: &Coordinate| -> Coordinate { override_map.get(c).cloned().unwrap_or_else(|| c.clone()) };

    // Dedup the required list, keeping first-seen order of the winners.
    let mut deduped: Vec<Coordinate> = Vec::new();
    let mut seen: HashSet<Coordinate> = HashSet::new();
    for coordinate in required {
        let winner = winner_by_ga[&coordinate.ga_key()].clone();
        if seen.insert(winner.clone()) {
            deduped.push(winner);
        }
    }

    // Substitute losers out of the alternatives map, keys and values both.
    let mut alts: BTreeMap<Coordinate, Vec<Coordinate>> = BTreeMap::new();
    for (key, values) in alternatives {
        let entry = alts.entry(subst(key)).or_default();
        for value in values {
            let value = subst(value);
            if !entry.contains(&value) {
                entry.push(value);
            }
        }
    }

    // Everything selectable, and everything reachable from it, gets a
    // variable. Losers keep theirs so the enforcement clauses can name
    // them.
    let mut selectable: Vec<Coordinate> = Vec::new();
    let mut seen: HashSet<Coordinate> = HashSet::new();
    for coordinate in deduped.iter().chain(alts.values().flatten()) {
        if seen.insert(coordinate.clone()) {
            selectable.push(coordinate.clone());
        }
    }

    let mut universe: BTreeSet<Coordinate> = selectable.iter().cloned().collect();
    universe.extend(override_pairs.iter().map(|(loser, _)| loser.clone()));
    for coordinate in &selectable {
        for reachable in provider.transitive(coordinate)? {
            universe.insert(subst(&reachable));
        }
    }

    let mut state = EncoderState::new();
    for coordinate in &universe {
        state.var(coordinate);
    }

    // Dependency clauses: ¬parent ∨ dep for every direct edge, overrides
    // substituted at each step. Visited parents bound the walk on shared
    // subgraphs and diamonds.
    let mut visited: HashSet<Coordinate> = HashSet::new();
    let mut emitted: HashSet<(Variable, Variable)> = HashSet::new();
    let mut queue: VecDeque<Coordinate> = selectable.iter().cloned().collect();
    while let Some(parent) = queue.pop_front() {
        if !visited.insert(parent.clone()) {
            continue;
        }
        let parent_var = state.var(&parent);
        for dep in provider.direct(&parent)? {
            let dep = subst(&dep);
            let dep_var = state.var(&dep);
            if emitted.insert((parent_var, dep_var)) {
                state.instance.formula.push(Clause::binary(
                    Literal::negative(parent_var),
                    Literal::positive(dep_var),
                ));
            }
            if !visited.contains(&dep) {
                queue.push_back(dep);
            }
        }
    }

    // At most one version of a given artifact may be true.
    let mut vars_by_ga: BTreeMap<String, Vec<Variable>> = BTreeMap::new();
    for (coordinate, variable) in &state.instance.variables {
        vars_by_ga
            .entry(coordinate.ga_key())
            .or_default()
            .push(*variable);
    }
    for variables in vars_by_ga.values() {
        for i in 0..variables.len() {
            for j in (i + 1)..variables.len() {
                state.instance.formula.push(Clause::binary(
                    Literal::negative(variables[i]),
                    Literal::negative(variables[j]),
                ));
            }
        }
    }

    // At least one version of each requirement must be true.
    for coordinate in &deduped {
        let choices: Vec<&Coordinate> = match alts.get(coordinate) {
            Some(values) if !values.is_empty() => values.iter().collect(),
            _ => vec![coordinate],
        };
        let literals: Vec<Literal> = choices
            .into_iter()
            .map(|c| Literal::positive(state.var(c)))
            .collect();
        state.instance.formula.push(Clause::new(literals));
    }

    // Overrides are authoritative regardless of what the rest of the
    // formula would prefer.
    for (loser, winner) in &override_pairs {
        let loser_var = state.var(loser);
        let winner_var = state.var(winner);
        state
            .instance
            .formula
            .push(Clause::unit(Literal::negative(loser_var)));
        state.instance.formula.push(Clause::binary(
            Literal::negative(loser_var),
            Literal::positive(winner_var),
        ));
        state
            .instance
            .formula
            .push(Clause::unit(Literal::positive(winner_var)));
    }

    // Weights: per (group, artifact), versions ranked ascending so a
    // maximizing optimizer favors newer versions.
    let mut coords_by_ga: BTreeMap<String, Vec<Coordinate>> = BTreeMap::new();
    for coordinate in state.instance.variables.keys() {
        coords_by_ga
            .entry(coordinate.ga_key())
            .or_default()
            .push(coordinate.clone());
    }
    for versions in coords_by_ga.values_mut() {
        versions.sort_by_key(|c| {
            let version = c.version.clone().unwrap_or_default();
            (ComponentVersion::parse(&version).magnitude(), version)
        });
        for (rank, coordinate) in versions.iter().enumerate() {
            let variable = state.var(coordinate);
            state.instance.weights.insert(variable, rank as u64 + 1);
        }
    }

    Ok(state.instance)
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) struct TableProvider {
        edges: HashMap<Coordinate, Vec<Coordinate>>,
    }

    impl TableProvider {
        pub(crate) fn new(table: Vec<(&'static str, Vec<&'static str>)>) -> Self {
            Self {
                edges: table
                    .into_iter()
                    .map(|(k, deps)| {
                        (
                            Coordinate::parse(k).unwrap(),
                            deps.into_iter()
                                .map(|d| Coordinate::parse(d).unwrap())
                                .collect(),
                        )
                    })
                    .collect(),
            }
        }
    }

    impl DependencyProvider for TableProvider {
        fn direct(&self, coordinate: &Coordinate) -> DepotResult<Vec<Coordinate>> {
            Ok(self.edges.get(coordinate).cloned().unwrap_or_default())
        }

        fn transitive(&self, coordinate: &Coordinate) -> DepotResult<BTreeSet<Coordinate>> {
            let mut out = BTreeSet::new();
            let mut queue = vec![coordinate.clone()];
            while let Some(next) = queue.pop() {
                for dep in self.edges.get(&next).into_iter().flatten() {
                    if out.insert(dep.clone()) {
                        queue.push(dep.clone());
                    }
                }
            }
            Ok(out)
        }
    }

    fn coord(s: &str) -> Coordinate {
        Coordinate::parse(s).unwrap()
    }

    #[test]
    fn variable_mapping_is_bidirectional_and_total() {
        let provider = TableProvider::new(vec![
            ("org.a:a:1.0.0", vec!["org.b:b:1.0.0"]),
            ("org.b:b:1.0.0", vec![]),
        ]);
        let instance = encode(&[coord("org.a:a:1.0.0")], &BTreeMap::new(), &provider).unwrap();

        assert_eq!(instance.variable_count(), 2);
        for (coordinate, variable) in &instance.variables {
            assert_eq!(instance.coordinate_of(*variable), Some(coordinate));
        }
    }

    #[test]
    fn dependency_edges_become_implications() {
        let provider = TableProvider::new(vec![
            ("org.a:a:1.0.0", vec!["org.b:b:1.0.0"]),
            ("org.b:b:1.0.0", vec![]),
        ]);
        let instance = encode(&[coord("org.a:a:1.0.0")], &BTreeMap::new(), &provider).unwrap();

        let a = instance.variable_of(&coord("org.a:a:1.0.0")).unwrap();
        let b = instance.variable_of(&coord("org.b:b:1.0.0")).unwrap();
        let implication = Clause::binary(Literal::negative(a), Literal::positive(b));
        assert!(instance.formula.clauses.contains(&implication));
    }

    #[test]
    fn shared_subgraph_edges_are_emitted_once() {
        // Both roots depend on the same library.
        let provider = TableProvider::new(vec![
            ("org.r:r1:1.0.0", vec!["org.lib:lib:1.0.0"]),
            ("org.r:r2:1.0.0", vec!["org.lib:lib:1.0.0"]),
            ("org.lib:lib:1.0.0", vec!["org.sub:sub:1.0.0"]),
            ("org.sub:sub:1.0.0", vec![]),
        ]);
        let instance = encode(
            &[coord("org.r:r1:1.0.0"), coord("org.r:r2:1.0.0")],
            &BTreeMap::new(),
            &provider,
        )
        .unwrap();

        let lib = instance.variable_of(&coord("org.lib:lib:1.0.0")).unwrap();
        let sub = instance.variable_of(&coord("org.sub:sub:1.0.0")).unwrap();
        let edge = Clause::binary(Literal::negative(lib), Literal::positive(sub));
        let count = instance
            .formula
            .clauses
            .iter()
            .filter(|c| **c == edge)
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn last_required_occurrence_wins() {
        let provider = TableProvider::new(vec![
            ("org.c:c:1.0.0", vec![]),
            ("org.c:c:2.0.0", vec![]),
        ]);
        let instance = encode(
            &[coord("org.c:c:1.0.0"), coord("org.c:c:2.0.0")],
            &BTreeMap::new(),
            &provider,
        )
        .unwrap();

        let loser = instance.variable_of(&coord("org.c:c:1.0.0")).unwrap();
        let winner = instance.variable_of(&coord("org.c:c:2.0.0")).unwrap();
        assert!(instance
            .formula
            .clauses
            .contains(&Clause::unit(Literal::negative(loser))));
        assert!(instance
            .formula
            .clauses
            .contains(&Clause::unit(Literal::positive(winner))));
    }

    #[test]
    fn weights_rank_versions_ascending() {
        let provider = TableProvider::new(vec![
            ("org.a:a:1.0.0", vec!["org.c:c:1.0.0"]),
            ("org.a:a:2.0.0", vec!["org.c:c:2.0.0"]),
            ("org.c:c:1.0.0", vec![]),
            ("org.c:c:2.0.0", vec![]),
        ]);
        let alternatives = BTreeMap::from([(
            coord("org.a:a:1.0.0"),
            vec![coord("org.a:a:1.0.0"), coord("org.a:a:2.0.0")],
        )]);
        let instance = encode(&[coord("org.a:a:1.0.0")], &alternatives, &provider).unwrap();

        let c1 = instance.variable_of(&coord("org.c:c:1.0.0")).unwrap();
        let c2 = instance.variable_of(&coord("org.c:c:2.0.0")).unwrap();
        assert_eq!(instance.weights[&c1], 1);
        assert_eq!(instance.weights[&c2], 2);

        let a1 = instance.variable_of(&coord("org.a:a:1.0.0")).unwrap();
        let a2 = instance.variable_of(&coord("org.a:a:2.0.0")).unwrap();
        assert_eq!(instance.weights[&a1], 1);
        assert_eq!(instance.weights[&a2], 2);
    }

    #[test]
    fn singleton_group_gets_weight_one() {
        let provider = TableProvider::new(vec![("org.a:a:5.0.0", vec![])]);
        let instance = encode(&[coord("org.a:a:5.0.0")], &BTreeMap::new(), &provider).unwrap();
        let a = instance.variable_of(&coord("org.a:a:5.0.0")).unwrap();
        assert_eq!(instance.weights[&a], 1);
    }

    #[test]
    fn mutual_exclusion_over_version_pairs() {
        let provider = TableProvider::new(vec![
            ("org.x:x:1.0.0", vec!["org.y:y:1.0.0"]),
            ("org.x:x:2.0.0", vec!["org.y:y:2.0.0"]),
            ("org.y:y:1.0.0", vec![]),
            ("org.y:y:2.0.0", vec![]),
        ]);
        let alternatives = BTreeMap::from([(
            coord("org.x:x:1.0.0"),
            vec![coord("org.x:x:1.0.0"), coord("org.x:x:2.0.0")],
        )]);
        let instance = encode(&[coord("org.x:x:1.0.0")], &alternatives, &provider).unwrap();

        let y1 = instance.variable_of(&coord("org.y:y:1.0.0")).unwrap();
        let y2 = instance.variable_of(&coord("org.y:y:2.0.0")).unwrap();
        let mutex = Clause::binary(Literal::negative(y1), Literal::negative(y2));
        let mutex_rev = Clause::binary(Literal::negative(y2), Literal::negative(y1));
        assert!(
            instance.formula.clauses.contains(&mutex)
                || instance.formula.clauses.contains(&mutex_rev)
        );
    }
}
