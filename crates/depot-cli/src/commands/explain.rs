//! Command: encode a requirement set, solve it, and explain the outcome.

use std::collections::BTreeMap;
use std::path::Path;

use console::style;
use depot_core::Coordinate;
use depot_solve::{encode, explain_failure, DpllSolver, SatSolver, Verdict};
use depot_util::errors::DepotError;
use miette::Result;

use crate::universe;

pub fn exec(universe_path: &Path, coordinates: &[String], alternatives: &[String]) -> Result<()> {
    let universe = universe::load(universe_path)?;
    let required: Vec<Coordinate> = coordinates
        .iter()
        .map(|s| universe::parse_coordinate(s))
        .collect::<Result<_>>()?;
    let alternatives = parse_alternatives(alternatives)?;

    let instance = encode(&required, &alternatives, &universe)?;
    tracing::debug!(
        "encoded {} variables, {} clauses",
        instance.variable_count(),
        instance.formula.len()
    );

    let verdict = DpllSolver::new().solve(&instance);
    match &verdict {
        Verdict::Satisfiable(assignment) => {
            println!("{}", style("satisfiable").green());
            for coordinate in assignment.selected(&instance) {
                println!("  {coordinate}");
            }
        }
        Verdict::Unsatisfiable(_) | Verdict::Unknown => {
            let response = explain_failure(&verdict, &required);
            print!("{}", style(response).red());
        }
    }
    Ok(())
}

/// Parse repeated `key=v1,v2` alternative declarations.
fn parse_alternatives(raw: &[String]) -> Result<BTreeMap<Coordinate, Vec<Coordinate>>> {
    let mut alternatives = BTreeMap::new();
    for spec in raw {
        let Some((key, versions)) = spec.split_once('=') else {
            return Err(DepotError::Input {
                message: format!("'{spec}' is not a key=v1,v2 alternative declaration"),
            }
            .into());
        };
        let key = universe::parse_coordinate(key.trim())?;
        let versions: Vec<Coordinate> = versions
            .split(',')
            .map(|v| universe::parse_coordinate(v.trim()))
            .collect::<Result<_>>()?;
        alternatives.insert(key, versions);
    }
    Ok(alternatives)
}
