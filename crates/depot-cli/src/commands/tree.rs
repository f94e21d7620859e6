//! Command: render a resolved closure as a tree.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use depot_core::Coordinate;
use depot_resolver::{ClosureGraph, Resolver, WalkerContext};
use miette::Result;

use crate::universe;

pub fn exec(universe_path: &Path, coordinate: &str, why: Option<&str>) -> Result<()> {
    let universe = universe::load(universe_path)?;
    let root = universe::parse_coordinate(coordinate)?;

    // Capture the direct-edge table before the fixture moves into the
    // resolver.
    let mut edges: HashMap<Coordinate, Vec<Coordinate>> = HashMap::new();
    for component in &universe.components {
        edges.insert(component.clone(), universe.direct(component));
    }
    let direct = move |c: &Coordinate| edges.get(c).cloned().unwrap_or_default();

    let resolver = Resolver::new(Arc::new(universe.store), Arc::new(universe.repository));
    let ctx = WalkerContext::new();
    let report = resolver.resolve_with_context(&ctx, std::slice::from_ref(&root))?;
    if !report.valid {
        println!("resolution failed; see log for the failing branch");
        return Ok(());
    }

    let mut closure = report.closure;
    closure.remove(&root);
    let graph = ClosureGraph::build(&root, &closure, &direct);

    if let Some(target) = why {
        let target = universe::parse_coordinate(target)?;
        match graph.find_path(&target) {
            Some(path) => {
                println!("Path to {target}:");
                for (i, node) in path.iter().enumerate() {
                    let indent = "  ".repeat(i);
                    println!("{indent}{node}");
                }
            }
            None => println!("Dependency '{target}' not found in the closure."),
        }
        return Ok(());
    }

    print!("{}", graph.print_tree());
    Ok(())
}
