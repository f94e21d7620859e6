//! Command: non-fatal validation of a version's declared dependencies.

use std::path::Path;

use console::style;
use depot_resolver::Resolver;
use miette::Result;

use crate::universe;

pub fn exec(universe_path: &Path, coordinate: &str) -> Result<()> {
    let universe = universe::load(universe_path)?;
    let target = universe::parse_coordinate(coordinate)?;

    let deps = universe.direct(&target);
    let version = target.version.as_deref().unwrap_or_default();
    let messages = Resolver::validate_dependencies(&deps, version);

    if messages.is_empty() {
        println!("{} {target}", style("ok").green());
    } else {
        for message in &messages {
            println!("{} {message}", style("warning:").yellow());
        }
    }
    Ok(())
}
