//! Command dispatch and handler modules.

mod explain;
mod resolve;
mod tree;
mod validate;

use miette::Result;

use crate::cli::{Cli, Command};

/// Route a parsed CLI invocation to the appropriate command handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Resolve {
            ref coordinates,
            ref store,
        } => resolve::exec(&cli.universe, coordinates, store.as_deref()),
        Command::Tree {
            ref coordinate,
            ref why,
        } => tree::exec(&cli.universe, coordinate, why.as_deref()),
        Command::Explain {
            ref coordinates,
            ref alternatives,
        } => explain::exec(&cli.universe, coordinates, alternatives),
        Command::Validate { ref coordinate } => validate::exec(&cli.universe, coordinate),
    }
}
