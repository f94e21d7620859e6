//! CLI argument definitions for Depot.
//!
//! Uses `clap` derive macros to define the full command surface. Each
//! command corresponds to a handler in the [`super::commands`] module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "depot",
    version,
    about = "Dependency metadata repository tooling",
    long_about = "Depot computes, validates, and explains dependency relationships \
                  between published component versions identified by \
                  group:artifact:version coordinates."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Universe fixture describing published versions and their
    /// declared dependencies
    #[arg(short, long, global = true, default_value = "universe.toml")]
    pub universe: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute the transitive dependency closure of one or more versions
    Resolve {
        /// Coordinates to resolve (group:artifact:version)
        coordinates: Vec<String>,
        /// Persist the refreshed records to a JSON store snapshot
        #[arg(long)]
        store: Option<PathBuf>,
    },

    /// Render the dependency closure of a version as a tree
    Tree {
        /// Coordinate to render
        coordinate: String,
        /// Show the path to one specific dependency instead
        #[arg(long)]
        why: Option<String>,
    },

    /// Explain why a set of version requirements can or cannot be
    /// jointly satisfied
    Explain {
        /// Required coordinates; for the same group:artifact, the last
        /// one listed wins
        coordinates: Vec<String>,
        /// Alternative versions, as key=v1,v2 (repeatable)
        #[arg(long = "alternative", value_name = "KEY=VERSIONS")]
        alternatives: Vec<String>,
    },

    /// Validate the declared dependencies of a version
    Validate {
        /// Coordinate to validate
        coordinate: String,
    },
}

pub fn parse() -> Cli {
    Cli::parse()
}
