//! Command: compute transitive dependency closures.

use std::path::Path;
use std::sync::Arc;

use console::style;
use depot_resolver::{Resolver, WalkerContext};
use depot_store::{FileStore, ProjectStore};
use miette::Result;

use crate::universe;

pub fn exec(universe_path: &Path, coordinates: &[String], store_path: Option<&Path>) -> Result<()> {
    let universe = universe::load(universe_path)?;
    let requested: Vec<_> = coordinates
        .iter()
        .map(|s| universe::parse_coordinate(s))
        .collect::<Result<_>>()?;

    let resolver = Resolver::new(Arc::new(universe.store), Arc::new(universe.repository));

    let ctx = WalkerContext::new();
    let report = resolver.resolve_with_context(&ctx, &requested)?;

    if !report.valid {
        println!("{}", style("resolution failed; see log for the failing branch").red());
        return Ok(());
    }

    println!(
        "{} ({} coordinates)",
        style("resolved").green(),
        report.closure.len()
    );
    for coordinate in &report.closure {
        println!("  {coordinate}");
    }

    if let Some(path) = store_path {
        let file_store = FileStore::open(path)?;
        for coordinate in &requested {
            if let Some(cached) = ctx.get(coordinate) {
                let mut record = cached.record.clone();
                if let Some(report) = cached.report() {
                    record.transitive_report = report;
                }
                file_store.upsert(coordinate, record);
            }
        }
        file_store.save()?;
        println!("store snapshot written to {}", path.display());
    }

    Ok(())
}
