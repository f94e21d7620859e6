//! Override engine: collapse multiple versions of one `(group, artifact)`
//! to a single winner and strip what only the losing versions would have
//! introduced.

use std::collections::{BTreeSet, HashMap};

use depot_core::Coordinate;
use depot_util::DepotResult;

use crate::LookupFn;

/// Remove from `candidates` every version of an overrider's
/// `(group, artifact)` other than the overrider itself, together with
/// everything only those shadowed versions would have pulled in
/// transitively.
///
/// Pure function; `lookup` typically delegates to the walker context.
pub fn override_with(
    candidates: &[Coordinate],
    overriders: &[Coordinate],
    lookup: &LookupFn,
) -> DepotResult<Vec<Coordinate>> {
    let mut by_artifact: HashMap<String, Vec<&Coordinate>> = HashMap::new();
    for candidate in candidates {
        by_artifact
            .entry(candidate.ga_key())
            .or_default()
            .push(candidate);
    }

    let overrider_set: BTreeSet<&Coordinate> = overriders.iter().collect();
    let mut shadowed = BTreeSet::new();
    for overrider in overriders {
        let Some(group) = by_artifact.get(&overrider.ga_key()) else {
            continue;
        };
        for candidate in group {
            // An overrider never shadows itself or another overrider.
            if candidate.version != overrider.version && !overrider_set.contains(candidate) {
                shadowed.insert((*candidate).clone());
            }
        }
    }

    strip(candidates, &shadowed, lookup)
}

/// Remove a losing set and its unique transitive contributions from a
/// candidate list. Shared by the override path and the exclusion filter.
pub fn strip(
    candidates: &[Coordinate],
    losers: &BTreeSet<Coordinate>,
    lookup: &LookupFn,
) -> DepotResult<Vec<Coordinate>> {
    if losers.is_empty() {
        return Ok(candidates.to_vec());
    }

    let mut to_delete: BTreeSet<Coordinate> = losers.clone();
    for loser in losers {
        let introduced = lookup(std::slice::from_ref(loser), true)?;
        tracing::debug!("{loser} loses, dropping {} transitive entries", introduced.len());
        to_delete.extend(introduced);
    }

    Ok(candidates
        .iter()
        .filter(|c| !to_delete.contains(*c))
        .cloned()
        .collect())
}
