//! Exclusion resolver: expand version-less exclusion declarations into
//! fully-versioned, transitively-closed exclusion sets.

use std::collections::{BTreeMap, BTreeSet};

use depot_core::Coordinate;
use depot_util::DepotResult;

use crate::LookupFn;

/// Expand each owner's exclusion patterns.
///
/// A version-less pattern (`group:artifact`) is bound to the matching
/// version found in its owner's transitive closure; a pattern with
/// artifact `*` binds against every artifact of its group. Each bound
/// exclusion is then expanded with its own transitive closure, so the
/// whole subtree it would pull in is excluded too. Exclusion lists only
/// grow within one expansion pass; patterns with no match are left as-is
/// and logged.
pub fn expand_exclusions(
    exclusions: &BTreeMap<String, Vec<Coordinate>>,
    lookup: &LookupFn,
) -> DepotResult<BTreeMap<String, Vec<Coordinate>>> {
    let mut expanded = BTreeMap::new();

    for (owner_key, patterns) in exclusions {
        let Some(owner) = Coordinate::parse(owner_key) else {
            tracing::warn!("skipping exclusions with malformed owner key {owner_key}");
            expanded.insert(owner_key.clone(), patterns.clone());
            continue;
        };
        let owner_closure = lookup(std::slice::from_ref(&owner), true)?;

        let mut bound: Vec<Coordinate> = Vec::new();
        for pattern in patterns {
            if pattern.version.is_some() {
                bound.push(pattern.clone());
                continue;
            }
            let matches = bind_pattern(pattern, &owner_closure);
            if matches.is_empty() {
                tracing::debug!(
                    "exclusion {pattern} declared by {owner} matches nothing in its closure"
                );
                bound.push(pattern.clone());
            } else {
                bound.extend(matches);
            }
        }

        // Grow each versioned exclusion with its own subtree.
        let mut grown = bound.clone();
        let mut seen: BTreeSet<Coordinate> = bound.iter().cloned().collect();
        for exclusion in &bound {
            if exclusion.version.is_none() {
                continue;
            }
            for introduced in lookup(std::slice::from_ref(exclusion), true)? {
                if seen.insert(introduced.clone()) {
                    grown.push(introduced);
                }
            }
        }

        expanded.insert(owner_key.clone(), grown);
    }

    Ok(expanded)
}

/// Versions in `closure` matched by a version-less pattern.
fn bind_pattern(pattern: &Coordinate, closure: &BTreeSet<Coordinate>) -> Vec<Coordinate> {
    closure
        .iter()
        .filter(|c| {
            c.group == pattern.group && (pattern.artifact == "*" || c.artifact == pattern.artifact)
        })
        .cloned()
        .collect()
}

/// Flatten an expanded exclusion map into the losing set used by the
/// closure filter: every fully-versioned exclusion across all owners.
pub fn losing_set(expanded: &BTreeMap<String, Vec<Coordinate>>) -> BTreeSet<Coordinate> {
    expanded
        .values()
        .flatten()
        .filter(|c| c.version.is_some())
        .cloned()
        .collect()
}
