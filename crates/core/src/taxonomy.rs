//! Taxonomic ranks and ancestor-chain validation.
//!
//! Taxa form a strict tree: each node has an optional parent and a cached,
//! recomputed ancestor path. Cycles are rejected at write time; the helpers
//! here are pure so the repository layer can run them against a preloaded
//! parent map inside a transaction.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// Taxonomic ranks in strictly ascending specificity.
///
/// The derived `Ord` follows declaration order, so `ORDER < FAMILY < SPECIES`
/// holds for comparisons between ranks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaxonRank {
    Order,
    Superfamily,
    Family,
    Subfamily,
    Tribe,
    Subtribe,
    Genus,
    Species,
}

impl TaxonRank {
    /// The stored string form (`"SPECIES"` etc).
    pub fn as_str(&self) -> &'static str {
        match self {
            TaxonRank::Order => "ORDER",
            TaxonRank::Superfamily => "SUPERFAMILY",
            TaxonRank::Family => "FAMILY",
            TaxonRank::Subfamily => "SUBFAMILY",
            TaxonRank::Tribe => "TRIBE",
            TaxonRank::Subtribe => "SUBTRIBE",
            TaxonRank::Genus => "GENUS",
            TaxonRank::Species => "SPECIES",
        }
    }
}

impl fmt::Display for TaxonRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaxonRank {
    type Err = CoreError;

    /// Case-insensitive lookup.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ORDER" => Ok(TaxonRank::Order),
            "SUPERFAMILY" => Ok(TaxonRank::Superfamily),
            "FAMILY" => Ok(TaxonRank::Family),
            "SUBFAMILY" => Ok(TaxonRank::Subfamily),
            "TRIBE" => Ok(TaxonRank::Tribe),
            "SUBTRIBE" => Ok(TaxonRank::Subtribe),
            "GENUS" => Ok(TaxonRank::Genus),
            "SPECIES" => Ok(TaxonRank::Species),
            other => Err(CoreError::Validation(format!(
                "Unknown taxon rank: {other}"
            ))),
        }
    }
}

/// Cached display name for a taxon.
///
/// Genus-rank names carry an "sp." suffix so that display names stay unique
/// across ranks (a genus and its type species often share a name).
pub fn display_name(name: &str, rank: TaxonRank) -> String {
    match rank {
        TaxonRank::Genus => format!("{name} sp."),
        _ => name.to_string(),
    }
}

/// Walk the parent chain from `start`, returning ancestors nearest-first.
///
/// `parent_of` is a lookup over the (preloaded) tree. Returns a `Conflict`
/// error if the chain revisits a node, which would mean the stored tree has
/// a cycle.
pub fn ancestor_chain(
    start: DbId,
    parent_of: impl Fn(DbId) -> Option<DbId>,
) -> Result<Vec<DbId>, CoreError> {
    let mut seen = HashSet::from([start]);
    let mut chain = Vec::new();
    let mut cursor = start;

    while let Some(parent) = parent_of(cursor) {
        if !seen.insert(parent) {
            return Err(CoreError::Conflict(format!(
                "Taxon {start} has a cycle in its ancestor chain at {parent}"
            )));
        }
        chain.push(parent);
        cursor = parent;
    }

    Ok(chain)
}

/// Check whether assigning `new_parent` to `taxon` would create a cycle.
///
/// True when `taxon` is its own proposed parent or appears anywhere in the
/// proposed parent's ancestor chain.
pub fn would_create_cycle(
    taxon: DbId,
    new_parent: DbId,
    parent_of: impl Fn(DbId) -> Option<DbId>,
) -> Result<bool, CoreError> {
    if taxon == new_parent {
        return Ok(true);
    }
    let ancestors = ancestor_chain(new_parent, parent_of)?;
    Ok(ancestors.contains(&taxon))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(map: &HashMap<DbId, DbId>) -> impl Fn(DbId) -> Option<DbId> + '_ {
        move |id| map.get(&id).copied()
    }

    #[test]
    fn ranks_are_strictly_ordered() {
        assert!(TaxonRank::Order < TaxonRank::Family);
        assert!(TaxonRank::Family < TaxonRank::Genus);
        assert!(TaxonRank::Genus < TaxonRank::Species);
    }

    #[test]
    fn rank_parses_case_insensitively() {
        assert_eq!("species".parse::<TaxonRank>().unwrap(), TaxonRank::Species);
        assert_eq!("Genus".parse::<TaxonRank>().unwrap(), TaxonRank::Genus);
        assert!("KINGDOM".parse::<TaxonRank>().is_err());
    }

    #[test]
    fn genus_display_name_has_sp_suffix() {
        assert_eq!(display_name("Catocala", TaxonRank::Genus), "Catocala sp.");
        assert_eq!(
            display_name("Catocala ilia", TaxonRank::Species),
            "Catocala ilia"
        );
    }

    #[test]
    fn ancestor_chain_is_nearest_first() {
        // 3 -> 2 -> 1 (root)
        let parents = HashMap::from([(3, 2), (2, 1)]);
        assert_eq!(ancestor_chain(3, lookup(&parents)).unwrap(), vec![2, 1]);
        assert!(ancestor_chain(1, lookup(&parents)).unwrap().is_empty());
    }

    #[test]
    fn ancestor_chain_detects_stored_cycle() {
        let parents = HashMap::from([(1, 2), (2, 1)]);
        assert!(ancestor_chain(1, lookup(&parents)).is_err());
    }

    #[test]
    fn self_parent_is_a_cycle() {
        let parents = HashMap::new();
        assert!(would_create_cycle(1, 1, lookup(&parents)).unwrap());
    }

    #[test]
    fn descendant_parent_is_a_cycle() {
        // 2 is a child of 1; making 1 a child of 2 would close a loop.
        let parents = HashMap::from([(2, 1)]);
        assert!(would_create_cycle(1, 2, lookup(&parents)).unwrap());
    }

    #[test]
    fn unrelated_parent_is_fine() {
        let parents = HashMap::from([(2, 1)]);
        assert!(!would_create_cycle(3, 2, lookup(&parents)).unwrap());
    }
}
