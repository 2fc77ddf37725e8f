//! Content domains: the per-generator table shapes, defaults, validators,
//! and `Domain` implementations the engine drives.
//!
//! Every domain follows the same recipe: serde types whose JSON matches the
//! documents users export (camelCase keys), a built-in default table set, a
//! named shape validator for its versioned storage slot, and the field
//! semantics (selectors, link-groups, fallbacks, formatter).

pub mod books;
pub mod encounters;
pub mod landmass;
pub mod loot;
pub mod names;
pub mod poi;
pub mod quests;
pub mod settlements;
pub mod shops;

use crate::engine::{Domain, PLACEHOLDER};
use crate::store::TableStore;
use indexmap::IndexMap;
use rand::RngCore;

/// Domain names accepted on the command line, in display order.
pub const DOMAIN_NAMES: &[&str] = &[
    "books",
    "shops",
    "poi",
    "encounters",
    "quests",
    "loot",
    "settlements",
    "names",
    "landmass",
];

/// Open a domain by name, loading its tables from the store (or defaults).
pub fn open(name: &str, store: &TableStore) -> Result<Box<dyn Domain>, String> {
    match name {
        "books" => Ok(Box::new(books::BooksDomain::open(store))),
        "shops" => Ok(Box::new(shops::ShopsDomain::open(store))),
        "poi" => Ok(Box::new(poi::PoiDomain::open(store))),
        "encounters" => Ok(Box::new(encounters::EncountersDomain::open(store))),
        "quests" => Ok(Box::new(quests::QuestsDomain::open(store))),
        "loot" => Ok(Box::new(loot::LootDomain::open(store))),
        "settlements" => Ok(Box::new(settlements::SettlementsDomain::open(store))),
        "names" => Ok(Box::new(names::NamesDomain::open(store))),
        "landmass" => Ok(Box::new(landmass::LandmassDomain::open(store))),
        other => Err(format!(
            "unknown domain '{}', expected one of: {}",
            other,
            DOMAIN_NAMES.join(", ")
        )),
    }
}

/// Owned strings from literals; keeps the default-data builders readable.
pub(crate) fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Uniform pick from a string table, degrading to the placeholder when the
/// table is empty. Field generation must never fail.
pub(crate) fn pick_or_placeholder(rng: &mut dyn RngCore, items: &[String]) -> String {
    crate::dice::pick(rng, items)
        .cloned()
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// Resolve a category-keyed table through a fallback chain: the first key
/// whose array exists and is non-empty wins.
pub(crate) fn category_array<'a>(
    map: &'a IndexMap<String, Vec<String>>,
    keys: &[&str],
) -> Option<&'a [String]> {
    for key in keys {
        if let Some(items) = map.get(*key) {
            if !items.is_empty() {
                return Some(items.as_slice());
            }
        }
    }
    None
}

/// Pick from a category-keyed table through a fallback chain, degrading to
/// the placeholder.
pub(crate) fn pick_category(
    rng: &mut dyn RngCore,
    map: &IndexMap<String, Vec<String>>,
    keys: &[&str],
) -> String {
    match category_array(map, keys) {
        Some(items) => pick_or_placeholder(rng, items),
        None => PLACEHOLDER.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn category_fallback_chain() {
        let mut map: IndexMap<String, Vec<String>> = IndexMap::new();
        map.insert("Smithy".into(), vec![]);
        map.insert("Default".into(), strings(&["fallback"]));

        // empty specific array falls through to Default
        assert_eq!(
            category_array(&map, &["Smithy", "Default"]).unwrap(),
            &["fallback".to_string()][..]
        );
        // unknown category falls through too
        assert_eq!(
            category_array(&map, &["Jeweller", "Default"]).unwrap(),
            &["fallback".to_string()][..]
        );
        // nothing resolvable yields None -> placeholder at pick time
        assert!(category_array(&map, &["Jeweller", "Armourer"]).is_none());
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            pick_category(&mut rng, &map, &["Jeweller", "Armourer"]),
            PLACEHOLDER
        );
    }

    #[test]
    fn every_domain_opens_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = TableStore::new(dir.path());
        for name in DOMAIN_NAMES {
            let domain = open(name, &store).unwrap();
            assert_eq!(domain.name(), *name);
            assert!(!domain.fields().is_empty());
        }
        assert!(open("nope", &store).is_err());
    }
}
