//! Treasure hoard allocation: value conservation, tier ranges, and themed
//! magic item selection against the built-in tables.

mod common;

use common::rng;
use worldbuilder::domains::loot::{self, HoardParams, Rarity};

#[test]
fn every_tier_conserves_gold_exactly() {
    let tables = loot::default_tables().treasure_hoard;
    let params = HoardParams::default();
    for tier in ["0-4", "5-10", "11-16", "17+"] {
        for seed in 0..25 {
            let hoard = loot::allocate(tier, "Any", &tables, &params, &mut rng(seed)).unwrap();
            let valuables: u64 = hoard.valuables.iter().map(|v| v.value).sum();
            assert_eq!(
                valuables + hoard.coins_gp,
                hoard.total_gp,
                "tier {tier} seed {seed} leaked gold"
            );
        }
    }
}

#[test]
fn low_tier_total_matches_its_dice() {
    // "2d4 * 100" only ever yields multiples of 100 in [200, 800].
    let tables = loot::default_tables().treasure_hoard;
    let params = HoardParams::default();
    for seed in 0..50 {
        let hoard = loot::allocate("0-4", "Any", &tables, &params, &mut rng(seed)).unwrap();
        assert!((200..=800).contains(&hoard.total_gp), "{}", hoard.total_gp);
        assert_eq!(hoard.total_gp % 100, 0);
    }
}

#[test]
fn top_tier_magic_items_skip_common() {
    let tables = loot::default_tables().treasure_hoard;
    let params = HoardParams::default();
    for seed in 0..40 {
        let hoard = loot::allocate("17+", "Arcana", &tables, &params, &mut rng(seed)).unwrap();
        assert!(!hoard.magic_items.is_empty(), "17+ always rolls items");
        for item in &hoard.magic_items {
            assert_ne!(item.rarity, Rarity::Common, "seed {seed}: {item:?}");
            assert_ne!(item.rarity, Rarity::Uncommon, "seed {seed}: {item:?}");
        }
    }
}

#[test]
fn unknown_tier_and_theme_are_rejected() {
    let tables = loot::default_tables().treasure_hoard;
    let params = HoardParams::default();

    let err = loot::allocate("99", "Any", &tables, &params, &mut rng(1)).unwrap_err();
    assert!(err.contains("unknown CR tier"));

    let err = loot::allocate("17+", "Gastronomy", &tables, &params, &mut rng(2)).unwrap_err();
    assert!(err.contains("unknown theme"));
}

#[test]
fn summary_names_every_component() {
    let tables = loot::default_tables().treasure_hoard;
    let hoard = loot::allocate("5-10", "Any", &tables, &HoardParams::default(), &mut rng(3)).unwrap();
    let text = hoard.summary();
    assert!(text.contains("Treasure Hoard"));
    assert!(text.contains(&format!("{} gp total", hoard.total_gp)));
    assert!(text.contains("Assorted coins"));
}
