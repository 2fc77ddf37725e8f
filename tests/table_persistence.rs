//! Slot persistence across domain open/save cycles: round-trips, strict
//! saves, and the load path's fall-back-to-defaults behaviour.

mod common;

use common::temp_store;
use worldbuilder::domains::{self, books, DOMAIN_NAMES};

fn accept_any(_: &serde_json::Value) -> Result<(), String> {
    Ok(())
}

#[test]
fn every_domain_round_trips_through_its_slot() {
    let (store, _dir) = temp_store();
    for name in DOMAIN_NAMES {
        let domain = domains::open(name, &store).unwrap();
        let exported = domain.export_tables();
        store
            .save::<serde_json::Value>(domain.storage_key(), &exported, accept_any)
            .unwrap();

        let reopened = domains::open(name, &store).unwrap();
        assert_eq!(
            reopened.export_tables(),
            exported,
            "{name} tables changed across a save/load cycle"
        );
    }
}

#[test]
fn corrupt_slot_falls_back_to_defaults() {
    let (store, _dir) = temp_store();
    let defaults = domains::open("shops", &store).unwrap().export_tables();

    let path = store.slot_path(worldbuilder::domains::shops::STORAGE_KEY);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "{{ not json").unwrap();

    let reopened = domains::open("shops", &store).unwrap();
    assert_eq!(reopened.export_tables(), defaults);
}

#[test]
fn invalid_shape_falls_back_to_defaults() {
    let (store, _dir) = temp_store();
    let defaults = domains::open("books", &store).unwrap().export_tables();

    // Well-formed JSON, wrong shape for the books_v3 slot.
    let path = store.slot_path(books::STORAGE_KEY);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, r#"{"themes": {}}"#).unwrap();

    let reopened = domains::open("books", &store).unwrap();
    assert_eq!(reopened.export_tables(), defaults);
}

#[test]
fn strict_save_rejects_books_without_forbidden_theme() {
    let (store, _dir) = temp_store();
    let mut tables = books::default_tables();
    tables.themes.shift_remove("forbidden");
    let json = serde_json::to_string(&tables).unwrap();

    let err = store
        .save::<books::BookTables>(books::STORAGE_KEY, &json, books::validate)
        .unwrap_err();
    assert!(err.to_string().contains("forbidden"), "{err}");

    // A rejected save leaves no slot behind.
    assert!(store.raw(books::STORAGE_KEY).is_none());
}

#[test]
fn reset_restores_defaults_on_next_open() {
    let (store, _dir) = temp_store();
    let mut tables = worldbuilder::domains::poi::default_tables();
    tables.aesthetic = vec!["Only this".to_string()];
    let json = serde_json::to_string(&tables).unwrap();
    store
        .save::<worldbuilder::domains::poi::PoiTables>(
            worldbuilder::domains::poi::STORAGE_KEY,
            &json,
            worldbuilder::domains::poi::validate,
        )
        .unwrap();

    let defaults = worldbuilder::domains::poi::default_tables();
    store.reset(worldbuilder::domains::poi::STORAGE_KEY).unwrap();
    let reopened = domains::open("poi", &store).unwrap();
    assert_eq!(
        reopened.export_tables(),
        serde_json::to_string_pretty(&defaults).unwrap()
    );
}
