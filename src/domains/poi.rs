//! Places of interest: taverns, libraries, and other urban locations with a
//! key figure, an atmosphere, a speciality, and a hook.
//!
//! Name parts and specialities are keyed by place type and fall back to the
//! "Inn / Tavern" tables when a user-added type has no entries of its own.

use crate::engine::{push_line, Domain, Record, ReleaseScope};
use crate::store::TableStore;
use indexmap::IndexMap;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::{pick_category, pick_or_placeholder, strings};

pub const STORAGE_KEY: &str = "poi_v1";

const FALLBACK_TYPE: &str = "Inn / Tavern";

pub type TypeTables = IndexMap<String, Vec<String>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoiTables {
    pub poi_types: Vec<String>,
    pub name_prefix: TypeTables,
    pub name_suffix: TypeTables,
    pub key_figure: Vec<String>,
    pub aesthetic: Vec<String>,
    pub speciality: TypeTables,
    pub conflict: Vec<String>,
}

pub fn validate(tables: &PoiTables) -> Result<(), String> {
    if tables.poi_types.is_empty() {
        return Err("missing 'poiTypes'".into());
    }
    if tables.name_prefix.is_empty() {
        return Err("missing 'namePrefix'".into());
    }
    if tables.speciality.is_empty() {
        return Err("missing 'speciality'".into());
    }
    Ok(())
}

pub struct PoiDomain {
    tables: PoiTables,
    poi_type: String,
}

const FIELDS: &[&str] = &[
    "name",
    "type",
    "key_figure",
    "aesthetic",
    "speciality",
    "conflict",
];

impl PoiDomain {
    pub fn open(store: &TableStore) -> Self {
        let tables = store.load(STORAGE_KEY, validate, default_tables);
        Self::with_tables(tables)
    }

    pub fn with_tables(tables: PoiTables) -> Self {
        let poi_type = tables
            .poi_types
            .first()
            .cloned()
            .unwrap_or_else(|| FALLBACK_TYPE.to_string());
        PoiDomain { tables, poi_type }
    }
}

impl Domain for PoiDomain {
    fn name(&self) -> &'static str {
        "poi"
    }

    fn storage_key(&self) -> &'static str {
        STORAGE_KEY
    }

    fn fields(&self) -> &'static [&'static str] {
        FIELDS
    }

    fn reroll_cascade(&self, field: &str) -> &'static [&'static str] {
        match field {
            "type" => &["name", "speciality"],
            _ => &[],
        }
    }

    fn selectors(&self) -> Vec<(&'static str, String)> {
        vec![("type", self.poi_type.clone())]
    }

    fn set_selector(&mut self, key: &str, value: &str) -> Result<ReleaseScope, String> {
        match key {
            "type" => {
                if !self.tables.poi_types.iter().any(|t| t == value) {
                    return Err(format!(
                        "unknown place type '{}', expected one of: {}",
                        value,
                        self.tables.poi_types.join(", ")
                    ));
                }
                self.poi_type = value.to_string();
                Ok(ReleaseScope::Fields(&["name", "speciality"]))
            }
            other => Err(format!("unknown selector '{other}'")),
        }
    }

    fn roll_field(&self, field: &str, rng: &mut dyn RngCore) -> String {
        let tables = &self.tables;
        let chain: &[&str] = &[&self.poi_type, FALLBACK_TYPE];
        match field {
            "name" => format!(
                "{} {}",
                pick_category(rng, &tables.name_prefix, chain),
                pick_category(rng, &tables.name_suffix, chain)
            ),
            "type" => self.poi_type.clone(),
            "key_figure" => pick_or_placeholder(rng, &tables.key_figure),
            "aesthetic" => pick_or_placeholder(rng, &tables.aesthetic),
            "speciality" => pick_category(rng, &tables.speciality, chain),
            "conflict" => pick_or_placeholder(rng, &tables.conflict),
            _ => String::new(),
        }
    }

    fn format(&self, record: &Record) -> String {
        let empty = String::new();
        let get = |field: &str| record.get(field).unwrap_or(&empty);

        let mut text = String::new();
        push_line(&mut text, "", get("name"));
        push_line(&mut text, "", get("type"));
        push_line(&mut text, "Key Figure", get("key_figure"));
        push_line(&mut text, "Aesthetic", get("aesthetic"));
        push_line(&mut text, "Speciality / Feature", get("speciality"));
        push_line(&mut text, "Conflict / Hook", get("conflict"));
        text
    }

    fn export_tables(&self) -> String {
        serde_json::to_string_pretty(&self.tables).unwrap_or_default()
    }

    fn import_tables(&mut self, json: &str) -> Result<(), String> {
        let tables: PoiTables =
            serde_json::from_str(json).map_err(|e| format!("invalid JSON: {e}"))?;
        validate(&tables)?;
        self.tables = tables;
        if !self.tables.poi_types.iter().any(|t| *t == self.poi_type) {
            self.poi_type = self
                .tables
                .poi_types
                .first()
                .cloned()
                .unwrap_or_else(|| FALLBACK_TYPE.to_string());
        }
        Ok(())
    }

    fn reset_tables(&mut self) {
        self.tables = default_tables();
    }
}

fn type_table(entries: &[(&str, &[&str])]) -> TypeTables {
    entries
        .iter()
        .map(|(key, items)| (key.to_string(), strings(items)))
        .collect()
}

/// Built-in place tables.
pub fn default_tables() -> PoiTables {
    PoiTables {
        poi_types: strings(&[
            "Inn / Tavern",
            "Library",
            "Brothel",
            "Restaurant",
            "Gala / Ballroom",
        ]),
        name_prefix: type_table(&[
            ("Inn / Tavern", &["The Prancing", "The Sleeping", "The Drunken", "The Mucky", "The Gilded"]),
            ("Library", &["The Grand", "The Silent", "The Forgotten", "The Elder", "The High"]),
            ("Brothel", &["The Velvet", "The Gilded", "The Whispering", "The Ruby", "The Moonlit"]),
            ("Restaurant", &["The Savoury", "The Golden", "The Salty", "The King's", "The Singing"]),
            ("Gala / Ballroom", &["The Starlight", "The Ember", "The Grand", "The Mirror", "The Noble's"]),
        ]),
        name_suffix: type_table(&[
            ("Inn / Tavern", &["Pony", "Giant", "Clam", "Duck", "Rose"]),
            ("Library", &["Archive", "Athenaeum", "Scriptorium", "Tome", "Lyceum"]),
            ("Brothel", &["Lilly", "Cage", "Boudoir", "Lady", "Garden"]),
            ("Restaurant", &["Spoon", "Kettle", "Table", "Boar", "Spice"]),
            ("Gala / Ballroom", &["Hall", "Pavilion", "Court", "Room", "Fete"]),
        ]),
        key_figure: strings(&[
            "A gruff, no-nonsense owner",
            "A charming host who knows all the gossip",
            "A stoic, elderly librarian",
            "A flamboyant proprietor in fine silks",
            "A weary-looking worker who has seen too much",
            "An ex-adventurer running their 'retirement' business",
        ]),
        aesthetic: strings(&[
            "Loud, smoky, and crowded",
            "Quiet, dusty, and smells of old parchment",
            "Opulent, with velvet curtains and thick incense",
            "Clean and bright, smells of baking bread",
            "Chilly and echoing, lit by candles",
            "Rundown, with sagging floors and patched walls",
        ]),
        speciality: type_table(&[
            ("Inn / Tavern", &[
                "A mysteriously strong ale",
                "A 'famous' meat pie",
                "A roaring fireplace that never goes out",
                "A minstrel who only sings sad songs",
            ]),
            ("Library", &[
                "A forbidden/restricted section",
                "A seemingly infinite collection of scrolls",
                "A resident 'Archivist' (wizard)",
                "Has books written in an unknown language",
            ]),
            ("Brothel", &[
                "Utter discretion",
                "Access to influential patrons",
                "Rumoured to be a spy headquarters",
                "Exotic 'talents' from faraway lands",
            ]),
            ("Restaurant", &[
                "A dish 'to die for' (literally)",
                "A secret menu for special guests",
                "A bizarre, foreign delicacy",
                "The fastest service in town",
            ]),
            ("Gala / Ballroom", &[
                "A legendary annual masquerade",
                "A clockwork orchestra",
                "Enchanted lighting that changes with the mood",
                "Strict, invitation-only entry",
            ]),
        ]),
        conflict: strings(&[
            "A regular patron has gone missing",
            "The City Watch is cracking down on them",
            "A rival establishment is stealing customers",
            "It's a meeting place for a secret society",
            "The owner is being blackmailed",
            "A ghost is haunting the premises",
        ]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    #[test]
    fn defaults_pass_validation() {
        validate(&default_tables()).unwrap();
    }

    #[test]
    fn speciality_tracks_type() {
        let mut domain = PoiDomain::with_tables(default_tables());
        domain.set_selector("type", "Library").unwrap();
        let expected = &default_tables().speciality["Library"];
        for seed in 0..20 {
            let speciality = domain.roll_field("speciality", &mut rng(seed));
            assert!(expected.contains(&speciality));
        }
    }

    #[test]
    fn user_added_type_falls_back_to_tavern_tables() {
        let mut tables = default_tables();
        tables.poi_types.push("Bathhouse".to_string());
        let mut domain = PoiDomain::with_tables(tables);
        domain.set_selector("type", "Bathhouse").unwrap();
        let tavern = &default_tables().speciality["Inn / Tavern"];
        let speciality = domain.roll_field("speciality", &mut rng(3));
        assert!(tavern.contains(&speciality));
    }

    #[test]
    fn type_selector_rejects_unknown() {
        let mut domain = PoiDomain::with_tables(default_tables());
        assert!(domain.set_selector("type", "Sewer").is_err());
        assert_eq!(domain.selectors()[0].1, "Inn / Tavern");
    }

    #[test]
    fn format_orders_name_then_details() {
        let domain = PoiDomain::with_tables(default_tables());
        let mut record = Record::new();
        record.insert("name", "The Prancing Pony".to_string());
        record.insert("type", "Inn / Tavern".to_string());
        record.insert("conflict", "A ghost is haunting the premises".to_string());
        let text = domain.format(&record);
        assert!(text.starts_with("The Prancing Pony\nInn / Tavern"));
        assert!(text.ends_with("Conflict / Hook: A ghost is haunting the premises"));
    }
}
