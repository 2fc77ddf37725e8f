//! Character names: per-culture given name and surname pools, plus a shared
//! title table. One record offers a masculine and a feminine given name from
//! the selected culture so a GM can pick whichever fits at the table.

use crate::engine::{push_line, Domain, Record, ReleaseScope};
use crate::store::TableStore;
use indexmap::IndexMap;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::{pick_or_placeholder, strings};

pub const STORAGE_KEY: &str = "names_v1";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamePools {
    pub male: Vec<String>,
    pub female: Vec<String>,
    pub surname: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameTables {
    pub categories: Vec<String>,
    pub titles: Vec<String>,
    pub names: IndexMap<String, NamePools>,
}

pub fn validate(tables: &NameTables) -> Result<(), String> {
    if tables.categories.is_empty() {
        return Err("missing 'categories'".into());
    }
    if tables.names.is_empty() {
        return Err("missing 'names'".into());
    }
    for category in &tables.categories {
        if !tables.names.contains_key(category) {
            return Err(format!("missing name pools for category '{category}'"));
        }
    }
    Ok(())
}

pub struct NamesDomain {
    tables: NameTables,
    category: String,
}

const FIELDS: &[&str] = &["male_name", "female_name", "surname", "title"];

impl NamesDomain {
    pub fn open(store: &TableStore) -> Self {
        let tables = store.load(STORAGE_KEY, validate, default_tables);
        Self::with_tables(tables)
    }

    pub fn with_tables(tables: NameTables) -> Self {
        let category = tables
            .categories
            .first()
            .cloned()
            .unwrap_or_else(|| "Human".to_string());
        NamesDomain { tables, category }
    }

    fn pools(&self) -> Option<&NamePools> {
        self.tables
            .names
            .get(&self.category)
            .or_else(|| self.tables.names.values().next())
    }
}

impl Domain for NamesDomain {
    fn name(&self) -> &'static str {
        "names"
    }

    fn storage_key(&self) -> &'static str {
        STORAGE_KEY
    }

    fn fields(&self) -> &'static [&'static str] {
        FIELDS
    }

    fn selectors(&self) -> Vec<(&'static str, String)> {
        vec![("category", self.category.clone())]
    }

    fn set_selector(&mut self, key: &str, value: &str) -> Result<ReleaseScope, String> {
        match key {
            "category" => {
                if !self.tables.categories.iter().any(|c| c == value) {
                    return Err(format!(
                        "unknown category '{}', expected one of: {}",
                        value,
                        self.tables.categories.join(", ")
                    ));
                }
                self.category = value.to_string();
                // Titles are culture-independent and keep their lock.
                Ok(ReleaseScope::Fields(&["male_name", "female_name", "surname"]))
            }
            other => Err(format!("unknown selector '{other}'")),
        }
    }

    fn roll_field(&self, field: &str, rng: &mut dyn RngCore) -> String {
        match field {
            "male_name" => self
                .pools()
                .map(|p| pick_or_placeholder(rng, &p.male))
                .unwrap_or_default(),
            "female_name" => self
                .pools()
                .map(|p| pick_or_placeholder(rng, &p.female))
                .unwrap_or_default(),
            "surname" => self
                .pools()
                .map(|p| pick_or_placeholder(rng, &p.surname))
                .unwrap_or_default(),
            "title" => pick_or_placeholder(rng, &self.tables.titles),
            _ => String::new(),
        }
    }

    fn format(&self, record: &Record) -> String {
        let empty = String::new();
        let get = |field: &str| record.get(field).unwrap_or(&empty);

        let mut text = String::new();
        push_line(&mut text, "Male", get("male_name"));
        push_line(&mut text, "Female", get("female_name"));
        push_line(&mut text, "Surname", get("surname"));
        push_line(&mut text, "Title", get("title"));
        text
    }

    fn export_tables(&self) -> String {
        serde_json::to_string_pretty(&self.tables).unwrap_or_default()
    }

    fn import_tables(&mut self, json: &str) -> Result<(), String> {
        let tables: NameTables =
            serde_json::from_str(json).map_err(|e| format!("invalid JSON: {e}"))?;
        validate(&tables)?;
        self.tables = tables;
        if !self.tables.categories.iter().any(|c| *c == self.category) {
            self.category = self.tables.categories[0].clone();
        }
        Ok(())
    }

    fn reset_tables(&mut self) {
        self.tables = default_tables();
    }
}

fn pools(male: &[&str], female: &[&str], surname: &[&str]) -> NamePools {
    NamePools {
        male: strings(male),
        female: strings(female),
        surname: strings(surname),
    }
}

/// Built-in name tables.
pub fn default_tables() -> NameTables {
    let mut names = IndexMap::new();
    names.insert(
        "Dwarf".to_string(),
        pools(
            &["Adrik", "Baern", "Dain", "Eberk", "Harbek", "Morgran", "Rurik", "Thorin", "Veit", "Vondal"],
            &["Amber", "Bardryn", "Dagnal", "Eldeth", "Gunnloda", "Helja", "Kathra", "Riswynn", "Torbera", "Vistra"],
            &["Balderk", "Battlehammer", "Dankil", "Fireforge", "Frostbeard", "Holderhek", "Ironfist", "Loderr", "Strakeln", "Ungart"],
        ),
    );
    names.insert(
        "Elf".to_string(),
        pools(
            &["Adran", "Aramil", "Carric", "Erevan", "Galinndan", "Immeral", "Laucian", "Quarion", "Soveliss", "Thamior"],
            &["Adrie", "Althaea", "Caelynn", "Drusilia", "Enna", "Ielenia", "Keyleth", "Quelenna", "Sariel", "Valanthe"],
            &["Amakiir", "Galanodel", "Holimion", "Liadon", "Meliamne", "Nailo", "Siannodel", "Xiloscient"],
        ),
    );
    names.insert(
        "Human".to_string(),
        pools(
            &["Ander", "Bram", "Corwin", "Darvin", "Evendur", "Gareth", "Malark", "Randal", "Stedd", "Tomas"],
            &["Arveene", "Brianne", "Esvele", "Jhessail", "Kerri", "Lureene", "Miri", "Rowan", "Shandri", "Tessele"],
            &["Amblecrown", "Buckman", "Dundragon", "Evenwood", "Greycastle", "Tallstag", "Thornton", "Windrivver"],
        ),
    );
    names.insert(
        "Halfling".to_string(),
        pools(
            &["Alton", "Cade", "Corrin", "Eldon", "Errich", "Finnan", "Garret", "Lindal", "Merric", "Perrin"],
            &["Andry", "Bree", "Callie", "Cora", "Euphemia", "Jillian", "Kithri", "Lavinia", "Seraphina", "Verna"],
            &["Brushgather", "Goodbarrel", "Greenbottle", "High-hill", "Hilltopple", "Leagallow", "Tealeaf", "Underbough"],
        ),
    );
    names.insert(
        "Orc".to_string(),
        pools(
            &["Dench", "Feng", "Gell", "Henk", "Holg", "Imsh", "Keth", "Mhurren", "Ront", "Thokk"],
            &["Baggi", "Emen", "Engong", "Kansif", "Myev", "Neega", "Ovak", "Shautha", "Sutha", "Vola"],
            &["Bonecrusher", "Doomhammer", "Elfsplitter", "Skullsplitter", "Tusk", "Wolfrider"],
        ),
    );
    names.insert(
        "Fantasy".to_string(),
        pools(
            &["Azrael", "Corvus", "Dathen", "Kaelith", "Lorcan", "Maeron", "Orin", "Sylas", "Theron", "Zephyr"],
            &["Aeliana", "Caelia", "Elowen", "Isolde", "Lyra", "Morwenna", "Nimue", "Seraphine", "Thessaly", "Ysolde"],
            &["Ashveil", "Duskwalker", "Emberfall", "Nightriver", "Ravenmoor", "Stormwright", "Thornefield", "Wintermere"],
        ),
    );
    names.insert(
        "Roman".to_string(),
        pools(
            &["Aulus", "Cassius", "Decimus", "Gaius", "Lucius", "Marcus", "Quintus", "Septimus", "Titus", "Varro"],
            &["Aelia", "Claudia", "Drusilla", "Flavia", "Julia", "Livia", "Octavia", "Sabina", "Tullia", "Valeria"],
            &["Aquilinus", "Corvinus", "Florianus", "Macrinus", "Severus", "Varian", "Vitellius"],
        ),
    );
    names.insert(
        "Japanese".to_string(),
        pools(
            &["Akira", "Daichi", "Haruto", "Hiroshi", "Kenji", "Makoto", "Ren", "Sora", "Takeshi", "Yuki"],
            &["Aiko", "Emi", "Hana", "Kaede", "Mei", "Miyu", "Rin", "Sakura", "Yua", "Yumi"],
            &["Fujimoto", "Hayashi", "Ishikawa", "Kobayashi", "Nakamura", "Sato", "Takahashi", "Yamamoto"],
        ),
    );

    NameTables {
        categories: strings(&[
            "Dwarf", "Elf", "Human", "Halfling", "Orc", "Fantasy", "Roman", "Japanese",
        ]),
        titles: strings(&[
            "the Bold", "the Wise", "the Unlucky", "of the Vale", "the Younger",
            "the Elder", "Ironhand", "the Quiet", "the Red", "Twice-Born",
            "the Wanderer", "of the Broken Tower",
        ]),
        names,
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
    fn validator_requires_pools_for_every_category() {
        let mut tables = default_tables();
        tables.names.shift_remove("Orc");
        let err = validate(&tables).unwrap_err();
        assert!(err.contains("Orc"));
    }

    #[test]
    fn names_track_category() {
        let mut domain = NamesDomain::with_tables(default_tables());
        domain.set_selector("category", "Dwarf").unwrap();
        let expected = &default_tables().names["Dwarf"];
        for seed in 0..15 {
            assert!(expected.male.contains(&domain.roll_field("male_name", &mut rng(seed))));
            assert!(expected.surname.contains(&domain.roll_field("surname", &mut rng(seed + 100))));
        }
    }

    #[test]
    fn category_change_keeps_title_lock_scope() {
        let mut domain = NamesDomain::with_tables(default_tables());
        let scope = domain.set_selector("category", "Elf").unwrap();
        assert_eq!(
            scope,
            ReleaseScope::Fields(&["male_name", "female_name", "surname"])
        );
    }

    #[test]
    fn unknown_category_is_rejected() {
        let mut domain = NamesDomain::with_tables(default_tables());
        assert!(domain.set_selector("category", "Martian").is_err());
    }
}
