//! Landmass generator: continents, islands, and stranger shores, with
//! biome-keyed features plus a history and an unanswered mystery.

use crate::engine::{push_line, Domain, Record, ReleaseScope};
use crate::store::TableStore;
use indexmap::IndexMap;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::{pick_category, pick_or_placeholder, strings};

pub const STORAGE_KEY: &str = "landmass_v1";

const FALLBACK_BIOME: &str = "Standard";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandmassTables {
    pub types: Vec<String>,
    pub biomes: Vec<String>,
    pub name_prefix: Vec<String>,
    pub name_suffix: Vec<String>,
    pub shape: Vec<String>,
    /// Biome-keyed feature tables.
    pub features: IndexMap<String, Vec<String>>,
    pub history: Vec<String>,
    pub mystery: Vec<String>,
}

pub fn validate(tables: &LandmassTables) -> Result<(), String> {
    if tables.types.is_empty() {
        return Err("missing 'types'".into());
    }
    if tables.biomes.is_empty() {
        return Err("missing 'biomes'".into());
    }
    if tables.features.is_empty() {
        return Err("missing 'features'".into());
    }
    Ok(())
}

pub struct LandmassDomain {
    tables: LandmassTables,
    landmass_type: String,
    biome: String,
}

const FIELDS: &[&str] = &[
    "name", "type", "biome", "shape", "feature", "history", "mystery",
];

impl LandmassDomain {
    pub fn open(store: &TableStore) -> Self {
        let tables = store.load(STORAGE_KEY, validate, default_tables);
        Self::with_tables(tables)
    }

    pub fn with_tables(tables: LandmassTables) -> Self {
        let landmass_type = tables
            .types
            .first()
            .cloned()
            .unwrap_or_else(|| "Continent".to_string());
        let biome = tables
            .biomes
            .first()
            .cloned()
            .unwrap_or_else(|| FALLBACK_BIOME.to_string());
        LandmassDomain {
            tables,
            landmass_type,
            biome,
        }
    }
}

impl Domain for LandmassDomain {
    fn name(&self) -> &'static str {
        "landmass"
    }

    fn storage_key(&self) -> &'static str {
        STORAGE_KEY
    }

    fn fields(&self) -> &'static [&'static str] {
        FIELDS
    }

    fn reroll_cascade(&self, field: &str) -> &'static [&'static str] {
        match field {
            "biome" => &["feature"],
            _ => &[],
        }
    }

    fn selectors(&self) -> Vec<(&'static str, String)> {
        vec![
            ("type", self.landmass_type.clone()),
            ("biome", self.biome.clone()),
        ]
    }

    fn set_selector(&mut self, key: &str, value: &str) -> Result<ReleaseScope, String> {
        match key {
            "type" => {
                if !self.tables.types.iter().any(|t| t == value) {
                    return Err(format!(
                        "unknown landmass type '{}', expected one of: {}",
                        value,
                        self.tables.types.join(", ")
                    ));
                }
                self.landmass_type = value.to_string();
                Ok(ReleaseScope::Fields(&[]))
            }
            "biome" => {
                if !self.tables.biomes.iter().any(|b| b == value) {
                    return Err(format!(
                        "unknown biome '{}', expected one of: {}",
                        value,
                        self.tables.biomes.join(", ")
                    ));
                }
                self.biome = value.to_string();
                Ok(ReleaseScope::Fields(&["feature"]))
            }
            other => Err(format!("unknown selector '{other}'")),
        }
    }

    fn roll_field(&self, field: &str, rng: &mut dyn RngCore) -> String {
        let tables = &self.tables;
        match field {
            "name" => format!(
                "{}{}",
                pick_or_placeholder(rng, &tables.name_prefix),
                pick_or_placeholder(rng, &tables.name_suffix)
            ),
            "type" => self.landmass_type.clone(),
            "biome" => self.biome.clone(),
            "shape" => pick_or_placeholder(rng, &tables.shape),
            "feature" => pick_category(rng, &tables.features, &[&self.biome, FALLBACK_BIOME]),
            "history" => pick_or_placeholder(rng, &tables.history),
            "mystery" => pick_or_placeholder(rng, &tables.mystery),
            _ => String::new(),
        }
    }

    fn format(&self, record: &Record) -> String {
        let empty = String::new();
        let get = |field: &str| record.get(field).unwrap_or(&empty);

        let mut text = String::new();
        push_line(&mut text, "", get("name"));
        if !get("type").is_empty() {
            push_line(
                &mut text,
                "",
                &format!("{} ({})", get("type"), get("biome")),
            );
        }
        push_line(&mut text, "Shape", get("shape"));
        push_line(&mut text, "Notable Feature", get("feature"));
        push_line(&mut text, "History", get("history"));
        push_line(&mut text, "Mystery", get("mystery"));
        text
    }

    fn export_tables(&self) -> String {
        serde_json::to_string_pretty(&self.tables).unwrap_or_default()
    }

    fn import_tables(&mut self, json: &str) -> Result<(), String> {
        let tables: LandmassTables =
            serde_json::from_str(json).map_err(|e| format!("invalid JSON: {e}"))?;
        validate(&tables)?;
        self.tables = tables;
        if !self.tables.types.iter().any(|t| *t == self.landmass_type) {
            self.landmass_type = self.tables.types[0].clone();
        }
        if !self.tables.biomes.iter().any(|b| *b == self.biome) {
            self.biome = self.tables.biomes[0].clone();
        }
        Ok(())
    }

    fn reset_tables(&mut self) {
        self.tables = default_tables();
    }
}

/// Built-in landmass tables.
pub fn default_tables() -> LandmassTables {
    let mut features = IndexMap::new();
    features.insert(
        "Standard".to_string(),
        strings(&[
            "A mountain range that splits the land in two",
            "A vast inland sea with no visible outlet",
            "An ancient forest older than any map",
            "A river delta dotted with a hundred tiny fiefdoms",
            "Rolling plains broken by solitary, flat-topped hills",
            "A ring of watchtowers, all facing inward",
        ]),
    );
    features.insert(
        "Jungle".to_string(),
        strings(&[
            "Canopy so thick that whole towns live in the branches",
            "Step-pyramids swallowed by vines, still faintly humming",
            "A river that runs hot, steaming at dawn",
            "Flowers the size of rowboats that close at noon",
            "A clearing where nothing grows, perfectly circular",
        ]),
    );
    features.insert(
        "Desert".to_string(),
        strings(&[
            "Dunes that ring like glass when the wind crosses them",
            "A buried highway of fitted stone, miles long",
            "An oasis guarded by a very patient sphinx",
            "Salt flats that mirror the sky without a seam",
            "Canyons carved by a river that no longer exists",
        ]),
    );
    features.insert(
        "Arctic".to_string(),
        strings(&[
            "A glacier with a city visible deep inside the ice",
            "Hot springs that keep one valley green all year",
            "Auroras that local shamans insist are writing",
            "A frozen strait that thaws for nine days each year",
            "Ice caves that echo with sounds from elsewhere",
        ]),
    );
    features.insert(
        "Swamp".to_string(),
        strings(&[
            "Raised plank roads connecting stilted villages",
            "Ghost-lights that reliably lead travellers somewhere",
            "A drowned cathedral whose bell still tolls",
            "Peat bogs that preserve whatever falls into them",
            "Mangrove labyrinths that rearrange between seasons",
        ]),
    );

    LandmassTables {
        types: strings(&["Continent", "Island", "Archipelago", "Peninsula"]),
        biomes: strings(&["Standard", "Jungle", "Desert", "Arctic", "Swamp"]),
        features,
        name_prefix: strings(&[
            "Vael", "Thar", "Oro", "Kael", "Mor", "Ash", "Syl", "Dra", "Nym", "Val",
        ]),
        name_suffix: strings(&[
            "doria", "gard", "mura", "thia", "wyn", "mark", "eth", "ora", "heim", "ione",
        ]),
        shape: strings(&[
            "A long crescent, its inner coast one great natural harbour",
            "A rough star, each arm ending in a peninsula",
            "A compact oval ringed by sheer cliffs",
            "A shattered outline of fjords and deep inlets",
            "Two great lobes joined by a narrow isthmus",
            "A sprawling, irregular mass with no two coasts alike",
        ]),
        history: strings(&[
            "An empire rose and fell here, leaving only its roads",
            "It was terraformed by giants, or so the stones suggest",
            "Every few centuries it changes hands in a single battle",
            "Colonised seven times, successfully only once",
            "It was once the floor of a sea that left without warning",
            "Three kingdoms still claim the whole of it on their maps",
        ]),
        mystery: strings(&[
            "Compasses disagree about north here, politely",
            "No bird will overfly the central highlands",
            "The oldest maps show one more river than exists today",
            "Every ruin on the landmass faces the same distant point",
            "Children born here all share one recurring dream",
            "The tide comes in on a schedule that matches no moon",
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
    fn default_features_cover_every_biome() {
        let tables = default_tables();
        for biome in &tables.biomes {
            let features = tables.features.get(biome);
            assert!(
                features.is_some_and(|f| !f.is_empty()),
                "no feature table for biome '{biome}'"
            );
        }
    }

    #[test]
    fn feature_tracks_biome_with_fallback() {
        let mut domain = LandmassDomain::with_tables(default_tables());
        domain.set_selector("biome", "Desert").unwrap();
        let expected = &default_tables().features["Desert"];
        for seed in 0..15 {
            let feature = domain.roll_field("feature", &mut rng(seed));
            assert!(expected.contains(&feature));
        }

        // A biome with no feature table degrades to Standard.
        let mut tables = default_tables();
        tables.biomes.push("Volcanic".to_string());
        let mut domain = LandmassDomain::with_tables(tables);
        domain.set_selector("biome", "Volcanic").unwrap();
        let standard = &default_tables().features["Standard"];
        assert!(standard.contains(&domain.roll_field("feature", &mut rng(42))));
    }

    #[test]
    fn type_change_releases_no_field_locks() {
        let mut domain = LandmassDomain::with_tables(default_tables());
        assert_eq!(
            domain.set_selector("type", "Island").unwrap(),
            ReleaseScope::Fields(&[])
        );
    }

    #[test]
    fn name_is_a_single_compound_word() {
        let domain = LandmassDomain::with_tables(default_tables());
        let name = domain.roll_field("name", &mut rng(7));
        assert!(!name.contains(' '));
        assert!(name.len() >= 5);
    }
}
