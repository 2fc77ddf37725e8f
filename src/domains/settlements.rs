//! Settlement generator: typed name parts, population ranges, and the
//! descriptors, claims to fame, calamities, and conflicts that make a dot on
//! the map worth visiting.

use crate::engine::{push_line, Domain, Record, ReleaseScope};
use crate::store::TableStore;
use indexmap::IndexMap;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::{pick_category, pick_or_placeholder, strings};

pub const STORAGE_KEY: &str = "settlements_v1";

pub type TypeTables = IndexMap<String, Vec<String>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementTables {
    pub types: Vec<String>,
    pub name_prefix: TypeTables,
    pub name_suffix: TypeTables,
    pub population: TypeTables,
    pub descriptor: Vec<String>,
    pub known_for: Vec<String>,
    pub calamity: Vec<String>,
    pub conflict: Vec<String>,
}

pub fn validate(tables: &SettlementTables) -> Result<(), String> {
    if tables.types.is_empty() {
        return Err("missing 'types'".into());
    }
    if tables.name_prefix.is_empty() || tables.name_suffix.is_empty() {
        return Err("missing name part tables".into());
    }
    if tables.population.is_empty() {
        return Err("missing 'population'".into());
    }
    Ok(())
}

pub struct SettlementsDomain {
    tables: SettlementTables,
    settlement_type: String,
}

const FIELDS: &[&str] = &[
    "name",
    "type",
    "population",
    "descriptor",
    "known_for",
    "calamity",
    "conflict",
];

impl SettlementsDomain {
    pub fn open(store: &TableStore) -> Self {
        let tables = store.load(STORAGE_KEY, validate, default_tables);
        Self::with_tables(tables)
    }

    pub fn with_tables(tables: SettlementTables) -> Self {
        let settlement_type = tables
            .types
            .first()
            .cloned()
            .unwrap_or_else(|| "Village".to_string());
        SettlementsDomain {
            tables,
            settlement_type,
        }
    }
}

impl Domain for SettlementsDomain {
    fn name(&self) -> &'static str {
        "settlements"
    }

    fn storage_key(&self) -> &'static str {
        STORAGE_KEY
    }

    fn fields(&self) -> &'static [&'static str] {
        FIELDS
    }

    fn reroll_cascade(&self, field: &str) -> &'static [&'static str] {
        match field {
            "type" => &["name", "population"],
            _ => &[],
        }
    }

    fn selectors(&self) -> Vec<(&'static str, String)> {
        vec![("type", self.settlement_type.clone())]
    }

    fn set_selector(&mut self, key: &str, value: &str) -> Result<ReleaseScope, String> {
        match key {
            "type" => {
                if !self.tables.types.iter().any(|t| t == value) {
                    return Err(format!(
                        "unknown settlement type '{}', expected one of: {}",
                        value,
                        self.tables.types.join(", ")
                    ));
                }
                self.settlement_type = value.to_string();
                Ok(ReleaseScope::Fields(&["name", "population"]))
            }
            other => Err(format!("unknown selector '{other}'")),
        }
    }

    fn roll_field(&self, field: &str, rng: &mut dyn RngCore) -> String {
        let tables = &self.tables;
        let chain: &[&str] = &[&self.settlement_type, "Default"];
        match field {
            "name" => format!(
                "{}{}",
                pick_category(rng, &tables.name_prefix, chain),
                pick_category(rng, &tables.name_suffix, chain)
            ),
            "type" => self.settlement_type.clone(),
            "population" => pick_category(rng, &tables.population, chain),
            "descriptor" => pick_or_placeholder(rng, &tables.descriptor),
            "known_for" => pick_or_placeholder(rng, &tables.known_for),
            "calamity" => pick_or_placeholder(rng, &tables.calamity),
            "conflict" => pick_or_placeholder(rng, &tables.conflict),
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
                &format!("{} ({})", get("type"), get("population")),
            );
        }
        push_line(&mut text, "Descriptor", get("descriptor"));
        push_line(&mut text, "Known For", get("known_for"));
        push_line(&mut text, "Past Calamity", get("calamity"));
        push_line(&mut text, "Conflict / Hook", get("conflict"));
        text
    }

    fn export_tables(&self) -> String {
        serde_json::to_string_pretty(&self.tables).unwrap_or_default()
    }

    fn import_tables(&mut self, json: &str) -> Result<(), String> {
        let tables: SettlementTables =
            serde_json::from_str(json).map_err(|e| format!("invalid JSON: {e}"))?;
        validate(&tables)?;
        self.tables = tables;
        if !self.tables.types.iter().any(|t| *t == self.settlement_type) {
            self.settlement_type = self.tables.types[0].clone();
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

/// Built-in settlement tables.
pub fn default_tables() -> SettlementTables {
    SettlementTables {
        types: strings(&["Village", "Town", "City", "Hamlet", "Keep", "Stronghold"]),
        name_prefix: type_table(&[
            ("Village", &["Oak", "Mill", "Green", "Ash", "Thorn", "Wolf", "Fox", "Bramble"]),
            ("Town", &["Stone", "River", "Market", "Bright", "Iron", "Salt", "Wain", "Kings"]),
            ("City", &["Gold", "High", "Grand", "Silver", "Dragon", "Storm", "Crown", "West"]),
            ("Hamlet", &["Mud", "Goose", "Barley", "Turnip", "Moss", "Crow", "Pebble"]),
            ("Keep", &["Grim", "Watch", "Shield", "Raven", "Black", "North", "Frost"]),
            ("Stronghold", &["Iron", "Storm", "Dread", "War", "Thunder", "Obsidian", "Gryphon"]),
            ("Default", &["Old", "New", "Fair", "Long", "Deep"]),
        ]),
        name_suffix: type_table(&[
            ("Village", &["brook", "stead", "field", "dale", "hollow", "wick", "thorpe", "mere"]),
            ("Town", &["ford", "bridge", "market", "haven", "crossing", "gate", "burgh", "wharf"]),
            ("City", &["spire", "hold", "gate", "port", "reach", "crown", "throne", "vale"]),
            ("Hamlet", &["end", "bottom", "patch", "row", "corner", "rest"]),
            ("Keep", &["watch", "guard", "rock", "point", "wall", "tor"]),
            ("Stronghold", &["fast", "crag", "bastion", "fist", "gate", "peak"]),
            ("Default", &["ton", "ham", "by", "wick"]),
        ]),
        population: type_table(&[
            ("Village", &["A few hundred souls", "Around 400, swelling at harvest", "Barely 250, and shrinking"]),
            ("Town", &["Roughly 2,000 residents", "Close to 5,000, plus market-day traffic", "About 3,500, mostly human"]),
            ("City", &["Some 15,000 within the walls", "Over 25,000, counting the outer districts", "Nearer 40,000 than the census admits"]),
            ("Hamlet", &["Five families and their dogs", "Perhaps 60 people, all related", "A few dozen, wary of strangers"]),
            ("Keep", &["A garrison of 80 and their dependents", "Some 200 soldiers, smiths, and servants", "A skeleton watch of 30"]),
            ("Stronghold", &["Over 1,000 under arms", "A standing force of 500 plus camp followers", "Thousands, none of them civilians"]),
        ]),
        descriptor: strings(&[
            "Built into the side of a cliff, connected by rope bridges",
            "Surrounded by a palisade of sharpened, blackened logs",
            "Straddling a river, its two halves rivals in all things",
            "Dominated by the ruin of something much older at its centre",
            "Prosperous on the surface, rotten underneath",
            "Half-empty, with boarded windows on every street",
            "Bustling and loud, its streets never truly quiet",
            "Clinging to an old trade road that no longer sees much traffic",
            "Ringed by terraced fields and ancient standing stones",
            "Perpetually shrouded in fog rolling off the nearby marsh",
        ]),
        known_for: strings(&[
            "An annual festival that draws visitors from across the region",
            "A peculiar local delicacy outsiders find revolting",
            "The finest horses (or mules, depending who you ask) in the realm",
            "A shrine said to cure one ailment per pilgrim, once",
            "Its stubborn neutrality in every war to date",
            "A legendary duel fought in its main square",
            "Producing an uncanny number of famous adventurers",
            "A tavern whose cellar connects to somewhere it shouldn't",
            "Textiles dyed a colour no one else can reproduce",
            "Strictly enforced and deeply strange local laws",
        ]),
        calamity: strings(&[
            "A fire that destroyed the granary two winters ago",
            "A plague whose survivors still bear faint grey scars",
            "A flood that moved the river half a mile east",
            "A raid that emptied the treasury and the jail alike",
            "A mine collapse that sealed something in, or out",
            "A harvest blight blamed on a passing stranger's curse",
            "An earthquake that opened a chasm beneath the old temple",
            "The lord's sudden death, with no heir anyone agrees on",
        ]),
        conflict: strings(&[
            "Two guilds are fighting a quiet war over the docks",
            "The new tax collector has begun asking dangerous questions",
            "Livestock are disappearing, and the tracks lead nowhere",
            "A religious schism is splitting families down the middle",
            "The garrison hasn't been paid in three months",
            "Someone is buying up land along the north wall, anonymously",
            "The council's youngest member is clearly being blackmailed",
            "Refugees are arriving faster than the town can absorb them",
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
    fn name_joins_parts_without_space() {
        let domain = SettlementsDomain::with_tables(default_tables());
        let name = domain.roll_field("name", &mut rng(1));
        assert!(!name.contains(' '), "settlement names are compounds: {name}");
        assert!(!name.is_empty());
    }

    #[test]
    fn population_tracks_type() {
        let mut domain = SettlementsDomain::with_tables(default_tables());
        domain.set_selector("type", "City").unwrap();
        let expected = &default_tables().population["City"];
        for seed in 0..15 {
            let population = domain.roll_field("population", &mut rng(seed));
            assert!(expected.contains(&population));
        }
    }

    #[test]
    fn type_selector_rejects_unknown() {
        let mut domain = SettlementsDomain::with_tables(default_tables());
        assert!(domain.set_selector("type", "Megalopolis").is_err());
        assert_eq!(domain.selectors()[0].1, "Village");
    }

    #[test]
    fn type_reroll_cascades_to_name_and_population() {
        let domain = SettlementsDomain::with_tables(default_tables());
        assert_eq!(domain.reroll_cascade("type"), &["name", "population"]);
    }
}
