//! Encounter tools: narrative seeds, terrain-keyed random encounter checks,
//! and d12 chase complication tables.
//!
//! The seed generator runs through the shared lock/reroll engine. The random
//! encounter check and the chase complication roll are one-shot dice
//! operations exposed as methods on the concrete domain type.

use crate::dice;
use crate::engine::{push_line, Domain, LinkGroup, Record};
use crate::store::TableStore;
use indexmap::IndexMap;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::{pick_or_placeholder, strings};

pub const STORAGE_KEY: &str = "encounters_v2";

/// A d20 result at or above this triggers an encounter by default.
pub const DEFAULT_ENCOUNTER_CHANCE: u64 = 16;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedTables {
    pub location: Vec<String>,
    pub creature: Vec<String>,
    pub situation: Vec<String>,
    pub complication: Vec<String>,
    pub reason: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RandomEncounterTables {
    pub terrains: Vec<String>,
    pub encounter_distance_by_terrain: IndexMap<String, String>,
    pub encounters_by_terrain: IndexMap<String, Vec<String>>,
}

/// One row of a chase table: the d12 results it covers and its text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChaseBand {
    pub min_roll: u64,
    pub max_roll: u64,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChaseTables {
    pub types: Vec<String>,
    pub complications: IndexMap<String, Vec<ChaseBand>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncounterTables {
    pub seed_data: SeedTables,
    pub random_encounter_data: RandomEncounterTables,
    pub chase_data: ChaseTables,
}

pub fn validate(tables: &EncounterTables) -> Result<(), String> {
    if tables.seed_data.location.is_empty() || tables.seed_data.creature.is_empty() {
        return Err("missing 'seedData' tables".into());
    }
    if tables.random_encounter_data.terrains.is_empty() {
        return Err("missing 'randomEncounterData.terrains'".into());
    }
    // The band shape is what distinguishes v2 chase data.
    match tables.chase_data.complications.get("Urban") {
        Some(bands) if !bands.is_empty() => Ok(()),
        _ => Err("missing 'chaseData.complications.Urban'".into()),
    }
}

/// Result of a terrain encounter check.
#[derive(Debug, Clone)]
pub struct RandomEncounter {
    pub terrain: String,
    pub roll: u64,
    pub result: String,
    /// Rolled distance in feet; `None` when no encounter occurred.
    pub distance_feet: Option<u64>,
}

/// Result of a d12 chase complication roll.
#[derive(Debug, Clone)]
pub struct ChaseComplication {
    pub chase_type: String,
    pub roll: u64,
    pub text: String,
}

pub struct EncountersDomain {
    tables: EncounterTables,
}

const FIELDS: &[&str] = &[
    "location",
    "creature",
    "situation",
    "complication",
    "reason",
];

// Creature and situation render as one sentence, so they lock as one unit.
const GROUPS: &[LinkGroup] = &[LinkGroup {
    leader: "creature",
    members: &["creature", "situation"],
}];

impl EncountersDomain {
    pub fn open(store: &TableStore) -> Self {
        let tables = store.load(STORAGE_KEY, validate, default_tables);
        EncountersDomain { tables }
    }

    pub fn with_tables(tables: EncounterTables) -> Self {
        EncountersDomain { tables }
    }

    pub fn terrains(&self) -> &[String] {
        &self.tables.random_encounter_data.terrains
    }

    pub fn chase_types(&self) -> &[String] {
        &self.tables.chase_data.types
    }

    /// Roll a d20 encounter check for a terrain. On a hit (roll >= `chance`,
    /// or `force`) picks an encounter and rolls its approach distance from
    /// the terrain's dice expression.
    pub fn random_encounter(
        &self,
        terrain: &str,
        chance: u64,
        force: bool,
        rng: &mut dyn RngCore,
    ) -> Result<RandomEncounter, String> {
        let data = &self.tables.random_encounter_data;
        let terrain = data
            .terrains
            .iter()
            .find(|t| t.eq_ignore_ascii_case(terrain))
            .ok_or_else(|| {
                format!(
                    "unknown terrain '{}', expected one of: {}",
                    terrain,
                    data.terrains.join(", ")
                )
            })?
            .clone();

        let roll = dice::roll_with("1d20", rng);
        if !force && roll < chance {
            return Ok(RandomEncounter {
                terrain,
                roll,
                result: "No encounter".to_string(),
                distance_feet: None,
            });
        }

        let result = data
            .encounters_by_terrain
            .get(&terrain)
            .map(|items| pick_or_placeholder(rng, items))
            .unwrap_or_else(|| "No encounter".to_string());
        let distance_feet = data
            .encounter_distance_by_terrain
            .get(&terrain)
            .map(|expr| dice::roll_with(expr, rng));

        Ok(RandomEncounter {
            terrain,
            roll,
            result,
            distance_feet,
        })
    }

    /// Roll 1d12 against a chase table and return the matching band.
    pub fn chase_complication(
        &self,
        chase_type: &str,
        rng: &mut dyn RngCore,
    ) -> Result<ChaseComplication, String> {
        let data = &self.tables.chase_data;
        let chase_type = data
            .types
            .iter()
            .find(|t| t.eq_ignore_ascii_case(chase_type))
            .ok_or_else(|| {
                format!(
                    "unknown chase type '{}', expected one of: {}",
                    chase_type,
                    data.types.join(", ")
                )
            })?
            .clone();

        let roll = dice::roll_with("1d12", rng);
        let text = data
            .complications
            .get(&chase_type)
            .and_then(|bands| {
                bands
                    .iter()
                    .find(|b| roll >= b.min_roll && roll <= b.max_roll)
            })
            .map(|b| b.text.clone())
            .unwrap_or_else(|| "No complication.".to_string());

        Ok(ChaseComplication {
            chase_type,
            roll,
            text,
        })
    }
}

/// Join creature and situation into one readable sentence, stripping the
/// leading ellipsis the situation entries carry.
fn situation_sentence(creature: &str, situation: &str) -> String {
    let situation = situation.trim_start_matches("...").trim();
    let mut sentence = if creature.is_empty() {
        situation.to_string()
    } else if situation.is_empty() {
        creature.to_string()
    } else {
        format!("{creature} {situation}")
    };
    if sentence.is_empty() {
        return sentence;
    }
    let mut chars = sentence.chars();
    if let Some(first) = chars.next() {
        sentence = first.to_uppercase().collect::<String>() + chars.as_str();
    }
    if !sentence.ends_with('.') {
        sentence.push('.');
    }
    sentence
}

impl Domain for EncountersDomain {
    fn name(&self) -> &'static str {
        "encounters"
    }

    fn storage_key(&self) -> &'static str {
        STORAGE_KEY
    }

    fn fields(&self) -> &'static [&'static str] {
        FIELDS
    }

    fn link_groups(&self) -> &'static [LinkGroup] {
        GROUPS
    }

    fn roll_field(&self, field: &str, rng: &mut dyn RngCore) -> String {
        let seed = &self.tables.seed_data;
        match field {
            "location" => pick_or_placeholder(rng, &seed.location),
            "creature" => pick_or_placeholder(rng, &seed.creature),
            "situation" => pick_or_placeholder(rng, &seed.situation),
            "complication" => pick_or_placeholder(rng, &seed.complication),
            "reason" => pick_or_placeholder(rng, &seed.reason),
            _ => String::new(),
        }
    }

    fn format(&self, record: &Record) -> String {
        let empty = String::new();
        let get = |field: &str| record.get(field).unwrap_or(&empty);

        let mut text = String::new();
        push_line(&mut text, "Location", get("location"));
        push_line(
            &mut text,
            "Situation",
            &situation_sentence(get("creature"), get("situation")),
        );
        push_line(&mut text, "Reason", get("reason"));
        push_line(&mut text, "Complication", get("complication"));
        text
    }

    fn export_tables(&self) -> String {
        serde_json::to_string_pretty(&self.tables).unwrap_or_default()
    }

    fn import_tables(&mut self, json: &str) -> Result<(), String> {
        let tables: EncounterTables =
            serde_json::from_str(json).map_err(|e| format!("invalid JSON: {e}"))?;
        validate(&tables)?;
        self.tables = tables;
        Ok(())
    }

    fn reset_tables(&mut self) {
        self.tables = default_tables();
    }
}

fn bands(rows: &[(u64, u64, &str)]) -> Vec<ChaseBand> {
    rows.iter()
        .map(|(min_roll, max_roll, text)| ChaseBand {
            min_roll: *min_roll,
            max_roll: *max_roll,
            text: text.to_string(),
        })
        .collect()
}

/// Built-in encounter tables.
pub fn default_tables() -> EncounterTables {
    let mut encounter_distance_by_terrain = IndexMap::new();
    for (terrain, expr) in [
        ("Arctic", "6d6 * 10"),
        ("Coastal", "2d10 * 10"),
        ("Desert", "6d6 * 10"),
        ("Forest", "2d8 * 10"),
        ("Grassland", "6d6 * 10"),
        ("Hill", "2d10 * 10"),
        ("Mountain", "4d10 * 10"),
        ("Swamp", "2d8 * 10"),
        ("Underdark", "2d6 * 10"),
        ("Urban", "2d6 * 10"),
        ("Waterborne", "6d6 * 10"),
    ] {
        encounter_distance_by_terrain.insert(terrain.to_string(), expr.to_string());
    }

    let mut encounters_by_terrain = IndexMap::new();
    for (terrain, items) in [
        ("Forest", &["1d8 Bandits", "1 Owlbear", "1d4 Giant Spiders", "A lost merchant", "A crumbling shrine", "1d6 Wolves", "1 Treant", "A patrol of 1d4 Elven Scouts"][..]),
        ("Mountain", &["1d4 Griffons", "1 Ettin", "1d6 Goats", "A small avalanche (DEX save)", "A tribe of 2d6 Orcs", "1 Manticore", "A hermit's cave", "1d4 Eagles"][..]),
        ("Swamp", &["1d6 Giant Frogs", "1 Troll", "2d4 Bullywugs", "A patch of quicksand", "A ghostly apparition", "1 Shambling Mound", "A hag's hut", "1d8 Giant Lizards"][..]),
        ("Urban", &["1d4 City Guards", "A noble with 2 bodyguards", "1d6 Thugs in an alley", "A lost child", "A street performer", "A raging fire", "1d10 Commoners (crowd)", "1 Spy watching"][..]),
        ("Arctic", &["1d4 Ice Mephits", "1 Polar Bear", "A tribe of 1d8 Kobolds", "A blizzard (CON save)", "1 Yeti", "A frozen corpse with a note", "A friendly trapper", "1d6 Wolves"][..]),
        ("Coastal", &["1d8 Giant Crabs", "1d4 Harpies", "A shipwreck (contains 1d100 gp)", "A patrol of 2d4 Merfolk", "1d6 Pirates", "A hidden cave", "1 Plesiosaurus", "A rolling fog bank"][..]),
        ("Desert", &["1d6 Giant Hyenas", "1 Lamia", "A friendly caravan", "A sandstorm (CON save)", "1d4 Giant Vultures", "An oasis", "2d6 Bandits", "1 Air Elemental (dust devil)"][..]),
        ("Grassland", &["1d10 Goblins on Worgs", "1d4 Elephants", "A herd of 2d20 Wildebeest", "A lone traveller", "1 Bulette", "A patch of tall grass (stealth checks)", "1d8 Giant Eagles", "A nomadic encampment"][..]),
        ("Hill", &["1d6 Orcs", "1 Manticore", "A shepherd with 2d10 sheep", "1d4 Giant Goats", "A mysterious standing stone", "1d8 Hobgoblins", "1 Griffon", "A territorial Hippogriff"][..]),
        ("Underdark", &["1d4 Giant Spiders", "1 Minotaur", "A lost Drow patrol (1d4)", "A patch of Violet Fungi", "2d6 Kobolds", "A subterranean river", "1 Grick", "A mad hermit"][..]),
        ("Waterborne", &["A merchant ship", "1d4 Reef Sharks", "A storm (DEX/CON saves)", "1d8 Merfolk", "A pirate vessel", "A ghost ship", "A pod of 2d6 Dolphins", "1 Water Elemental"][..]),
    ] {
        encounters_by_terrain.insert(terrain.to_string(), strings(items));
    }

    let mut complications = IndexMap::new();
    complications.insert(
        "Urban".to_string(),
        bands(&[
            (1, 1, "A cart or large obstacle blocks your way. (DC 10 DEX save or 10ft Difficult Terrain)"),
            (2, 2, "A crowd blocks your way. (DC 10 STR/DEX/CHA save or 10ft Difficult Terrain)"),
            (3, 3, "A maze of barrels or crates. (DC 10 DEX/INT save or 10ft Difficult Terrain)"),
            (4, 4, "The ground is slippery with water, ice, or oil. (DC 10 DEX save or fall Prone)"),
            (5, 5, "You encounter a brawl or fight. (DC 15 STR/DEX/CHA save or 2d4 dmg & 10ft Difficult Terrain)"),
            (6, 6, "You must make a sharp turn around a corner. (DC 10 DEX save or collide with wall for 1d4 dmg)"),
            (7, 7, "A narrow alley or gap. (DC 10 DEX save or squeeze through at half speed)"),
            (8, 8, "Clotheslines or hanging debris. (DC 12 DEX save or become Restrained until escape DC 10)"),
            (9, 9, "A pack of stray dogs or cats. (DC 12 DEX/CHA save or trip and fall Prone)"),
            (10, 10, "A merchant's stall collapses. (DC 12 DEX save or 1d6 damage and knocked Prone)"),
            (11, 11, "City watch patrol ahead. (DC 15 CHA/DEX save or they join the chase)"),
            (12, 12, "No complication."),
        ]),
    );
    complications.insert(
        "Wilderness".to_string(),
        bands(&[
            (1, 1, "You pass through a Swarm of Insects (Wasps, Spiders, or DM's choice)."),
            (2, 2, "A stream, creek, or ravine blocks your path. (DC 10 STR/DEX save or 10ft Difficult Terrain)"),
            (3, 3, "Blowing sand, snow, ash, or pollen. (DC 10 CON save or Blinded for 1 round, Speed halved)"),
            (4, 4, "A sudden drop or hidden pit. (DC 10 DEX save or fall 10 feet, taking 1d6 damage)"),
            (5, 5, "You pass near Razorvine or thorny brambles. (DC 15 DEX save or use 10ft movement to avoid 1d10 slashing damage)"),
            (6, 6, "A native creature (bear, deer, boar) notices you. (DC 10 WIS/CHA save or it joins the chase as quarry or pursuer)"),
            (7, 7, "Thick undergrowth or tangled roots. (DC 12 STR save or become Restrained until escape DC 10)"),
            (8, 8, "Rocky outcropping or fallen tree. (DC 10 STR/DEX save or 10ft Difficult Terrain)"),
            (9, 9, "Muddy or marshy ground. (DC 10 STR save or Speed reduced by half for 1 round)"),
            (10, 10, "Low-hanging branches or vines. (DC 12 DEX save or 1d4 damage and knocked Prone)"),
            (11, 11, "Hidden animal burrow or loose stones. (DC 12 DEX save or twisted ankle, Speed reduced by 10ft for 1 minute)"),
            (12, 12, "No complication."),
        ]),
    );

    EncounterTables {
        seed_data: SeedTables {
            location: strings(&[
                "A crumbling ruin", "A misty forest path", "A narrow sewer tunnel", "A bustling market square",
                "A forgotten graveyard", "A rickety rope bridge over a chasm", "A wizards' tower, strangely silent",
                "A dark, flooded cavern", "A holy temple, desecrated", "A noble's opulent ballroom", "A squalid dockside warehouse",
                "An ancient, magical library", "A battlefield, moments after the fight", "A planar crossroads",
            ]),
            creature: strings(&[
                "A band of goblin scavengers", "A territorial owlbear", "A mysterious, cloaked figure", "A squad of city guards",
                "A ghostly apparition", "A cunning kobold trapmaker", "A lost child", "A starving wolf pack",
                "A patrol of hobgoblin soldiers", "A snooty noble and their bodyguards", "A panicked crowd",
                "A curious fey creature", "A forgotten construct", "A desperate cultist",
            ]),
            situation: strings(&[
                "...are ambushing a merchant waggon", "...is protecting its young", "...is performing a strange ritual",
                "...are searching for someone", "...is guarding a treasure chest", "...is blocking the path",
                "...is fleeing from something worse", "...is laying a trap", "...is arguing over loot",
                "...is trying to start a fire", "...is wounded and cornered", "...is asleep on watch",
            ]),
            complication: strings(&[
                "A magical anti-magic field is active", "A third party (rivals?) arrives mid-fight",
                "The structure is collapsing or on fire", "One of them is a traitor",
                "A valuable item is about to be destroyed", "Innocent bystanders are in the way",
                "It's a case of mistaken identity", "The creatures have hostages", "A magical storm erupts", "The 'monster' is under a curse",
            ]),
            reason: strings(&[
                "...they are desperate for food.", "...they were hired by a rival merchant.",
                "...they believe the waggon carries a stolen idol.", "...a poacher just stole one of its young.",
                "...it's nesting season and they feel threatened.", "...to summon a powerful entity.",
                "...to close a dangerous planar rift.", "...to fulfil an ancient prophecy.",
                "...they are under a magical compulsion.", "...it's a simple territorial dispute.",
                "...they are trying to retrieve a stolen item.", "...it's a distraction for a larger plan.",
            ]),
        },
        random_encounter_data: RandomEncounterTables {
            terrains: strings(&[
                "Arctic", "Coastal", "Desert", "Forest", "Grassland", "Hill",
                "Mountain", "Swamp", "Underdark", "Urban", "Waterborne",
            ]),
            encounter_distance_by_terrain,
            encounters_by_terrain,
        },
        chase_data: ChaseTables {
            types: strings(&["Urban", "Wilderness"]),
            complications,
        },
    }
}
