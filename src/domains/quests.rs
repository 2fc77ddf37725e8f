//! Quest seeds: a hook, an objective, a target, a location, a complication,
//! and a climax, plus level-tier adventure situations.
//!
//! Hooks are keyed by hook type (patron, supernatural, happenstance) and
//! situations by character level tier; each has its own selector that only
//! releases the lock on its dependent field.

use crate::engine::{push_line, Domain, Record, ReleaseScope};
use crate::store::TableStore;
use indexmap::IndexMap;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::{pick_category, pick_or_placeholder, strings};

pub const STORAGE_KEY: &str = "quests_v1";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestTables {
    pub hook_types: Vec<String>,
    pub hooks: IndexMap<String, Vec<String>>,
    pub objectives: Vec<String>,
    pub targets: Vec<String>,
    pub locations: Vec<String>,
    pub complications: Vec<String>,
    pub climaxes: Vec<String>,
    pub level_tiers: Vec<String>,
    pub situations_by_level: IndexMap<String, Vec<String>>,
}

pub fn validate(tables: &QuestTables) -> Result<(), String> {
    if tables.hook_types.is_empty() || tables.hooks.is_empty() {
        return Err("missing 'hooks'".into());
    }
    if tables.objectives.is_empty() {
        return Err("missing 'objectives'".into());
    }
    if tables.level_tiers.is_empty() || tables.situations_by_level.is_empty() {
        return Err("missing 'situationsByLevel'".into());
    }
    Ok(())
}

pub struct QuestsDomain {
    tables: QuestTables,
    hook_type: String,
    tier: String,
}

const FIELDS: &[&str] = &[
    "hook",
    "objective",
    "target",
    "location",
    "complication",
    "climax",
    "situation",
];

impl QuestsDomain {
    pub fn open(store: &TableStore) -> Self {
        let tables = store.load(STORAGE_KEY, validate, default_tables);
        Self::with_tables(tables)
    }

    pub fn with_tables(tables: QuestTables) -> Self {
        let hook_type = tables
            .hook_types
            .first()
            .cloned()
            .unwrap_or_else(|| "Patron Hook".to_string());
        let tier = tables
            .level_tiers
            .first()
            .cloned()
            .unwrap_or_else(|| "1-4".to_string());
        QuestsDomain {
            tables,
            hook_type,
            tier,
        }
    }
}

impl Domain for QuestsDomain {
    fn name(&self) -> &'static str {
        "quests"
    }

    fn storage_key(&self) -> &'static str {
        STORAGE_KEY
    }

    fn fields(&self) -> &'static [&'static str] {
        FIELDS
    }

    fn selectors(&self) -> Vec<(&'static str, String)> {
        vec![
            ("hook", self.hook_type.clone()),
            ("tier", self.tier.clone()),
        ]
    }

    fn set_selector(&mut self, key: &str, value: &str) -> Result<ReleaseScope, String> {
        match key {
            "hook" => {
                if !self.tables.hook_types.iter().any(|t| t == value) {
                    return Err(format!(
                        "unknown hook type '{}', expected one of: {}",
                        value,
                        self.tables.hook_types.join(", ")
                    ));
                }
                self.hook_type = value.to_string();
                Ok(ReleaseScope::Fields(&["hook"]))
            }
            "tier" => {
                if !self.tables.level_tiers.iter().any(|t| t == value) {
                    return Err(format!(
                        "unknown level tier '{}', expected one of: {}",
                        value,
                        self.tables.level_tiers.join(", ")
                    ));
                }
                self.tier = value.to_string();
                Ok(ReleaseScope::Fields(&["situation"]))
            }
            other => Err(format!("unknown selector '{other}'")),
        }
    }

    fn roll_field(&self, field: &str, rng: &mut dyn RngCore) -> String {
        let tables = &self.tables;
        match field {
            "hook" => pick_category(rng, &tables.hooks, &[&self.hook_type]),
            "objective" => pick_or_placeholder(rng, &tables.objectives),
            "target" => pick_or_placeholder(rng, &tables.targets),
            "location" => pick_or_placeholder(rng, &tables.locations),
            "complication" => pick_or_placeholder(rng, &tables.complications),
            "climax" => pick_or_placeholder(rng, &tables.climaxes),
            "situation" => pick_category(rng, &tables.situations_by_level, &[&self.tier]),
            _ => String::new(),
        }
    }

    fn format(&self, record: &Record) -> String {
        let empty = String::new();
        let get = |field: &str| record.get(field).unwrap_or(&empty);

        let mut text = String::new();
        push_line(&mut text, "Hook", get("hook"));
        push_line(&mut text, "Objective", get("objective"));
        // "Retrieve (...)" + "a stolen artefact" + "in a haunted forest"
        if !get("target").is_empty() || !get("location").is_empty() {
            let mut goal = String::new();
            if !get("target").is_empty() {
                goal.push_str(get("target"));
            }
            if !get("location").is_empty() {
                if !goal.is_empty() {
                    goal.push(' ');
                }
                goal.push_str(get("location"));
            }
            push_line(&mut text, "Goal", &goal);
        }
        push_line(&mut text, "Complication", get("complication"));
        push_line(&mut text, "Climax", get("climax"));
        if !get("situation").is_empty() {
            push_line(
                &mut text,
                &format!("Situation (levels {})", self.tier),
                get("situation"),
            );
        }
        text
    }

    fn export_tables(&self) -> String {
        serde_json::to_string_pretty(&self.tables).unwrap_or_default()
    }

    fn import_tables(&mut self, json: &str) -> Result<(), String> {
        let tables: QuestTables =
            serde_json::from_str(json).map_err(|e| format!("invalid JSON: {e}"))?;
        validate(&tables)?;
        self.tables = tables;
        if !self.tables.hook_types.iter().any(|t| *t == self.hook_type) {
            self.hook_type = self.tables.hook_types[0].clone();
        }
        if !self.tables.level_tiers.iter().any(|t| *t == self.tier) {
            self.tier = self.tables.level_tiers[0].clone();
        }
        Ok(())
    }

    fn reset_tables(&mut self) {
        self.tables = default_tables();
    }
}

/// Built-in quest tables.
pub fn default_tables() -> QuestTables {
    let mut hooks = IndexMap::new();
    hooks.insert(
        "Patron Hook".to_string(),
        strings(&[
            "A desperate noble needs you to find a lost heir.",
            "A shadowy guild master offers coin for a 'retrieval' mission.",
            "A frantic commoner's child has been taken by monsters.",
            "A mysterious old hermit warns of a coming disaster and needs your help.",
            "A zealous priest tasks you with recovering a stolen relic.",
            "A grieving widow wants you to bring her husband's killer to justice.",
            "A calculating merchant needs you to secure a dangerous trade route.",
            "A retired adventurer offers their old map to a place they never conquered.",
            "A worried village elder begs you to investigate a blight on their crops.",
            "A city official announces a bounty for a notorious bandit leader.",
            "A monarch hires you to escort their emissary through hostile territory.",
            "A friendly contact asks you to repay a favour by doing them 'one simple job'.",
        ]),
    );
    hooks.insert(
        "Supernatural Hook".to_string(),
        strings(&[
            "You all share a vivid, prophetic dream of a burning tower.",
            "While praying, one character receives a quest from their god or patron.",
            "A fortune teller's reading points to a specific, dangerous ruin.",
            "A ghostly apparition appears, begging you to find its body and put it to rest.",
            "Flames in a campfire form a rune or word, pointing you to a location.",
            "A talking animal (or fey spirit) appears and pleads for help for its sacred grove.",
            "A comet appears in the sky, and soothsayers declare it an omen of a specific event.",
        ]),
    );
    hooks.insert(
        "Happenstance Hook".to_string(),
        strings(&[
            "You find a cryptic map and a key on a dead body.",
            "While seeking shelter, you stumble into the entrance of a forgotten dungeon.",
            "A magical mishap (e.g., a teleport-gone-wrong) strands you in a dangerous new location.",
            "You are attacked after being mistaken for a rival adventuring party.",
            "You overhear a sinister plot in a tavern's back room.",
            "A building collapses, revealing a hidden tunnel network beneath the city.",
            "You witness a kidnapping or assassination in broad daylight.",
        ]),
    );

    let mut situations_by_level = IndexMap::new();
    situations_by_level.insert(
        "1-4".to_string(),
        strings(&[
            "A dragon wyrmling has gathered kobolds to amass a hoard.",
            "Wererats in the sewers plot to take control of the city council.",
            "Bandit activity signals the revival of an evil cult.",
            "A pack of gnolls is rampaging dangerously close to farmlands.",
            "A rivalry between two merchant families escalates to mayhem.",
            "A new sinkhole reveals a long-buried dungeon.",
            "Miners broke into an ancient ruin and were captured by monsters.",
            "An innocent is framed for the crimes of a shape-shifter.",
            "Ghouls are venturing out of the catacombs at night.",
            "A notorious criminal hides in an old ruin.",
            "A contagion in a forest causes spiders to grow massive and aggressive.",
            "A necromancer animates the village cemetery to get revenge.",
            "An evil cult is spreading, marking dissenters for sacrifice.",
            "An abandoned house is haunted by Undead due to a cursed item inside.",
            "Fey creatures are crossing over, causing mischief and misfortune.",
            "A hag's curse makes local animals unusually aggressive.",
            "Local bullies have appointed themselves the militia and extort villagers.",
            "An aquatic monster attacks the waterfront after a strange statue is found.",
            "A local ruin is cursed, but a scholar wants to explore it.",
            "A new bandit captain begins raiding more frequently.",
        ]),
    );
    situations_by_level.insert(
        "5-10".to_string(),
        strings(&[
            "A dragon is extorting tribute from a settlement and must be stopped.",
            "A powerful vampire is corrupting the court from within.",
            "A guild of warlocks seeks forbidden knowledge from an ancient library.",
            "A portal to the Feywild is causing reality to warp in the forest.",
            "A mad mage's experiments are spawning abominations.",
            "An orc warlord unites the tribes and marches on civilisation.",
            "A death cult attempts to summon a demon lord.",
            "A lich is raising an army of undead from ancient battlefields.",
            "A fire giant is awakening a volcano to destroy the region.",
            "A beholder has claimed a strategic fortress.",
            "Pirates have seized control of vital shipping lanes.",
            "A corrupt noble is secretly a devil in disguise.",
            "Mind flayers are infiltrating the city's leadership.",
            "A powerful artefact is discovered that factions war over.",
            "An ancient curse causes the dead to rise across the land.",
            "A druid circle has turned to dark rituals.",
            "Giants are raiding settlements under mysterious compulsion.",
            "A kraken threatens coastal towns unless appeased.",
            "Lycanthropy spreads rapidly through the population.",
            "A powerful ghost seeks vengeance on the descendants of its killers.",
        ]),
    );
    situations_by_level.insert(
        "11-16".to_string(),
        strings(&[
            "An ancient red dragon emerges from centuries of slumber.",
            "A cabal of liches plots to create a realm of eternal undeath.",
            "Elemental princes wage war, threatening the material plane.",
            "A dark god's avatar manifests and demands worship.",
            "A demilich guards a weapon that could end civilisation.",
            "Githyanki raiders use astral portals to strike cities.",
            "An archdevil manipulates kingdoms towards a planar war.",
            "A tarrasque awakens and begins its path of destruction.",
            "A death knight commands an army of demons and undead.",
            "Dragons form a council to reclaim their ancient dominion.",
            "An archmage attempts to ascend to godhood through sacrifice.",
            "The Shadowfell begins merging with the material plane.",
            "Storm giants seek to punish mortals for their hubris.",
            "A primordial evil breaks free from its ancient prison.",
            "Multiple demon lords vie for supremacy in the mortal realm.",
            "A vampire lord amasses power to challenge the gods.",
            "An ancient empire returns from a pocket dimension.",
            "Celestials and fiends battle over the fate of the world.",
            "A dracolich leads an undead army to conquer the land.",
            "Reality itself begins to unravel due to planar instability.",
        ]),
    );
    situations_by_level.insert(
        "17-20".to_string(),
        strings(&[
            "Gods themselves walk the earth, demanding devotion or destruction.",
            "An ancient evil threatens to unmake the multiverse.",
            "The Abyss breaches containment, flooding reality with chaos.",
            "Asmodeus himself seeks to corrupt the material plane.",
            "The World Serpent stirs, threatening all of creation.",
            "A coalition of archdevils and demon lords forms an impossible alliance.",
            "The Raven Queen's death causes souls to go mad.",
            "Tiamat breaks free from the Nine Hells.",
            "An apocalypse prophecy begins to unfold across all planes.",
            "The Far Realm begins consuming reality.",
            "Multiple tarrasques awaken simultaneously.",
            "The gods war amongst themselves, using mortals as pawns.",
            "An elder evil from beyond the stars arrives.",
            "The Weave of magic itself begins to collapse.",
            "A titan imprisoned since the dawn of time breaks free.",
            "The dead cease passing on, overwhelming the living.",
            "Dragons reclaim their ancient empire through force.",
            "All fiends unite under a single banner to invade.",
            "The material plane begins merging with all others.",
            "The end times prophesied for millennia finally begin.",
        ]),
    );

    QuestTables {
        hook_types: strings(&["Patron Hook", "Supernatural Hook", "Happenstance Hook"]),
        hooks,
        objectives: strings(&[
            "Make Peace (convince two opposing groups to end a conflict)",
            "Protect (defend an NPC, object, or location)",
            "Retrieve (gain possession of a specific object)",
            "Run a Gauntlet (pass through a dangerous area to reach an exit)",
            "Sneak In (move through an area without being detected)",
            "Stop a Ritual (foil a magical ceremony before it completes)",
            "Take Out a Single Target (defeat a villain surrounded by minions)",
            "Investigate (solve a mystery, find a hidden clue)",
            "Deliver (transport a message or item safely)",
            "Explore (map a forgotten ruin or uncharted territory)",
            "Discover (find the source of a plague, curse, or strange phenomenon)",
        ]),
        targets: strings(&[
            "a stolen artefact", "a notorious bandit leader", "a lost family heirloom",
            "a secret message or ledger", "a rare herb or alchemical ingredient", "a missing person or captured ally",
            "a sacred relic", "a forgotten tome of lore", "a dangerous monster (or its lair)",
            "a rival's valuable item", "a key to a locked dungeon", "the source of a curse",
            "a specific prisoner", "a villain's lieutenant", "a magical McGuffin",
        ]),
        locations: strings(&[
            "in a haunted forest", "within the city catacombs or sewers", "at the top of a frozen mountain",
            "in the middle of a bustling market", "deep inside an abandoned mine", "in a forgotten tomb or crypt",
            "at a noble's masquerade ball", "in a rival guild's headquarters", "beyond a cursed swamp",
            "in a crumbling wizard's tower", "at the heart of a raging battlefield", "within a dangerous planar portal",
            "in the lair of a known villain", "at a roadside inn", "in the middle of nowhere",
        ]),
        complications: strings(&[
            "the target is heavily guarded by soldiers or monsters",
            "the whole thing is a trap set by a hidden enemy",
            "the patron is lying about a key detail of the quest",
            "you are racing against a rival party for the same goal",
            "the weather suddenly turns dangerous (blizzard, hurricane, magical storm)",
            "an old enemy of the party is also involved",
            "the location is collapsing, flooding, or otherwise unstable",
            "an innocent person or group is in the way and must be protected",
            "the target is not what it seems (e.g., the 'artefact' is a person)",
            "a powerful, neutral third party (e.g., a dragon) claims the location",
        ]),
        climaxes: strings(&[
            "Confront a villain and minions in a battle to the finish.",
            "Chase a villain while dodging obstacles, leading to a final confrontation.",
            "A cataclysmic event is triggered that the party must escape.",
            "Arrive just as a villain is about to complete their master plan.",
            "Must disrupt multiple simultaneous rites in a large chamber.",
            "A trusted ally betrays the party at the worst possible moment.",
            "A portal opens, spilling new monsters out as you fight.",
            "The location begins to collapse, and the villain tries to escape in the chaos.",
            "Must choose between pursuing a fleeing villain or saving an innocent.",
            "The main threat is defeated, only to transform into a more powerful form.",
        ]),
        level_tiers: strings(&["1-4", "5-10", "11-16", "17-20"]),
        situations_by_level,
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
    fn hook_tracks_hook_type() {
        let mut domain = QuestsDomain::with_tables(default_tables());
        domain.set_selector("hook", "Supernatural Hook").unwrap();
        let expected = &default_tables().hooks["Supernatural Hook"];
        for seed in 0..20 {
            let hook = domain.roll_field("hook", &mut rng(seed));
            assert!(expected.contains(&hook));
        }
    }

    #[test]
    fn situation_tracks_tier() {
        let mut domain = QuestsDomain::with_tables(default_tables());
        domain.set_selector("tier", "17-20").unwrap();
        let expected = &default_tables().situations_by_level["17-20"];
        for seed in 0..20 {
            let situation = domain.roll_field("situation", &mut rng(seed));
            assert!(expected.contains(&situation));
        }
    }

    #[test]
    fn selectors_reject_unknown_values() {
        let mut domain = QuestsDomain::with_tables(default_tables());
        assert!(domain.set_selector("hook", "Bribery Hook").is_err());
        assert!(domain.set_selector("tier", "21-30").is_err());
        assert_eq!(domain.selectors()[0].1, "Patron Hook");
        assert_eq!(domain.selectors()[1].1, "1-4");
    }

    #[test]
    fn format_combines_target_and_location() {
        let domain = QuestsDomain::with_tables(default_tables());
        let mut record = Record::new();
        record.insert("objective", "Retrieve (gain possession of a specific object)".to_string());
        record.insert("target", "a stolen artefact".to_string());
        record.insert("location", "in a haunted forest".to_string());
        let text = domain.format(&record);
        assert!(text.contains("Goal: a stolen artefact in a haunted forest"));
    }
}
