//! Book & tome generator: themed titles, authors with matching hooks, and
//! optional magical properties.
//!
//! Two link-groups keep records coherent: the author block (name, quirk,
//! hook) always comes from one author entry, and the magic block (property,
//! quirk, sentience) switches as a unit with the magic-mode selector.
//! Changing the theme resets every lock, since all themed tables change
//! colour underneath it.

use crate::dice;
use crate::engine::{push_line, Domain, LinkGroup, Record, ReleaseScope};
use crate::store::TableStore;
use indexmap::IndexMap;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::{pick_or_placeholder, strings};

pub const STORAGE_KEY: &str = "books_v3";

/// Fallback theme when the selected one is missing from edited tables.
const FALLBACK_THEME: &str = "fiction";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub name: String,
    pub author_quirk: String,
    pub hook: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeTables {
    pub title_prefix: Vec<String>,
    pub title_suffix: Vec<String>,
    pub description: Vec<String>,
    pub authors: Vec<Author>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensationTables {
    pub smell: Vec<String>,
    pub feel: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookTables {
    pub themes: IndexMap<String, ThemeTables>,
    pub appearance: Vec<String>,
    pub condition: Vec<String>,
    pub sensation: SensationTables,
    pub magical_properties: Vec<String>,
    pub magical_quirks: Vec<String>,
    pub sentient_personalities: Vec<String>,
    pub sentient_purposes: Vec<String>,
}

/// Shape check for the `books_v3` slot: themed tables plus the magic tables
/// introduced in v3, including the `forbidden` theme.
pub fn validate(tables: &BookTables) -> Result<(), String> {
    if tables.themes.is_empty() {
        return Err("missing 'themes'".into());
    }
    if !tables.themes.contains_key("forbidden") {
        return Err("missing 'themes.forbidden'".into());
    }
    if tables.magical_properties.is_empty() {
        return Err("missing 'magicalProperties'".into());
    }
    if tables.magical_quirks.is_empty() {
        return Err("missing 'magicalQuirks'".into());
    }
    Ok(())
}

/// Magic-mode selector: which (if any) of the optional magic fields are
/// populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MagicMode {
    #[default]
    None,
    MinorProperty,
    MagicalQuirk,
    MinorSentience,
}

impl MagicMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "none" => Some(MagicMode::None),
            "property" | "minor property" => Some(MagicMode::MinorProperty),
            "quirk" | "magical quirk" => Some(MagicMode::MagicalQuirk),
            "sentience" | "minor sentience" => Some(MagicMode::MinorSentience),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MagicMode::None => "None",
            MagicMode::MinorProperty => "Minor Property",
            MagicMode::MagicalQuirk => "Magical Quirk",
            MagicMode::MinorSentience => "Minor Sentience",
        }
    }
}

pub struct BooksDomain {
    tables: BookTables,
    theme: String,
    magic: MagicMode,
}

const FIELDS: &[&str] = &[
    "title",
    "appearance",
    "sensation",
    "description",
    "author",
    "author_quirk",
    "hook",
    "magical_property",
    "magical_quirk",
    "sentience",
];

const GROUPS: &[LinkGroup] = &[
    LinkGroup {
        leader: "author",
        members: &["author", "author_quirk", "hook"],
    },
    LinkGroup {
        leader: "magical_property",
        members: &["magical_property", "magical_quirk", "sentience"],
    },
];

impl BooksDomain {
    pub fn open(store: &TableStore) -> Self {
        let tables = store.load(STORAGE_KEY, validate, default_tables);
        BooksDomain {
            tables,
            theme: "magic".to_string(),
            magic: MagicMode::None,
        }
    }

    pub fn with_tables(tables: BookTables) -> Self {
        BooksDomain {
            tables,
            theme: "magic".to_string(),
            magic: MagicMode::None,
        }
    }

    fn theme_tables(&self) -> Option<&ThemeTables> {
        self.tables
            .themes
            .get(&self.theme)
            .or_else(|| self.tables.themes.get(FALLBACK_THEME))
            .or_else(|| self.tables.themes.values().next())
    }

    fn pick_author(&self, rng: &mut dyn RngCore) -> Author {
        self.theme_tables()
            .and_then(|t| dice::pick(rng, &t.authors).cloned())
            .unwrap_or_else(|| Author {
                name: "An unknown scribe".to_string(),
                author_quirk: "was unremarkable.".to_string(),
                hook: "This book contains a secret.".to_string(),
            })
    }
}

impl Domain for BooksDomain {
    fn name(&self) -> &'static str {
        "books"
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

    fn selectors(&self) -> Vec<(&'static str, String)> {
        vec![
            ("theme", self.theme.clone()),
            ("magic", self.magic.label().to_string()),
        ]
    }

    fn set_selector(&mut self, key: &str, value: &str) -> Result<ReleaseScope, String> {
        match key {
            "theme" => {
                if !self.tables.themes.contains_key(value) {
                    let known: Vec<_> = self.tables.themes.keys().cloned().collect();
                    return Err(format!(
                        "unknown theme '{}', expected one of: {}",
                        value,
                        known.join(", ")
                    ));
                }
                self.theme = value.to_string();
                // Every themed table changed underneath the locks.
                Ok(ReleaseScope::All)
            }
            "magic" => {
                let mode = MagicMode::parse(value)
                    .ok_or_else(|| format!("unknown magic mode '{value}'"))?;
                self.magic = mode;
                Ok(ReleaseScope::Fields(&[
                    "magical_property",
                    "magical_quirk",
                    "sentience",
                ]))
            }
            other => Err(format!("unknown selector '{other}'")),
        }
    }

    fn roll_field(&self, field: &str, rng: &mut dyn RngCore) -> String {
        let tables = &self.tables;
        match field {
            "title" => match self.theme_tables() {
                Some(t) => format!(
                    "{} {}",
                    pick_or_placeholder(rng, &t.title_prefix),
                    pick_or_placeholder(rng, &t.title_suffix)
                ),
                None => "A Book".to_string(),
            },
            "appearance" => format!(
                "You find {}, which is {}.",
                pick_or_placeholder(rng, &tables.appearance),
                pick_or_placeholder(rng, &tables.condition)
            ),
            "sensation" => format!(
                "It smells {}. When touched, {}.",
                pick_or_placeholder(rng, &tables.sensation.smell),
                pick_or_placeholder(rng, &tables.sensation.feel)
            ),
            "description" => self
                .theme_tables()
                .map(|t| pick_or_placeholder(rng, &t.description))
                .unwrap_or_else(|| "It contains writing.".to_string()),
            "author" => self.pick_author(rng).name,
            "author_quirk" => self.pick_author(rng).author_quirk,
            "hook" => self.pick_author(rng).hook,
            "magical_property" => match self.magic {
                MagicMode::MinorProperty => pick_or_placeholder(rng, &tables.magical_properties),
                _ => String::new(),
            },
            "magical_quirk" => match self.magic {
                MagicMode::MagicalQuirk => pick_or_placeholder(rng, &tables.magical_quirks),
                _ => String::new(),
            },
            "sentience" => match self.magic {
                MagicMode::MinorSentience => format!(
                    "This item is sentient. It is {} It seeks to '{}'.",
                    pick_or_placeholder(rng, &tables.sentient_personalities),
                    pick_or_placeholder(rng, &tables.sentient_purposes)
                ),
                _ => String::new(),
            },
            _ => String::new(),
        }
    }

    fn roll_group(&self, leader: &str, rng: &mut dyn RngCore) -> Vec<(&'static str, String)> {
        match leader {
            "author" => {
                // One author entry fills all three fields, so the hook
                // always matches its stated author.
                let author = self.pick_author(rng);
                vec![
                    ("author", author.name),
                    ("author_quirk", author.author_quirk),
                    ("hook", author.hook),
                ]
            }
            "magical_property" => vec![
                ("magical_property", self.roll_field("magical_property", rng)),
                ("magical_quirk", self.roll_field("magical_quirk", rng)),
                ("sentience", self.roll_field("sentience", rng)),
            ],
            _ => Vec::new(),
        }
    }

    fn format(&self, record: &Record) -> String {
        let empty = String::new();
        let get = |field: &str| record.get(field).unwrap_or(&empty);

        let mut text = String::new();
        push_line(&mut text, "", get("title"));
        push_line(&mut text, "", get("appearance"));
        push_line(&mut text, "", get("sensation"));
        push_line(&mut text, "", get("description"));
        if !get("author").is_empty() {
            push_line(
                &mut text,
                "Author",
                &format!("{} (who {})", get("author"), get("author_quirk")),
            );
        }
        push_line(&mut text, "Hook", get("hook"));
        push_line(&mut text, "Property", get("magical_property"));
        push_line(&mut text, "Quirk", get("magical_quirk"));
        push_line(&mut text, "Sentience", get("sentience"));
        text
    }

    fn export_tables(&self) -> String {
        serde_json::to_string_pretty(&self.tables).unwrap_or_default()
    }

    fn import_tables(&mut self, json: &str) -> Result<(), String> {
        let tables: BookTables =
            serde_json::from_str(json).map_err(|e| format!("invalid JSON: {e}"))?;
        validate(&tables)?;
        self.tables = tables;
        if !self.tables.themes.contains_key(&self.theme) {
            self.theme = self
                .tables
                .themes
                .keys()
                .next()
                .cloned()
                .unwrap_or_else(|| FALLBACK_THEME.to_string());
        }
        Ok(())
    }

    fn reset_tables(&mut self) {
        self.tables = default_tables();
    }
}

fn author(name: &str, quirk: &str, hook: &str) -> Author {
    Author {
        name: name.to_string(),
        author_quirk: quirk.to_string(),
        hook: hook.to_string(),
    }
}

fn theme(
    title_prefix: &[&str],
    title_suffix: &[&str],
    description: &[&str],
    authors: Vec<Author>,
) -> ThemeTables {
    ThemeTables {
        title_prefix: strings(title_prefix),
        title_suffix: strings(title_suffix),
        description: strings(description),
        authors,
    }
}

/// Built-in book tables.
pub fn default_tables() -> BookTables {
    let mut themes = IndexMap::new();

    themes.insert(
        "magic".to_string(),
        theme(
            &["The Verdant Principles", "A Treatise on", "Secrets of the", "The Crimson Grimoire of", "Notes on", "The Ebony Codex", "Fragments of", "The Unfettered Mind", "A Primer for", "The Celestial Concordance"],
            &["Arcane Binding", "Planar Divination", "Abjuration", "Verdant Magic", "Shadow Weaving", "Eldritch Power", "Evocation", "The Astral Sea", "Pyromancy", "The Weave"],
            &[
                "A dense academic text on a specific school of magic. The diagrams are complex and annotated in a shaky hand.",
                "A surprisingly practical journal, filled with spell components and observations on their somatic requirements.",
                "A collection of frantic, paranoid notes, detailing the dangers of a specific entity or plane.",
                "A theoretical work, arguing a controversial stance on the nature of magic itself.",
            ],
            vec![
                author(
                    "Arch-Mage Valerius",
                    "was famously paranoid and wrote all his research in a complex, magical cipher.",
                    "The text is written in Valerius's infamous magical cipher, which glows faintly under moonlight.",
                ),
                author(
                    "Elara Starwhisper",
                    "believed maps held power and hid fragments of them in all her works.",
                    "A partial map to an unknown location is cleverly hidden in the book's binding, stitched into the vellum.",
                ),
                author(
                    "Theodoric the Mad",
                    "was convinced a rival was stealing his thoughts and enchanted his books to repel readers.",
                    "Anyone who reads the first page must make a simple Wisdom save or be struck with a powerful, irrational fear of the book itself.",
                ),
                author(
                    "Mistress Evandra",
                    "was a master of illusions and bound harmless-looking spells into her pages as practical jokes.",
                    "Turning to page 50 causes the reader's hair to turn a vibrant, harmless, and temporary shade of pink.",
                ),
            ],
        ),
    );

    themes.insert(
        "nature".to_string(),
        theme(
            &["A Compendium of", "The Druid's Path", "Herbalist's Guide to", "Whispers of the", "The Stone Tome of", "The Green Cycle", "Watcher's Notes on", "The Root and the Branch"],
            &["Forgotten Beasts", "Moonlit Glades", "Root and Spore", "Wilds", "Deep Earth", "the Feywild", "Seasonal Change", "Animalia"],
            &[
                "A detailed guide to flora and fauna, containing beautiful, life-like sketches and notes on medicinal and poisonous properties.",
                "A druidic text on the balance of nature, written in a circular, flowing script that is difficult to decipher.",
                "A ranger's logbook, detailing animal tracks, migration patterns, and the best way to hunt or trap them.",
            ],
            vec![
                author(
                    "Ysmira the Root-Witch",
                    "only wrote on living parchment, which still grows faint, hair-like roots.",
                    "The parchment itself is alive. If planted and watered, the pages will bloom into strange, unearthly flowers.",
                ),
                author(
                    "Garrick the Beast-Tamer",
                    "bound his books in the hides of magical beasts, which retained a faint echo of their former master.",
                    "The leather cover is enchanted. When stroked, it emits the faint, mournful cry of an unknown beast.",
                ),
                author(
                    "Elder Faelin",
                    "was a druid who believed knowledge should be protected by nature itself.",
                    "The book is harmless, but if taken more than 100 feet from a living tree, the words fade into nothing.",
                ),
            ],
        ),
    );

    themes.insert(
        "religion".to_string(),
        theme(
            &["The Book of", "Testament of the", "Hymns to the", "The Pilgrim's Path", "Meditations on the", "The Unveiling of", "The Ashen Scroll", "The Word of"],
            &["Light", "First Prophet", "Dawning", "Void", "Sacred Flame", "the End", "the Martyr", "the Divine"],
            &[
                "A book of religious scripture or commentary. Many passages are underlined, with fervent notes in the margins.",
                "A hagiography, detailing the miraculous life and heroic deeds of a specific saint or prophet.",
                "A heretical text, offering a dark or forbidden interpretation of the dominant faith. Owning it is a crime.",
                "A collection of simple prayers and songs for the common folk.",
            ],
            vec![
                author(
                    "The Mad Monk of Oakhaven",
                    "was driven mad by whispers and scrawled prophecies in the margins of every book he read.",
                    "The margins are filled with frantic, prophetic scrawlings... and one seems to mention the reader by name.",
                ),
                author(
                    "High Priestess Anara",
                    "believed scripture should only be read by the 'worthy' and sealed her books with a divine lock.",
                    "The book is sealed by a clasp that will not open. It seems to require a specific prayer or a drop of holy water.",
                ),
                author(
                    "Inquisitor Vorlag",
                    "believed in 'trial by fire' and enchanted his holy books to test the faithful.",
                    "The book's silver-leaf lettering is harmless to a devout follower, but will burn the hands of anyone with a 'false heart' (or a different god).",
                ),
            ],
        ),
    );

    themes.insert(
        "history".to_string(),
        theme(
            &["The Downfall of", "A History of the", "Chronicles of the", "The Rise of", "On the Reign of", "The Red Year", "Fragments from", "The Lost Dynasty"],
            &["King Ozymand", "First Empire", "Warring Kingdoms", "the Dragon Cult", "House Valerion", "the Western Reaches", "an Elder Age", "Blackwood"],
            &[
                "A historical account, though its accuracy is questionable. It seems to favour one side heavily.",
                "A dry, factual record of trade, lineages, and border disputes. Incredibly boring, but accurate.",
                "A propagandistic text, portraying a current ruler as a heroic, god-like figure. Full of obvious lies.",
                "A secret history, detailing the assassinations and betrayals that *really* shaped the kingdom.",
            ],
            vec![
                author(
                    "Scribe Tiberius",
                    "was a revisionist historian who used enchanted ink to 'correct' passages he disagreed with.",
                    "The text seems to shift and rewrite itself when you are not looking directly at it, offering conflicting accounts.",
                ),
                author(
                    "Loremaster Pellinore",
                    "was a notorious gossip and hid secret (and scandalous) details about famous figures in his indexes.",
                    "The book appears to be a dry history, but the index is cross-referenced with scandalous secrets (e.g., 'Duke's affair, see p. 87').",
                ),
                author(
                    "General Klytus",
                    "wrote his memoirs with a poison-tipped quill, and the malice seeped into the ink itself.",
                    "The ink is infused with a slow-acting contact poison. The reader must make a DC 10 Constitution save after an hour of reading or fall ill.",
                ),
            ],
        ),
    );

    themes.insert(
        "fiction".to_string(),
        theme(
            &["The Knight of", "A Bard's Tale of", "The Girl Who", "Sonnets for", "The Last Voyage of", "The Jester's Secret", "A Lament for", "The Dragon's Boy"],
            &["Flowers", "the Endless Sea", "Spoke to Dragons", "a Lost Love", "the 'Star Chaser'", "the Sunken King", "Adelaide", "the Beggar-Prophet"],
            &[
                "A collection of epic poems, local legends, or perhaps a surprisingly bawdy romance novel.",
                "A children's book of fables, with simple wood-cut illustrations. It has a surprisingly dark moral.",
                "A play or stage script, with one role heavily circled and annotated with stage directions.",
                "A truly terrible, self-published book of poetry. The rhymes are forced and the metaphors are nonsensical.",
            ],
            vec![
                author(
                    "The Nameless Bard",
                    "was a legendary figure whose songs were said to contain echoes of the future.",
                    "The final poem in the book seems to be an unfinished prophecy that describes the party's recent exploits.",
                ),
                author(
                    "Lady Evangeline",
                    "was a noblewoman who wrote scandalous romances based on real courtly figures, using pseudonyms.",
                    "This bawdy romance novel is a 'key' to the local court. A clever reader can decipher which character corresponds to which noble.",
                ),
                author(
                    "Silas the Seer",
                    "was a failed playwright who hid genuine, minor prophecies in his worst, most boring plays.",
                    "The play is dreadful, but a line in Act 2, Scene 3, accurately predicts a minor event that will happen in the next 24 hours.",
                ),
            ],
        ),
    );

    themes.insert(
        "forbidden".to_string(),
        theme(
            &["The Ashen Codex", "The Book of", "The Shadow Grimoire", "Notes on", "A Treatise on", "The Lament of", "The Unveiling", "The Final Verses of"],
            &["Vile Darkness", "Forbidden Flesh", "the Void", "Lost Souls", "Shadowmancy", "the Whispered One", "the Chained God", "the Faceless Lord"],
            &[
                "A heretical text, offering a dark or forbidden interpretation of magic or reality. Owning it is a crime.",
                "A book detailing vile necromantic rituals or fiendish pacts. The pages are rumoured to be bound in human skin.",
                "A collection of frantic, paranoid notes, detailing the dangers and allure of an Elder Evil.",
                "A text that seems to absorb the light around it, its words shifting and whispering when not looked at directly.",
            ],
            vec![
                author(
                    "Azerak the Lich",
                    "was a powerful lich who stored fragments of his tormented memory within his tomes.",
                    "Reading this book forces a DC 13 Wisdom save. On a failure, the reader is haunted by a vivid, waking nightmare for 1 minute.",
                ),
                author(
                    "An unknown, doomed scribe",
                    "wrote this text as a warning before being consumed by the very thing they studied.",
                    "The final page is a half-finished sentence, ending in a large, dried bloodstain.",
                ),
                author(
                    "Inquisitor Vorlag",
                    "believed in 'trial by fire' and enchanted his holy books to test the faithful.",
                    "The book's silver-leaf lettering is harmless to a devout follower, but will burn the hands of anyone with a 'false heart' (or a different god).",
                ),
            ],
        ),
    );

    BookTables {
        themes,
        appearance: strings(&[
            "A massive, iron-bound tome with a broken lock",
            "A small, water-damaged diary, bound in cheap leather",
            "A scroll sealed with strange, unidentifiable wax",
            "A high-quality book with vellum pages and gold leaf",
            "A simple, wood-bound book, smells faintly of moss",
            "A stack of loose parchment, covered in frantic script",
            "A cheap, pamphlet-like booklet, poorly bound",
            "A book bound in snakeskin that feels unnervingly real",
            "A heavy set of carved stone or clay tablets",
            "A beautifully illuminated manuscript with a silver cover",
            "A book bound in scarred, tough monster hide",
            "A slim volume with a featureless, black leather cover",
        ]),
        condition: strings(&[
            "in pristine condition",
            "heavily annotated in red ink",
            "water-logged and barely legible",
            "slightly singed, as if from a fire",
            "locked with a simple iron clasp",
            "missing its front cover",
            "riddled with wormholes",
            "meticulously preserved, as if brand new",
            "has a dagger hole clean through the middle",
            "the pages are stuck together with a strange, dried substance",
            "all text is written backwards (requires a mirror)",
            "contains invisible ink visible only in heat/cold",
        ]),
        sensation: SensationTables {
            smell: strings(&[
                "faintly of moss",
                "brittle paper and dust",
                "a sharp, ozone smell",
                "a strange, sweet perfume",
                "damp earth and mildew",
                "cinnamon and old incense",
                "like a blacksmith's forge",
                "a salty, briny tang",
                "a coppery, metallic scent",
                "no smell at all, unnaturally so",
                "like brimstone or sulphur",
                "like lavender and roses",
            ]),
            feel: strings(&[
                "the cover is faintly warm",
                "the pages are damp to the touch",
                "a faint, magical vibration comes from the binding",
                "the book feels unnaturally cold",
                "the parchment is brittle and cracks when turned",
                "the cover is slick with a thin, greasy film",
                "static electricity crackles over the pages",
                "the book feels much heavier than it looks",
                "the book feels much lighter than it looks",
                "the pages are sharp and cut your fingers",
            ]),
        },
        magical_properties: strings(&[
            "Beacon: As a bonus action, you can make it shed bright light (10ft) and dim light (10ft), or extinguish it.",
            "Compass: As an action, you learn which way is north.",
            "Guardian: You gain a +2 bonus to initiative rolls while you possess it.",
            "Harmonious: You can attune to this item in only 1 minute.",
            "Key: This item is the key to a specific container, chamber, or vault.",
            "Sentinel (DM's Choice): The book glows faintly when a specific creature type (e.g., Orcs, Fiends) is within 120 feet.",
            "Temperate: You suffer no harm from temperatures as low as 0°F or as high as 100°F.",
            "Waterborne: The book floats on water and gives you advantage on swim checks.",
        ]),
        magical_quirks: strings(&[
            "Blissful: You feel fortunate and optimistic while holding it.",
            "Confident: The book helps you feel self-assured.",
            "Covetous: You become obsessed with material wealth.",
            "Fragile: The book cracks, frays, or chips slightly when used, but is not damaged.",
            "Loud: The book makes a loud noise (a shout, gong, or clang) when opened or read from.",
            "Metamorphic: The book periodically alters its appearance in slight ways (e.g., cover colour, font).",
            "Painful: You feel a harmless flash of pain when you read from it.",
            "Repulsive: You feel a sense of distaste when touching the book.",
        ]),
        sentient_personalities: strings(&[
            "Lawful Good, it is respectful, patient, and somewhat preachy.",
            "Neutral Good, it is kind, helpful, and offers gentle advice.",
            "Chaotic Good, it is rebellious, joyful, and urges you to break rules for a good cause.",
            "Lawful Neutral, it is logical, formal, and demands you follow procedures.",
            "Neutral, it is disinterested, pragmatic, and only offers cold facts.",
            "Chaotic Neutral, it is erratic, selfish, and values its own freedom and whims.",
            "Lawful Evil, it is calculating, manipulative, and whispers plans for power.",
            "Neutral Evil, it is cruel, greedy, and suggests self-serving, harmful actions.",
            "Chaotic Evil, it is destructive, violent, and screams for chaos and bloodshed.",
        ]),
        sentient_purposes: strings(&[
            "Defeat/Destroy a specific creature type (e.g., Undead, Dragons).",
            "Seek its original creator and demand to know why it was made.",
            "Find and fulfil a specific prophecy it contains.",
            "Protect a particular location or the bloodline of its original owner.",
            "Acquire all knowledge on a specific subject (e.g., pyromancy).",
            "Experience destruction and revel in combat.",
            "Achieve fame and glory, demanding its wielder pursue renown.",
            "Defend the interests of a specific (perhaps forgotten) deity.",
            "Find and unite with a long-lost companion item (e.g., a magic quill).",
        ]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{compose, LockRegistry};
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
    fn validator_requires_forbidden_theme() {
        let mut tables = default_tables();
        tables.themes.shift_remove("forbidden");
        let err = validate(&tables).unwrap_err();
        assert!(err.contains("themes.forbidden"));
    }

    #[test]
    fn validator_requires_magic_tables() {
        let mut tables = default_tables();
        tables.magical_properties.clear();
        assert!(validate(&tables).is_err());
    }

    #[test]
    fn author_group_stays_consistent() {
        let domain = BooksDomain::with_tables(default_tables());
        let locks = LockRegistry::new(domain.link_groups());
        let tables = default_tables();
        for seed in 0..50 {
            let record = compose(&domain, &locks, None, true, &mut rng(seed));
            let by_name = tables.themes["magic"]
                .authors
                .iter()
                .find(|a| a.name == record["author"]);
            let author = by_name.expect("author from the selected theme");
            assert_eq!(record["author_quirk"], author.author_quirk);
            assert_eq!(record["hook"], author.hook);
        }
    }

    #[test]
    fn magic_none_leaves_optionals_empty() {
        let domain = BooksDomain::with_tables(default_tables());
        let locks = LockRegistry::new(domain.link_groups());
        let record = compose(&domain, &locks, None, true, &mut rng(1));
        assert_eq!(record["magical_property"], "");
        assert_eq!(record["magical_quirk"], "");
        assert_eq!(record["sentience"], "");
        // optional empties are omitted from the formatted text
        let text = domain.format(&record);
        assert!(!text.contains("Property:"));
        assert!(!text.contains("Sentience:"));
    }

    #[test]
    fn magic_mode_fills_exactly_its_field() {
        let mut domain = BooksDomain::with_tables(default_tables());
        domain.set_selector("magic", "Minor Sentience").unwrap();
        let locks = LockRegistry::new(domain.link_groups());
        let record = compose(&domain, &locks, None, true, &mut rng(2));
        assert_eq!(record["magical_property"], "");
        assert_eq!(record["magical_quirk"], "");
        assert!(record["sentience"].starts_with("This item is sentient."));
        assert!(domain.format(&record).contains("Sentience: "));
    }

    #[test]
    fn unknown_theme_is_rejected() {
        let mut domain = BooksDomain::with_tables(default_tables());
        let err = domain.set_selector("theme", "cookbooks").unwrap_err();
        assert!(err.contains("unknown theme"));
        assert_eq!(domain.selectors()[0].1, "magic");
    }

    #[test]
    fn missing_theme_falls_back_not_fails() {
        let mut tables = default_tables();
        // keep only fiction + forbidden; selected theme 'magic' is gone
        let keep: Vec<String> = vec!["fiction".into(), "forbidden".into()];
        tables.themes.retain(|k, _| keep.contains(k));
        let domain = BooksDomain::with_tables(tables);
        let title = domain.roll_field("title", &mut rng(3));
        assert!(!title.is_empty());
        assert_ne!(title, "A Book");
    }

    #[test]
    fn tables_round_trip_through_json() {
        let mut domain = BooksDomain::with_tables(default_tables());
        let json = domain.export_tables();
        assert!(json.contains("\"titlePrefix\""));
        assert!(json.contains("\"authorQuirk\""));
        domain.import_tables(&json).unwrap();
    }

    #[test]
    fn import_rejects_missing_forbidden() {
        let mut domain = BooksDomain::with_tables(default_tables());
        let mut tables = default_tables();
        tables.themes.shift_remove("forbidden");
        let json = serde_json::to_string(&tables).unwrap();
        let err = domain.import_tables(&json).unwrap_err();
        assert!(err.contains("forbidden"));
    }
}
