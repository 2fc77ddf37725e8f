//! Shop generator: typed name parts, proprietors, stock levels scaled by
//! settlement wealth, notable items, and conflict hooks.
//!
//! The shop type and wealth selectors colour several tables. Name parts and
//! notable items fall back type -> "General Wares" -> "Default"; stock
//! descriptions fall back through the "Default" type and finally "Town"
//! wealth, so a user-added shop type still generates something sensible.

use crate::engine::{push_line, Domain, Record, ReleaseScope};
use crate::store::TableStore;
use indexmap::IndexMap;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::{category_array, pick_category, pick_or_placeholder, strings};

pub const STORAGE_KEY: &str = "shops_v2";

const DEFAULT_TYPE: &str = "General Wares";
const DEFAULT_WEALTH: &str = "Town";

/// type -> list, with "Default" as the editable catch-all entry.
pub type TypeTables = IndexMap<String, Vec<String>>;

/// type -> wealth -> list.
pub type StockTables = IndexMap<String, IndexMap<String, Vec<String>>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopTables {
    pub shop_types: Vec<String>,
    pub wealth_levels: Vec<String>,
    pub name_prefix: TypeTables,
    pub name_suffix: TypeTables,
    pub proprietor: Vec<String>,
    pub aesthetic: Vec<String>,
    pub notable_item: TypeTables,
    pub stock_level: StockTables,
    pub conflict: Vec<String>,
}

pub fn validate(tables: &ShopTables) -> Result<(), String> {
    if tables.shop_types.is_empty() {
        return Err("missing 'shopTypes'".into());
    }
    if tables.wealth_levels.is_empty() {
        return Err("missing 'wealthLevels'".into());
    }
    if tables.name_prefix.is_empty() {
        return Err("missing 'namePrefix'".into());
    }
    if tables.notable_item.is_empty() {
        return Err("missing 'notableItem'".into());
    }
    if tables.stock_level.is_empty() {
        return Err("missing 'stockLevel'".into());
    }
    Ok(())
}

pub struct ShopsDomain {
    tables: ShopTables,
    shop_type: String,
    wealth: String,
}

const FIELDS: &[&str] = &[
    "name",
    "type",
    "wealth",
    "proprietor",
    "aesthetic",
    "stock_level",
    "notable_item",
    "conflict",
];

impl ShopsDomain {
    pub fn open(store: &TableStore) -> Self {
        let tables = store.load(STORAGE_KEY, validate, default_tables);
        Self::with_tables(tables)
    }

    pub fn with_tables(tables: ShopTables) -> Self {
        let shop_type = tables
            .shop_types
            .first()
            .cloned()
            .unwrap_or_else(|| DEFAULT_TYPE.to_string());
        ShopsDomain {
            tables,
            shop_type,
            wealth: DEFAULT_WEALTH.to_string(),
        }
    }

    /// Stock fallback: selected type at selected wealth, then the "Default"
    /// type at that wealth, then "Default" at "Town".
    fn stock_array(&self) -> Option<&[String]> {
        let stock = &self.tables.stock_level;
        if let Some(by_wealth) = stock.get(&self.shop_type) {
            if let Some(items) = category_array(by_wealth, &[&self.wealth]) {
                return Some(items);
            }
        }
        let fallback = stock.get("Default")?;
        category_array(fallback, &[&self.wealth, DEFAULT_WEALTH])
    }
}

impl Domain for ShopsDomain {
    fn name(&self) -> &'static str {
        "shops"
    }

    fn storage_key(&self) -> &'static str {
        STORAGE_KEY
    }

    fn fields(&self) -> &'static [&'static str] {
        FIELDS
    }

    fn reroll_cascade(&self, field: &str) -> &'static [&'static str] {
        match field {
            "type" => &["name", "stock_level", "notable_item"],
            "wealth" => &["stock_level"],
            _ => &[],
        }
    }

    fn selectors(&self) -> Vec<(&'static str, String)> {
        vec![
            ("type", self.shop_type.clone()),
            ("wealth", self.wealth.clone()),
        ]
    }

    fn set_selector(&mut self, key: &str, value: &str) -> Result<ReleaseScope, String> {
        match key {
            "type" => {
                if !self.tables.shop_types.iter().any(|t| t == value) {
                    return Err(format!(
                        "unknown shop type '{}', expected one of: {}",
                        value,
                        self.tables.shop_types.join(", ")
                    ));
                }
                self.shop_type = value.to_string();
                Ok(ReleaseScope::Fields(&[
                    "name",
                    "notable_item",
                    "stock_level",
                ]))
            }
            "wealth" => {
                if !self.tables.wealth_levels.iter().any(|w| w == value) {
                    return Err(format!(
                        "unknown wealth level '{}', expected one of: {}",
                        value,
                        self.tables.wealth_levels.join(", ")
                    ));
                }
                self.wealth = value.to_string();
                Ok(ReleaseScope::Fields(&["stock_level"]))
            }
            other => Err(format!("unknown selector '{other}'")),
        }
    }

    fn roll_field(&self, field: &str, rng: &mut dyn RngCore) -> String {
        let tables = &self.tables;
        let type_chain: &[&str] = &[&self.shop_type, DEFAULT_TYPE, "Default"];
        match field {
            "name" => format!(
                "{} {}",
                pick_category(rng, &tables.name_prefix, type_chain),
                pick_category(rng, &tables.name_suffix, type_chain)
            ),
            "type" => self.shop_type.clone(),
            "wealth" => self.wealth.clone(),
            "proprietor" => pick_or_placeholder(rng, &tables.proprietor),
            "aesthetic" => pick_or_placeholder(rng, &tables.aesthetic),
            "stock_level" => match self.stock_array() {
                Some(items) => pick_or_placeholder(rng, items),
                None => "Standard stock for a place like this.".to_string(),
            },
            "notable_item" => pick_category(rng, &tables.notable_item, type_chain),
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
            push_line(&mut text, "", &format!("{} ({})", get("type"), get("wealth")));
        }
        push_line(&mut text, "Proprietor", get("proprietor"));
        push_line(&mut text, "Aesthetic", get("aesthetic"));
        push_line(&mut text, "Stock", get("stock_level"));
        push_line(&mut text, "Notable Item", get("notable_item"));
        push_line(&mut text, "Conflict / Hook", get("conflict"));
        text
    }

    fn export_tables(&self) -> String {
        serde_json::to_string_pretty(&self.tables).unwrap_or_default()
    }

    fn import_tables(&mut self, json: &str) -> Result<(), String> {
        let tables: ShopTables =
            serde_json::from_str(json).map_err(|e| format!("invalid JSON: {e}"))?;
        validate(&tables)?;
        self.tables = tables;
        if !self.tables.shop_types.iter().any(|t| *t == self.shop_type) {
            self.shop_type = self
                .tables
                .shop_types
                .first()
                .cloned()
                .unwrap_or_else(|| DEFAULT_TYPE.to_string());
        }
        if !self.tables.wealth_levels.iter().any(|w| *w == self.wealth) {
            self.wealth = self
                .tables
                .wealth_levels
                .first()
                .cloned()
                .unwrap_or_else(|| DEFAULT_WEALTH.to_string());
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

fn stock_entry(village: &[&str], town: &[&str], city: &[&str]) -> IndexMap<String, Vec<String>> {
    let mut map = IndexMap::new();
    map.insert("Village".to_string(), strings(village));
    map.insert("Town".to_string(), strings(town));
    map.insert("City".to_string(), strings(city));
    map
}

/// Built-in shop tables.
pub fn default_tables() -> ShopTables {
    let mut stock_level = StockTables::new();
    stock_level.insert(
        "General Wares".to_string(),
        stock_entry(
            &["Basic supplies only: flour, nails, cheap ale, candles.", "Limited goods, mostly local produce and simple tools.", "Often out of stock of anything unusual."],
            &["A good selection of mundane items, tools, and foodstuffs.", "Carries goods from nearby towns.", "Has most items from the PHB Adventuring Gear list under 15 gp."],
            &["Vast inventory of goods from across the realm.", "Carries luxury items, fine clothes, and exotic spices.", "Can order almost any mundane item if you're willing to wait."],
        ),
    );
    stock_level.insert(
        "Adventuring Supplies".to_string(),
        stock_entry(
            &["A few coils of rope, some torches, and maybe a waterskin.", "Sells leftover gear from prospectors.", "Only has what a local farmer might need."],
            &["Good stock of core gear: backpacks, rope, rations, basic weapons.", "Has a climbing kit or two.", "Carries most items from the PHB Adventuring Gear list under 25 gp."],
            &["Fully stocked with all standard adventuring gear.", "Sells specialised kits (climber's, poisoner's).", "Has mounts, barding, and vehicles available for order."],
        ),
    );
    stock_level.insert(
        "Smithy".to_string(),
        stock_entry(
            &["Mostly mends farm equipment and tools. Has a few simple weapons.", "Can repair armour but has none for sale.", "Sells nails, horseshoes, and crowbars."],
            &["A good stock of standard weapons (swords, axes) and mail armour.", "Can forge most simple and martial weapons given time.", "Has one or two suits of heavier armour."],
            &["Full selection of all non-magical weapons and armour.", "Masterwork items available at a high price.", "Can forge items from rare materials if provided."],
        ),
    );
    stock_level.insert(
        "Armourer".to_string(),
        stock_entry(
            &["Primarily repairs leather and padded armour.", "Has a few old shields for sale.", "Can fix chain mail, but doesn't sell it."],
            &["Sells leather, studded leather, and all forms of mail.", "Has one or two suits of plate armour.", "Can craft most armour types on commission."],
            &["Full selection of all armour types, including exotic pieces.", "Sells masterwork plate.", "Offers custom fittings and decorative finishes."],
        ),
    );
    stock_level.insert(
        "Alchemist / Apothecary".to_string(),
        stock_entry(
            &["Sells basic herbal remedies, poultices, and antitoxins.", "Might have one or two Potions of Healing.", "No true alchemical goods."],
            &["Good stock of Antitoxins, Alchemist's Fire, and Acid.", "Reliably carries Potions of Healing.", "May have one or two other Common potions."],
            &["Carries a wide range of alchemical items.", "Sells Common and some Uncommon potions.", "Can identify unknown potions for a fee."],
        ),
    );
    stock_level.insert(
        "Herbalist".to_string(),
        stock_entry(
            &["Sells common herbs, antitoxins, and poultices.", "Has a limited stock based on the local season.", "Can identify common local plants."],
            &["Good stock of mundane herbs and ingredients.", "Sells Healer's Kits.", "May have rare local herbs or basic poisons."],
            &["Carries a vast array of herbs from across the world.", "Sells rare and exotic ingredients.", "Can brew custom herbal remedies or basic poisons."],
        ),
    );
    stock_level.insert(
        "Jeweller".to_string(),
        stock_entry(
            &["Proprietor is a simple artisan making copper/silver trinkets.", "No gemstones for sale.", "Buys gems but pays poorly."],
            &["Sells silver and gold jewellery, some with common gems.", "Has a selection of 50 gp gemstones.", "Can mount gems and do fine repairs."],
            &["Sells exquisite jewellery of gold and platinum.", "Carries a wide variety of 100 gp and 500 gp gemstones.", "May have one or two 1,000 gp+ gems."],
        ),
    );
    stock_level.insert(
        "Tailor / Weaver".to_string(),
        stock_entry(
            &["Mends clothes and weaves simple wool/cotton cloth.", "Sells Traveler's Clothes.", "Can make simple cloaks."],
            &["Sells a variety of clothing, including Costumes and Fine Clothes.", "Works with linen and some silk.", "Can craft banners or guild emblems."],
            &["High-fashion boutique. Sells exquisite Fine Clothes.", "Works with exotic silks, shadow-weave, etc.", "Can craft items with hidden pockets or custom fittings."],
        ),
    );
    stock_level.insert(
        "Leatherworker".to_string(),
        stock_entry(
            &["Repairs boots, saddles, and leather armour.", "Sells basic leather goods like pouches and belts.", "Has one or two suits of Leather Armour."],
            &["Sells Leather and Studded Leather armour.", "Crafts high-quality saddles and barding.", "Sells boots, gloves, and backpacks."],
            &["Sells all types of leather armour, including exotic hides.", "Can craft masterwork leather goods.", "Offers custom tooling and designs."],
        ),
    );
    stock_level.insert(
        "Fletcher / Bowyer".to_string(),
        stock_entry(
            &["Sells simple Shortbows and arrows.", "Repairs bows.", "Stock is limited and functional."],
            &["Sells Shortbows, Longbows, and Light Crossbows.", "Carries a good stock of arrows and bolts.", "May have one Heavy Crossbow."],
            &["Sells all common bow and crossbow types.", "Carries masterwork ammunition.", "Can craft custom bows from exotic woods."],
        ),
    );
    stock_level.insert(
        "Scribe / Cartographer".to_string(),
        stock_entry(
            &["No dedicated shop. The local priest or elder might write letters for a fee.", "Might have a single, old map of the local area.", "Sells a few sheets of parchment and one pot of ink."],
            &["Sells parchment, ink, quills, and sealing wax.", "Has maps of the local region and major trade routes.", "Offers services for copying non-magical text."],
            &["Sells high-quality writing supplies.", "Has a large atlas of maps, including some rare or old charts.", "Offers copying, forgery, and bookbinding services."],
        ),
    );
    stock_level.insert(
        "Bookstore".to_string(),
        stock_entry(
            &["No bookstore. A local wise-person might have a small, personal collection of 2-3 books.", "Sells single sheets of parchment.", "Might have one or two almanacs or chapbooks."],
            &["A small, dusty shop with a few dozen books.", "Carries common histories, religious texts, and some fiction.", "Can order books from the city."],
            &["A large library and shop with hundreds or thousands of books.", "Carries books on arcane lore, planar travel, and rare histories.", "May have a restricted section."],
        ),
    );
    stock_level.insert(
        "Pawnshop".to_string(),
        stock_entry(
            &["No pawnshop. A general store might offer poor trade-in values.", "Locals trade amongst themselves.", "A travelling pedlar might pass through."],
            &["A cluttered shop with a random assortment of mundane goods.", "Might have a few art objects or cheap gems.", "A good place to sell low-value adventuring finds."],
            &["A well-stocked shop with a bizarre inventory.", "Often has art objects, jewellery, and sometimes minor magic items.", "A good place to find oddities or sell valuable, non-magical items quickly."],
        ),
    );
    stock_level.insert(
        "Magic Items (Uncommon)".to_string(),
        stock_entry(
            &["Doesn't exist.", "A local hedge wizard might have a single Common item to sell.", "A 'magic' shop sells fake charms and trinkets."],
            &["A secretive shop, possibly hidden.", "Has 1d4 Common magic items.", "Has a 50% chance of having 1d4-1 Uncommon magic items."],
            &["A well-known (if expensive) establishment.", "Carries a selection of Common and Uncommon magic items.", "Can identify items. May be able to broker sales of Rare items."],
        ),
    );
    stock_level.insert(
        "Potions".to_string(),
        stock_entry(
            &["The local herbalist sells Antitoxin and has 1d4 Potions of Healing.", "No dedicated shop.", "A local priest may provide healing services instead."],
            &["A dedicated alchemist or temple shop.", "Always has Potions of Healing.", "Sells 1d4 other Common potions (e.g., Climbing, Animal Friendship)."],
            &["A well-stocked apothecary.", "Carries all Common potions.", "Has a selection of 1d4 Uncommon potions (e.g., Growth, Resistance)."],
        ),
    );
    stock_level.insert(
        "Default".to_string(),
        stock_entry(
            &["Basic, locally-made items only. Limited stock.", "Mostly offers repair services.", "Stock is poor and overpriced."],
            &["A decent selection of standard items.", "Can handle most common requests.", "Stock is functional and fairly priced."],
            &["A huge variety of items, including luxury and exotic versions.", "Masterwork quality is available.", "Can commission nearly anything."],
        ),
    );

    ShopTables {
        shop_types: strings(&[
            "General Wares", "Adventuring Supplies", "Smithy", "Armourer", "Alchemist / Apothecary",
            "Herbalist", "Jeweller", "Tailor / Weaver", "Leatherworker", "Fletcher / Bowyer",
            "Scribe / Cartographer", "Bookstore", "Pawnshop", "Magic Items (Uncommon)", "Potions",
        ]),
        wealth_levels: strings(&["Village", "Town", "City"]),
        name_prefix: type_table(&[
            ("General Wares", &["The Honest", "The Lucky", "The Humble", "The Village", "The Wayfarer's", "The Everything", "Goods &"]),
            ("Adventuring Supplies", &["The Bold", "The Iron", "The Pathfinder's", "The Survivor's", "The Ready", "The Deep", "Trail"]),
            ("Smithy", &["The Gilded", "The Hammer &", "The Singing", "The Broken", "The Master's", "Iron", "Steel"]),
            ("Armourer", &["The Shining", "The Steadfast", "The Guardian's", "Plate &", "Shield &", "The Iron"]),
            ("Alchemist / Apothecary", &["The Bubbling", "The Glimmering", "The Arcane", "The Alchemist's", "The Fading", "The Wise", "Mortar &"]),
            ("Herbalist", &["The Verdant", "Root &", "The Forest", "The Quiet", "Willow", "Sage"]),
            ("Jeweller", &["The Golden", "The Silver", "Star", "Gem", "The Dragon's", "The Exquisite"]),
            ("Tailor / Weaver", &["The Golden", "Silk &", "The Nimble", "Thread &", "The Master's", "The Loom"]),
            ("Leatherworker", &["Hide &", "The Supple", "The Tough", "Stitch &", "The Master's", "The Boar's"]),
            ("Fletcher / Bowyer", &["The True", "The Keen", "Arrow &", "The Yew", "Feather &", "The Swift"]),
            ("Scribe / Cartographer", &["The Golden", "The Careful", "Quill &", "The Accurate", "Scroll &", "The World"]),
            ("Bookstore", &["The Dusty", "The Wise", "Tome &", "The Owl's", "Forgotten", "The Paper"]),
            ("Pawnshop", &["The Second", "The Lucky", "Honest", "The Magpie's", "Old", "The Forgotten"]),
            ("Magic Items (Uncommon)", &["The Curious", "The Glimmering", "The Hidden", "The Collector's", "The Wanderer's", "Arcane"]),
            ("Potions", &["The Bubbling", "The Healing", "The Crimson", "The Azure", "Vial &", "The Alchemist's"]),
            ("Default", &["The Reliable", "The Local", "The Proper", "The Master's", "Fine"]),
        ]),
        name_suffix: type_table(&[
            ("General Wares", &["Pantry", "Goods", "Wagon", "Corner", "Post", "Emporium", "Sundries"]),
            ("Adventuring Supplies", &["Pack", "Outfitter", "Cache", "Post", "Gear", "Depot", "Trailhead"]),
            ("Smithy", &["Tongs", "Anvil", "Steel", "Forge", "Blade", "Hammer", "Bellows"]),
            ("Armourer", &["Mail", "Plate", "Shield", "Guard", "Bulwark", "Helm"]),
            ("Alchemist / Apothecary", &["Vial", "Cauldron", "Tome", "Eye", "Mortar", "Remedy", "Draught"]),
            ("Herbalist", &["Leaf", "Branch", "Root", "Petal", "Seed", "Grove"]),
            ("Jeweller", &["Stone", "Facet", "Hoard", "Treasures", "Setting", "Gem"]),
            ("Tailor / Weaver", &["Needle", "Shears", "Loom", "Thread", "Stitch", "Garment"]),
            ("Leatherworker", &["Hide", "Strap", "Tannery", "Boot", "Glove"]),
            ("Fletcher / Bowyer", &["Flight", "Shaft", "String", "Nock", "Bow", "Target"]),
            ("Scribe / Cartographer", &["Quill", "Inkwell", "Chart", "Compass", "Parchment", "Map"]),
            ("Bookstore", &["Tome", "Scroll", "Page", "Word", "Quill", "Shelf"]),
            ("Pawnshop", &["Chance", "Finds", "Treasures", "Exchange", "Loan", "Pawn"]),
            ("Magic Items (Uncommon)", &["Curiosity", "Relic", "Wonders", "Arcanum", "Oddity", "Bauble"]),
            ("Potions", &["Flask", "Phial", "Brew", "Tincture", "Elixir", "Draught"]),
            ("Default", &["Goods", "Wares", "Shop", "Stall", "Trading"]),
        ]),
        proprietor: strings(&[
            "A harried-looking gnome with ink/potion/soot-stained fingers",
            "A retired, one-eyed soldier with a booming voice and missing limb",
            "A cheerful halfling family, all talking over each other",
            "A mysterious, robed figure who speaks only in whispers or riddles",
            "A shrewd merchant who haggles aggressively over every copper piece",
            "An elderly widow/widower, surprisingly strong and sharp-witted",
            "A flamboyant former performer (bard/actor) who gestures wildly",
            "A stoic dwarf who communicates mostly through grunts",
            "An absent-minded academic (sage/wizard) often lost in thought",
            "A nervous individual who constantly glances over their shoulder",
            "An overly friendly person who might be hiding something",
            "A pair of identical twins who finish each other's sentences",
        ]),
        aesthetic: strings(&[
            "Cluttered and dusty, items piled high, narrow aisles",
            "Immaculately clean and organised, smells sterile or strongly of one scent (sulphur, polish)",
            "Bare shelves, most goods are 'in the back' or require asking",
            "Dimly lit, smells of strange herbs, incense, or ozone",
            "Loud and chaotic (anvil ringing, potions bubbling, arguments)",
            "Looks abandoned or condemned, but the proprietor appears suddenly",
            "Brightly lit, perhaps magically, with polished surfaces",
            "Cosy and welcoming, smells of woodsmoke, tea, or baked goods",
            "Filled with exotic plants, stuffed animals, or strange artefacts",
            "Decorated with religious symbols or grim warnings",
            "Unnervingly silent, dust motes dancing in lone shafts of light",
            "Has a small, aggressive pet (cat, pseudodragon, small construct)",
        ]),
        notable_item: type_table(&[
            ("General Wares", &[
                "A 'talking' fish mounted on a plaque (repeats overheard phrases)",
                "A music box that plays a haunting tune only certain people can hear",
                "Exotic spices from a faraway land that have minor magical effects",
                "A suspiciously well-made, possibly sentient, wooden spoon",
                "A set of nesting dolls (one is missing)",
                "A self-folding blanket",
                "A perpetually sharp knife that dulls magic items",
            ]),
            ("Adventuring Supplies", &[
                "A map that seems to update itself with recent changes",
                "A compass that points towards the owner's greatest desire (or fear)",
                "A 50-foot coil of rope that cannot be cut by non-magical means",
                "Boots that magically clean themselves",
                "A waterskin that slowly refills with brackish water",
                "A tinderbox that only works for lawful good characters",
                "A grappling hook that occasionally bites the user",
            ]),
            ("Smithy", &[
                "A 'slightly' cursed dagger that whispers temptations (minor flaw)",
                "A heavy shield bearing the crest of a disgraced or lost noble house",
                "A set of masterwork smith's tools, clearly stolen",
                "An ornate, ceremonial sword far too heavy for practical use",
                "A helmet that grants Advantage on saves vs. deafness",
                "Horseshoes that allow silent movement",
                "Adamantine crowbar",
            ]),
            ("Armourer", &[
                "A suit of gleaming plate armour rumoured to be haunted",
                "A shield that occasionally reflects spells (1/day)",
                "Elven chain mail, intricately woven",
                "A helm shaped like a roaring beast's head",
                "Spiked armour recovered from a defeated foe",
                "Ceremonial armour of a foreign guard",
                "A helmet with built-in darkvision (5 ft.)",
            ]),
            ("Alchemist / Apothecary", &[
                "A potion that glows faintly (effect is beneficial but random, e.g., Potion of Climbing)",
                "A bottle of potent 'Dragon's Breath' liquor (grants temporary fire resistance)",
                "A seemingly blank book that reveals alchemical formulae when specific ingredients are smeared on it",
                "A crystal that hums softly and purifies liquids (1/day)",
                "An unstable concoction labelled 'DO NOT SHAKE' (minor explosion)",
                "A vial of Universal Solvent (or what they claim is universal solvent)",
                "A set of miniature, animated homunculi assistants",
            ]),
            ("Herbalist", &[
                "Rare moonpetal flowers that bloom only under moonlight",
                "A bundle of herbs that repel spirits",
                "Seeds for a plant that grows aggressively fast",
                "A salve that allows temporary communication with plants",
                "Poisonous roots disguised as common vegetables",
                "A living, potted plant that whispers secrets",
                "Powdered mummy dust (authenticity questionable)",
            ]),
            ("Jeweller", &[
                "A ring with a hidden poison compartment",
                "An amulet that warms in the presence of gold",
                "A gemstone that occasionally shows glimpses of the past",
                "A necklace made from monster teeth (various sizes)",
                "A crown fit for a minor noble (perhaps stolen)",
                "A set of tools for detecting fake gemstones",
                "A cursed locket that attracts bad luck (minor flaw)",
            ]),
            ("Tailor / Weaver", &[
                "A cloak woven with shimmering, colour-changing thread",
                "Gloves that allow the wearer to handle hot objects safely",
                "A tapestry depicting a forgotten (or prophetic) historical event",
                "Boots lined with fur that grant resistance to cold",
                "A hat that occasionally whispers compliments or insults",
                "Self-mending trousers (repairs 1/day)",
                "A bolt of shadow-spun silk (grants advantage on stealth in dim light)",
            ]),
            ("Leatherworker", &[
                "A wineskin that magically chills its contents",
                "A sturdy backpack with hidden, magically expanded pockets (like a mini Bag of Holding)",
                "Gloves made from displacer beast hide (blur effect 1/day)",
                "Armour with intricate, possibly magical, tooling",
                "A whip crafted from a demon's tail (minor fear effect)",
                "Boots that leave no tracks in natural earth",
                "A saddle rumoured to calm any non-monstrous mount",
            ]),
            ("Fletcher / Bowyer", &[
                "Arrows fletched with griffon feathers (10% extra range)",
                "A bow carved from a sentient tree (it groans when drawn)",
                "Bolts designed to shatter on impact (minor area effect, 1d4 piercing)",
                "An arrow that returns to the quiver once (and only once)",
                "A quiver that holds twice its apparent capacity",
                "A beautifully crafted but badly warped longbow (cursed)",
                "A crossbow with an unusually fast, built-in loading mechanism",
            ]),
            ("Scribe / Cartographer", &[
                "Ink that glows faintly in the dark (or only in moonlight)",
                "A map depicting a place (island, street) that doesn't seem to exist",
                "Quills made from phoenix feathers (fire resistant paper needed)",
                "A set of magical chalk that can draw temporary, illusory walls (1/day)",
                "Parchment that erases itself after 24 hours (for secret messages)",
                "A translating dictionary for a rare or dead language",
                "A detailed anatomical drawing of a rare monster, noting weaknesses",
            ]),
            ("Bookstore", &[
                "A book bound in monster hide that snaps at readers",
                "A novel that seems to tell the story of the reader's future (vaguely)",
                "A collection of prophecies, most already proven false... but one rings true",
                "A first-edition history book with controversial, handwritten annotations",
                "A cookbook containing dangerous or magical recipes (e.g., 'How to Cook for Ghouls')",
                "A locked diary hinting at a local scandal or treasure",
                "A pop-up book depicting planar landscapes that seem to move",
            ]),
            ("Pawnshop", &[
                "A broken holy symbol of a forgotten god (still has minor power)",
                "A musical instrument that plays by itself at inconvenient times",
                "A single, masterfully crafted adamantine boot",
                "A chipped crystal ball that shows distorted, possibly false, images",
                "A dragon's tooth, claimed to be from a famous local wyrm",
                "A tarnished silver mirror that doesn't show reflections (only the 'true' self)",
                "A petrified creature of unknown origin (small, fits on a shelf)",
            ]),
            ("Magic Items (Uncommon)", &[
                "A Bag of Holding being used as a waste bin (smells terrible)",
                "An Immovable Rod holding up a collapsing shelf of junk",
                "A Driftglobe mistaken for a fancy, non-functional paperweight",
                "A Cloak of Elvenkind dyed garish, clashing colours",
                "A Hat of Disguise stuck in one comical, unflattering form",
                "A Pearl of Power kept in a grimy fishbowl",
                "A Wand of Secrets used as a back-scratcher by the proprietor",
            ]),
            ("Potions", &[
                "A Potion of Healing that tastes revolting (e.g., 'Troll's Blood Brew') but works",
                "An unlabeled vial containing swirling, multicolored liquid (random minor effect)",
                "A Potion of Growth, slightly unstable, might have cosmetic side effects (e.g., blue skin)",
                "A Philter of Love, commissioned by a local noble but never collected",
                "A Potion of Poison disguised as a health tonic, 'for a rival'",
                "Expired potions sold at a steep discount (50% chance to fail or have weird effect)",
                "A 'DIY' potion kit with volatile, mismatched ingredients",
            ]),
            ("Default", &[
                "A surprisingly well-crafted mundane item (e.g., a perfectly balanced hammer)",
                "An item clearly stolen from a nearby noble (has crest)",
                "A puzzle box that no one in the shop can open",
                "A foreign coin of unknown value or metal",
                "A tool specific to a rare or forgotten craft",
                "A map fragment leading nowhere obvious",
            ]),
        ]),
        stock_level,
        conflict: strings(&[
            "The proprietor is desperately seeking rare ingredients/materials for a special order",
            "A rival shop owner is using sabotage/intimidation to drive them out of business",
            "The local thieves' guild is demanding exorbitant protection money",
            "The shop is a front for a secret organisation (spies, cultists, rebels)",
            "A recently sold high-value item turned out to be fake/cursed, and the buyer is furious",
            "The proprietor is in deep debt to a dangerous moneylender or criminal element",
            "Guard/Watch suspect the shop deals in stolen or illegal goods",
            "A vital supplier has disappeared or been cut off",
            "The shop is built over something significant (ruin, tomb, portal) attracting attention",
            "The proprietor's family member has been kidnapped to force their services",
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
    fn type_and_wealth_echo_selectors() {
        let mut domain = ShopsDomain::with_tables(default_tables());
        domain.set_selector("type", "Smithy").unwrap();
        domain.set_selector("wealth", "City").unwrap();
        assert_eq!(domain.roll_field("type", &mut rng(1)), "Smithy");
        assert_eq!(domain.roll_field("wealth", &mut rng(1)), "City");
    }

    #[test]
    fn stock_tracks_type_and_wealth() {
        let mut domain = ShopsDomain::with_tables(default_tables());
        domain.set_selector("type", "Smithy").unwrap();
        domain.set_selector("wealth", "Village").unwrap();
        let expected = &default_tables().stock_level["Smithy"]["Village"];
        for seed in 0..20 {
            let stock = domain.roll_field("stock_level", &mut rng(seed));
            assert!(expected.contains(&stock), "unexpected stock: {stock}");
        }
    }

    #[test]
    fn unknown_type_stock_falls_back_to_default() {
        let mut tables = default_tables();
        tables.shop_types.push("Fishmonger".to_string());
        let mut domain = ShopsDomain::with_tables(tables);
        domain.set_selector("type", "Fishmonger").unwrap();
        domain.set_selector("wealth", "Town").unwrap();
        let expected = &default_tables().stock_level["Default"]["Town"];
        let stock = domain.roll_field("stock_level", &mut rng(5));
        assert!(expected.contains(&stock));
        // name falls back through General Wares parts
        let name = domain.roll_field("name", &mut rng(6));
        assert!(!name.contains("N/A"));
    }

    #[test]
    fn selector_rejects_unknown_values() {
        let mut domain = ShopsDomain::with_tables(default_tables());
        assert!(domain.set_selector("type", "Fishmonger").is_err());
        assert!(domain.set_selector("wealth", "Metropolis").is_err());
        assert_eq!(domain.selectors()[0].1, "General Wares");
        assert_eq!(domain.selectors()[1].1, "Town");
    }

    #[test]
    fn type_cascade_covers_dependent_fields() {
        let domain = ShopsDomain::with_tables(default_tables());
        assert_eq!(
            domain.reroll_cascade("type"),
            &["name", "stock_level", "notable_item"]
        );
        assert_eq!(domain.reroll_cascade("wealth"), &["stock_level"]);
        assert!(domain.reroll_cascade("conflict").is_empty());
    }

    #[test]
    fn format_pairs_type_with_wealth() {
        let domain = ShopsDomain::with_tables(default_tables());
        let mut record = Record::new();
        record.insert("name", "The Gilded Anvil".to_string());
        record.insert("type", "Smithy".to_string());
        record.insert("wealth", "Town".to_string());
        record.insert("proprietor", "A stoic dwarf".to_string());
        let text = domain.format(&record);
        assert!(text.contains("Smithy (Town)"));
        assert!(text.contains("Proprietor: A stoic dwarf"));
    }

    #[test]
    fn import_resyncs_selectors() {
        let mut domain = ShopsDomain::with_tables(default_tables());
        domain.set_selector("type", "Potions").unwrap();
        let mut tables = default_tables();
        tables.shop_types = strings(&["Curios"]);
        let json = serde_json::to_string(&tables).unwrap();
        domain.import_tables(&json).unwrap();
        assert_eq!(domain.selectors()[0].1, "Curios");
    }
}
