//! Binary entrypoint for the Worldbuilder CLI.
//!
//! Commands:
//! - `generate <domain> [--set k=v] [--count N]` - one-shot generation
//! - `session <domain>` - interactive lock/reroll loop on stdin
//! - `roll <expr> [--times N]` - evaluate dice notation
//! - `hoard --tier <cr> [--theme <theme>]` - allocate a treasure hoard
//! - `encounter --terrain <t> [--chance N] [--force]` - d20 encounter check
//! - `chase --type <t>` - d12 chase complication
//! - `data <show|save|reset> <domain>` - manage a domain's table slot
//! - `init` - create a starter `worldbuilder.toml`
//!
//! See the library crate docs for module-level details: `worldbuilder::`.
use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{BufRead, Write};

use worldbuilder::config::Config;
use worldbuilder::domains::{self, encounters, loot, DOMAIN_NAMES};
use worldbuilder::engine::{self, LockRegistry, ReleaseScope};
use worldbuilder::session::Session;
use worldbuilder::dice;
use worldbuilder::store::TableStore;

#[derive(Parser)]
#[command(name = "worldbuilder")]
#[command(about = "A table-top RPG content generator driven by editable data tables")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "worldbuilder.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// RNG seed for reproducible output
    #[arg(long, global = true)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one or more records from a domain
    Generate {
        /// Domain name (books, shops, poi, encounters, quests, loot,
        /// settlements, names, landmass)
        domain: String,

        /// Selector override, e.g. --set theme=forbidden (repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        selectors: Vec<String>,

        /// Number of records to generate
        #[arg(long, default_value_t = 1)]
        count: u32,
    },
    /// Run an interactive lock/reroll session on stdin
    Session {
        /// Domain name
        domain: String,
    },
    /// Evaluate a dice expression such as 3d6+2 or 6d6*100
    Roll {
        /// Expression in NdM[+K|-K][*M][/D] notation
        expr: String,

        /// Number of evaluations
        #[arg(long, default_value_t = 1)]
        times: u32,
    },
    /// Allocate a treasure hoard for a CR tier
    Hoard {
        /// CR tier, e.g. "0-4", "5-10", "11-16", "17+"
        #[arg(long)]
        tier: String,

        /// Magic item theme (falls back to "Any")
        #[arg(long, default_value = "Any")]
        theme: String,
    },
    /// Roll a d20 random encounter check for a terrain
    Encounter {
        /// Terrain name, e.g. Forest, Urban, Underdark
        #[arg(long)]
        terrain: String,

        /// Minimum d20 roll that triggers an encounter
        #[arg(long)]
        chance: Option<u64>,

        /// Skip the check and always produce an encounter
        #[arg(long)]
        force: bool,
    },
    /// Roll a d12 chase complication
    Chase {
        /// Chase table, e.g. Urban or Wilderness
        #[arg(long = "type")]
        chase_type: String,
    },
    /// Show, save, or reset a domain's persisted tables
    Data {
        #[command(subcommand)]
        action: DataAction,
    },
    /// Create a starter configuration file
    Init,
}

#[derive(Subcommand)]
enum DataAction {
    /// Print the domain's current tables as JSON
    Show { domain: String },
    /// Persist the domain's current tables to its slot
    Save { domain: String },
    /// Delete the slot so defaults apply on next load
    Reset { domain: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match cli.command {
        Commands::Init => Config::default(),
        _ => Config::load_or_default(&cli.config)?,
    };
    init_logging(&config, cli.verbose);

    let store = TableStore::new(&config.storage.data_dir);
    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    match cli.command {
        Commands::Generate {
            domain,
            selectors,
            count,
        } => {
            let mut domain = domains::open(&domain, &store).map_err(anyhow::Error::msg)?;
            for pair in &selectors {
                let (key, value) = pair.split_once('=').ok_or_else(|| {
                    anyhow::anyhow!("bad --set '{pair}', expected KEY=VALUE")
                })?;
                match domain.set_selector(key, value) {
                    Ok(ReleaseScope::All | ReleaseScope::Fields(_)) => {}
                    Err(message) => anyhow::bail!(message),
                }
            }
            let locks = LockRegistry::new(domain.link_groups());
            for i in 0..count {
                if i > 0 {
                    println!();
                }
                let record = engine::compose(domain.as_ref(), &locks, None, true, &mut rng);
                println!("{}", domain.format(&record));
            }
        }
        Commands::Session { domain } => {
            let mut session = Session::open(&domain, &store).map_err(anyhow::Error::msg)?;
            info!("session started for '{}'", session.domain_name());
            println!(
                "worldbuilder session ({}); 'help' for commands",
                session.domain_name()
            );
            let stdin = std::io::stdin();
            let mut stdout = std::io::stdout();
            loop {
                print!("> ");
                stdout.flush()?;
                let mut line = String::new();
                if stdin.lock().read_line(&mut line)? == 0 {
                    break; // EOF
                }
                let reply = session.handle_line(&line, &mut rng);
                if !reply.text.is_empty() {
                    println!("{}", reply.text);
                }
                if reply.quit {
                    break;
                }
            }
        }
        Commands::Roll { expr, times } => {
            for _ in 0..times {
                println!("{}", dice::roll_with(&expr, &mut rng));
            }
        }
        Commands::Hoard { tier, theme } => {
            let domain = loot::LootDomain::open(&store);
            let hoard = loot::allocate(
                &tier,
                &theme,
                domain.hoard_tables(),
                &loot::HoardParams::default(),
                &mut rng,
            )
            .map_err(anyhow::Error::msg)?;
            println!("{}", hoard.summary());
        }
        Commands::Encounter {
            terrain,
            chance,
            force,
        } => {
            let domain = encounters::EncountersDomain::open(&store);
            let chance = chance.unwrap_or(encounters::DEFAULT_ENCOUNTER_CHANCE);
            let encounter = domain
                .random_encounter(&terrain, chance, force, &mut rng)
                .map_err(anyhow::Error::msg)?;
            println!(
                "{} (d20: {}): {}",
                encounter.terrain, encounter.roll, encounter.result
            );
            if let Some(feet) = encounter.distance_feet {
                println!("Approach distance: {feet} ft");
            }
        }
        Commands::Chase { chase_type } => {
            let domain = encounters::EncountersDomain::open(&store);
            let complication = domain
                .chase_complication(&chase_type, &mut rng)
                .map_err(anyhow::Error::msg)?;
            println!(
                "{} chase (d12: {}): {}",
                complication.chase_type, complication.roll, complication.text
            );
        }
        Commands::Data { action } => match action {
            DataAction::Show { domain } => {
                let domain = domains::open(&domain, &store).map_err(anyhow::Error::msg)?;
                println!("{}", domain.export_tables());
            }
            DataAction::Save { domain } => {
                let domain = domains::open(&domain, &store).map_err(anyhow::Error::msg)?;
                let key = domain.storage_key();
                store.save::<serde_json::Value>(key, &domain.export_tables(), accept_any)?;
                println!("saved {} to {}", key, store.slot_path(key).display());
            }
            DataAction::Reset { domain } => {
                let domain = domains::open(&domain, &store).map_err(anyhow::Error::msg)?;
                let key = domain.storage_key();
                store.reset(key)?;
                println!("reset {key}; defaults apply on next load");
            }
        },
        Commands::Init => {
            Config::create_default(&cli.config)?;
            println!("Configuration file created at {}", cli.config);
            println!("Domains: {}", DOMAIN_NAMES.join(", "));
        }
    }

    Ok(())
}

fn init_logging(config: &Config, verbosity: u8) {
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides the configured level
    let level = match verbosity {
        0 => config
            .logging
            .level
            .parse()
            .unwrap_or(log::LevelFilter::Warn),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(level);
    let _ = builder.try_init();
}

// Exports come from validated in-memory tables.
fn accept_any(_: &serde_json::Value) -> Result<(), String> {
    Ok(())
}
