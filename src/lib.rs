//! # Worldbuilder - Table-Top RPG Content Generator
//!
//! Worldbuilder is a command-line toolkit for game masters: it generates
//! books, shops, points of interest, encounters, quests, treasure hoards,
//! settlements, character names, and landmasses from editable data tables.
//!
//! ## Features
//!
//! - **Nine Generators**: Each produces a structured record of named fields
//!   rendered as copy-ready plain text.
//! - **Lock & Reroll**: Pin any field and redraw the rest; linked fields
//!   (an author's name, quirk, and hook) lock and reroll as one unit.
//! - **Editable Tables**: Every generator reads its tables from a JSON slot
//!   under the data directory; edits are validated before commit and bad or
//!   missing data falls back to the built-in defaults.
//! - **Dice Engine**: A shared `NdM+K*M/D` evaluator backs encounter
//!   distances, treasure tiers, and the standalone `roll` command.
//! - **Treasure Hoards**: Tier-driven gold totals split into art objects,
//!   gemstones, coins, and themed magic items, with exact value conservation.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use worldbuilder::domains;
//! use worldbuilder::engine::{self, LockRegistry};
//! use worldbuilder::store::TableStore;
//!
//! fn main() -> anyhow::Result<()> {
//!     let store = TableStore::new("data");
//!     let domain = domains::open("shops", &store).map_err(anyhow::Error::msg)?;
//!     let locks = LockRegistry::new(domain.link_groups());
//!     let record = engine::compose(
//!         domain.as_ref(),
//!         &locks,
//!         None,
//!         true,
//!         &mut rand::thread_rng(),
//!     );
//!     println!("{}", domain.format(&record));
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`engine`] - The generic lock/reroll cycle every generator shares
//! - [`domains`] - Per-generator tables, defaults, and field semantics
//! - [`dice`] - Dice-notation parsing and evaluation
//! - [`store`] - Versioned JSON table persistence with validate-or-reset
//! - [`session`] - Line-oriented interactive command processor
//! - [`config`] - Configuration management

pub mod config;
pub mod dice;
pub mod domains;
pub mod engine;
pub mod session;
pub mod store;
