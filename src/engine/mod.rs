//! Generic generation engine shared by every content domain.
//!
//! A domain supplies its ordered field list, link-group table, per-field
//! generation, and a plain-text formatter; the engine drives the common
//! lock/reroll cycle:
//!
//! - [`compose`] builds a full record, keeping locked values from the
//!   previous record and drawing fresh values for everything else;
//! - [`reroll_field`] replaces exactly one field (or its whole link-group),
//!   ignoring lock state for that explicit action;
//! - [`LockRegistry`] tracks which fields are pinned between passes.
//!
//! Field generation is infallible by contract: a missing or empty table
//! resolves to a fallback array and finally to a fixed placeholder string,
//! never to an error. Optional fields resolve to an empty string, which the
//! formatters omit.

pub mod locks;

pub use locks::{LinkGroup, LockRegistry};

use indexmap::IndexMap;
use rand::RngCore;

/// A generated record: ordered field → value. Optional fields hold an empty
/// string rather than being absent, so record shape is stable per domain.
pub type Record = IndexMap<&'static str, String>;

/// Placeholder produced when a table is missing or empty even after
/// fallback. Generation never fails; it degrades to this.
pub const PLACEHOLDER: &str = "N/A";

/// Which locks a selector change invalidates.
#[derive(Debug, PartialEq, Eq)]
pub enum ReleaseScope {
    /// Every lock (e.g. a theme change re-colours every table).
    All,
    /// Only the named fields (groups resolve through their leader).
    Fields(&'static [&'static str]),
}

/// One content domain: tables, selectors, and field semantics.
///
/// Implementations own their table data and current selector values; the
/// engine only sees field names and generated strings.
pub trait Domain {
    fn name(&self) -> &'static str;

    /// Version-suffixed persistence slot key, e.g. `"books_v3"`.
    fn storage_key(&self) -> &'static str;

    /// Ordered field list; also defines display order.
    fn fields(&self) -> &'static [&'static str];

    /// Fields that must be generated and locked together.
    fn link_groups(&self) -> &'static [LinkGroup] {
        &[]
    }

    /// Knock-on fields refreshed (when unlocked) after an explicit reroll of
    /// `field`, e.g. rerolling a shop's type refreshes its name and stock.
    fn reroll_cascade(&self, _field: &str) -> &'static [&'static str] {
        &[]
    }

    /// Current selector values, for display.
    fn selectors(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// Change a selector. On success returns the lock-release scope; on
    /// failure (unknown key or value) returns a user-facing message and
    /// leaves state untouched.
    fn set_selector(&mut self, key: &str, value: &str) -> Result<ReleaseScope, String> {
        let _ = value;
        Err(format!("unknown selector '{key}'"))
    }

    /// Draw one value for `field` from the current tables and selectors.
    fn roll_field(&self, field: &str, rng: &mut dyn RngCore) -> String;

    /// Draw every member of a link-group from one underlying pick, so the
    /// members stay narratively consistent. Domains without groups keep the
    /// default; the engine falls back to per-field rolls on an empty result.
    fn roll_group(&self, _leader: &str, _rng: &mut dyn RngCore) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// Render a record as labelled plain text, omitting empty optionals.
    fn format(&self, record: &Record) -> String;

    /// Current tables as pretty JSON (the editing surface).
    fn export_tables(&self) -> String;

    /// Parse + validate + swap in edited tables. On failure the message is
    /// shown to the user and prior tables stay untouched.
    fn import_tables(&mut self, json: &str) -> Result<(), String>;

    /// Replace tables with the built-in defaults.
    fn reset_tables(&mut self);
}

/// Resolve a caller-supplied field name to the domain's static name.
pub fn canon(domain: &dyn Domain, field: &str) -> Option<&'static str> {
    domain.fields().iter().copied().find(|f| *f == field)
}

fn group_of<'a>(domain: &'a dyn Domain, field: &str) -> Option<&'a LinkGroup> {
    domain.link_groups().iter().find(|g| g.contains(field))
}

fn roll_group_or_fields(
    domain: &dyn Domain,
    group: &LinkGroup,
    rng: &mut dyn RngCore,
    out: &mut Record,
) {
    let rolled = domain.roll_group(group.leader, rng);
    if rolled.is_empty() {
        for &member in group.members {
            out.insert(member, domain.roll_field(member, rng));
        }
    } else {
        for (field, value) in rolled {
            out.insert(field, value);
        }
    }
}

/// Build a complete record.
///
/// With `full_reroll` every field is drawn fresh and locks are ignored.
/// Otherwise locked fields copy their value from `prev`; a locked field
/// missing from `prev` is drawn fresh anyway (locked-but-never-generated).
/// Link-group members resolve atomically through their leader's lock.
pub fn compose(
    domain: &dyn Domain,
    locks: &LockRegistry,
    prev: Option<&Record>,
    full_reroll: bool,
    rng: &mut dyn RngCore,
) -> Record {
    let mut record = Record::new();

    for &field in domain.fields() {
        if record.contains_key(field) {
            continue; // already filled by an earlier group roll
        }
        if let Some(group) = group_of(domain, field) {
            let kept = !full_reroll
                && locks.is_locked(group.leader)
                && prev.map_or(false, |p| {
                    group.members.iter().all(|m| p.contains_key(*m))
                });
            if kept {
                let p = prev.expect("kept implies prev");
                for &member in group.members {
                    record.insert(member, p[member].clone());
                }
            } else {
                roll_group_or_fields(domain, group, rng, &mut record);
            }
        } else {
            let kept = !full_reroll && locks.is_locked(field);
            let value = if kept {
                match prev.and_then(|p| p.get(field)) {
                    Some(v) => v.clone(),
                    None => domain.roll_field(field, rng),
                }
            } else {
                domain.roll_field(field, rng)
            };
            record.insert(field, value);
        }
    }

    record
}

/// Replace exactly one field (and its link-group, if any) with a fresh draw,
/// ignoring lock state for that field. Declared cascade fields are refreshed
/// too unless they are locked. Every other field is untouched.
pub fn reroll_field(
    domain: &dyn Domain,
    locks: &LockRegistry,
    record: &Record,
    field: &str,
    rng: &mut dyn RngCore,
) -> Result<Record, String> {
    let field = canon(domain, field).ok_or_else(|| format!("unknown field '{field}'"))?;
    let mut out = record.clone();

    if let Some(group) = group_of(domain, field) {
        roll_group_or_fields(domain, group, rng, &mut out);
    } else {
        out.insert(field, domain.roll_field(field, rng));
    }

    for &dep in domain.reroll_cascade(field) {
        if !locks.is_locked(dep) {
            out.insert(dep, domain.roll_field(dep, rng));
        }
    }

    Ok(out)
}

/// Append `Label: value` to a text block, skipping empty values. Shared by
/// the domain formatters.
pub fn push_line(text: &mut String, label: &str, value: &str) {
    if value.is_empty() {
        return;
    }
    if !text.is_empty() {
        text.push('\n');
    }
    if label.is_empty() {
        text.push_str(value);
    } else {
        text.push_str(label);
        text.push_str(": ");
        text.push_str(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Minimal fixture domain: three plain fields plus a two-field group
    /// whose members must always agree (value pairs share an index).
    struct PairDomain;

    const PAIR_GROUPS: &[LinkGroup] = &[LinkGroup {
        leader: "left",
        members: &["left", "right"],
    }];

    impl Domain for PairDomain {
        fn name(&self) -> &'static str {
            "pairs"
        }
        fn storage_key(&self) -> &'static str {
            "pairs_v1"
        }
        fn fields(&self) -> &'static [&'static str] {
            &["alpha", "beta", "left", "right"]
        }
        fn link_groups(&self) -> &'static [LinkGroup] {
            PAIR_GROUPS
        }
        fn roll_field(&self, field: &str, rng: &mut dyn RngCore) -> String {
            format!("{field}-{}", rng.next_u32())
        }
        fn roll_group(&self, _leader: &str, rng: &mut dyn RngCore) -> Vec<(&'static str, String)> {
            let n = rng.next_u32();
            vec![("left", format!("L{n}")), ("right", format!("R{n}"))]
        }
        fn format(&self, record: &Record) -> String {
            let mut text = String::new();
            for (field, value) in record {
                push_line(&mut text, field, value);
            }
            text
        }
        fn export_tables(&self) -> String {
            "{}".into()
        }
        fn import_tables(&mut self, _json: &str) -> Result<(), String> {
            Ok(())
        }
        fn reset_tables(&mut self) {}
    }

    fn rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    fn pair_index(v: &str) -> &str {
        &v[1..]
    }

    #[test]
    fn compose_fills_every_field() {
        let domain = PairDomain;
        let locks = LockRegistry::new(domain.link_groups());
        let record = compose(&domain, &locks, None, true, &mut rng(1));
        assert_eq!(record.len(), 4);
        for &field in domain.fields() {
            assert!(!record[field].is_empty());
        }
    }

    #[test]
    fn group_members_share_one_pick() {
        let domain = PairDomain;
        let locks = LockRegistry::new(domain.link_groups());
        let record = compose(&domain, &locks, None, true, &mut rng(2));
        assert_eq!(pair_index(&record["left"]), pair_index(&record["right"]));
    }

    #[test]
    fn full_reroll_false_respects_locks() {
        let domain = PairDomain;
        let mut locks = LockRegistry::new(domain.link_groups());
        let first = compose(&domain, &locks, None, true, &mut rng(3));

        locks.toggle("alpha");
        locks.toggle("right"); // locks the whole left/right group
        let second = compose(&domain, &locks, Some(&first), false, &mut rng(4));

        assert_eq!(second["alpha"], first["alpha"]);
        assert_eq!(second["left"], first["left"]);
        assert_eq!(second["right"], first["right"]);
    }

    #[test]
    fn full_reroll_true_overrides_locks() {
        let domain = PairDomain;
        let mut locks = LockRegistry::new(domain.link_groups());
        let first = compose(&domain, &locks, None, true, &mut rng(5));
        locks.toggle("alpha");
        // Different seed, so a fresh draw virtually never collides.
        let second = compose(&domain, &locks, Some(&first), true, &mut rng(6));
        assert_ne!(second["alpha"], first["alpha"]);
    }

    #[test]
    fn locked_but_never_generated_still_fills() {
        let domain = PairDomain;
        let mut locks = LockRegistry::new(domain.link_groups());
        locks.toggle("beta");
        let record = compose(&domain, &locks, None, false, &mut rng(7));
        assert!(!record["beta"].is_empty());
    }

    #[test]
    fn reroll_changes_only_target_field() {
        let domain = PairDomain;
        let locks = LockRegistry::new(domain.link_groups());
        let record = compose(&domain, &locks, None, true, &mut rng(8));
        let rerolled = reroll_field(&domain, &locks, &record, "beta", &mut rng(9)).unwrap();

        assert_ne!(rerolled["beta"], record["beta"]);
        assert_eq!(rerolled["alpha"], record["alpha"]);
        assert_eq!(rerolled["left"], record["left"]);
        assert_eq!(rerolled["right"], record["right"]);
    }

    #[test]
    fn reroll_group_member_replaces_whole_group() {
        let domain = PairDomain;
        let locks = LockRegistry::new(domain.link_groups());
        let record = compose(&domain, &locks, None, true, &mut rng(10));
        let rerolled = reroll_field(&domain, &locks, &record, "right", &mut rng(11)).unwrap();

        assert_ne!(rerolled["left"], record["left"]);
        assert_eq!(
            pair_index(&rerolled["left"]),
            pair_index(&rerolled["right"])
        );
        assert_eq!(rerolled["alpha"], record["alpha"]);
        assert_eq!(rerolled["beta"], record["beta"]);
    }

    #[test]
    fn reroll_overrides_lock_on_target() {
        let domain = PairDomain;
        let mut locks = LockRegistry::new(domain.link_groups());
        let record = compose(&domain, &locks, None, true, &mut rng(12));
        locks.toggle("beta");
        let rerolled = reroll_field(&domain, &locks, &record, "beta", &mut rng(13)).unwrap();
        assert_ne!(rerolled["beta"], record["beta"]);
    }

    #[test]
    fn reroll_unknown_field_is_an_error() {
        let domain = PairDomain;
        let locks = LockRegistry::new(domain.link_groups());
        let record = compose(&domain, &locks, None, true, &mut rng(14));
        assert!(reroll_field(&domain, &locks, &record, "nope", &mut rng(15)).is_err());
    }
}
