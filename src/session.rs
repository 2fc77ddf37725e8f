//! Interactive generator session: a line-oriented command processor over one
//! domain, its lock registry, and the most recent record.
//!
//! The processor never errors out of the loop. Unknown commands, unknown
//! fields, and rejected selector values all come back as plain reply text;
//! only `quit` ends the session.

use crate::domains;
use crate::engine::{self, Domain, LockRegistry, Record, ReleaseScope};
use crate::store::TableStore;
use rand::RngCore;

/// One reply from the command processor.
pub struct Reply {
    pub text: String,
    pub quit: bool,
}

impl Reply {
    fn say(text: impl Into<String>) -> Self {
        Reply {
            text: text.into(),
            quit: false,
        }
    }
}

/// Interactive state for one domain.
pub struct Session {
    domain: Box<dyn Domain>,
    locks: LockRegistry,
    record: Option<Record>,
    store: TableStore,
}

const HELP: &str = "commands:
  gen                   generate (locked fields keep their values)
  reroll <field>        redraw one field, ignoring its lock
  lock <field>          toggle a lock (link-groups lock together)
  locks                 list locked fields
  show                  current record with lock markers
  text                  current record as formatted text
  set <selector> <val>  change a selector (releases dependent locks)
  save                  persist the current tables
  reset                 restore built-in tables (and clear the saved slot)
  help                  this text
  quit                  leave the session";

impl Session {
    pub fn open(domain_name: &str, store: &TableStore) -> Result<Self, String> {
        let domain = domains::open(domain_name, store)?;
        let locks = LockRegistry::new(domain.link_groups());
        Ok(Session {
            domain,
            locks,
            record: None,
            store: store.clone(),
        })
    }

    pub fn domain_name(&self) -> &'static str {
        self.domain.name()
    }

    /// Process one input line. Blank lines reply with nothing.
    pub fn handle_line(&mut self, line: &str, rng: &mut dyn RngCore) -> Reply {
        let mut parts = line.split_whitespace();
        let command = match parts.next() {
            Some(c) => c,
            None => return Reply::say(""),
        };
        let arg = parts.next();
        let value: Option<String> = {
            let rest: Vec<&str> = parts.collect();
            if rest.is_empty() {
                None
            } else {
                Some(rest.join(" "))
            }
        };

        match command {
            "gen" | "g" => self.generate(rng),
            "reroll" | "r" => match arg {
                Some(field) => self.reroll(field, rng),
                None => Reply::say("usage: reroll <field>"),
            },
            "lock" | "l" => match arg {
                Some(field) => self.toggle_lock(field),
                None => Reply::say("usage: lock <field>"),
            },
            "locks" => {
                let keys = self.locks.locked_keys();
                if keys.is_empty() {
                    Reply::say("no locks")
                } else {
                    Reply::say(format!("locked: {}", keys.join(", ")))
                }
            }
            "show" => self.show(),
            "text" => match &self.record {
                Some(record) => Reply::say(self.domain.format(record)),
                None => Reply::say("nothing generated yet; try 'gen'"),
            },
            "set" => match (arg, value) {
                (Some(key), Some(val)) => self.set_selector(key, &val),
                _ => Reply::say("usage: set <selector> <value>"),
            },
            "save" => self.save(),
            "reset" => self.reset(),
            "help" | "?" => Reply::say(HELP),
            "quit" | "q" | "exit" => Reply {
                text: "bye".to_string(),
                quit: true,
            },
            other => Reply::say(format!("unknown command '{other}'; try 'help'")),
        }
    }

    fn generate(&mut self, rng: &mut dyn RngCore) -> Reply {
        let record = engine::compose(
            self.domain.as_ref(),
            &self.locks,
            self.record.as_ref(),
            self.record.is_none(),
            rng,
        );
        let text = self.domain.format(&record);
        self.record = Some(record);
        Reply::say(text)
    }

    fn reroll(&mut self, field: &str, rng: &mut dyn RngCore) -> Reply {
        let record = match &self.record {
            Some(record) => record,
            None => return Reply::say("nothing generated yet; try 'gen'"),
        };
        match engine::reroll_field(self.domain.as_ref(), &self.locks, record, field, rng) {
            Ok(next) => {
                let text = self.domain.format(&next);
                self.record = Some(next);
                Reply::say(text)
            }
            Err(message) => Reply::say(message),
        }
    }

    fn toggle_lock(&mut self, field: &str) -> Reply {
        match engine::canon(self.domain.as_ref(), field) {
            Some(field) => {
                let locked = self.locks.toggle(field);
                Reply::say(format!(
                    "{field} {}",
                    if locked { "locked" } else { "unlocked" }
                ))
            }
            None => Reply::say(format!(
                "unknown field '{}', expected one of: {}",
                field,
                self.domain.fields().join(", ")
            )),
        }
    }

    fn show(&self) -> Reply {
        let record = match &self.record {
            Some(record) => record,
            None => return Reply::say("nothing generated yet; try 'gen'"),
        };
        let mut lines = Vec::new();
        for (selector, current) in self.domain.selectors() {
            lines.push(format!("[{selector} = {current}]"));
        }
        for (&field, value) in record {
            let marker = if self.locks.is_locked(field) { "*" } else { " " };
            lines.push(format!("{marker} {field}: {value}"));
        }
        Reply::say(lines.join("\n"))
    }

    fn set_selector(&mut self, key: &str, value: &str) -> Reply {
        match self.domain.set_selector(key, value) {
            Ok(ReleaseScope::All) => {
                self.locks.clear();
                Reply::say(format!("{key} = {value} (all locks released)"))
            }
            Ok(ReleaseScope::Fields(fields)) => {
                self.locks.release(fields);
                if fields.is_empty() {
                    Reply::say(format!("{key} = {value}"))
                } else {
                    Reply::say(format!(
                        "{key} = {value} (released: {})",
                        fields.join(", ")
                    ))
                }
            }
            Err(message) => Reply::say(message),
        }
    }

    fn save(&mut self) -> Reply {
        let json = self.domain.export_tables();
        match self
            .store
            .save::<serde_json::Value>(self.domain.storage_key(), &json, accept_any)
        {
            Ok(_) => Reply::say(format!("saved {}", self.domain.storage_key())),
            Err(e) => Reply::say(format!("save failed: {e}")),
        }
    }

    fn reset(&mut self) -> Reply {
        self.domain.reset_tables();
        match self.store.reset(self.domain.storage_key()) {
            Ok(()) => Reply::say("tables reset to defaults"),
            Err(e) => Reply::say(format!("tables reset in memory, but: {e}")),
        }
    }
}

// In-memory tables were validated on the way in; exports are trusted.
fn accept_any(_: &serde_json::Value) -> Result<(), String> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn session(domain: &str) -> (Session, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = TableStore::new(dir.path());
        (Session::open(domain, &store).unwrap(), dir)
    }

    fn rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    #[test]
    fn unknown_domain_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = TableStore::new(dir.path());
        assert!(Session::open("nope", &store).is_err());
    }

    #[test]
    fn gen_then_text_round_trip() {
        let (mut session, _dir) = session("settlements");
        let mut r = rng(1);

        let reply = session.handle_line("text", &mut r);
        assert!(reply.text.contains("nothing generated"));

        let generated = session.handle_line("gen", &mut r);
        assert!(!generated.text.is_empty());
        let shown = session.handle_line("text", &mut r);
        assert_eq!(shown.text, generated.text);
    }

    #[test]
    fn lock_keeps_field_across_gen() {
        let (mut session, _dir) = session("names");
        let mut r = rng(2);

        session.handle_line("gen", &mut r);
        let reply = session.handle_line("lock surname", &mut r);
        assert!(reply.text.contains("locked"));

        let before = session.handle_line("show", &mut r).text;
        let surname_line = before
            .lines()
            .find(|l| l.contains("surname:"))
            .unwrap()
            .to_string();
        session.handle_line("gen", &mut r);
        let after = session.handle_line("show", &mut r).text;
        assert!(after.contains(&surname_line));
    }

    #[test]
    fn set_selector_reports_released_fields() {
        let (mut session, _dir) = session("shops");
        let mut r = rng(3);
        session.handle_line("gen", &mut r);
        session.handle_line("lock name", &mut r);
        let reply = session.handle_line("set type Smithy", &mut r);
        assert!(reply.text.contains("type = Smithy"), "{}", reply.text);
        assert!(reply.text.contains("name"));
        assert!(session.handle_line("locks", &mut r).text.contains("no locks"));
    }

    #[test]
    fn bad_input_never_quits() {
        let (mut session, _dir) = session("books");
        let mut r = rng(4);
        for line in ["", "frobnicate", "reroll", "lock nope", "set theme"] {
            let reply = session.handle_line(line, &mut r);
            assert!(!reply.quit, "{line:?} should not quit");
        }
        assert!(session.handle_line("quit", &mut r).quit);
    }

    #[test]
    fn save_and_reset_manage_the_slot() {
        let (mut session, dir) = session("poi");
        let mut r = rng(5);
        let store = TableStore::new(dir.path());

        assert!(store.raw(crate::domains::poi::STORAGE_KEY).is_none());
        let reply = session.handle_line("save", &mut r);
        assert!(reply.text.contains("saved"), "{}", reply.text);
        assert!(store.raw(crate::domains::poi::STORAGE_KEY).is_some());

        let reply = session.handle_line("reset", &mut r);
        assert!(reply.text.contains("reset"));
        assert!(store.raw(crate::domains::poi::STORAGE_KEY).is_none());
    }
}
