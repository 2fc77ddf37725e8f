//! Per-field lock state with first-class link-groups.
//!
//! Locking a field keeps its value through a bulk "reroll unlocked" pass.
//! Some fields only make sense together (an author's name, quirk, and hook
//! come from one underlying pick), so those fields share a single lock key
//! declared in the domain's static link-group table. Toggling any member
//! toggles the group.
//!
//! Lock state lives in memory only; it is reset when a category selector
//! changes (a locked value may be nonsense under the new category) and is
//! never persisted.

use std::collections::HashSet;

/// A set of fields generated and locked as one unit. `leader` is the shared
/// lock key and must itself appear in `members`.
#[derive(Debug, Clone, Copy)]
pub struct LinkGroup {
    pub leader: &'static str,
    pub members: &'static [&'static str],
}

impl LinkGroup {
    pub fn contains(&self, field: &str) -> bool {
        self.members.iter().any(|m| *m == field)
    }
}

/// Session-scoped registry of locked fields for one generator domain.
#[derive(Debug, Default)]
pub struct LockRegistry {
    locked: HashSet<&'static str>,
    groups: &'static [LinkGroup],
}

impl LockRegistry {
    pub fn new(groups: &'static [LinkGroup]) -> Self {
        LockRegistry {
            locked: HashSet::new(),
            groups,
        }
    }

    /// Resolve a field to its lock key: the group leader when the field
    /// belongs to a link-group, otherwise the field itself.
    pub fn canonical(&self, field: &str) -> Option<&'static str> {
        for group in self.groups {
            if group.contains(field) {
                return Some(group.leader);
            }
        }
        // Fields outside any group lock under their own name; intern via the
        // group table is impossible, so the caller supplies static names.
        None
    }

    fn key_for(&self, field: &'static str) -> &'static str {
        self.canonical(field).unwrap_or(field)
    }

    /// Flip the lock for a field (or its whole group). Returns the new state.
    pub fn toggle(&mut self, field: &'static str) -> bool {
        let key = self.key_for(field);
        if self.locked.remove(key) {
            false
        } else {
            self.locked.insert(key);
            true
        }
    }

    pub fn is_locked(&self, field: &'static str) -> bool {
        self.locked.contains(self.key_for(field))
    }

    /// Force-unlock the given fields (resolving groups), used when a
    /// category/theme/tier selector changes.
    pub fn release(&mut self, fields: &[&'static str]) {
        for &field in fields {
            let key = self.key_for(field);
            self.locked.remove(key);
        }
    }

    /// Drop every lock.
    pub fn clear(&mut self) {
        self.locked.clear();
    }

    /// Currently locked lock keys (group leaders count once).
    pub fn locked_keys(&self) -> Vec<&'static str> {
        let mut keys: Vec<_> = self.locked.iter().copied().collect();
        keys.sort_unstable();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GROUPS: &[LinkGroup] = &[LinkGroup {
        leader: "author",
        members: &["author", "author_quirk", "hook"],
    }];

    #[test]
    fn toggle_twice_is_identity() {
        let mut locks = LockRegistry::new(&[]);
        assert!(!locks.is_locked("title"));
        assert!(locks.toggle("title"));
        assert!(locks.is_locked("title"));
        assert!(!locks.toggle("title"));
        assert!(!locks.is_locked("title"));
    }

    #[test]
    fn group_members_lock_in_unison() {
        let mut locks = LockRegistry::new(GROUPS);
        locks.toggle("hook");
        for field in ["author", "author_quirk", "hook"] {
            assert!(locks.is_locked(field), "{field} should be locked");
        }
        locks.toggle("author_quirk");
        for field in ["author", "author_quirk", "hook"] {
            assert!(!locks.is_locked(field), "{field} should be unlocked");
        }
    }

    #[test]
    fn group_holds_single_key() {
        let mut locks = LockRegistry::new(GROUPS);
        locks.toggle("author");
        locks.toggle("title");
        assert_eq!(locks.locked_keys(), vec!["author", "title"]);
    }

    #[test]
    fn release_unlocks_via_any_member() {
        let mut locks = LockRegistry::new(GROUPS);
        locks.toggle("author");
        locks.toggle("title");
        locks.release(&["hook"]);
        assert!(!locks.is_locked("author"));
        assert!(locks.is_locked("title"));
    }
}
