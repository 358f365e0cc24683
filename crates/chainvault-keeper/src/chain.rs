// SPDX-FileCopyrightText: 2026 Chainvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hints and password keys of the open vault.

use std::sync::MutexGuard;

use chainvault_crypto::SecureBuffer;
use chainvault_store::UnsavedState;

/// Parallel lists of hints and the keys that answer them.
///
/// While unlocking, `keys[0]` is the header pre-key and `hints[i]` was
/// revealed by `keys[i]`. Once the vault is unlocked the pre-key is swapped
/// out, so `keys[i]` becomes the password key for `hints[i]`. During lock
/// setup a slot may be unassigned.
#[derive(Debug, Default)]
pub struct KeyChain {
    hints: Vec<String>,
    keys: Vec<Option<SecureBuffer>>,
}

impl KeyChain {
    pub fn hint_count(&self) -> usize {
        self.hints.len()
    }

    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    pub fn hint(&self, index: usize) -> Option<&str> {
        self.hints.get(index).map(String::as_str)
    }

    pub fn last_hint(&self) -> Option<&str> {
        self.hints.last().map(String::as_str)
    }

    pub fn hints(&self) -> impl Iterator<Item = &str> {
        self.hints.iter().map(String::as_str)
    }

    pub fn is_key_assigned(&self, index: usize) -> bool {
        matches!(self.keys.get(index), Some(Some(_)))
    }

    pub(crate) fn clear(&mut self) {
        self.hints.clear();
        self.keys.clear();
    }

    pub(crate) fn add_hint(&mut self, hint: &str) {
        self.hints.push(hint.to_string());
        self.keys.resize_with(self.hints.len(), || None);
    }

    pub(crate) fn remove_hint(&mut self, index: usize) -> bool {
        if index >= self.hints.len() {
            return false;
        }
        self.hints.remove(index);
        if index < self.keys.len() {
            self.keys.remove(index);
        }
        true
    }

    pub(crate) fn change_hint(&mut self, index: usize, hint: &str) -> bool {
        match self.hints.get_mut(index) {
            Some(slot) => {
                *slot = hint.to_string();
                true
            }
            None => false,
        }
    }

    /// Record a hint revealed while unlocking, together with the key that
    /// revealed it.
    pub(crate) fn push_unlocked(&mut self, hint: String, key: SecureBuffer) {
        self.hints.push(hint);
        self.keys.push(Some(key));
    }

    /// Replace the pre-key in front of the chain with the final password key.
    pub(crate) fn shift_in(&mut self, key: SecureBuffer) {
        if !self.keys.is_empty() {
            self.keys.remove(0);
        }
        self.keys.push(Some(key));
    }

    pub(crate) fn set_key(&mut self, index: usize, key: SecureBuffer) -> bool {
        match self.keys.get_mut(index) {
            Some(slot) => {
                *slot = Some(key);
                true
            }
            None => false,
        }
    }

    pub(crate) fn clear_keys(&mut self) {
        for slot in &mut self.keys {
            *slot = None;
        }
    }

    /// Every key in order, or `None` if any slot is unassigned.
    pub(crate) fn assigned_keys(&self) -> Option<Vec<&SecureBuffer>> {
        self.keys.iter().map(Option::as_ref).collect()
    }
}

/// Exclusive access to the hint list for the lock-setup view.
///
/// Holding the guard blocks the keeper worker from touching the chain;
/// dropping it releases the lock.
pub struct HintsGuard<'a> {
    chain: MutexGuard<'a, KeyChain>,
    unsaved: &'a UnsavedState,
}

impl<'a> HintsGuard<'a> {
    pub(crate) fn new(chain: MutexGuard<'a, KeyChain>, unsaved: &'a UnsavedState) -> Self {
        Self { chain, unsaved }
    }

    pub fn count(&self) -> usize {
        self.chain.hint_count()
    }

    pub fn hint(&self, index: usize) -> Option<&str> {
        self.chain.hint(index)
    }

    pub fn is_key_assigned(&self, index: usize) -> bool {
        self.chain.is_key_assigned(index)
    }

    /// Append a hint with an unassigned key slot.
    pub fn add_hint(&mut self, hint: &str) {
        self.chain.add_hint(hint);
        self.unsaved.notify_change();
    }

    /// Remove hint `index` and its key. Returns `false` if out of range.
    pub fn remove_hint(&mut self, index: usize) -> bool {
        let removed = self.chain.remove_hint(index);
        if removed {
            self.unsaved.notify_change();
        }
        removed
    }

    /// Replace the text of hint `index`. Returns `false` if out of range.
    pub fn change_hint(&mut self, index: usize, hint: &str) -> bool {
        let changed = self.chain.change_hint(index, hint);
        if changed {
            self.unsaved.notify_change();
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    fn key(byte: u8) -> SecureBuffer {
        SecureBuffer::from_slice(&[byte; 4]).unwrap()
    }

    #[test]
    fn added_hints_start_unassigned() {
        let mut chain = KeyChain::default();
        chain.add_hint("pet");
        chain.add_hint("city");
        assert_eq!(chain.key_count(), 2);
        assert!(!chain.is_key_assigned(0));
        assert!(chain.assigned_keys().is_none());

        assert!(chain.set_key(0, key(1)));
        assert!(chain.set_key(1, key(2)));
        assert!(!chain.set_key(2, key(3)));
        let keys = chain.assigned_keys().unwrap();
        assert_eq!(&keys[1][..], &[2; 4]);
    }

    #[test]
    fn shift_in_drops_the_pre_key() {
        let mut chain = KeyChain::default();
        chain.push_unlocked("pet".to_string(), key(0));
        chain.push_unlocked("city".to_string(), key(1));
        chain.shift_in(key(2));

        assert_eq!(chain.hint_count(), 2);
        let keys = chain.assigned_keys().unwrap();
        assert_eq!(&keys[0][..], &[1; 4]);
        assert_eq!(&keys[1][..], &[2; 4]);
        assert_eq!(chain.last_hint(), Some("city"));
    }

    #[test]
    fn remove_and_change_check_bounds() {
        let mut chain = KeyChain::default();
        chain.add_hint("a");
        chain.add_hint("b");
        assert!(chain.change_hint(1, "c"));
        assert!(!chain.change_hint(2, "d"));
        assert!(chain.remove_hint(0));
        assert!(!chain.remove_hint(5));
        assert_eq!(chain.hints().collect::<Vec<_>>(), ["c"]);
        assert_eq!(chain.key_count(), 1);
    }

    #[test]
    fn clear_keys_keeps_hints() {
        let mut chain = KeyChain::default();
        chain.add_hint("a");
        chain.set_key(0, key(9));
        chain.clear_keys();
        assert_eq!(chain.hint_count(), 1);
        assert!(!chain.is_key_assigned(0));
    }

    #[test]
    fn guard_mutations_mark_unsaved() {
        let chain = Mutex::new(KeyChain::default());
        let unsaved = UnsavedState::new();
        {
            let mut guard = HintsGuard::new(chain.lock().unwrap(), &unsaved);
            assert!(!guard.remove_hint(0));
            assert!(!unsaved.has_changed());
            guard.add_hint("pet");
            assert_eq!(guard.count(), 1);
            assert_eq!(guard.hint(0), Some("pet"));
        }
        assert!(unsaved.has_changed());
        assert!(chain.try_lock().is_ok());
    }
}
