// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The check status store.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use hashbrown::HashMap;
use waymark_notify::{KeyedSubscribers, SubscriptionId};

use crate::status::{CheckStatus, CheckUpdate, TagInstance};

/// Authoritative mapping from check name to [`CheckStatus`].
///
/// Writes are synchronous and total: by the time a mutating call returns,
/// every listener registered for the touched name has already fired. Reads of
/// unknown names return a shared default status (`exists = false`) and never
/// fail.
///
/// # Example
///
/// ```rust
/// use waymark_checks::{CheckStore, CheckUpdate};
///
/// let mut checks = CheckStore::new();
/// checks.update_status("L2", CheckUpdate::new().exists(true).checked(true));
///
/// let found = checks.matching(|_, status| status.checked);
/// assert_eq!(found, vec!["L2".to_string()]);
/// ```
#[derive(Debug)]
pub struct CheckStore {
    statuses: HashMap<String, CheckStatus>,
    subscribers: KeyedSubscribers<String>,
    /// Returned by reference for names that were never written.
    default_status: CheckStatus,
    generation: u64,
}

impl Default for CheckStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            statuses: HashMap::new(),
            subscribers: KeyedSubscribers::new(),
            default_status: CheckStatus::default(),
            generation: 0,
        }
    }

    /// Returns the store-wide generation, incremented on every mutation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Merges `update` into the status stored for `name`.
    ///
    /// The entry is created with defaults if it did not exist. Listeners for
    /// `name` fire after the merge completes, whether or not a field changed;
    /// the status version is only bumped on an actual change. Returns `true`
    /// if a field changed.
    pub fn update_status(&mut self, name: &str, update: CheckUpdate) -> bool {
        let status = self.statuses.entry_ref(name).or_default();
        let changed = update.apply(status);
        if changed {
            status.bump();
            self.generation = self.generation.wrapping_add(1);
        }
        self.notify(name);
        changed
    }

    /// Returns the current status for `name`.
    ///
    /// Names that were never written resolve to a shared default with
    /// `exists = false`; repeated calls for such a name return the same
    /// object, so cached snapshots stay comparable by version.
    #[must_use]
    pub fn get_status(&self, name: &str) -> &CheckStatus {
        self.statuses.get(name).unwrap_or(&self.default_status)
    }

    /// Returns the names of all checks for which `predicate` holds.
    ///
    /// Linear scan over every stored status. The result order is unspecified.
    pub fn matching(&self, predicate: impl Fn(&str, &CheckStatus) -> bool) -> Vec<String> {
        self.statuses
            .iter()
            .filter(|(name, status)| predicate(name, status))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Returns an iterator over all stored check names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.statuses.keys().map(String::as_str)
    }

    /// Returns the number of stored statuses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    /// Returns `true` if no status has ever been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    /// Clears every stored status.
    ///
    /// Used when a fresh session begins. Listeners for every previously
    /// stored name fire once so consumers re-pull the (now default) status.
    pub fn reset(&mut self) {
        let names: Vec<String> = self.statuses.keys().cloned().collect();
        self.statuses.clear();
        self.generation = self.generation.wrapping_add(1);
        self.subscribers.notify_many(names.iter());
    }

    /// Registers a listener for one check name.
    pub fn subscribe(&mut self, name: &str, listener: impl FnMut() + 'static) -> SubscriptionId {
        self.subscribers.subscribe(name.to_string(), listener)
    }

    /// Removes a subscription. Idempotent.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    /// Returns the number of listeners registered for `name`.
    #[must_use]
    pub fn listener_count(&self, name: &str) -> usize {
        self.subscribers.listener_count(&name.to_string())
    }

    /// Attaches `tag` to its check.
    ///
    /// No-op if a tag with the same `tag_id` is already attached (listeners do
    /// not fire in that case). Returns `true` if the tag was newly added.
    ///
    /// This is plumbing for the tag store; UI code goes through the tag store
    /// so catalog bookkeeping stays consistent.
    pub fn add_tag_instance(&mut self, tag: TagInstance) -> bool {
        let name = tag.check_name.clone();
        let status = self.statuses.entry(name.clone()).or_default();
        if status.has_tag(&tag.tag_id) {
            return false;
        }
        status.tags.push(tag);
        status.bump();
        self.generation = self.generation.wrapping_add(1);
        self.notify(&name);
        true
    }

    /// Detaches the tag with `tag_id` from `check_name`.
    ///
    /// No-op if no such tag is attached. Returns `true` if a tag was removed.
    pub fn remove_tag_instance(&mut self, check_name: &str, tag_id: &str) -> bool {
        let Some(status) = self.statuses.get_mut(check_name) else {
            return false;
        };
        let Some(pos) = status.tags.iter().position(|tag| tag.tag_id == tag_id) else {
            return false;
        };
        status.tags.remove(pos);
        status.bump();
        self.generation = self.generation.wrapping_add(1);
        self.notify(check_name);
        true
    }

    fn notify(&mut self, name: &str) {
        self.subscribers.notify(&name.to_string());
    }
}
