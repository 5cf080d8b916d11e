// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Waymark Notify: subscriber registries shared by every Waymark store.
//!
//! Each store in the tracker follows the same observation contract: a consumer
//! subscribes to a key, the store fires the listener after a mutation to that
//! key completes, and the consumer re-pulls the latest snapshot through a
//! getter. Notifications carry no payload.
//!
//! This crate provides the two registry shapes that contract needs:
//!
//! - [`KeyedSubscribers`]: one listener bucket per key (check names, section
//!   names, entrance names). Unsubscribing the last listener for a key frees
//!   the bucket.
//! - [`Subscribers`]: a keyless registry for stores whose consumers observe
//!   the store as a whole (the inventory).
//!
//! Subscriptions are identified by a [`SubscriptionId`] handle rather than a
//! returned closure, so tearing a subscription down is an explicit, idempotent
//! operation: calling [`KeyedSubscribers::unsubscribe`] twice with the same id
//! is safe and returns `false` the second time.
//!
//! ## Example
//!
//! ```rust
//! use waymark_notify::KeyedSubscribers;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let mut subs = KeyedSubscribers::<&'static str>::new();
//! let hits = Rc::new(Cell::new(0));
//!
//! let hits2 = Rc::clone(&hits);
//! let id = subs.subscribe("L2", move || hits2.set(hits2.get() + 1));
//!
//! subs.notify(&"L2");
//! subs.notify(&"L3"); // different key, listener does not fire
//! assert_eq!(hits.get(), 1);
//!
//! assert!(subs.unsubscribe(id));
//! assert!(!subs.unsubscribe(id)); // idempotent
//! ```
//!
//! ## Re-entrancy
//!
//! Listeners run synchronously on the notifying thread. A listener must not
//! call back into the registry that is notifying it; typical consumers set a
//! flag or queue a redraw and re-pull state afterwards.
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It does not depend on `std`.

#![no_std]

extern crate alloc;

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;
use core::hash::Hash;

use hashbrown::HashMap;

/// A boxed notification callback.
///
/// Listeners take no arguments; consumers re-fetch the snapshot they care
/// about from the owning store.
pub type Listener = Box<dyn FnMut()>;

/// Handle identifying one subscription.
///
/// Ids are monotonically assigned per registry and never reused, so a stale
/// handle can never detach somebody else's listener.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[repr(transparent)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Returns the raw numeric id.
    #[inline]
    #[must_use]
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubscriptionId({})", self.0)
    }
}

/// Per-key listener buckets.
///
/// Many listeners may observe one key. Buckets are created on first subscribe
/// and freed when their last listener unsubscribes, so a long-lived registry
/// only holds state for keys somebody is actually watching.
///
/// # Type Parameters
///
/// - `K`: The key type, typically an owned name (`String`) or a compact id.
pub struct KeyedSubscribers<K>
where
    K: Eq + Hash + Clone,
{
    buckets: HashMap<K, Vec<(SubscriptionId, Listener)>>,
    /// Reverse index so unsubscribe does not need the key.
    keys: HashMap<SubscriptionId, K>,
    next: u64,
}

impl<K> Default for KeyedSubscribers<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> fmt::Debug for KeyedSubscribers<K>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedSubscribers")
            .field("keys", &self.buckets.keys())
            .field("len", &self.keys.len())
            .finish()
    }
}

impl<K> KeyedSubscribers<K>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buckets: HashMap::new(),
            keys: HashMap::new(),
            next: 0,
        }
    }

    /// Registers `listener` for `key` and returns its subscription handle.
    pub fn subscribe(&mut self, key: K, listener: impl FnMut() + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next);
        self.next += 1;
        self.keys.insert(id, key.clone());
        self.buckets
            .entry(key)
            .or_default()
            .push((id, Box::new(listener)));
        id
    }

    /// Removes the subscription identified by `id`.
    ///
    /// Returns `true` if the subscription existed. Calling this twice with the
    /// same handle is safe; the second call returns `false`.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let Some(key) = self.keys.remove(&id) else {
            return false;
        };
        if let Some(bucket) = self.buckets.get_mut(&key) {
            if let Some(pos) = bucket.iter().position(|(entry_id, _)| *entry_id == id) {
                bucket.swap_remove(pos);
            }
            if bucket.is_empty() {
                self.buckets.remove(&key);
            }
        }
        true
    }

    /// Fires every listener registered for `key`.
    ///
    /// Listeners run synchronously, in no specified order.
    pub fn notify(&mut self, key: &K) {
        if let Some(bucket) = self.buckets.get_mut(key) {
            for (_, listener) in bucket.iter_mut() {
                listener();
            }
        }
    }

    /// Fires listeners for each key in `keys`.
    pub fn notify_many<'a>(&mut self, keys: impl IntoIterator<Item = &'a K>)
    where
        K: 'a,
    {
        for key in keys {
            self.notify(key);
        }
    }

    /// Returns the number of listeners registered for `key`.
    #[must_use]
    pub fn listener_count(&self, key: &K) -> usize {
        self.buckets.get(key).map_or(0, Vec::len)
    }

    /// Returns the total number of live subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` if no listeners are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Drops every subscription.
    pub fn clear(&mut self) {
        self.buckets.clear();
        self.keys.clear();
    }
}

/// Keyless listener registry.
///
/// Used by stores whose consumers observe the whole store rather than a single
/// entry, e.g. the inventory.
pub struct Subscribers {
    entries: Vec<(SubscriptionId, Listener)>,
    next: u64,
}

impl Default for Subscribers {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers")
            .field("len", &self.entries.len())
            .finish()
    }
}

impl Subscribers {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next: 0,
        }
    }

    /// Registers `listener` and returns its subscription handle.
    pub fn subscribe(&mut self, listener: impl FnMut() + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next);
        self.next += 1;
        self.entries.push((id, Box::new(listener)));
        id
    }

    /// Removes the subscription identified by `id`.
    ///
    /// Idempotent; returns `true` only if the subscription existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        if let Some(pos) = self.entries.iter().position(|(entry_id, _)| *entry_id == id) {
            self.entries.swap_remove(pos);
            true
        } else {
            false
        }
    }

    /// Fires every listener.
    pub fn notify(&mut self) {
        for (_, listener) in &mut self.entries {
            listener();
        }
    }

    /// Returns the number of live subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no listeners are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every subscription.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counter() -> (Rc<Cell<u32>>, impl FnMut()) {
        let hits = Rc::new(Cell::new(0));
        let inner = Rc::clone(&hits);
        (hits, move || inner.set(inner.get() + 1))
    }

    #[test]
    fn notify_fires_only_matching_key() {
        let mut subs = KeyedSubscribers::<&'static str>::new();
        let (hits, listener) = counter();
        subs.subscribe("a", listener);

        subs.notify(&"b");
        assert_eq!(hits.get(), 0);

        subs.notify(&"a");
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn many_listeners_per_key() {
        let mut subs = KeyedSubscribers::<&'static str>::new();
        let (first, listener_a) = counter();
        let (second, listener_b) = counter();
        subs.subscribe("a", listener_a);
        subs.subscribe("a", listener_b);

        subs.notify(&"a");
        assert_eq!(first.get(), 1);
        assert_eq!(second.get(), 1);
        assert_eq!(subs.listener_count(&"a"), 2);
    }

    #[test]
    fn unsubscribe_is_idempotent() {
        let mut subs = KeyedSubscribers::<&'static str>::new();
        let (hits, listener) = counter();
        let id = subs.subscribe("a", listener);

        assert!(subs.unsubscribe(id));
        assert!(!subs.unsubscribe(id));

        subs.notify(&"a");
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn last_unsubscribe_frees_bucket() {
        let mut subs = KeyedSubscribers::<&'static str>::new();
        let (_, listener_a) = counter();
        let (_, listener_b) = counter();
        let a = subs.subscribe("a", listener_a);
        let b = subs.subscribe("a", listener_b);

        subs.unsubscribe(a);
        assert_eq!(subs.listener_count(&"a"), 1);

        subs.unsubscribe(b);
        assert_eq!(subs.listener_count(&"a"), 0);
        assert!(subs.is_empty());
    }

    #[test]
    fn ids_are_not_reused() {
        let mut subs = KeyedSubscribers::<&'static str>::new();
        let (_, listener_a) = counter();
        let (hits, listener_b) = counter();
        let a = subs.subscribe("a", listener_a);
        subs.unsubscribe(a);

        let b = subs.subscribe("a", listener_b);
        assert_ne!(a, b);

        // The stale handle must not detach the new listener.
        assert!(!subs.unsubscribe(a));
        subs.notify(&"a");
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn notify_many() {
        let mut subs = KeyedSubscribers::<&'static str>::new();
        let (hits_a, listener_a) = counter();
        let (hits_b, listener_b) = counter();
        subs.subscribe("a", listener_a);
        subs.subscribe("b", listener_b);

        subs.notify_many([&"a", &"b", &"a"]);
        assert_eq!(hits_a.get(), 2);
        assert_eq!(hits_b.get(), 1);
    }

    #[test]
    fn keyless_registry() {
        let mut subs = Subscribers::new();
        let (hits, listener) = counter();
        let id = subs.subscribe(listener);

        subs.notify();
        subs.notify();
        assert_eq!(hits.get(), 2);

        assert!(subs.unsubscribe(id));
        assert!(!subs.unsubscribe(id));
        subs.notify();
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn clear_drops_everything() {
        let mut subs = KeyedSubscribers::<&'static str>::new();
        let (hits, listener) = counter();
        subs.subscribe("a", listener);

        subs.clear();
        subs.notify(&"a");
        assert_eq!(hits.get(), 0);
        assert!(subs.is_empty());
    }
}
