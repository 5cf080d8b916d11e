// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Waymark Entrances: where does this entrance currently lead?
//!
//! In entrance-randomized games the destination behind an entrance is unknown
//! until the player walks through it. The [`EntranceResolver`] records the
//! destinations discovered so far (entrance name → destination region) and
//! notifies per-entrance listeners when a resolution changes, so portal nodes
//! in the section tree can re-bind their check sets.
//!
//! An entrance is *adoptable* once its destination region is known — only then
//! can a portal section adopt the destination group's checks.
//!
//! ```rust
//! use waymark_entrances::EntranceResolver;
//!
//! let mut entrances = EntranceResolver::new();
//! assert!(!entrances.is_adoptable("Forest Exit"));
//!
//! entrances.set_destination("Forest Exit", Some("Hyrule Field".into()));
//! assert!(entrances.is_adoptable("Forest Exit"));
//! assert_eq!(entrances.destination("Forest Exit"), Some("Hyrule Field"));
//! ```
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It does not depend on `std`.

#![no_std]

extern crate alloc;

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use hashbrown::HashMap;
use waymark_notify::{KeyedSubscribers, SubscriptionId};

/// Tracks discovered entrance destinations.
#[derive(Debug, Default)]
pub struct EntranceResolver {
    destinations: HashMap<String, String>,
    subscribers: KeyedSubscribers<String>,
}

impl EntranceResolver {
    /// Creates a resolver with no known destinations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records (or clears) the destination region for `entrance`.
    ///
    /// Listeners for `entrance` fire only when the resolution actually
    /// changed. Returns `true` on change.
    pub fn set_destination(&mut self, entrance: &str, region: Option<String>) -> bool {
        let changed = match &region {
            Some(region) => self.destinations.get(entrance) != Some(region),
            None => self.destinations.contains_key(entrance),
        };
        if !changed {
            return false;
        }
        match region {
            Some(region) => {
                self.destinations.insert(entrance.to_string(), region);
            }
            None => {
                self.destinations.remove(entrance);
            }
        }
        self.subscribers.notify(&entrance.to_string());
        true
    }

    /// Returns the destination region discovered for `entrance`, if any.
    #[must_use]
    pub fn destination(&self, entrance: &str) -> Option<&str> {
        self.destinations.get(entrance).map(String::as_str)
    }

    /// Returns `true` once `entrance` has a known destination.
    #[must_use]
    pub fn is_adoptable(&self, entrance: &str) -> bool {
        self.destinations.contains_key(entrance)
    }

    /// Registers a listener for one entrance.
    pub fn subscribe(
        &mut self,
        entrance: &str,
        listener: impl FnMut() + 'static,
    ) -> SubscriptionId {
        self.subscribers.subscribe(entrance.to_string(), listener)
    }

    /// Removes a subscription. Idempotent.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    /// Forgets every discovered destination.
    ///
    /// Listeners for each previously resolved entrance fire once.
    pub fn reset(&mut self) {
        let entrances: Vec<String> = self.destinations.keys().cloned().collect();
        self.destinations.clear();
        self.subscribers.notify_many(entrances.iter());
    }
}
