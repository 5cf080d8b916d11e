// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Waymark Inventory: received items aggregated into named collections.
//!
//! A collection accepts a set of item names, optionally with per-item weighted
//! values (a heart piece may be worth 0.25 of a heart). [`Inventory::add_items`]
//! matches each incoming item against every collection — an item may belong to
//! several, and an item no collection accepts auto-creates a singleton
//! collection named after it, so nothing received is ever silently dropped.
//!
//! Reads are lazy: mutations only invalidate the cached view, and
//! [`Inventory::items`] recomputes it on the next call. Consumers observe the
//! store as a whole through a keyless subscription and re-pull after a
//! notification.
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It does not depend on `std`.

#![no_std]

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashMap;
use serde::Deserialize;
use waymark_notify::{Subscribers, SubscriptionId};

/// The only item-collection definition version this crate reads.
pub const SUPPORTED_VERSION: u32 = 1;

fn default_version() -> u32 {
    SUPPORTED_VERSION
}

/// How a collection's fractional value is shown.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundingMode {
    /// Round up to the next whole value.
    Up,
    /// Round down.
    Down,
    /// Round to the nearest whole value, halves up.
    Nearest,
    /// Show the exact value.
    #[default]
    None,
}

impl RoundingMode {
    /// Applies the mode to a collection value.
    ///
    /// Collection values are non-negative, so integer truncation is floor.
    #[must_use]
    pub fn apply(self, value: f64) -> f64 {
        let floor = value as u64 as f64;
        match self {
            Self::None => value,
            Self::Down => floor,
            Self::Up => {
                if value > floor {
                    floor + 1.0
                } else {
                    floor
                }
            }
            Self::Nearest => {
                if value - floor >= 0.5 {
                    floor + 1.0
                } else {
                    floor
                }
            }
        }
    }
}

/// Collection definitions as supplied by the configuration loader.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryData {
    /// Schema version; loads with an unsupported version are rejected whole.
    #[serde(default = "default_version")]
    pub version: u32,
    /// Collection definitions by name.
    #[serde(default)]
    pub collections: BTreeMap<String, CollectionDef>,
}

/// One collection definition.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionDef {
    /// Accepted items.
    #[serde(default)]
    pub items: ItemSet,
    /// How the value is shown.
    #[serde(default)]
    pub rounding: RoundingMode,
    /// Starting value before any item arrives.
    #[serde(default)]
    pub initial_value: f64,
    /// Target shown as `value/total` when present.
    #[serde(default)]
    pub total_value: Option<f64>,
    /// Render the collection even while its value is untouched.
    #[serde(default)]
    pub show_always: bool,
    /// Display icon.
    #[serde(default)]
    pub icon: Option<String>,
}

/// A collection's accepted items: a plain name list (each worth 1) or a
/// name → weight map.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ItemSet {
    /// Each listed item is worth 1.
    Names(Vec<String>),
    /// Per-item weighted values.
    Weighted(BTreeMap<String, f64>),
}

impl Default for ItemSet {
    fn default() -> Self {
        Self::Names(Vec::new())
    }
}

impl ItemSet {
    fn weights(&self) -> HashMap<String, f64> {
        match self {
            Self::Names(names) => names.iter().map(|name| (name.clone(), 1.0)).collect(),
            Self::Weighted(map) => map.iter().map(|(name, w)| (name.clone(), *w)).collect(),
        }
    }
}

/// Classification flags carried by a received item.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ItemFlags {
    /// The item unlocks further progress.
    pub progression: bool,
    /// The item is useful but not required.
    pub useful: bool,
    /// The item is a trap.
    pub trap: bool,
    /// The item was granted by the server rather than found.
    pub from_server: bool,
}

/// One received item.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Item {
    /// The item's name, matched against collection definitions.
    pub name: String,
    /// Classification flags.
    pub flags: ItemFlags,
}

impl Item {
    /// Creates an item with default flags.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            flags: ItemFlags::default(),
        }
    }

    /// Sets the flags.
    #[must_use]
    pub fn with_flags(mut self, flags: ItemFlags) -> Self {
        self.flags = flags;
        self
    }
}

/// One live collection.
#[derive(Clone, Debug)]
pub struct Collection {
    name: String,
    accepted: HashMap<String, f64>,
    rounding: RoundingMode,
    initial_value: f64,
    total_value: Option<f64>,
    show_always: bool,
    icon: Option<String>,
    /// Auto-created singleton for an item no configured collection accepted.
    auto: bool,
    value: f64,
    received: Vec<Item>,
}

impl Collection {
    fn from_def(name: String, def: &CollectionDef) -> Self {
        Self {
            name,
            accepted: def.items.weights(),
            rounding: def.rounding,
            initial_value: def.initial_value,
            total_value: def.total_value,
            show_always: def.show_always,
            icon: def.icon.clone(),
            auto: false,
            value: def.initial_value,
            received: Vec::new(),
        }
    }

    fn singleton(item_name: &str) -> Self {
        Self {
            name: item_name.to_string(),
            accepted: [(item_name.to_string(), 1.0)].into_iter().collect(),
            rounding: RoundingMode::None,
            initial_value: 0.0,
            total_value: None,
            show_always: false,
            icon: None,
            auto: true,
            value: 0.0,
            received: Vec::new(),
        }
    }

    /// The collection's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The exact accumulated value.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }

    /// The value with the collection's rounding mode applied.
    #[must_use]
    pub fn display_value(&self) -> f64 {
        self.rounding.apply(self.value)
    }

    /// The `value/total` target, when the definition declares one.
    #[must_use]
    pub fn total_value(&self) -> Option<f64> {
        self.total_value
    }

    /// `true` if the collection renders even while untouched.
    #[must_use]
    pub fn show_always(&self) -> bool {
        self.show_always
    }

    /// Display icon.
    #[must_use]
    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    /// `true` for a singleton auto-created from an unmatched item.
    #[must_use]
    pub fn is_auto(&self) -> bool {
        self.auto
    }

    /// Every item folded into this collection so far, in arrival order.
    #[must_use]
    pub fn received(&self) -> &[Item] {
        &self.received
    }

    /// Received items carrying the progression flag.
    #[must_use]
    pub fn progression_count(&self) -> usize {
        self.received.iter().filter(|item| item.flags.progression).count()
    }
}

/// Renderable summary of one collection.
#[derive(Clone, Debug, PartialEq)]
pub struct CollectionView {
    /// The collection's name.
    pub name: String,
    /// Display icon.
    pub icon: Option<String>,
    /// The value with rounding applied.
    pub value: f64,
    /// The `value/total` target, if any.
    pub total: Option<f64>,
}

/// The inventory store.
#[derive(Debug, Default)]
pub struct Inventory {
    collections: BTreeMap<String, Collection>,
    /// Item name → names of collections accepting it.
    by_item: HashMap<String, Vec<String>>,
    /// Invalidated by every mutation, rebuilt on the next read.
    cache: Option<Vec<CollectionView>>,
    subscribers: Subscribers,
}

impl Inventory {
    /// Creates an empty inventory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every collection definition wholesale.
    ///
    /// Fails on an unsupported version without touching live state. On
    /// success all accumulated values restart from their initial values and
    /// auto-created singletons are dropped.
    pub fn load_collections(&mut self, data: InventoryData) -> Result<(), InventoryError> {
        if data.version != SUPPORTED_VERSION {
            return Err(InventoryError::UnsupportedVersion {
                found: data.version,
            });
        }
        self.collections = data
            .collections
            .iter()
            .map(|(name, def)| (name.clone(), Collection::from_def(name.clone(), def)))
            .collect();
        self.by_item.clear();
        for collection in self.collections.values() {
            for item in collection.accepted.keys() {
                self.by_item
                    .entry(item.clone())
                    .or_default()
                    .push(collection.name.clone());
            }
        }
        self.cache = None;
        self.subscribers.notify();
        Ok(())
    }

    /// Folds one received item into every collection that accepts it.
    pub fn add_item(&mut self, item: Item) {
        self.add_items([item]);
    }

    /// Folds a batch of received items in, notifying listeners once.
    pub fn add_items(&mut self, items: impl IntoIterator<Item = Item>) {
        let mut touched = false;
        for item in items {
            touched = true;
            if !self.by_item.contains_key(&item.name) {
                let singleton = Collection::singleton(&item.name);
                self.by_item
                    .insert(item.name.clone(), [singleton.name.clone()].into());
                self.collections.insert(singleton.name.clone(), singleton);
            }
            let Some(names) = self.by_item.get(&item.name) else {
                continue;
            };
            for name in names.clone() {
                if let Some(collection) = self.collections.get_mut(&name) {
                    let weight = collection.accepted.get(&item.name).copied().unwrap_or(0.0);
                    collection.value += weight;
                    collection.received.push(item.clone());
                }
            }
        }
        if touched {
            self.cache = None;
            self.subscribers.notify();
        }
    }

    /// Returns the renderable collections, sorted by name.
    ///
    /// Collections appear once they have received an item or when their
    /// definition sets `show_always`. The view is cached between mutations.
    pub fn items(&mut self) -> &[CollectionView] {
        if self.cache.is_none() {
            let views = self
                .collections
                .values()
                .filter(|collection| collection.show_always || !collection.received.is_empty())
                .map(|collection| CollectionView {
                    name: collection.name.clone(),
                    icon: collection.icon.clone(),
                    value: collection.display_value(),
                    total: collection.total_value,
                })
                .collect();
            self.cache = Some(views);
        }
        self.cache.as_deref().unwrap_or_default()
    }

    /// Looks up one live collection.
    #[must_use]
    pub fn collection(&self, name: &str) -> Option<&Collection> {
        self.collections.get(name)
    }

    /// Clears every received item.
    ///
    /// Values restart from their initial values, auto-created singletons are
    /// dropped, and listeners fire once.
    pub fn reset(&mut self) {
        self.collections.retain(|_, collection| !collection.auto);
        self.by_item
            .retain(|_, names| {
                names.retain(|name| self.collections.contains_key(name));
                !names.is_empty()
            });
        for collection in self.collections.values_mut() {
            collection.value = collection.initial_value;
            collection.received.clear();
        }
        self.cache = None;
        self.subscribers.notify();
    }

    /// Registers a whole-store listener.
    pub fn subscribe(&mut self, listener: impl FnMut() + 'static) -> SubscriptionId {
        self.subscribers.subscribe(listener)
    }

    /// Removes a subscription. Idempotent.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }
}

/// Fatal problem with a collection-definition load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InventoryError {
    /// The data declares a version this crate does not read.
    UnsupportedVersion {
        /// The declared version.
        found: u32,
    },
}

impl fmt::Display for InventoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedVersion { found } => write!(
                f,
                "unsupported item collection version {found} (expected {SUPPORTED_VERSION})"
            ),
        }
    }
}

impl core::error::Error for InventoryError {}
