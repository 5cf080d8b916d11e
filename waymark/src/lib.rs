// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Waymark: the assembled tracker state engine.
//!
//! The kernel crates each own one concern — check statuses, tags, groups,
//! entrances, the section tree, the inventory. [`Tracker`] owns one of each
//! and funnels every mutation, so that by the time any write call returns,
//! every derived [`SectionStatus`] is consistent and every interested listener
//! has fired. Collaborators (a session client, a UI layer, a persistence
//! store) only ever talk to the tracker:
//!
//! ```rust
//! use waymark::{CheckUpdate, Tracker};
//!
//! let mut tracker = Tracker::new();
//! tracker.load_groups(serde_json::from_str(
//!     r#"{ "forest": { "checks": ["Kokiri Sword Chest"] } }"#).unwrap());
//! tracker.set_configuration(serde_json::from_str(
//!     r#"{ "categories": { "root": { "groupKey": "forest" } } }"#).unwrap()).unwrap();
//!
//! tracker.update_status("Kokiri Sword Chest", CheckUpdate::new().exists(true).checked(true));
//! let root = tracker.section_status("root").unwrap();
//! assert!(root.report.checked.contains("Kokiri Sword Chest"));
//! ```
//!
//! The engine is single-threaded and synchronous; listeners run on the
//! mutating call and must not re-enter the tracker.
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It does not depend on `std`.

#![no_std]

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

pub use waymark_checks::{CheckStatus, CheckStore, CheckUpdate, TagInstance};
pub use waymark_entrances::EntranceResolver;
pub use waymark_groups::{Group, GroupData, GroupDef, GroupRegistry};
pub use waymark_inventory::{
    Collection, CollectionView, Inventory, InventoryData, InventoryError, Item, ItemFlags,
    RoundingMode,
};
pub use waymark_notify::SubscriptionId;
pub use waymark_sections::{
    CheckReport, ClearedBehavior, ConfigError, ConfigWarning, DisplayOptions, SectionConfigData,
    SectionStatus, SectionTree, Stores, VisibleChecks,
};
pub use waymark_tags::{CounterDef, CounterMode, SavedTag, TagPersistence, TagStore, TagType};

/// The tracker: every store under one owner, one mutation funnel.
///
/// Reads go through the accessors and per-store getters; writes go through
/// the methods below, each of which completes the store mutation, recomputes
/// every affected section bottom-up, and fires the listeners involved before
/// returning.
#[derive(Debug, Default)]
pub struct Tracker {
    checks: CheckStore,
    tags: TagStore,
    groups: GroupRegistry,
    entrances: EntranceResolver,
    sections: SectionTree,
    inventory: Inventory,
}

impl Tracker {
    /// Creates a tracker with the built-in tag types registered.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tags: TagStore::with_builtin_types(),
            ..Self::default()
        }
    }

    /// Merges a partial status into one check and propagates.
    ///
    /// Returns `true` if a field changed.
    pub fn update_status(&mut self, name: &str, update: CheckUpdate) -> bool {
        let changed = self.checks.update_status(name, update);
        if changed {
            self.propagate_check(name);
        }
        changed
    }

    /// Attaches a tag of `type_id` to `check`; idempotent.
    pub fn add_tag(&mut self, check: &str, type_id: &str, text: Option<String>) -> bool {
        let tag = self.tags.new_tag(check, type_id, text);
        let added = self.tags.add_tag(&mut self.checks, tag);
        if added {
            self.propagate_check(check);
        }
        added
    }

    /// Detaches the tag of `type_id` from `check`; no-op when absent.
    pub fn remove_tag(&mut self, check: &str, type_id: &str) -> bool {
        let tag_id = TagStore::tag_id(check, type_id);
        let removed = self.tags.remove_tag(&mut self.checks, check, &tag_id);
        if removed {
            self.propagate_check(check);
        }
        removed
    }

    /// Registers (or replaces) a tag type in the catalog.
    pub fn register_tag_type(&mut self, tag_type: TagType) {
        self.tags.register_type(tag_type);
    }

    /// Records (or clears) an entrance's destination region and re-binds the
    /// portals depending on it.
    pub fn set_entrance_destination(&mut self, entrance: &str, region: Option<String>) -> bool {
        let changed = self.entrances.set_destination(entrance, region);
        if changed {
            let Self {
                checks,
                tags,
                groups,
                entrances,
                sections,
                ..
            } = self;
            sections.on_entrance_updated(
                entrance,
                &Stores {
                    checks,
                    tags,
                    groups,
                    entrances,
                },
            );
        }
        changed
    }

    /// Replaces every group and rebuilds the section tree against them.
    pub fn load_groups(&mut self, data: GroupData) -> Vec<ConfigWarning> {
        self.groups.load_groups(data);
        self.rebuild_sections()
    }

    /// Replaces the section configuration wholesale.
    ///
    /// On an unsupported version the previous tree stays live and the error
    /// is returned; otherwise the collected (non-fatal) warnings are.
    pub fn set_configuration(
        &mut self,
        data: SectionConfigData,
    ) -> Result<Vec<ConfigWarning>, ConfigError> {
        let Self {
            checks,
            tags,
            groups,
            entrances,
            sections,
            ..
        } = self;
        sections.set_configuration(
            data,
            &Stores {
                checks,
                tags,
                groups,
                entrances,
            },
        )
    }

    /// Replaces the inventory's collection definitions.
    pub fn load_inventory(&mut self, data: InventoryData) -> Result<(), InventoryError> {
        self.inventory.load_collections(data)
    }

    /// Folds one received item into the inventory.
    pub fn add_item(&mut self, item: Item) {
        self.inventory.add_item(item);
    }

    /// Folds a batch of received items into the inventory.
    pub fn add_items(&mut self, items: impl IntoIterator<Item = Item>) {
        self.inventory.add_items(items);
    }

    /// Starts a fresh session: clears checks, entrances and the inventory,
    /// then rebuilds the section tree from the retained configuration.
    pub fn reset(&mut self) -> Vec<ConfigWarning> {
        self.checks.reset();
        self.entrances.reset();
        self.inventory.reset();
        self.rebuild_sections()
    }

    /// Re-applies the tags persisted for `connection_id` and propagates.
    pub fn load_tags(&mut self, persistence: &mut dyn TagPersistence, connection_id: &str) {
        if let Some(saved) = persistence.load(connection_id) {
            let names: Vec<String> = saved.iter().map(|tag| tag.check_name.clone()).collect();
            self.tags.apply_saved(&mut self.checks, saved);
            for name in names {
                self.propagate_check(&name);
            }
        }
    }

    /// Persists the current tag set for `connection_id`.
    pub fn save_tags(&self, persistence: &mut dyn TagPersistence, connection_id: &str) {
        self.tags.save_tags(&self.checks, persistence, connection_id);
    }

    /// Returns the current status of one check.
    #[must_use]
    pub fn check_status(&self, name: &str) -> &CheckStatus {
        self.checks.get_status(name)
    }

    /// Returns the latest published snapshot of one section.
    #[must_use]
    pub fn section_status(&self, name: &str) -> Option<&SectionStatus> {
        self.sections.status(name)
    }

    /// Resolves which of a check's tags wins single-icon display.
    #[must_use]
    pub fn selected_tag(&self, check: &str) -> Option<&TagInstance> {
        self.tags.selected_tag(self.checks.get_status(check))
    }

    /// Registers a listener for one check name.
    pub fn subscribe_check(
        &mut self,
        name: &str,
        listener: impl FnMut() + 'static,
    ) -> SubscriptionId {
        self.checks.subscribe(name, listener)
    }

    /// Removes a check subscription. Idempotent.
    pub fn unsubscribe_check(&mut self, id: SubscriptionId) -> bool {
        self.checks.unsubscribe(id)
    }

    /// Registers a listener for one section name.
    pub fn subscribe_section(
        &mut self,
        name: &str,
        listener: impl FnMut() + 'static,
    ) -> SubscriptionId {
        self.sections.subscribe(name, listener)
    }

    /// Removes a section subscription. Idempotent.
    pub fn unsubscribe_section(&mut self, id: SubscriptionId) -> bool {
        self.sections.unsubscribe(id)
    }

    /// Registers a whole-inventory listener.
    pub fn subscribe_inventory(&mut self, listener: impl FnMut() + 'static) -> SubscriptionId {
        self.inventory.subscribe(listener)
    }

    /// Removes an inventory subscription. Idempotent.
    pub fn unsubscribe_inventory(&mut self, id: SubscriptionId) -> bool {
        self.inventory.unsubscribe(id)
    }

    /// The check store.
    #[must_use]
    pub fn checks(&self) -> &CheckStore {
        &self.checks
    }

    /// The tag catalog.
    #[must_use]
    pub fn tags(&self) -> &TagStore {
        &self.tags
    }

    /// The group registry.
    #[must_use]
    pub fn groups(&self) -> &GroupRegistry {
        &self.groups
    }

    /// The entrance resolver.
    #[must_use]
    pub fn entrances(&self) -> &EntranceResolver {
        &self.entrances
    }

    /// The section tree.
    #[must_use]
    pub fn sections(&self) -> &SectionTree {
        &self.sections
    }

    /// The inventory.
    #[must_use]
    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// The renderable inventory collections (recomputed lazily).
    pub fn inventory_items(&mut self) -> &[CollectionView] {
        self.inventory.items()
    }

    fn propagate_check(&mut self, name: &str) {
        let Self {
            checks,
            tags,
            groups,
            entrances,
            sections,
            ..
        } = self;
        sections.on_check_updated(
            name,
            &Stores {
                checks,
                tags,
                groups,
                entrances,
            },
        );
    }

    fn rebuild_sections(&mut self) -> Vec<ConfigWarning> {
        let Self {
            checks,
            tags,
            groups,
            entrances,
            sections,
            ..
        } = self;
        sections.rebuild(&Stores {
            checks,
            tags,
            groups,
            entrances,
        })
    }
}
