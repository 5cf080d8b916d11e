// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Waymark Groups: flat named sets of check names.
//!
//! A *group* is the unit sections bind to: a named set of checks, optionally a
//! set of exits (entrances leading out, for games with randomized
//! connectivity) and the region the group represents. Groups are always loaded
//! wholesale — [`GroupRegistry::load_groups`] replaces the entire set so no
//! derived structure can dangle on a removed group — and every replacement
//! bumps a generation counter dependents compare to detect invalidation.
//!
//! ```rust
//! use waymark_groups::{GroupDef, GroupRegistry};
//!
//! let mut registry = GroupRegistry::new();
//! registry.load_groups(
//!     [(
//!         "kokiri".into(),
//!         GroupDef {
//!             checks: vec!["Kokiri Sword Chest".into()],
//!             exits: vec!["Forest Exit".into()],
//!             region: Some("Kokiri Forest".into()),
//!         },
//!     )]
//!     .into_iter()
//!     .collect(),
//! );
//!
//! let group = registry.group("kokiri").unwrap();
//! assert!(group.checks.contains("Kokiri Sword Chest"));
//! assert_eq!(registry.group_for_region("Kokiri Forest"), Some("kokiri"));
//! ```
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It does not depend on `std`.

#![no_std]

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::{HashMap, HashSet};
use serde::Deserialize;

/// Raw group definitions as supplied by the configuration loader.
///
/// A `BTreeMap` so load order (and therefore any warning order downstream) is
/// deterministic regardless of the JSON source.
pub type GroupData = BTreeMap<String, GroupDef>;

/// One group definition from configuration data.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDef {
    /// Member check names.
    pub checks: Vec<String>,
    /// Entrances leading out of this group's region.
    #[serde(default)]
    pub exits: Vec<String>,
    /// The region this group covers, for entrance resolution.
    #[serde(default)]
    pub region: Option<String>,
}

/// A loaded group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Group {
    /// The group's key in the registry.
    pub name: String,
    /// Member check names.
    pub checks: HashSet<String>,
    /// Entrances leading out of this group's region.
    pub exits: HashSet<String>,
    /// The region this group covers, if any.
    pub region: Option<String>,
}

/// Registry of every loaded group.
///
/// There are no partial updates: [`load_groups`](Self::load_groups) replaces
/// the whole set. Callers that derived structure from the previous set (the
/// section tree) must rebuild; the generation counter tells them when.
#[derive(Debug, Default)]
pub struct GroupRegistry {
    groups: HashMap<String, Group>,
    /// Region name → group name, rebuilt on every load.
    by_region: HashMap<String, String>,
    generation: u64,
}

impl GroupRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the load generation, incremented on every [`load_groups`](Self::load_groups).
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Replaces every group with the supplied definitions.
    pub fn load_groups(&mut self, data: GroupData) {
        self.groups.clear();
        self.by_region.clear();
        for (name, def) in data {
            if let Some(region) = &def.region {
                self.by_region.insert(region.clone(), name.clone());
            }
            self.groups.insert(
                name.clone(),
                Group {
                    name,
                    checks: def.checks.into_iter().collect(),
                    exits: def.exits.into_iter().collect(),
                    region: def.region,
                },
            );
        }
        self.generation = self.generation.wrapping_add(1);
    }

    /// Looks up a group by name.
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.get(name)
    }

    /// Returns the name of the group covering `region`, if one was loaded.
    #[must_use]
    pub fn group_for_region(&self, region: &str) -> Option<&str> {
        self.by_region.get(region).map(String::as_str)
    }

    /// Returns an iterator over all groups.
    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }

    /// Returns the number of loaded groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns `true` if no groups are loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
