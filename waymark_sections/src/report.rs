// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Aggregate check reports.

use alloc::string::{String, ToString};

use hashbrown::{HashMap, HashSet};
use waymark_checks::CheckStatus;
use waymark_tags::{CounterMode, TagStore};

/// Aggregate over a set of checks.
///
/// Everything is a *set* of check names rather than a count, so folding the
/// same contribution in twice is harmless. A parent's report is the union of
/// its own direct checks' contributions and its children's already-computed
/// reports, which keeps aggregation idempotent when one check belongs to
/// several sections.
///
/// Invariants after any sequence of [`add_check`](Self::add_check) /
/// [`merge`](Self::merge): `checked ⊆ exist` and `ignored ⊆ exist`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckReport {
    /// Checks reported as present in this session.
    pub exist: HashSet<String>,
    /// Existing checks that have been collected.
    pub checked: HashSet<String>,
    /// Existing checks dismissed without collecting.
    pub ignored: HashSet<String>,
    /// Counter id → checks currently tallied by that counter.
    pub tag_counts: HashMap<String, HashSet<String>>,
    /// Counter id → every existing check carrying the counter's tag.
    pub tag_totals: HashMap<String, HashSet<String>>,
}

impl CheckReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one check's current status into the report.
    ///
    /// Checks with `exists = false` contribute nothing. A checked check never
    /// also counts as ignored. Tags only contribute when their type has a
    /// counter in the catalog, tallied per the counter's mode.
    pub fn add_check(&mut self, name: &str, status: &CheckStatus, tags: &TagStore) {
        if !status.exists {
            return;
        }
        self.exist.insert(name.to_string());
        if status.checked {
            self.checked.insert(name.to_string());
        } else if status.ignored {
            self.ignored.insert(name.to_string());
        }

        let cleared = status.checked || status.ignored;
        for tag in &status.tags {
            let Some(counter) = tags.counter(&tag.type_id) else {
                continue;
            };
            self.tag_totals
                .entry(counter.id.clone())
                .or_default()
                .insert(name.to_string());
            let counted = match counter.count_mode {
                CounterMode::CountChecked => cleared,
                CounterMode::CountUnchecked => !cleared,
                CounterMode::CountAll => true,
            };
            if counted {
                self.tag_counts
                    .entry(counter.id.clone())
                    .or_default()
                    .insert(name.to_string());
            }
        }
    }

    /// Unions another report into this one.
    pub fn merge(&mut self, other: &Self) {
        self.exist.extend(other.exist.iter().cloned());
        self.checked.extend(other.checked.iter().cloned());
        self.ignored.extend(other.ignored.iter().cloned());
        for (id, names) in &other.tag_counts {
            self.tag_counts
                .entry(id.clone())
                .or_default()
                .extend(names.iter().cloned());
        }
        for (id, names) in &other.tag_totals {
            self.tag_totals
                .entry(id.clone())
                .or_default()
                .extend(names.iter().cloned());
        }
    }

    /// Returns `true` if every existing check is checked or ignored.
    #[must_use]
    pub fn is_cleared(&self) -> bool {
        self.exist
            .iter()
            .all(|name| self.checked.contains(name) || self.ignored.contains(name))
    }
}
