// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Published section snapshots and the cleared-check display policy.

use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashMap;
use waymark_checks::CheckStatus;

use crate::config::Theme;
use crate::report::CheckReport;

/// What to do with checks that are already checked or ignored.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ClearedBehavior {
    /// Render cleared checks inline with the rest.
    #[default]
    Nothing,
    /// Render cleared checks in a separate list after the active ones.
    Separate,
    /// Do not render cleared checks at all.
    Hide,
}

/// Read-only display options consulted at render-decision time.
///
/// The engine does not own option persistence; consumers hand in whatever
/// implements this when they pull a snapshot apart.
pub trait DisplayOptions {
    /// The current cleared-check policy.
    fn cleared_behavior(&self) -> ClearedBehavior;
}

impl DisplayOptions for ClearedBehavior {
    fn cleared_behavior(&self) -> ClearedBehavior {
        *self
    }
}

/// A section's immediate members split per the cleared-check policy.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VisibleChecks<'a> {
    /// Checks to render in the main list.
    pub active: Vec<&'a str>,
    /// Cleared checks to render separately; empty unless the policy is
    /// [`ClearedBehavior::Separate`].
    pub cleared: Vec<&'a str>,
}

/// Published, read-only snapshot of one section.
///
/// Snapshots are overwritten in place by the tree on every recompute and
/// observed by re-fetching after a notification; the version tells two
/// fetches apart.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionStatus {
    /// Display title.
    pub title: String,
    /// Resolved theme.
    pub theme: Theme,
    /// Aggregate over this section's transitive checks.
    pub report: CheckReport,
    /// Statuses of the immediate member checks only (not children's).
    pub checks: HashMap<String, CheckStatus>,
    /// Child section names, in render order.
    pub children: Vec<String>,
    pub(crate) version: u64,
}

impl SectionStatus {
    /// Returns the snapshot version, unique and increasing per publication.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Splits the immediate members per the cleared-check policy.
    ///
    /// Only existing checks are considered. Names are sorted so render order
    /// is stable across recomputes.
    #[must_use]
    pub fn visible_checks(&self, options: &impl DisplayOptions) -> VisibleChecks<'_> {
        let mut names: Vec<(&str, bool)> = self
            .checks
            .iter()
            .filter(|(_, status)| status.exists)
            .map(|(name, status)| (name.as_str(), status.checked || status.ignored))
            .collect();
        names.sort_unstable_by_key(|(name, _)| *name);

        match options.cleared_behavior() {
            ClearedBehavior::Nothing => VisibleChecks {
                active: names.into_iter().map(|(name, _)| name).collect(),
                cleared: Vec::new(),
            },
            ClearedBehavior::Separate => {
                let mut split = VisibleChecks::default();
                for (name, cleared) in names {
                    if cleared {
                        split.cleared.push(name);
                    } else {
                        split.active.push(name);
                    }
                }
                split
            }
            ClearedBehavior::Hide => VisibleChecks {
                active: names
                    .into_iter()
                    .filter(|(_, cleared)| !cleared)
                    .map(|(name, _)| name)
                    .collect(),
                cleared: Vec::new(),
            },
        }
    }
}
