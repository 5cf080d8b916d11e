// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Waymark Sections: the hierarchical checklist engine.
//!
//! Sections are the nested checklist a tracker renders: each one binds a set
//! of checks through named groups, aggregates them (plus its children) into a
//! [`CheckReport`], and publishes a read-only [`SectionStatus`] snapshot.
//! The [`SectionTree`] keeps the whole hierarchy consistent incrementally —
//! when a check or entrance changes, only the nodes depending on it recompute,
//! then their parents, bottom-up, before the triggering call returns.
//!
//! The tree is driven by an owner that funnels every store mutation:
//!
//! 1. mutate the check store (or entrance resolver),
//! 2. call [`SectionTree::on_check_updated`] (or
//!    [`SectionTree::on_entrance_updated`]) with a [`Stores`] view,
//! 3. observers notified along the way re-pull snapshots via
//!    [`SectionTree::status`].
//!
//! Configuration ([`SectionConfigData`]) is replaced wholesale and validated
//! leniently: missing references and cycles warn and are skipped, only an
//! unsupported format version rejects the load (leaving the previous tree
//! live).
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It does not depend on `std`.

#![no_std]

extern crate alloc;

mod config;
mod report;
mod status;
mod tree;

pub use config::{
    ConfigError, ConfigWarning, GroupKey, ResolvedSection, SectionConfig, SectionConfigData,
    SectionDef, Theme, ThemeDef, SUPPORTED_FORMAT_VERSION,
};
pub use report::CheckReport;
pub use status::{ClearedBehavior, DisplayOptions, SectionStatus, VisibleChecks};
pub use tree::{SectionTree, Stores};
