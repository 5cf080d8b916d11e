// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Waymark Tags: typed annotations on checks.
//!
//! A *tag* is a small typed marker a user (or the session layer) attaches to a
//! check — a star to come back later, an ignore, a hint received from the
//! server. The tag *catalog* ([`TagType`]) carries the display metadata:
//! icon, colors, a priority for single-icon display, and an optional counter
//! descriptor that feeds the section aggregates.
//!
//! The [`TagStore`] applies tag mutations *through* the check store (tag
//! instances live on [`CheckStatus`](waymark_checks::CheckStatus)), so one
//! subscription per check name observes both status and tag changes.
//!
//! ## Quick Start
//!
//! ```rust
//! use waymark_checks::CheckStore;
//! use waymark_tags::TagStore;
//!
//! let tags = TagStore::with_builtin_types();
//! let mut checks = CheckStore::new();
//!
//! let star = tags.new_tag("Link's Pocket", "star", None);
//! assert!(tags.add_tag(&mut checks, star.clone()));
//! assert!(!tags.add_tag(&mut checks, star)); // idempotent
//!
//! let status = checks.get_status("Link's Pocket");
//! assert_eq!(tags.selected_tag(status).unwrap().type_id, "star");
//! ```
//!
//! Persisted tags are exchanged with the storage collaborator as a flat
//! [`SavedTag`] list keyed by connection id; the payload is plain serde data
//! and stays opaque JSON to this crate.
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It does not depend on `std`.

#![no_std]

extern crate alloc;

mod catalog;
mod store;

pub use catalog::{CounterDef, CounterMode, TagType};
pub use store::{SavedTag, TagPersistence, TagStore};
