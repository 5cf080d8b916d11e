// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Waymark Checks: the authoritative store for check/location status.
//!
//! A *check* is a single discrete pickup point in the game world. This crate
//! owns the mapping from a check name to its current [`CheckStatus`] — whether
//! it exists in the active session, whether it has been checked or ignored,
//! which [`TagInstance`]s annotate it — and the per-name subscriptions that
//! downstream consumers (the section update tree, the UI) use to observe it.
//!
//! Entries are created lazily: the first [`CheckStore::update_status`] for a
//! name creates its entry, and [`CheckStore::get_status`] on a name that was
//! never written returns a shared default with `exists = false`. Unknown names
//! are never an error.
//!
//! ## Quick Start
//!
//! ```rust
//! use waymark_checks::{CheckStore, CheckUpdate};
//!
//! let mut checks = CheckStore::new();
//!
//! assert!(!checks.get_status("Link's Pocket").exists);
//!
//! checks.update_status("Link's Pocket", CheckUpdate::new().exists(true));
//! checks.update_status("Link's Pocket", CheckUpdate::new().checked(true));
//!
//! let status = checks.get_status("Link's Pocket");
//! assert!(status.exists);
//! assert!(status.checked);
//! ```
//!
//! ## Change detection
//!
//! Every stored status carries a monotonic version counter, bumped only when a
//! write actually changed something. Consumers that cache snapshots compare
//! versions by value instead of comparing objects by identity.
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It does not depend on `std`.

#![no_std]

extern crate alloc;

mod status;
mod store;

pub use status::{CheckStatus, CheckUpdate, TagInstance};
pub use store::CheckStore;
