// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The tag store: catalog plus mutation and persistence entry points.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use waymark_checks::{CheckStatus, CheckStore, TagInstance};

use crate::catalog::{CounterDef, TagType};

/// Tag catalog and mutation façade.
///
/// The store itself holds only the type catalog; tag *instances* live on the
/// check statuses they annotate, so mutations are applied through a
/// `&mut CheckStore` and observed through the check store's per-name
/// subscriptions.
#[derive(Debug, Default)]
pub struct TagStore {
    types: HashMap<String, TagType>,
}

impl TagStore {
    /// Creates a store with an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with the built-in star/ignore/hint types.
    #[must_use]
    pub fn with_builtin_types() -> Self {
        let mut store = Self::new();
        for tag_type in TagType::builtins() {
            store.register_type(tag_type);
        }
        store
    }

    /// Registers (or replaces) a catalog entry.
    pub fn register_type(&mut self, tag_type: TagType) {
        self.types.insert(tag_type.id.clone(), tag_type);
    }

    /// Looks up a catalog entry.
    #[must_use]
    pub fn tag_type(&self, type_id: &str) -> Option<&TagType> {
        self.types.get(type_id)
    }

    /// Returns the counter descriptor for a tag type, if it has one.
    ///
    /// Section aggregation calls this per tag to decide which counter sets a
    /// tagged check contributes to.
    #[must_use]
    pub fn counter(&self, type_id: &str) -> Option<&CounterDef> {
        self.types.get(type_id).and_then(|t| t.counter.as_ref())
    }

    /// Derives the conventional tag id for a check/type pair.
    #[must_use]
    pub fn tag_id(check_name: &str, type_id: &str) -> String {
        format!("{check_name}-{type_id}")
    }

    /// Builds a new tag instance for `check_name` with the derived tag id.
    #[must_use]
    pub fn new_tag(&self, check_name: &str, type_id: &str, text: Option<String>) -> TagInstance {
        TagInstance {
            tag_id: Self::tag_id(check_name, type_id),
            type_id: type_id.to_string(),
            check_name: check_name.to_string(),
            text,
        }
    }

    /// Attaches `tag` to its check.
    ///
    /// Idempotent: if the check already carries a tag with the same `tag_id`,
    /// nothing happens and no listeners fire. Returns `true` if the tag was
    /// newly added.
    pub fn add_tag(&self, checks: &mut CheckStore, tag: TagInstance) -> bool {
        checks.add_tag_instance(tag)
    }

    /// Detaches the tag with `tag_id` from `check_name`; no-op when absent.
    pub fn remove_tag(&self, checks: &mut CheckStore, check_name: &str, tag_id: &str) -> bool {
        checks.remove_tag_instance(check_name, tag_id)
    }

    /// Resolves which of a check's tags wins single-icon display.
    ///
    /// The tag whose type has the highest `priority` is selected; ties resolve
    /// to the earliest tag in the check's list (insertion order). Tags whose
    /// type is missing from the catalog rank at priority 0.
    #[must_use]
    pub fn selected_tag<'a>(&self, status: &'a CheckStatus) -> Option<&'a TagInstance> {
        let mut best: Option<(&TagInstance, i32)> = None;
        for tag in &status.tags {
            let priority = self.tag_type(&tag.type_id).map_or(0, |t| t.priority);
            match best {
                Some((_, best_priority)) if priority <= best_priority => {}
                _ => best = Some((tag, priority)),
            }
        }
        best.map(|(tag, _)| tag)
    }

    /// Exports every tag currently attached to any check.
    ///
    /// The result is the serializable payload handed to the persistence
    /// collaborator.
    #[must_use]
    pub fn export_tags(&self, checks: &CheckStore) -> Vec<SavedTag> {
        let mut names: Vec<&str> = checks.names().collect();
        names.sort_unstable();
        let mut saved = Vec::new();
        for name in names {
            for tag in &checks.get_status(name).tags {
                saved.push(SavedTag::from(tag));
            }
        }
        saved
    }

    /// Re-applies a previously persisted tag list.
    ///
    /// Each tag goes through [`add_tag`](Self::add_tag), so re-loading a list
    /// that is already applied is a no-op.
    pub fn apply_saved(&self, checks: &mut CheckStore, saved: Vec<SavedTag>) {
        for tag in saved {
            self.add_tag(checks, tag.into_instance());
        }
    }

    /// Loads the tags persisted for `connection_id` and re-applies them.
    pub fn load_tags(
        &self,
        checks: &mut CheckStore,
        persistence: &mut dyn TagPersistence,
        connection_id: &str,
    ) {
        if let Some(saved) = persistence.load(connection_id) {
            self.apply_saved(checks, saved);
        }
    }

    /// Saves the current tag set for `connection_id`.
    pub fn save_tags(
        &self,
        checks: &CheckStore,
        persistence: &mut dyn TagPersistence,
        connection_id: &str,
    ) {
        let saved = self.export_tags(checks);
        persistence.save(connection_id, &saved);
    }
}

/// One persisted tag.
///
/// The flat, serde-serializable shape exchanged with the persistence
/// collaborator; the surrounding storage format is opaque to this crate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedTag {
    /// The tag's type id.
    pub type_id: String,
    /// The annotated check.
    pub check_name: String,
    /// The instance id, normally `"{check_name}-{type_id}"`.
    pub tag_id: String,
    /// Optional free text.
    #[serde(default)]
    pub text: Option<String>,
}

impl SavedTag {
    /// Converts back into a live [`TagInstance`].
    #[must_use]
    pub fn into_instance(self) -> TagInstance {
        TagInstance {
            tag_id: self.tag_id,
            type_id: self.type_id,
            check_name: self.check_name,
            text: self.text,
        }
    }
}

impl From<&TagInstance> for SavedTag {
    fn from(tag: &TagInstance) -> Self {
        Self {
            type_id: tag.type_id.clone(),
            check_name: tag.check_name.clone(),
            tag_id: tag.tag_id.clone(),
            text: tag.text.clone(),
        }
    }
}

/// External storage collaborator for per-connection tag persistence.
///
/// Implementations own the actual storage (browser storage, a session server's
/// key-value store); the core only exchanges [`SavedTag`] lists.
pub trait TagPersistence {
    /// Returns the tags persisted for `connection_id`, if any.
    fn load(&mut self, connection_id: &str) -> Option<Vec<SavedTag>>;

    /// Persists `tags` for `connection_id`, replacing any previous list.
    fn save(&mut self, connection_id: &str, tags: &[SavedTag]);
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use waymark_checks::CheckUpdate;

    #[test]
    fn add_tag_is_idempotent() {
        let tags = TagStore::with_builtin_types();
        let mut checks = CheckStore::new();

        let star = tags.new_tag("X", "star", None);
        assert!(tags.add_tag(&mut checks, star.clone()));
        assert!(!tags.add_tag(&mut checks, star));

        let matching: Vec<_> = checks
            .get_status("X")
            .tags
            .iter()
            .filter(|t| t.tag_id == "X-star")
            .collect();
        assert_eq!(matching.len(), 1);
    }

    #[test]
    fn priority_selects_display_tag() {
        let mut tags = TagStore::new();
        tags.register_type(TagType {
            id: String::from("a"),
            display_name: String::from("A"),
            icon: None,
            icon_color: None,
            text_color: None,
            priority: 1,
            counter: None,
        });
        tags.register_type(TagType {
            id: String::from("b"),
            display_name: String::from("B"),
            icon: None,
            icon_color: None,
            text_color: None,
            priority: 5,
            counter: None,
        });

        let mut checks = CheckStore::new();
        tags.add_tag(&mut checks, tags.new_tag("X", "a", None));
        tags.add_tag(&mut checks, tags.new_tag("X", "b", None));

        let selected = tags.selected_tag(checks.get_status("X")).unwrap();
        assert_eq!(selected.type_id, "b");
    }

    #[test]
    fn priority_ties_resolve_to_insertion_order() {
        let mut tags = TagStore::new();
        for id in ["first", "second"] {
            tags.register_type(TagType {
                id: String::from(id),
                display_name: String::from(id),
                icon: None,
                icon_color: None,
                text_color: None,
                priority: 3,
                counter: None,
            });
        }

        let mut checks = CheckStore::new();
        tags.add_tag(&mut checks, tags.new_tag("X", "first", None));
        tags.add_tag(&mut checks, tags.new_tag("X", "second", None));

        let selected = tags.selected_tag(checks.get_status("X")).unwrap();
        assert_eq!(selected.type_id, "first");
    }

    #[test]
    fn export_and_reapply_round_trip() {
        let tags = TagStore::with_builtin_types();
        let mut checks = CheckStore::new();
        checks.update_status("X", CheckUpdate::new().exists(true));
        tags.add_tag(
            &mut checks,
            tags.new_tag("X", "hint", Some(String::from("it's in the well"))),
        );
        tags.add_tag(&mut checks, tags.new_tag("Y", "star", None));

        let saved = tags.export_tags(&checks);
        assert_eq!(saved.len(), 2);

        // Applying the export to a fresh store reproduces the tags.
        let mut fresh = CheckStore::new();
        tags.apply_saved(&mut fresh, saved.clone());
        assert!(fresh.get_status("X").has_tag("X-hint"));
        assert!(fresh.get_status("Y").has_tag("Y-star"));

        // Applying twice changes nothing.
        tags.apply_saved(&mut fresh, saved);
        assert_eq!(fresh.get_status("X").tags.len(), 1);
    }

    #[test]
    fn persistence_collaborator_round_trip() {
        struct MemoryStore(HashMap<String, Vec<SavedTag>>);
        impl TagPersistence for MemoryStore {
            fn load(&mut self, connection_id: &str) -> Option<Vec<SavedTag>> {
                self.0.get(connection_id).cloned()
            }
            fn save(&mut self, connection_id: &str, tags: &[SavedTag]) {
                self.0.insert(connection_id.to_string(), tags.to_vec());
            }
        }

        let tags = TagStore::with_builtin_types();
        let mut checks = CheckStore::new();
        tags.add_tag(&mut checks, tags.new_tag("X", "star", None));

        let mut persistence = MemoryStore(HashMap::new());
        tags.save_tags(&checks, &mut persistence, "conn-1");

        let mut restored = CheckStore::new();
        tags.load_tags(&mut restored, &mut persistence, "conn-1");
        assert!(restored.get_status("X").has_tag("X-star"));

        // Unknown connection loads nothing.
        let mut empty = CheckStore::new();
        tags.load_tags(&mut empty, &mut persistence, "conn-2");
        assert!(empty.is_empty());
    }
}
