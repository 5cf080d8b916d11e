// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Check status values and partial updates.

use alloc::string::String;
use smallvec::SmallVec;

/// Inline capacity for a check's tag list.
///
/// Checks rarely carry more than a star plus a hint, so two inline slots
/// avoid heap allocation in the common case.
const INLINE_TAGS: usize = 2;

/// One tag attached to one check.
///
/// Instances are stored on the check's [`CheckStatus`]; the tag *type* (icon,
/// colors, priority, counter) lives in the tag catalog and is referenced by
/// `type_id`. At most one instance per `tag_id` is ever present on a check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagInstance {
    /// Unique id of this instance, conventionally `"{check_name}-{type_id}"`.
    pub tag_id: String,
    /// Id of the tag type (catalog entry) this instance is of.
    pub type_id: String,
    /// Name of the check this instance annotates.
    pub check_name: String,
    /// Optional free text (hint tags carry the hint here).
    pub text: Option<String>,
}

/// Current status of one check.
///
/// A check with `exists = false` is never rendered and never contributes to
/// aggregate counts; `checked` and `ignored` are only meaningful while the
/// check exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckStatus {
    /// `true` once the session has reported this check as present.
    pub exists: bool,
    /// `true` once the check has been collected.
    pub checked: bool,
    /// `true` while the user has dismissed the check without collecting it.
    pub ignored: bool,
    /// Tags attached to this check, in insertion order.
    pub tags: SmallVec<[TagInstance; INLINE_TAGS]>,
    /// Optional display override for the raw check name.
    pub display_name: Option<String>,
    version: u64,
}

impl Default for CheckStatus {
    fn default() -> Self {
        Self {
            exists: false,
            checked: false,
            ignored: false,
            tags: SmallVec::new(),
            display_name: None,
            version: 0,
        }
    }
}

impl CheckStatus {
    /// Returns the status version.
    ///
    /// Incremented by the store on every write that changed a field, so two
    /// reads with equal versions are guaranteed to observe identical state.
    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Returns the tag with the given `tag_id`, if present.
    #[must_use]
    pub fn tag(&self, tag_id: &str) -> Option<&TagInstance> {
        self.tags.iter().find(|tag| tag.tag_id == tag_id)
    }

    /// Returns `true` if a tag with the given `tag_id` is attached.
    #[must_use]
    pub fn has_tag(&self, tag_id: &str) -> bool {
        self.tag(tag_id).is_some()
    }

    pub(crate) fn bump(&mut self) {
        self.version = self.version.wrapping_add(1);
    }
}

/// Partial update merged into a stored [`CheckStatus`].
///
/// Unset fields leave the stored value untouched. Built with chained setters:
///
/// ```rust
/// use waymark_checks::CheckUpdate;
///
/// let update = CheckUpdate::new().exists(true).checked(true);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckUpdate {
    exists: Option<bool>,
    checked: Option<bool>,
    ignored: Option<bool>,
    display_name: Option<String>,
}

impl CheckUpdate {
    /// Creates an empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the `exists` field.
    #[must_use]
    pub fn exists(mut self, exists: bool) -> Self {
        self.exists = Some(exists);
        self
    }

    /// Sets the `checked` field.
    #[must_use]
    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = Some(checked);
        self
    }

    /// Sets the `ignored` field.
    #[must_use]
    pub fn ignored(mut self, ignored: bool) -> Self {
        self.ignored = Some(ignored);
        self
    }

    /// Sets the display-name override.
    #[must_use]
    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Returns `true` if the update carries no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exists.is_none()
            && self.checked.is_none()
            && self.ignored.is_none()
            && self.display_name.is_none()
    }

    /// Merges this update into `status`. Returns `true` if anything changed.
    pub(crate) fn apply(&self, status: &mut CheckStatus) -> bool {
        let mut changed = false;
        if let Some(exists) = self.exists
            && status.exists != exists
        {
            status.exists = exists;
            changed = true;
        }
        if let Some(checked) = self.checked
            && status.checked != checked
        {
            status.checked = checked;
            changed = true;
        }
        if let Some(ignored) = self.ignored
            && status.ignored != ignored
        {
            status.ignored = ignored;
            changed = true;
        }
        if let Some(name) = &self.display_name
            && status.display_name.as_deref() != Some(name.as_str())
        {
            status.display_name = Some(name.clone());
            changed = true;
        }
        changed
    }
}
