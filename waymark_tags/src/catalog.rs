// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tag type catalog entries.

use alloc::string::String;
use serde::{Deserialize, Serialize};

/// How a counter tallies the checks that carry its tag.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CounterMode {
    /// Count checks that have been checked (or ignored).
    CountChecked,
    /// Count checks that are still outstanding.
    CountUnchecked,
    /// Count every existing check with the tag.
    #[default]
    CountAll,
}

/// Counter descriptor attached to a [`TagType`].
///
/// Tag types with a counter contribute per-type count/total sets to every
/// section's aggregate report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterDef {
    /// Counter id, the key used in section report maps.
    pub id: String,
    /// Display color for the counter badge.
    #[serde(default)]
    pub color: Option<String>,
    /// Display icon for the counter badge.
    #[serde(default)]
    pub icon: Option<String>,
    /// How tagged checks are tallied.
    #[serde(default)]
    pub count_mode: CounterMode,
    /// If `true`, the badge renders `count/total` instead of bare `count`.
    #[serde(default)]
    pub show_total: bool,
}

/// Static catalog entry describing one kind of tag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagType {
    /// Catalog id, referenced by `TagInstance::type_id`.
    pub id: String,
    /// Human-readable name.
    pub display_name: String,
    /// Display icon.
    #[serde(default)]
    pub icon: Option<String>,
    /// Icon tint.
    #[serde(default)]
    pub icon_color: Option<String>,
    /// Text tint for tags that carry text.
    #[serde(default)]
    pub text_color: Option<String>,
    /// Display precedence; when a check carries several tags, the highest
    /// priority wins single-icon display.
    #[serde(default)]
    pub priority: i32,
    /// Optional aggregate counter fed by this tag type.
    #[serde(default)]
    pub counter: Option<CounterDef>,
}

impl TagType {
    /// The built-in types registered by [`TagStore::with_builtin_types`](crate::TagStore::with_builtin_types).
    #[must_use]
    pub fn builtins() -> [Self; 3] {
        [
            Self {
                id: String::from("star"),
                display_name: String::from("Starred"),
                icon: Some(String::from("star")),
                icon_color: Some(String::from("yellow")),
                text_color: None,
                priority: 10,
                counter: Some(CounterDef {
                    id: String::from("star"),
                    color: Some(String::from("yellow")),
                    icon: Some(String::from("star")),
                    count_mode: CounterMode::CountUnchecked,
                    show_total: true,
                }),
            },
            Self {
                id: String::from("ignore"),
                display_name: String::from("Ignored"),
                icon: Some(String::from("block")),
                icon_color: Some(String::from("gray")),
                text_color: None,
                priority: 5,
                counter: None,
            },
            Self {
                id: String::from("hint"),
                display_name: String::from("Hinted"),
                icon: Some(String::from("priority_high")),
                icon_color: Some(String::from("lightblue")),
                text_color: Some(String::from("lightblue")),
                priority: 20,
                counter: Some(CounterDef {
                    id: String::from("hint"),
                    color: Some(String::from("lightblue")),
                    icon: Some(String::from("priority_high")),
                    count_mode: CounterMode::CountUnchecked,
                    show_total: false,
                }),
            },
        ]
    }
}
