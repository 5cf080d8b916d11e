// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Static section configuration: the serde data model and its lenient
//! resolution into a form the tree builder consumes.

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashMap;
use serde::Deserialize;

/// The only section-configuration format this crate reads.
pub const SUPPORTED_FORMAT_VERSION: u32 = 1;

fn default_format_version() -> u32 {
    SUPPORTED_FORMAT_VERSION
}

/// Wholesale section configuration as supplied by the configuration loader.
///
/// `BTreeMap` keys keep resolution (and therefore warning order) deterministic
/// regardless of the JSON source.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionConfigData {
    /// Schema version; loads with an unsupported version are rejected whole.
    #[serde(default = "default_format_version")]
    pub format_version: u32,
    /// Section definitions by name. The tree is rooted at `"root"`.
    pub categories: BTreeMap<String, SectionDef>,
    /// Theme palette referenced by the sections.
    #[serde(default)]
    pub themes: BTreeMap<String, ThemeDef>,
}

/// One section definition.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionDef {
    /// Display title; missing titles fall back to `"Untitled Section"`.
    #[serde(default)]
    pub title: Option<String>,
    /// The group(s) whose checks this section aggregates directly.
    #[serde(default)]
    pub group_key: GroupKey,
    /// Referenced theme name; missing references warn and use the default.
    #[serde(default)]
    pub theme: Option<String>,
    /// Child section names, in render order.
    #[serde(default)]
    pub children: Vec<String>,
}

/// A section's group binding: none, one group, or several.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum GroupKey {
    /// The section aggregates children only.
    #[default]
    None,
    /// A single group.
    One(String),
    /// Several groups, unioned.
    Many(Vec<String>),
}

impl GroupKey {
    /// Iterates the referenced group names.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            Self::None => &[],
            Self::One(name) => core::slice::from_ref(name),
            Self::Many(names) => names,
        };
        slice.iter().map(String::as_str)
    }
}

/// One theme definition from configuration data.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeDef {
    /// Accent color; defaults to black.
    #[serde(default)]
    pub color: Option<String>,
}

/// A resolved theme as published on section statuses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Theme {
    /// The theme's name in the palette.
    pub name: String,
    /// Accent color.
    pub color: String,
}

impl Theme {
    /// The theme substituted when a section references no (or a missing) theme.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            name: String::from("default"),
            color: String::from("black"),
        }
    }
}

/// A section after resolution, ready for the tree builder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedSection {
    /// Display title.
    pub title: String,
    /// Names of the groups bound to this section.
    pub group_keys: Vec<String>,
    /// Resolved theme.
    pub theme: Theme,
    /// Child section names, in order.
    pub children: Vec<String>,
}

/// Resolved configuration: every section with titles and themes settled.
///
/// Structural problems found later (missing sections, missing groups, cycles)
/// are the tree builder's business; resolution only rejects unsupported
/// versions and substitutes theme/title defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SectionConfig {
    sections: HashMap<String, ResolvedSection>,
}

impl SectionConfig {
    /// Resolves raw configuration data.
    ///
    /// Fails only on an unsupported `format_version`; everything else is
    /// handled leniently, with problems reported through `warnings`.
    pub fn resolve(
        data: SectionConfigData,
        warnings: &mut Vec<ConfigWarning>,
    ) -> Result<Self, ConfigError> {
        if data.format_version != SUPPORTED_FORMAT_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: data.format_version,
            });
        }

        let themes: HashMap<String, Theme> = data
            .themes
            .into_iter()
            .map(|(name, def)| {
                let color = def.color.unwrap_or_else(|| String::from("black"));
                (name.clone(), Theme { name, color })
            })
            .collect();
        let default_theme = themes
            .get("default")
            .cloned()
            .unwrap_or_else(Theme::fallback);

        let mut sections = HashMap::new();
        for (name, def) in data.categories {
            let theme = match &def.theme {
                None => default_theme.clone(),
                Some(wanted) => match themes.get(wanted) {
                    Some(theme) => theme.clone(),
                    None => {
                        let warning = ConfigWarning::MissingTheme {
                            section: name.clone(),
                            theme: wanted.clone(),
                        };
                        log::warn!("{warning}");
                        warnings.push(warning);
                        default_theme.clone()
                    }
                },
            };
            sections.insert(
                name,
                ResolvedSection {
                    title: def.title.unwrap_or_else(|| String::from("Untitled Section")),
                    group_keys: def.group_key.iter().map(ToString::to_string).collect(),
                    theme,
                    children: def.children,
                },
            );
        }
        Ok(Self { sections })
    }

    /// Looks up a resolved section by name.
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&ResolvedSection> {
        self.sections.get(name)
    }

    /// Returns `true` if no sections were configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// Fatal configuration problem; the load is rejected whole and any live tree
/// stays untouched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The data declares a format version this crate does not read.
    UnsupportedVersion {
        /// The declared version.
        found: u32,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedVersion { found } => write!(
                f,
                "unsupported section configuration version {found} (expected {SUPPORTED_FORMAT_VERSION})"
            ),
        }
    }
}

impl core::error::Error for ConfigError {}

/// Non-fatal configuration problem.
///
/// Warnings are logged as they are found and additionally collected into the
/// per-operation list returned by configuration entry points, so one bad
/// reference does not hide the others.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigWarning {
    /// No section named `"root"` exists; the tree is empty.
    MissingRoot,
    /// A configured child section is not defined.
    MissingSection {
        /// The missing section's name.
        name: String,
        /// The section whose `children` referenced it.
        referenced_by: String,
    },
    /// A section references a group the registry does not hold.
    MissingGroup {
        /// The referencing section.
        section: String,
        /// The missing group's name.
        group: String,
    },
    /// A section references a theme the palette does not hold.
    MissingTheme {
        /// The referencing section.
        section: String,
        /// The missing theme's name.
        theme: String,
    },
    /// A section appears in its own ancestor chain; the edge is skipped.
    CycleDetected {
        /// The section whose re-occurrence closed the cycle.
        section: String,
    },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRoot => write!(f, "no \"root\" section is configured"),
            Self::MissingSection {
                name,
                referenced_by,
            } => write!(f, "section {referenced_by:?} references missing section {name:?}"),
            Self::MissingGroup { section, group } => {
                write!(f, "section {section:?} references missing group {group:?}")
            }
            Self::MissingTheme { section, theme } => {
                write!(f, "section {section:?} references missing theme {theme:?}")
            }
            Self::CycleDetected { section } => {
                write!(f, "section {section:?} appears in its own ancestor chain; edge skipped")
            }
        }
    }
}
