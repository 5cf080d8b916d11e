// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The live section update tree.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use hashbrown::{HashMap, HashSet};
use waymark_checks::CheckStore;
use waymark_entrances::EntranceResolver;
use waymark_groups::GroupRegistry;
use waymark_notify::{KeyedSubscribers, SubscriptionId};
use waymark_tags::TagStore;

use crate::config::{ConfigError, ConfigWarning, SectionConfig, SectionConfigData, Theme};
use crate::report::CheckReport;
use crate::status::SectionStatus;

/// The stores a tree operation reads from.
///
/// Handed in by the owner on every call instead of being captured at
/// construction, so the tree holds no references and the owner keeps a single
/// mutation funnel over all stores.
#[derive(Copy, Clone, Debug)]
pub struct Stores<'a> {
    /// Check statuses.
    pub checks: &'a CheckStore,
    /// The tag catalog, consulted for counter descriptors.
    pub tags: &'a TagStore,
    /// Group definitions the sections bind to.
    pub groups: &'a GroupRegistry,
    /// Entrance resolutions for portal nodes.
    pub entrances: &'a EntranceResolver,
}

/// Arena index of one live node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
struct NodeId(u32);

#[derive(Debug)]
enum NodeKind {
    Section,
    Portal { entrance: String },
}

#[derive(Debug)]
struct Node {
    name: String,
    kind: NodeKind,
    title: String,
    theme: Theme,
    /// The node's own (immediate) member checks.
    checks: HashSet<String>,
    report: CheckReport,
    children: Vec<NodeId>,
    parents: Vec<NodeId>,
}

/// The section update engine.
///
/// Nodes live in an arena addressed by integer ids with explicit parent and
/// child id lists. The tree indexes which nodes depend on which check and
/// entrance names; the owner routes every store mutation through
/// [`on_check_updated`](Self::on_check_updated) /
/// [`on_entrance_updated`](Self::on_entrance_updated), and each affected node
/// recomputes its report, republishes its [`SectionStatus`], and propagates to
/// its parents before the call returns.
///
/// Sections referenced by more than one parent share a single node; a node is
/// torn down once it loses its last parent.
#[derive(Debug, Default)]
pub struct SectionTree {
    nodes: Vec<Option<Node>>,
    free: Vec<u32>,
    by_name: HashMap<String, NodeId>,
    root: Option<NodeId>,
    /// Retained for rebuilds after a group reload or session reset.
    config: Option<SectionConfig>,
    check_watchers: HashMap<String, HashSet<NodeId>>,
    entrance_watchers: HashMap<String, HashSet<NodeId>>,
    statuses: HashMap<String, SectionStatus>,
    subscribers: KeyedSubscribers<String>,
    publish_version: u64,
}

impl SectionTree {
    /// Creates an empty tree with no configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the configuration wholesale and rebuilds the tree.
    ///
    /// The data is validated first; on an unsupported version the previous
    /// generation stays live and untouched. Otherwise the old tree is torn
    /// down (listeners for its section names fire once, statuses clear), and
    /// the new tree is built rooted at `"root"`. No mixed-generation status
    /// is ever observable.
    ///
    /// Structural problems warn and are returned; they never abort the build.
    pub fn set_configuration(
        &mut self,
        data: SectionConfigData,
        stores: &Stores<'_>,
    ) -> Result<Vec<ConfigWarning>, ConfigError> {
        let mut warnings = Vec::new();
        let config = SectionConfig::resolve(data, &mut warnings)?;
        self.clear_tree();
        self.config = Some(config);
        self.build(stores, &mut warnings);
        Ok(warnings)
    }

    /// Tears down and rebuilds from the retained configuration.
    ///
    /// Used after a group reload or a session reset invalidated every bound
    /// check set. A no-op when no configuration was ever applied.
    pub fn rebuild(&mut self, stores: &Stores<'_>) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        if self.config.is_some() {
            self.clear_tree();
            self.build(stores, &mut warnings);
        }
        warnings
    }

    /// Recomputes every node depending on check `name` and propagates.
    pub fn on_check_updated(&mut self, name: &str, stores: &Stores<'_>) {
        let Some(ids) = self.check_watchers.get(name) else {
            return;
        };
        for id in ids.clone() {
            self.update_node(id, stores);
        }
    }

    /// Re-binds every portal depending on `entrance` and propagates.
    ///
    /// Each affected portal swaps its check watchers from the old destination
    /// group's checks to the new one's before recomputing.
    pub fn on_entrance_updated(&mut self, entrance: &str, stores: &Stores<'_>) {
        let Some(ids) = self.entrance_watchers.get(entrance) else {
            return;
        };
        for id in ids.clone() {
            self.bind_portal(id, stores);
            self.update_node(id, stores);
        }
    }

    /// Returns the latest published snapshot for a section.
    #[must_use]
    pub fn status(&self, name: &str) -> Option<&SectionStatus> {
        self.statuses.get(name)
    }

    /// Registers a listener for one section name.
    pub fn subscribe(&mut self, name: &str, listener: impl FnMut() + 'static) -> SubscriptionId {
        self.subscribers.subscribe(name.to_string(), listener)
    }

    /// Removes a subscription. Idempotent.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    /// Returns the number of listeners registered for `name`.
    #[must_use]
    pub fn listener_count(&self, name: &str) -> usize {
        self.subscribers.listener_count(&name.to_string())
    }

    /// Returns how many live nodes depend on check `name`.
    #[must_use]
    pub fn watcher_count(&self, name: &str) -> usize {
        self.check_watchers.get(name).map_or(0, HashSet::len)
    }

    /// Returns how many live portals depend on `entrance`.
    #[must_use]
    pub fn entrance_watcher_count(&self, entrance: &str) -> usize {
        self.entrance_watchers.get(entrance).map_or(0, HashSet::len)
    }

    fn build(&mut self, stores: &Stores<'_>, warnings: &mut Vec<ConfigWarning>) {
        let Some(config) = self.config.take() else {
            return;
        };
        if config.section("root").is_none() {
            let warning = ConfigWarning::MissingRoot;
            log::warn!("{warning}");
            warnings.push(warning);
            self.config = Some(config);
            return;
        }
        let mut lineage = Vec::new();
        let root = self.build_section("root", &config, &mut lineage, stores, warnings);
        self.config = Some(config);
        self.root = root;
        if let Some(root) = root {
            self.refresh_subtree(root, stores);
        }
    }

    fn build_section(
        &mut self,
        name: &str,
        config: &SectionConfig,
        lineage: &mut Vec<String>,
        stores: &Stores<'_>,
        warnings: &mut Vec<ConfigWarning>,
    ) -> Option<NodeId> {
        if lineage.iter().any(|ancestor| ancestor == name) {
            let warning = ConfigWarning::CycleDetected {
                section: name.to_string(),
            };
            log::warn!("{warning}");
            warnings.push(warning);
            return None;
        }
        // A section already built under another parent is shared, not
        // duplicated; the caller adds the extra parent edge.
        if let Some(&id) = self.by_name.get(name) {
            return Some(id);
        }
        let Some(def) = config.section(name) else {
            let warning = ConfigWarning::MissingSection {
                name: name.to_string(),
                referenced_by: lineage.last().cloned().unwrap_or_default(),
            };
            log::warn!("{warning}");
            warnings.push(warning);
            return None;
        };
        let def = def.clone();

        let id = self.alloc(Node {
            name: name.to_string(),
            kind: NodeKind::Section,
            title: def.title,
            theme: def.theme,
            checks: HashSet::new(),
            report: CheckReport::new(),
            children: Vec::new(),
            parents: Vec::new(),
        });
        self.by_name.insert(name.to_string(), id);

        let mut checks = HashSet::new();
        let mut exits = Vec::new();
        for group_name in &def.group_keys {
            match stores.groups.group(group_name) {
                Some(group) => {
                    checks.extend(group.checks.iter().cloned());
                    exits.extend(group.exits.iter().cloned());
                }
                None => {
                    let warning = ConfigWarning::MissingGroup {
                        section: name.to_string(),
                        group: group_name.clone(),
                    };
                    log::warn!("{warning}");
                    warnings.push(warning);
                }
            }
        }
        for check in &checks {
            self.check_watchers
                .entry(check.clone())
                .or_default()
                .insert(id);
        }
        if let Some(node) = self.node_mut(id) {
            node.checks = checks;
        }

        exits.sort_unstable();
        for entrance in exits {
            if let Some(portal) = self.build_portal(&entrance, stores) {
                self.link(id, portal);
            }
        }

        lineage.push(name.to_string());
        for child in &def.children {
            if let Some(child_id) = self.build_section(child, config, lineage, stores, warnings) {
                self.link(id, child_id);
            }
        }
        lineage.pop();

        Some(id)
    }

    fn build_portal(&mut self, entrance: &str, stores: &Stores<'_>) -> Option<NodeId> {
        if let Some(&id) = self.by_name.get(entrance) {
            return Some(id);
        }
        let id = self.alloc(Node {
            name: entrance.to_string(),
            kind: NodeKind::Portal {
                entrance: entrance.to_string(),
            },
            title: entrance.to_string(),
            theme: Theme::fallback(),
            checks: HashSet::new(),
            report: CheckReport::new(),
            children: Vec::new(),
            parents: Vec::new(),
        });
        self.by_name.insert(entrance.to_string(), id);
        self.entrance_watchers
            .entry(entrance.to_string())
            .or_default()
            .insert(id);
        self.bind_portal(id, stores);
        Some(id)
    }

    /// Points a portal's checks at its entrance's current destination group.
    ///
    /// An unresolved entrance binds no checks and keeps the entrance name as
    /// title; a resolved one adopts the destination region's group and takes
    /// the region name as title.
    fn bind_portal(&mut self, id: NodeId, stores: &Stores<'_>) {
        let (entrance, old_checks) = match self.node(id) {
            Some(node) => match &node.kind {
                NodeKind::Portal { entrance } => (
                    entrance.clone(),
                    node.checks.iter().cloned().collect::<Vec<_>>(),
                ),
                NodeKind::Section => return,
            },
            None => return,
        };
        for check in &old_checks {
            detach_watcher(&mut self.check_watchers, check, id);
        }

        let mut title = entrance.clone();
        let mut checks = HashSet::new();
        if let Some(region) = stores.entrances.destination(&entrance)
            && let Some(group_name) = stores.groups.group_for_region(region)
            && let Some(group) = stores.groups.group(group_name)
        {
            title = region.to_string();
            checks = group.checks.clone();
        }
        for check in &checks {
            self.check_watchers
                .entry(check.clone())
                .or_default()
                .insert(id);
        }
        if let Some(node) = self.node_mut(id) {
            node.title = title;
            node.checks = checks;
        }
    }

    /// Post-order refresh: children settle before the parent folds them in.
    fn refresh_subtree(&mut self, id: NodeId, stores: &Stores<'_>) {
        let children = match self.node(id) {
            Some(node) => node.children.clone(),
            None => return,
        };
        for child in children {
            self.refresh_subtree(child, stores);
        }
        self.recompute(id, stores);
        self.publish(id, stores);
    }

    /// Recomputes one node and propagates through its parent chain.
    ///
    /// Children are never recomputed here: a change reaches a parent only
    /// after the changed node itself has settled, so folding in the children's
    /// existing reports is always current. Bounded by the tree depth since
    /// cycles are rejected at build time.
    fn update_node(&mut self, id: NodeId, stores: &Stores<'_>) {
        self.recompute(id, stores);
        self.publish(id, stores);
        let parents = match self.node(id) {
            Some(node) => node.parents.clone(),
            None => return,
        };
        for parent in parents {
            self.update_node(parent, stores);
        }
    }

    fn recompute(&mut self, id: NodeId, stores: &Stores<'_>) {
        let (checks, children) = match self.node(id) {
            Some(node) => (
                node.checks.iter().cloned().collect::<Vec<_>>(),
                node.children.clone(),
            ),
            None => return,
        };
        let mut report = CheckReport::new();
        for name in &checks {
            report.add_check(name, stores.checks.get_status(name), stores.tags);
        }
        for child in children {
            if let Some(child_node) = self.node(child) {
                report.merge(&child_node.report);
            }
        }
        if let Some(node) = self.node_mut(id) {
            node.report = report;
        }
    }

    fn publish(&mut self, id: NodeId, stores: &Stores<'_>) {
        let (name, mut status) = {
            let Some(node) = self.node(id) else {
                return;
            };
            let checks = node
                .checks
                .iter()
                .map(|check| (check.clone(), stores.checks.get_status(check).clone()))
                .collect();
            let children = node
                .children
                .iter()
                .filter_map(|child| self.node(*child))
                .map(|child| child.name.clone())
                .collect();
            (
                node.name.clone(),
                SectionStatus {
                    title: node.title.clone(),
                    theme: node.theme.clone(),
                    report: node.report.clone(),
                    checks,
                    children,
                    version: 0,
                },
            )
        };
        self.publish_version = self.publish_version.wrapping_add(1);
        status.version = self.publish_version;
        self.statuses.insert(name.clone(), status);
        self.subscribers.notify(&name);
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        if let Some(node) = self.node_mut(parent)
            && !node.children.contains(&child)
        {
            node.children.push(child);
        }
        if let Some(node) = self.node_mut(child)
            && !node.parents.contains(&parent)
        {
            node.parents.push(parent);
        }
    }

    fn clear_tree(&mut self) {
        if let Some(root) = self.root.take() {
            self.release(root);
        }
        let names: Vec<String> = self.statuses.keys().cloned().collect();
        self.statuses.clear();
        self.subscribers.notify_many(names.iter());
    }

    /// Tears down one node whose last parent edge is gone, cascading into
    /// children that become orphaned in turn. Releasing an already-freed id
    /// is a no-op.
    fn release(&mut self, id: NodeId) {
        let Some(node) = self.take(id) else {
            return;
        };
        if self.by_name.get(&node.name) == Some(&id) {
            self.by_name.remove(&node.name);
        }
        for check in &node.checks {
            detach_watcher(&mut self.check_watchers, check, id);
        }
        if let NodeKind::Portal { entrance } = &node.kind {
            detach_watcher(&mut self.entrance_watchers, entrance, id);
        }
        for child in node.children {
            let orphaned = match self.node_mut(child) {
                Some(child_node) => {
                    child_node.parents.retain(|parent| *parent != id);
                    child_node.parents.is_empty()
                }
                None => false,
            };
            if orphaned {
                self.release(child);
            }
        }
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        if let Some(index) = self.free.pop() {
            self.nodes[index as usize] = Some(node);
            NodeId(index)
        } else {
            let index = self.nodes.len() as u32;
            self.nodes.push(Some(node));
            NodeId(index)
        }
    }

    fn take(&mut self, id: NodeId) -> Option<Node> {
        let node = self.nodes.get_mut(id.0 as usize).and_then(Option::take)?;
        self.free.push(id.0);
        Some(node)
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0 as usize).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0 as usize).and_then(Option::as_mut)
    }
}

fn detach_watcher(map: &mut HashMap<String, HashSet<NodeId>>, key: &str, id: NodeId) {
    if let Some(ids) = map.get_mut(key) {
        ids.remove(&id);
        if ids.is_empty() {
            map.remove(key);
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::config::ConfigError;
    use alloc::vec;
    use std::cell::Cell;
    use std::rc::Rc;
    use waymark_checks::CheckUpdate;
    use waymark_groups::{GroupData, GroupDef};

    fn groups() -> GroupRegistry {
        let data: GroupData = [
            (
                "prime".to_string(),
                GroupDef {
                    checks: vec!["L2".into(), "L3".into(), "L5".into(), "L7".into()],
                    exits: vec![],
                    region: Some("Primes".into()),
                },
            ),
            (
                "composite".to_string(),
                GroupDef {
                    checks: vec!["L4".into(), "L6".into(), "L8".into(), "L9".into()],
                    exits: vec![],
                    region: Some("Composites".into()),
                },
            ),
        ]
        .into_iter()
        .collect();
        let mut registry = GroupRegistry::new();
        registry.load_groups(data);
        registry
    }

    fn number_config() -> SectionConfigData {
        serde_json::from_str(
            r#"{
                "categories": {
                    "root": { "title": "All", "children": ["primes", "composites"] },
                    "primes": { "title": "Primes", "groupKey": "prime" },
                    "composites": { "title": "Composites", "groupKey": "composite" }
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn checked_leaf_reaches_section_and_root() {
        let mut checks = CheckStore::new();
        let tags = TagStore::new();
        let groups = groups();
        let entrances = EntranceResolver::new();
        let mut tree = SectionTree::new();

        let warnings = tree
            .set_configuration(
                number_config(),
                &Stores {
                    checks: &checks,
                    tags: &tags,
                    groups: &groups,
                    entrances: &entrances,
                },
            )
            .unwrap();
        assert!(warnings.is_empty());

        checks.update_status("L2", CheckUpdate::new().exists(true).checked(true));
        tree.on_check_updated(
            "L2",
            &Stores {
                checks: &checks,
                tags: &tags,
                groups: &groups,
                entrances: &entrances,
            },
        );

        let primes = tree.status("primes").unwrap();
        assert!(primes.report.checked.contains("L2"));
        assert_eq!(primes.report.checked.len(), 1);
        // The root folds in the children's reports.
        let root = tree.status("root").unwrap();
        assert!(root.report.checked.contains("L2"));
        // The sibling is untouched.
        assert!(tree.status("composites").unwrap().report.checked.is_empty());
    }

    #[test]
    fn listeners_fire_on_propagation() {
        let mut checks = CheckStore::new();
        let tags = TagStore::new();
        let groups = groups();
        let entrances = EntranceResolver::new();
        let mut tree = SectionTree::new();
        tree.set_configuration(
            number_config(),
            &Stores {
                checks: &checks,
                tags: &tags,
                groups: &groups,
                entrances: &entrances,
            },
        )
        .unwrap();

        let hits = Rc::new(Cell::new(0));
        let inner = Rc::clone(&hits);
        tree.subscribe("root", move || inner.set(inner.get() + 1));

        checks.update_status("L2", CheckUpdate::new().exists(true));
        tree.on_check_updated(
            "L2",
            &Stores {
                checks: &checks,
                tags: &tags,
                groups: &groups,
                entrances: &entrances,
            },
        );
        assert_eq!(hits.get(), 1);

        // A name no live node watches is a no-op.
        tree.on_check_updated(
            "L99",
            &Stores {
                checks: &checks,
                tags: &tags,
                groups: &groups,
                entrances: &entrances,
            },
        );
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn status_versions_increase_per_publication() {
        let mut checks = CheckStore::new();
        let tags = TagStore::new();
        let groups = groups();
        let entrances = EntranceResolver::new();
        let mut tree = SectionTree::new();
        tree.set_configuration(
            number_config(),
            &Stores {
                checks: &checks,
                tags: &tags,
                groups: &groups,
                entrances: &entrances,
            },
        )
        .unwrap();
        let before = tree.status("primes").unwrap().version();

        checks.update_status("L2", CheckUpdate::new().exists(true));
        tree.on_check_updated(
            "L2",
            &Stores {
                checks: &checks,
                tags: &tags,
                groups: &groups,
                entrances: &entrances,
            },
        );
        assert!(tree.status("primes").unwrap().version() > before);
    }

    #[test]
    fn missing_references_warn_and_are_skipped() {
        let checks = CheckStore::new();
        let tags = TagStore::new();
        let groups = groups();
        let entrances = EntranceResolver::new();
        let mut tree = SectionTree::new();

        let data: SectionConfigData = serde_json::from_str(
            r#"{
                "categories": {
                    "root": { "groupKey": "nope", "children": ["ghost", "primes"] },
                    "primes": { "groupKey": "prime" }
                }
            }"#,
        )
        .unwrap();
        let warnings = tree
            .set_configuration(
                data,
                &Stores {
                    checks: &checks,
                    tags: &tags,
                    groups: &groups,
                    entrances: &entrances,
                },
            )
            .unwrap();

        assert!(warnings.contains(&ConfigWarning::MissingGroup {
            section: "root".to_string(),
            group: "nope".to_string(),
        }));
        assert!(warnings.contains(&ConfigWarning::MissingSection {
            name: "ghost".to_string(),
            referenced_by: "root".to_string(),
        }));
        // The rest of the tree built normally.
        assert!(tree.status("primes").is_some());
        assert_eq!(tree.status("root").unwrap().children, vec!["primes"]);
    }

    #[test]
    fn cycles_are_cut_per_edge() {
        let checks = CheckStore::new();
        let tags = TagStore::new();
        let groups = groups();
        let entrances = EntranceResolver::new();
        let mut tree = SectionTree::new();

        let data: SectionConfigData = serde_json::from_str(
            r#"{
                "categories": {
                    "root": { "children": ["a"] },
                    "a": { "groupKey": "prime", "children": ["b"] },
                    "b": { "children": ["a"] }
                }
            }"#,
        )
        .unwrap();
        let warnings = tree
            .set_configuration(
                data,
                &Stores {
                    checks: &checks,
                    tags: &tags,
                    groups: &groups,
                    entrances: &entrances,
                },
            )
            .unwrap();

        assert!(warnings.contains(&ConfigWarning::CycleDetected {
            section: "a".to_string(),
        }));
        // Both sections still exist; only the closing edge was dropped.
        assert!(tree.status("a").is_some());
        assert!(tree.status("b").unwrap().children.is_empty());
    }

    #[test]
    fn shared_child_is_one_node_counted_at_both_parents() {
        let mut checks = CheckStore::new();
        let tags = TagStore::new();
        let groups = groups();
        let entrances = EntranceResolver::new();
        let mut tree = SectionTree::new();

        let data: SectionConfigData = serde_json::from_str(
            r#"{
                "categories": {
                    "root": { "children": ["left", "right"] },
                    "left": { "children": ["shared"] },
                    "right": { "children": ["shared"] },
                    "shared": { "groupKey": "prime" }
                }
            }"#,
        )
        .unwrap();
        tree.set_configuration(
            data,
            &Stores {
                checks: &checks,
                tags: &tags,
                groups: &groups,
                entrances: &entrances,
            },
        )
        .unwrap();
        // One node, so one watcher per check.
        assert_eq!(tree.watcher_count("L2"), 1);

        checks.update_status("L2", CheckUpdate::new().exists(true).checked(true));
        tree.on_check_updated(
            "L2",
            &Stores {
                checks: &checks,
                tags: &tags,
                groups: &groups,
                entrances: &entrances,
            },
        );
        for section in ["left", "right", "root"] {
            assert!(tree.status(section).unwrap().report.checked.contains("L2"));
        }
        // Set union at the shared ancestor, so still a single entry.
        assert_eq!(tree.status("root").unwrap().report.checked.len(), 1);
    }

    #[test]
    fn reconfiguration_releases_old_watchers() {
        let checks = CheckStore::new();
        let tags = TagStore::new();
        let groups = groups();
        let entrances = EntranceResolver::new();
        let mut tree = SectionTree::new();
        tree.set_configuration(
            number_config(),
            &Stores {
                checks: &checks,
                tags: &tags,
                groups: &groups,
                entrances: &entrances,
            },
        )
        .unwrap();
        assert_eq!(tree.watcher_count("L2"), 1);

        let hits = Rc::new(Cell::new(0));
        let inner = Rc::clone(&hits);
        tree.subscribe("composites", move || inner.set(inner.get() + 1));

        let data: SectionConfigData = serde_json::from_str(
            r#"{ "categories": { "root": { "groupKey": "prime" } } }"#,
        )
        .unwrap();
        tree.set_configuration(
            data,
            &Stores {
                checks: &checks,
                tags: &tags,
                groups: &groups,
                entrances: &entrances,
            },
        )
        .unwrap();

        // The old node is gone but the root re-bound the same group.
        assert_eq!(tree.watcher_count("L2"), 1);
        assert_eq!(tree.watcher_count("L4"), 0);
        assert!(tree.status("composites").is_none());
        // The teardown notification fired so the observer re-pulls and sees
        // the section is gone.
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn invalid_version_leaves_old_tree_live() {
        let checks = CheckStore::new();
        let tags = TagStore::new();
        let groups = groups();
        let entrances = EntranceResolver::new();
        let mut tree = SectionTree::new();
        tree.set_configuration(
            number_config(),
            &Stores {
                checks: &checks,
                tags: &tags,
                groups: &groups,
                entrances: &entrances,
            },
        )
        .unwrap();

        let data: SectionConfigData =
            serde_json::from_str(r#"{ "formatVersion": 7, "categories": {} }"#).unwrap();
        let err = tree
            .set_configuration(
                data,
                &Stores {
                    checks: &checks,
                    tags: &tags,
                    groups: &groups,
                    entrances: &entrances,
                },
            )
            .unwrap_err();

        assert_eq!(err, ConfigError::UnsupportedVersion { found: 7 });
        assert!(tree.status("primes").is_some());
        assert_eq!(tree.watcher_count("L2"), 1);
    }

    #[test]
    fn portal_adopts_destination_group_when_resolved() {
        let mut checks = CheckStore::new();
        let tags = TagStore::new();
        let mut entrances = EntranceResolver::new();
        let mut tree = SectionTree::new();

        let data: GroupData = [
            (
                "hub".to_string(),
                GroupDef {
                    checks: vec!["Hub Chest".into()],
                    exits: vec!["Blue Door".into()],
                    region: Some("Hub".into()),
                },
            ),
            (
                "cavern".to_string(),
                GroupDef {
                    checks: vec!["Cave Chest".into()],
                    exits: vec![],
                    region: Some("Cavern".into()),
                },
            ),
        ]
        .into_iter()
        .collect();
        let mut groups = GroupRegistry::new();
        groups.load_groups(data);

        let config: SectionConfigData = serde_json::from_str(
            r#"{ "categories": { "root": { "title": "Hub", "groupKey": "hub" } } }"#,
        )
        .unwrap();
        tree.set_configuration(
            config,
            &Stores {
                checks: &checks,
                tags: &tags,
                groups: &groups,
                entrances: &entrances,
            },
        )
        .unwrap();

        // Unresolved: the portal published itself but binds nothing.
        assert_eq!(tree.entrance_watcher_count("Blue Door"), 1);
        let portal = tree.status("Blue Door").unwrap();
        assert_eq!(portal.title, "Blue Door");
        assert!(portal.checks.is_empty());
        assert_eq!(tree.watcher_count("Cave Chest"), 0);

        entrances.set_destination("Blue Door", Some("Cavern".into()));
        tree.on_entrance_updated(
            "Blue Door",
            &Stores {
                checks: &checks,
                tags: &tags,
                groups: &groups,
                entrances: &entrances,
            },
        );
        let portal = tree.status("Blue Door").unwrap();
        assert_eq!(portal.title, "Cavern");
        assert!(portal.checks.contains_key("Cave Chest"));
        assert_eq!(tree.watcher_count("Cave Chest"), 1);

        // The adopted check now propagates to the root through the portal.
        checks.update_status("Cave Chest", CheckUpdate::new().exists(true).checked(true));
        tree.on_check_updated(
            "Cave Chest",
            &Stores {
                checks: &checks,
                tags: &tags,
                groups: &groups,
                entrances: &entrances,
            },
        );
        assert!(tree.status("root").unwrap().report.checked.contains("Cave Chest"));

        // Re-routing the entrance swaps the watchers away again.
        entrances.set_destination("Blue Door", Some("Hub".into()));
        tree.on_entrance_updated(
            "Blue Door",
            &Stores {
                checks: &checks,
                tags: &tags,
                groups: &groups,
                entrances: &entrances,
            },
        );
        assert_eq!(tree.watcher_count("Cave Chest"), 0);
    }

    #[test]
    fn missing_root_warns_and_builds_nothing() {
        let checks = CheckStore::new();
        let tags = TagStore::new();
        let groups = groups();
        let entrances = EntranceResolver::new();
        let mut tree = SectionTree::new();

        let data: SectionConfigData =
            serde_json::from_str(r#"{ "categories": { "lonely": {} } }"#).unwrap();
        let warnings = tree
            .set_configuration(
                data,
                &Stores {
                    checks: &checks,
                    tags: &tags,
                    groups: &groups,
                    entrances: &entrances,
                },
            )
            .unwrap();

        assert!(warnings.contains(&ConfigWarning::MissingRoot));
        assert!(tree.status("lonely").is_none());
    }

    #[test]
    fn rebuild_rebinds_reloaded_groups() {
        let checks = CheckStore::new();
        let tags = TagStore::new();
        let mut groups = groups();
        let entrances = EntranceResolver::new();
        let mut tree = SectionTree::new();
        tree.set_configuration(
            number_config(),
            &Stores {
                checks: &checks,
                tags: &tags,
                groups: &groups,
                entrances: &entrances,
            },
        )
        .unwrap();

        let data: GroupData = [(
            "prime".to_string(),
            GroupDef {
                checks: vec!["L11".into()],
                exits: vec![],
                region: None,
            },
        )]
        .into_iter()
        .collect();
        groups.load_groups(data);
        let warnings = tree.rebuild(&Stores {
            checks: &checks,
            tags: &tags,
            groups: &groups,
            entrances: &entrances,
        });

        assert_eq!(tree.watcher_count("L2"), 0);
        assert_eq!(tree.watcher_count("L11"), 1);
        // The composite group vanished with the reload.
        assert!(warnings.contains(&ConfigWarning::MissingGroup {
            section: "composites".to_string(),
            group: "composite".to_string(),
        }));
    }
}
