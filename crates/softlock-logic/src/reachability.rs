//! Reachability engine — BFS closure over capability-gated links and the
//! multi-profile validation report built on top of it.
//!
//! The graph is only ever borrowed immutably here. Each profile evaluation
//! owns its own queue and visited set, so profiles are evaluated in
//! parallel (rayon, `parallel` feature) and merged back in profile order.
//!
//! ```
//! use softlock_logic::capability::{Ability, AgentCapabilities, Polarity};
//! use softlock_logic::graph::{Link, Node, Vec3, WorldGraph};
//! use softlock_logic::reachability::compute_reachable_set;
//!
//! let mut world = WorldGraph::new();
//! for id in 1..=3 {
//!     world.add_node(Node::new(id, Vec3::default())).unwrap();
//! }
//! world.add_link(Link::bidirectional(1, 2)).unwrap();
//! world.add_link(Link::one_way(2, 3).requiring_ability(Ability::DASH)).unwrap();
//!
//! let walker = AgentCapabilities::new("NoAbilities", Polarity::NONE, Ability::NONE, 0.0);
//! let reached = compute_reachable_set(&world, 1, &walker);
//! assert!(reached.contains(&2) && !reached.contains(&3));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use crate::capability::{canonical_profiles, Ability, AgentCapabilities, Polarity};
use crate::graph::{NodeId, WorldGraph, INVALID_NODE_ID};
use crate::traversal::can_traverse;

/// Category of a validation issue.
///
/// A blocked hard gate on the edge of a profile's reachable region is
/// reported as exactly one of `RequiresUnavailablePolarity`,
/// `RequiresUnavailableAbility` or `HardGateBlocking`, depending on which
/// masks the profile is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueType {
    /// Active node outside a profile's reachable set.
    UnreachableNode,
    /// Hard gate blocked only by missing polarity bits.
    RequiresUnavailablePolarity,
    /// Hard gate blocked only by missing ability bits.
    RequiresUnavailableAbility,
    /// Weakly connected component that does not contain the start node.
    IsolatedComponent,
    /// Reserved for host-produced issues; never emitted by the engine.
    CyclicDependency,
    /// Active node with no link to another active node.
    MissingConnection,
    /// Hard gate blocked by missing polarity and ability bits together.
    /// Gates missing only one kind use the two `RequiresUnavailable*`
    /// variants instead.
    HardGateBlocking,
}

/// A single finding in a validation report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub issue_type: IssueType,
    pub node_id: NodeId,
    /// Secondary node (start node, blocked link source, ...); 0 if none.
    pub related_node_id: NodeId,
    pub required_polarity: Polarity,
    pub required_ability: Ability,
    /// Label of the profile that produced the issue, if profile-specific.
    pub profile: Option<String>,
    pub description: String,
}

impl Issue {
    fn new(issue_type: IssueType, node_id: NodeId, description: String) -> Self {
        Self {
            issue_type,
            node_id,
            related_node_id: INVALID_NODE_ID,
            required_polarity: Polarity::NONE,
            required_ability: Ability::NONE,
            profile: None,
            description,
        }
    }
}

/// Result of one validation run. Owned by the caller; holds no graph borrows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub total_nodes: usize,
    pub total_links: usize,
    /// Start node every profile was evaluated from (`None` for an empty report).
    pub start_node_id: Option<NodeId>,
    /// Union of unreachable nodes across all evaluated profiles.
    pub unreachable_node_ids: BTreeSet<NodeId>,
    pub isolated_component_count: usize,
    pub issues: Vec<Issue>,
}

impl ValidationReport {
    /// One component, nothing unreachable under any profile.
    pub fn is_fully_connected(&self) -> bool {
        self.isolated_component_count == 1 && self.unreachable_node_ids.is_empty()
    }

    pub fn unreachable_count(&self) -> usize {
        self.unreachable_node_ids.len()
    }

    pub fn issues_of(&self, issue_type: IssueType) -> impl Iterator<Item = &Issue> + '_ {
        self.issues.iter().filter(move |i| i.issue_type == issue_type)
    }
}

/// Neighbours of `current` that `capabilities` can step to right now.
///
/// Links into unknown or inactive nodes are dead ends.
pub(crate) fn passable_neighbors<'a>(
    graph: &'a WorldGraph,
    current: NodeId,
    capabilities: &'a AgentCapabilities,
) -> impl Iterator<Item = NodeId> + 'a {
    graph
        .traversable_links(current)
        .filter(move |&(link, dest)| {
            if !graph.is_active(dest) {
                log::trace!("Link #{}→#{} is a dead end", current, dest);
                return false;
            }
            can_traverse(link, capabilities, current)
        })
        .map(|(_, dest)| dest)
}

/// BFS closure of nodes reachable from `start` under `capabilities`.
///
/// Contains `start` whenever `start` is an active node; empty otherwise.
pub fn compute_reachable_set(
    graph: &WorldGraph,
    start: NodeId,
    capabilities: &AgentCapabilities,
) -> HashSet<NodeId> {
    let mut visited = HashSet::new();
    if !graph.is_active(start) {
        return visited;
    }
    let mut queue = VecDeque::new();
    visited.insert(start);
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        for next in passable_neighbors(graph, current, capabilities) {
            if visited.insert(next) {
                queue.push_back(next);
            }
        }
    }
    visited
}

/// Per-profile findings, merged into the report in profile order.
struct ProfileEvaluation {
    unreachable: Vec<NodeId>,
    issues: Vec<Issue>,
}

fn evaluate_profile(
    graph: &WorldGraph,
    start: NodeId,
    profile: &AgentCapabilities,
) -> ProfileEvaluation {
    let reachable = compute_reachable_set(graph, start, profile);
    let mut issues = Vec::new();

    let unreachable: Vec<NodeId> = graph
        .active_node_ids()
        .filter(|id| !reachable.contains(id))
        .collect();

    for &id in &unreachable {
        let mut issue = Issue::new(
            IssueType::UnreachableNode,
            id,
            format!(
                "[{}] Node #{} unreachable from start #{}",
                profile.label, id, start
            ),
        );
        issue.related_node_id = start;
        issue.profile = Some(profile.label.clone());
        issues.push(issue);
    }

    // Frontier: blocked links leading out of the reachable region.
    for from in graph.active_node_ids().filter(|id| reachable.contains(id)) {
        for (link, dest) in graph.traversable_links(from) {
            if reachable.contains(&dest)
                || !graph.is_active(dest)
                || can_traverse(link, profile, from)
            {
                continue;
            }
            let missing_polarity = link
                .required_polarity
                .missing_from(profile.available_polarity);
            let missing_ability = link.required_ability.missing_from(profile.available_ability);
            let issue_type = match (missing_polarity.is_empty(), missing_ability.is_empty()) {
                (false, true) => IssueType::RequiresUnavailablePolarity,
                (true, false) => IssueType::RequiresUnavailableAbility,
                (false, false) => IssueType::HardGateBlocking,
                (true, true) => continue,
            };
            let mut issue = Issue::new(
                issue_type,
                dest,
                format!(
                    "[{}] Hard gate #{}→#{} needs polarity {} / ability {}",
                    profile.label, from, dest, missing_polarity, missing_ability
                ),
            );
            issue.related_node_id = from;
            issue.required_polarity = missing_polarity;
            issue.required_ability = missing_ability;
            issue.profile = Some(profile.label.clone());
            issues.push(issue);
        }
    }

    log::debug!(
        "Profile '{}': {} of {} active nodes reachable from #{}",
        profile.label,
        reachable.len(),
        reachable.len() + unreachable.len(),
        start
    );

    ProfileEvaluation {
        unreachable,
        issues,
    }
}

#[cfg(feature = "parallel")]
fn evaluate_profiles(
    graph: &WorldGraph,
    start: NodeId,
    profiles: &[AgentCapabilities],
) -> Vec<ProfileEvaluation> {
    use rayon::prelude::*;
    profiles
        .par_iter()
        .map(|profile| evaluate_profile(graph, start, profile))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn evaluate_profiles(
    graph: &WorldGraph,
    start: NodeId,
    profiles: &[AgentCapabilities],
) -> Vec<ProfileEvaluation> {
    profiles
        .iter()
        .map(|profile| evaluate_profile(graph, start, profile))
        .collect()
}

/// Weakly connected components of active nodes, ignoring gates and link
/// direction. Components are ordered by their first node in insertion order.
pub fn connected_components(graph: &WorldGraph) -> Vec<Vec<NodeId>> {
    let mut adj: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
    for link in graph.all_links() {
        let (a, b) = (link.from_node_id, link.to_node_id);
        if a == b || !graph.is_active(a) || !graph.is_active(b) {
            continue;
        }
        adj.entry(a).or_default().push(b);
        adj.entry(b).or_default().push(a);
    }

    let mut seen = HashSet::new();
    let mut components = Vec::new();
    for root in graph.active_node_ids() {
        if !seen.insert(root) {
            continue;
        }
        let mut component = vec![root];
        let mut queue = VecDeque::from([root]);
        while let Some(current) = queue.pop_front() {
            if let Some(neighbors) = adj.get(&current) {
                for &next in neighbors {
                    if seen.insert(next) {
                        component.push(next);
                        queue.push_back(next);
                    }
                }
            }
        }
        components.push(component);
    }
    components
}

fn missing_connection_issues(graph: &WorldGraph) -> Vec<Issue> {
    if graph.active_node_count() < 2 {
        return Vec::new();
    }
    // Only links between two distinct active nodes count, matching
    // `connected_components`.
    let mut touched = HashSet::new();
    for link in graph.all_links() {
        let (a, b) = (link.from_node_id, link.to_node_id);
        if a != b && graph.is_active(a) && graph.is_active(b) {
            touched.insert(a);
            touched.insert(b);
        }
    }
    graph
        .active_node_ids()
        .filter(|id| !touched.contains(id))
        .map(|id| Issue::new(IssueType::MissingConnection, id, format!("Node #{} has no links", id)))
        .collect()
}

/// Validate `graph` against each profile (the canonical five when `None`).
///
/// All profiles start from the first active node in insertion order. A
/// graph with no active node yields an empty report.
pub fn generate_validation_report(
    graph: &WorldGraph,
    profiles: Option<&[AgentCapabilities]>,
) -> ValidationReport {
    let Some(start) = graph.first_active_node() else {
        log::debug!("No active nodes; returning empty report");
        return ValidationReport::default();
    };
    let canonical;
    let profiles = match profiles {
        Some(p) => p,
        None => {
            canonical = canonical_profiles();
            &canonical
        }
    };

    let mut report = ValidationReport {
        total_nodes: graph.node_count(),
        total_links: graph.link_count(),
        start_node_id: Some(start),
        ..Default::default()
    };

    for evaluation in evaluate_profiles(graph, start, profiles) {
        report.unreachable_node_ids.extend(evaluation.unreachable);
        report.issues.extend(evaluation.issues);
    }

    report.issues.extend(missing_connection_issues(graph));

    let components = connected_components(graph);
    report.isolated_component_count = components.len();
    for component in components.iter().filter(|c| !c.contains(&start)) {
        let representative = component.iter().copied().min().unwrap_or(INVALID_NODE_ID);
        let mut issue = Issue::new(
            IssueType::IsolatedComponent,
            representative,
            format!(
                "Component of {} node(s) around #{} is disconnected from start #{}",
                component.len(),
                representative,
                start
            ),
        );
        issue.related_node_id = start;
        report.issues.push(issue);
    }

    log::debug!(
        "Validation: {} nodes, {} links, {} unreachable, {} component(s), {} issue(s)",
        report.total_nodes,
        report.total_links,
        report.unreachable_node_ids.len(),
        report.isolated_component_count,
        report.issues.len()
    );
    report
}
