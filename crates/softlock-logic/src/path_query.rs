//! Point-to-point queries over the world graph.
//!
//! `is_path_possible` answers "can this profile get from A to B at all"
//! with an early-exit flood fill. `find_path` returns the fewest-hop route
//! and `cheapest_path` the lowest-cost route under the traversal cost
//! function. `PathQueryCache` memoizes reachable sets for tooling that
//! asks many questions about the same snapshot.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};

use crate::capability::{Ability, AgentCapabilities, Polarity};
use crate::graph::{NodeId, WorldGraph};
use crate::reachability::{compute_reachable_set, passable_neighbors};
use crate::traversal::{calculate_traversal_cost, TraversalCostConfig};

/// Whether `to` is reachable from `from` under `capabilities`.
///
/// Equivalent to `compute_reachable_set(graph, from, caps).contains(&to)`
/// but stops as soon as `to` is found.
pub fn is_path_possible(
    graph: &WorldGraph,
    from: NodeId,
    to: NodeId,
    capabilities: &AgentCapabilities,
) -> bool {
    if !graph.is_active(from) || !graph.is_active(to) {
        return false;
    }
    if from == to {
        return true;
    }
    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    visited.insert(from);
    queue.push_back(from);

    while let Some(current) = queue.pop_front() {
        for next in passable_neighbors(graph, current, capabilities) {
            if next == to {
                return true;
            }
            if visited.insert(next) {
                queue.push_back(next);
            }
        }
    }
    false
}

/// Fewest-hop route from `from` to `to`, inclusive of both ends.
///
/// Returns `Some(vec![from])` when `from == to` and `None` if unreachable.
pub fn find_path(
    graph: &WorldGraph,
    from: NodeId,
    to: NodeId,
    capabilities: &AgentCapabilities,
) -> Option<Vec<NodeId>> {
    if !graph.is_active(from) || !graph.is_active(to) {
        return None;
    }
    if from == to {
        return Some(vec![from]);
    }

    // node → node it was first reached from
    let mut parent: HashMap<NodeId, NodeId> = HashMap::new();
    let mut queue = VecDeque::new();
    parent.insert(from, from);
    queue.push_back(from);

    while let Some(current) = queue.pop_front() {
        for next in passable_neighbors(graph, current, capabilities) {
            if parent.contains_key(&next) {
                continue;
            }
            parent.insert(next, current);
            if next == to {
                return Some(unwind(&parent, from, to));
            }
            queue.push_back(next);
        }
    }
    None
}

fn unwind(parent: &HashMap<NodeId, NodeId>, from: NodeId, to: NodeId) -> Vec<NodeId> {
    let mut path = vec![to];
    let mut cursor = to;
    while cursor != from {
        cursor = parent[&cursor];
        path.push(cursor);
    }
    path.reverse();
    path
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Frontier {
    cost: f32,
    node: NodeId,
}

impl Eq for Frontier {}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap on cost; node id breaks ties deterministically.
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Lowest-cost route and its total cost (Dijkstra).
///
/// Negative link costs are treated as zero. Hard gates the profile cannot
/// pass are excluded; soft gates contribute their inflated cost.
pub fn cheapest_path(
    graph: &WorldGraph,
    from: NodeId,
    to: NodeId,
    capabilities: &AgentCapabilities,
    cost_config: &TraversalCostConfig,
) -> Option<(Vec<NodeId>, f32)> {
    if !graph.is_active(from) || !graph.is_active(to) {
        return None;
    }

    let mut best: HashMap<NodeId, f32> = HashMap::new();
    let mut parent: HashMap<NodeId, NodeId> = HashMap::new();
    let mut heap = BinaryHeap::new();
    best.insert(from, 0.0);
    parent.insert(from, from);
    heap.push(Frontier {
        cost: 0.0,
        node: from,
    });

    while let Some(Frontier { cost, node }) = heap.pop() {
        if node == to {
            return Some((unwind(&parent, from, to), cost));
        }
        if best.get(&node).is_some_and(|&b| cost > b) {
            continue;
        }
        for (link, dest) in graph.traversable_links(node) {
            if !graph.is_active(dest) {
                continue;
            }
            let Some(step) = calculate_traversal_cost(link, capabilities, cost_config) else {
                continue;
            };
            let next_cost = cost + step.max(0.0);
            if best.get(&dest).map_or(true, |&b| next_cost < b) {
                best.insert(dest, next_cost);
                parent.insert(dest, node);
                heap.push(Frontier {
                    cost: next_cost,
                    node: dest,
                });
            }
        }
    }
    None
}

type CacheKey = (NodeId, Polarity, Ability);

/// Memoized reachable sets over one graph snapshot.
///
/// Keyed by (start node, polarity mask, ability mask). Skill and label do
/// not affect reachability, so profiles that differ only there share an
/// entry. The snapshot must not change while the cache is alive, which the
/// shared borrow enforces.
pub struct PathQueryCache<'g> {
    graph: &'g WorldGraph,
    cache: HashMap<CacheKey, HashSet<NodeId>>,
    capacity: usize,
}

impl<'g> PathQueryCache<'g> {
    pub fn new(graph: &'g WorldGraph) -> Self {
        Self::with_capacity(graph, 64)
    }

    pub fn with_capacity(graph: &'g WorldGraph, capacity: usize) -> Self {
        Self {
            graph,
            cache: HashMap::new(),
            capacity: capacity.max(1),
        }
    }

    /// Reachable set from `from` under the profile's masks, computed on
    /// first use.
    pub fn reachable_from(
        &mut self,
        from: NodeId,
        capabilities: &AgentCapabilities,
    ) -> &HashSet<NodeId> {
        let key = (
            from,
            capabilities.available_polarity,
            capabilities.available_ability,
        );
        if !self.cache.contains_key(&key) && self.cache.len() >= self.capacity {
            // Evict an arbitrary entry (HashMap order).
            if let Some(evict) = self.cache.keys().next().copied() {
                self.cache.remove(&evict);
            }
        }
        let graph = self.graph;
        self.cache
            .entry(key)
            .or_insert_with(|| compute_reachable_set(graph, from, capabilities))
    }

    pub fn is_path_possible(
        &mut self,
        from: NodeId,
        to: NodeId,
        capabilities: &AgentCapabilities,
    ) -> bool {
        self.reachable_from(from, capabilities).contains(&to)
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{Ability, Polarity};
    use crate::graph::{Link, Node, Vec3};

    fn walker() -> AgentCapabilities {
        AgentCapabilities::new("Walker", Polarity::NONE, Ability::NONE, 0.0)
    }

    fn dasher() -> AgentCapabilities {
        AgentCapabilities::new("Dasher", Polarity::NONE, Ability::DASH, 1.0)
    }

    fn world(ids: &[NodeId], links: Vec<Link>) -> WorldGraph {
        let mut g = WorldGraph::new();
        for &id in ids {
            g.add_node(Node::new(id, Vec3::default())).unwrap();
        }
        for l in links {
            g.add_link(l).unwrap();
        }
        g
    }

    //     1
    //    / \
    //   2   3
    //   |   |  (3→4 dash-gated)
    //   5 — 4
    fn diamond() -> WorldGraph {
        world(
            &[1, 2, 3, 4, 5],
            vec![
                Link::bidirectional(1, 2).with_cost(1.0),
                Link::bidirectional(1, 3).with_cost(1.0),
                Link::bidirectional(2, 5).with_cost(5.0),
                Link::bidirectional(5, 4).with_cost(5.0),
                Link::one_way(3, 4)
                    .requiring_ability(Ability::DASH)
                    .with_cost(1.0),
            ],
        )
    }

    #[test]
    fn same_node() {
        let g = diamond();
        assert!(is_path_possible(&g, 1, 1, &walker()));
        assert_eq!(find_path(&g, 1, 1, &walker()), Some(vec![1]));
    }

    #[test]
    fn path_possible_matches_reachable_set() {
        let g = diamond();
        for profile in [walker(), dasher()] {
            let reachable = compute_reachable_set(&g, 3, &profile);
            for to in 1..=5 {
                assert_eq!(
                    is_path_possible(&g, 3, to, &profile),
                    reachable.contains(&to),
                    "profile {} to #{}",
                    profile.label,
                    to
                );
            }
        }
    }

    #[test]
    fn unknown_or_inactive_endpoints() {
        let mut g = diamond();
        assert!(!is_path_possible(&g, 1, 99, &walker()));
        g.deactivate_node(5);
        assert!(!is_path_possible(&g, 1, 5, &walker()));
        assert_eq!(find_path(&g, 1, 5, &walker()), None);
    }

    #[test]
    fn find_path_fewest_hops() {
        let g = diamond();
        assert_eq!(find_path(&g, 1, 4, &dasher()), Some(vec![1, 3, 4]));
        assert_eq!(find_path(&g, 1, 4, &walker()), Some(vec![1, 2, 5, 4]));
    }

    #[test]
    fn find_path_respects_one_way() {
        let g = diamond();
        // 4→3 is not allowed (one-way 3→4), so the route back goes via 5.
        assert_eq!(find_path(&g, 4, 3, &dasher()), Some(vec![4, 5, 2, 1, 3]));
    }

    #[test]
    fn cheapest_path_prefers_low_cost() {
        let g = diamond();
        let cfg = TraversalCostConfig::default();
        let (path, cost) = cheapest_path(&g, 1, 4, &dasher(), &cfg).unwrap();
        assert_eq!(path, vec![1, 3, 4]);
        assert!((cost - 2.0).abs() < 1e-6);
        let (path, cost) = cheapest_path(&g, 1, 4, &walker(), &cfg).unwrap();
        assert_eq!(path, vec![1, 2, 5, 4]);
        assert!((cost - 11.0).abs() < 1e-6);
    }

    #[test]
    fn cheapest_path_pays_soft_gate_penalty() {
        let g = world(
            &[1, 2, 3],
            vec![
                Link::one_way(1, 3)
                    .requiring_ability(Ability::GLIDE)
                    .soft(0.0)
                    .with_cost(2.0),
                Link::one_way(1, 2).with_cost(1.5),
                Link::one_way(2, 3).with_cost(1.5),
            ],
        );
        let cfg = TraversalCostConfig::default();
        // Soft gate costs 4.0 without glide, detour costs 3.0.
        let (path, _) = cheapest_path(&g, 1, 3, &walker(), &cfg).unwrap();
        assert_eq!(path, vec![1, 2, 3]);
        let glider = walker().with_ability(Ability::GLIDE);
        let (path, cost) = cheapest_path(&g, 1, 3, &glider, &cfg).unwrap();
        assert_eq!(path, vec![1, 3]);
        assert!((cost - 2.0).abs() < 1e-6);
    }

    #[test]
    fn cheapest_path_unreachable() {
        let g = world(&[1, 2], vec![Link::one_way(2, 1)]);
        assert!(cheapest_path(&g, 1, 2, &walker(), &TraversalCostConfig::default()).is_none());
    }

    #[test]
    fn cache_reuses_sets() {
        let g = diamond();
        let mut cache = PathQueryCache::new(&g);
        assert!(cache.is_path_possible(1, 4, &walker()));
        assert_eq!(cache.len(), 1);
        assert!(cache.is_path_possible(1, 5, &walker()));
        assert_eq!(cache.len(), 1);
        assert!(cache.is_path_possible(1, 4, &dasher()));
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn cache_distinguishes_profiles_sharing_a_label() {
        let g = world(
            &[1, 2, 3],
            vec![
                Link::bidirectional(1, 2),
                Link::one_way(2, 3).requiring_ability(Ability::DASH),
            ],
        );
        let agent = AgentCapabilities::new("Agent", Polarity::NONE, Ability::NONE, 0.5);
        let upgraded = agent.with_ability(Ability::DASH);
        assert_eq!(upgraded.label, agent.label);

        let mut cache = PathQueryCache::new(&g);
        assert!(!cache.is_path_possible(1, 3, &agent));
        assert!(cache.is_path_possible(1, 3, &upgraded));
        assert_eq!(
            cache.is_path_possible(1, 3, &upgraded),
            is_path_possible(&g, 1, 3, &upgraded)
        );
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn cache_shares_entry_across_labels_with_equal_masks() {
        let g = diamond();
        let mut cache = PathQueryCache::new(&g);
        let renamed = AgentCapabilities::new("Other", Polarity::NONE, Ability::NONE, 1.0);
        cache.reachable_from(1, &walker());
        cache.reachable_from(1, &renamed);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn cache_eviction_bounded() {
        let g = diamond();
        let mut cache = PathQueryCache::with_capacity(&g, 2);
        cache.reachable_from(1, &walker());
        cache.reachable_from(2, &walker());
        cache.reachable_from(3, &walker());
        assert_eq!(cache.len(), 2);
    }
}
