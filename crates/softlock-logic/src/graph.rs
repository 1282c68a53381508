//! World graph — traversal nodes and capability-gated links.
//!
//! `WorldGraph` is an arena: nodes live in insertion order, an id index maps
//! `NodeId` to slot, and every node owns an append-only list of outgoing
//! links. Bidirectional links are stored once (on their source node) and a
//! reverse index lets the engine expand them from the other endpoint too.
//!
//! Nodes are never removed. Pruning deactivates a node, so stale links
//! degrade to dead ends instead of dangling references.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::capability::{clamp_skill, deserialize_skill, Ability, Polarity};

/// Opaque node identifier. Id 0 is reserved and never valid.
pub type NodeId = u32;

/// The reserved invalid node id.
pub const INVALID_NODE_ID: NodeId = 0;

/// Plain 3D world position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn distance(&self, other: &Vec3) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Biome tag carried by a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BiomeType {
    #[default]
    Cavern,
    Forest,
    Ruins,
    Foundry,
    Aquifer,
    Spire,
    Void,
}

/// An addressable traversal point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub world_position: Vec3,
    pub biome_type: BiomeType,
    pub primary_polarity: Polarity,
    pub is_active: bool,
}

impl Node {
    /// An active node with default biome and no polarity.
    pub fn new(id: NodeId, world_position: Vec3) -> Self {
        Self {
            id,
            world_position,
            biome_type: BiomeType::default(),
            primary_polarity: Polarity::NONE,
            is_active: true,
        }
    }

    pub fn with_biome(mut self, biome: BiomeType) -> Self {
        self.biome_type = biome;
        self
    }

    pub fn with_polarity(mut self, polarity: Polarity) -> Self {
        self.primary_polarity = polarity;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionType {
    OneWay,
    #[default]
    Bidirectional,
}

/// How a link's requirements are enforced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GateSoftness {
    /// Requirements must be met or the link cannot be crossed.
    #[default]
    Hard,
    /// Requirements only raise the traversal cost.
    Soft,
}

/// A directed or bidirectional capability-gated edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub from_node_id: NodeId,
    pub to_node_id: NodeId,
    pub connection_type: ConnectionType,
    pub required_polarity: Polarity,
    pub required_ability: Ability,
    pub gate_softness: GateSoftness,
    /// Minimum skill in [0, 1] expected to cross a soft gate cheaply.
    #[serde(deserialize_with = "deserialize_skill")]
    pub minimum_skill_level: f32,
    pub base_traversal_cost: f32,
}

impl Link {
    /// An ungated link with unit cost.
    pub fn new(from: NodeId, to: NodeId, connection_type: ConnectionType) -> Self {
        Self {
            from_node_id: from,
            to_node_id: to,
            connection_type,
            required_polarity: Polarity::NONE,
            required_ability: Ability::NONE,
            gate_softness: GateSoftness::Hard,
            minimum_skill_level: 0.0,
            base_traversal_cost: 1.0,
        }
    }

    pub fn one_way(from: NodeId, to: NodeId) -> Self {
        Self::new(from, to, ConnectionType::OneWay)
    }

    pub fn bidirectional(a: NodeId, b: NodeId) -> Self {
        Self::new(a, b, ConnectionType::Bidirectional)
    }

    /// Gate this link behind a polarity requirement.
    pub fn requiring_polarity(mut self, polarity: Polarity) -> Self {
        self.required_polarity = polarity;
        self
    }

    /// Gate this link behind an ability requirement.
    pub fn requiring_ability(mut self, ability: Ability) -> Self {
        self.required_ability = ability;
        self
    }

    /// Make the gate soft, with a minimum skill level (clamped to [0, 1]).
    pub fn soft(mut self, minimum_skill_level: f32) -> Self {
        self.gate_softness = GateSoftness::Soft;
        self.minimum_skill_level = clamp_skill(minimum_skill_level);
        self
    }

    pub fn with_cost(mut self, cost: f32) -> Self {
        self.base_traversal_cost = cost;
        self
    }

    /// Resolve the endpoint reached by crossing this link from `from`.
    ///
    /// One-way links only resolve from their source. Returns `None` when
    /// `from` is not a valid departure endpoint.
    pub fn get_destination(&self, from: NodeId) -> Option<NodeId> {
        if from == self.from_node_id {
            Some(self.to_node_id)
        } else if from == self.to_node_id && self.connection_type == ConnectionType::Bidirectional
        {
            Some(self.from_node_id)
        } else {
            None
        }
    }

    pub fn is_gated(&self) -> bool {
        !self.required_polarity.is_empty() || !self.required_ability.is_empty()
    }
}

/// Graph construction errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("node id 0 is reserved")]
    ReservedNodeId,
    #[error("node #{0} already exists")]
    DuplicateNode(NodeId),
    #[error("link source node #{0} does not exist")]
    UnknownSourceNode(NodeId),
}

/// Position of a link inside the arena: (owner slot, index in owner's list).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LinkRef {
    owner: usize,
    index: usize,
}

/// Read-only-during-validation world graph snapshot.
#[derive(Debug, Clone, Default)]
pub struct WorldGraph {
    nodes: Vec<Node>,
    /// node id → slot in `nodes` / `links`
    index: HashMap<NodeId, usize>,
    /// slot → outgoing links (append-only)
    links: Vec<Vec<Link>>,
    /// node id → bidirectional links whose `to_node_id` is that node
    incoming_bidirectional: HashMap<NodeId, Vec<LinkRef>>,
    link_count: usize,
}

impl WorldGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node. Ids must be nonzero and unique.
    pub fn add_node(&mut self, node: Node) -> Result<NodeId, GraphError> {
        if node.id == INVALID_NODE_ID {
            return Err(GraphError::ReservedNodeId);
        }
        if self.index.contains_key(&node.id) {
            return Err(GraphError::DuplicateNode(node.id));
        }
        let id = node.id;
        self.index.insert(id, self.nodes.len());
        self.nodes.push(node);
        self.links.push(Vec::new());
        Ok(id)
    }

    /// Append a link to its source node's outgoing list.
    ///
    /// The destination does not need to exist; unknown destinations are
    /// treated as dead ends during traversal.
    pub fn add_link(&mut self, link: Link) -> Result<(), GraphError> {
        let owner = *self
            .index
            .get(&link.from_node_id)
            .ok_or(GraphError::UnknownSourceNode(link.from_node_id))?;
        let list = &mut self.links[owner];
        if link.connection_type == ConnectionType::Bidirectional
            && link.to_node_id != link.from_node_id
        {
            self.incoming_bidirectional
                .entry(link.to_node_id)
                .or_default()
                .push(LinkRef {
                    owner,
                    index: list.len(),
                });
        }
        list.push(link);
        self.link_count += 1;
        Ok(())
    }

    /// Mark a node inactive. Returns false if the id is unknown.
    pub fn deactivate_node(&mut self, id: NodeId) -> bool {
        match self.index.get(&id) {
            Some(&slot) => {
                self.nodes[slot].is_active = false;
                true
            }
            None => false,
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.index.get(&id).map(|&slot| &self.nodes[slot])
    }

    /// True only for existing, active nodes.
    pub fn is_active(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(|n| n.is_active)
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Active node ids in insertion order.
    pub fn active_node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().filter(|n| n.is_active).map(|n| n.id)
    }

    pub fn active_node_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_active).count()
    }

    /// The first active node in insertion order.
    pub fn first_active_node(&self) -> Option<NodeId> {
        self.active_node_ids().next()
    }

    /// Outgoing links owned by a node.
    pub fn links_from(&self, id: NodeId) -> &[Link] {
        self.index
            .get(&id)
            .map(|&slot| self.links[slot].as_slice())
            .unwrap_or(&[])
    }

    /// Every link that may be crossed starting at `id`, paired with the
    /// neighbour it leads to: owned links first, then bidirectional links
    /// anchored at another node.
    pub fn traversable_links(&self, id: NodeId) -> impl Iterator<Item = (&Link, NodeId)> + '_ {
        let incoming = self
            .incoming_bidirectional
            .get(&id)
            .map(|refs| refs.as_slice())
            .unwrap_or(&[]);
        self.links_from(id)
            .iter()
            .chain(incoming.iter().map(|r| &self.links[r.owner][r.index]))
            .filter_map(move |link| link.get_destination(id).map(|dest| (link, dest)))
    }

    /// Every link in the graph, grouped by owner in insertion order.
    pub fn all_links(&self) -> impl Iterator<Item = &Link> + '_ {
        self.links.iter().flatten()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.link_count
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
