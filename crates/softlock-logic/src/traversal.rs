//! Link traversal predicate and cost function.
//!
//! Hard gates block agents that lack any required polarity or ability bit.
//! Soft gates never block; unmet requirements or a skill shortfall only
//! inflate the cost. Both functions are pure.
//!
//! ```
//! use softlock_logic::capability::{Ability, AgentCapabilities, Polarity};
//! use softlock_logic::graph::Link;
//! use softlock_logic::traversal::{can_traverse, calculate_traversal_cost, TraversalCostConfig};
//!
//! let gate = Link::one_way(1, 2).requiring_ability(Ability::DASH);
//! let walker = AgentCapabilities::new("Walker", Polarity::NONE, Ability::NONE, 0.0);
//! assert!(!can_traverse(&gate, &walker, 1));
//! assert_eq!(calculate_traversal_cost(&gate, &walker, &TraversalCostConfig::default()), None);
//! ```

use serde::{Deserialize, Serialize};

use crate::capability::AgentCapabilities;
use crate::graph::{GateSoftness, Link, NodeId};

/// Cost multiplier for crossing a soft gate without its requirements.
pub const DEFAULT_SOFT_GATE_MULTIPLIER: f32 = 2.0;

/// Cost multiplier at a full skill shortfall (required 1.0, agent 0.0).
/// Smaller shortfalls scale linearly toward 1.0.
pub const DEFAULT_SKILL_SHORTFALL_MULTIPLIER: f32 = 1.5;

/// Tunable soft-gate penalties.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraversalCostConfig {
    pub soft_gate_multiplier: f32,
    pub skill_shortfall_multiplier: f32,
}

impl Default for TraversalCostConfig {
    fn default() -> Self {
        Self {
            soft_gate_multiplier: DEFAULT_SOFT_GATE_MULTIPLIER,
            skill_shortfall_multiplier: DEFAULT_SKILL_SHORTFALL_MULTIPLIER,
        }
    }
}

/// Whether `capabilities` may cross `link` departing from `from_node_id`.
///
/// A departure endpoint that the link does not resolve from (the far end
/// of a one-way link, or an unrelated node) is never traversable.
pub fn can_traverse(link: &Link, capabilities: &AgentCapabilities, from_node_id: NodeId) -> bool {
    if link.get_destination(from_node_id).is_none() {
        return false;
    }
    match link.gate_softness {
        GateSoftness::Hard => {
            capabilities.satisfies(link.required_polarity, link.required_ability)
        }
        GateSoftness::Soft => true,
    }
}

/// Cost of crossing `link` with `capabilities`, or `None` if a hard gate
/// blocks it.
pub fn calculate_traversal_cost(
    link: &Link,
    capabilities: &AgentCapabilities,
    config: &TraversalCostConfig,
) -> Option<f32> {
    let requirements_met = capabilities.satisfies(link.required_polarity, link.required_ability);
    match link.gate_softness {
        GateSoftness::Hard if !requirements_met => None,
        GateSoftness::Hard => Some(link.base_traversal_cost),
        GateSoftness::Soft => {
            let mut cost = link.base_traversal_cost;
            if !requirements_met {
                cost *= config.soft_gate_multiplier;
            }
            let shortfall = link.minimum_skill_level - capabilities.skill_level;
            if shortfall > 0.0 {
                cost *= 1.0 + (config.skill_shortfall_multiplier - 1.0) * shortfall;
            }
            Some(cost)
        }
    }
}
