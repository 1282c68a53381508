//! Property tests over randomly generated world graphs.

use proptest::prelude::*;

use softlock_logic::capability::{Ability, AgentCapabilities, Polarity};
use softlock_logic::graph::{Link, Node, NodeId, Vec3, WorldGraph};
use softlock_logic::path_query::{is_path_possible, PathQueryCache};
use softlock_logic::quickfix::{generate_quick_fixes, QuickFixType};
use softlock_logic::reachability::{compute_reachable_set, generate_validation_report, IssueType};
use softlock_logic::traversal::can_traverse;

#[derive(Debug, Clone)]
struct LinkSpec {
    from: u32,
    to: u32,
    bidirectional: bool,
    soft: bool,
    polarity: u8,
    ability: u16,
}

fn arb_link(max_id: u32) -> impl Strategy<Value = LinkSpec> {
    (
        1..=max_id,
        // Allow one id past the end to produce dangling references.
        1..=max_id + 1,
        any::<bool>(),
        prop::bool::weighted(0.2),
        prop_oneof![Just(0u8), any::<u8>()],
        prop_oneof![Just(0u16), 0u16..256],
    )
        .prop_map(|(from, to, bidirectional, soft, polarity, ability)| LinkSpec {
            from,
            to,
            bidirectional,
            soft,
            polarity,
            ability,
        })
}

fn arb_world() -> impl Strategy<Value = WorldGraph> {
    (1u32..12).prop_flat_map(|n| {
        (
            prop::collection::vec(arb_link(n), 0..(n as usize * 3)),
            prop::collection::vec(any::<bool>(), n as usize),
        )
            .prop_map(move |(links, inactive)| build_world(n, &links, &inactive))
    })
}

fn build_world(n: u32, links: &[LinkSpec], inactive: &[bool]) -> WorldGraph {
    let mut g = WorldGraph::new();
    for id in 1..=n {
        g.add_node(Node::new(id, Vec3::new(id as f32, 0.0, 0.0)))
            .unwrap();
    }
    for spec in links {
        let mut link = if spec.bidirectional {
            Link::bidirectional(spec.from, spec.to)
        } else {
            Link::one_way(spec.from, spec.to)
        }
        .requiring_polarity(Polarity(spec.polarity))
        .requiring_ability(Ability(spec.ability));
        if spec.soft {
            link = link.soft(0.5);
        }
        g.add_link(link).unwrap();
    }
    // Keep node 1 active so there is always a valid start.
    for (i, &off) in inactive.iter().enumerate().skip(1) {
        if off {
            g.deactivate_node(i as NodeId + 1);
        }
    }
    g
}

fn arb_profile() -> impl Strategy<Value = AgentCapabilities> {
    (any::<u8>(), 0u16..256, 0.0f32..=1.0)
        .prop_map(|(p, a, s)| AgentCapabilities::new("prop", Polarity(p), Ability(a), s))
}

proptest! {
    #[test]
    fn reachable_set_contains_start_and_only_active_nodes(
        world in arb_world(),
        profile in arb_profile(),
    ) {
        let reached = compute_reachable_set(&world, 1, &profile);
        prop_assert!(reached.contains(&1));
        for id in &reached {
            prop_assert!(world.is_active(*id), "inactive node #{} reached", id);
        }
    }

    #[test]
    fn report_is_idempotent(world in arb_world()) {
        let a = generate_validation_report(&world, None);
        let b = generate_validation_report(&world, None);
        prop_assert_eq!(&a.unreachable_node_ids, &b.unreachable_node_ids);
        prop_assert_eq!(a.isolated_component_count, b.isolated_component_count);
    }

    #[test]
    fn growing_masks_never_shrinks_reachability(
        world in arb_world(),
        profile in arb_profile(),
        extra_polarity in any::<u8>(),
        extra_ability in 0u16..256,
    ) {
        let grown = profile
            .with_polarity(Polarity(extra_polarity))
            .with_ability(Ability(extra_ability));
        let before = compute_reachable_set(&world, 1, &profile);
        let after = compute_reachable_set(&world, 1, &grown);
        prop_assert!(before.is_subset(&after));
    }

    #[test]
    fn path_query_agrees_with_reachable_set(
        world in arb_world(),
        profile in arb_profile(),
        to in 1u32..13,
    ) {
        let reached = compute_reachable_set(&world, 1, &profile);
        prop_assert_eq!(is_path_possible(&world, 1, to, &profile), reached.contains(&to));
    }

    #[test]
    fn cached_queries_agree_with_direct_queries(
        world in arb_world(),
        profile in arb_profile(),
        extra_ability in 0u16..256,
        to in 1u32..13,
    ) {
        // Same label, possibly different masks.
        let grown = profile.with_ability(Ability(extra_ability));
        let mut cache = PathQueryCache::new(&world);
        for agent in [&profile, &grown] {
            prop_assert_eq!(
                cache.is_path_possible(1, to, agent),
                is_path_possible(&world, 1, to, agent)
            );
        }
    }

    #[test]
    fn hard_gate_blocks_missing_ability(
        required in 1u16..256,
        available in 0u16..256,
        polarity in any::<u8>(),
    ) {
        prop_assume!(required & !available != 0);
        let link = Link::one_way(1, 2).requiring_ability(Ability(required));
        let agent = AgentCapabilities::new("p", Polarity(polarity), Ability(available), 1.0);
        prop_assert!(!can_traverse(&link, &agent, 1));
    }

    #[test]
    fn soft_gate_always_crossable(
        required_polarity in any::<u8>(),
        required_ability in 0u16..256,
        profile in arb_profile(),
    ) {
        let link = Link::bidirectional(1, 2)
            .requiring_polarity(Polarity(required_polarity))
            .requiring_ability(Ability(required_ability))
            .soft(1.0);
        prop_assert!(can_traverse(&link, &profile, 1));
        prop_assert!(can_traverse(&link, &profile, 2));
    }

    #[test]
    fn every_unreachable_node_gets_a_connection_fix(world in arb_world()) {
        let report = generate_validation_report(&world, None);
        let fixes = generate_quick_fixes(&report);
        for issue in report.issues_of(IssueType::UnreachableNode) {
            let covered = fixes.iter().any(|f| {
                f.fix_type == QuickFixType::AddConnection && f.target_node_id == issue.node_id
            });
            prop_assert!(covered, "no connection fix for node #{}", issue.node_id);
        }
    }
}
