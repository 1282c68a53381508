//! Softlock Headless Validation Harness
//!
//! Exercises the reachability core and the jump arc solver on synthetic
//! worlds. Runs entirely in-process, with no host engine or editor.
//!
//! Usage:
//!   cargo run -p softlock-simtest
//!   cargo run -p softlock-simtest -- --verbose
//!   cargo run -p softlock-simtest -- --config validator.json --json

mod logger;

use std::collections::BTreeSet;
use std::error::Error;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use softlock_logic::capability::{full_capability, Ability, AgentCapabilities, Polarity};
use softlock_logic::config::{validate_config, ValidatorConfig};
use softlock_logic::graph::{BiomeType, Link, Node, NodeId, Vec3, WorldGraph};
use softlock_logic::jump_arc::{
    calculate_jump_arc, is_reachable, unreachable_areas, RoomBounds, Vec2,
};
use softlock_logic::path_query::{cheapest_path, find_path, is_path_possible};
use softlock_logic::quickfix::{generate_quick_fixes, QuickFixType};
use softlock_logic::reachability::{
    compute_reachable_set, generate_validation_report, IssueType, ValidationReport,
};

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

impl TestResult {
    fn check(name: &str, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed,
            detail: detail.into(),
        }
    }
}

struct Args {
    verbose: bool,
    json: bool,
    config_path: Option<String>,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1).cloned());
    Args {
        verbose: args.iter().any(|a| a == "--verbose"),
        json: args.iter().any(|a| a == "--json"),
        config_path,
    }
}

fn load_config(path: Option<&str>) -> Result<ValidatorConfig, Box<dyn Error>> {
    match path {
        Some(p) => {
            let text = std::fs::read_to_string(p)?;
            let config: ValidatorConfig = serde_json::from_str(&text)?;
            Ok(config.normalized())
        }
        None => Ok(ValidatorConfig::default()),
    }
}

fn main() {
    let args = parse_args();
    logger::init(args.verbose);
    println!("=== Softlock Validation Harness ===\n");

    let config = match load_config(args.config_path.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            println!("  ✗ config_load: {}", e);
            std::process::exit(1);
        }
    };

    let mut results = Vec::new();

    // 1. Configuration
    results.extend(validate_configuration(&config));

    // 2. Sample world report
    let world = sunken_citadel();
    let report = generate_validation_report(&world, Some(&config.profiles));
    results.extend(validate_sample_report(&report));

    // 3. Quick fixes
    results.extend(validate_quick_fixes(&report));

    // 4. Path queries
    results.extend(validate_path_queries(&world, &config));

    // 5. Jump arcs
    results.extend(validate_jump_arcs(&config));

    // 6. Random world sweep
    results.extend(validate_random_worlds(&config, 200));

    if args.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("\n{}", json),
            Err(e) => println!("  ✗ report_json: {}", e),
        }
    }

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || args.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── Sample world ────────────────────────────────────────────────────────

/// A small hand-authored world:
///
/// ```text
///  1 Gate ── 2 Hall ── 3 Cistern ─(swim)→ 4 Undercroft
///              │                              │
///            (dash)                         (fire, soft)
///              ↓                              ↓
///           5 Belfry ─(wall jump)→ 6 Spire   7 Forge
///
///  8 Reliquary ── 9 Ossuary        (sealed, no links in)
/// ```
fn sunken_citadel() -> WorldGraph {
    let rooms = [
        (1, BiomeType::Ruins, Polarity::NONE),
        (2, BiomeType::Ruins, Polarity::NONE),
        (3, BiomeType::Aquifer, Polarity::ICE),
        (4, BiomeType::Cavern, Polarity::NONE),
        (5, BiomeType::Spire, Polarity::NORTH),
        (6, BiomeType::Spire, Polarity::NORTH),
        (7, BiomeType::Foundry, Polarity::FIRE),
        (8, BiomeType::Void, Polarity::VOID),
        (9, BiomeType::Void, Polarity::VOID),
    ];
    let mut world = WorldGraph::new();
    for (id, biome, polarity) in rooms {
        let node = Node::new(id, Vec3::new(id as f32 * 12.0, 0.0, 0.0))
            .with_biome(biome)
            .with_polarity(polarity);
        if let Err(e) = world.add_node(node) {
            log::warn!("Skipping room #{}: {}", id, e);
        }
    }

    let links = [
        Link::bidirectional(1, 2),
        Link::bidirectional(2, 3),
        Link::one_way(3, 4).requiring_ability(Ability::SWIM),
        Link::bidirectional(4, 3).requiring_ability(Ability::SWIM),
        Link::one_way(2, 5).requiring_ability(Ability::DASH),
        Link::one_way(5, 2),
        Link::bidirectional(5, 6).requiring_ability(Ability::WALL_JUMP),
        Link::one_way(4, 7)
            .requiring_polarity(Polarity::FIRE)
            .soft(0.6)
            .with_cost(3.0),
        Link::bidirectional(8, 9),
    ];
    for link in links {
        if let Err(e) = world.add_link(link) {
            log::warn!("Skipping link: {}", e);
        }
    }
    world
}

// ── 1. Configuration ────────────────────────────────────────────────────

fn validate_configuration(config: &ValidatorConfig) -> Vec<TestResult> {
    println!("--- Configuration ---");
    let errors = validate_config(config);
    let detail = if errors.is_empty() {
        format!("{} profiles, cost/physics in range", config.profiles.len())
    } else {
        errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    };
    vec![TestResult::check("config_valid", errors.is_empty(), detail)]
}

// ── 2. Sample report ────────────────────────────────────────────────────

fn validate_sample_report(report: &ValidationReport) -> Vec<TestResult> {
    println!("--- Sample World Report ---");
    let mut results = Vec::new();

    results.push(TestResult::check(
        "report_counts",
        report.total_nodes == 9 && report.total_links == 9,
        format!("{} nodes, {} links", report.total_nodes, report.total_links),
    ));

    results.push(TestResult::check(
        "report_start_node",
        report.start_node_id == Some(1),
        format!("start = {:?}", report.start_node_id),
    ));

    results.push(TestResult::check(
        "report_sealed_vault_unreachable",
        report.unreachable_node_ids.contains(&8) && report.unreachable_node_ids.contains(&9),
        format!("unreachable = {:?}", report.unreachable_node_ids),
    ));

    results.push(TestResult::check(
        "report_two_components",
        report.isolated_component_count == 2,
        format!("{} component(s)", report.isolated_component_count),
    ));

    let gate_issues = report
        .issues
        .iter()
        .filter(|i| {
            matches!(
                i.issue_type,
                IssueType::RequiresUnavailableAbility
                    | IssueType::RequiresUnavailablePolarity
                    | IssueType::HardGateBlocking
            )
        })
        .count();
    results.push(TestResult::check(
        "report_gate_issues",
        gate_issues > 0,
        format!("{} gate issue(s) across profiles", gate_issues),
    ));

    let again = generate_validation_report(&sunken_citadel(), None);
    let canonical = generate_validation_report(&sunken_citadel(), None);
    results.push(TestResult::check(
        "report_idempotent",
        again.unreachable_node_ids == canonical.unreachable_node_ids
            && again.isolated_component_count == canonical.isolated_component_count,
        "two runs agree",
    ));

    let empty = generate_validation_report(&WorldGraph::new(), None);
    results.push(TestResult::check(
        "report_empty_world",
        empty == ValidationReport::default(),
        "empty graph → empty report",
    ));

    results
}

// ── 3. Quick fixes ──────────────────────────────────────────────────────

fn validate_quick_fixes(report: &ValidationReport) -> Vec<TestResult> {
    println!("--- Quick Fixes ---");
    let mut results = Vec::new();
    let fixes = generate_quick_fixes(report);

    let unreachable: BTreeSet<NodeId> = report
        .issues_of(IssueType::UnreachableNode)
        .map(|i| i.node_id)
        .collect();
    let connected: BTreeSet<NodeId> = fixes
        .iter()
        .filter(|f| f.fix_type == QuickFixType::AddConnection)
        .map(|f| f.target_node_id)
        .collect();
    results.push(TestResult::check(
        "quickfix_unreachable_covered",
        unreachable.is_subset(&connected),
        format!("{} fix(es) for {} unreachable node(s)", fixes.len(), unreachable.len()),
    ));

    for fix in &fixes {
        log::debug!("{:?} → #{}: {}", fix.fix_type, fix.target_node_id, fix.description);
    }

    results
}

// ── 4. Path queries ─────────────────────────────────────────────────────

fn validate_path_queries(world: &WorldGraph, config: &ValidatorConfig) -> Vec<TestResult> {
    println!("--- Path Queries ---");
    let mut results = Vec::new();
    let walker = AgentCapabilities::new("Walker", Polarity::NONE, Ability::NONE, 0.0);
    let climber = AgentCapabilities::new(
        "Climber",
        Polarity::NONE,
        Ability::DASH | Ability::WALL_JUMP,
        0.5,
    );

    results.push(TestResult::check(
        "path_walker_blocked_by_dash",
        !is_path_possible(world, 1, 5, &walker),
        "1→5 needs dash",
    ));

    let climb = find_path(world, 1, 6, &climber);
    results.push(TestResult::check(
        "path_climber_reaches_spire",
        climb.as_deref() == Some(&[1, 2, 5, 6][..]),
        format!("1→6 = {:?}", climb),
    ));

    results.push(TestResult::check(
        "path_one_way_return",
        is_path_possible(world, 5, 1, &walker),
        "5→2 drop-down is one-way but open",
    ));

    let swimmer = walker.with_ability(Ability::SWIM);
    let forge = cheapest_path(world, 1, 7, &swimmer, &config.cost);
    let expert_forge = cheapest_path(world, 1, 7, &full_capability(), &config.cost);
    let soft_penalty_applied = match (&forge, &expert_forge) {
        (Some((_, novice)), Some((_, expert))) => novice > expert,
        _ => false,
    };
    results.push(TestResult::check(
        "path_soft_gate_penalty",
        soft_penalty_applied,
        format!(
            "novice {:?} vs expert {:?}",
            forge.map(|(_, c)| c),
            expert_forge.map(|(_, c)| c)
        ),
    ));

    results
}

// ── 5. Jump arcs ────────────────────────────────────────────────────────

fn validate_jump_arcs(config: &ValidatorConfig) -> Vec<TestResult> {
    println!("--- Jump Arcs ---");
    let mut results = Vec::new();
    let physics = config.physics;
    let origin = Vec2::new(0.0, 0.0);

    // Base reach should be symmetric left/right.
    let mut asymmetric = 0;
    for step in 0..20 {
        let x = step as f32 * 0.5;
        let right = is_reachable(origin, Vec2::new(x, 1.0), Ability::NONE, &physics);
        let left = is_reachable(origin, Vec2::new(-x, 1.0), Ability::NONE, &physics);
        if right != left {
            asymmetric += 1;
        }
    }
    results.push(TestResult::check(
        "jump_symmetric",
        asymmetric == 0,
        format!("{} asymmetric sample(s)", asymmetric),
    ));

    // Every ability only ever widens the reachable envelope.
    let mut regressions = 0;
    for gx in -10..=10 {
        for gy in -5..=10 {
            let target = Vec2::new(gx as f32, gy as f32);
            let base = is_reachable(origin, target, Ability::NONE, &physics);
            let all = is_reachable(origin, target, Ability::all(), &physics);
            if base && !all {
                regressions += 1;
            }
        }
    }
    results.push(TestResult::check(
        "jump_abilities_monotone",
        regressions == 0,
        format!("{} regression(s) over 21×16 grid", regressions),
    ));

    let flat = calculate_jump_arc(origin, Vec2::new(physics.jump_distance * 0.5, 0.0), &physics);
    results.push(TestResult::check(
        "jump_flat_arc",
        flat.is_valid && flat.flight_time > 0.0 && flat.initial_velocity.y > 0.0,
        format!(
            "t={:.3}s v=({:.2},{:.2}) peak={:.2}",
            flat.flight_time, flat.initial_velocity.x, flat.initial_velocity.y, flat.peak_height
        ),
    ));

    let bounds = RoomBounds::new(Vec2::new(0.0, 0.0), Vec2::new(24.0, 16.0));
    let entrance = Vec2::new(1.0, 0.0);
    let areas = [
        Vec2::new(4.0, 1.0),
        Vec2::new(4.5 + physics.jump_distance * 0.5, 1.0),
        Vec2::new(20.0, 14.0),
    ];
    let failed = unreachable_areas(entrance, &areas, Ability::NONE, &physics, &bounds);
    results.push(TestResult::check(
        "jump_room_two_hop",
        failed == vec![2],
        format!("unreachable areas {:?}", failed),
    ));

    results
}

// ── 6. Random worlds ────────────────────────────────────────────────────

fn random_world(rng: &mut StdRng) -> WorldGraph {
    let n: u32 = rng.gen_range(2..=24);
    let mut world = WorldGraph::new();
    for id in 1..=n {
        let pos = Vec3::new(rng.gen_range(-100.0..100.0), rng.gen_range(-50.0..50.0), 0.0);
        if let Err(e) = world.add_node(Node::new(id, pos)) {
            log::warn!("{}", e);
        }
    }
    let link_count = rng.gen_range(0..n * 2);
    for _ in 0..link_count {
        let from = rng.gen_range(1..=n);
        let to = rng.gen_range(1..=n + 1);
        let mut link = if rng.gen_bool(0.5) {
            Link::bidirectional(from, to)
        } else {
            Link::one_way(from, to)
        };
        if rng.gen_bool(0.4) {
            link = link.requiring_ability(Ability(1 << rng.gen_range(0..8u32)));
        }
        if rng.gen_bool(0.2) {
            link = link.requiring_polarity(Polarity(1 << rng.gen_range(0..8u32)));
        }
        if rng.gen_bool(0.15) {
            link = link.soft(rng.gen_range(0.0..=1.0));
        }
        if let Err(e) = world.add_link(link) {
            log::warn!("{}", e);
        }
    }
    for id in 2..=n {
        if rng.gen_bool(0.1) {
            world.deactivate_node(id);
        }
    }
    world
}

fn validate_random_worlds(config: &ValidatorConfig, count: u64) -> Vec<TestResult> {
    println!("--- Random Worlds ({}) ---", count);
    let mut start_missing = 0;
    let mut monotonicity = 0;
    let mut non_idempotent = 0;

    for seed in 0..count {
        let mut rng = StdRng::seed_from_u64(seed);
        let world = random_world(&mut rng);

        let mut previous: Option<BTreeSet<NodeId>> = None;
        let mut grown = AgentCapabilities::new("Sweep", Polarity::NONE, Ability::NONE, 0.5);
        for bit in 0..8u16 {
            let reached: BTreeSet<NodeId> =
                compute_reachable_set(&world, 1, &grown).into_iter().collect();
            if !reached.contains(&1) {
                start_missing += 1;
            }
            if let Some(prev) = &previous {
                if !prev.is_subset(&reached) {
                    monotonicity += 1;
                }
            }
            previous = Some(reached);
            grown = grown.with_ability(Ability(1 << bit));
        }

        let a = generate_validation_report(&world, Some(&config.profiles));
        let b = generate_validation_report(&world, Some(&config.profiles));
        if a.unreachable_node_ids != b.unreachable_node_ids
            || a.isolated_component_count != b.isolated_component_count
        {
            non_idempotent += 1;
        }
    }

    vec![
        TestResult::check(
            "random_start_always_reached",
            start_missing == 0,
            format!("{} world(s) missing start", start_missing),
        ),
        TestResult::check(
            "random_monotone_abilities",
            monotonicity == 0,
            format!("{} shrinking step(s)", monotonicity),
        ),
        TestResult::check(
            "random_report_idempotent",
            non_idempotent == 0,
            format!("{} disagreement(s)", non_idempotent),
        ),
    ]
}
