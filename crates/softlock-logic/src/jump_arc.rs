//! Jump arc solver — can an agent physically cross between two room-local
//! points, and what ballistic trajectory does that imply.
//!
//! Independent of the world graph. Each movement ability is a separate
//! fallback check; satisfying any one of them is enough:
//!
//! | Path | Distance budget | Height budget |
//! |------|-----------------|---------------|
//! | Base jump | `jump_distance` | `jump_height` |
//! | Double jump | `jump_distance × 1.2` | `jump_height + double_jump_bonus` |
//! | Wall jump | horizontal offset ≤ 2 | `wall_jump_height × 3` |
//! | Dash | `jump_distance + dash_distance` | `jump_height` |
//!
//! ```
//! use softlock_logic::capability::Ability;
//! use softlock_logic::jump_arc::{is_reachable, JumpPhysics, Vec2};
//!
//! let physics = JumpPhysics { jump_height: 3.0, jump_distance: 4.0, ..Default::default() };
//! assert!(is_reachable(Vec2::new(0.0, 0.0), Vec2::new(3.0, 2.0), Ability::NONE, &physics));
//! assert!(!is_reachable(Vec2::new(0.0, 0.0), Vec2::new(6.0, 2.0), Ability::NONE, &physics));
//! ```

use serde::{Deserialize, Serialize};

use crate::capability::Ability;

/// Standard gravity, scaled by `JumpPhysics::gravity_scale`.
pub const GRAVITY: f32 = 9.81;
/// Double jump stretches the distance budget by this factor.
pub const DOUBLE_JUMP_DISTANCE_FACTOR: f32 = 1.2;
/// Maximum horizontal offset for a wall-jump column.
pub const WALL_JUMP_MAX_OFFSET: f32 = 2.0;
/// Wall jumps chain up to this many times `wall_jump_height`.
pub const WALL_JUMP_HEIGHT_FACTOR: f32 = 3.0;
/// Flight time used when both deltas are effectively zero.
pub const MIN_FLIGHT_TIME: f32 = 0.1;
/// Deltas at or below this are treated as zero.
pub const FLAT_EPSILON: f32 = 0.01;

/// Room-local 2D point (x horizontal, y up).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Vec2) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Agent movement constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JumpPhysics {
    pub jump_height: f32,
    pub jump_distance: f32,
    pub double_jump_bonus: f32,
    pub gravity_scale: f32,
    pub wall_jump_height: f32,
    pub dash_distance: f32,
}

impl Default for JumpPhysics {
    fn default() -> Self {
        Self {
            jump_height: 3.0,
            jump_distance: 4.0,
            double_jump_bonus: 1.5,
            gravity_scale: 1.0,
            wall_jump_height: 2.0,
            dash_distance: 3.0,
        }
    }
}

/// Axis-aligned room extent (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoomBounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl RoomBounds {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

/// Ballistic trajectory between two points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JumpTrajectory {
    pub initial_velocity: Vec2,
    pub flight_time: f32,
    /// Apex height above the launch point (0 for purely falling arcs).
    pub peak_height: f32,
    pub is_valid: bool,
}

/// Whether an agent with `ability` can get from `from` to `to`.
pub fn is_reachable(from: Vec2, to: Vec2, ability: Ability, physics: &JumpPhysics) -> bool {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let distance = from.distance(&to);

    let base = distance <= physics.jump_distance && dy <= physics.jump_height;
    if base {
        return true;
    }

    if ability.contains(Ability::DOUBLE_JUMP)
        && distance <= physics.jump_distance * DOUBLE_JUMP_DISTANCE_FACTOR
        && dy <= physics.jump_height + physics.double_jump_bonus
    {
        return true;
    }

    if ability.contains(Ability::WALL_JUMP)
        && dx.abs() <= WALL_JUMP_MAX_OFFSET
        && dy <= physics.wall_jump_height * WALL_JUMP_HEIGHT_FACTOR
    {
        return true;
    }

    ability.contains(Ability::DASH)
        && distance <= physics.jump_distance + physics.dash_distance
        && dy <= physics.jump_height
}

/// Derive the ballistic arc from `from` to `to`.
///
/// Flight time comes from the vertical drop (`sqrt(2|Δy|/g)`). For flat
/// jumps it is `|Δx| / jump_distance` instead, and `MIN_FLIGHT_TIME` when
/// the points coincide. Non-positive gravity yields an invalid, zeroed arc.
pub fn calculate_jump_arc(from: Vec2, to: Vec2, physics: &JumpPhysics) -> JumpTrajectory {
    let gravity = physics.gravity_scale * GRAVITY;
    if gravity <= 0.0 || !gravity.is_finite() {
        return JumpTrajectory {
            initial_velocity: Vec2::default(),
            flight_time: 0.0,
            peak_height: 0.0,
            is_valid: false,
        };
    }

    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let horizontal = dx.abs();

    let flight_time = if dy.abs() > FLAT_EPSILON {
        (2.0 * dy.abs() / gravity).sqrt()
    } else if horizontal > FLAT_EPSILON && physics.jump_distance > 0.0 {
        horizontal / physics.jump_distance
    } else {
        MIN_FLIGHT_TIME
    };

    let vx = dx / flight_time;
    let vy = (dy + 0.5 * gravity * flight_time * flight_time) / flight_time;
    let peak_height = if vy > 0.0 {
        vy * vy / (2.0 * gravity)
    } else {
        0.0
    };

    let is_valid =
        from.distance(&to) <= physics.jump_distance && vy.abs() <= 2.0 * physics.jump_height;

    JumpTrajectory {
        initial_velocity: Vec2::new(vx, vy),
        flight_time,
        peak_height,
        is_valid,
    }
}

/// Indices of critical areas the agent cannot reach from `entrance`.
///
/// An area counts as reached if it coincides with the entrance, is directly
/// reachable, or is reachable from another critical area that is itself
/// directly reachable (a single intermediate hop). Areas outside `bounds`
/// always fail; an entrance outside `bounds` fails every area.
pub fn unreachable_areas(
    entrance: Vec2,
    critical_areas: &[Vec2],
    ability: Ability,
    physics: &JumpPhysics,
    bounds: &RoomBounds,
) -> Vec<usize> {
    if !bounds.contains(entrance) {
        log::warn!(
            "Room entrance ({:.1},{:.1}) lies outside room bounds",
            entrance.x,
            entrance.y
        );
        return (0..critical_areas.len()).collect();
    }

    let in_bounds: Vec<bool> = critical_areas.iter().map(|&a| bounds.contains(a)).collect();
    let direct: Vec<bool> = critical_areas
        .iter()
        .zip(&in_bounds)
        .map(|(&area, &inside)| inside && is_reachable(entrance, area, ability, physics))
        .collect();

    let mut failed = Vec::new();
    for (i, &area) in critical_areas.iter().enumerate() {
        if !in_bounds[i] {
            log::warn!(
                "Critical area #{} ({:.1},{:.1}) lies outside room bounds",
                i,
                area.x,
                area.y
            );
            failed.push(i);
            continue;
        }
        if entrance.distance(&area) <= FLAT_EPSILON || direct[i] {
            continue;
        }
        let via_hop = critical_areas.iter().enumerate().any(|(j, &hop)| {
            j != i && direct[j] && is_reachable(hop, area, ability, physics)
        });
        if !via_hop {
            failed.push(i);
        }
    }
    failed
}

/// True when every critical area is reachable from `entrance` directly or
/// through one other critical area.
pub fn validate_room_reachability(
    entrance: Vec2,
    critical_areas: &[Vec2],
    ability: Ability,
    physics: &JumpPhysics,
    bounds: &RoomBounds,
) -> bool {
    unreachable_areas(entrance, critical_areas, ability, physics, bounds).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn physics() -> JumpPhysics {
        JumpPhysics {
            jump_height: 3.0,
            jump_distance: 4.0,
            double_jump_bonus: 2.0,
            gravity_scale: 1.0,
            wall_jump_height: 2.0,
            dash_distance: 6.0,
        }
    }

    fn p(x: f32, y: f32) -> Vec2 {
        Vec2::new(x, y)
    }

    fn room() -> RoomBounds {
        RoomBounds::new(p(-50.0, -50.0), p(50.0, 50.0))
    }

    #[test]
    fn base_jump_within_budget() {
        assert!(is_reachable(p(0.0, 0.0), p(3.0, 2.0), Ability::NONE, &physics()));
    }

    #[test]
    fn too_far_without_dash() {
        assert!(!is_reachable(p(0.0, 0.0), p(6.0, 2.0), Ability::NONE, &physics()));
    }

    #[test]
    fn dash_extends_distance() {
        assert!(is_reachable(p(0.0, 0.0), p(6.0, 2.0), Ability::DASH, &physics()));
        // Dash does not add height.
        assert!(!is_reachable(p(0.0, 0.0), p(1.0, 4.0), Ability::DASH, &physics()));
    }

    #[test]
    fn falling_is_free_within_distance() {
        assert!(is_reachable(p(0.0, 10.0), p(0.0, 7.0), Ability::NONE, &physics()));
    }

    #[test]
    fn double_jump_extends_height_and_distance() {
        // distance ≈ 4.61 (> 4, ≤ 4.8), height 4 (> 3, ≤ 5)
        let to = p(2.3, 4.0);
        assert!(!is_reachable(p(0.0, 0.0), to, Ability::NONE, &physics()));
        assert!(is_reachable(p(0.0, 0.0), to, Ability::DOUBLE_JUMP, &physics()));
        assert!(!is_reachable(p(0.0, 0.0), p(0.0, 5.5), Ability::DOUBLE_JUMP, &physics()));
    }

    #[test]
    fn wall_jump_climbs_columns() {
        assert!(is_reachable(p(0.0, 0.0), p(1.5, 6.0), Ability::WALL_JUMP, &physics()));
        assert!(!is_reachable(p(0.0, 0.0), p(2.5, 6.0), Ability::WALL_JUMP, &physics()));
        assert!(!is_reachable(p(0.0, 0.0), p(1.0, 6.5), Ability::WALL_JUMP, &physics()));
    }

    #[test]
    fn abilities_do_not_combine() {
        // Needs both dash distance and double-jump height: neither path alone.
        let to = p(7.0, 4.0);
        assert!(!is_reachable(
            p(0.0, 0.0),
            to,
            Ability::DASH | Ability::DOUBLE_JUMP,
            &physics()
        ));
    }

    #[test]
    fn arc_uses_vertical_flight_time() {
        let arc = calculate_jump_arc(p(0.0, 0.0), p(2.0, 1.0), &physics());
        let expected_t = (2.0f32 / GRAVITY).sqrt();
        assert!((arc.flight_time - expected_t).abs() < 1e-5);
        assert!((arc.initial_velocity.x - 2.0 / expected_t).abs() < 1e-4);
        // Lands at the target height after flight_time.
        let y = arc.initial_velocity.y * arc.flight_time
            - 0.5 * GRAVITY * arc.flight_time * arc.flight_time;
        assert!((y - 1.0).abs() < 1e-4);
        assert!(arc.peak_height >= 1.0 - 1e-4);
        assert!(arc.is_valid);
    }

    #[test]
    fn flat_jump_falls_back_to_distance_ratio() {
        let arc = calculate_jump_arc(p(0.0, 0.0), p(3.0, 0.0), &physics());
        assert!((arc.flight_time - 0.75).abs() < 1e-6);
        assert!(arc.initial_velocity.y > 0.0);
        assert!(arc.is_valid);
    }

    #[test]
    fn coincident_points_use_min_flight_time() {
        let arc = calculate_jump_arc(p(1.0, 1.0), p(1.0, 1.0), &physics());
        assert_eq!(arc.flight_time, MIN_FLIGHT_TIME);
        assert!(arc.is_valid);
    }

    #[test]
    fn arc_invalid_when_too_far() {
        let arc = calculate_jump_arc(p(0.0, 0.0), p(9.0, 0.0), &physics());
        assert!(!arc.is_valid);
    }

    #[test]
    fn arc_invalid_when_too_steep() {
        // vy = sqrt(2 * 3.5 * g) ≈ 8.3 > 2 × 3
        let arc = calculate_jump_arc(p(0.0, 0.0), p(0.0, 3.5), &physics());
        assert!(!arc.is_valid);
    }

    #[test]
    fn zero_gravity_arc_invalid() {
        let mut phys = physics();
        phys.gravity_scale = 0.0;
        let arc = calculate_jump_arc(p(0.0, 0.0), p(1.0, 1.0), &phys);
        assert!(!arc.is_valid);
        assert_eq!(arc.flight_time, 0.0);
    }

    #[test]
    fn room_direct_reachability() {
        let areas = [p(3.0, 0.0), p(-2.0, 2.0)];
        assert!(validate_room_reachability(
            p(0.0, 0.0),
            &areas,
            Ability::NONE,
            &physics(),
            &room()
        ));
    }

    #[test]
    fn room_accepts_single_intermediate_hop() {
        // (7,0) is too far directly, but (3.5,0) is on the way.
        let areas = [p(7.0, 0.0), p(3.5, 0.0)];
        let failed = unreachable_areas(p(0.0, 0.0), &areas, Ability::NONE, &physics(), &room());
        assert!(failed.is_empty());
    }

    #[test]
    fn room_rejects_two_intermediate_hops() {
        let areas = [p(3.5, 0.0), p(7.0, 0.0), p(10.5, 0.0)];
        let failed = unreachable_areas(p(0.0, 0.0), &areas, Ability::NONE, &physics(), &room());
        assert_eq!(failed, vec![2]);
    }

    #[test]
    fn room_hop_must_be_directly_reachable() {
        // Area 1 is only reachable via area 0, which is itself unreachable.
        let areas = [p(20.0, 0.0), p(23.0, 0.0)];
        let failed = unreachable_areas(p(0.0, 0.0), &areas, Ability::NONE, &physics(), &room());
        assert_eq!(failed, vec![0, 1]);
    }

    #[test]
    fn room_out_of_bounds_area_fails() {
        let bounds = RoomBounds::new(p(0.0, 0.0), p(5.0, 5.0));
        let areas = [p(2.0, 0.0), p(6.0, 0.0)];
        let failed = unreachable_areas(p(0.0, 0.0), &areas, Ability::DASH, &physics(), &bounds);
        assert_eq!(failed, vec![1]);
    }

    #[test]
    fn room_entrance_out_of_bounds_fails_everything() {
        let bounds = RoomBounds::new(p(0.0, 0.0), p(5.0, 5.0));
        let areas = [p(1.0, 0.0)];
        assert!(!validate_room_reachability(
            p(-1.0, 0.0),
            &areas,
            Ability::NONE,
            &physics(),
            &bounds
        ));
    }

    #[test]
    fn room_area_at_entrance_passes() {
        let areas = [p(0.0, 0.0)];
        assert!(validate_room_reachability(
            p(0.0, 0.0),
            &areas,
            Ability::NONE,
            &physics(),
            &room()
        ));
    }

    #[test]
    fn empty_room_is_valid() {
        assert!(validate_room_reachability(
            p(0.0, 0.0),
            &[],
            Ability::NONE,
            &physics(),
            &room()
        ));
    }
}
