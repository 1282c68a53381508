//! Pure reachability validation for Softlock world graphs.
//!
//! This crate contains the logic that decides whether a generated
//! Metroidvania world can softlock the player. Functions take plain data
//! (a world graph snapshot, capability profiles, physics constants) and
//! return results, making them unit-testable and usable from the content
//! generation pipeline, offline validation tools, and editor tooling alike.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`capability`] | Polarity/ability bit flags and agent capability profiles |
//! | [`config`] | Validator configuration (cost knobs, physics, profiles) |
//! | [`graph`] | Traversal nodes and capability-gated links (arena storage) |
//! | [`jump_arc`] | Physics-based point-to-point and room-level jump checks |
//! | [`path_query`] | Point-to-point path existence, BFS and cheapest paths |
//! | [`quickfix`] | Rule table mapping report issues to remediation fixes |
//! | [`reachability`] | BFS closure and multi-profile validation reports |
//! | [`traversal`] | Link traversal predicate and cost function |

pub mod capability;
pub mod config;
pub mod graph;
pub mod jump_arc;
pub mod path_query;
pub mod quickfix;
pub mod reachability;
pub mod traversal;
