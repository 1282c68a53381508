//! Capability model — polarity and ability bit flags plus agent profiles.
//!
//! Requirements and capabilities are plain bitmasks. A requirement is met
//! when every required bit is present in the available mask
//! (`required & !available == 0`); an empty requirement is always met.
//!
//! ```
//! use softlock_logic::capability::{Ability, AgentCapabilities, Polarity};
//!
//! let dasher = AgentCapabilities::new("Dash", Polarity::NONE, Ability::DASH, 0.5);
//! assert!(dasher.available_ability.contains(Ability::DASH));
//! assert!(!dasher.available_ability.contains(Ability::DASH | Ability::GLIDE));
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign, Not};

macro_rules! bitmask {
    ($(#[$meta:meta])* $name:ident($repr:ty)) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub $repr);

        impl $name {
            /// Empty mask (no requirement / nothing available).
            pub const NONE: Self = Self(0);

            /// Raw bits.
            pub const fn bits(self) -> $repr {
                self.0
            }

            pub const fn is_empty(self) -> bool {
                self.0 == 0
            }

            /// True if every bit of `other` is set in `self`.
            pub const fn contains(self, other: Self) -> bool {
                other.0 & !self.0 == 0
            }

            /// Bits of `self` (a requirement) not present in `available`.
            pub const fn missing_from(self, available: Self) -> Self {
                Self(self.0 & !available.0)
            }

            pub const fn union(self, other: Self) -> Self {
                Self(self.0 | other.0)
            }
        }

        impl BitOr for $name {
            type Output = Self;
            fn bitor(self, rhs: Self) -> Self {
                Self(self.0 | rhs.0)
            }
        }

        impl BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: Self) {
                self.0 |= rhs.0;
            }
        }

        impl BitAnd for $name {
            type Output = Self;
            fn bitand(self, rhs: Self) -> Self {
                Self(self.0 & rhs.0)
            }
        }

        impl Not for $name {
            type Output = Self;
            fn not(self) -> Self {
                Self(!self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:#06x}", self.0)
            }
        }
    };
}

bitmask!(
    /// Directional / elemental polarity flags.
    Polarity(u8)
);

bitmask!(
    /// Movement ability flags.
    Ability(u16)
);

impl Polarity {
    pub const NORTH: Self = Self(1 << 0);
    pub const SOUTH: Self = Self(1 << 1);
    pub const EAST: Self = Self(1 << 2);
    pub const WEST: Self = Self(1 << 3);
    pub const FIRE: Self = Self(1 << 4);
    pub const ICE: Self = Self(1 << 5);
    pub const SHOCK: Self = Self(1 << 6);
    pub const VOID: Self = Self(1 << 7);

    /// Every defined polarity.
    pub const fn all() -> Self {
        Self(0xFF)
    }
}

impl Ability {
    pub const DOUBLE_JUMP: Self = Self(1 << 0);
    pub const WALL_JUMP: Self = Self(1 << 1);
    pub const DASH: Self = Self(1 << 2);
    pub const GLIDE: Self = Self(1 << 3);
    pub const SWIM: Self = Self(1 << 4);
    pub const GRAPPLE: Self = Self(1 << 5);
    pub const MORPH: Self = Self(1 << 6);
    pub const PHASE: Self = Self(1 << 7);

    /// Pure movement upgrades (no environmental traversal).
    pub const MOVEMENT: Self = Self(Self::DOUBLE_JUMP.0 | Self::WALL_JUMP.0 | Self::DASH.0);

    /// Movement plus environmental traversal (gliding, swimming, grappling).
    pub const ENVIRONMENTAL: Self =
        Self(Self::MOVEMENT.0 | Self::GLIDE.0 | Self::SWIM.0 | Self::GRAPPLE.0);

    /// Every defined ability.
    pub const fn all() -> Self {
        Self(0xFF)
    }
}

/// Canonical profile labels, in evaluation order.
pub mod profile_labels {
    pub const NO_ABILITIES: &str = "NoAbilities";
    pub const MOVEMENT_ONLY: &str = "MovementOnly";
    pub const ENVIRONMENTAL: &str = "Environmental";
    pub const FULL_POLARITY: &str = "FullPolarity";
    pub const FULL_CAPABILITY: &str = "FullCapability";
}

/// An agent capability profile evaluated against a world graph.
///
/// Immutable once built; `skill_level` is always within [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentCapabilities {
    /// Diagnostic name used to tag report issues.
    pub label: String,
    pub available_polarity: Polarity,
    pub available_ability: Ability,
    /// Player skill in [0, 1]; compared against soft-gate skill minimums.
    #[serde(deserialize_with = "deserialize_skill")]
    pub skill_level: f32,
}

impl AgentCapabilities {
    /// Build a profile, clamping `skill_level` into [0, 1] (NaN becomes 0).
    pub fn new(
        label: impl Into<String>,
        available_polarity: Polarity,
        available_ability: Ability,
        skill_level: f32,
    ) -> Self {
        let label = label.into();
        let clamped = clamp_skill(skill_level);
        if clamped != skill_level {
            log::warn!(
                "Profile '{}': skill level {} clamped to {}",
                label,
                skill_level,
                clamped
            );
        }
        Self {
            label,
            available_polarity,
            available_ability,
            skill_level: clamped,
        }
    }

    /// Re-apply the construction invariants to a profile that was
    /// deserialized or assembled field by field.
    pub fn normalized(self) -> Self {
        Self::new(
            self.label,
            self.available_polarity,
            self.available_ability,
            self.skill_level,
        )
    }

    /// Copy of this profile with extra abilities granted.
    pub fn with_ability(&self, ability: Ability) -> Self {
        Self {
            available_ability: self.available_ability | ability,
            ..self.clone()
        }
    }

    /// Copy of this profile with extra polarities granted.
    pub fn with_polarity(&self, polarity: Polarity) -> Self {
        Self {
            available_polarity: self.available_polarity | polarity,
            ..self.clone()
        }
    }

    /// Whether both masks of a requirement are satisfied.
    pub fn satisfies(&self, polarity: Polarity, ability: Ability) -> bool {
        self.available_polarity.contains(polarity) && self.available_ability.contains(ability)
    }
}

/// Clamp a skill value into [0, 1]; NaN becomes 0.
pub(crate) fn clamp_skill(skill: f32) -> f32 {
    if skill.is_nan() {
        0.0
    } else {
        skill.clamp(0.0, 1.0)
    }
}

/// Deserialize a skill field, clamping it the same way the constructors do.
pub(crate) fn deserialize_skill<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f32::deserialize(deserializer)?;
    let clamped = clamp_skill(raw);
    if clamped != raw {
        log::warn!("Deserialized skill level {} clamped to {}", raw, clamped);
    }
    Ok(clamped)
}

/// The five canonical profiles, from least to most capable.
pub fn canonical_profiles() -> Vec<AgentCapabilities> {
    vec![
        AgentCapabilities::new(profile_labels::NO_ABILITIES, Polarity::NONE, Ability::NONE, 0.0),
        AgentCapabilities::new(
            profile_labels::MOVEMENT_ONLY,
            Polarity::NONE,
            Ability::MOVEMENT,
            0.5,
        ),
        AgentCapabilities::new(
            profile_labels::ENVIRONMENTAL,
            Polarity::NONE,
            Ability::ENVIRONMENTAL,
            0.5,
        ),
        AgentCapabilities::new(
            profile_labels::FULL_POLARITY,
            Polarity::all(),
            Ability::NONE,
            0.5,
        ),
        full_capability(),
    ]
}

/// The maximally capable profile: every polarity, every ability, full skill.
pub fn full_capability() -> AgentCapabilities {
    AgentCapabilities::new(
        profile_labels::FULL_CAPABILITY,
        Polarity::all(),
        Ability::all(),
        1.0,
    )
}
