//! Elemental types and the attack/defence effectiveness chart.

use serde::Serialize;

use crate::{RandomiserError, Result};

pub const TYPE_COUNT: usize = 18;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[repr(u8)]
pub enum PokemonType {
    Normal = 0,
    Fire = 1,
    Water = 2,
    Electric = 3,
    Grass = 4,
    Ice = 5,
    Fighting = 6,
    Poison = 7,
    Ground = 8,
    Flying = 9,
    Psychic = 10,
    Bug = 11,
    Rock = 12,
    Ghost = 13,
    Dragon = 14,
    Dark = 15,
    Steel = 16,
    Fairy = 17,
}

impl PokemonType {
    pub const ALL: [PokemonType; TYPE_COUNT] = [
        PokemonType::Normal,
        PokemonType::Fire,
        PokemonType::Water,
        PokemonType::Electric,
        PokemonType::Grass,
        PokemonType::Ice,
        PokemonType::Fighting,
        PokemonType::Poison,
        PokemonType::Ground,
        PokemonType::Flying,
        PokemonType::Psychic,
        PokemonType::Bug,
        PokemonType::Rock,
        PokemonType::Ghost,
        PokemonType::Dragon,
        PokemonType::Dark,
        PokemonType::Steel,
        PokemonType::Fairy,
    ];

    pub fn from_id(id: u8) -> Result<Self> {
        Self::ALL
            .get(id as usize)
            .copied()
            .ok_or(RandomiserError::UnknownType(id))
    }

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            PokemonType::Normal => "Normal",
            PokemonType::Fire => "Fire",
            PokemonType::Water => "Water",
            PokemonType::Electric => "Electric",
            PokemonType::Grass => "Grass",
            PokemonType::Ice => "Ice",
            PokemonType::Fighting => "Fighting",
            PokemonType::Poison => "Poison",
            PokemonType::Ground => "Ground",
            PokemonType::Flying => "Flying",
            PokemonType::Psychic => "Psychic",
            PokemonType::Bug => "Bug",
            PokemonType::Rock => "Rock",
            PokemonType::Ghost => "Ghost",
            PokemonType::Dragon => "Dragon",
            PokemonType::Dark => "Dark",
            PokemonType::Steel => "Steel",
            PokemonType::Fairy => "Fairy",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(name))
    }
}

use PokemonType::*;

type Matchup = (PokemonType, PokemonType);

/// (attacker, defender) pairs that deal double damage.
pub const SUPER_EFFECTIVE: &[Matchup] = &[
    (Fire, Grass),
    (Fire, Ice),
    (Fire, Bug),
    (Fire, Steel),
    (Water, Fire),
    (Water, Ground),
    (Water, Rock),
    (Electric, Water),
    (Electric, Flying),
    (Grass, Water),
    (Grass, Ground),
    (Grass, Rock),
    (Ice, Grass),
    (Ice, Ground),
    (Ice, Flying),
    (Ice, Dragon),
    (Fighting, Normal),
    (Fighting, Ice),
    (Fighting, Rock),
    (Fighting, Dark),
    (Fighting, Steel),
    (Poison, Grass),
    (Poison, Fairy),
    (Ground, Fire),
    (Ground, Electric),
    (Ground, Poison),
    (Ground, Rock),
    (Ground, Steel),
    (Flying, Electric),
    (Flying, Grass),
    (Flying, Fighting),
    (Flying, Bug),
    (Psychic, Fighting),
    (Psychic, Poison),
    (Bug, Grass),
    (Bug, Psychic),
    (Bug, Dark),
    (Rock, Fire),
    (Rock, Ice),
    (Rock, Flying),
    (Rock, Bug),
    (Ghost, Psychic),
    (Ghost, Ghost),
    (Dragon, Dragon),
    (Dark, Psychic),
    (Dark, Ghost),
    (Steel, Ice),
    (Steel, Rock),
    (Steel, Fairy),
    (Fairy, Fighting),
    (Fairy, Dragon),
    (Fairy, Dark),
];

/// (attacker, defender) pairs that deal half damage.
pub const RESISTED: &[Matchup] = &[
    (Fire, Fire),
    (Fire, Water),
    (Fire, Rock),
    (Fire, Dragon),
    (Water, Water),
    (Water, Grass),
    (Water, Dragon),
    (Electric, Electric),
    (Electric, Grass),
    (Electric, Dragon),
    (Grass, Fire),
    (Grass, Grass),
    (Grass, Poison),
    (Grass, Flying),
    (Grass, Bug),
    (Grass, Dragon),
    (Grass, Steel),
    (Ice, Fire),
    (Ice, Water),
    (Ice, Ice),
    (Ice, Steel),
    (Fighting, Poison),
    (Fighting, Flying),
    (Fighting, Psychic),
    (Fighting, Bug),
    (Fighting, Fairy),
    (Poison, Poison),
    (Poison, Ground),
    (Poison, Rock),
    (Poison, Ghost),
    (Flying, Electric),
    (Flying, Rock),
    (Flying, Steel),
    (Psychic, Psychic),
    (Psychic, Steel),
    (Bug, Fire),
    (Bug, Fighting),
    (Bug, Poison),
    (Bug, Flying),
    (Bug, Ghost),
    (Bug, Steel),
    (Bug, Fairy),
    (Rock, Fighting),
    (Rock, Ground),
    (Rock, Steel),
    (Ghost, Dark),
    (Dragon, Steel),
    (Dark, Fighting),
    (Dark, Dark),
    (Dark, Fairy),
    (Steel, Fire),
    (Steel, Water),
    (Steel, Electric),
    (Steel, Steel),
    (Fairy, Fire),
    (Fairy, Poison),
    (Fairy, Steel),
];

/// (attacker, defender) pairs that deal no damage.
pub const IMMUNE: &[Matchup] = &[
    (Normal, Ghost),
    (Electric, Ground),
    (Fighting, Ghost),
    (Poison, Steel),
    (Ground, Flying),
    (Psychic, Dark),
    (Ghost, Normal),
];

const ALLOWED_MULTIPLIERS: [f32; 6] = [0.0, 0.25, 0.5, 1.0, 2.0, 4.0];

/// Immutable 18x18 multiplier table indexed `[attacker][defender]`.
///
/// Not symmetric: `effectiveness(a, d)` and `effectiveness(d, a)` are
/// independent entries.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeChart {
    cells: [[f32; TYPE_COUNT]; TYPE_COUNT],
}

impl TypeChart {
    /// Applies the three lists in a fixed order (double, half, none), so a
    /// pair listed twice keeps the value from the later list.
    pub fn from_overrides(
        super_effective: &[Matchup],
        resisted: &[Matchup],
        immune: &[Matchup],
    ) -> Self {
        let mut cells = [[1.0f32; TYPE_COUNT]; TYPE_COUNT];
        for (list, value) in [(super_effective, 2.0), (resisted, 0.5), (immune, 0.0)] {
            for &(attacker, defender) in list {
                cells[attacker as usize][defender as usize] = value;
            }
        }
        Self { cells }
    }

    pub fn effectiveness(&self, attacker: PokemonType, defender: PokemonType) -> f32 {
        self.cells[attacker as usize][defender as usize]
    }

    /// Multiplier against a possibly dual-typed defender: the product of the
    /// two single-type lookups. A repeated second type counts once.
    pub fn dual_effectiveness(
        &self,
        attacker: PokemonType,
        defender1: PokemonType,
        defender2: Option<PokemonType>,
    ) -> f32 {
        let first = self.effectiveness(attacker, defender1);
        let second = match defender2 {
            Some(t) if t != defender1 => self.effectiveness(attacker, t),
            _ => 1.0,
        };
        clamp_multiplier(first * second)
    }

    /// Same as `dual_effectiveness` for raw type ids from a decoded record.
    pub fn dual_effectiveness_ids(&self, attacker: u8, defender1: u8, defender2: Option<u8>) -> Result<f32> {
        let second = defender2.map(PokemonType::from_id).transpose()?;
        Ok(self.dual_effectiveness(
            PokemonType::from_id(attacker)?,
            PokemonType::from_id(defender1)?,
            second,
        ))
    }

    pub fn is_super_effective(&self, attacker: PokemonType, defender: PokemonType) -> bool {
        self.effectiveness(attacker, defender) > 1.0
    }
}

/// Snaps a product onto the representable set {0, .25, .5, 1, 2, 4}.
pub fn clamp_multiplier(value: f32) -> f32 {
    ALLOWED_MULTIPLIERS
        .iter()
        .copied()
        .min_by(|a, b| {
            (a - value)
                .abs()
                .partial_cmp(&(b - value).abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .unwrap_or(1.0)
}

/// Pairs listed in more than one override list.
pub fn conflicting_overrides(
    super_effective: &[Matchup],
    resisted: &[Matchup],
    immune: &[Matchup],
) -> Vec<Matchup> {
    let mut seen = [[0u8; TYPE_COUNT]; TYPE_COUNT];
    for list in [super_effective, resisted, immune] {
        let mut in_this_list = [[false; TYPE_COUNT]; TYPE_COUNT];
        for &(a, d) in list {
            in_this_list[a as usize][d as usize] = true;
        }
        for a in 0..TYPE_COUNT {
            for d in 0..TYPE_COUNT {
                if in_this_list[a][d] {
                    seen[a][d] += 1;
                }
            }
        }
    }

    let mut out = Vec::new();
    for a in PokemonType::ALL {
        for d in PokemonType::ALL {
            if seen[a as usize][d as usize] > 1 {
                out.push((a, d));
            }
        }
    }
    out
}

/// Builds the standard chart, logging any pair that two lists disagree on.
pub fn build_type_chart() -> TypeChart {
    for (attacker, defender) in conflicting_overrides(SUPER_EFFECTIVE, RESISTED, IMMUNE) {
        tracing::warn!(
            "type override listed more than once: {} -> {}, later list wins",
            attacker.name(),
            defender.name()
        );
    }
    TypeChart::from_overrides(SUPER_EFFECTIVE, RESISTED, IMMUNE)
}
