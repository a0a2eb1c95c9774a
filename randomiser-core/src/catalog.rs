//! Read-only reference catalogs for moves and abilities.

use rand::Rng;
use serde::Serialize;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use crate::types::PokemonType;
use crate::{RandomiserError, Result};

/// Inclusive id range that one game generation introduced.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GenerationRange {
    pub generation: u8,
    pub first: u16,
    pub last: u16,
}

const fn gen_range(generation: u8, first: u16, last: u16) -> GenerationRange {
    GenerationRange {
        generation,
        first,
        last,
    }
}

pub const ABILITY_GENERATIONS: &[GenerationRange] = &[
    gen_range(3, 1, 76),
    gen_range(4, 77, 123),
    gen_range(5, 124, 164),
    gen_range(6, 165, 191),
    gen_range(7, 192, 235),
    gen_range(8, 236, 266),
    gen_range(9, 267, 295),
];

pub const MOVE_GENERATIONS: &[GenerationRange] = &[
    gen_range(3, 1, 354),
    gen_range(4, 355, 467),
    gen_range(5, 468, 617),
    gen_range(6, 618, 718),
    gen_range(7, 719, 795),
    gen_range(8, 796, 850),
    gen_range(9, 851, 919),
];

pub trait CatalogEntry {
    fn id(&self) -> u16;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum MoveCategory {
    Physical,
    Special,
    Status,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CatalogMove {
    pub id: u16,
    pub name: &'static str,
    pub move_type: PokemonType,
    pub category: MoveCategory,
    pub power: u8,
    pub accuracy: u8,
    pub pp: u8,
}

impl CatalogEntry for CatalogMove {
    fn id(&self) -> u16 {
        self.id
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AbilityEntry {
    pub id: u16,
    pub name: &'static str,
    pub effect: &'static str,
}

impl CatalogEntry for AbilityEntry {
    fn id(&self) -> u16 {
        self.id
    }
}

/// Entries keyed by id plus the generation buckets their ids fall into.
#[derive(Clone, Debug)]
pub struct Catalog<T> {
    kind: &'static str,
    entries: BTreeMap<u16, T>,
    generations: &'static [GenerationRange],
}

impl<T: CatalogEntry> Catalog<T> {
    pub fn new(
        kind: &'static str,
        generations: &'static [GenerationRange],
        entries: impl IntoIterator<Item = T>,
    ) -> Self {
        Self {
            kind,
            entries: entries.into_iter().map(|e| (e.id(), e)).collect(),
            generations,
        }
    }

    pub fn get(&self, id: u16) -> Result<&T> {
        self.entries.get(&id).ok_or(RandomiserError::UnknownId {
            catalog: self.kind,
            id,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.values()
    }

    /// Inclusive id range of a generation bucket.
    pub fn by_generation(&self, generation: u8) -> Result<RangeInclusive<u16>> {
        self.generations
            .iter()
            .find(|r| r.generation == generation)
            .map(|r| r.first..=r.last)
            .ok_or(RandomiserError::UnknownGeneration(generation as u16))
    }

    /// Generation bucket an id belongs to.
    pub fn generation_of(&self, id: u16) -> Result<u8> {
        self.generations
            .iter()
            .find(|r| (r.first..=r.last).contains(&id))
            .map(|r| r.generation)
            .ok_or(RandomiserError::UnknownGeneration(id))
    }

    /// Known entries whose ids fall in a generation bucket.
    pub fn in_generation(&self, generation: u8) -> Result<Vec<&T>> {
        let range = self.by_generation(generation)?;
        Ok(self.entries.range(range).map(|(_, e)| e).collect())
    }

    /// Uniform draw over every known id.
    pub fn random_in_catalog<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&T> {
        if self.entries.is_empty() {
            return None;
        }
        let idx = rng.gen_range(0..self.entries.len());
        self.entries.values().nth(idx)
    }
}

pub type MoveCatalog = Catalog<CatalogMove>;
pub type AbilityCatalog = Catalog<AbilityEntry>;

impl Catalog<CatalogMove> {
    pub fn by_type(&self, move_type: PokemonType) -> Vec<&CatalogMove> {
        self.iter().filter(|m| m.move_type == move_type).collect()
    }

    pub fn by_category(&self, category: MoveCategory) -> Vec<&CatalogMove> {
        self.iter().filter(|m| m.category == category).collect()
    }
}

const fn mv(
    id: u16,
    name: &'static str,
    move_type: PokemonType,
    category: MoveCategory,
    power: u8,
    accuracy: u8,
    pp: u8,
) -> CatalogMove {
    CatalogMove {
        id,
        name,
        move_type,
        category,
        power,
        accuracy,
        pp,
    }
}

use MoveCategory::{Physical, Special, Status};
use PokemonType as Ty;

const MOVES: &[CatalogMove] = &[
    // Already present in the base game.
    mv(1, "Pound", Ty::Normal, Physical, 40, 100, 35),
    mv(2, "Karate Chop", Ty::Fighting, Physical, 50, 100, 25),
    mv(33, "Tackle", Ty::Normal, Physical, 35, 95, 35),
    mv(53, "Flamethrower", Ty::Fire, Special, 95, 100, 15),
    mv(57, "Surf", Ty::Water, Special, 95, 100, 15),
    mv(58, "Ice Beam", Ty::Ice, Special, 95, 100, 10),
    mv(85, "Thunderbolt", Ty::Electric, Special, 95, 100, 15),
    mv(89, "Earthquake", Ty::Ground, Physical, 100, 100, 10),
    mv(94, "Psychic", Ty::Psychic, Special, 90, 100, 10),
    // Gen 4
    mv(355, "Roost", Ty::Flying, Status, 0, 100, 10),
    mv(356, "Gravity", Ty::Psychic, Status, 0, 100, 5),
    mv(357, "Miracle Eye", Ty::Psychic, Status, 0, 100, 40),
    mv(358, "Wake-Up Slap", Ty::Fighting, Physical, 70, 100, 10),
    mv(359, "Hammer Arm", Ty::Fighting, Physical, 100, 90, 10),
    mv(360, "Gyro Ball", Ty::Steel, Physical, 1, 100, 5),
    mv(361, "Healing Wish", Ty::Psychic, Status, 0, 100, 10),
    mv(362, "Brine", Ty::Water, Special, 65, 100, 10),
    mv(363, "Natural Gift", Ty::Normal, Physical, 1, 100, 15),
    mv(364, "Feint", Ty::Normal, Physical, 30, 100, 10),
    // Gen 5
    mv(468, "Hone Claws", Ty::Dark, Status, 0, 100, 15),
    mv(469, "Wide Guard", Ty::Rock, Status, 0, 100, 10),
    mv(470, "Guard Split", Ty::Psychic, Status, 0, 100, 10),
    mv(471, "Power Split", Ty::Psychic, Status, 0, 100, 10),
    mv(472, "Wonder Room", Ty::Psychic, Status, 0, 100, 10),
    mv(473, "Psyshock", Ty::Psychic, Special, 80, 100, 10),
    mv(474, "Venoshock", Ty::Poison, Special, 65, 100, 10),
    mv(475, "Autotomize", Ty::Steel, Status, 0, 100, 15),
    mv(476, "Rage Powder", Ty::Bug, Status, 0, 100, 20),
    mv(477, "Telekinesis", Ty::Psychic, Status, 0, 100, 15),
    // Gen 6
    mv(618, "Sticky Web", Ty::Bug, Status, 0, 100, 20),
    mv(619, "Fell Stinger", Ty::Bug, Physical, 50, 100, 25),
    mv(620, "Phantom Force", Ty::Ghost, Physical, 90, 100, 10),
    mv(621, "Trick-or-Treat", Ty::Ghost, Status, 0, 100, 20),
    mv(622, "Noble Roar", Ty::Normal, Status, 0, 100, 30),
    mv(623, "Ion Deluge", Ty::Electric, Status, 0, 100, 25),
    mv(624, "Parabolic Charge", Ty::Electric, Special, 65, 100, 20),
    mv(625, "Forest's Curse", Ty::Grass, Status, 0, 100, 20),
    mv(626, "Petal Blizzard", Ty::Grass, Physical, 90, 100, 15),
    mv(627, "Freeze-Dry", Ty::Ice, Special, 70, 100, 20),
    // Gen 7
    mv(719, "10,000,000 Volt Thunderbolt", Ty::Electric, Special, 195, 100, 1),
    mv(720, "Stoked Sparksurfer", Ty::Electric, Special, 175, 100, 1),
    mv(721, "Extreme Evoboost", Ty::Normal, Status, 0, 100, 1),
    mv(722, "Genesis Supernova", Ty::Psychic, Special, 185, 100, 1),
    mv(723, "Shell Trap", Ty::Fire, Special, 150, 100, 5),
    mv(724, "Fleur Cannon", Ty::Fairy, Special, 130, 90, 5),
    mv(725, "Psychic Fangs", Ty::Psychic, Physical, 85, 100, 10),
    mv(726, "Stomping Tantrum", Ty::Ground, Physical, 75, 100, 10),
    mv(727, "Shadow Bone", Ty::Ghost, Physical, 85, 100, 10),
    mv(728, "Accelerock", Ty::Rock, Physical, 40, 100, 20),
    // Gen 8
    mv(796, "Steel Beam", Ty::Steel, Special, 140, 95, 5),
    mv(797, "Expanding Force", Ty::Psychic, Special, 80, 100, 10),
    mv(798, "Steel Roller", Ty::Steel, Physical, 130, 100, 5),
    mv(799, "Scale Shot", Ty::Dragon, Physical, 25, 90, 20),
    mv(800, "Meteor Beam", Ty::Rock, Special, 120, 90, 10),
    mv(801, "Shell Side Arm", Ty::Poison, Special, 90, 100, 10),
    mv(802, "Misty Explosion", Ty::Fairy, Special, 100, 100, 5),
    mv(803, "Grassy Glide", Ty::Grass, Physical, 70, 100, 20),
    mv(804, "Rising Voltage", Ty::Electric, Special, 70, 100, 20),
    mv(805, "Terrain Pulse", Ty::Normal, Special, 50, 100, 10),
    // Gen 9
    mv(851, "Tera Blast", Ty::Normal, Special, 80, 100, 10),
    mv(852, "Silk Trap", Ty::Bug, Status, 0, 100, 10),
    mv(853, "Axe Kick", Ty::Fighting, Physical, 120, 90, 10),
    mv(854, "Last Respects", Ty::Ghost, Physical, 50, 100, 10),
    mv(855, "Lumina Crash", Ty::Psychic, Special, 80, 100, 10),
    mv(856, "Order Up", Ty::Dragon, Physical, 80, 100, 10),
    mv(857, "Jet Punch", Ty::Water, Physical, 60, 100, 15),
    mv(858, "Spicy Extract", Ty::Grass, Status, 0, 100, 15),
    mv(859, "Spin Out", Ty::Steel, Physical, 100, 100, 5),
    mv(860, "Population Bomb", Ty::Normal, Physical, 20, 90, 10),
];

const fn ab(id: u16, name: &'static str, effect: &'static str) -> AbilityEntry {
    AbilityEntry { id, name, effect }
}

const ABILITIES: &[AbilityEntry] = &[
    ab(1, "Stench", "May cause the target to flinch"),
    ab(2, "Drizzle", "Summons rain on entering battle"),
    ab(3, "Speed Boost", "Raises Speed every turn"),
    ab(4, "Battle Armor", "Blocks critical hits"),
    ab(5, "Sturdy", "Cannot be knocked out in one hit"),
    ab(91, "Adaptability", "Raises same-type attack bonus from 1.5x to 2x"),
    ab(92, "Download", "Raises Attack or Sp. Atk based on the target's defences"),
    ab(93, "Iron Fist", "Boosts punching moves by 20%"),
    ab(94, "Poison Heal", "Restores HP while poisoned"),
    ab(95, "Technician", "Moves with 60 power or less gain 50% power"),
    ab(124, "Multiscale", "Halves damage taken at full HP"),
    ab(125, "Toxic Boost", "Raises Attack while poisoned"),
    ab(126, "Flare Boost", "Raises Sp. Atk while burned"),
    ab(127, "Harvest", "May restore a consumed berry"),
    ab(128, "Telepathy", "Avoids damage from allies in double battles"),
    ab(165, "Competitive", "Raises Sp. Atk when a stat is lowered"),
    ab(166, "Strong Jaw", "Boosts biting moves"),
    ab(167, "Refrigerate", "Normal moves become Ice moves"),
    ab(168, "Pixilate", "Normal moves become Fairy moves"),
    ab(169, "Gooey", "Lowers the attacker's Speed on contact"),
    ab(201, "Water Compaction", "Sharply raises Defense when hit by Water"),
    ab(202, "Merciless", "Always lands critical hits on poisoned targets"),
    ab(203, "Shields Down", "Changes form when HP falls low"),
    ab(204, "Stakeout", "Doubles damage to a target that just switched in"),
    ab(205, "Water Bubble", "Halves Fire damage and boosts Water moves"),
    ab(236, "Cotton Down", "Lowers everyone's Speed when hit"),
    ab(237, "Propeller Tail", "Ignores move redirection"),
    ab(238, "Mirror Armor", "Reflects stat drops"),
    ab(239, "Gulp Missile", "Attacks back after using Surf or Dive"),
    ab(240, "Stalwart", "Ignores move redirection"),
    ab(267, "Lingering Aroma", "The ability persists after switching out"),
    ab(268, "Seed Sower", "Sets Grassy Terrain when hit"),
    ab(269, "Thermal Exchange", "Raises Attack when hit by Fire"),
    ab(270, "Anger Shell", "Raises offensive stats when HP falls low"),
    ab(271, "Purifying Salt", "Prevents status and halves Ghost damage"),
];

pub fn build_move_catalog() -> MoveCatalog {
    Catalog::new("move", MOVE_GENERATIONS, MOVES.iter().cloned())
}

pub fn build_ability_catalog() -> AbilityCatalog {
    Catalog::new("ability", ABILITY_GENERATIONS, ABILITIES.iter().cloned())
}
