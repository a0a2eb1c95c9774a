use serde::{Deserialize, Serialize};

use crate::records::{MoveRecord, Record, SpeciesRecord, TrainerRecord, WildEncounterEntry};
use crate::{RandomiserError, Result};

/// One wild-encounter table. Tables are stored back to back starting at
/// `OffsetTable::wild_pokemon`, in the order they are listed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WildArea {
    pub name: String,
    pub min_level: u8,
    pub max_level: u8,
    pub slots: usize,
}

impl WildArea {
    fn new(name: &str, min_level: u8, max_level: u8, slots: usize) -> Self {
        Self {
            name: name.to_string(),
            min_level,
            max_level,
            slots,
        }
    }
}

/// A named byte range inside the ROM.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Region {
    pub name: &'static str,
    pub start: usize,
    pub len: usize,
}

impl Region {
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

const FIRE_RED_ABILITY_COUNT: usize = 78;

fn default_ability_count() -> usize {
    FIRE_RED_ABILITY_COUNT
}

/// Where each data table lives for one format version.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetTable {
    pub pokemon_data: usize,
    /// Species slots in the base-stats table, including the empty slot 0.
    pub species_count: usize,
    pub move_data: usize,
    /// Move slots in the move table, including the empty slot 0.
    pub move_count: usize,
    /// Abilities the ROM already names, including the empty id 0.
    #[serde(default = "default_ability_count")]
    pub ability_count: usize,
    pub trainer_data: usize,
    pub trainer_count: usize,
    pub wild_pokemon: usize,
    pub wild_areas: Vec<WildArea>,
    /// Each starter is a single u16 species id embedded in the intro script.
    pub starters: [usize; 3],
    /// Where free-space scans begin.
    pub free_space_start: usize,
}

impl OffsetTable {
    /// Pokémon FireRed (U) 1.0.
    pub fn fire_red() -> Self {
        Self {
            pokemon_data: 0x3203CC,
            species_count: 412,
            move_data: 0x250C04,
            move_count: 355,
            ability_count: FIRE_RED_ABILITY_COUNT,
            trainer_data: 0x23EAF0,
            trainer_count: 743,
            wild_pokemon: 0x3C9D50,
            wild_areas: default_wild_areas(),
            starters: [0x169BB5, 0x169D82, 0x169DB8],
            free_space_start: 0x80_0000,
        }
    }

    /// Layout for an accepted header code. Both accepted codes share the
    /// FireRed table positions.
    pub fn for_code(code: &str) -> Option<Self> {
        match code {
            "BPRE" | "BPRF" => Some(Self::fire_red()),
            _ => None,
        }
    }

    /// Offset of a region by its logical name.
    pub fn offset_of(&self, name: &str) -> Option<usize> {
        match name {
            "pokemonData" => Some(self.pokemon_data),
            "moveData" => Some(self.move_data),
            "trainerData" => Some(self.trainer_data),
            "wildPokemon" => Some(self.wild_pokemon),
            _ => None,
        }
    }

    pub fn species_offset(&self, id: u16) -> usize {
        self.pokemon_data + id as usize * SpeciesRecord::SIZE
    }

    pub fn move_offset(&self, id: u16) -> usize {
        self.move_data + id as usize * MoveRecord::SIZE
    }

    pub fn trainer_offset(&self, index: usize) -> usize {
        self.trainer_data + index * TrainerRecord::SIZE
    }

    pub fn wild_area_offset(&self, area_index: usize) -> usize {
        let preceding: usize = self
            .wild_areas
            .iter()
            .take(area_index)
            .map(|a| a.slots)
            .sum();
        self.wild_pokemon + preceding * WildEncounterEntry::SIZE
    }

    pub fn wild_slot_count(&self) -> usize {
        self.wild_areas.iter().map(|a| a.slots).sum()
    }

    pub fn regions(&self) -> Vec<Region> {
        let mut regions = vec![
            Region {
                name: "pokemonData",
                start: self.pokemon_data,
                len: self.species_count * SpeciesRecord::SIZE,
            },
            Region {
                name: "moveData",
                start: self.move_data,
                len: self.move_count * MoveRecord::SIZE,
            },
            Region {
                name: "trainerData",
                start: self.trainer_data,
                len: self.trainer_count * TrainerRecord::SIZE,
            },
            Region {
                name: "wildPokemon",
                start: self.wild_pokemon,
                len: self.wild_slot_count() * WildEncounterEntry::SIZE,
            },
        ];
        for (name, &start) in ["starter0", "starter1", "starter2"]
            .into_iter()
            .zip(self.starters.iter())
        {
            regions.push(Region { name, start, len: 2 });
        }
        regions
    }

    /// Checks that every region fits in a buffer of `rom_len` bytes and that
    /// no two regions overlap.
    pub fn check(&self, rom_len: usize) -> Result<()> {
        let mut regions = self.regions();
        regions.retain(|r| r.len > 0);

        for r in &regions {
            if r.end() > rom_len {
                return Err(RandomiserError::SizeMismatch {
                    record: r.name,
                    offset: r.start,
                    needed: r.len,
                    available: rom_len.saturating_sub(r.start),
                });
            }
        }

        regions.sort_by_key(|r| r.start);
        for pair in regions.windows(2) {
            if pair[0].end() > pair[1].start {
                return Err(RandomiserError::RegionOverlap {
                    first: pair[0].name,
                    second: pair[1].name,
                });
            }
        }

        for area in &self.wild_areas {
            if area.min_level > area.max_level {
                return Err(RandomiserError::Config(format!(
                    "wild area {} has min level {} above max level {}",
                    area.name, area.min_level, area.max_level
                )));
            }
        }

        Ok(())
    }
}

fn default_wild_areas() -> Vec<WildArea> {
    vec![
        WildArea::new("Route 1", 2, 5, 12),
        WildArea::new("Route 2", 3, 6, 12),
        WildArea::new("Viridian Forest", 3, 6, 12),
        WildArea::new("Route 3", 5, 8, 12),
        WildArea::new("Mt. Moon", 6, 11, 12),
        WildArea::new("Route 4", 8, 12, 12),
        WildArea::new("Route 24", 12, 16, 12),
        WildArea::new("Route 25", 12, 16, 12),
        WildArea::new("Rock Tunnel", 15, 20, 12),
        WildArea::new("Pokemon Tower", 18, 24, 12),
        WildArea::new("Safari Zone", 22, 31, 30),
        WildArea::new("Seafoam Islands", 28, 35, 12),
        WildArea::new("Pokemon Mansion", 32, 40, 12),
        WildArea::new("Victory Road", 40, 45, 12),
        WildArea::new("Cerulean Cave", 55, 70, 12),
    ]
}
