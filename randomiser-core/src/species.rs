//! Classification of species ids used by the randomisation engine.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::records::SpeciesRecord;

/// Last national-dex number of each generation 1..=8; anything past the last
/// threshold belongs to generation 9.
const GENERATION_THRESHOLDS: [u16; 8] = [151, 251, 386, 493, 649, 721, 809, 905];

/// National-dex ranges.
const LEGENDARY_RANGES: &[(u16, u16)] = &[
    (144, 146),
    (150, 151),
    (243, 245),
    (249, 251),
    (377, 386),
    (480, 494),
    (638, 649),
    (716, 721),
    (772, 773),
    (785, 809),
    (888, 898),
    (905, 905),
    (1001, 1010),
];

/// Unused "?" entries between Celebi and Treecko in the base-stats table.
const PLACEHOLDERS: std::ops::RangeInclusive<u16> = 252..=276;

const FIRST_HOENN_INDEX: u16 = 277;

/// National-dex numbers of table indices 277..=411, in table order.
const HOENN_NATIONAL: [u16; 135] = [
    252, 253, 254, 255, 256, 257, 258, 259, 260, 261, 262, 263, 264, 265, 266, 267, 268, 269, 270,
    271, 272, 273, 274, 275, 290, 291, 292, 276, 277, 285, 286, 327, 278, 279, 283, 284, 320, 321,
    300, 301, 352, 343, 344, 299, 324, 302, 339, 340, 370, 341, 342, 349, 350, 318, 319, 328, 329,
    330, 296, 297, 309, 310, 322, 323, 363, 364, 365, 331, 332, 361, 362, 337, 338, 298, 325, 326,
    311, 312, 303, 307, 308, 333, 334, 360, 355, 356, 315, 287, 288, 289, 316, 317, 357, 293, 294,
    295, 366, 367, 368, 359, 353, 354, 336, 335, 369, 304, 305, 306, 351, 313, 314, 345, 346, 347,
    348, 280, 281, 282, 371, 372, 373, 374, 375, 376, 377, 378, 379, 382, 383, 384, 380, 381, 385,
    386, 358,
];

/// Last index of the base game's table (Chimecho).
const LAST_BASE_INDEX: u16 = FIRST_HOENN_INDEX + HOENN_NATIONAL.len() as u16 - 1;

pub fn is_placeholder(id: u16) -> bool {
    PLACEHOLDERS.contains(&id)
}

/// National-dex number of a species table index.
///
/// Indices 1..=251 already are national numbers and 277..=411 are Hoenn
/// species in the game's own order. Indices past Chimecho are assumed to
/// continue in national order, the way expanded ROMs append Gen 4+ species.
/// Placeholder slots and index 0 have no national number.
pub fn national_dex(id: u16) -> Option<u16> {
    match id {
        0 => None,
        1..=251 => Some(id),
        _ if is_placeholder(id) => None,
        _ if id <= LAST_BASE_INDEX => Some(HOENN_NATIONAL[(id - FIRST_HOENN_INDEX) as usize]),
        _ => Some(id - (PLACEHOLDERS.end() - PLACEHOLDERS.start() + 1)),
    }
}

fn national_generation(national: u16) -> u8 {
    GENERATION_THRESHOLDS
        .iter()
        .position(|&last| national <= last)
        .map(|i| i as u8 + 1)
        .unwrap_or(9)
}

/// Generation of a species table index. Placeholders sit inside the Gen 3
/// block of the table and are counted there.
pub fn generation_of(id: u16) -> u8 {
    national_dex(id).map_or(3, national_generation)
}

pub fn is_legendary(id: u16) -> bool {
    national_dex(id).is_some_and(|n| {
        LEGENDARY_RANGES
            .iter()
            .any(|&(first, last)| (first..=last).contains(&n))
    })
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum EvolutionStage {
    Base,
    First,
    Final,
}

impl EvolutionStage {
    /// Stage from position in a three-member line. Real evolution data is
    /// not decoded, so this follows id order.
    pub fn of(id: u16) -> Self {
        match id % 3 {
            1 => EvolutionStage::Base,
            2 => EvolutionStage::First,
            _ => EvolutionStage::Final,
        }
    }
}

/// Everything the engine needs to know about one species.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SpeciesEntry {
    pub id: u16,
    pub generation: u8,
    pub stage: EvolutionStage,
    pub legendary: bool,
    pub type1: u8,
    pub type2: Option<u8>,
    pub bst: u16,
}

impl SpeciesEntry {
    pub fn from_record(id: u16, record: &SpeciesRecord) -> Self {
        Self {
            id,
            generation: generation_of(id),
            stage: EvolutionStage::of(id),
            legendary: is_legendary(id),
            type1: record.type1,
            type2: record.type2,
            bst: record.base_stats.total(),
        }
    }

    /// Profile for an id with no decoded record (types unknown, BST 0).
    fn unknown(id: u16) -> Self {
        Self {
            id,
            generation: generation_of(id),
            stage: EvolutionStage::of(id),
            legendary: is_legendary(id),
            type1: 0,
            type2: None,
            bst: 0,
        }
    }

    /// Distinct type ids, primary first.
    pub fn types(&self) -> Vec<u8> {
        match self.type2 {
            Some(t) if t != self.type1 => vec![self.type1, t],
            _ => vec![self.type1],
        }
    }

    pub fn has_type(&self, t: u8) -> bool {
        self.type1 == t || self.type2 == Some(t)
    }
}

/// Candidate species keyed by id.
#[derive(Clone, Debug, Default)]
pub struct SpeciesPool {
    entries: BTreeMap<u16, SpeciesEntry>,
}

impl SpeciesPool {
    /// Pool over a decoded table. Placeholder slots are left out.
    pub fn from_table(table: &BTreeMap<u16, SpeciesRecord>) -> Self {
        Self {
            entries: table
                .iter()
                .filter(|(&id, _)| !is_placeholder(id))
                .map(|(&id, record)| (id, SpeciesEntry::from_record(id, record)))
                .collect(),
        }
    }

    pub fn get(&self, id: u16) -> Option<&SpeciesEntry> {
        self.entries.get(&id)
    }

    /// Pool entry for `id`, or an id-only classification if it is missing.
    pub fn profile(&self, id: u16) -> SpeciesEntry {
        self.entries
            .get(&id)
            .cloned()
            .unwrap_or_else(|| SpeciesEntry::unknown(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpeciesEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
