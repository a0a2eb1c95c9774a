//! Writes catalog entries the base game lacks into unused ROM space.

use serde::Serialize;

use crate::catalog::{AbilityCatalog, AbilityEntry, CatalogMove, MoveCatalog};
use crate::layout::OffsetTable;
use crate::records::{MoveRecord, Record};
use crate::rom::Rom;
use crate::Result;

/// Ability names are stored as fixed 13-byte, NUL-padded strings.
pub const ABILITY_NAME_LEN: usize = 13;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub offset: usize,
    pub len: usize,
    pub ids: Vec<u16>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExpansionReport {
    pub moves: Option<Placement>,
    pub ability_names: Option<Placement>,
}

impl CatalogMove {
    pub fn to_record(&self) -> MoveRecord {
        MoveRecord {
            power: self.power,
            move_type: self.move_type.id(),
            accuracy: self.accuracy,
            pp: self.pp,
            ..MoveRecord::default()
        }
    }
}

fn reserve(rom: &Rom, label: &str, len: usize, start: usize) -> Option<usize> {
    let found = rom.find_free_run(len, start);
    if found.is_none() {
        tracing::warn!("no free run of {} bytes for {} after 0x{:06X}", len, label, start);
    }
    found
}

/// Moves whose ids lie past the ROM's move table go first, then the names
/// of abilities past the ROM's ability count. Each block is placed in the first 0xFF run large enough to
/// hold it; a block that does not fit is skipped and left out of the report.
pub fn expand_catalogs(
    rom: &mut Rom,
    layout: &OffsetTable,
    moves: &MoveCatalog,
    abilities: &AbilityCatalog,
) -> Result<ExpansionReport> {
    let mut report = ExpansionReport::default();
    let mut cursor = layout.free_space_start;

    let new_moves: Vec<&CatalogMove> = moves
        .iter()
        .filter(|m| m.id as usize >= layout.move_count)
        .collect();
    if !new_moves.is_empty() {
        let len = new_moves.len() * MoveRecord::SIZE;
        if let Some(offset) = reserve(rom, "moves", len, cursor) {
            for (i, m) in new_moves.iter().enumerate() {
                m.to_record().encode(rom, offset + i * MoveRecord::SIZE)?;
            }
            tracing::info!("wrote {} catalog moves at 0x{:06X}", new_moves.len(), offset);
            cursor = offset + len;
            report.moves = Some(Placement {
                offset,
                len,
                ids: new_moves.iter().map(|m| m.id).collect(),
            });
        }
    }

    let new_abilities: Vec<&AbilityEntry> = abilities
        .iter()
        .filter(|a| a.id as usize >= layout.ability_count)
        .collect();
    if !new_abilities.is_empty() {
        let len = new_abilities.len() * ABILITY_NAME_LEN;
        if let Some(offset) = reserve(rom, "ability names", len, cursor) {
            for (i, a) in new_abilities.iter().enumerate() {
                rom.write_fixed_string(offset + i * ABILITY_NAME_LEN, a.name, ABILITY_NAME_LEN)?;
            }
            tracing::info!("wrote {} ability names at 0x{:06X}", new_abilities.len(), offset);
            report.ability_names = Some(Placement {
                offset,
                len,
                ids: new_abilities.iter().map(|a| a.id).collect(),
            });
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{build_ability_catalog, build_move_catalog};

    fn small_layout(free_space_start: usize) -> OffsetTable {
        OffsetTable {
            move_count: 355,
            free_space_start,
            ..OffsetTable::fire_red()
        }
    }

    #[test]
    fn writes_moves_then_names_into_free_space() {
        let mut bytes = vec![0u8; 0x2000];
        bytes[0x100..].fill(0xFF);
        let mut rom = Rom::from_bytes(bytes);
        let moves = build_move_catalog();
        let abilities = build_ability_catalog();

        let report = expand_catalogs(&mut rom, &small_layout(0x80), &moves, &abilities).unwrap();

        let placed = report.moves.unwrap();
        assert_eq!(placed.offset, 0x100);
        // Base-game moves (ids below 355) are already in the ROM.
        assert_eq!(placed.ids.len(), 60);
        assert_eq!(placed.ids[0], 355);
        let roost = MoveRecord::decode(&rom, placed.offset).unwrap();
        assert_eq!(roost.move_type, 9);
        assert_eq!(roost.pp, 10);

        // Abilities 1..=77 are already named in the ROM.
        let names = report.ability_names.unwrap();
        assert_eq!(names.offset, placed.offset + placed.len);
        assert_eq!(names.ids.len(), 30);
        assert!(names.ids.iter().all(|&id| id >= 78));
        assert_eq!(names.len, 30 * ABILITY_NAME_LEN);
        assert_eq!(rom.read_fixed_string(names.offset, ABILITY_NAME_LEN).unwrap(), "Adaptability");
        let last = names.offset + (names.ids.len() - 1) * ABILITY_NAME_LEN;
        assert_eq!(rom.read_fixed_string(last, ABILITY_NAME_LEN).unwrap(), "Purifying Sal");
    }

    #[test]
    fn skips_blocks_that_do_not_fit() {
        let mut rom = Rom::from_bytes(vec![0u8; 0x400]);
        let before = rom.clone();
        let report = expand_catalogs(
            &mut rom,
            &small_layout(0),
            &build_move_catalog(),
            &build_ability_catalog(),
        )
        .unwrap();
        assert_eq!(report, ExpansionReport::default());
        assert_eq!(rom, before);
    }
}
