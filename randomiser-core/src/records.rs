use serde::Serialize;
use std::collections::BTreeMap;

use crate::layout::OffsetTable;
use crate::rom::{pointer_to_offset, Rom, ROM_BASE_ADDRESS};
use crate::validate::FieldViolation;
use crate::{RandomiserError, Result};

/// Fixed-size structure stored in the ROM.
///
/// `decode` never mutates the buffer and `encode` touches exactly
/// `SIZE` bytes starting at `offset`.
pub trait Record: Sized {
    const SIZE: usize;
    const NAME: &'static str;

    fn decode(rom: &Rom, offset: usize) -> Result<Self>;
    fn encode(&self, rom: &mut Rom, offset: usize) -> Result<()>;
}

fn check_region<R: Record>(rom: &Rom, offset: usize) -> Result<()> {
    let available = rom.remaining(offset);
    if available < R::SIZE {
        return Err(RandomiserError::SizeMismatch {
            record: R::NAME,
            offset,
            needed: R::SIZE,
            available,
        });
    }
    Ok(())
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BaseStats {
    pub hp: u8,
    pub attack: u8,
    pub defense: u8,
    pub speed: u8,
    pub sp_attack: u8,
    pub sp_defense: u8,
}

impl BaseStats {
    pub fn total(&self) -> u16 {
        self.named().iter().map(|&(_, v)| v as u16).sum()
    }

    /// Stats in table order with their display names.
    pub fn named(&self) -> [(&'static str, u8); 6] {
        [
            ("hp", self.hp),
            ("attack", self.attack),
            ("defense", self.defense),
            ("speed", self.speed),
            ("sp_attack", self.sp_attack),
            ("sp_defense", self.sp_defense),
        ]
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SpeciesRecord {
    pub base_stats: BaseStats,
    pub type1: u8,
    /// `None` for single-typed species; stored in the ROM as a repeat of
    /// `type1`, so `Some(type1)` never survives a round trip.
    pub type2: Option<u8>,
    pub catch_rate: u8,
    pub base_exp: u8,
    /// hp, attack, defense, speed, sp. attack, sp. defense
    pub effort_yields: [u16; 6],
    pub items: [u16; 2],
    pub gender_ratio: u8,
    pub egg_cycles: u8,
}

impl SpeciesRecord {
    pub fn types(&self) -> (u8, Option<u8>) {
        (self.type1, self.type2)
    }

    pub fn has_type(&self, t: u8) -> bool {
        self.type1 == t || self.type2 == Some(t)
    }
}

impl Record for SpeciesRecord {
    const SIZE: usize = 28;
    const NAME: &'static str = "species";

    fn decode(rom: &Rom, offset: usize) -> Result<Self> {
        check_region::<Self>(rom, offset)?;

        let type1 = rom.read_u8(offset + 6)?;
        let raw_type2 = rom.read_u8(offset + 7)?;
        let mut effort_yields = [0u16; 6];
        for (i, ev) in effort_yields.iter_mut().enumerate() {
            *ev = rom.read_u16(offset + 10 + i * 2)?;
        }

        Ok(Self {
            base_stats: BaseStats {
                hp: rom.read_u8(offset)?,
                attack: rom.read_u8(offset + 1)?,
                defense: rom.read_u8(offset + 2)?,
                speed: rom.read_u8(offset + 3)?,
                sp_attack: rom.read_u8(offset + 4)?,
                sp_defense: rom.read_u8(offset + 5)?,
            },
            type1,
            type2: (raw_type2 != type1).then_some(raw_type2),
            catch_rate: rom.read_u8(offset + 8)?,
            base_exp: rom.read_u8(offset + 9)?,
            effort_yields,
            items: [rom.read_u16(offset + 22)?, rom.read_u16(offset + 24)?],
            gender_ratio: rom.read_u8(offset + 26)?,
            egg_cycles: rom.read_u8(offset + 27)?,
        })
    }

    fn encode(&self, rom: &mut Rom, offset: usize) -> Result<()> {
        check_region::<Self>(rom, offset)?;

        for (i, (_, value)) in self.base_stats.named().into_iter().enumerate() {
            rom.write_u8(offset + i, value)?;
        }
        rom.write_u8(offset + 6, self.type1)?;
        rom.write_u8(offset + 7, self.type2.unwrap_or(self.type1))?;
        rom.write_u8(offset + 8, self.catch_rate)?;
        rom.write_u8(offset + 9, self.base_exp)?;
        for (i, &ev) in self.effort_yields.iter().enumerate() {
            rom.write_u16(offset + 10 + i * 2, ev)?;
        }
        rom.write_u16(offset + 22, self.items[0])?;
        rom.write_u16(offset + 24, self.items[1])?;
        rom.write_u8(offset + 26, self.gender_ratio)?;
        rom.write_u8(offset + 27, self.egg_cycles)?;
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MoveRecord {
    pub effect: u8,
    pub power: u8,
    pub move_type: u8,
    pub accuracy: u8,
    pub pp: u8,
    pub effect_accuracy: u8,
    pub target: u8,
    pub priority: i8,
    pub flags: u32,
}

impl Record for MoveRecord {
    const SIZE: usize = 12;
    const NAME: &'static str = "move";

    fn decode(rom: &Rom, offset: usize) -> Result<Self> {
        check_region::<Self>(rom, offset)?;
        Ok(Self {
            effect: rom.read_u8(offset)?,
            power: rom.read_u8(offset + 1)?,
            move_type: rom.read_u8(offset + 2)?,
            accuracy: rom.read_u8(offset + 3)?,
            pp: rom.read_u8(offset + 4)?,
            effect_accuracy: rom.read_u8(offset + 5)?,
            target: rom.read_u8(offset + 6)?,
            priority: rom.read_u8(offset + 7)? as i8,
            flags: rom.read_u32(offset + 8)?,
        })
    }

    fn encode(&self, rom: &mut Rom, offset: usize) -> Result<()> {
        check_region::<Self>(rom, offset)?;
        rom.write_u8(offset, self.effect)?;
        rom.write_u8(offset + 1, self.power)?;
        rom.write_u8(offset + 2, self.move_type)?;
        rom.write_u8(offset + 3, self.accuracy)?;
        rom.write_u8(offset + 4, self.pp)?;
        rom.write_u8(offset + 5, self.effect_accuracy)?;
        rom.write_u8(offset + 6, self.target)?;
        rom.write_u8(offset + 7, self.priority as u8)?;
        rom.write_u32(offset + 8, self.flags)?;
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TrainerRecord {
    pub flags: u8,
    pub class: u8,
    pub music: u8,
    pub portrait: u8,
    pub name_pointer: u32,
    pub items: [u16; 4],
    pub double_battle: u32,
    pub party_pointer: u32,
}

impl TrainerRecord {
    /// File offset of the roster, or `None` when the trainer has no party.
    pub fn party_offset(&self) -> Result<Option<usize>> {
        if self.party_pointer == 0 {
            return Ok(None);
        }
        pointer_to_offset(self.party_pointer).map(Some)
    }

    pub fn is_double_battle(&self) -> bool {
        self.double_battle != 0
    }
}

impl Record for TrainerRecord {
    const SIZE: usize = 24;
    const NAME: &'static str = "trainer";

    fn decode(rom: &Rom, offset: usize) -> Result<Self> {
        check_region::<Self>(rom, offset)?;
        let mut items = [0u16; 4];
        for (i, item) in items.iter_mut().enumerate() {
            *item = rom.read_u16(offset + 8 + i * 2)?;
        }
        Ok(Self {
            flags: rom.read_u8(offset)?,
            class: rom.read_u8(offset + 1)?,
            music: rom.read_u8(offset + 2)?,
            portrait: rom.read_u8(offset + 3)?,
            name_pointer: rom.read_u32(offset + 4)?,
            items,
            double_battle: rom.read_u32(offset + 16)?,
            party_pointer: rom.read_u32(offset + 20)?,
        })
    }

    fn encode(&self, rom: &mut Rom, offset: usize) -> Result<()> {
        check_region::<Self>(rom, offset)?;
        rom.write_u8(offset, self.flags)?;
        rom.write_u8(offset + 1, self.class)?;
        rom.write_u8(offset + 2, self.music)?;
        rom.write_u8(offset + 3, self.portrait)?;
        rom.write_u32(offset + 4, self.name_pointer)?;
        for (i, &item) in self.items.iter().enumerate() {
            rom.write_u16(offset + 8 + i * 2, item)?;
        }
        rom.write_u32(offset + 16, self.double_battle)?;
        rom.write_u32(offset + 20, self.party_pointer)?;
        Ok(())
    }
}

/// One roster entry. Bytes 3 and 6..8 are padding and are written as zero.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TrainerMon {
    pub ivs: u16,
    pub level: u8,
    pub species: u16,
}

impl Record for TrainerMon {
    const SIZE: usize = 8;
    const NAME: &'static str = "trainer party entry";

    fn decode(rom: &Rom, offset: usize) -> Result<Self> {
        check_region::<Self>(rom, offset)?;
        Ok(Self {
            ivs: rom.read_u16(offset)?,
            level: rom.read_u8(offset + 2)?,
            species: rom.read_u16(offset + 4)?,
        })
    }

    fn encode(&self, rom: &mut Rom, offset: usize) -> Result<()> {
        check_region::<Self>(rom, offset)?;
        rom.write_u16(offset, self.ivs)?;
        rom.write_u8(offset + 2, self.level)?;
        rom.write_u8(offset + 3, 0)?;
        rom.write_u16(offset + 4, self.species)?;
        rom.write_u16(offset + 6, 0)?;
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct WildEncounterEntry {
    pub min_level: u8,
    pub max_level: u8,
    pub species: u16,
}

impl Record for WildEncounterEntry {
    const SIZE: usize = 4;
    const NAME: &'static str = "wild encounter";

    fn decode(rom: &Rom, offset: usize) -> Result<Self> {
        check_region::<Self>(rom, offset)?;
        Ok(Self {
            min_level: rom.read_u8(offset)?,
            max_level: rom.read_u8(offset + 1)?,
            species: rom.read_u16(offset + 2)?,
        })
    }

    fn encode(&self, rom: &mut Rom, offset: usize) -> Result<()> {
        check_region::<Self>(rom, offset)?;
        rom.write_u8(offset, self.min_level)?;
        rom.write_u8(offset + 1, self.max_level)?;
        rom.write_u16(offset + 2, self.species)?;
        Ok(())
    }
}

pub const MAX_PARTY_SIZE: usize = 6;

/// A trainer together with its decoded roster.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Trainer {
    pub index: usize,
    pub record: TrainerRecord,
    pub party_offset: Option<usize>,
    pub roster: Vec<TrainerMon>,
}

pub fn read_species_table(rom: &Rom, layout: &OffsetTable) -> Result<BTreeMap<u16, SpeciesRecord>> {
    let mut table = BTreeMap::new();
    for id in 1..layout.species_count as u16 {
        table.insert(id, SpeciesRecord::decode(rom, layout.species_offset(id))?);
    }
    Ok(table)
}

pub fn write_species_table(
    rom: &mut Rom,
    layout: &OffsetTable,
    table: &BTreeMap<u16, SpeciesRecord>,
) -> Result<()> {
    for (&id, record) in table {
        record.encode(rom, layout.species_offset(id))?;
    }
    Ok(())
}

pub fn read_move_table(rom: &Rom, layout: &OffsetTable) -> Result<BTreeMap<u16, MoveRecord>> {
    let mut table = BTreeMap::new();
    for id in 1..layout.move_count as u16 {
        table.insert(id, MoveRecord::decode(rom, layout.move_offset(id))?);
    }
    Ok(table)
}

pub fn write_move_table(
    rom: &mut Rom,
    layout: &OffsetTable,
    table: &BTreeMap<u16, MoveRecord>,
) -> Result<()> {
    for (&id, record) in table {
        record.encode(rom, layout.move_offset(id))?;
    }
    Ok(())
}

/// Reads every trainer and its roster. A roster ends at the first entry
/// whose species is 0, or after six entries.
///
/// A party pointer outside the ROM, or a roster running off the end of the
/// buffer, is reported as a violation and that trainer is kept with no
/// party, so it is never randomised or written.
pub fn read_trainers(rom: &Rom, layout: &OffsetTable) -> Result<(Vec<Trainer>, Vec<FieldViolation>)> {
    let mut trainers = Vec::with_capacity(layout.trainer_count);
    let mut violations = Vec::new();
    // Last address a whole party entry can start at.
    let last_entry = i64::from(ROM_BASE_ADDRESS) + rom.len() as i64 - TrainerMon::SIZE as i64;

    for index in 0..layout.trainer_count {
        let record = TrainerRecord::decode(rom, layout.trainer_offset(index))?;
        let (party_offset, roster) = match read_roster(rom, &record) {
            Ok(party) => party,
            Err(value) => {
                tracing::warn!("trainer {}: party at 0x{:08X} is unreadable, skipping", index, value);
                violations.push(FieldViolation {
                    record: format!("trainer {}", index),
                    field: "party_pointer",
                    value: value.into(),
                    min: ROM_BASE_ADDRESS.into(),
                    max: last_entry,
                    rule: None,
                });
                (None, Vec::new())
            }
        };

        trainers.push(Trainer {
            index,
            record,
            party_offset,
            roster,
        });
    }
    Ok((trainers, violations))
}

/// Party offset and roster, or the address that could not be read.
fn read_roster(rom: &Rom, record: &TrainerRecord) -> std::result::Result<(Option<usize>, Vec<TrainerMon>), u32> {
    let Some(base) = record.party_offset().map_err(|_| record.party_pointer)? else {
        return Ok((None, Vec::new()));
    };
    let mut roster = Vec::new();
    for slot in 0..MAX_PARTY_SIZE {
        let offset = base + slot * TrainerMon::SIZE;
        let mon = TrainerMon::decode(rom, offset)
            .map_err(|_| record.party_pointer.wrapping_add((slot * TrainerMon::SIZE) as u32))?;
        if mon.species == 0 {
            break;
        }
        roster.push(mon);
    }
    Ok((Some(base), roster))
}

/// Writes rosters back in place. Party pointers and trainer headers are
/// left untouched.
pub fn write_rosters(rom: &mut Rom, trainers: &[Trainer]) -> Result<()> {
    for trainer in trainers {
        let Some(base) = trainer.party_offset else {
            continue;
        };
        for (slot, mon) in trainer.roster.iter().enumerate() {
            mon.encode(rom, base + slot * TrainerMon::SIZE)?;
        }
    }
    Ok(())
}

pub fn read_wild_tables(rom: &Rom, layout: &OffsetTable) -> Result<Vec<Vec<WildEncounterEntry>>> {
    let mut tables = Vec::with_capacity(layout.wild_areas.len());
    for (area_index, area) in layout.wild_areas.iter().enumerate() {
        let base = layout.wild_area_offset(area_index);
        let mut entries = Vec::with_capacity(area.slots);
        for slot in 0..area.slots {
            entries.push(WildEncounterEntry::decode(
                rom,
                base + slot * WildEncounterEntry::SIZE,
            )?);
        }
        tables.push(entries);
    }
    Ok(tables)
}

pub fn write_wild_tables(
    rom: &mut Rom,
    layout: &OffsetTable,
    tables: &[Vec<WildEncounterEntry>],
) -> Result<()> {
    for (area_index, entries) in tables.iter().enumerate() {
        let base = layout.wild_area_offset(area_index);
        for (slot, entry) in entries.iter().enumerate() {
            entry.encode(rom, base + slot * WildEncounterEntry::SIZE)?;
        }
    }
    Ok(())
}

pub fn read_starters(rom: &Rom, layout: &OffsetTable) -> Result<[u16; 3]> {
    Ok([
        rom.read_u16(layout.starters[0])?,
        rom.read_u16(layout.starters[1])?,
        rom.read_u16(layout.starters[2])?,
    ])
}

pub fn write_starters(rom: &mut Rom, layout: &OffsetTable, starters: &[u16; 3]) -> Result<()> {
    for (&offset, &species) in layout.starters.iter().zip(starters.iter()) {
        rom.write_u16(offset, species)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_species() -> SpeciesRecord {
        SpeciesRecord {
            base_stats: BaseStats {
                hp: 45,
                attack: 49,
                defense: 49,
                speed: 45,
                sp_attack: 65,
                sp_defense: 65,
            },
            type1: 4,
            type2: Some(7),
            catch_rate: 45,
            base_exp: 64,
            effort_yields: [0, 0, 0, 0, 1, 0x0102],
            items: [0x0123, 0xFFEE],
            gender_ratio: 31,
            egg_cycles: 20,
        }
    }

    #[test]
    fn species_round_trip() {
        let mut rom = Rom::from_bytes(vec![0; 64]);
        let record = sample_species();
        record.encode(&mut rom, 4).unwrap();
        assert_eq!(SpeciesRecord::decode(&rom, 4).unwrap(), record);
        assert_eq!(record.base_stats.total(), 318);
    }

    #[test]
    fn single_type_species_stores_type_twice() {
        let mut rom = Rom::from_bytes(vec![0; 28]);
        let record = SpeciesRecord {
            type1: 1,
            type2: None,
            ..sample_species()
        };
        record.encode(&mut rom, 0).unwrap();
        assert_eq!(&rom.as_bytes()[6..8], &[1, 1]);
        assert_eq!(SpeciesRecord::decode(&rom, 0).unwrap(), record);
    }

    #[test]
    fn species_layout_is_byte_exact() {
        let mut rom = Rom::from_bytes(vec![0; 28]);
        sample_species().encode(&mut rom, 0).unwrap();
        let b = rom.as_bytes();
        assert_eq!(&b[0..6], &[45, 49, 49, 45, 65, 65]);
        assert_eq!(&b[6..10], &[4, 7, 45, 64]);
        assert_eq!(&b[18..22], &[1, 0, 0x02, 0x01]);
        assert_eq!(&b[22..26], &[0x23, 0x01, 0xEE, 0xFF]);
        assert_eq!(&b[26..28], &[31, 20]);
    }

    #[test]
    fn move_round_trip() {
        let mut rom = Rom::from_bytes(vec![0; 12]);
        let record = MoveRecord {
            effect: 0x4D,
            power: 90,
            move_type: 10,
            accuracy: 100,
            pp: 10,
            effect_accuracy: 10,
            target: 0,
            priority: -6,
            flags: 0x0000_0033,
        };
        record.encode(&mut rom, 0).unwrap();
        assert_eq!(rom.as_bytes()[7], 0xFA);
        assert_eq!(MoveRecord::decode(&rom, 0).unwrap(), record);
    }

    #[test]
    fn trainer_round_trip() {
        let mut rom = Rom::from_bytes(vec![0; 24]);
        let record = TrainerRecord {
            flags: 0,
            class: 0x54,
            music: 0x81,
            portrait: 0x73,
            name_pointer: 0x0823_0000,
            items: [13, 13, 0, 0],
            double_battle: 1,
            party_pointer: 0x0823_E000,
        };
        record.encode(&mut rom, 0).unwrap();
        assert_eq!(TrainerRecord::decode(&rom, 0).unwrap(), record);
        assert_eq!(record.party_offset().unwrap(), Some(0x23E000));
        assert!(record.is_double_battle());
    }

    #[test]
    fn trainer_mon_and_wild_round_trip() {
        let mut rom = Rom::from_bytes(vec![0xAB; 12]);
        let mon = TrainerMon {
            ivs: 250,
            level: 63,
            species: 0x0182,
        };
        mon.encode(&mut rom, 0).unwrap();
        assert_eq!(TrainerMon::decode(&rom, 0).unwrap(), mon);

        let entry = WildEncounterEntry {
            min_level: 2,
            max_level: 5,
            species: 0x0130,
        };
        entry.encode(&mut rom, 8).unwrap();
        assert_eq!(WildEncounterEntry::decode(&rom, 8).unwrap(), entry);
    }

    #[test]
    fn encode_touches_only_its_span() {
        let mut rom = Rom::from_bytes(vec![0xAA; 8]);
        WildEncounterEntry {
            min_level: 1,
            max_level: 2,
            species: 3,
        }
        .encode(&mut rom, 2)
        .unwrap();
        assert_eq!(rom.as_bytes(), &[0xAA, 0xAA, 1, 2, 3, 0, 0xAA, 0xAA]);
    }

    #[test]
    fn short_region_is_a_size_mismatch() {
        let mut rom = Rom::from_bytes(vec![0; 30]);
        assert!(matches!(
            SpeciesRecord::decode(&rom, 4),
            Err(RandomiserError::SizeMismatch {
                record: "species",
                needed: 28,
                available: 26,
                ..
            })
        ));
        assert!(matches!(
            MoveRecord::default().encode(&mut rom, 20),
            Err(RandomiserError::SizeMismatch { .. })
        ));
        assert_eq!(rom.as_bytes(), &[0u8; 30][..]);
    }

    #[test]
    fn roster_stops_at_empty_species() {
        let mut layout = OffsetTable::fire_red();
        layout.trainer_data = 0;
        layout.trainer_count = 1;

        let mut rom = Rom::from_bytes(vec![0; 0x100]);
        TrainerRecord {
            party_pointer: 0x0800_0040,
            ..TrainerRecord::default()
        }
        .encode(&mut rom, 0)
        .unwrap();
        for (i, species) in [16u16, 19].into_iter().enumerate() {
            TrainerMon {
                ivs: 0,
                level: 5 + i as u8,
                species,
            }
            .encode(&mut rom, 0x40 + i * 8)
            .unwrap();
        }

        let (mut trainers, violations) = read_trainers(&rom, &layout).unwrap();
        assert!(violations.is_empty());
        assert_eq!(trainers[0].roster.len(), 2);
        assert_eq!(trainers[0].roster[1].species, 19);

        trainers[0].roster[0].species = 25;
        write_rosters(&mut rom, &trainers).unwrap();
        assert_eq!(rom.read_u16(0x44).unwrap(), 25);
        assert_eq!(rom.read_u32(20).unwrap(), 0x0800_0040);
    }

    #[test]
    fn unreadable_parties_are_reported_and_skipped() {
        let mut layout = OffsetTable::fire_red();
        layout.trainer_data = 0;
        layout.trainer_count = 3;

        let mut rom = Rom::from_bytes(vec![0; 0x100]);
        // 0: fine, 1: not a ROM address, 2: roster starts on the last 4 bytes.
        for (index, pointer) in [0x0800_0080u32, 0x4C43_4241, 0x0800_00FC].into_iter().enumerate() {
            TrainerRecord {
                party_pointer: pointer,
                ..TrainerRecord::default()
            }
            .encode(&mut rom, index * TrainerRecord::SIZE)
            .unwrap();
        }
        TrainerMon {
            ivs: 0,
            level: 5,
            species: 16,
        }
        .encode(&mut rom, 0x80)
        .unwrap();
        rom.write_u16(0xFC, 0x10).unwrap();

        let (trainers, violations) = read_trainers(&rom, &layout).unwrap();
        assert_eq!(trainers.len(), 3);
        assert_eq!(trainers[0].roster.len(), 1);
        for skipped in &trainers[1..] {
            assert_eq!(skipped.party_offset, None);
            assert!(skipped.roster.is_empty());
        }

        assert_eq!(violations.len(), 2);
        assert!(violations.iter().all(|v| v.field == "party_pointer"));
        assert_eq!(violations[0].record, "trainer 1");
        assert_eq!(violations[0].value, 0x4C43_4241);
        assert_eq!(violations[1].record, "trainer 2");
        assert_eq!(violations[1].value, 0x0800_00FC);
        assert_eq!(violations[1].max, 0x0800_00F8);
    }
}
