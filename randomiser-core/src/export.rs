//! JSON exports and the plain-text spoiler log written for debug runs.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::catalog::MoveCatalog;
use crate::expansion::ExpansionReport;
use crate::layout::OffsetTable;
use crate::randomise::{RandomisationOutcome, RandomisationRules};
use crate::records::{BaseStats, MoveRecord, SpeciesRecord};
use crate::species::{EvolutionStage, SpeciesEntry};
use crate::types::PokemonType;
use crate::validate::FieldViolation;
use crate::Result;

fn type_name(id: u8) -> &'static str {
    PokemonType::from_id(id).map(|t| t.name()).unwrap_or("???")
}

#[derive(Debug, Clone, Serialize)]
pub struct SpeciesExport {
    pub id: u16,
    pub generation: u8,
    pub stage: EvolutionStage,
    pub legendary: bool,
    pub types: Vec<&'static str>,
    pub base_stats: BaseStats,
    pub bst: u16,
}

pub fn species_list(table: &BTreeMap<u16, SpeciesRecord>) -> Vec<SpeciesExport> {
    table
        .iter()
        .map(|(&id, record)| {
            let entry = SpeciesEntry::from_record(id, record);
            SpeciesExport {
                id,
                generation: entry.generation,
                stage: entry.stage,
                legendary: entry.legendary,
                types: entry.types().into_iter().map(type_name).collect(),
                base_stats: record.base_stats,
                bst: entry.bst,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct MoveExport {
    pub id: u16,
    pub name: Option<&'static str>,
    pub generation: Option<u8>,
    pub move_type: &'static str,
    pub power: u8,
    pub accuracy: u8,
    pub pp: u8,
    /// "rom" for decoded moves, "catalog" for moves only the catalog knows.
    pub source: &'static str,
}

/// Decoded moves followed by catalog moves past the end of the ROM table.
pub fn move_list(table: &BTreeMap<u16, MoveRecord>, catalog: &MoveCatalog) -> Vec<MoveExport> {
    let mut out: Vec<MoveExport> = table
        .iter()
        .map(|(&id, m)| MoveExport {
            id,
            name: catalog.get(id).ok().map(|c| c.name),
            generation: catalog.generation_of(id).ok(),
            move_type: type_name(m.move_type),
            power: m.power,
            accuracy: m.accuracy,
            pp: m.pp,
            source: "rom",
        })
        .collect();

    out.extend(
        catalog
            .iter()
            .filter(|c| !table.contains_key(&c.id))
            .map(|c| MoveExport {
                id: c.id,
                name: Some(c.name),
                generation: catalog.generation_of(c.id).ok(),
                move_type: c.move_type.name(),
                power: c.power,
                accuracy: c.accuracy,
                pp: c.pp,
                source: "catalog",
            }),
    );
    out
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfigSummary {
    pub seed: u64,
    pub game_code: String,
    pub game_title: String,
    pub randomize_wild: bool,
    pub randomize_trainers: bool,
    pub randomize_starters: bool,
    pub trainer_level_boost: Option<f64>,
    pub expand_catalogs: bool,
    pub rules: RandomisationRules,
    pub layout: OffsetTable,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub seed: u64,
    pub input_checksum: String,
    pub output_checksum: String,
    /// Decoding then re-encoding the untouched tables reproduced the input.
    pub roundtrip_exact: bool,
    pub violations: Vec<FieldViolation>,
    pub outcome: RandomisationOutcome,
    pub expansion: Option<ExpansionReport>,
}

impl RunReport {
    pub fn spoiler_log(&self) -> String {
        let mut log = format!("FireRed Randomiser seed: {}\n", self.seed);
        let _ = writeln!(log, "roundtrip_exact: {}", self.roundtrip_exact);
        let _ = writeln!(log, "input sha256: {}", self.input_checksum);
        let _ = writeln!(log, "output sha256: {}", self.output_checksum);

        let _ = writeln!(log, "field violations: {}", self.violations.len());
        for v in &self.violations {
            let _ = writeln!(log, "  {}", v);
        }

        let _ = writeln!(log, "starters:");
        for s in &self.outcome.starters {
            let _ = writeln!(log, "  {}: {} -> {}", s.slot, s.original, s.replacement);
        }

        let _ = writeln!(log, "wild encounters: {}", self.outcome.wild.len());
        for a in &self.outcome.wild {
            let _ = writeln!(
                log,
                "  {} [{}] ({}%): {} -> {} lv{}",
                a.area, a.slot, a.rate, a.original, a.replacement, a.level
            );
        }

        let _ = writeln!(log, "trainer slots: {}", self.outcome.trainers.len());
        for a in &self.outcome.trainers {
            let _ = writeln!(
                log,
                "  trainer {} [{}]{}: {} lv{} -> {} lv{}",
                a.trainer,
                a.slot,
                if a.signature { " *" } else { "" },
                a.original,
                a.original_level,
                a.replacement,
                a.level
            );
        }

        let _ = writeln!(log, "relaxations: {}", self.outcome.relaxations.len());
        for r in &self.outcome.relaxations {
            let _ = writeln!(log, "  {:?}", r);
        }

        match &self.expansion {
            Some(e) => {
                if let Some(p) = &e.moves {
                    let _ = writeln!(log, "moves: {} at 0x{:06X}", p.ids.len(), p.offset);
                }
                if let Some(p) = &e.ability_names {
                    let _ = writeln!(log, "ability names: {} at 0x{:06X}", p.ids.len(), p.offset);
                }
            }
            None => log.push_str("catalog expansion: disabled\n"),
        }
        log
    }
}

pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}
