use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod catalog;
pub mod expansion;
pub mod export;
pub mod layout;
pub mod randomise;
pub mod records;
pub mod rom;
pub mod species;
pub mod types;
pub mod validate;

use catalog::{build_ability_catalog, build_move_catalog};
use export::{move_list, species_list, write_json, ConfigSummary, MoveExport, RunReport, SpeciesExport};
use layout::OffsetTable;
use randomise::{LevelScaling, RandomisationOutcome, Randomiser};
use records::{
    read_move_table, read_species_table, read_starters, read_trainers, read_wild_tables,
    write_move_table, write_rosters, write_species_table, write_starters, write_wild_tables,
    Record,
};
use rom::Rom;
use species::SpeciesPool;
use types::build_type_chart;
use validate::{validate_header, validate_move, validate_species, validate_wild_entry, FieldViolation};

pub use randomise::RandomisationRules;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomiserSettings {
    pub seed: u64,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub debug: bool,
    pub randomize_wild: bool,
    pub randomize_trainers: bool,
    pub randomize_starters: bool,
    pub scale_trainer_levels: bool,
    pub trainer_level_boost: f64,
    pub expand_catalogs: bool,
    pub abort_on_validation_errors: bool,
    /// Table positions to use instead of the ones implied by the header code.
    pub layout: Option<OffsetTable>,
    pub rules: RandomisationRules,
}

impl Default for RandomiserSettings {
    fn default() -> Self {
        Self {
            seed: 0,
            input_path: PathBuf::new(),
            output_path: PathBuf::from("output"),
            debug: false,
            randomize_wild: true,
            randomize_trainers: true,
            randomize_starters: true,
            scale_trainer_levels: true,
            trainer_level_boost: 1.2,
            expand_catalogs: false,
            abort_on_validation_errors: false,
            layout: None,
            rules: RandomisationRules::default(),
        }
    }
}

impl RandomiserSettings {
    /// Loads settings from JSON. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&text)?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.trainer_level_boost.is_finite() || self.trainer_level_boost <= 0.0 {
            return Err(RandomiserError::Config(format!(
                "trainer_level_boost must be a positive number, got {}",
                self.trainer_level_boost
            )));
        }
        self.rules.validate()
    }

    fn level_scaling(&self) -> Option<LevelScaling> {
        self.scale_trainer_levels.then_some(LevelScaling {
            boost: self.trainer_level_boost,
            variation: self.rules.level_variation,
        })
    }
}

#[derive(Debug, Error)]
pub enum RandomiserError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("unrecognised ROM: found {found:?}, expected one of {expected:?}")]
    UnrecognizedFormat {
        found: String,
        expected: &'static [&'static str],
    },
    #[error("{record} at 0x{offset:06X} needs {needed} bytes but only {available} remain")]
    SizeMismatch {
        record: &'static str,
        offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("regions {first} and {second} overlap")]
    RegionOverlap {
        first: &'static str,
        second: &'static str,
    },
    #[error("access of {width} bytes at 0x{offset:06X} is outside a buffer of {len} bytes")]
    OutOfBounds {
        offset: usize,
        width: usize,
        len: usize,
    },
    #[error("0x{0:08X} is not a ROM pointer")]
    InvalidPointer(u32),
    #[error("{0} is outside every generation range")]
    UnknownGeneration(u16),
    #[error("unknown {catalog} id {id}")]
    UnknownId { catalog: &'static str, id: u16 },
    #[error("unknown type id {0}")]
    UnknownType(u8),
    #[error("{0} field validation violation(s)")]
    Validation(usize),
}

/// Broad classes of failure, used to decide how a caller reacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input is not a ROM this tool understands; nothing is written.
    FatalFormat,
    FieldValidation,
    OutOfBounds,
    Config,
    Io,
    Lookup,
}

impl RandomiserError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RandomiserError::Io(_) => ErrorKind::Io,
            RandomiserError::Json(_) | RandomiserError::Config(_) => ErrorKind::Config,
            RandomiserError::UnrecognizedFormat { .. }
            | RandomiserError::SizeMismatch { .. }
            | RandomiserError::RegionOverlap { .. }
            | RandomiserError::InvalidPointer(_) => ErrorKind::FatalFormat,
            RandomiserError::OutOfBounds { .. } => ErrorKind::OutOfBounds,
            RandomiserError::UnknownGeneration(_)
            | RandomiserError::UnknownId { .. }
            | RandomiserError::UnknownType(_) => ErrorKind::Lookup,
            RandomiserError::Validation(_) => ErrorKind::FieldValidation,
        }
    }
}

pub type Result<T> = std::result::Result<T, RandomiserError>;

/// Everything a finished run produced, before anything touches disk.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub rom: Vec<u8>,
    pub report: RunReport,
    pub summary: ConfigSummary,
    pub species: Vec<SpeciesExport>,
    pub moves: Vec<MoveExport>,
}

/// Re-encodes the decoded tables into a copy of the buffer and reports
/// whether the result is byte-identical to the input.
fn tables_roundtrip_exact(
    rom: &Rom,
    layout: &OffsetTable,
    tables: &DecodedTables,
) -> Result<bool> {
    let mut copy = rom.clone();
    write_species_table(&mut copy, layout, &tables.species)?;
    write_move_table(&mut copy, layout, &tables.moves)?;
    for trainer in &tables.trainers {
        trainer
            .record
            .encode(&mut copy, layout.trainer_offset(trainer.index))?;
    }
    write_rosters(&mut copy, &tables.trainers)?;
    write_wild_tables(&mut copy, layout, &tables.wild)?;
    write_starters(&mut copy, layout, &tables.starters)?;
    Ok(copy == *rom)
}

struct DecodedTables {
    species: std::collections::BTreeMap<u16, records::SpeciesRecord>,
    moves: std::collections::BTreeMap<u16, records::MoveRecord>,
    /// Empty unless trainers are being randomised.
    trainers: Vec<records::Trainer>,
    trainer_violations: Vec<FieldViolation>,
    wild: Vec<Vec<records::WildEncounterEntry>>,
    starters: [u16; 3],
}

fn decode_tables(rom: &Rom, layout: &OffsetTable, with_trainers: bool) -> Result<DecodedTables> {
    let (trainers, trainer_violations) = if with_trainers {
        read_trainers(rom, layout)?
    } else {
        (Vec::new(), Vec::new())
    };
    Ok(DecodedTables {
        species: read_species_table(rom, layout)?,
        moves: read_move_table(rom, layout)?,
        trainers,
        trainer_violations,
        wild: read_wild_tables(rom, layout)?,
        starters: read_starters(rom, layout)?,
    })
}

fn collect_violations(layout: &OffsetTable, tables: &DecodedTables) -> Vec<FieldViolation> {
    let mut violations = tables.trainer_violations.clone();
    for (&id, record) in &tables.species {
        violations.extend(validate_species(id, record));
    }
    for (&id, record) in &tables.moves {
        violations.extend(validate_move(id, record));
    }
    for (area, entries) in layout.wild_areas.iter().zip(&tables.wild) {
        for (slot, entry) in entries.iter().enumerate() {
            // Empty slots carry no levels.
            if entry.species != 0 {
                violations.extend(validate_wild_entry(&area.name, slot, entry));
            }
        }
    }
    violations
}

/// Runs the whole pipeline on an in-memory ROM image.
///
/// Fails before randomising if the header, layout or (when the policy asks
/// for it) any decoded field is invalid. The returned image always has the
/// same length as the input.
pub fn randomise_rom(bytes: Vec<u8>, settings: &RandomiserSettings) -> Result<RunOutput> {
    settings.validate()?;

    let input_checksum = rom::checksum(&bytes);
    let mut rom = Rom::from_bytes(bytes);

    let header = validate_header(&rom)?;
    tracing::info!("ROM {} ({}), {} bytes", header.title, header.code, rom.len());

    let layout = match &settings.layout {
        Some(layout) => layout.clone(),
        None => OffsetTable::for_code(&header.code).ok_or_else(|| {
            RandomiserError::UnrecognizedFormat {
                found: header.code.clone(),
                expected: validate::ACCEPTED_CODES,
            }
        })?,
    };
    layout.check(rom.len())?;

    let mut tables = decode_tables(&rom, &layout, settings.randomize_trainers)?;
    tracing::info!(
        "decoded {} species, {} moves, {} trainers, {} wild areas",
        tables.species.len(),
        tables.moves.len(),
        tables.trainers.len(),
        tables.wild.len()
    );

    let roundtrip_exact = tables_roundtrip_exact(&rom, &layout, &tables)?;
    if !roundtrip_exact {
        tracing::warn!("re-encoding the untouched tables did not reproduce the input bytes");
    }

    let violations = collect_violations(&layout, &tables);
    if !violations.is_empty() {
        for v in &violations {
            tracing::warn!("field violation: {}", v);
        }
        if settings.abort_on_validation_errors {
            return Err(RandomiserError::Validation(violations.len()));
        }
    }

    let mut rng = StdRng::seed_from_u64(settings.seed);
    let chart = build_type_chart();
    let pool = SpeciesPool::from_table(&tables.species);
    let mut engine = Randomiser::new(&pool, &chart, &settings.rules);
    let mut outcome = RandomisationOutcome::default();

    if settings.randomize_wild {
        outcome.wild = engine.randomise_wild(&layout.wild_areas, &mut tables.wild, &mut rng);
        write_wild_tables(&mut rom, &layout, &tables.wild)?;
        tracing::info!("randomised {} wild slots", outcome.wild.len());
    }

    if settings.randomize_trainers {
        outcome.trainers =
            engine.randomise_trainers(&mut tables.trainers, settings.level_scaling(), &mut rng);
        write_rosters(&mut rom, &tables.trainers)?;
        tracing::info!("randomised {} trainer slots", outcome.trainers.len());
    }

    if settings.randomize_starters {
        outcome.starters = engine.randomise_starters(tables.starters, &mut rng);
        let mut starters = tables.starters;
        for s in &outcome.starters {
            starters[s.slot] = s.replacement;
        }
        write_starters(&mut rom, &layout, &starters)?;
        tracing::info!("starters: {:?}", starters);
    }
    outcome.relaxations = engine.into_relaxations();

    let moves_catalog = build_move_catalog();
    let expansion = if settings.expand_catalogs {
        Some(expansion::expand_catalogs(
            &mut rom,
            &layout,
            &moves_catalog,
            &build_ability_catalog(),
        )?)
    } else {
        None
    };

    let output_checksum = rom.checksum();
    let report = RunReport {
        seed: settings.seed,
        input_checksum,
        output_checksum,
        roundtrip_exact,
        violations,
        outcome,
        expansion,
    };
    let summary = ConfigSummary {
        seed: settings.seed,
        game_code: header.code,
        game_title: header.title,
        randomize_wild: settings.randomize_wild,
        randomize_trainers: settings.randomize_trainers,
        randomize_starters: settings.randomize_starters,
        trainer_level_boost: settings.level_scaling().map(|s| s.boost),
        expand_catalogs: settings.expand_catalogs,
        rules: settings.rules.clone(),
        layout,
    };

    Ok(RunOutput {
        rom: rom.into_bytes(),
        report,
        summary,
        species: species_list(&tables.species),
        moves: move_list(&tables.moves, &moves_catalog),
    })
}

/// Reads the input ROM, randomises it and writes the results under
/// `<output>/FireRed_<seed>/`. Nothing is written unless the run succeeds.
pub fn run(settings: RandomiserSettings) -> Result<RunReport> {
    if !settings.input_path.is_file() {
        return Err(RandomiserError::Config(format!(
            "Input path is not a file: {}",
            settings.input_path.display()
        )));
    }

    let bytes = fs::read(&settings.input_path)?;
    let output = randomise_rom(bytes, &settings)?;

    let out_root = settings
        .output_path
        .join(format!("FireRed_{}", settings.seed));
    fs::create_dir_all(&out_root)?;

    let rom_dest = out_root.join("randomised.gba");
    fs::write(&rom_dest, &output.rom)?;
    tracing::info!("wrote {}", rom_dest.display());

    if settings.debug {
        write_json(&out_root.join("species.json"), &output.species)?;
        write_json(&out_root.join("moves.json"), &output.moves)?;
        write_json(&out_root.join("config.json"), &output.summary)?;
        write_json(&out_root.join("report.json"), &output.report)?;
        fs::write(out_root.join("spoiler_log.txt"), output.report.spoiler_log())?;
    }

    Ok(output.report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use layout::WildArea;
    use records::{BaseStats, MoveRecord, SpeciesRecord, TrainerMon, TrainerRecord, WildEncounterEntry};
    use rom::{HEADER_CODE_OFFSET, HEADER_TITLE_OFFSET};

    const ROM_LEN: usize = 0x4000;
    const PARTY_BASE: usize = 0x900;

    fn test_layout() -> OffsetTable {
        OffsetTable {
            pokemon_data: 0x200,
            species_count: 40,
            move_data: 0x700,
            move_count: 20,
            ability_count: 3,
            trainer_data: 0x800,
            trainer_count: 3,
            wild_pokemon: 0xA00,
            wild_areas: vec![
                WildArea {
                    name: "Route 1".to_string(),
                    min_level: 2,
                    max_level: 5,
                    slots: 12,
                },
                WildArea {
                    name: "Route 2".to_string(),
                    min_level: 3,
                    max_level: 6,
                    slots: 12,
                },
            ],
            starters: [0xB00, 0xB02, 0xB04],
            free_space_start: 0x1000,
        }
    }

    fn synthetic_rom(code: &str) -> Vec<u8> {
        let layout = test_layout();
        let mut bytes = vec![0u8; ROM_LEN];
        bytes[0x1000..].fill(0xFF);
        let mut rom = Rom::from_bytes(bytes);
        rom.write_fixed_string(HEADER_TITLE_OFFSET, "POKEMON FIRE", 12).unwrap();
        rom.write_fixed_string(HEADER_CODE_OFFSET, code, 4).unwrap();

        for id in 1..layout.species_count as u16 {
            let stat = 40 + id as u8;
            SpeciesRecord {
                base_stats: BaseStats {
                    hp: stat,
                    attack: stat,
                    defense: stat,
                    speed: stat,
                    sp_attack: stat,
                    sp_defense: stat,
                },
                type1: ((id / 3) % 18) as u8,
                type2: None,
                catch_rate: 45,
                ..SpeciesRecord::default()
            }
            .encode(&mut rom, layout.species_offset(id))
            .unwrap();
        }

        for id in 1..layout.move_count as u16 {
            MoveRecord {
                power: 40,
                accuracy: 100,
                pp: 20,
                ..MoveRecord::default()
            }
            .encode(&mut rom, layout.move_offset(id))
            .unwrap();
        }

        for index in 0..layout.trainer_count {
            let party = PARTY_BASE + index * 0x30;
            TrainerRecord {
                party_pointer: rom::offset_to_pointer(party).unwrap(),
                ..TrainerRecord::default()
            }
            .encode(&mut rom, layout.trainer_offset(index))
            .unwrap();
            for (slot, species) in [4u16, 5, 6].into_iter().enumerate() {
                TrainerMon {
                    ivs: 0,
                    level: 10,
                    species,
                }
                .encode(&mut rom, party + slot * TrainerMon::SIZE)
                .unwrap();
            }
        }

        for area in 0..layout.wild_areas.len() {
            let base = layout.wild_area_offset(area);
            for slot in 0..12 {
                WildEncounterEntry {
                    min_level: 3,
                    max_level: 5,
                    species: 10 + slot as u16,
                }
                .encode(&mut rom, base + slot * WildEncounterEntry::SIZE)
                .unwrap();
            }
        }

        write_starters(&mut rom, &layout, &[1, 4, 7]).unwrap();
        rom.into_bytes()
    }

    fn settings(seed: u64) -> RandomiserSettings {
        RandomiserSettings {
            seed,
            layout: Some(test_layout()),
            ..RandomiserSettings::default()
        }
    }

    #[test]
    fn pipeline_is_deterministic() {
        let a = randomise_rom(synthetic_rom("BPRE"), &settings(42)).unwrap();
        let b = randomise_rom(synthetic_rom("BPRE"), &settings(42)).unwrap();
        assert_eq!(a.rom, b.rom);
        assert_eq!(a.report.outcome, b.report.outcome);
        assert_eq!(a.report.output_checksum, b.report.output_checksum);

        let c = randomise_rom(synthetic_rom("BPRE"), &settings(43)).unwrap();
        assert_ne!(a.rom, c.rom);
    }

    #[test]
    fn pipeline_preserves_length_and_reports() {
        let input = synthetic_rom("BPRF");
        let output = randomise_rom(input.clone(), &settings(7)).unwrap();

        assert_eq!(output.rom.len(), input.len());
        assert!(output.report.roundtrip_exact);
        assert!(output.report.violations.is_empty());
        assert_eq!(output.report.input_checksum, rom::checksum(&input));
        assert_eq!(output.report.outcome.wild.len(), 24);
        assert_eq!(output.report.outcome.trainers.len(), 9);
        assert_eq!(output.report.outcome.starters.len(), 3);
        assert_eq!(output.species.len(), 39);
        assert_eq!(output.summary.game_code, "BPRF");

        // Assignments were written through the codecs.
        let rom = Rom::from_bytes(output.rom);
        let layout = test_layout();
        let first = &output.report.outcome.wild[0];
        let entry = WildEncounterEntry::decode(&rom, layout.wild_area_offset(0)).unwrap();
        assert_eq!(entry.species, first.replacement);
        assert_eq!(entry.min_level, first.level);
        let starter = rom.read_u16(layout.starters[0]).unwrap();
        assert_eq!(starter, output.report.outcome.starters[0].replacement);
    }

    #[test]
    fn toggles_leave_tables_alone() {
        let input = synthetic_rom("BPRE");
        let quiet = RandomiserSettings {
            randomize_wild: false,
            randomize_trainers: false,
            randomize_starters: false,
            ..settings(1)
        };
        let output = randomise_rom(input.clone(), &quiet).unwrap();
        assert_eq!(output.rom, input);
        assert_eq!(output.report.input_checksum, output.report.output_checksum);
    }

    #[test]
    fn unreadable_party_pointer_is_not_fatal() {
        let layout = test_layout();
        let mut bytes = synthetic_rom("BPRE");
        let pointer_at = layout.trainer_offset(2) + 20;
        bytes[pointer_at..pointer_at + 4].copy_from_slice(&0x4C43_4241u32.to_le_bytes());

        let no_trainers = RandomiserSettings {
            randomize_trainers: false,
            ..settings(1)
        };
        let output = randomise_rom(bytes.clone(), &no_trainers).unwrap();
        assert!(output.report.violations.is_empty());
        assert!(output.report.outcome.trainers.is_empty());

        let output = randomise_rom(bytes.clone(), &settings(1)).unwrap();
        assert_eq!(output.report.violations.len(), 1);
        assert_eq!(output.report.violations[0].record, "trainer 2");
        assert_eq!(output.report.violations[0].field, "party_pointer");
        assert_eq!(output.report.outcome.trainers.len(), 6);
        assert!(output.report.outcome.trainers.iter().all(|a| a.trainer != 2));
        // The skipped trainer's party is left as it was.
        let party = PARTY_BASE + 2 * 0x30;
        assert_eq!(output.rom[party..party + 0x18], bytes[party..party + 0x18]);

        let strict = RandomiserSettings {
            abort_on_validation_errors: true,
            ..settings(1)
        };
        let err = randomise_rom(bytes, &strict).unwrap_err();
        assert!(matches!(err, RandomiserError::Validation(1)));
    }

    #[test]
    fn bad_header_is_fatal() {
        let err = randomise_rom(synthetic_rom("AXVE"), &settings(1)).unwrap_err();
        assert!(matches!(err, RandomiserError::UnrecognizedFormat { .. }));
        assert_eq!(err.kind(), ErrorKind::FatalFormat);
    }

    #[test]
    fn overlapping_layout_is_fatal() {
        let mut s = settings(1);
        if let Some(layout) = s.layout.as_mut() {
            layout.move_data = layout.pokemon_data + 28;
        }
        let err = randomise_rom(synthetic_rom("BPRE"), &s).unwrap_err();
        assert!(matches!(err, RandomiserError::RegionOverlap { .. }));
    }

    #[test]
    fn violations_follow_policy() {
        let layout = test_layout();
        let mut bytes = synthetic_rom("BPRE");
        bytes[layout.species_offset(3)] = 0;

        let output = randomise_rom(bytes.clone(), &settings(1)).unwrap();
        assert_eq!(output.report.violations.len(), 1);
        assert_eq!(output.report.violations[0].field, "hp");

        let strict = RandomiserSettings {
            abort_on_validation_errors: true,
            ..settings(1)
        };
        let err = randomise_rom(bytes, &strict).unwrap_err();
        assert!(matches!(err, RandomiserError::Validation(1)));
        assert_eq!(err.kind(), ErrorKind::FieldValidation);
    }

    #[test]
    fn expansion_uses_free_space() {
        let s = RandomiserSettings {
            expand_catalogs: true,
            ..settings(1)
        };
        let output = randomise_rom(synthetic_rom("BPRE"), &s).unwrap();
        let expansion = output.report.expansion.unwrap();
        let moves = expansion.moves.unwrap();
        assert!(moves.offset >= 0x1000);
        assert!(moves.ids.iter().all(|&id| id >= 20));
        let names = expansion.ability_names.unwrap();
        assert!(names.ids.iter().all(|&id| id >= 3));
        assert!(names.ids.contains(&3));
    }

    #[test]
    fn rejects_invalid_settings() {
        let s = RandomiserSettings {
            trainer_level_boost: 0.0,
            ..settings(1)
        };
        assert!(matches!(
            randomise_rom(synthetic_rom("BPRE"), &s),
            Err(RandomiserError::Config(_))
        ));
    }

    #[test]
    fn run_writes_outputs_and_leaves_input() {
        let dir = tempfile::tempdir().unwrap();
        let input_path = dir.path().join("firered.gba");
        let input = synthetic_rom("BPRE");
        fs::write(&input_path, &input).unwrap();

        let output_path = dir.path().join("out");
        let report = run(RandomiserSettings {
            input_path: input_path.clone(),
            output_path: output_path.clone(),
            debug: true,
            ..settings(5)
        })
        .unwrap();

        let out_root = output_path.join("FireRed_5");
        let written = fs::read(out_root.join("randomised.gba")).unwrap();
        assert_eq!(written.len(), input.len());
        assert_eq!(rom::checksum(&written), report.output_checksum);
        assert_eq!(fs::read(&input_path).unwrap(), input);
        for name in ["species.json", "moves.json", "config.json", "report.json", "spoiler_log.txt"] {
            assert!(out_root.join(name).is_file(), "{}", name);
        }
    }

    #[test]
    fn failed_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input_path = dir.path().join("emerald.gba");
        fs::write(&input_path, synthetic_rom("BPEE")).unwrap();
        let output_path = dir.path().join("out");

        let err = run(RandomiserSettings {
            input_path,
            output_path: output_path.clone(),
            ..settings(5)
        })
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FatalFormat);
        assert!(!output_path.exists());
    }

    #[test]
    fn missing_input_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(RandomiserSettings {
            input_path: dir.path().join("missing.gba"),
            output_path: dir.path().join("out"),
            ..settings(1)
        })
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn settings_load_from_json_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{
                "seed": 99,
                "input_path": "rom.gba",
                "rules": { "trainer_theme_retention": 0.9 }
            }"#,
        )
        .unwrap();

        let s = RandomiserSettings::from_json_file(&path).unwrap();
        assert_eq!(s.seed, 99);
        assert_eq!(s.input_path, PathBuf::from("rom.gba"));
        assert_eq!(s.trainer_level_boost, 1.2);
        assert_eq!(s.rules.trainer_theme_retention, 0.9);
        assert_eq!(s.rules.type_similarity_weight, 0.3);
        assert_eq!(s.rules.generation_mix_weights.len(), 9);
        s.validate().unwrap();

        fs::write(&path, "{ not json").unwrap();
        let err = RandomiserSettings::from_json_file(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}
