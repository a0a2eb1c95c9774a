use serde::Serialize;
use std::fmt;

use crate::records::{MoveRecord, SpeciesRecord, WildEncounterEntry};
use crate::rom::{Rom, RomHeader};
use crate::types::TYPE_COUNT;
use crate::{RandomiserError, Result};

/// Game codes accepted at the header code offset.
pub const ACCEPTED_CODES: &[&str] = &["BPRE", "BPRF"];

const MAX_TYPE_ID: u32 = TYPE_COUNT as u32 - 1;

/// A decoded field outside its allowed range. Collected, never thrown.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub record: String,
    pub field: &'static str,
    pub value: i64,
    pub min: i64,
    pub max: i64,
    /// Set when the value is in range but breaks a relation with another
    /// field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<&'static str>,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(rule) = self.rule {
            return write!(f, "{}: {} = {} ({})", self.record, self.field, self.value, rule);
        }
        write!(
            f,
            "{}: {} = {} (expected {}..={})",
            self.record, self.field, self.value, self.min, self.max
        )
    }
}

struct Checker<'a> {
    record: &'a str,
    out: Vec<FieldViolation>,
}

impl<'a> Checker<'a> {
    fn new(record: &'a str) -> Self {
        Self {
            record,
            out: Vec::new(),
        }
    }

    fn range(&mut self, field: &'static str, value: impl Into<i64>, min: i64, max: i64) {
        let value = value.into();
        if value < min || value > max {
            self.out.push(FieldViolation {
                record: self.record.to_string(),
                field,
                value,
                min,
                max,
                rule: None,
            });
        }
    }

    fn rule(&mut self, field: &'static str, value: impl Into<i64>, min: i64, max: i64, rule: &'static str) {
        self.out.push(FieldViolation {
            record: self.record.to_string(),
            field,
            value: value.into(),
            min,
            max,
            rule: Some(rule),
        });
    }
}

/// Fails unless the header carries a recognised game code.
pub fn validate_header(rom: &Rom) -> Result<RomHeader> {
    let header = RomHeader::parse(rom).map_err(|_| RandomiserError::UnrecognizedFormat {
        found: format!("buffer of {} bytes has no header", rom.len()),
        expected: ACCEPTED_CODES,
    })?;
    if !ACCEPTED_CODES.contains(&header.code.as_str()) {
        return Err(RandomiserError::UnrecognizedFormat {
            found: header.code,
            expected: ACCEPTED_CODES,
        });
    }
    Ok(header)
}

pub fn validate_species(id: u16, record: &SpeciesRecord) -> Vec<FieldViolation> {
    let label = format!("species {}", id);
    let mut c = Checker::new(&label);
    for (name, value) in record.base_stats.named() {
        c.range(name, value, 1, 255);
    }
    c.range("type1", record.type1, 0, MAX_TYPE_ID.into());
    if let Some(t) = record.type2 {
        c.range("type2", t, 0, MAX_TYPE_ID.into());
        // Stored as a repeat of type1, so this reads back as `None`.
        if t == record.type1 {
            c.rule("type2", t, 0, MAX_TYPE_ID.into(), "same as type1; use None for a single type");
        }
    }
    c.range("catch_rate", record.catch_rate, 3, 255);
    c.out
}

pub fn validate_move(id: u16, record: &MoveRecord) -> Vec<FieldViolation> {
    let label = format!("move {}", id);
    let mut c = Checker::new(&label);
    c.range("power", record.power, 0, 255);
    c.range("type", record.move_type, 0, MAX_TYPE_ID.into());
    c.range("accuracy", record.accuracy, 0, 100);
    c.range("pp", record.pp, 1, 40);
    c.out
}

pub fn validate_wild_entry(area: &str, slot: usize, entry: &WildEncounterEntry) -> Vec<FieldViolation> {
    let label = format!("{} slot {}", area, slot);
    let mut c = Checker::new(&label);
    c.range("min_level", entry.min_level, 1, 100);
    c.range("max_level", entry.max_level, 1, 100);
    if entry.min_level > entry.max_level {
        c.rule("min_level", entry.min_level, 1, entry.max_level.into(), "above max_level");
    }
    c.out
}
