//! Constrained species replacement for wild encounters, trainer rosters and
//! starters.

use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::layout::WildArea;
use crate::records::{Trainer, WildEncounterEntry};
use crate::species::{EvolutionStage, SpeciesEntry, SpeciesPool};
use crate::types::{PokemonType, TypeChart};
use crate::{RandomiserError, Result};

/// Encounter rate (percent) of each slot in a 12-slot table. Larger tables
/// reuse the pattern.
pub const SLOT_RATES: [u8; 12] = [20, 20, 10, 10, 10, 10, 5, 5, 4, 4, 1, 1];

/// Candidates scoring at least this are preferred over the rest.
pub const PREFERENCE_THRESHOLD: f64 = 0.5;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomisationRules {
    pub preserve_legendaries: bool,
    pub respect_evolution_stages: bool,
    pub type_similarity_weight: f64,
    pub stat_similarity_weight: f64,
    /// Generation (1..=9) to probability; must sum to 1.
    pub generation_mix_weights: BTreeMap<u8, f64>,
    pub trainer_theme_retention: f64,
    pub level_variation: u8,
}

impl Default for RandomisationRules {
    fn default() -> Self {
        Self {
            preserve_legendaries: true,
            respect_evolution_stages: true,
            type_similarity_weight: 0.3,
            stat_similarity_weight: 0.4,
            generation_mix_weights: [
                (1, 0.25),
                (2, 0.15),
                (3, 0.15),
                (4, 0.12),
                (5, 0.10),
                (6, 0.08),
                (7, 0.07),
                (8, 0.05),
                (9, 0.03),
            ]
            .into_iter()
            .collect(),
            trainer_theme_retention: 0.5,
            level_variation: 3,
        }
    }
}

impl RandomisationRules {
    pub fn validate(&self) -> Result<()> {
        for (name, w) in [
            ("type_similarity_weight", self.type_similarity_weight),
            ("stat_similarity_weight", self.stat_similarity_weight),
        ] {
            if !w.is_finite() || w < 0.0 {
                return Err(RandomiserError::Config(format!(
                    "{} must be a non-negative number, got {}",
                    name, w
                )));
            }
        }

        if !(0.0..=1.0).contains(&self.trainer_theme_retention) {
            return Err(RandomiserError::Config(format!(
                "trainer_theme_retention must be within 0..=1, got {}",
                self.trainer_theme_retention
            )));
        }

        let mut sum = 0.0;
        for (&generation, &w) in &self.generation_mix_weights {
            if !(1..=9).contains(&generation) {
                return Err(RandomiserError::UnknownGeneration(generation as u16));
            }
            if !w.is_finite() || w < 0.0 {
                return Err(RandomiserError::Config(format!(
                    "weight for generation {} must be non-negative, got {}",
                    generation, w
                )));
            }
            sum += w;
        }
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(RandomiserError::Config(format!(
                "generation_mix_weights must sum to 1.0, got {:.4}",
                sum
            )));
        }
        Ok(())
    }
}

/// A hard constraint that had to be loosened to make a choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum Relaxation {
    /// The drawn generation had no eligible species; the whole pool was used.
    EmptyGenerationBucket { context: String, generation: u8 },
    /// No species of the original's stage was eligible.
    EvolutionStage {
        context: String,
        original: u16,
        stage: EvolutionStage,
    },
    /// Nothing was eligible; the original species was kept.
    NoCandidate { context: String, original: u16 },
    /// No eligible species shares the trainer's theme type.
    ThemeUnavailable { trainer: usize, theme: u8 },
    StarterBalance { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WildAssignment {
    pub area: String,
    pub slot: usize,
    pub original: u16,
    pub replacement: u16,
    pub level: u8,
    pub rate: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrainerAssignment {
    pub trainer: usize,
    pub slot: usize,
    pub original: u16,
    pub replacement: u16,
    pub original_level: u8,
    pub level: u8,
    pub signature: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StarterAssignment {
    pub slot: usize,
    pub original: u16,
    pub replacement: u16,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RandomisationOutcome {
    pub wild: Vec<WildAssignment>,
    pub trainers: Vec<TrainerAssignment>,
    pub starters: Vec<StarterAssignment>,
    pub relaxations: Vec<Relaxation>,
}

/// Roster level scaling applied after species replacement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelScaling {
    pub boost: f64,
    pub variation: u8,
}

/// `round(level * boost)` plus a uniform offset in `[-variation, variation]`,
/// clamped to 1..=100.
pub fn scale_level<R: Rng + ?Sized>(level: u8, scaling: LevelScaling, rng: &mut R) -> u8 {
    let v = scaling.variation as i32;
    let offset = if v == 0 { 0 } else { rng.gen_range(-v..=v) };
    let scaled = (level as f64 * scaling.boost).round() as i32 + offset;
    scaled.clamp(1, 100) as u8
}

pub struct Randomiser<'a> {
    pool: &'a SpeciesPool,
    chart: &'a TypeChart,
    rules: &'a RandomisationRules,
    relaxations: Vec<Relaxation>,
}

impl<'a> Randomiser<'a> {
    pub fn new(pool: &'a SpeciesPool, chart: &'a TypeChart, rules: &'a RandomisationRules) -> Self {
        Self {
            pool,
            chart,
            rules,
            relaxations: Vec::new(),
        }
    }

    pub fn relaxations(&self) -> &[Relaxation] {
        &self.relaxations
    }

    pub fn into_relaxations(self) -> Vec<Relaxation> {
        self.relaxations
    }

    fn relax(&mut self, relaxation: Relaxation) {
        tracing::warn!("selection relaxed: {:?}", relaxation);
        self.relaxations.push(relaxation);
    }

    /// Cumulative draw over the generation weights.
    fn draw_generation<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<u8> {
        self.generation_at(rng.gen())
    }

    /// Generation whose cumulative weight band holds `r`. Weights may sum to
    /// slightly less than 1, so a draw past the total lands in the last
    /// weighted generation.
    fn generation_at(&self, r: f64) -> Option<u8> {
        let mut cumulative = 0.0;
        let mut last = None;
        for (&generation, &w) in &self.rules.generation_mix_weights {
            if w <= 0.0 {
                continue;
            }
            cumulative += w;
            last = Some(generation);
            if r < cumulative {
                return last;
            }
        }
        last
    }

    fn eligible(&self, original: &SpeciesEntry, candidate: &SpeciesEntry, check_stage: bool, required_type: Option<u8>) -> bool {
        if self.rules.preserve_legendaries && candidate.legendary {
            return false;
        }
        if check_stage && self.rules.respect_evolution_stages && candidate.stage != original.stage {
            return false;
        }
        required_type.map_or(true, |t| candidate.has_type(t))
    }

    /// Eligible candidates plus the relaxations needed to find any.
    fn candidate_set(
        &self,
        original: &SpeciesEntry,
        generation: Option<u8>,
        required_type: Option<u8>,
        context: &str,
    ) -> (Vec<&'a SpeciesEntry>, Vec<Relaxation>) {
        let pool: &'a SpeciesPool = self.pool;
        let mut relaxed = Vec::new();

        let all: Vec<&'a SpeciesEntry> = pool
            .iter()
            .filter(|c| self.eligible(original, c, true, required_type))
            .collect();

        if let Some(g) = generation {
            let bucket: Vec<&'a SpeciesEntry> =
                all.iter().copied().filter(|c| c.generation == g).collect();
            if !bucket.is_empty() {
                return (bucket, relaxed);
            }
            relaxed.push(Relaxation::EmptyGenerationBucket {
                context: context.to_string(),
                generation: g,
            });
        }

        if !all.is_empty() || !self.rules.respect_evolution_stages {
            return (all, relaxed);
        }

        relaxed.push(Relaxation::EvolutionStage {
            context: context.to_string(),
            original: original.id,
            stage: original.stage,
        });
        let any_stage = pool
            .iter()
            .filter(|c| self.eligible(original, c, false, required_type))
            .collect();
        (any_stage, relaxed)
    }

    /// Soft preference in [0, 1] combining type overlap and BST closeness.
    pub fn preference(&self, original: &SpeciesEntry, candidate: &SpeciesEntry) -> f64 {
        let tw = self.rules.type_similarity_weight;
        let sw = self.rules.stat_similarity_weight;
        if tw + sw <= 0.0 {
            return 0.0;
        }

        let original_types = original.types();
        let shared = original_types.iter().filter(|&&t| candidate.has_type(t)).count();
        let type_overlap = shared as f64 / original_types.len() as f64;

        let stat_closeness = if original.bst == 0 {
            0.0
        } else {
            let diff = (candidate.bst as f64 - original.bst as f64).abs();
            (1.0 - diff / original.bst as f64).clamp(0.0, 1.0)
        };

        (tw * type_overlap + sw * stat_closeness) / (tw + sw)
    }

    fn draw_preferred<R: Rng + ?Sized>(
        &self,
        original: &SpeciesEntry,
        candidates: &[&SpeciesEntry],
        rng: &mut R,
    ) -> u16 {
        let scored: Vec<(u16, f64)> = candidates
            .iter()
            .map(|c| (c.id, self.preference(original, c)))
            .filter(|&(_, score)| score >= PREFERENCE_THRESHOLD)
            .collect();

        if let Ok(dist) = WeightedIndex::new(scored.iter().map(|&(_, s)| s)) {
            return scored[dist.sample(rng)].0;
        }
        candidates[rng.gen_range(0..candidates.len())].id
    }

    /// Replacement for one occurrence of `original`.
    ///
    /// With `theme` set the replacement must carry that type; if nothing
    /// does, a `ThemeUnavailable` relaxation is recorded and the theme is
    /// dropped.
    pub fn select<R: Rng + ?Sized>(
        &mut self,
        original: u16,
        context: &str,
        theme: Option<(usize, u8)>,
        rng: &mut R,
    ) -> u16 {
        let profile = self.pool.profile(original);
        if self.rules.preserve_legendaries && profile.legendary {
            return original;
        }

        let generation = self.draw_generation(rng);

        if let Some((trainer, theme_type)) = theme {
            let (candidates, relaxed) = self.candidate_set(&profile, generation, Some(theme_type), context);
            if !candidates.is_empty() {
                for r in relaxed {
                    self.relax(r);
                }
                return self.draw_preferred(&profile, &candidates, rng);
            }
            self.relax(Relaxation::ThemeUnavailable {
                trainer,
                theme: theme_type,
            });
        }

        let (candidates, relaxed) = self.candidate_set(&profile, generation, None, context);
        for r in relaxed {
            self.relax(r);
        }
        if candidates.is_empty() {
            self.relax(Relaxation::NoCandidate {
                context: context.to_string(),
                original,
            });
            return original;
        }
        self.draw_preferred(&profile, &candidates, rng)
    }

    /// Replaces every non-empty slot and draws its level from the area range.
    /// The written entry has min level == max level == the drawn level.
    pub fn randomise_wild<R: Rng + ?Sized>(
        &mut self,
        areas: &[WildArea],
        tables: &mut [Vec<WildEncounterEntry>],
        rng: &mut R,
    ) -> Vec<WildAssignment> {
        let mut out = Vec::new();
        for (area, table) in areas.iter().zip(tables.iter_mut()) {
            let lo = area.min_level.min(area.max_level);
            let hi = area.max_level.max(area.min_level);
            for (slot, entry) in table.iter_mut().enumerate() {
                if entry.species == 0 {
                    continue;
                }
                let level = rng.gen_range(lo..=hi);
                let context = format!("{} slot {}", area.name, slot);
                let replacement = self.select(entry.species, &context, None, rng);
                tracing::debug!("{}: {} -> {} at level {}", context, entry.species, replacement, level);

                out.push(WildAssignment {
                    area: area.name.clone(),
                    slot,
                    original: entry.species,
                    replacement,
                    level,
                    rate: SLOT_RATES[slot % SLOT_RATES.len()],
                });
                entry.species = replacement;
                entry.min_level = level;
                entry.max_level = level;
            }
        }
        out
    }

    /// Most common type across the roster; ties go to the lowest type id.
    pub fn theme_type(&self, species: &[u16]) -> Option<u8> {
        let mut counts: BTreeMap<u8, usize> = BTreeMap::new();
        for entry in species.iter().filter_map(|&id| self.pool.get(id)) {
            for t in entry.types() {
                *counts.entry(t).or_default() += 1;
            }
        }
        let mut best: Option<(u8, usize)> = None;
        for (t, n) in counts {
            if best.map_or(true, |(_, m)| n > m) {
                best = Some((t, n));
            }
        }
        best.map(|(t, _)| t)
    }

    /// Last roster slot whose species carries the theme type.
    pub fn signature_slot(&self, species: &[u16], theme: u8) -> Option<usize> {
        species
            .iter()
            .rposition(|&id| self.pool.get(id).map_or(false, |e| e.has_type(theme)))
    }

    pub fn randomise_trainers<R: Rng + ?Sized>(
        &mut self,
        trainers: &mut [Trainer],
        scaling: Option<LevelScaling>,
        rng: &mut R,
    ) -> Vec<TrainerAssignment> {
        let mut out = Vec::new();
        for trainer in trainers.iter_mut() {
            let species: Vec<u16> = trainer.roster.iter().map(|m| m.species).collect();
            let theme = self.theme_type(&species);
            let signature = theme.and_then(|t| self.signature_slot(&species, t));

            for (slot, mon) in trainer.roster.iter_mut().enumerate() {
                let is_signature = signature == Some(slot);
                let required = match theme {
                    Some(t) if is_signature && rng.gen_bool(self.rules.trainer_theme_retention) => {
                        Some((trainer.index, t))
                    }
                    _ => None,
                };

                let context = format!("trainer {} slot {}", trainer.index, slot);
                let replacement = self.select(mon.species, &context, required, rng);
                let original_level = mon.level;
                if let Some(scaling) = scaling {
                    mon.level = scale_level(mon.level, scaling, rng);
                }
                tracing::debug!("{}: {} -> {} (level {} -> {})", context, mon.species, replacement, original_level, mon.level);

                out.push(TrainerAssignment {
                    trainer: trainer.index,
                    slot,
                    original: mon.species,
                    replacement,
                    original_level,
                    level: mon.level,
                    signature: is_signature,
                });
                mon.species = replacement;
            }
        }
        out
    }

    fn primary_beats(&self, attacker: u8, defender: u8) -> bool {
        match (PokemonType::from_id(attacker), PokemonType::from_id(defender)) {
            (Ok(a), Ok(d)) => self.chart.is_super_effective(a, d),
            _ => false,
        }
    }

    /// Three distinct base-stage species with distinct primary types,
    /// preferring a set where each one beats the next.
    pub fn randomise_starters<R: Rng + ?Sized>(
        &mut self,
        current: [u16; 3],
        rng: &mut R,
    ) -> Vec<StarterAssignment> {
        let mut by_type: BTreeMap<u8, Vec<u16>> = BTreeMap::new();
        for e in self.pool.iter() {
            if e.stage != EvolutionStage::Base || (self.rules.preserve_legendaries && e.legendary) {
                continue;
            }
            by_type.entry(e.type1).or_default().push(e.id);
        }
        let types: Vec<u8> = by_type.keys().copied().collect();

        // Rotations of the same cycle are listed once, lowest type first.
        let mut triangles = Vec::new();
        for &a in &types {
            for &b in &types {
                for &c in &types {
                    if a < b
                        && a < c
                        && b != c
                        && self.primary_beats(a, b)
                        && self.primary_beats(b, c)
                        && self.primary_beats(c, a)
                    {
                        triangles.push([a, b, c]);
                    }
                }
            }
        }

        let picked_types = if !triangles.is_empty() {
            triangles[rng.gen_range(0..triangles.len())]
        } else if types.len() >= 3 {
            self.relax(Relaxation::StarterBalance {
                reason: "no type triangle among base-stage species".to_string(),
            });
            let mut pick = [0u8; 3];
            for (slot, &t) in pick.iter_mut().zip(types.choose_multiple(rng, 3)) {
                *slot = t;
            }
            pick
        } else {
            self.relax(Relaxation::StarterBalance {
                reason: format!("only {} distinct primary types at base stage", types.len()),
            });
            return current
                .iter()
                .enumerate()
                .map(|(slot, &id)| StarterAssignment {
                    slot,
                    original: id,
                    replacement: id,
                })
                .collect();
        };

        let mut out = Vec::with_capacity(3);
        for (slot, (&original, t)) in current.iter().zip(picked_types).enumerate() {
            let ids = by_type.get(&t).map(Vec::as_slice).unwrap_or_default();
            let replacement = if ids.is_empty() {
                original
            } else {
                ids[rng.gen_range(0..ids.len())]
            };
            tracing::debug!("starter {}: {} -> {}", slot, original, replacement);
            out.push(StarterAssignment {
                slot,
                original,
                replacement,
            });
        }
        out
    }
}
