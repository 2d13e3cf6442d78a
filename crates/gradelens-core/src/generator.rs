//! Synthetic grade data.
//!
//! Each simulated student gets an ability drawn from a normal distribution,
//! each item a difficulty drawn uniformly. The chance of a correct response
//! is a logistic curve of how far the student's ability exceeds the item's
//! difficulty.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{AnalyticsError, Result};
use crate::model::{Outcome, StudentRecord, ITEM_COUNT};

/// Parameters for [`generate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticConfig {
    pub students: u32,
    pub seed: u64,
    #[serde(default = "default_ability_mean")]
    pub ability_mean: f64,
    #[serde(default = "default_ability_std_dev")]
    pub ability_std_dev: f64,
    #[serde(default = "default_difficulty_range")]
    pub difficulty_range: (f64, f64),
    /// Slope of the logistic response curve.
    #[serde(default = "default_discrimination")]
    pub discrimination: f64,
}

fn default_ability_mean() -> f64 {
    7.0
}

fn default_ability_std_dev() -> f64 {
    1.5
}

fn default_difficulty_range() -> (f64, f64) {
    (0.3, 0.9)
}

fn default_discrimination() -> f64 {
    5.0
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            students: 100,
            seed: 42,
            ability_mean: default_ability_mean(),
            ability_std_dev: default_ability_std_dev(),
            difficulty_range: default_difficulty_range(),
            discrimination: default_discrimination(),
        }
    }
}

impl SyntheticConfig {
    fn validate(&self) -> Result<()> {
        if self.students == 0 {
            return Err(AnalyticsError::invalid("students", "must be at least 1"));
        }
        if !self.ability_mean.is_finite() {
            return Err(AnalyticsError::invalid("ability_mean", "must be a finite number"));
        }
        if !self.discrimination.is_finite() {
            return Err(AnalyticsError::invalid("discrimination", "must be a finite number"));
        }
        if !(self.ability_std_dev.is_finite() && self.ability_std_dev >= 0.0) {
            return Err(AnalyticsError::invalid(
                "ability_std_dev",
                "must be a non-negative number",
            ));
        }
        let (lo, hi) = self.difficulty_range;
        if !(0.0..=1.0).contains(&lo) || !(0.0..=1.0).contains(&hi) || lo >= hi {
            return Err(AnalyticsError::invalid(
                "difficulty_range",
                format!("expected 0 <= low < high <= 1, got ({lo}, {hi})"),
            ));
        }
        Ok(())
    }
}

/// Standard normal sample via Box–Muller.
fn standard_normal(rng: &mut impl Rng) -> f64 {
    let u1 = rng.gen::<f64>().clamp(f64::MIN_POSITIVE, 1.0);
    let u2 = rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

/// P(correct) for a student of `ability` (0-10 scale) on an item of
/// `difficulty` (0-1).
pub fn response_probability(ability: f64, difficulty: f64, discrimination: f64) -> f64 {
    let margin = ability / 10.0 - (1.0 - difficulty);
    1.0 / (1.0 + (-discrimination * margin).exp())
}

/// Simulate `config.students` students numbered from 1. The same config
/// always yields the same records.
pub fn generate(config: &SyntheticConfig) -> Result<Vec<StudentRecord>> {
    config.validate()?;
    let mut rng = StdRng::seed_from_u64(config.seed);

    let (lo, hi) = config.difficulty_range;
    let difficulties: [f64; ITEM_COUNT] = std::array::from_fn(|_| rng.gen_range(lo..hi));

    let records: Vec<StudentRecord> = (1..=config.students)
        .map(|student_id| {
            let ability = config.ability_mean + config.ability_std_dev * standard_normal(&mut rng);
            let responses = difficulties.map(|difficulty| {
                let p = response_probability(ability, difficulty, config.discrimination);
                if rng.gen_bool(p.clamp(0.0, 1.0)) {
                    Outcome::Correct
                } else {
                    Outcome::Incorrect
                }
            });
            StudentRecord::new(student_id, responses)
        })
        .collect();

    tracing::debug!(
        students = records.len(),
        seed = config.seed,
        "generated synthetic grades"
    );
    Ok(records)
}
