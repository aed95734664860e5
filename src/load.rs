//! Fitness, fatigue and form accumulation
//!
//! Every calendar day moves the chronic (CTL) and acute (ATL) loads toward
//! that day's stress with an exponential decay:
//!
//! ```text
//! ctl = ctl' + (stress - ctl') * (1 - e^(-1/42))
//! atl = atl' + (stress - atl') * (1 - e^(-1/7))
//! tsb = ctl - atl
//! ```
//!
//! The smoothed VO2max follows the same recurrence with its own time
//! constant, but only moves on days carrying a VO2max sample.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{PreconditionError, TrendError};
use crate::models::{DayFitnessTrend, DayStress};
use crate::zones::{TrainingZone, ZoneBoundaries};

/// Load recurrence time constants, in days
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// CTL time constant (default: 42)
    pub ctl_time_constant: f64,

    /// ATL time constant (default: 7)
    pub atl_time_constant: f64,

    /// VO2max smoothing time constant (default: 42)
    pub vo2_time_constant: f64,
}

impl Default for LoadConfig {
    fn default() -> Self {
        LoadConfig {
            ctl_time_constant: 42.0,
            atl_time_constant: 7.0,
            vo2_time_constant: 42.0,
        }
    }
}

impl LoadConfig {
    /// Time constants must be finite and positive
    pub fn validate(&self) -> Result<(), TrendError> {
        let constants = [
            ("ctl_time_constant", self.ctl_time_constant),
            ("atl_time_constant", self.atl_time_constant),
            ("vo2_time_constant", self.vo2_time_constant),
        ];

        for (name, value) in constants {
            if !value.is_finite() || value <= 0.0 {
                return Err(TrendError::Configuration(format!(
                    "{} must be a positive number of days, got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }
}

/// Load state before the first day
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadSeed {
    pub ctl: f64,
    pub atl: f64,
    pub vo2: f64,
}

/// Folds daily stress records into daily load records
#[derive(Debug, Clone)]
pub struct LoadAccumulator {
    zones: ZoneBoundaries,
    seed: LoadSeed,
    ctl_factor: f64,
    atl_factor: f64,
    vo2_factor: f64,
}

impl LoadAccumulator {
    pub fn new(config: &LoadConfig, zones: ZoneBoundaries) -> Self {
        LoadAccumulator {
            zones,
            seed: LoadSeed::default(),
            ctl_factor: decay_factor(config.ctl_time_constant),
            atl_factor: decay_factor(config.atl_time_constant),
            vo2_factor: decay_factor(config.vo2_time_constant),
        }
    }

    /// Start from a non-zero load state
    pub fn with_seed(mut self, seed: LoadSeed) -> Self {
        self.seed = seed;
        self
    }

    pub fn seed(&self) -> LoadSeed {
        self.seed
    }

    /// Apply one day of the recurrence
    ///
    /// `previous` is the record of the day before; `None` starts from the
    /// seed. Ordering is not checked here, see [`accumulate_from`].
    ///
    /// [`accumulate_from`]: LoadAccumulator::accumulate_from
    pub fn step(&self, previous: Option<&DayFitnessTrend>, day: DayStress) -> DayFitnessTrend {
        let (prev_ctl, prev_atl, prev_vo2) = match previous {
            Some(previous) => (previous.ctl, previous.atl, previous.vo2),
            None => (self.seed.ctl, self.seed.atl, self.seed.vo2),
        };

        let stress = day.load();
        let ctl = prev_ctl + (stress - prev_ctl) * self.ctl_factor;
        let atl = prev_atl + (stress - prev_atl) * self.atl_factor;
        let vo2 = match day.vo2max {
            Some(sample) => prev_vo2 + (sample - prev_vo2) * self.vo2_factor,
            None => prev_vo2,
        };
        let tsb = ctl - atl;

        DayFitnessTrend {
            stress: day,
            ctl,
            atl,
            tsb,
            vo2,
            previous_ctl: previous.map(|previous| previous.ctl),
            previous_atl: previous.map(|previous| previous.atl),
            previous_vo2: previous.map(|previous| previous.vo2),
            previous_tsb: previous.map(|previous| previous.tsb),
            training_zone: TrainingZone::from_tsb(tsb, &self.zones),
        }
    }

    /// Accumulate a consecutive run of days starting from the seed
    pub fn accumulate(
        &self,
        days: Vec<DayStress>,
    ) -> Result<Vec<DayFitnessTrend>, PreconditionError> {
        self.accumulate_from(None, days)
    }

    /// Continue accumulation after an existing last day
    ///
    /// Days must be strictly consecutive calendar days following `previous`.
    /// The returned records do not include `previous` itself.
    pub fn accumulate_from(
        &self,
        previous: Option<&DayFitnessTrend>,
        days: Vec<DayStress>,
    ) -> Result<Vec<DayFitnessTrend>, PreconditionError> {
        check_consecutive(previous.map(DayFitnessTrend::date), &days)?;

        let mut trend: Vec<DayFitnessTrend> = Vec::with_capacity(days.len());
        for day in days {
            let next = self.step(trend.last().or(previous), day);
            trend.push(next);
        }

        Ok(trend)
    }
}

/// Per-day smoothing weight of an exponential moving average
fn decay_factor(time_constant: f64) -> f64 {
    1.0 - (-1.0 / time_constant).exp()
}

/// Fail fast on out-of-order, duplicated or missing days
fn check_consecutive(
    previous: Option<NaiveDate>,
    days: &[DayStress],
) -> Result<(), PreconditionError> {
    let mut last = previous;

    for day in days {
        day.validate()?;

        if let Some(previous) = last {
            let current = day.date;
            if current == previous {
                return Err(PreconditionError::DuplicateDate { date: current });
            }
            if current < previous {
                return Err(PreconditionError::Unsorted { previous, current });
            }
            if previous.succ_opt() != Some(current) {
                return Err(PreconditionError::Gap { previous, current });
            }
        }

        last = Some(day.date);
    }

    Ok(())
}
