//! Stress score aggregation
//!
//! Turns the activities of one calendar day into a single [`DayStress`]
//! record. Days are independent of each other, so a full activity history is
//! aggregated in parallel and collected back into date order.

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::athlete::AthleteSnapshotResolver;
use crate::error::PreconditionError;
use crate::models::{Activity, AthleteSnapshot, DayStress};
use crate::scoring::StressScoreCalculator;

/// Heart-rate stress model, one global switch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeartRateImpulseMode {
    /// Heart rate stress score
    Hrss,
    /// Banister training impulse
    Trimp,
}

/// Which VO2max sample represents a day with several VO2max-capable activities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vo2maxSamplePolicy {
    /// Highest sample of the day
    Max,
    /// Sample of the latest activity of the day
    MostRecent,
}

/// Stress scoring and aggregation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StressConfig {
    pub heart_rate_impulse_mode: HeartRateImpulseMode,

    /// Score rides with power data
    pub power_meter_enabled: bool,

    /// Score swims from distance and duration
    pub swim_enabled: bool,

    /// Accept power data not measured by a power meter
    pub allow_estimated_power_stress_score: bool,

    /// Score runs from pace against the running threshold pace
    pub allow_estimated_running_stress_score: bool,

    pub vo2max_policy: Vo2maxSamplePolicy,
}

impl Default for StressConfig {
    fn default() -> Self {
        StressConfig {
            heart_rate_impulse_mode: HeartRateImpulseMode::Hrss,
            power_meter_enabled: true,
            swim_enabled: true,
            allow_estimated_power_stress_score: false,
            allow_estimated_running_stress_score: true,
            vo2max_policy: Vo2maxSamplePolicy::Max,
        }
    }
}

/// Combines a day's activities into a daily stress record
pub struct StressScoreAggregator {
    config: StressConfig,
}

impl StressScoreAggregator {
    pub fn new(config: StressConfig) -> Self {
        StressScoreAggregator { config }
    }

    pub fn config(&self) -> &StressConfig {
        &self.config
    }

    /// Group activities by start day, each day ordered by start time then id
    pub fn group_by_day(
        activities: &[Activity],
    ) -> Result<BTreeMap<NaiveDate, Vec<&Activity>>, PreconditionError> {
        let mut days: BTreeMap<NaiveDate, Vec<&Activity>> = BTreeMap::new();

        for activity in activities {
            let date = activity.start_date()?;
            days.entry(date).or_default().push(activity);
        }

        for day_activities in days.values_mut() {
            day_activities.sort_by(|a, b| {
                a.start_time
                    .cmp(&b.start_time)
                    .then_with(|| a.id.cmp(&b.id))
            });
        }

        Ok(days)
    }

    /// Aggregate every day that has activities
    ///
    /// Each day is scored with the athlete snapshot in effect on that date.
    pub fn aggregate<R: AthleteSnapshotResolver>(
        &self,
        activities: &[Activity],
        resolver: &R,
    ) -> Result<BTreeMap<NaiveDate, DayStress>, PreconditionError> {
        let grouped = Self::group_by_day(activities)?;

        let days: Vec<(NaiveDate, DayStress)> = grouped
            .into_par_iter()
            .map(|(date, day_activities)| {
                let snapshot = resolver.resolve(date);
                self.aggregate_day(date, &day_activities, snapshot)
                    .map(|day| (date, day))
            })
            .collect::<Result<_, _>>()?;

        debug!(days = days.len(), "Aggregated daily stress");

        Ok(days.into_iter().collect())
    }

    /// Build the stress record of one day
    ///
    /// Every activity must start on `date`.
    pub fn aggregate_day(
        &self,
        date: NaiveDate,
        activities: &[&Activity],
        snapshot: AthleteSnapshot,
    ) -> Result<DayStress, PreconditionError> {
        let mut day = DayStress::empty(date);

        for activity in activities {
            let activity_date = activity.start_date()?;
            if activity_date != date {
                return Err(PreconditionError::InvalidDay {
                    date,
                    reason: format!(
                        "activity {} starts on {}",
                        activity.id, activity_date
                    ),
                });
            }

            let scores = StressScoreCalculator::score(activity, &snapshot.settings, &self.config);

            day.activity_ids.push(activity.id.clone());
            day.activity_names.push(activity.name.clone());
            day.activity_types.push(activity.activity_type);

            day.heart_rate_stress_score =
                sum_scores(day.heart_rate_stress_score, scores.heart_rate_stress_score);
            day.training_impulse_score =
                sum_scores(day.training_impulse_score, scores.training_impulse_score);
            day.power_stress_score = sum_scores(day.power_stress_score, scores.power_stress_score);
            day.running_stress_score =
                sum_scores(day.running_stress_score, scores.running_stress_score);
            day.swim_stress_score = sum_scores(day.swim_stress_score, scores.swim_stress_score);
        }

        day.vo2max = self.day_vo2max_sample(activities);
        day.final_stress_score = self.resolve_final_score(&day);
        day.athlete_snapshot = Some(snapshot);

        Ok(day)
    }

    /// Final score precedence: power, running, swim, then the heart-rate model
    pub fn resolve_final_score(&self, day: &DayStress) -> Option<f64> {
        let heart_rate_score = match self.config.heart_rate_impulse_mode {
            HeartRateImpulseMode::Hrss => day.heart_rate_stress_score,
            HeartRateImpulseMode::Trimp => day.training_impulse_score,
        };

        day.power_stress_score
            .or(day.running_stress_score)
            .or(day.swim_stress_score)
            .or(heart_rate_score)
    }

    /// VO2max sample of a day according to the configured policy
    fn day_vo2max_sample(&self, activities: &[&Activity]) -> Option<f64> {
        let samples = activities
            .iter()
            .filter_map(|activity| activity.vo2max.filter(|vo2max| vo2max.is_finite()));

        match self.config.vo2max_policy {
            Vo2maxSamplePolicy::Max => samples.fold(None, |best: Option<f64>, sample| {
                Some(best.map_or(sample, |best| best.max(sample)))
            }),
            // Activities are ordered by start time
            Vo2maxSamplePolicy::MostRecent => samples.last(),
        }
    }
}

fn sum_scores(total: Option<f64>, score: Option<f64>) -> Option<f64> {
    match (total, score) {
        (Some(total), Some(score)) => Some(total + score),
        (None, score) => score,
        (total, None) => total,
    }
}
