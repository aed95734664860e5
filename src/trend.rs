//! Fitness trend assembly
//!
//! Orchestrates the pipeline from raw activities to a gap-free, day by day
//! trend: score activities, sum them per day, fill rest days up to today,
//! accumulate the loads and append the forecast.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, info_span, warn};

use crate::athlete::AthleteSnapshotResolver;
use crate::config::TrendConfig;
use crate::error::{PreconditionError, Result};
use crate::forecast::ForecastExtender;
use crate::load::LoadAccumulator;
use crate::models::{Activity, DateRange, DayFitnessTrend, DayStress};
use crate::stress::StressScoreAggregator;
use crate::zones::ZoneBaseLine;

/// Dated value of a chart line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GraphPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Chart lines of a run of days
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendSeries {
    pub ctl: Vec<GraphPoint>,
    pub atl: Vec<GraphPoint>,
    pub tsb: Vec<GraphPoint>,
    pub vo2: Vec<GraphPoint>,
}

impl TrendSeries {
    fn from_days(days: &[DayFitnessTrend]) -> Self {
        let line = |value: fn(&DayFitnessTrend) -> f64| -> Vec<GraphPoint> {
            days.iter()
                .map(|day| GraphPoint {
                    date: day.date(),
                    value: value(day),
                })
                .collect()
        };

        TrendSeries {
            ctl: line(|day| day.ctl),
            atl: line(|day| day.atl),
            tsb: line(|day| day.tsb),
            vo2: line(|day| day.vo2),
        }
    }
}

/// Day by day fitness trend: history followed by the preview days
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitnessTrend {
    days: Vec<DayFitnessTrend>,
    base_lines: Vec<ZoneBaseLine>,
}

impl FitnessTrend {
    fn new(days: Vec<DayFitnessTrend>, base_lines: Vec<ZoneBaseLine>) -> Self {
        FitnessTrend { days, base_lines }
    }

    /// Full ordered trend, forecast included
    pub fn days(&self) -> &[DayFitnessTrend] {
        &self.days
    }

    pub fn into_days(self) -> Vec<DayFitnessTrend> {
        self.days
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    fn history_len(&self) -> usize {
        self.days.partition_point(|day| !day.is_preview())
    }

    /// History days only
    pub fn active_days(&self) -> &[DayFitnessTrend] {
        &self.days[..self.history_len()]
    }

    pub fn preview_days(&self) -> &[DayFitnessTrend] {
        &self.days[self.history_len()..]
    }

    /// Chart lines of the history days
    pub fn series(&self) -> TrendSeries {
        TrendSeries::from_days(self.active_days())
    }

    /// Chart lines of the preview days
    pub fn preview_series(&self) -> TrendSeries {
        TrendSeries::from_days(self.preview_days())
    }

    /// Fitness line of the history days
    pub fn active_line(&self) -> Vec<GraphPoint> {
        self.series().ctl
    }

    /// Last history day
    pub fn latest(&self) -> Option<&DayFitnessTrend> {
        self.active_days().last()
    }

    /// Training zone reference lines, empty when zones are disabled
    pub fn base_lines(&self) -> &[ZoneBaseLine] {
        &self.base_lines
    }

    /// Trend restricted to a display period
    ///
    /// Loads are not recomputed: days keep the values accumulated over the
    /// whole history.
    pub fn filtered(&self, range: &DateRange) -> FitnessTrend {
        let days = self
            .days
            .iter()
            .filter(|day| range.contains(&day.date()))
            .cloned()
            .collect();
        FitnessTrend::new(days, self.base_lines.clone())
    }
}

/// Builds a [`FitnessTrend`] from activities
pub struct FitnessTrendAssembler {
    config: TrendConfig,
    aggregator: StressScoreAggregator,
    accumulator: LoadAccumulator,
}

impl FitnessTrendAssembler {
    pub fn new(config: TrendConfig) -> Result<Self> {
        config.validate()?;

        let aggregator = StressScoreAggregator::new(config.stress.clone());
        let accumulator = LoadAccumulator::new(&config.load, config.zones)
            .with_seed(config.initial_fitness);

        Ok(FitnessTrendAssembler {
            config,
            aggregator,
            accumulator,
        })
    }

    pub fn config(&self) -> &TrendConfig {
        &self.config
    }

    /// Assemble the trend of `activities` up to `today`, then forecast
    ///
    /// The history runs from the first activity day to the later of `today`
    /// and the last activity day. No activities give an empty trend.
    pub fn assemble<R: AthleteSnapshotResolver>(
        &self,
        activities: &[Activity],
        resolver: &R,
        today: NaiveDate,
    ) -> Result<FitnessTrend> {
        let span = info_span!("assemble_fitness_trend", activities = activities.len(), %today);
        let _enter = span.enter();

        let base_lines = self
            .config
            .zones
            .base_lines(self.config.training_zones_enabled);

        let daily = self.aggregator.aggregate(activities, resolver)?;
        if daily.is_empty() {
            info!("No activities, fitness trend is empty");
            return Ok(FitnessTrend::new(Vec::new(), base_lines));
        }

        for day in daily.values().filter(|day| day.final_stress_score.is_none()) {
            warn!(
                date = %day.date,
                activities = day.activity_ids.len(),
                "No stress score for day, check athlete thresholds and activity data"
            );
        }

        let days = fill_rest_days(daily, today)?;
        debug!(days = days.len(), "Filled rest days");

        let history = self.accumulator.accumulate(days)?;
        let trend = ForecastExtender::new(&self.accumulator)
            .extend(&history, self.config.forecast_days)?;

        let trend = FitnessTrend::new(trend, base_lines);
        if let Some(latest) = trend.latest() {
            info!(
                days = trend.active_days().len(),
                preview_days = trend.preview_days().len(),
                ctl = latest.ctl,
                atl = latest.atl,
                tsb = latest.tsb,
                "Assembled fitness trend"
            );
        }

        Ok(trend)
    }
}

/// Consecutive days from the first activity day to `max(today, last day)`
fn fill_rest_days(
    mut daily: BTreeMap<NaiveDate, DayStress>,
    today: NaiveDate,
) -> std::result::Result<Vec<DayStress>, PreconditionError> {
    let (Some(first), Some(last)) = (
        daily.keys().next().copied(),
        daily.keys().next_back().copied(),
    ) else {
        return Ok(Vec::new());
    };
    let end = last.max(today);

    let mut days = Vec::new();
    let mut date = first;
    loop {
        days.push(
            daily
                .remove(&date)
                .unwrap_or_else(|| DayStress::empty(date)),
        );
        if date >= end {
            break;
        }
        date = date
            .succ_opt()
            .ok_or(PreconditionError::DateOutOfRange { date })?;
    }

    Ok(days)
}
