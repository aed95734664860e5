use chrono::NaiveDate;
use tracing::debug;

use crate::error::PreconditionError;
use crate::load::LoadAccumulator;
use crate::models::{DayFitnessTrend, DayStress};

/// Projects the load state forward over rest days
pub struct ForecastExtender<'a> {
    accumulator: &'a LoadAccumulator,
}

impl<'a> ForecastExtender<'a> {
    pub fn new(accumulator: &'a LoadAccumulator) -> Self {
        ForecastExtender { accumulator }
    }

    /// Preview days following the last history day
    ///
    /// An empty history has nothing to project from and yields no preview.
    pub fn forecast(
        &self,
        history: &[DayFitnessTrend],
        horizon: u32,
    ) -> Result<Vec<DayFitnessTrend>, PreconditionError> {
        let Some(last) = history.last() else {
            return Ok(Vec::new());
        };

        let days = preview_dates(last.date(), horizon)?
            .into_iter()
            .map(DayStress::preview)
            .collect();

        let preview = self.accumulator.accumulate_from(Some(last), days)?;
        debug!(
            from = %last.date(),
            days = preview.len(),
            "Computed forecast"
        );

        Ok(preview)
    }

    /// History followed by its forecast, as a new vector
    pub fn extend(
        &self,
        history: &[DayFitnessTrend],
        horizon: u32,
    ) -> Result<Vec<DayFitnessTrend>, PreconditionError> {
        let preview = self.forecast(history, horizon)?;

        let mut extended = Vec::with_capacity(history.len() + preview.len());
        extended.extend_from_slice(history);
        extended.extend(preview);
        Ok(extended)
    }
}

fn preview_dates(last: NaiveDate, horizon: u32) -> Result<Vec<NaiveDate>, PreconditionError> {
    let mut dates = Vec::new();
    let mut current = last;

    for _ in 0..horizon {
        current = current
            .succ_opt()
            .ok_or(PreconditionError::DateOutOfRange { date: current })?;
        dates.push(current);
    }

    Ok(dates)
}
