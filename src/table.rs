//! Tabular view of a fitness trend
//!
//! Columns are addressed by stable string ids so a front end can persist a
//! column selection or sort key.

use chrono::Datelike;
use std::cmp::Ordering;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::config::TrendConfig;
use crate::error::{Result, TrendError};
use crate::models::DayFitnessTrend;
use crate::stress::HeartRateImpulseMode;
use crate::zones::TrainingZone;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FitnessTrendColumn {
    Date,
    Types,
    Activities,
    HeartRateStressScore,
    TrainingImpulseScore,
    PowerStressScore,
    RunningStressScore,
    SwimStressScore,
    FinalStressScore,
    Ctl,
    Atl,
    Vo2,
    Tsb,
    Zone,
    AthleteSettings,
}

impl FitnessTrendColumn {
    /// Every column in display order
    pub const ALL: [FitnessTrendColumn; 15] = [
        FitnessTrendColumn::Date,
        FitnessTrendColumn::Types,
        FitnessTrendColumn::Activities,
        FitnessTrendColumn::HeartRateStressScore,
        FitnessTrendColumn::TrainingImpulseScore,
        FitnessTrendColumn::PowerStressScore,
        FitnessTrendColumn::RunningStressScore,
        FitnessTrendColumn::SwimStressScore,
        FitnessTrendColumn::FinalStressScore,
        FitnessTrendColumn::Ctl,
        FitnessTrendColumn::Atl,
        FitnessTrendColumn::Vo2,
        FitnessTrendColumn::Tsb,
        FitnessTrendColumn::Zone,
        FitnessTrendColumn::AthleteSettings,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            FitnessTrendColumn::Date => "date",
            FitnessTrendColumn::Types => "types",
            FitnessTrendColumn::Activities => "activities",
            FitnessTrendColumn::HeartRateStressScore => "heartRateStressScore",
            FitnessTrendColumn::TrainingImpulseScore => "trainingImpulseScore",
            FitnessTrendColumn::PowerStressScore => "powerStressScore",
            FitnessTrendColumn::RunningStressScore => "runningStressScore",
            FitnessTrendColumn::SwimStressScore => "swimStressScore",
            FitnessTrendColumn::FinalStressScore => "finalStressScore",
            FitnessTrendColumn::Ctl => "ctl",
            FitnessTrendColumn::Atl => "atl",
            FitnessTrendColumn::Vo2 => "vo2",
            FitnessTrendColumn::Tsb => "tsb",
            FitnessTrendColumn::Zone => "zone",
            FitnessTrendColumn::AthleteSettings => "athleteSettings",
        }
    }

    pub fn header(&self) -> &'static str {
        match self {
            FitnessTrendColumn::Date => "Date",
            FitnessTrendColumn::Types => "Types",
            FitnessTrendColumn::Activities => "Activities",
            FitnessTrendColumn::HeartRateStressScore => "HRSS",
            FitnessTrendColumn::TrainingImpulseScore => "TRIMP",
            FitnessTrendColumn::PowerStressScore => "PSS",
            FitnessTrendColumn::RunningStressScore => "RSS",
            FitnessTrendColumn::SwimStressScore => "SwimSS",
            FitnessTrendColumn::FinalStressScore => "Final Stress",
            FitnessTrendColumn::Ctl => "Fitness",
            FitnessTrendColumn::Atl => "Fatigue",
            FitnessTrendColumn::Vo2 => "Vo2 Max",
            FitnessTrendColumn::Tsb => "Form",
            FitnessTrendColumn::Zone => "Training Zone",
            FitnessTrendColumn::AthleteSettings => "Settings",
        }
    }

    /// Look up a column by id
    pub fn from_id(id: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|column| column.id() == id)
            .ok_or_else(|| TrendError::UnknownColumn(id.to_string()))
    }

    /// Cell text of this column for a day
    pub fn format(&self, day: &DayFitnessTrend) -> String {
        let stress = &day.stress;
        match self {
            FitnessTrendColumn::Date => day.date().format("%a, %b %d, %Y").to_string(),
            FitnessTrendColumn::Types => day.print_types("-"),
            FitnessTrendColumn::Activities => day.print_activities("-"),
            FitnessTrendColumn::HeartRateStressScore => {
                DayFitnessTrend::print_stress_score(stress.heart_rate_stress_score)
            }
            FitnessTrendColumn::TrainingImpulseScore => {
                DayFitnessTrend::print_stress_score(stress.training_impulse_score)
            }
            FitnessTrendColumn::PowerStressScore => {
                DayFitnessTrend::print_stress_score(stress.power_stress_score)
            }
            FitnessTrendColumn::RunningStressScore => {
                DayFitnessTrend::print_stress_score(stress.running_stress_score)
            }
            FitnessTrendColumn::SwimStressScore => {
                DayFitnessTrend::print_stress_score(stress.swim_stress_score)
            }
            FitnessTrendColumn::FinalStressScore => {
                DayFitnessTrend::print_stress_score(stress.final_stress_score)
            }
            FitnessTrendColumn::Ctl => day.print_fitness(),
            FitnessTrendColumn::Atl => day.print_fatigue(),
            FitnessTrendColumn::Vo2 => day.print_vo2max(),
            FitnessTrendColumn::Tsb => day.print_form(),
            FitnessTrendColumn::Zone => day.print_training_zone().to_string(),
            FitnessTrendColumn::AthleteSettings => day
                .print_athlete_settings()
                .unwrap_or_else(|| "-".to_string()),
        }
    }

    fn sort_key(&self, day: &DayFitnessTrend) -> SortKey {
        let stress = &day.stress;
        match self {
            FitnessTrendColumn::Date => SortKey::Number(Some(f64::from(day.date().num_days_from_ce()))),
            FitnessTrendColumn::Types => SortKey::Text(day.print_types("")),
            FitnessTrendColumn::Activities => SortKey::Text(day.print_activities("")),
            FitnessTrendColumn::HeartRateStressScore => SortKey::Number(stress.heart_rate_stress_score),
            FitnessTrendColumn::TrainingImpulseScore => SortKey::Number(stress.training_impulse_score),
            FitnessTrendColumn::PowerStressScore => SortKey::Number(stress.power_stress_score),
            FitnessTrendColumn::RunningStressScore => SortKey::Number(stress.running_stress_score),
            FitnessTrendColumn::SwimStressScore => SortKey::Number(stress.swim_stress_score),
            FitnessTrendColumn::FinalStressScore => SortKey::Number(stress.final_stress_score),
            FitnessTrendColumn::Ctl => SortKey::Number(Some(day.ctl)),
            FitnessTrendColumn::Atl => SortKey::Number(Some(day.atl)),
            FitnessTrendColumn::Vo2 => SortKey::Number(Some(day.vo2)),
            FitnessTrendColumn::Tsb => SortKey::Number(Some(day.tsb)),
            FitnessTrendColumn::Zone => SortKey::Zone(day.training_zone),
            FitnessTrendColumn::AthleteSettings => SortKey::Unsortable,
        }
    }
}

/// Comparable value behind a column
#[derive(Debug, PartialEq)]
enum SortKey {
    Text(String),
    /// Absent values sort first
    Number(Option<f64>),
    Zone(TrainingZone),
    Unsortable,
}

impl SortKey {
    fn compare(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            (SortKey::Number(a), SortKey::Number(b)) => match (a, b) {
                (Some(a), Some(b)) => a.total_cmp(b),
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            (SortKey::Zone(a), SortKey::Zone(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl std::str::FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            _ => Err(format!("Invalid sort direction: {}", s)),
        }
    }
}

/// Columns shown for a configuration
///
/// Power, swim and zone columns follow their feature toggles. Only the
/// heart-rate column of the active impulse mode is shown, and the running
/// score column needs estimated running scores in HRSS mode.
pub fn visible_columns(config: &TrendConfig) -> Vec<FitnessTrendColumn> {
    let stress = &config.stress;
    let hrss_mode = stress.heart_rate_impulse_mode == HeartRateImpulseMode::Hrss;

    FitnessTrendColumn::ALL
        .iter()
        .copied()
        .filter(|column| match column {
            FitnessTrendColumn::PowerStressScore => stress.power_meter_enabled,
            FitnessTrendColumn::SwimStressScore => stress.swim_enabled,
            FitnessTrendColumn::Zone => config.training_zones_enabled,
            FitnessTrendColumn::RunningStressScore => {
                stress.allow_estimated_running_stress_score && hrss_mode
            }
            FitnessTrendColumn::HeartRateStressScore => hrss_mode,
            FitnessTrendColumn::TrainingImpulseScore => !hrss_mode,
            _ => true,
        })
        .collect()
}

/// Table rows: history days only, newest first
pub fn table_rows(days: &[DayFitnessTrend]) -> Vec<&DayFitnessTrend> {
    let mut rows: Vec<&DayFitnessTrend> = days.iter().filter(|day| !day.is_preview()).collect();
    rows.sort_by(|a, b| b.date().cmp(&a.date()));
    rows
}

/// Sort rows by a column id
///
/// The sort is stable, so rows with equal keys keep their current order.
pub fn sort_rows(
    rows: &mut [&DayFitnessTrend],
    column_id: &str,
    direction: SortDirection,
) -> Result<()> {
    let column = FitnessTrendColumn::from_id(column_id)?;

    rows.sort_by(|a, b| {
        let ordering = column.sort_key(a).compare(&column.sort_key(b));
        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });

    Ok(())
}

/// Keep rows where any column's text contains `query`, case-insensitively
pub fn filter_rows<'a>(
    rows: Vec<&'a DayFitnessTrend>,
    columns: &[FitnessTrendColumn],
    query: &str,
) -> Vec<&'a DayFitnessTrend> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return rows;
    }

    rows.into_iter()
        .filter(|day| {
            columns
                .iter()
                .any(|column| column.format(day).to_lowercase().contains(&query))
        })
        .collect()
}

/// Render rows as a text table
pub fn render_table(rows: &[&DayFitnessTrend], columns: &[FitnessTrendColumn]) -> String {
    let mut builder = Builder::default();
    builder.push_record(columns.iter().map(|column| column.header().to_string()));

    for day in rows {
        builder.push_record(columns.iter().map(|column| column.format(day)));
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}
