use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::format::floor_dp;
use crate::models::DayFitnessTrend;
use crate::table::FitnessTrendColumn;

pub mod csv;
pub mod json;

/// Export format types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn from_str(s: &str) -> Result<Self, ExportError> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

/// Export errors
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] ::csv::Error),
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Flat, spreadsheet friendly view of one trend day
///
/// Loads and scores are floored to the export precision. Absent scores
/// export as blank cells rather than zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRecord {
    pub date: NaiveDate,
    pub activities: String,
    pub types: String,
    pub ctl: Option<Decimal>,
    pub atl: Option<Decimal>,
    pub tsb: Option<Decimal>,
    pub vo2: Option<Decimal>,
    pub zone: String,
    pub heart_rate_stress_score: Option<Decimal>,
    pub training_impulse_score: Option<Decimal>,
    pub power_stress_score: Option<Decimal>,
    pub running_stress_score: Option<Decimal>,
    pub swim_stress_score: Option<Decimal>,
    pub final_stress_score: Option<Decimal>,
    pub athlete_settings: String,
    pub preview: bool,
}

impl ExportRecord {
    pub fn from_day(day: &DayFitnessTrend, precision: u32) -> Self {
        let stress = &day.stress;
        let score = |value: Option<f64>| value.and_then(|value| floor_dp(value, precision));

        ExportRecord {
            date: day.date(),
            activities: day.print_activities(""),
            types: day.print_types(""),
            ctl: floor_dp(day.ctl, precision),
            atl: floor_dp(day.atl, precision),
            tsb: floor_dp(day.tsb, precision),
            vo2: floor_dp(day.vo2, precision),
            zone: day.print_training_zone().to_string(),
            heart_rate_stress_score: score(stress.heart_rate_stress_score),
            training_impulse_score: score(stress.training_impulse_score),
            power_stress_score: score(stress.power_stress_score),
            running_stress_score: score(stress.running_stress_score),
            swim_stress_score: score(stress.swim_stress_score),
            final_stress_score: score(stress.final_stress_score),
            athlete_settings: day.print_athlete_settings().unwrap_or_default(),
            preview: day.is_preview(),
        }
    }
}

/// Record fields in output order
const RECORD_FIELDS: [&str; 16] = [
    "date",
    "activities",
    "types",
    "ctl",
    "atl",
    "tsb",
    "vo2",
    "zone",
    "heart_rate_stress_score",
    "training_impulse_score",
    "power_stress_score",
    "running_stress_score",
    "swim_stress_score",
    "final_stress_score",
    "athlete_settings",
    "preview",
];

/// Record field holding a table column
pub fn column_field(column: FitnessTrendColumn) -> &'static str {
    match column {
        FitnessTrendColumn::Date => "date",
        FitnessTrendColumn::Types => "types",
        FitnessTrendColumn::Activities => "activities",
        FitnessTrendColumn::HeartRateStressScore => "heart_rate_stress_score",
        FitnessTrendColumn::TrainingImpulseScore => "training_impulse_score",
        FitnessTrendColumn::PowerStressScore => "power_stress_score",
        FitnessTrendColumn::RunningStressScore => "running_stress_score",
        FitnessTrendColumn::SwimStressScore => "swim_stress_score",
        FitnessTrendColumn::FinalStressScore => "final_stress_score",
        FitnessTrendColumn::Ctl => "ctl",
        FitnessTrendColumn::Atl => "atl",
        FitnessTrendColumn::Vo2 => "vo2",
        FitnessTrendColumn::Tsb => "tsb",
        FitnessTrendColumn::Zone => "zone",
        FitnessTrendColumn::AthleteSettings => "athlete_settings",
    }
}

/// Exported fields for the displayed columns, in record order
///
/// `preview` is always exported so forecast rows stay distinguishable.
pub fn export_fields(columns: &[FitnessTrendColumn]) -> Vec<&'static str> {
    RECORD_FIELDS
        .iter()
        .copied()
        .filter(|field| {
            *field == "preview" || columns.iter().any(|column| column_field(*column) == *field)
        })
        .collect()
}

/// Values of `fields` for one record, in the order given
pub fn record_values(record: &ExportRecord, fields: &[&str]) -> Result<Vec<Value>, ExportError> {
    let value =
        serde_json::to_value(record).map_err(|e| ExportError::SerializationError(e.to_string()))?;
    let Value::Object(mut object) = value else {
        return Err(ExportError::SerializationError(
            "export record did not serialize to an object".to_string(),
        ));
    };

    Ok(fields
        .iter()
        .map(|field| object.remove(*field).unwrap_or(Value::Null))
        .collect())
}

/// Build export records for a run of days
pub fn export_records(days: &[DayFitnessTrend], precision: u32) -> Vec<ExportRecord> {
    days.iter()
        .map(|day| ExportRecord::from_day(day, precision))
        .collect()
}

/// `fitness_trend_<first>_<last>.<ext>` inside `directory`
pub fn default_export_path(
    directory: &Path,
    days: &[DayFitnessTrend],
    format: ExportFormat,
) -> PathBuf {
    let name = match (days.first(), days.last()) {
        (Some(first), Some(last)) => format!(
            "fitness_trend_{}_{}.{}",
            first.date().format("%Y%m%d"),
            last.date().format("%Y%m%d"),
            format.extension()
        ),
        _ => format!("fitness_trend.{}", format.extension()),
    };
    directory.join(name)
}

/// Export the displayed columns of `days` to `output_path`
pub fn export_trend<P: AsRef<Path>>(
    days: &[DayFitnessTrend],
    columns: &[FitnessTrendColumn],
    format: ExportFormat,
    precision: u32,
    output_path: P,
) -> Result<(), ExportError> {
    let records = export_records(days, precision);
    let fields = export_fields(columns);

    match format {
        ExportFormat::Csv => csv::export_records(&records, &fields, output_path),
        ExportFormat::Json => {
            let rows = records
                .iter()
                .map(|record| {
                    let values = record_values(record, &fields)?;
                    Ok(fields
                        .iter()
                        .map(|field| field.to_string())
                        .zip(values)
                        .collect::<serde_json::Map<String, Value>>())
                })
                .collect::<Result<Vec<_>, ExportError>>()?;
            json::export_json(&rows, output_path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AthleteSettings, AthleteSnapshot, DayStress};
    use crate::zones::TrainingZone;
    use rust_decimal_macros::dec;

    fn create_test_trend() -> DayFitnessTrend {
        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let mut stress = DayStress::empty(date);
        stress.activity_ids = vec!["1".to_string(), "2".to_string()];
        stress.activity_names = vec!["Tempo".to_string(), "Easy spin".to_string()];
        stress.activity_types = vec![
            crate::models::ActivityType::Run,
            crate::models::ActivityType::Ride,
        ];
        stress.heart_rate_stress_score = Some(64.129);
        stress.final_stress_score = Some(64.129);
        stress.athlete_snapshot = Some(AthleteSnapshot {
            date,
            settings: AthleteSettings::default(),
        });

        DayFitnessTrend {
            stress,
            ctl: 48.5678,
            atl: 61.0,
            tsb: -12.4322,
            vo2: 0.0,
            previous_ctl: Some(47.9),
            previous_atl: Some(60.2),
            previous_vo2: Some(0.0),
            previous_tsb: Some(-12.3),
            training_zone: TrainingZone::Optimal,
        }
    }

    #[test]
    fn test_export_format_from_str() {
        assert_eq!(ExportFormat::from_str("CSV").unwrap(), ExportFormat::Csv);
        assert_eq!(ExportFormat::from_str("json").unwrap(), ExportFormat::Json);
        assert!(matches!(
            ExportFormat::from_str("pdf"),
            Err(ExportError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_record_floors_values() {
        let record = ExportRecord::from_day(&create_test_trend(), 2);

        assert_eq!(record.ctl, Some(dec!(48.56)));
        assert_eq!(record.tsb, Some(dec!(-12.44)));
        assert_eq!(record.heart_rate_stress_score, Some(dec!(64.12)));
        assert_eq!(record.power_stress_score, None);
        assert_eq!(record.activities, "Tempo; Easy spin");
        assert_eq!(record.types, "Run; Ride");
        assert_eq!(record.zone, "Optimal");
        assert!(record.athlete_settings.starts_with("MaxHr 190bpm."));
        assert!(!record.preview);
    }

    #[test]
    fn test_export_fields_follow_columns() {
        let columns = [
            FitnessTrendColumn::Tsb,
            FitnessTrendColumn::Date,
            FitnessTrendColumn::HeartRateStressScore,
        ];
        assert_eq!(
            export_fields(&columns),
            vec!["date", "tsb", "heart_rate_stress_score", "preview"]
        );

        let all = export_fields(&FitnessTrendColumn::ALL);
        assert_eq!(all, RECORD_FIELDS.to_vec());
    }

    #[test]
    fn test_record_values() {
        let record = ExportRecord::from_day(&create_test_trend(), 1);
        let values =
            record_values(&record, &["tsb", "power_stress_score", "zone", "preview"]).unwrap();

        assert_eq!(values[0], Value::String("-12.5".to_string()));
        assert_eq!(values[1], Value::Null);
        assert_eq!(values[2], Value::String("Optimal".to_string()));
        assert_eq!(values[3], Value::Bool(false));
    }

    #[test]
    fn test_default_export_path() {
        let days = vec![create_test_trend()];
        let path = default_export_path(Path::new("out"), &days, ExportFormat::Csv);
        assert_eq!(path, Path::new("out").join("fitness_trend_20240603_20240603.csv"));

        let empty = default_export_path(Path::new("."), &[], ExportFormat::Json);
        assert_eq!(empty, Path::new(".").join("fitness_trend.json"));
    }
}
