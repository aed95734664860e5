use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::PreconditionError;
use crate::zones::TrainingZone;

/// Activity types known to the stress score models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ActivityType {
    Ride,
    VirtualRide,
    EBikeRide,
    Run,
    VirtualRun,
    Swim,
    Walk,
    Hike,
    Workout,
    Other,
}

impl ActivityType {
    /// Cycling activities eligible for a power stress score
    pub fn is_ride(&self) -> bool {
        matches!(
            self,
            ActivityType::Ride | ActivityType::VirtualRide | ActivityType::EBikeRide
        )
    }

    /// Running activities eligible for a running stress score
    pub fn is_run(&self) -> bool {
        matches!(self, ActivityType::Run | ActivityType::VirtualRun)
    }

    pub fn is_swim(&self) -> bool {
        matches!(self, ActivityType::Swim)
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActivityType::Ride => "Ride",
            ActivityType::VirtualRide => "VirtualRide",
            ActivityType::EBikeRide => "EBikeRide",
            ActivityType::Run => "Run",
            ActivityType::VirtualRun => "VirtualRun",
            ActivityType::Swim => "Swim",
            ActivityType::Walk => "Walk",
            ActivityType::Hike => "Hike",
            ActivityType::Workout => "Workout",
            ActivityType::Other => "Other",
        };
        write!(f, "{}", name)
    }
}

/// Heart rate summary of an activity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeartRateSummary {
    /// Average heart rate in beats per minute
    pub avg_heart_rate: f64,
}

/// Power summary of an activity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerSummary {
    /// Weighted (normalized) power in watts
    pub weighted_power: f64,

    /// False when power was estimated rather than measured
    #[serde(default = "default_true")]
    pub has_power_meter: bool,
}

fn default_true() -> bool {
    true
}

/// Logged activity as provided by the activity source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Unique identifier for the activity
    pub id: String,

    /// Display name
    pub name: String,

    /// Sport/activity type
    pub activity_type: ActivityType,

    /// Local start time; an activity without one cannot be placed on a day
    #[serde(default)]
    pub start_time: Option<NaiveDateTime>,

    /// Moving duration in seconds
    pub duration_seconds: u32,

    #[serde(default)]
    pub heart_rate: Option<HeartRateSummary>,

    #[serde(default)]
    pub power: Option<PowerSummary>,

    /// Total distance in meters (swim distance for swims)
    #[serde(default)]
    pub distance_meters: Option<f64>,

    /// Average pace in seconds per kilometer
    #[serde(default)]
    pub avg_pace_seconds_per_km: Option<f64>,

    /// VO2max estimate reported for this activity
    #[serde(default)]
    pub vo2max: Option<f64>,
}

impl Activity {
    /// Calendar day the activity is attributed to (its start day)
    pub fn start_date(&self) -> Result<NaiveDate, PreconditionError> {
        self.start_time
            .map(|start| start.date())
            .ok_or_else(|| PreconditionError::MissingStartTime {
                activity_id: self.id.clone(),
            })
    }

    /// Load an activity list from a JSON file
    pub fn load_all_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Activity>> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read activities: {}", path.as_ref().display()))?;

        serde_json::from_str(&content).with_context(|| "Failed to parse activities JSON")
    }

    /// Average pace in s/km, derived from distance when not reported
    pub fn avg_pace(&self) -> Option<f64> {
        match (self.avg_pace_seconds_per_km, self.distance_meters) {
            (Some(pace), _) if pace > 0.0 => Some(pace),
            (_, Some(distance)) if distance > 0.0 && self.duration_seconds > 0 => {
                Some(self.duration_seconds as f64 / (distance / 1000.0))
            }
            _ => None,
        }
    }
}

/// Lactate threshold heart rates by sport
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LactateThreshold {
    pub default: Option<u16>,
    pub cycling: Option<u16>,
    pub running: Option<u16>,
}

impl LactateThreshold {
    pub fn is_set(&self) -> bool {
        self.default.is_some() || self.cycling.is_some() || self.running.is_some()
    }
}

/// Athlete physiological settings used by the stress score models
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AthleteSettings {
    /// Maximum heart rate (bpm)
    pub max_hr: u16,

    /// Resting heart rate (bpm)
    pub rest_hr: u16,

    /// Lactate threshold heart rates
    #[serde(default)]
    pub lthr: LactateThreshold,

    /// Cycling functional threshold power (watts)
    #[serde(default)]
    pub cycling_ftp: Option<u16>,

    /// Running threshold pace (seconds per kilometer)
    #[serde(default)]
    pub running_ftp: Option<u16>,

    /// Swim threshold speed (meters per minute)
    #[serde(default)]
    pub swim_ftp: Option<f64>,

    /// Weight in kilograms
    pub weight: Decimal,
}

impl Default for AthleteSettings {
    fn default() -> Self {
        AthleteSettings {
            max_hr: 190,
            rest_hr: 65,
            lthr: LactateThreshold::default(),
            cycling_ftp: None,
            running_ftp: None,
            swim_ftp: None,
            weight: dec!(70),
        }
    }
}

/// Athlete settings in effect on a given day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AthleteSnapshot {
    pub date: NaiveDate,
    pub settings: AthleteSettings,
}

/// Composite stress of one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayStress {
    pub date: NaiveDate,

    /// Source activity identifiers, ordered by start time
    pub activity_ids: Vec<String>,

    /// Activity names, parallel to `activity_ids`
    pub activity_names: Vec<String>,

    /// Activity types, parallel to `activity_ids`
    pub activity_types: Vec<ActivityType>,

    pub heart_rate_stress_score: Option<f64>,
    pub training_impulse_score: Option<f64>,
    pub power_stress_score: Option<f64>,
    pub running_stress_score: Option<f64>,
    pub swim_stress_score: Option<f64>,

    /// Score driving the load recurrence for this day
    pub final_stress_score: Option<f64>,

    /// Observed VO2max sample of the day
    pub vo2max: Option<f64>,

    /// Athlete settings used to score this day's activities
    pub athlete_snapshot: Option<AthleteSnapshot>,

    /// Synthetic forecast day
    pub is_preview: bool,
}

impl DayStress {
    /// Rest day placeholder
    pub fn empty(date: NaiveDate) -> Self {
        DayStress {
            date,
            activity_ids: Vec::new(),
            activity_names: Vec::new(),
            activity_types: Vec::new(),
            heart_rate_stress_score: None,
            training_impulse_score: None,
            power_stress_score: None,
            running_stress_score: None,
            swim_stress_score: None,
            final_stress_score: None,
            vo2max: None,
            athlete_snapshot: None,
            is_preview: false,
        }
    }

    /// Forecast placeholder
    pub fn preview(date: NaiveDate) -> Self {
        DayStress {
            is_preview: true,
            ..DayStress::empty(date)
        }
    }

    pub fn has_activities(&self) -> bool {
        !self.activity_ids.is_empty()
    }

    /// Stress term of the load recurrence
    pub fn load(&self) -> f64 {
        self.final_stress_score.unwrap_or(0.0)
    }

    /// Check the shape invariants of the record
    pub fn validate(&self) -> Result<(), PreconditionError> {
        let count = self.activity_ids.len();
        if self.activity_names.len() != count || self.activity_types.len() != count {
            return Err(PreconditionError::InvalidDay {
                date: self.date,
                reason: format!(
                    "activity collections differ in length ({} ids, {} names, {} types)",
                    count,
                    self.activity_names.len(),
                    self.activity_types.len()
                ),
            });
        }

        if self.is_preview {
            let has_scores = self.heart_rate_stress_score.is_some()
                || self.training_impulse_score.is_some()
                || self.power_stress_score.is_some()
                || self.running_stress_score.is_some()
                || self.swim_stress_score.is_some()
                || self.final_stress_score.is_some()
                || self.vo2max.is_some();

            if count > 0 || has_scores {
                return Err(PreconditionError::InvalidDay {
                    date: self.date,
                    reason: "preview day carries activities or scores".to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Daily stress with the accumulated load state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayFitnessTrend {
    #[serde(flatten)]
    pub stress: DayStress,

    /// Chronic training load (fitness)
    pub ctl: f64,

    /// Acute training load (fatigue)
    pub atl: f64,

    /// Training stress balance (form): ctl - atl
    pub tsb: f64,

    /// Smoothed VO2max estimate
    pub vo2: f64,

    pub previous_ctl: Option<f64>,
    pub previous_atl: Option<f64>,
    pub previous_vo2: Option<f64>,
    pub previous_tsb: Option<f64>,

    pub training_zone: TrainingZone,
}

impl DayFitnessTrend {
    pub fn date(&self) -> NaiveDate {
        self.stress.date
    }

    pub fn is_preview(&self) -> bool {
        self.stress.is_preview
    }
}

/// Inclusive date range filter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        DateRange { start, end }
    }

    /// Check if a date falls within this range
    pub fn contains(&self, date: &NaiveDate) -> bool {
        let after_start = self.start.map_or(true, |start| date >= &start);
        let before_end = self.end.map_or(true, |end| date <= &end);
        after_start && before_end
    }
}
