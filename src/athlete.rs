//! Athlete settings resolution over time
//!
//! Stress scores are computed with the settings that were in effect on the
//! day of the activity, not with the current ones. A settings history is a
//! list of settings entries each valid from a `since` date until the next
//! entry takes over.

use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::TrendError;
use crate::models::{AthleteSettings, AthleteSnapshot};

/// Point-in-time lookup of the athlete settings
pub trait AthleteSnapshotResolver: Sync {
    /// Settings in effect on `date`
    fn resolve(&self, date: NaiveDate) -> AthleteSnapshot;
}

/// Single settings set applied to every date
impl AthleteSnapshotResolver for AthleteSettings {
    fn resolve(&self, date: NaiveDate) -> AthleteSnapshot {
        AthleteSnapshot {
            date,
            settings: self.clone(),
        }
    }
}

/// Settings entry of a settings history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatedSettings {
    /// First day the settings apply; `None` means "since forever"
    #[serde(default)]
    pub since: Option<NaiveDate>,

    pub settings: AthleteSettings,
}

/// Settings history, newest entry first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<DatedSettings>", into = "Vec<DatedSettings>")]
pub struct DatedAthleteSettings {
    entries: Vec<DatedSettings>,
}

impl DatedAthleteSettings {
    /// Build a history from unordered entries
    pub fn new(mut entries: Vec<DatedSettings>) -> Result<Self, TrendError> {
        if entries.is_empty() {
            return Err(TrendError::Configuration(
                "athlete settings history is empty".to_string(),
            ));
        }

        // None sorts first, so reversing puts the "forever" entry last
        entries.sort_by(|a, b| a.since.cmp(&b.since));
        entries.reverse();

        if let Some(pair) = entries.windows(2).find(|pair| pair[0].since == pair[1].since) {
            return Err(TrendError::Configuration(format!(
                "athlete settings history has two entries for {:?}",
                pair[0].since
            )));
        }

        Ok(DatedAthleteSettings { entries })
    }

    /// Load a settings history from a JSON file
    ///
    /// Accepts either a history array or a single settings object.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(&path).with_context(|| {
            format!("Failed to read athlete settings: {}", path.as_ref().display())
        })?;

        let history_err = match serde_json::from_str::<DatedAthleteSettings>(&content) {
            Ok(history) => return Ok(history),
            Err(err) => err,
        };

        let settings: AthleteSettings = serde_json::from_str(&content).with_context(|| {
            format!(
                "Failed to parse athlete settings JSON (as history: {})",
                history_err
            )
        })?;

        Ok(DatedAthleteSettings::new(vec![DatedSettings {
            since: None,
            settings,
        }])?)
    }

    pub fn entries(&self) -> &[DatedSettings] {
        &self.entries
    }
}

impl TryFrom<Vec<DatedSettings>> for DatedAthleteSettings {
    type Error = TrendError;

    fn try_from(entries: Vec<DatedSettings>) -> Result<Self, Self::Error> {
        DatedAthleteSettings::new(entries)
    }
}

impl From<DatedAthleteSettings> for Vec<DatedSettings> {
    fn from(history: DatedAthleteSettings) -> Self {
        history.entries
    }
}

impl AthleteSnapshotResolver for DatedAthleteSettings {
    fn resolve(&self, date: NaiveDate) -> AthleteSnapshot {
        // Newest entry starting on or before the date; dates older than the
        // whole history fall back to the oldest entry.
        let settings = self
            .entries
            .iter()
            .find(|entry| entry.since.map_or(true, |since| since <= date))
            .or_else(|| self.entries.last())
            .map(|entry| entry.settings.clone())
            .unwrap_or_default();

        AthleteSnapshot { date, settings }
    }
}
