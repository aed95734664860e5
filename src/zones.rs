use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TrendError;

/// Training zone derived from the training stress balance (form)
///
/// Ordered from most overloaded to most rested, so comparing two zones tells
/// which one is "more overloaded".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TrainingZone {
    Overload,
    Optimal,
    Neutral,
    Freshness,
    Transition,
}

impl TrainingZone {
    pub const ALL: [TrainingZone; 5] = [
        TrainingZone::Overload,
        TrainingZone::Optimal,
        TrainingZone::Neutral,
        TrainingZone::Freshness,
        TrainingZone::Transition,
    ];

    /// Classify a TSB value
    ///
    /// First match wins using `<=` against each boundary; anything above the
    /// freshness boundary (NaN included) falls into `Transition`.
    pub fn from_tsb(tsb: f64, boundaries: &ZoneBoundaries) -> Self {
        if tsb <= boundaries.overload {
            TrainingZone::Overload
        } else if tsb <= boundaries.optimal {
            TrainingZone::Optimal
        } else if tsb <= boundaries.neutral {
            TrainingZone::Neutral
        } else if tsb <= boundaries.freshness {
            TrainingZone::Freshness
        } else {
            TrainingZone::Transition
        }
    }

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            TrainingZone::Overload => "Overload",
            TrainingZone::Optimal => "Optimal",
            TrainingZone::Neutral => "Neutral",
            TrainingZone::Freshness => "Freshness",
            TrainingZone::Transition => "Transition",
        }
    }

    /// Get zone description
    pub fn description(&self) -> &'static str {
        match self {
            TrainingZone::Overload => "Overload (high risk of overtraining)",
            TrainingZone::Optimal => "Optimal training load for fitness gains",
            TrainingZone::Neutral => "Neutral (maintaining fitness)",
            TrainingZone::Freshness => "Fresh and ready to race",
            TrainingZone::Transition => "Transition (losing fitness)",
        }
    }
}

impl fmt::Display for TrainingZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Upper TSB bounds (inclusive) of the first four zones
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneBoundaries {
    pub overload: f64,
    pub optimal: f64,
    pub neutral: f64,
    pub freshness: f64,
}

impl Default for ZoneBoundaries {
    fn default() -> Self {
        ZoneBoundaries {
            overload: -30.0,
            optimal: -10.0,
            neutral: 5.0,
            freshness: 25.0,
        }
    }
}

/// Horizontal reference line drawn on the form chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneBaseLine {
    pub value: f64,
    pub label: String,
}

impl ZoneBoundaries {
    /// Boundaries must be finite and strictly ascending
    pub fn validate(&self) -> Result<(), TrendError> {
        let ordered = [self.overload, self.optimal, self.neutral, self.freshness];

        if ordered.iter().any(|bound| !bound.is_finite()) {
            return Err(TrendError::Configuration(
                "training zone boundaries must be finite".to_string(),
            ));
        }

        if ordered.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(TrendError::Configuration(format!(
                "training zone boundaries must be strictly ascending: {:?}",
                ordered
            )));
        }

        Ok(())
    }

    /// Reference lines for charting, empty when zones are disabled
    pub fn base_lines(&self, training_zones_enabled: bool) -> Vec<ZoneBaseLine> {
        if !training_zones_enabled {
            return Vec::new();
        }

        vec![
            ZoneBaseLine {
                value: self.freshness,
                label: TrainingZone::Freshness.name().to_string(),
            },
            ZoneBaseLine {
                value: self.neutral,
                label: TrainingZone::Neutral.name().to_string(),
            },
            ZoneBaseLine {
                value: self.optimal,
                label: TrainingZone::Optimal.name().to_string(),
            },
            ZoneBaseLine {
                value: self.overload,
                label: TrainingZone::Overload.name().to_string(),
            },
        ]
    }
}
