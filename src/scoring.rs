use serde::{Deserialize, Serialize};

use crate::models::{Activity, ActivityType, AthleteSettings};
use crate::stress::{HeartRateImpulseMode, StressConfig};

/// Karvonen fraction used when no lactate threshold heart rate is set
const ESTIMATED_LTHR_RESERVE_FRACTION: f64 = 0.85;

/// Per-modality stress scores of a single activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityStressScores {
    pub heart_rate_stress_score: Option<f64>,
    pub training_impulse_score: Option<f64>,
    pub power_stress_score: Option<f64>,
    pub running_stress_score: Option<f64>,
    pub swim_stress_score: Option<f64>,
}

impl ActivityStressScores {
    pub fn is_empty(&self) -> bool {
        self.heart_rate_stress_score.is_none()
            && self.training_impulse_score.is_none()
            && self.power_stress_score.is_none()
            && self.running_stress_score.is_none()
            && self.swim_stress_score.is_none()
    }
}

/// Stress score models
pub struct StressScoreCalculator;

impl StressScoreCalculator {
    /// Score an activity with the settings in effect on its date
    ///
    /// Only the heart-rate model selected by the impulse mode is computed.
    /// Models whose inputs or thresholds are missing leave their score absent.
    pub fn score(
        activity: &Activity,
        settings: &AthleteSettings,
        config: &StressConfig,
    ) -> ActivityStressScores {
        let (heart_rate_stress_score, training_impulse_score) = match config.heart_rate_impulse_mode
        {
            HeartRateImpulseMode::Hrss => (Self::heart_rate_stress_score(activity, settings), None),
            HeartRateImpulseMode::Trimp => (None, Self::training_impulse(activity, settings)),
        };

        let power_stress_score = if config.power_meter_enabled {
            Self::power_stress_score(activity, settings, config.allow_estimated_power_stress_score)
        } else {
            None
        };

        let running_stress_score = if config.allow_estimated_running_stress_score {
            Self::running_stress_score(activity, settings)
        } else {
            None
        };

        let swim_stress_score = if config.swim_enabled {
            Self::swim_stress_score(activity, settings)
        } else {
            None
        };

        ActivityStressScores {
            heart_rate_stress_score,
            training_impulse_score,
            power_stress_score,
            running_stress_score,
            swim_stress_score,
        }
    }

    /// Heart rate reserve fraction, clamped to [0, 1]
    fn heart_rate_reserve(heart_rate: f64, settings: &AthleteSettings) -> Option<f64> {
        let max_hr = f64::from(settings.max_hr);
        let rest_hr = f64::from(settings.rest_hr);

        if max_hr <= rest_hr || !heart_rate.is_finite() {
            return None;
        }

        Some(((heart_rate - rest_hr) / (max_hr - rest_hr)).clamp(0.0, 1.0))
    }

    /// Banister impulse for `minutes` spent at a heart rate reserve fraction
    fn banister_impulse(minutes: f64, reserve: f64) -> f64 {
        minutes * reserve * 0.64 * (1.92 * reserve).exp()
    }

    /// Banister training impulse (TRIMP)
    /// TRIMP = minutes × HRR × 0.64 × e^(1.92 × HRR)
    pub fn training_impulse(activity: &Activity, settings: &AthleteSettings) -> Option<f64> {
        let heart_rate = activity.heart_rate?;
        let reserve = Self::heart_rate_reserve(heart_rate.avg_heart_rate, settings)?;
        let minutes = f64::from(activity.duration_seconds) / 60.0;

        Some(Self::banister_impulse(minutes, reserve))
    }

    /// Lactate threshold heart rate applicable to an activity type
    pub fn lactate_threshold(activity_type: ActivityType, settings: &AthleteSettings) -> f64 {
        let by_sport = if activity_type.is_ride() {
            settings.lthr.cycling
        } else if activity_type.is_run() {
            settings.lthr.running
        } else {
            None
        };

        by_sport
            .or(settings.lthr.default)
            .map(f64::from)
            .unwrap_or_else(|| {
                let rest_hr = f64::from(settings.rest_hr);
                rest_hr + ESTIMATED_LTHR_RESERVE_FRACTION * (f64::from(settings.max_hr) - rest_hr)
            })
    }

    /// Heart rate stress score (HRSS)
    /// HRSS = TRIMP / TRIMP(1 hour at LTHR) × 100
    pub fn heart_rate_stress_score(activity: &Activity, settings: &AthleteSettings) -> Option<f64> {
        let trimp = Self::training_impulse(activity, settings)?;
        let lthr = Self::lactate_threshold(activity.activity_type, settings);
        let lthr_reserve = Self::heart_rate_reserve(lthr, settings)?;
        let lthr_hour_impulse = Self::banister_impulse(60.0, lthr_reserve);

        if lthr_hour_impulse <= 0.0 {
            return None;
        }

        Some(trimp / lthr_hour_impulse * 100.0)
    }

    /// Power stress score (PSS) for rides
    /// PSS = duration_hours × IF² × 100, IF = weighted_power / FTP
    pub fn power_stress_score(
        activity: &Activity,
        settings: &AthleteSettings,
        allow_estimated: bool,
    ) -> Option<f64> {
        if !activity.activity_type.is_ride() {
            return None;
        }

        let power = activity.power?;
        if !power.has_power_meter && !allow_estimated {
            return None;
        }

        let ftp = f64::from(settings.cycling_ftp.filter(|ftp| *ftp > 0)?);
        let intensity_factor = power.weighted_power / ftp;
        let duration_hours = f64::from(activity.duration_seconds) / 3600.0;

        Some(duration_hours * intensity_factor * intensity_factor * 100.0)
    }

    /// Running stress score (RSS)
    /// RSS = duration_hours × (threshold_pace / avg_pace)² × 100
    pub fn running_stress_score(activity: &Activity, settings: &AthleteSettings) -> Option<f64> {
        if !activity.activity_type.is_run() {
            return None;
        }

        let threshold_pace = f64::from(settings.running_ftp.filter(|pace| *pace > 0)?);
        let avg_pace = activity.avg_pace()?;

        // Faster pace (fewer seconds per km) means higher intensity
        let intensity_factor = threshold_pace / avg_pace;
        let duration_hours = f64::from(activity.duration_seconds) / 3600.0;

        Some(duration_hours * intensity_factor * intensity_factor * 100.0)
    }

    /// Swim stress score (SwimSS)
    /// SwimSS = duration_hours × IF³ × 100, IF = speed (m/min) / threshold swim speed
    pub fn swim_stress_score(activity: &Activity, settings: &AthleteSettings) -> Option<f64> {
        if !activity.activity_type.is_swim() || activity.duration_seconds == 0 {
            return None;
        }

        let threshold_speed = settings.swim_ftp.filter(|speed| *speed > 0.0)?;
        let distance = activity.distance_meters.filter(|distance| *distance > 0.0)?;

        let minutes = f64::from(activity.duration_seconds) / 60.0;
        let intensity_factor = (distance / minutes) / threshold_speed;
        let duration_hours = minutes / 60.0;

        Some(duration_hours * intensity_factor.powi(3) * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HeartRateSummary, LactateThreshold, PowerSummary};
    use chrono::NaiveDate;

    fn create_test_settings() -> AthleteSettings {
        AthleteSettings {
            max_hr: 190,
            rest_hr: 60,
            lthr: LactateThreshold {
                default: Some(170),
                cycling: Some(165),
                running: None,
            },
            cycling_ftp: Some(250),
            running_ftp: Some(300),
            swim_ftp: Some(50.0),
            ..AthleteSettings::default()
        }
    }

    fn create_test_activity(activity_type: ActivityType, duration_seconds: u32) -> Activity {
        Activity {
            id: "activity".to_string(),
            name: "Test".to_string(),
            activity_type,
            start_time: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(8, 0, 0),
            duration_seconds,
            heart_rate: None,
            power: None,
            distance_meters: None,
            avg_pace_seconds_per_km: None,
            vo2max: None,
        }
    }

    #[test]
    fn test_power_stress_score_at_threshold() {
        let mut ride = create_test_activity(ActivityType::Ride, 3600);
        ride.power = Some(PowerSummary {
            weighted_power: 250.0,
            has_power_meter: true,
        });

        let pss = StressScoreCalculator::power_stress_score(&ride, &create_test_settings(), false);
        assert!((pss.unwrap() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_estimated_power_requires_permission() {
        let mut ride = create_test_activity(ActivityType::VirtualRide, 3600);
        ride.power = Some(PowerSummary {
            weighted_power: 200.0,
            has_power_meter: false,
        });
        let settings = create_test_settings();

        assert!(StressScoreCalculator::power_stress_score(&ride, &settings, false).is_none());
        let pss = StressScoreCalculator::power_stress_score(&ride, &settings, true).unwrap();
        assert!((pss - 64.0).abs() < 1e-9);
    }

    #[test]
    fn test_power_score_requires_ftp_and_ride() {
        let mut ride = create_test_activity(ActivityType::Ride, 3600);
        ride.power = Some(PowerSummary {
            weighted_power: 200.0,
            has_power_meter: true,
        });
        let no_ftp = AthleteSettings {
            cycling_ftp: None,
            ..create_test_settings()
        };
        assert!(StressScoreCalculator::power_stress_score(&ride, &no_ftp, true).is_none());

        let mut run = create_test_activity(ActivityType::Run, 3600);
        run.power = ride.power;
        assert!(
            StressScoreCalculator::power_stress_score(&run, &create_test_settings(), true).is_none()
        );
    }

    #[test]
    fn test_running_stress_score() {
        let mut run = create_test_activity(ActivityType::Run, 3000);
        run.distance_meters = Some(10000.0);

        // 5:00 min/km at a 5:00 min/km threshold for 50 minutes
        let rss = StressScoreCalculator::running_stress_score(&run, &create_test_settings()).unwrap();
        assert!((rss - 3000.0 / 3600.0 * 100.0).abs() < 1e-9);

        run.avg_pace_seconds_per_km = Some(250.0);
        let faster = StressScoreCalculator::running_stress_score(&run, &create_test_settings()).unwrap();
        assert!(faster > rss);
    }

    #[test]
    fn test_swim_stress_score() {
        let mut swim = create_test_activity(ActivityType::Swim, 3600);
        swim.distance_meters = Some(3000.0);

        // 50 m/min against a 50 m/min threshold for one hour
        let swim_ss = StressScoreCalculator::swim_stress_score(&swim, &create_test_settings()).unwrap();
        assert!((swim_ss - 100.0).abs() < 1e-9);

        swim.distance_meters = Some(0.0);
        assert!(StressScoreCalculator::swim_stress_score(&swim, &create_test_settings()).is_none());
    }

    #[test]
    fn test_training_impulse() {
        let mut ride = create_test_activity(ActivityType::Ride, 3600);
        ride.heart_rate = Some(HeartRateSummary {
            avg_heart_rate: 125.0,
        });

        let trimp = StressScoreCalculator::training_impulse(&ride, &create_test_settings()).unwrap();
        let expected = 60.0 * 0.5 * 0.64 * (1.92f64 * 0.5).exp();
        assert!((trimp - expected).abs() < 1e-9);
    }

    #[test]
    fn test_hrss_at_lthr_is_hundred_per_hour() {
        let mut ride = create_test_activity(ActivityType::Ride, 3600);
        ride.heart_rate = Some(HeartRateSummary {
            avg_heart_rate: 165.0,
        });

        let hrss =
            StressScoreCalculator::heart_rate_stress_score(&ride, &create_test_settings()).unwrap();
        assert!((hrss - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_lactate_threshold_fallbacks() {
        let settings = create_test_settings();
        assert_eq!(StressScoreCalculator::lactate_threshold(ActivityType::Ride, &settings), 165.0);
        assert_eq!(StressScoreCalculator::lactate_threshold(ActivityType::Run, &settings), 170.0);

        let no_lthr = AthleteSettings {
            lthr: LactateThreshold::default(),
            ..settings
        };
        let estimated = StressScoreCalculator::lactate_threshold(ActivityType::Swim, &no_lthr);
        assert!((estimated - (60.0 + 0.85 * 130.0)).abs() < 1e-9);
    }

    #[test]
    fn test_heart_rate_mode_is_exclusive() {
        let mut ride = create_test_activity(ActivityType::Ride, 3600);
        ride.heart_rate = Some(HeartRateSummary {
            avg_heart_rate: 150.0,
        });
        let settings = create_test_settings();

        let hrss_mode = StressConfig::default();
        let scores = StressScoreCalculator::score(&ride, &settings, &hrss_mode);
        assert!(scores.heart_rate_stress_score.is_some());
        assert!(scores.training_impulse_score.is_none());

        let trimp_mode = StressConfig {
            heart_rate_impulse_mode: HeartRateImpulseMode::Trimp,
            ..StressConfig::default()
        };
        let scores = StressScoreCalculator::score(&ride, &settings, &trimp_mode);
        assert!(scores.heart_rate_stress_score.is_none());
        assert!(scores.training_impulse_score.is_some());
    }

    #[test]
    fn test_disabled_modalities() {
        let mut swim = create_test_activity(ActivityType::Swim, 3600);
        swim.distance_meters = Some(2500.0);

        let config = StressConfig {
            swim_enabled: false,
            ..StressConfig::default()
        };
        let scores = StressScoreCalculator::score(&swim, &create_test_settings(), &config);
        assert!(scores.is_empty());
    }

    #[test]
    fn test_invalid_heart_rate_settings() {
        let mut ride = create_test_activity(ActivityType::Ride, 3600);
        ride.heart_rate = Some(HeartRateSummary {
            avg_heart_rate: 150.0,
        });
        let broken = AthleteSettings {
            max_hr: 60,
            rest_hr: 60,
            ..create_test_settings()
        };
        assert!(StressScoreCalculator::training_impulse(&ride, &broken).is_none());
    }
}
