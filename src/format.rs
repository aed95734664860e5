//! Display helpers for daily trend records
//!
//! Loads are shown floored, never rounded up, so a displayed fitness of
//! 42.9 really means "at least 42.9".

use chrono::{Datelike, NaiveDate};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;

use crate::models::{ActivityType, DayFitnessTrend};

/// Floor `value` to `dp` decimal places; `None` for NaN or infinite values
pub fn floor_dp(value: f64, dp: u32) -> Option<Decimal> {
    Decimal::from_f64(value).map(|value| {
        value
            .round_dp_with_strategy(dp, RoundingStrategy::ToNegativeInfinity)
            .normalize()
    })
}

fn print_floored(value: f64, dp: u32) -> String {
    floor_dp(value, dp).map_or_else(|| "-".to_string(), |value| value.to_string())
}

/// Signed difference of two values floored to one decimal place
fn print_delta(current: f64, previous: Option<f64>) -> Option<String> {
    let previous = floor_dp(previous?, 1)?;
    let delta = (floor_dp(current, 1)? - previous).normalize();

    if delta >= Decimal::ZERO {
        Some(format!("+{}", delta))
    } else {
        Some(delta.to_string())
    }
}

/// English ordinal suffix of a day of month
fn ordinal(day: u32) -> String {
    let suffix = match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", day, suffix)
}

fn plural_type(activity_type: ActivityType, count: usize) -> String {
    if count > 1 {
        format!("{} {}s", count, activity_type)
    } else {
        format!("{} {}", count, activity_type)
    }
}

impl DayFitnessTrend {
    /// Activity names joined with `"; "`
    pub fn print_activities(&self, default_empty: &str) -> String {
        if self.stress.activity_names.is_empty() {
            return default_empty.to_string();
        }
        self.stress.activity_names.join("; ")
    }

    /// Activity types joined with `"; "`
    pub fn print_types(&self, default_empty: &str) -> String {
        if self.stress.activity_types.is_empty() {
            return default_empty.to_string();
        }
        self.stress
            .activity_types
            .iter()
            .map(ActivityType::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Activity type counts, most frequent first: `"2 Runs, 1 Ride"`
    ///
    /// With `max_types`, only that many types are listed and the rest are
    /// summarized as `"& N more"`.
    pub fn print_types_count(&self, max_types: Option<usize>, default_empty: &str) -> String {
        if self.stress.activity_types.is_empty() {
            return default_empty.to_string();
        }

        // Ties keep first-seen order
        let mut counts: Vec<(ActivityType, usize)> = Vec::new();
        for activity_type in &self.stress.activity_types {
            match counts.iter_mut().find(|(seen, _)| seen == activity_type) {
                Some((_, count)) => *count += 1,
                None => counts.push((*activity_type, 1)),
            }
        }
        counts.sort_by(|a, b| b.1.cmp(&a.1));

        let shown = max_types.unwrap_or(counts.len()).max(1).min(counts.len());
        let mut text = counts[..shown]
            .iter()
            .map(|(activity_type, count)| plural_type(*activity_type, *count))
            .collect::<Vec<_>>()
            .join(", ");

        let remaining = counts.len() - shown;
        if remaining > 0 {
            text.push_str(&format!(" & {} more", remaining));
        }

        text
    }

    /// Athlete settings that produced this day's scores, inline
    pub fn print_athlete_settings(&self) -> Option<String> {
        let snapshot = self.stress.athlete_snapshot.as_ref()?;
        let settings = &snapshot.settings;
        let mut text = String::new();

        if self.stress.heart_rate_stress_score.is_some()
            || self.stress.training_impulse_score.is_some()
        {
            text.push_str(&format!("MaxHr {}bpm. ", settings.max_hr));
            text.push_str(&format!("RestHr {}bpm. ", settings.rest_hr));

            let thresholds: Vec<String> = [
                ("D", settings.lthr.default),
                ("C", settings.lthr.cycling),
                ("R", settings.lthr.running),
            ]
            .iter()
            .filter_map(|(label, lthr)| {
                lthr.filter(|lthr| *lthr > 0)
                    .map(|lthr| format!("{}:{}bpm", label, lthr))
            })
            .collect();

            if !thresholds.is_empty() {
                text.push_str(&format!("Lthr {}. ", thresholds.join(", ")));
            }
        }

        if let (Some(_), Some(ftp)) = (self.stress.power_stress_score, settings.cycling_ftp) {
            text.push_str(&format!("Cycling Ftp {}w. ", ftp));
        }

        if let (Some(_), Some(ftp)) = (self.stress.running_stress_score, settings.running_ftp) {
            text.push_str(&format!("Run Ftp {}s/km. ", ftp));
        }

        if let (Some(_), Some(ftp)) = (self.stress.swim_stress_score, settings.swim_ftp) {
            text.push_str(&format!("Swim Ftp {}m/min. ", ftp));
        }

        text.push_str(&format!("Weight {}kg.", settings.weight.normalize()));
        Some(text)
    }

    pub fn print_training_zone(&self) -> &'static str {
        self.training_zone.name()
    }

    pub fn print_fitness(&self) -> String {
        print_floored(self.ctl, 1)
    }

    pub fn print_fatigue(&self) -> String {
        print_floored(self.atl, 1)
    }

    pub fn print_form(&self) -> String {
        print_floored(self.tsb, 1)
    }

    pub fn print_vo2max(&self) -> String {
        print_floored(self.vo2, 1)
    }

    pub fn print_delta_fitness(&self) -> Option<String> {
        print_delta(self.ctl, self.previous_ctl)
    }

    pub fn print_delta_fatigue(&self) -> Option<String> {
        print_delta(self.atl, self.previous_atl)
    }

    pub fn print_delta_form(&self) -> Option<String> {
        print_delta(self.tsb, self.previous_tsb)
    }

    pub fn print_delta_vo2max(&self) -> Option<String> {
        print_delta(self.vo2, self.previous_vo2)
    }

    /// Whole-number stress score, `"-"` when absent
    pub fn print_stress_score(score: Option<f64>) -> String {
        score.map_or_else(|| "-".to_string(), |score| print_floored(score, 0))
    }

    /// `"Monday, January 1st 2024"`, prefixed with `"Today, "` on `today`
    pub fn print_date(&self, today: NaiveDate) -> String {
        let date = self.date();
        let nice_date = format!(
            "{}, {} {} {}",
            date.format("%A"),
            date.format("%B"),
            ordinal(date.day()),
            date.year()
        );

        if date == today {
            format!("Today, {}", nice_date)
        } else {
            nice_date
        }
    }

    /// `"Mo, Jan 1st 2024"`
    pub fn print_short_date(&self) -> String {
        let date = self.date();
        let weekday: String = date.format("%a").to_string().chars().take(2).collect();
        format!(
            "{}, {} {} {}",
            weekday,
            date.format("%b"),
            ordinal(date.day()),
            date.year()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AthleteSettings, AthleteSnapshot, DayStress, LactateThreshold};
    use crate::zones::TrainingZone;
    use rust_decimal_macros::dec;

    fn create_test_trend(types: &[ActivityType]) -> DayFitnessTrend {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut stress = DayStress::empty(date);
        for (index, activity_type) in types.iter().enumerate() {
            stress.activity_ids.push(index.to_string());
            stress.activity_names.push(format!("Activity {}", index));
            stress.activity_types.push(*activity_type);
        }

        DayFitnessTrend {
            stress,
            ctl: 42.96,
            atl: 50.01,
            tsb: -7.05,
            vo2: 51.349,
            previous_ctl: Some(42.51),
            previous_atl: Some(51.2),
            previous_vo2: None,
            previous_tsb: Some(-8.69),
            training_zone: TrainingZone::Neutral,
        }
    }

    #[test]
    fn test_floor_dp() {
        assert_eq!(floor_dp(2.3599, 2), Some(dec!(2.35)));
        assert_eq!(floor_dp(-10.961, 1), Some(dec!(-11)));
        assert_eq!(floor_dp(7.0, 2), Some(dec!(7)));
        assert_eq!(floor_dp(f64::NAN, 2), None);
    }

    #[test]
    fn test_print_values() {
        let day = create_test_trend(&[]);
        assert_eq!(day.print_fitness(), "42.9");
        assert_eq!(day.print_fatigue(), "50");
        assert_eq!(day.print_form(), "-7.1");
        assert_eq!(day.print_vo2max(), "51.3");
        assert_eq!(day.print_training_zone(), "Neutral");
    }

    #[test]
    fn test_print_deltas() {
        let day = create_test_trend(&[]);
        assert_eq!(day.print_delta_fitness(), Some("+0.4".to_string()));
        assert_eq!(day.print_delta_fatigue(), Some("-1.2".to_string()));
        assert_eq!(day.print_delta_form(), Some("+1.6".to_string()));
        assert_eq!(day.print_delta_vo2max(), None);
    }

    #[test]
    fn test_print_activities_and_types() {
        let empty = create_test_trend(&[]);
        assert_eq!(empty.print_activities("-"), "-");
        assert_eq!(empty.print_types(""), "");

        let day = create_test_trend(&[ActivityType::Run, ActivityType::Ride]);
        assert_eq!(day.print_activities("-"), "Activity 0; Activity 1");
        assert_eq!(day.print_types("-"), "Run; Ride");
    }

    #[test]
    fn test_print_types_count() {
        let day = create_test_trend(&[
            ActivityType::Ride,
            ActivityType::Run,
            ActivityType::Run,
            ActivityType::Swim,
        ]);

        assert_eq!(day.print_types_count(None, "-"), "2 Runs, 1 Ride, 1 Swim");
        assert_eq!(day.print_types_count(Some(1), "-"), "2 Runs & 2 more");
        assert_eq!(day.print_types_count(Some(5), "-"), "2 Runs, 1 Ride, 1 Swim");
        assert_eq!(create_test_trend(&[]).print_types_count(None, "-"), "-");
    }

    #[test]
    fn test_print_athlete_settings() {
        let mut day = create_test_trend(&[ActivityType::Run]);
        assert_eq!(day.print_athlete_settings(), None);

        day.stress.heart_rate_stress_score = Some(80.0);
        day.stress.running_stress_score = Some(95.0);
        day.stress.athlete_snapshot = Some(AthleteSnapshot {
            date: day.date(),
            settings: AthleteSettings {
                max_hr: 190,
                rest_hr: 55,
                lthr: LactateThreshold {
                    default: Some(170),
                    cycling: None,
                    running: Some(172),
                },
                cycling_ftp: Some(250),
                running_ftp: Some(290),
                swim_ftp: None,
                weight: dec!(68.5),
            },
        });

        assert_eq!(
            day.print_athlete_settings().unwrap(),
            "MaxHr 190bpm. RestHr 55bpm. Lthr D:170bpm, R:172bpm. Run Ftp 290s/km. Weight 68.5kg."
        );
    }

    #[test]
    fn test_print_dates() {
        let day = create_test_trend(&[]);
        let other_day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();

        assert_eq!(day.print_date(other_day), "Monday, January 1st 2024");
        assert_eq!(day.print_date(day.date()), "Today, Monday, January 1st 2024");
        assert_eq!(day.print_short_date(), "Mo, Jan 1st 2024");
    }

    #[test]
    fn test_ordinals() {
        assert_eq!(ordinal(2), "2nd");
        assert_eq!(ordinal(3), "3rd");
        assert_eq!(ordinal(11), "11th");
        assert_eq!(ordinal(22), "22nd");
        assert_eq!(ordinal(13), "13th");
    }

    #[test]
    fn test_print_stress_score() {
        assert_eq!(DayFitnessTrend::print_stress_score(Some(87.9)), "87");
        assert_eq!(DayFitnessTrend::print_stress_score(None), "-");
    }
}
