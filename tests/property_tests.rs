use chrono::{Duration, NaiveDate};
use fitness_trend::{
    DayStress, ForecastExtender, LoadAccumulator, LoadConfig, TrainingZone, ZoneBoundaries,
};
use proptest::prelude::*;

/// Property tests for the load recurrence, zones and forecast

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()
}

fn days_from_scores(scores: &[Option<f64>]) -> Vec<DayStress> {
    scores
        .iter()
        .enumerate()
        .map(|(offset, score)| {
            let mut day = DayStress::empty(start() + Duration::days(offset as i64));
            day.final_stress_score = *score;
            day
        })
        .collect()
}

fn accumulator() -> LoadAccumulator {
    LoadAccumulator::new(&LoadConfig::default(), ZoneBoundaries::default())
}

fn scores_strategy() -> impl Strategy<Value = Vec<Option<f64>>> {
    prop::collection::vec(prop::option::of(0.0f64..400.0), 1..120)
}

proptest! {
    #[test]
    fn tsb_is_fitness_minus_fatigue(scores in scores_strategy()) {
        let trend = accumulator().accumulate(days_from_scores(&scores)).unwrap();

        prop_assert_eq!(trend.len(), scores.len());
        for day in &trend {
            prop_assert_eq!(day.tsb, day.ctl - day.atl);
            prop_assert!(day.ctl >= 0.0 && day.atl >= 0.0);
        }
    }

    #[test]
    fn accumulation_is_deterministic(scores in scores_strategy()) {
        let first = accumulator().accumulate(days_from_scores(&scores)).unwrap();
        let second = accumulator().accumulate(days_from_scores(&scores)).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn loads_stay_below_the_highest_score(scores in scores_strategy()) {
        let highest = scores.iter().flatten().fold(0.0f64, |a, b| a.max(*b));
        let trend = accumulator().accumulate(days_from_scores(&scores)).unwrap();

        for day in &trend {
            prop_assert!(day.ctl <= highest + 1e-9);
            prop_assert!(day.atl <= highest + 1e-9);
        }
    }

    #[test]
    fn rest_decays_toward_zero(seed_scores in scores_strategy(), rest in 30usize..200) {
        let mut scores = seed_scores.clone();
        scores.extend(std::iter::repeat(None).take(rest));
        let trend = accumulator().accumulate(days_from_scores(&scores)).unwrap();

        let rest_days = &trend[seed_scores.len()..];
        for pair in rest_days.windows(2) {
            prop_assert!(pair[1].ctl <= pair[0].ctl);
            prop_assert!(pair[1].atl <= pair[0].atl);
        }
    }

    #[test]
    fn zones_are_total_and_monotonic(a in -200.0f64..200.0, b in -200.0f64..200.0) {
        let boundaries = ZoneBoundaries::default();
        let (low, high) = if a <= b { (a, b) } else { (b, a) };

        let low_zone = TrainingZone::from_tsb(low, &boundaries);
        let high_zone = TrainingZone::from_tsb(high, &boundaries);
        prop_assert!(TrainingZone::ALL.contains(&low_zone));
        prop_assert!(low_zone <= high_zone);
    }

    #[test]
    fn forecast_keeps_history_unchanged(scores in scores_strategy(), horizon in 0u32..60) {
        let accumulator = accumulator();
        let history = accumulator.accumulate(days_from_scores(&scores)).unwrap();
        let extended = ForecastExtender::new(&accumulator).extend(&history, horizon).unwrap();

        prop_assert_eq!(extended.len(), history.len() + horizon as usize);
        prop_assert_eq!(&extended[..history.len()], &history[..]);
        prop_assert!(extended[history.len()..].iter().all(|day| day.is_preview()));
    }

    #[test]
    fn forecast_is_prefix_stable(scores in scores_strategy(), short in 0u32..30, extra in 0u32..30) {
        let accumulator = accumulator();
        let history = accumulator.accumulate(days_from_scores(&scores)).unwrap();
        let extender = ForecastExtender::new(&accumulator);

        let near = extender.forecast(&history, short).unwrap();
        let far = extender.forecast(&history, short + extra).unwrap();
        prop_assert_eq!(&far[..near.len()], &near[..]);
    }
}

#[test]
fn zero_stress_from_zero_stays_zero() {
    let trend = accumulator()
        .accumulate(days_from_scores(&vec![None; 365]))
        .unwrap();

    assert!(trend
        .iter()
        .all(|day| day.ctl == 0.0 && day.atl == 0.0 && day.tsb == 0.0 && day.vo2 == 0.0));
}

#[test]
fn constant_load_converges_to_the_load() {
    let trend = accumulator()
        .accumulate(days_from_scores(&vec![Some(80.0); 1000]))
        .unwrap();
    let last = trend.last().unwrap();

    assert!((last.ctl - 80.0).abs() < 0.01);
    assert!((last.atl - 80.0).abs() < 1e-6);
    assert!(last.tsb.abs() < 0.01);
}
