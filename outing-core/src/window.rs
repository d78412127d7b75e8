use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    model::{BestWindow, HourlySample},
    route::clamp_norm,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BestWindowParams {
    /// How many start hours from now are considered.
    pub lookahead_hours: usize,
    /// Earliest local start hour (inclusive).
    pub day_start_hour: u32,
    /// Latest local start hour (inclusive).
    pub day_end_hour: u32,
    pub precip_ceiling_mm: f64,
    pub gust_ceiling_kmh: f64,
}

impl Default for BestWindowParams {
    fn default() -> Self {
        Self {
            lookahead_hours: 12,
            day_start_hour: 7,
            day_end_hour: 20,
            precip_ceiling_mm: 3.0,
            gust_ceiling_kmh: 60.0,
        }
    }
}

/// Comfort of a single hour in `[0, 1]`; higher is better.
pub fn comfort_score(sample: &HourlySample, params: &BestWindowParams) -> f64 {
    let pop = clamp_norm(sample.precipitation_probability_pct, 100.0);
    let precip = clamp_norm(sample.precipitation_mm, params.precip_ceiling_mm);
    let gust = clamp_norm(sample.wind_gust_kmh, params.gust_ceiling_kmh);

    (1.0 - (0.65 * pop + 0.35 * precip)) * 0.65 + (1.0 - gust) * 0.35
}

fn pair_score(hourly: &[HourlySample], i: usize, params: &BestWindowParams) -> f64 {
    match hourly.get(i + 1) {
        Some(next) => (comfort_score(&hourly[i], params) + comfort_score(next, params)) / 2.0,
        None => comfort_score(&hourly[i], params),
    }
}

/// Best two-hour block starting within the next `lookahead_hours` of `now`,
/// restricted to daytime start hours.
///
/// `now` is clamped into the series. When no start hour qualifies the block
/// starting at `now` is returned with `fallback` set. `None` only for an
/// empty series.
pub fn best_window_next_12h(
    hourly: &[HourlySample],
    now: usize,
    params: &BestWindowParams,
) -> Option<BestWindow> {
    if hourly.is_empty() {
        return None;
    }

    let now = now.min(hourly.len() - 1);
    let end = now.saturating_add(params.lookahead_hours).min(hourly.len());
    let daytime = params.day_start_hour..=params.day_end_hour;

    let mut best: Option<BestWindow> = None;
    for i in now..end {
        if i + 1 >= hourly.len() || !daytime.contains(&hourly[i].hour()) {
            continue;
        }

        let score = pair_score(hourly, i, params);
        if best.is_none_or(|b| score > b.score) {
            best = Some(BestWindow {
                index: i,
                score,
                fallback: false,
            });
        }
    }

    let best = best.unwrap_or_else(|| {
        debug!(now, "no daytime start hour in lookahead, falling back to current hour");
        BestWindow {
            index: now,
            score: pair_score(hourly, now, params),
            fallback: true,
        }
    });

    Some(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn midnight() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 10, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    /// 48 hours of wet, gusty weather except for the listed clean hours of day one.
    fn series(clean: &[usize]) -> Vec<HourlySample> {
        (0..48)
            .map(|h| {
                let mut s = HourlySample::calm(midnight() + Duration::hours(h as i64));
                if !clean.contains(&h) {
                    s.precipitation_probability_pct = 90.0;
                    s.precipitation_mm = 2.5;
                    s.wind_gust_kmh = 55.0;
                }
                s
            })
            .collect()
    }

    fn params() -> BestWindowParams {
        BestWindowParams::default()
    }

    #[test]
    fn picks_the_only_clean_hour() {
        let k = 11;
        let hourly = series(&[k]);
        let best = best_window_next_12h(&hourly, 6, &params()).unwrap();
        assert!(best.index == k || best.index == k - 1, "{best:?}");
        assert!(!best.fallback);
    }

    #[test]
    fn prefers_lower_rain_and_gust() {
        let mut hourly = series(&[9, 10, 13, 14]);
        hourly[13].wind_gust_kmh = 30.0;
        let best = best_window_next_12h(&hourly, 8, &params()).unwrap();
        assert_eq!(best.index, 9);

        let calm = comfort_score(&hourly[9], &params());
        let gusty = comfort_score(&hourly[13], &params());
        assert!(calm > gusty);
    }

    #[test]
    fn score_is_monotonic_in_rain_and_gust() {
        let mut s = HourlySample::calm(midnight());
        let mut last = comfort_score(&s, &params());
        for step in 1..=20 {
            s.precipitation_probability_pct = step as f64 * 5.0;
            s.precipitation_mm = step as f64 * 0.2;
            s.wind_gust_kmh = step as f64 * 4.0;
            let now = comfort_score(&s, &params());
            assert!(now <= last);
            last = now;
        }
        assert!(last.abs() < 1e-9);
    }

    #[test]
    fn seven_oclock_start_is_allowed_six_is_not() {
        let hourly = series(&[6, 7, 8]);
        let best = best_window_next_12h(&hourly, 4, &params()).unwrap();
        assert_eq!(best.index, 7);
    }

    #[test]
    fn twenty_oclock_start_is_allowed_twenty_one_is_not() {
        let hourly = series(&[20, 21, 22]);
        let best = best_window_next_12h(&hourly, 14, &params()).unwrap();
        assert_eq!(best.index, 20);

        let hourly = series(&[21, 22]);
        let best = best_window_next_12h(&hourly, 14, &params()).unwrap();
        assert_eq!(best.index, 20, "only 20:00 can reach the clean 21:00 hour");
    }

    #[test]
    fn night_falls_back_to_now() {
        let hourly = series(&[]);
        let p = BestWindowParams {
            lookahead_hours: 4,
            ..params()
        };
        let best = best_window_next_12h(&hourly, 21, &p).unwrap();
        assert!(best.fallback);
        assert_eq!(best.index, 21);
    }

    #[test]
    fn now_past_the_end_is_clamped() {
        let hourly = series(&[]);
        let best = best_window_next_12h(&hourly, 500, &params()).unwrap();
        assert_eq!(best.index, hourly.len() - 1);
        assert!(best.fallback);
        assert!(best_window_next_12h(&[], 0, &params()).is_none());
    }
}
