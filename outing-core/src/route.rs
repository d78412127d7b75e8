//! "Which way first" suggestion for out-and-back outings.
//!
//! An outing over a window of hours is modelled as two legs: the first half
//! at one heading, the second half at the reciprocal. We prefer the option
//! that puts the hard part first, so the way home is the easy part.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    activity::DifficultyWeights,
    model::{Confidence, HourlySample, RouteSuggestion, SimulatedOption},
    wind::{compass_point, normalize_bearing, reciprocal, wind_components},
};

/// Options whose improvements differ by less than this are a tie.
const TIE_EPSILON: f64 = 1e-3;
/// Lower bound for the spread used to normalize the confidence gap.
const SD_FLOOR: f64 = 0.05;
/// Below this wind speed (km/h) in every hour, direction does not matter.
const CALM_KMH: f64 = 0.5;

const INDIFFERENT_BELOW: f64 = 0.25;
const LOW_BELOW: f64 = 0.75;
const MEDIUM_BELOW: f64 = 1.5;

/// Ceilings used to normalize raw quantities into `[0, 1]` penalties.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyNorms {
    pub wind_ceiling_kmh: f64,
    pub gust_ceiling_kmh: f64,
    pub precip_ceiling_mm: f64,
    /// Apparent temperature at and above which there is no cold penalty.
    pub comfort_temp_c: f64,
    /// Degrees below `comfort_temp_c` at which the cold penalty saturates.
    pub cold_span_c: f64,
}

impl Default for DifficultyNorms {
    fn default() -> Self {
        Self {
            wind_ceiling_kmh: 40.0,
            gust_ceiling_kmh: 70.0,
            precip_ceiling_mm: 3.0,
            comfort_temp_c: 16.0,
            cold_span_c: 15.0,
        }
    }
}

/// `value / ceiling` clamped to `[0, 1]`; non-finite input counts as 0.
pub(crate) fn clamp_norm(value: f64, ceiling: f64) -> f64 {
    if !value.is_finite() || !ceiling.is_finite() || ceiling <= 0.0 {
        return 0.0;
    }
    (value / ceiling).clamp(0.0, 1.0)
}

/// Difficulty of one hour at `heading_deg`, in `[0, 1]`.
pub fn hour_difficulty(
    sample: &HourlySample,
    heading_deg: f64,
    weights: &DifficultyWeights,
    norms: &DifficultyNorms,
) -> f64 {
    let c = wind_components(sample.wind_speed_kmh, sample.wind_from_deg, heading_deg);

    let head = clamp_norm(c.headwind, norms.wind_ceiling_kmh);
    let cross = clamp_norm(c.crosswind, norms.wind_ceiling_kmh);
    let gust = clamp_norm(sample.wind_gust_kmh, norms.gust_ceiling_kmh);
    let rain = 0.6 * clamp_norm(sample.precipitation_probability_pct, 100.0)
        + 0.4 * clamp_norm(sample.precipitation_mm, norms.precip_ceiling_mm);
    let cold = clamp_norm(
        norms.comfort_temp_c - sample.apparent_temperature_c,
        norms.cold_span_c,
    );

    let total = weights.total();
    if !total.is_finite() || total <= 0.0 {
        return 0.0;
    }

    let raw = weights.headwind * head
        + weights.crosswind * cross
        + weights.gust * gust
        + weights.rain * rain
        + weights.cold * cold;

    (raw / total).clamp(0.0, 1.0)
}

fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        0.0
    } else {
        xs.iter().sum::<f64>() / xs.len() as f64
    }
}

fn variance(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    let m = mean(xs);
    xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / xs.len() as f64
}

/// Ride the first half of `hours` (rounded up) at `first_heading_deg` and the
/// rest at the reciprocal heading.
pub fn simulate_option(
    hours: &[HourlySample],
    first_heading_deg: f64,
    weights: &DifficultyWeights,
    norms: &DifficultyNorms,
) -> SimulatedOption {
    let first_heading = normalize_bearing(first_heading_deg);
    let back_heading = reciprocal(first_heading);

    let split = hours.len().div_ceil(2);
    let first: Vec<f64> = hours[..split]
        .iter()
        .map(|h| hour_difficulty(h, first_heading, weights, norms))
        .collect();

    // A one-hour outing rides both legs inside the same hour.
    let second_hours = if split == hours.len() { &hours[..split.min(1)] } else { &hours[split..] };
    let second: Vec<f64> = second_hours
        .iter()
        .map(|h| hour_difficulty(h, back_heading, weights, norms))
        .collect();

    let first_avg = mean(&first);
    let second_avg = mean(&second);
    let all: Vec<f64> = first.iter().chain(second.iter()).copied().collect();

    SimulatedOption {
        first_heading_deg: first_heading,
        first_avg,
        second_avg,
        improvement: first_avg - second_avg,
        variance: variance(&all),
        total_avg: mean(&all),
    }
}

/// Bucket the gap between the winning and losing improvements, scaled by the
/// average spread of per-hour scores.
pub fn classify_confidence(gap: f64, variance_a: f64, variance_b: f64) -> Confidence {
    if !gap.is_finite() {
        return Confidence::Indifferent;
    }

    let sd = (variance_a.max(0.0).sqrt() + variance_b.max(0.0).sqrt()) / 2.0;
    let sd = if sd.is_finite() { sd.max(SD_FLOOR) } else { SD_FLOOR };
    let z = gap.max(0.0) / sd;

    if z < INDIFFERENT_BELOW {
        Confidence::Indifferent
    } else if z < LOW_BELOW {
        Confidence::Low
    } else if z < MEDIUM_BELOW {
        Confidence::Medium
    } else {
        Confidence::High
    }
}

/// Returns `(chosen, other)`.
fn pick(a: SimulatedOption, b: SimulatedOption) -> (SimulatedOption, SimulatedOption) {
    if (a.improvement - b.improvement).abs() < TIE_EPSILON {
        if b.total_avg < a.total_avg { (b, a) } else { (a, b) }
    } else if b.improvement > a.improvement {
        (b, a)
    } else {
        (a, b)
    }
}

/// Suggest which heading to take first over `window`.
///
/// The candidates are into the current wind (heading = the bearing the
/// first hour's wind comes from) and with it. Returns `None` for an empty
/// window.
pub fn route_suggestion(
    window: &[HourlySample],
    weights: &DifficultyWeights,
    norms: &DifficultyNorms,
) -> Option<RouteSuggestion> {
    let current = window.first()?;

    if window.iter().all(HourlySample::is_thunderstorm) {
        return Some(RouteSuggestion::SafetyFirst {
            message: "Thunderstorms forecast for the whole outing. Safety first: stay in or pick another time."
                .to_string(),
        });
    }

    let into_wind = normalize_bearing(current.wind_from_deg);
    let into = simulate_option(window, into_wind, weights, norms);
    let with = simulate_option(window, reciprocal(into_wind), weights, norms);

    let (chosen, other) = pick(into, with);

    let calm = window.iter().all(|h| h.wind_speed_kmh.abs() < CALM_KMH);
    let confidence = if calm {
        Confidence::Indifferent
    } else {
        classify_confidence(chosen.improvement - other.improvement, chosen.variance, other.variance)
    };

    debug!(
        hours = window.len(),
        into_improvement = into.improvement,
        with_improvement = with.improvement,
        chosen = chosen.first_heading_deg,
        %confidence,
        "route options evaluated"
    );

    let rationale = if confidence == Confidence::Indifferent {
        "Wind makes little difference over this window; either direction works.".to_string()
    } else {
        let relation = if chosen.first_heading_deg == into_wind { "into" } else { "with" };
        format!(
            "Head {} ({:.0}°) first, {relation} the wind: outbound difficulty {:.2}, return {:.2}.",
            compass_point(chosen.first_heading_deg),
            chosen.first_heading_deg,
            chosen.first_avg,
            chosen.second_avg,
        )
    };

    Some(RouteSuggestion::Direction {
        first_heading_deg: chosen.first_heading_deg,
        second_heading_deg: reciprocal(chosen.first_heading_deg),
        confidence,
        rationale,
        chosen,
        other,
    })
}
