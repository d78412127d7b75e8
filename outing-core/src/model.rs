use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Open-Meteo weather codes for thunderstorms (slight/moderate, with hail).
pub const THUNDERSTORM_CODES: [u8; 3] = [95, 96, 99];

/// One hour of forecast data, in local time of the forecast location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlySample {
    pub time: NaiveDateTime,
    pub temperature_c: f64,
    pub apparent_temperature_c: f64,
    pub wind_speed_kmh: f64,
    pub wind_gust_kmh: f64,
    /// Meteorological bearing the wind blows *from*, 0 = north.
    pub wind_from_deg: f64,
    pub precipitation_mm: f64,
    pub precipitation_probability_pct: f64,
    pub weather_code: u8,
    pub is_day: bool,
}

impl HourlySample {
    /// A calm, dry, 15 °C daytime sample at `time`.
    ///
    /// Meant as the base of struct-update syntax when building synthetic
    /// series, e.g. `HourlySample { wind_speed_kmh: 20.0, ..HourlySample::calm(t) }`.
    pub fn calm(time: NaiveDateTime) -> Self {
        Self {
            time,
            temperature_c: 15.0,
            apparent_temperature_c: 15.0,
            wind_speed_kmh: 0.0,
            wind_gust_kmh: 0.0,
            wind_from_deg: 0.0,
            precipitation_mm: 0.0,
            precipitation_probability_pct: 0.0,
            weather_code: 0,
            is_day: true,
        }
    }

    pub fn is_thunderstorm(&self) -> bool {
        THUNDERSTORM_CODES.contains(&self.weather_code)
    }

    pub fn hour(&self) -> u32 {
        self.time.hour()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySun {
    pub date: NaiveDate,
    pub sunrise: Option<NaiveDateTime>,
    pub sunset: Option<NaiveDateTime>,
}

/// A parsed forecast for one location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Forecast {
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
    pub utc_offset_seconds: i32,
    /// Forecast model that produced the data, `None` for the API default.
    pub model: Option<String>,
    pub hourly: Vec<HourlySample>,
    pub daily: Vec<DailySun>,
}

impl Forecast {
    /// Wall-clock time at the forecast location for the instant `utc`.
    pub fn local_time(&self, utc: DateTime<Utc>) -> NaiveDateTime {
        utc.naive_utc() + Duration::seconds(i64::from(self.utc_offset_seconds))
    }

    /// Index of the sample covering `now`: the last sample whose time is not
    /// after `now`, clamped into the series. Returns `None` on an empty series.
    pub fn index_at(&self, now: NaiveDateTime) -> Option<usize> {
        if self.hourly.is_empty() {
            return None;
        }

        let after = self.hourly.partition_point(|s| s.time <= now);
        Some(after.saturating_sub(1).min(self.hourly.len() - 1))
    }

    /// Samples in `[start, start + len)`, with `start` clamped to the last
    /// valid entry and the end clamped to the series length.
    pub fn window(&self, start: usize, len: usize) -> &[HourlySample] {
        if self.hourly.is_empty() {
            return &[];
        }

        let start = start.min(self.hourly.len() - 1);
        let end = start.saturating_add(len.max(1)).min(self.hourly.len());
        &self.hourly[start..end]
    }

    pub fn sun_for(&self, date: NaiveDate) -> Option<&DailySun> {
        self.daily.iter().find(|d| d.date == date)
    }
}

/// Result of the best-window scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BestWindow {
    /// Index into `Forecast::hourly` of the first hour of the block.
    pub index: usize,
    pub score: f64,
    /// True when no hour satisfied the daytime band and the current hour was used.
    pub fallback: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Indifferent,
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Indifferent => "indifferent",
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of riding the first half of a window at one heading and the
/// second half at its reciprocal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulatedOption {
    pub first_heading_deg: f64,
    pub first_avg: f64,
    pub second_avg: f64,
    /// `first_avg - second_avg`; positive means the hard part comes first.
    pub improvement: f64,
    pub variance: f64,
    pub total_avg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RouteSuggestion {
    SafetyFirst {
        message: String,
    },
    Direction {
        first_heading_deg: f64,
        second_heading_deg: f64,
        confidence: Confidence,
        rationale: String,
        chosen: SimulatedOption,
        other: SimulatedOption,
    },
}

impl RouteSuggestion {
    pub fn confidence(&self) -> Option<Confidence> {
        match self {
            RouteSuggestion::SafetyFirst { .. } => None,
            RouteSuggestion::Direction { confidence, .. } => Some(*confidence),
        }
    }
}
