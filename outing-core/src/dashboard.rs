//! Everything a front end needs to draw one refresh, computed up front.
//!
//! Building a [`Dashboard`] is pure: give it a forecast and the local time,
//! get back plain data. Rendering lives with the binary.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::{
    Config, ForecastError,
    activity::Activity,
    advice::{Alert, DressAdvice, alerts, dress_advice, sky_description, sky_icon},
    location::Location,
    model::{DailySun, Forecast, HourlySample, RouteSuggestion},
    route::route_suggestion,
    window::best_window_next_12h,
    wind::wind_dir_text,
};

const NEXT_HOURS: usize = 8;
const OUTLOOK_HOURS: usize = 48;
const BEST_WINDOW_LEN_HOURS: i64 = 2;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hero {
    pub temperature_c: f64,
    pub apparent_temperature_c: f64,
    pub max_24h_c: f64,
    pub min_24h_c: f64,
    pub sky: String,
    pub icon: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NowConditions {
    pub time: NaiveDateTime,
    pub wind_speed_kmh: f64,
    pub wind_gust_kmh: f64,
    pub wind_from_deg: f64,
    pub wind_dir_text: String,
    /// Needle rotation in degrees, per the configured convention.
    pub needle_deg: f64,
    pub precipitation_mm: f64,
    pub precipitation_probability_pct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HourRow {
    pub time: NaiveDateTime,
    pub icon: String,
    pub temperature_c: f64,
    pub wind_speed_kmh: f64,
    pub wind_gust_kmh: f64,
    pub wind_dir_text: String,
    pub precipitation_mm: f64,
    pub precipitation_probability_pct: f64,
}

impl From<&HourlySample> for HourRow {
    fn from(h: &HourlySample) -> Self {
        Self {
            time: h.time,
            icon: sky_icon(h.weather_code, h.is_day).to_string(),
            temperature_c: h.temperature_c,
            wind_speed_kmh: h.wind_speed_kmh,
            wind_gust_kmh: h.wind_gust_kmh,
            wind_dir_text: wind_dir_text(h.wind_from_deg),
            precipitation_mm: h.precipitation_mm,
            precipitation_probability_pct: h.precipitation_probability_pct,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BestWindowView {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub score: f64,
    pub fallback: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub location: Location,
    pub activity: Activity,
    pub local_time: NaiveDateTime,
    pub model: Option<String>,
    pub hero: Hero,
    pub now: NowConditions,
    pub sun: Option<DailySun>,
    pub dress: DressAdvice,
    pub alerts: Vec<Alert>,
    pub next_hours: Vec<HourRow>,
    pub outlook: Vec<HourRow>,
    pub best_window: Option<BestWindowView>,
    pub route: Option<RouteSuggestion>,
}

impl Dashboard {
    pub fn build(
        location: &Location,
        forecast: &Forecast,
        local_time: NaiveDateTime,
        activity: Activity,
        config: &Config,
    ) -> Result<Self, ForecastError> {
        let idx = forecast.index_at(local_time).ok_or(ForecastError::EmptyHourly)?;
        let current = &forecast.hourly[idx];
        let ahead = &forecast.hourly[idx..];

        let day = forecast.window(idx, 24);
        let max_24h_c = day.iter().map(|h| h.temperature_c).fold(f64::MIN, f64::max);
        let min_24h_c = day.iter().map(|h| h.temperature_c).fold(f64::MAX, f64::min);

        let hero = Hero {
            temperature_c: current.temperature_c,
            apparent_temperature_c: current.apparent_temperature_c,
            max_24h_c,
            min_24h_c,
            sky: sky_description(current.weather_code, current.is_day).to_string(),
            icon: sky_icon(current.weather_code, current.is_day).to_string(),
        };

        let now = NowConditions {
            time: current.time,
            wind_speed_kmh: current.wind_speed_kmh,
            wind_gust_kmh: current.wind_gust_kmh,
            wind_from_deg: current.wind_from_deg,
            wind_dir_text: wind_dir_text(current.wind_from_deg),
            needle_deg: config.needle.needle_deg(current.wind_from_deg),
            precipitation_mm: current.precipitation_mm,
            precipitation_probability_pct: current.precipitation_probability_pct,
        };

        let best_window = best_window_next_12h(&forecast.hourly, idx, &config.best_window).map(|b| {
            let start = forecast.hourly[b.index].time;
            BestWindowView {
                start,
                end: start + Duration::hours(BEST_WINDOW_LEN_HOURS),
                score: b.score,
                fallback: b.fallback,
            }
        });

        let route = route_suggestion(
            forecast.window(idx, config.ride_window_hours),
            &config.weights_for(activity),
            &config.difficulty,
        );

        Ok(Self {
            location: location.clone(),
            activity,
            local_time,
            model: forecast.model.clone(),
            hero,
            now,
            sun: forecast.sun_for(local_time.date()).cloned(),
            dress: dress_advice(current),
            alerts: alerts(ahead),
            next_hours: ahead.iter().take(NEXT_HOURS).map(HourRow::from).collect(),
            outlook: ahead.iter().take(OUTLOOK_HOURS).map(HourRow::from).collect(),
            best_window,
            route,
        })
    }
}
