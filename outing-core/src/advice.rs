//! Clothing suggestions, alerts and sky descriptions.

use serde::{Deserialize, Serialize};

use crate::model::HourlySample;

const RAIN_ALERT_PCT: f64 = 60.0;
const GUST_ALERT_KMH: f64 = 40.0;
/// Alerts look this many hours ahead, current hour included.
const ALERT_HOURS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DressAdvice {
    pub cycling: String,
    pub running: String,
    pub walking: String,
}

pub fn dress_advice(now: &HourlySample) -> DressAdvice {
    let temp = now.apparent_temperature_c;
    let wind = now.wind_speed_kmh;
    let rain = now.precipitation_probability_pct;

    let cycling = if temp < 10.0 {
        "Cold: long sleeves or gilet plus light gloves. A windbreaker helps."
    } else if rain > 50.0 {
        "Rain likely: packable rain jacket and mudguards."
    } else if wind > 20.0 {
        "Windy: a light windbreaker is recommended."
    } else {
        "Mild conditions."
    };

    let running = if temp < 8.0 {
        "Cold: light long sleeves and a thin windbreaker."
    } else if temp > 24.0 {
        "Warm: light kit, carry water."
    } else {
        "Comfortable conditions."
    };

    let walking = if rain > 40.0 {
        "Rain possible: light waterproof."
    } else if temp < 10.0 {
        "Chilly: a warm layer under a light jacket."
    } else {
        "A light jacket is enough."
    };

    DressAdvice {
        cycling: cycling.to_string(),
        running: running.to_string(),
        walking: walking.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Rain,
    Gusts,
    Thunderstorm,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub message: String,
}

/// Alerts for the first hours of `upcoming` (which starts at the current hour).
pub fn alerts(upcoming: &[HourlySample]) -> Vec<Alert> {
    let soon = &upcoming[..upcoming.len().min(ALERT_HOURS)];
    let mut out = Vec::new();

    if soon.iter().any(HourlySample::is_thunderstorm) {
        out.push(Alert {
            kind: AlertKind::Thunderstorm,
            message: "Thunderstorm expected in the next 2h".to_string(),
        });
    }

    if soon.iter().any(|h| h.precipitation_probability_pct > RAIN_ALERT_PCT) {
        out.push(Alert {
            kind: AlertKind::Rain,
            message: "Rain likely in the next 2h".to_string(),
        });
    }

    if let Some(max_gust) = soon
        .iter()
        .map(|h| h.wind_gust_kmh)
        .filter(|g| *g > GUST_ALERT_KMH)
        .reduce(f64::max)
    {
        out.push(Alert {
            kind: AlertKind::Gusts,
            message: format!("Strong gusts up to {} km/h in the coming hours", max_gust.round()),
        });
    }

    out
}

/// Short description of a WMO weather code as used by Open-Meteo.
pub fn sky_description(code: u8, is_day: bool) -> &'static str {
    match code {
        0 if is_day => "Clear sky",
        0 => "Clear night",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 | 48 => "Fog",
        51 | 53 | 55 => "Drizzle",
        56 | 57 => "Freezing drizzle",
        61 | 63 | 65 => "Rain",
        66 | 67 => "Freezing rain",
        71 | 73 | 75 | 77 => "Snow",
        80..=82 => "Rain showers",
        85 | 86 => "Snow showers",
        95 => "Thunderstorm",
        96 | 99 => "Thunderstorm with hail",
        _ => "Unknown",
    }
}

/// Single-glyph sky icon for tables.
pub fn sky_icon(code: u8, is_day: bool) -> &'static str {
    match code {
        0 | 1 if is_day => "☀",
        0 | 1 => "☾",
        2 => "⛅",
        3 | 45 | 48 => "☁",
        51..=67 | 80..=82 => "☂",
        71..=77 | 85 | 86 => "❄",
        95..=99 => "⚡",
        _ => "·",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample() -> HourlySample {
        HourlySample::calm(
            NaiveDate::from_ymd_opt(2025, 1, 15)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
        )
    }

    #[test]
    fn cold_morning_advice() {
        let mut h = sample();
        h.apparent_temperature_c = 5.0;
        let a = dress_advice(&h);
        assert!(a.cycling.starts_with("Cold"));
        assert!(a.running.starts_with("Cold"));
        assert!(a.walking.starts_with("Chilly"));
    }

    #[test]
    fn windy_and_wet_advice() {
        let mut h = sample();
        h.wind_speed_kmh = 25.0;
        assert!(dress_advice(&h).cycling.starts_with("Windy"));

        h.precipitation_probability_pct = 55.0;
        let a = dress_advice(&h);
        assert!(a.cycling.starts_with("Rain likely"));
        assert!(a.walking.starts_with("Rain possible"));
    }

    #[test]
    fn quiet_weather_has_no_alerts() {
        assert!(alerts(&[sample(), sample(), sample()]).is_empty());
        assert!(alerts(&[]).is_empty());
    }

    #[test]
    fn alerts_only_look_two_hours_ahead() {
        let mut later = sample();
        later.precipitation_probability_pct = 90.0;
        assert!(alerts(&[sample(), sample(), later.clone()]).is_empty());

        let found = alerts(&[sample(), later]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, AlertKind::Rain);
    }

    #[test]
    fn gust_alert_reports_the_peak() {
        let mut a = sample();
        a.wind_gust_kmh = 44.0;
        let mut b = sample();
        b.wind_gust_kmh = 52.4;
        b.weather_code = 96;
        let found = alerts(&[a, b]);
        let kinds: Vec<_> = found.iter().map(|x| x.kind).collect();
        assert_eq!(kinds, vec![AlertKind::Thunderstorm, AlertKind::Gusts]);
        assert!(found[1].message.contains("52 km/h"));
    }

    #[test]
    fn sky_codes() {
        assert_eq!(sky_description(0, true), "Clear sky");
        assert_eq!(sky_description(0, false), "Clear night");
        assert_eq!(sky_description(81, true), "Rain showers");
        assert_eq!(sky_description(99, true), "Thunderstorm with hail");
        assert_eq!(sky_description(42, true), "Unknown");
        assert_eq!(sky_icon(95, false), "⚡");
    }
}
