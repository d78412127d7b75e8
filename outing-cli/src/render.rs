//! Plain-text rendering of a [`Dashboard`].

use std::{fmt::Write, time::Duration};

use outing_core::{
    Config, Confidence, Dashboard, RouteSuggestion,
    dashboard::HourRow,
    wind::{arrow, compass_point},
};

fn kmh(v: f64) -> String {
    format!("{} km/h", v.round())
}

fn mm(v: f64) -> String {
    format!("{v:.1} mm")
}

fn pct(v: f64) -> String {
    format!("{}%", v.round())
}

fn deg(v: f64) -> String {
    format!("{}°", v.round())
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n── {title} ──");
}

fn hour_table(out: &mut String, rows: &[HourRow], label: impl Fn(&HourRow) -> String) {
    let _ = writeln!(
        out,
        "{:<10} {:<2} {:>5} {:>9} {:>9} {:<10} {:>7} {:>5}",
        "Time", "", "Temp", "Wind", "Gust", "Dir", "Rain", "Prob"
    );
    for r in rows {
        let _ = writeln!(
            out,
            "{:<10} {:<2} {:>5} {:>9} {:>9} {:<10} {:>7} {:>5}",
            label(r),
            r.icon,
            deg(r.temperature_c),
            kmh(r.wind_speed_kmh),
            kmh(r.wind_gust_kmh),
            r.wind_dir_text,
            mm(r.precipitation_mm),
            pct(r.precipitation_probability_pct),
        );
    }
}

fn route(out: &mut String, suggestion: &RouteSuggestion) {
    match suggestion {
        RouteSuggestion::SafetyFirst { message } => {
            let _ = writeln!(out, "⚠ {message}");
        }
        RouteSuggestion::Direction {
            first_heading_deg,
            second_heading_deg,
            confidence,
            rationale,
            ..
        } => {
            if *confidence == Confidence::Indifferent {
                let _ = writeln!(out, "{rationale}");
            } else {
                let _ = writeln!(
                    out,
                    "Out {} {} · back {} {} · confidence: {confidence}",
                    arrow(*first_heading_deg),
                    compass_point(*first_heading_deg),
                    arrow(*second_heading_deg),
                    compass_point(*second_heading_deg),
                );
                let _ = writeln!(out, "{rationale}");
            }
        }
    }
}

pub fn dashboard(d: &Dashboard, with_outlook: bool) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{} · {} · {}",
        d.location.name,
        d.activity,
        d.local_time.format("%Y-%m-%d %H:%M")
    );
    let _ = writeln!(
        out,
        "{} {} · {} (feels {}) · max {} · min {}",
        d.hero.icon,
        d.hero.sky,
        deg(d.hero.temperature_c),
        deg(d.hero.apparent_temperature_c),
        deg(d.hero.max_24h_c),
        deg(d.hero.min_24h_c),
    );
    if let Some(sun) = &d.sun {
        let fmt = |t: Option<chrono::NaiveDateTime>| {
            t.map(|t| t.format("%H:%M").to_string()).unwrap_or_else(|| "—".to_string())
        };
        let _ = writeln!(out, "Sunrise {} · sunset {}", fmt(sun.sunrise), fmt(sun.sunset));
    }

    section(&mut out, "Now");
    let _ = writeln!(
        out,
        "Wind {} {} (gusts {}) from {}",
        arrow(d.now.needle_deg),
        kmh(d.now.wind_speed_kmh),
        kmh(d.now.wind_gust_kmh),
        d.now.wind_dir_text,
    );
    let _ = writeln!(
        out,
        "Rain {} · probability {}",
        mm(d.now.precipitation_mm),
        pct(d.now.precipitation_probability_pct),
    );

    section(&mut out, "What to wear");
    let _ = writeln!(out, "Cycling: {}", d.dress.cycling);
    let _ = writeln!(out, "Running: {}", d.dress.running);
    let _ = writeln!(out, "Walking: {}", d.dress.walking);

    section(&mut out, "Alerts");
    if d.alerts.is_empty() {
        let _ = writeln!(out, "No relevant alerts");
    }
    for a in &d.alerts {
        let _ = writeln!(out, "• {}", a.message);
    }

    section(&mut out, "Best window");
    match &d.best_window {
        Some(bw) if bw.fallback => {
            let _ = writeln!(
                out,
                "No daytime slot ahead; from {} conditions score {:.0}/100.",
                bw.start.format("%H:%M"),
                bw.score * 100.0
            );
        }
        Some(bw) => {
            let _ = writeln!(
                out,
                "{}–{} · least rain and gusts (score {:.0}/100)",
                bw.start.format("%H:%M"),
                bw.end.format("%H:%M"),
                bw.score * 100.0
            );
        }
        None => {
            let _ = writeln!(out, "—");
        }
    }

    section(&mut out, "Which way first");
    match &d.route {
        Some(s) => route(&mut out, s),
        None => {
            let _ = writeln!(out, "—");
        }
    }

    section(&mut out, "Next 8 hours");
    hour_table(&mut out, &d.next_hours, |r| r.time.format("%H:%M").to_string());

    if with_outlook {
        section(&mut out, "48-hour outlook");
        hour_table(&mut out, &d.outlook, |r| r.time.format("%a %H:%M").to_string());
    }

    let source = match &d.model {
        Some(model) => format!("Open-Meteo.com ({model})"),
        None => "Open-Meteo.com".to_string(),
    };
    let _ = writeln!(out, "\nData: {source}");

    out
}

pub fn locations(config: &Config) -> String {
    let mut out = String::new();
    for l in &config.locations {
        let marker = if config.default_location.as_deref() == Some(l.id.as_str()) { "*" } else { " " };
        let _ = writeln!(
            out,
            "{marker} {:<12} {:<24} {:>9.4} {:>9.4}",
            l.id, l.name, l.latitude, l.longitude
        );
    }
    out
}

/// Status line shown when a refresh fails and the previous output stays up.
pub fn stale_notice(err: &anyhow::Error, retry_in: Duration) -> String {
    format!(
        "⚠ Could not refresh: {err:#}. Showing last data; retrying in {}s.",
        retry_in.as_secs()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, NaiveDate};
    use outing_core::{Activity, Forecast, HourlySample};

    fn dashboard_for(code: u8) -> Dashboard {
        let start = NaiveDate::from_ymd_opt(2025, 7, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let hourly = (0..48)
            .map(|h| HourlySample {
                wind_speed_kmh: 18.0,
                wind_gust_kmh: 45.0,
                wind_from_deg: 90.0,
                weather_code: code,
                ..HourlySample::calm(start + ChronoDuration::hours(h))
            })
            .collect();
        let forecast = Forecast {
            latitude: 38.7,
            longitude: -9.4,
            timezone: "Europe/Lisbon".into(),
            utc_offset_seconds: 3600,
            model: Some("knmi_harmonie_arome_europe".into()),
            hourly,
            daily: Vec::new(),
        };
        let cfg = Config::default();
        let loc = cfg.location("estoril").unwrap().clone();
        Dashboard::build(&loc, &forecast, start + ChronoDuration::hours(9), Activity::Cycling, &cfg)
            .unwrap()
    }

    #[test]
    fn renders_all_sections() {
        let text = dashboard(&dashboard_for(2), false);
        for needle in [
            "Estoril · cycling",
            "── Now ──",
            "── Best window ──",
            "── Which way first ──",
            "Out → E",
            "Strong gusts",
            "Data: Open-Meteo.com (knmi_harmonie_arome_europe)",
        ] {
            assert!(text.contains(needle), "missing {needle:?} in\n{text}");
        }
        assert!(!text.contains("48-hour outlook"));
    }

    #[test]
    fn outlook_is_optional() {
        let text = dashboard(&dashboard_for(2), true);
        assert!(text.contains("48-hour outlook"));
        assert!(text.contains("Tue 09:00"));
    }

    #[test]
    fn thunderstorms_render_safety_message() {
        let text = dashboard(&dashboard_for(95), false);
        assert!(text.contains("Safety first"));
        assert!(text.contains("Thunderstorm expected"));
    }

    #[test]
    fn locations_mark_default() {
        let text = locations(&Config::default());
        assert!(text.lines().any(|l| l.starts_with("* alcabideche")));
        assert!(text.contains("Praia da Tocha"));
    }

    #[test]
    fn stale_notice_mentions_retry() {
        let err = anyhow::anyhow!("boom").context("Failed to fetch forecast for Sintra");
        let msg = stale_notice(&err, Duration::from_secs(300));
        assert!(msg.contains("Failed to fetch forecast for Sintra: boom"));
        assert!(msg.contains("retrying in 300s"));
    }
}
