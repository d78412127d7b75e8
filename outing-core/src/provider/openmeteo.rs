use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::{
    Config, ForecastError, Location,
    error::truncate_body,
    model::{DailySun, Forecast, HourlySample},
};

use super::ForecastProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.open-meteo.com/v1/forecast";

const HOURLY_FIELDS: &str = "temperature_2m,apparent_temperature,precipitation,\
precipitation_probability,wind_speed_10m,wind_gusts_10m,wind_direction_10m,weather_code,is_day";

const DAILY_FIELDS: &str = "sunrise,sunset";

const FORECAST_DAYS: u8 = 3;

#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    http: Client,
    base_url: String,
    timezone: String,
    timeout: Duration,
    models: Vec<String>,
}

impl OpenMeteoProvider {
    pub fn from_config(config: &Config) -> Result<Self, ForecastError> {
        let timeout = config.fetch_timeout();
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("outing/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_base_url.clone(),
            timezone: config.timezone.clone(),
            timeout,
            models: config.preferred_models.clone(),
        })
    }

    fn query(&self, location: &Location, model: Option<&str>) -> Vec<(&'static str, String)> {
        let mut q = vec![
            ("latitude", location.latitude.to_string()),
            ("longitude", location.longitude.to_string()),
            ("timezone", self.timezone.clone()),
            ("wind_speed_unit", "kmh".to_string()),
            ("precipitation_unit", "mm".to_string()),
            ("forecast_days", FORECAST_DAYS.to_string()),
            ("hourly", HOURLY_FIELDS.to_string()),
            ("daily", DAILY_FIELDS.to_string()),
        ];
        if let Some(model) = model {
            q.push(("models", model.to_string()));
        }
        q
    }

    async fn fetch_model(
        &self,
        location: &Location,
        model: Option<&str>,
    ) -> Result<Forecast, ForecastError> {
        let started = Instant::now();
        let query = self.query(location, model);

        // The client timeout covers each phase; this bounds the whole exchange.
        let exchange = async {
            let res = self.http.get(&self.base_url).query(&query).send().await?;
            let status = res.status();
            let body = res.text().await?;
            Ok::<_, reqwest::Error>((status, body))
        };

        let (status, body) = match tokio::time::timeout(self.timeout, exchange).await {
            Err(_) => return Err(ForecastError::Timeout(self.timeout)),
            Ok(Err(e)) if e.is_timeout() => return Err(ForecastError::Timeout(self.timeout)),
            Ok(Err(e)) => return Err(e.into()),
            Ok(Ok(pair)) => pair,
        };

        if !status.is_success() {
            return Err(ForecastError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let forecast = parse_forecast(&body, model)?;

        info!(
            location = %location.id,
            model = model.unwrap_or("default"),
            hours = forecast.hourly.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "forecast fetched"
        );

        Ok(forecast)
    }
}

#[async_trait]
impl ForecastProvider for OpenMeteoProvider {
    async fn fetch_forecast(&self, location: &Location) -> Result<Forecast, ForecastError> {
        for model in &self.models {
            match self.fetch_model(location, Some(model)).await {
                Ok(forecast) => return Ok(forecast),
                Err(e) if e.model_may_help() => {
                    warn!(model = %model, error = %e, "preferred model unavailable, trying next");
                }
                Err(e) => return Err(e),
            }
        }

        self.fetch_model(location, None).await
    }
}

#[derive(Debug, Deserialize)]
struct OmResponse {
    #[serde(default)]
    latitude: f64,
    #[serde(default)]
    longitude: f64,
    timezone: Option<String>,
    utc_offset_seconds: Option<i32>,
    hourly: Option<OmHourly>,
    daily: Option<OmDaily>,
}

type Series = Option<Vec<Option<f64>>>;

#[derive(Debug, Deserialize)]
struct OmHourly {
    #[serde(default)]
    time: Vec<String>,
    temperature_2m: Series,
    apparent_temperature: Series,
    precipitation: Series,
    precipitation_probability: Series,
    wind_speed_10m: Series,
    wind_gusts_10m: Series,
    wind_direction_10m: Series,
    weather_code: Series,
    is_day: Series,
}

#[derive(Debug, Deserialize)]
struct OmDaily {
    #[serde(default)]
    time: Vec<String>,
    sunrise: Option<Vec<Option<String>>>,
    sunset: Option<Vec<Option<String>>>,
}

/// Finite value at `i`, or `None` when the array, entry or number is missing.
fn value_at(series: &Series, i: usize) -> Option<f64> {
    series
        .as_ref()
        .and_then(|v| v.get(i).copied().flatten())
        .filter(|x| x.is_finite())
}

fn parse_local(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

fn text_at(series: &Option<Vec<Option<String>>>, i: usize) -> Option<&str> {
    series.as_ref().and_then(|v| v.get(i)).and_then(|s| s.as_deref())
}

/// Turn an Open-Meteo JSON body into a [`Forecast`].
///
/// Missing arrays and null entries are read as zero; entries whose timestamp
/// cannot be parsed are dropped. A payload where temperature, wind speed and
/// precipitation are all null is [`ForecastError::EmptyHourly`]: that is how
/// the API answers for a point outside the requested model's domain.
pub fn parse_forecast(body: &str, model: Option<&str>) -> Result<Forecast, ForecastError> {
    let parsed: OmResponse = serde_json::from_str(body)?;

    let h = parsed.hourly.ok_or(ForecastError::EmptyHourly)?;

    let has_values = |s: &Series| s.iter().flatten().flatten().any(|x| x.is_finite());
    if ![&h.temperature_2m, &h.wind_speed_10m, &h.precipitation]
        .into_iter()
        .any(has_values)
    {
        debug!(model = model.unwrap_or("default"), "hourly payload has no values");
        return Err(ForecastError::EmptyHourly);
    }

    let mut hourly = Vec::with_capacity(h.time.len());
    for (i, raw_time) in h.time.iter().enumerate() {
        let Some(time) = parse_local(raw_time) else {
            warn!(index = i, time = %raw_time, "skipping hour with unreadable timestamp");
            continue;
        };

        let weather_code = value_at(&h.weather_code, i).unwrap_or(0.0).clamp(0.0, 255.0) as u8;

        hourly.push(HourlySample {
            time,
            temperature_c: value_at(&h.temperature_2m, i).unwrap_or(0.0),
            apparent_temperature_c: value_at(&h.apparent_temperature, i)
                .or_else(|| value_at(&h.temperature_2m, i))
                .unwrap_or(0.0),
            wind_speed_kmh: value_at(&h.wind_speed_10m, i).unwrap_or(0.0),
            wind_gust_kmh: value_at(&h.wind_gusts_10m, i).unwrap_or(0.0),
            wind_from_deg: value_at(&h.wind_direction_10m, i).unwrap_or(0.0),
            precipitation_mm: value_at(&h.precipitation, i).unwrap_or(0.0),
            precipitation_probability_pct: value_at(&h.precipitation_probability, i)
                .unwrap_or(0.0),
            weather_code,
            is_day: value_at(&h.is_day, i).is_none_or(|d| d != 0.0),
        });
    }

    if hourly.is_empty() {
        return Err(ForecastError::EmptyHourly);
    }

    let daily: Vec<DailySun> = parsed
        .daily
        .map(|d| {
            d.time
                .iter()
                .enumerate()
                .filter_map(|(i, date)| {
                    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
                    Some(DailySun {
                        date,
                        sunrise: text_at(&d.sunrise, i).and_then(parse_local),
                        sunset: text_at(&d.sunset, i).and_then(parse_local),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    debug!(hours = hourly.len(), days = daily.len(), "forecast parsed");

    Ok(Forecast {
        latitude: parsed.latitude,
        longitude: parsed.longitude,
        timezone: parsed.timezone.unwrap_or_else(|| "GMT".to_string()),
        utc_offset_seconds: parsed.utc_offset_seconds.unwrap_or(0),
        model: model.map(str::to_string),
        hourly,
        daily,
    })
}
