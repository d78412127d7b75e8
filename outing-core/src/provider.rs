use crate::{Config, Forecast, ForecastError, Location, provider::openmeteo::OpenMeteoProvider};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openmeteo;

#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    async fn fetch_forecast(&self, location: &Location) -> Result<Forecast, ForecastError>;
}

/// Construct the forecast provider described by `config`.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn ForecastProvider>> {
    let provider = OpenMeteoProvider::from_config(config)?;
    Ok(Box::new(provider))
}
