//! Core library for the `outing` CLI.
//!
//! This crate defines:
//! - Configuration, locations and scoring weights
//! - The Open-Meteo forecast provider
//! - Wind-relative route scoring and best-window selection
//! - The dashboard view model handed to front ends
//!
//! It is used by `outing-cli`, but has no terminal or network assumptions
//! beyond the provider module.

pub mod activity;
pub mod advice;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod location;
pub mod model;
pub mod provider;
pub mod route;
pub mod window;
pub mod wind;

pub use activity::{Activity, DifficultyWeights};
pub use config::{Config, NeedleConvention};
pub use dashboard::Dashboard;
pub use error::ForecastError;
pub use location::Location;
pub use model::{BestWindow, Confidence, Forecast, HourlySample, RouteSuggestion, SimulatedOption};
pub use provider::{ForecastProvider, provider_from_config};
pub use route::{hour_difficulty, route_suggestion, simulate_option};
pub use window::best_window_next_12h;
pub use wind::{WindComponents, wind_components};
