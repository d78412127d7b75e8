use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    activity::{Activity, DifficultyWeights, WeightTable},
    location::{Location, builtin_locations},
    provider::openmeteo::DEFAULT_BASE_URL,
    route::DifficultyNorms,
    window::BestWindowParams,
};

/// Which way the wind needle points when rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NeedleConvention {
    /// Points at the bearing the wind comes from.
    #[default]
    From,
    /// Points where the wind is blowing to.
    To,
}

impl NeedleConvention {
    pub fn as_str(&self) -> &'static str {
        match self {
            NeedleConvention::From => "from",
            NeedleConvention::To => "to",
        }
    }

    pub fn needle_deg(&self, wind_from_deg: f64) -> f64 {
        match self {
            NeedleConvention::From => wind_from_deg.rem_euclid(360.0),
            NeedleConvention::To => (wind_from_deg + 180.0).rem_euclid(360.0),
        }
    }
}

impl std::fmt::Display for NeedleConvention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level configuration stored on disk.
///
/// Every field has a default, so a partial file (or none at all) is valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Location id used when none is given on the command line.
    pub default_location: Option<String>,
    pub activity: Activity,
    /// IANA timezone passed to the forecast API; timestamps come back in it.
    pub timezone: String,
    /// Forecast endpoint; override to point at a mirror or a self-hosted instance.
    pub api_base_url: String,
    pub refresh_interval_secs: u64,
    pub fetch_timeout_secs: u64,
    /// Forecast models to try in order before the API default.
    pub preferred_models: Vec<String>,
    /// Length of the simulated out-and-back outing, in hours.
    pub ride_window_hours: usize,
    pub needle: NeedleConvention,

    pub best_window: BestWindowParams,
    pub difficulty: DifficultyNorms,
    pub weights: WeightTable,

    /// Example TOML:
    /// [[locations]]
    /// id = "guincho"
    /// name = "Guincho"
    /// latitude = 38.72948
    /// longitude = -9.47457
    pub locations: Vec<Location>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_location: Some("alcabideche".to_string()),
            activity: Activity::Cycling,
            timezone: "Europe/Lisbon".to_string(),
            api_base_url: DEFAULT_BASE_URL.to_string(),
            refresh_interval_secs: 5 * 60,
            fetch_timeout_secs: 12,
            preferred_models: vec![
                "knmi_harmonie_arome_europe".to_string(),
                "dmi_harmonie_arome_europe".to_string(),
            ],
            ride_window_hours: 3,
            needle: NeedleConvention::default(),
            best_window: BestWindowParams::default(),
            difficulty: DifficultyNorms::default(),
            weights: WeightTable::default(),
            locations: builtin_locations(),
        }
    }
}

impl Config {
    /// Look up a location by id (case-insensitive).
    pub fn location(&self, id: &str) -> Result<&Location> {
        self.locations
            .iter()
            .find(|l| l.id.eq_ignore_ascii_case(id))
            .ok_or_else(|| {
                anyhow!(
                    "Unknown location '{id}'. Known locations: {}.\n\
                     Hint: run `outing locations` to list them.",
                    self.location_ids().join(", ")
                )
            })
    }

    /// Resolve an explicit location id, or fall back to `default_location`.
    pub fn resolve_location(&self, id: Option<&str>) -> Result<&Location> {
        match id {
            Some(id) => self.location(id),
            None => {
                let id = self.default_location.as_deref().ok_or_else(|| {
                    anyhow!(
                        "No default location configured.\n\
                         Hint: run `outing configure` or pass a location id."
                    )
                })?;
                self.location(id)
            }
        }
    }

    pub fn location_ids(&self) -> Vec<&str> {
        self.locations.iter().map(|l| l.id.as_str()).collect()
    }

    /// Set the default location; the id must be known.
    pub fn set_default_location(&mut self, id: &str) -> Result<()> {
        let canonical = self.location(id)?.id.clone();
        self.default_location = Some(canonical);
        Ok(())
    }

    /// Insert a location or replace the one with the same id.
    pub fn upsert_location(&mut self, location: Location) {
        match self.locations.iter_mut().find(|l| l.id == location.id) {
            Some(existing) => *existing = location,
            None => self.locations.push(location),
        }
    }

    pub fn weights_for(&self, activity: Activity) -> DifficultyWeights {
        self.weights.get(activity)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs.max(1))
    }

    /// Load config from disk, or return the defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, use defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "outing", "outing-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
