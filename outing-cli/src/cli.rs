use std::fmt;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use inquire::{CustomType, Select};
use outing_core::{
    Activity, Config, Dashboard, ForecastProvider, Location, NeedleConvention,
    provider_from_config,
};
use tracing::{error, info};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "outing", version, about = "Weather advisor for rides, runs and walks")]
pub struct Cli {
    /// Log debug detail to stderr (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Choose the default location, activity and outing length.
    Configure,

    /// List the configured locations.
    Locations,

    /// Add a location, or replace the one with the same id.
    AddLocation(LocationArgs),

    /// Fetch the forecast once and print the dashboard.
    Show(ViewArgs),

    /// Keep the dashboard fresh, refetching on a fixed interval.
    Watch {
        #[command(flatten)]
        view: ViewArgs,

        /// Refresh interval in seconds; defaults to the configured one.
        #[arg(long)]
        every: Option<u64>,
    },
}

#[derive(Debug, Args)]
pub struct LocationArgs {
    /// Short id used on the command line, e.g. "ericeira".
    pub id: String,

    /// Display name.
    pub name: String,

    #[arg(allow_negative_numbers = true)]
    pub latitude: f64,

    #[arg(allow_negative_numbers = true)]
    pub longitude: f64,
}

impl LocationArgs {
    fn into_location(self) -> Result<Location> {
        if !(-90.0..=90.0).contains(&self.latitude) || !(-180.0..=180.0).contains(&self.longitude) {
            anyhow::bail!(
                "Coordinates out of range: {}, {}. Latitude must be within ±90 and longitude within ±180.",
                self.latitude,
                self.longitude
            );
        }
        Ok(Location::new(&self.id.to_lowercase(), &self.name, self.latitude, self.longitude))
    }
}

#[derive(Debug, Args)]
pub struct ViewArgs {
    /// Location id, e.g. "guincho"; defaults to the configured location.
    pub location: Option<String>,

    /// Activity to score for: cycling, running or walking.
    #[arg(long)]
    pub activity: Option<String>,

    /// Length of the out-and-back outing in hours.
    #[arg(long)]
    pub hours: Option<usize>,

    /// Also print the 48-hour outlook table.
    #[arg(long)]
    pub outlook: bool,

    /// Print the dashboard as JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

impl ViewArgs {
    /// Apply command-line overrides on top of the loaded config.
    fn resolve(&self, config: &Config) -> Result<(Location, Activity, Config)> {
        let mut config = config.clone();
        if let Some(hours) = self.hours {
            config.ride_window_hours = hours.max(1);
        }

        let activity = match self.activity.as_deref() {
            Some(a) => Activity::try_from(a)?,
            None => config.activity,
        };

        let location = config.resolve_location(self.location.as_deref())?.clone();
        Ok((location, activity, config))
    }

    fn print(&self, dashboard: &Dashboard) -> Result<()> {
        if self.json {
            let out = serde_json::to_string_pretty(dashboard)
                .context("Failed to serialize dashboard to JSON")?;
            println!("{out}");
        } else {
            print!("{}", render::dashboard(dashboard, self.outlook));
        }
        Ok(())
    }
}

/// One fetch-compute cycle.
async fn refresh(
    provider: &dyn ForecastProvider,
    location: &Location,
    activity: Activity,
    config: &Config,
) -> Result<Dashboard> {
    let forecast = provider
        .fetch_forecast(location)
        .await
        .with_context(|| format!("Failed to fetch forecast for {}", location.name))?;

    let local = forecast.local_time(Utc::now());
    let dashboard = Dashboard::build(location, &forecast, local, activity, config)?;
    Ok(dashboard)
}

struct LocationChoice(Location);

impl fmt::Display for LocationChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0.name, self.0.id)
    }
}

fn starting_cursor<T>(items: &[T], current: impl Fn(&T) -> bool) -> usize {
    items.iter().position(current).unwrap_or(0)
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = Config::load()?;

        match self.command {
            Command::Configure => configure(config)?,
            Command::Locations => print!("{}", render::locations(&config)),
            Command::AddLocation(args) => add_location(config, args)?,
            Command::Show(view) => {
                let (location, activity, config) = view.resolve(&config)?;
                let provider = provider_from_config(&config)?;
                let dashboard = refresh(provider.as_ref(), &location, activity, &config).await?;
                view.print(&dashboard)?;
            }
            Command::Watch { view, every } => {
                let (location, activity, mut config) = view.resolve(&config)?;
                if let Some(secs) = every {
                    config.refresh_interval_secs = secs;
                }
                watch(&view, &location, activity, &config).await?;
            }
        }

        Ok(())
    }
}

async fn watch(view: &ViewArgs, location: &Location, activity: Activity, config: &Config) -> Result<()> {
    let provider = provider_from_config(config)?;
    let period = config.refresh_interval();
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    info!(location = %location.id, every_secs = period.as_secs(), "watching forecast");

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, stopping");
                return Ok(());
            }
        }

        match refresh(provider.as_ref(), location, activity, config).await {
            Ok(dashboard) => view.print(&dashboard)?,
            Err(e) => {
                error!(error = %format!("{e:#}"), "refresh failed");
                eprintln!("{}", render::stale_notice(&e, period));
            }
        }
    }
}

fn add_location(mut config: Config, args: LocationArgs) -> Result<()> {
    let location = args.into_location()?;
    let id = location.id.clone();
    config.upsert_location(location);
    config.save()?;
    println!("Saved location '{id}' to {}.", Config::config_file_path()?.display());
    Ok(())
}

fn configure(mut config: Config) -> Result<()> {
    let choices: Vec<LocationChoice> =
        config.locations.iter().cloned().map(LocationChoice).collect();
    let cursor = starting_cursor(&choices, |c| {
        config.default_location.as_deref() == Some(c.0.id.as_str())
    });
    let location = Select::new("Default location:", choices)
        .with_starting_cursor(cursor)
        .prompt()
        .context("Location selection cancelled")?;

    let activities = Activity::all().to_vec();
    let cursor = starting_cursor(&activities, |a| *a == config.activity);
    let activity = Select::new("Activity:", activities)
        .with_starting_cursor(cursor)
        .prompt()
        .context("Activity selection cancelled")?;

    let hours = CustomType::<usize>::new("Outing length (hours):")
        .with_default(config.ride_window_hours)
        .with_error_message("Please enter a whole number of hours")
        .prompt()
        .context("Outing length prompt cancelled")?;

    let needles = vec![NeedleConvention::From, NeedleConvention::To];
    let cursor = starting_cursor(&needles, |n| *n == config.needle);
    let needle = Select::new("Wind needle points:", needles)
        .with_starting_cursor(cursor)
        .with_help_message("from = where the wind comes from, to = where it blows")
        .prompt()
        .context("Needle selection cancelled")?;

    config.set_default_location(&location.0.id)?;
    config.activity = activity;
    config.ride_window_hours = hours.max(1);
    config.needle = needle;
    config.save()?;

    println!(
        "Saved to {} (default: {}, {}, {}h).",
        Config::config_file_path()?.display(),
        location.0.name,
        activity,
        config.ride_window_hours
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(location: Option<&str>, activity: Option<&str>, hours: Option<usize>) -> ViewArgs {
        ViewArgs {
            location: location.map(str::to_string),
            activity: activity.map(str::to_string),
            hours,
            outlook: false,
            json: false,
        }
    }

    #[test]
    fn view_args_fall_back_to_config() {
        let cfg = Config::default();
        let (loc, activity, resolved) = args(None, None, None).resolve(&cfg).unwrap();
        assert_eq!(loc.id, "alcabideche");
        assert_eq!(activity, Activity::Cycling);
        assert_eq!(resolved.ride_window_hours, cfg.ride_window_hours);
    }

    #[test]
    fn view_args_override_config() {
        let cfg = Config::default();
        let (loc, activity, resolved) =
            args(Some("tocha"), Some("run"), Some(0)).resolve(&cfg).unwrap();
        assert_eq!(loc.name, "Praia da Tocha");
        assert_eq!(activity, Activity::Running);
        assert_eq!(resolved.ride_window_hours, 1);
    }

    #[test]
    fn view_args_reject_unknown_values() {
        let cfg = Config::default();
        assert!(args(Some("mars"), None, None).resolve(&cfg).is_err());
        assert!(args(None, Some("rowing"), None).resolve(&cfg).is_err());
    }

    #[test]
    fn cli_parses_add_location_with_negative_longitude() {
        let cli = Cli::try_parse_from(["outing", "add-location", "Ericeira", "Ericeira", "38.96", "-9.42"])
            .unwrap();
        let Command::AddLocation(args) = cli.command else {
            panic!("expected add-location");
        };
        let mut cfg = Config::default();
        let before = cfg.locations.len();
        cfg.upsert_location(args.into_location().unwrap());

        assert_eq!(cfg.locations.len(), before + 1);
        let added = cfg.location("ericeira").unwrap();
        assert_eq!(added.longitude, -9.42);
    }

    #[test]
    fn add_location_rejects_bad_coordinates() {
        let args = LocationArgs {
            id: "nowhere".into(),
            name: "Nowhere".into(),
            latitude: 123.0,
            longitude: 0.0,
        };
        assert!(args.into_location().is_err());
    }

    #[test]
    fn cli_parses_watch_with_interval() {
        let cli = Cli::try_parse_from(["outing", "watch", "guincho", "--every", "60", "--json"])
            .unwrap();
        match cli.command {
            Command::Watch { view, every } => {
                assert_eq!(view.location.as_deref(), Some("guincho"));
                assert_eq!(every, Some(60));
                assert!(view.json);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
