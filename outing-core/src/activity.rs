use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Activity {
    #[default]
    Cycling,
    Running,
    Walking,
}

impl Activity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Activity::Cycling => "cycling",
            Activity::Running => "running",
            Activity::Walking => "walking",
        }
    }

    pub const fn all() -> &'static [Activity] {
        &[Activity::Cycling, Activity::Running, Activity::Walking]
    }
}

impl std::fmt::Display for Activity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Activity {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "cycling" | "bike" => Ok(Activity::Cycling),
            "running" | "run" => Ok(Activity::Running),
            "walking" | "walk" => Ok(Activity::Walking),
            _ => Err(anyhow::anyhow!(
                "Unknown activity '{value}'. Supported activities: cycling, running, walking."
            )),
        }
    }
}

/// Relative weight of each penalty in an hour's difficulty score.
///
/// Weights are expected to sum to 1 so that the score stays in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyWeights {
    pub headwind: f64,
    pub crosswind: f64,
    pub gust: f64,
    pub rain: f64,
    pub cold: f64,
}

impl DifficultyWeights {
    pub fn for_activity(activity: Activity) -> Self {
        match activity {
            Activity::Cycling => Self {
                headwind: 0.45,
                crosswind: 0.15,
                gust: 0.15,
                rain: 0.15,
                cold: 0.10,
            },
            Activity::Running => Self {
                headwind: 0.20,
                crosswind: 0.05,
                gust: 0.10,
                rain: 0.30,
                cold: 0.35,
            },
            Activity::Walking => Self {
                headwind: 0.10,
                crosswind: 0.05,
                gust: 0.10,
                rain: 0.40,
                cold: 0.35,
            },
        }
    }

    pub fn total(&self) -> f64 {
        self.headwind + self.crosswind + self.gust + self.rain + self.cold
    }
}

/// Per-activity weight table, as stored in the config file under `[weights]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightTable {
    pub cycling: DifficultyWeights,
    pub running: DifficultyWeights,
    pub walking: DifficultyWeights,
}

impl Default for WeightTable {
    fn default() -> Self {
        Self {
            cycling: DifficultyWeights::for_activity(Activity::Cycling),
            running: DifficultyWeights::for_activity(Activity::Running),
            walking: DifficultyWeights::for_activity(Activity::Walking),
        }
    }
}

impl WeightTable {
    pub fn get(&self, activity: Activity) -> DifficultyWeights {
        match activity {
            Activity::Cycling => self.cycling,
            Activity::Running => self.running,
            Activity::Walking => self.walking,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activity_as_str_roundtrip() {
        for a in Activity::all() {
            let parsed = Activity::try_from(a.as_str()).expect("roundtrip should succeed");
            assert_eq!(*a, parsed);
        }
    }

    #[test]
    fn unknown_activity_error() {
        let err = Activity::try_from("swimming").unwrap_err();
        assert!(err.to_string().contains("Unknown activity"));
    }

    #[test]
    fn default_weights_sum_to_one() {
        for a in Activity::all() {
            let w = DifficultyWeights::for_activity(*a);
            assert!((w.total() - 1.0).abs() < 1e-9, "{a}: {}", w.total());
        }
    }

    #[test]
    fn cycling_weighs_headwind_most() {
        let bike = DifficultyWeights::for_activity(Activity::Cycling);
        let run = DifficultyWeights::for_activity(Activity::Running);
        assert!(bike.headwind > run.headwind);
        assert!(run.cold > bike.cold);
        assert!(run.rain > bike.rain);
    }
}
