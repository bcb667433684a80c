use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// Main configuration structure for the annotator
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub runtime: Runtime,
    #[serde(default)]
    pub storage: Storage,
    #[serde(default)]
    pub loop_monitor: LoopMonitor,
    #[serde(default)]
    pub player: Player,
}

#[derive(Debug, Default, Deserialize)]
pub struct Runtime {
    pub threads: Option<usize>,
}

/// Cookie jar configuration
#[derive(Debug, Deserialize)]
pub struct Storage {
    #[serde(default = "Storage::default_path")]
    pub path: String,
    /// Jar key prefix, one entry per video under `<prefix>::<videoId>`
    #[serde(default = "Storage::default_prefix")]
    pub prefix: String,
    #[serde(default = "Storage::default_max_age", with = "humantime_serde")]
    pub max_age: Duration,
}

impl Storage {
    fn default_path() -> String {
        "annotator-jar.json".to_string()
    }

    fn default_prefix() -> String {
        "jazzTranscriber".to_string()
    }

    fn default_max_age() -> Duration {
        Duration::from_secs(31_536_000)
    }
}

impl Default for Storage {
    fn default() -> Self {
        Self {
            path: Self::default_path(),
            prefix: Self::default_prefix(),
            max_age: Self::default_max_age(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoopMonitor {
    #[serde(default = "LoopMonitor::default_period", with = "humantime_serde")]
    pub period: Duration,
}

impl LoopMonitor {
    fn default_period() -> Duration {
        Duration::from_millis(100)
    }
}

impl Default for LoopMonitor {
    fn default() -> Self {
        Self {
            period: Self::default_period(),
        }
    }
}

/// Player configuration
#[derive(Debug, Deserialize)]
pub struct Player {
    /// Delay between a load request and reading the title
    #[serde(default = "Player::default_settle_delay", with = "humantime_serde")]
    pub settle_delay: Duration,
    #[serde(default = "Player::default_video")]
    pub default_video: Option<String>,
    #[serde(default = "Player::default_rates")]
    pub rates: Vec<f64>,
    #[serde(default)]
    pub titles: HashMap<String, String>,
}

impl Player {
    fn default_settle_delay() -> Duration {
        Duration::from_millis(1000)
    }

    fn default_video() -> Option<String> {
        Some("3vK19vG9u00".to_string())
    }

    fn default_rates() -> Vec<f64> {
        vec![0.25, 0.5, 0.75, 1.0, 1.25, 1.5, 2.0]
    }
}

impl Default for Player {
    fn default() -> Self {
        Self {
            settle_delay: Self::default_settle_delay(),
            default_video: Self::default_video(),
            rates: Self::default_rates(),
            titles: HashMap::new(),
        }
    }
}
