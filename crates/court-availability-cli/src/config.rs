//! `courtwatch` configuration file.
//!
//! A JSON object; every field is optional and command-line flags win over
//! it. Without `--config` the defaults describe the club's clay courts and
//! the 22:00-00:00 evening window.
//!
//! ```json
//! {
//!   "surface": "Грунт",
//!   "window_start": "22:00",
//!   "window_end": "00:00",
//!   "cell_minutes": 30,
//!   "requests_path": "booking_requests.json",
//!   "halls": [{ "name": "Дутик № 2", "courts": [4, 5, 6] }]
//! }
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use court_availability::{TimeOfDay, DEFAULT_CELL_MINUTES};
use serde::Deserialize;

/// A physical air dome holding several numbered courts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Hall {
    pub name: String,
    pub courts: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub surface: String,
    pub window_start: String,
    pub window_end: String,
    pub cell_minutes: u32,
    pub requests_path: PathBuf,
    pub halls: Vec<Hall>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        WatchConfig {
            surface: "Грунт".to_string(),
            window_start: "22:00".to_string(),
            window_end: "00:00".to_string(),
            cell_minutes: DEFAULT_CELL_MINUTES,
            requests_path: PathBuf::from("booking_requests.json"),
            halls: vec![
                hall("Дутик № 2", &[4, 5, 6]),
                hall("Дутик № 3", &[7, 8, 9]),
                hall("Дутик № 4", &[10, 11, 12, 13]),
            ],
        }
    }
}

fn hall(name: &str, courts: &[u32]) -> Hall {
    Hall {
        name: name.to_string(),
        courts: courts.to_vec(),
    }
}

impl WatchConfig {
    /// Load the config file at `path`, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// The evening window bounds, parsed from `HH:MM`.
    pub fn window(&self) -> Result<(TimeOfDay, TimeOfDay)> {
        let start = self
            .window_start
            .parse::<TimeOfDay>()
            .with_context(|| format!("Invalid window start: '{}'", self.window_start))?;
        let end = self
            .window_end
            .parse::<TimeOfDay>()
            .with_context(|| format!("Invalid window end: '{}'", self.window_end))?;
        Ok((start, end))
    }

    /// Name of the hall holding court `number`, if any.
    pub fn hall_of(&self, number: u32) -> Option<&str> {
        self.halls
            .iter()
            .find(|h| h.courts.contains(&number))
            .map(|h| h.name.as_str())
    }
}
