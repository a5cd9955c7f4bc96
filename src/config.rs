use crate::error::{MapperError, Result};
use serde::{Deserialize, Serialize};
use std::{env, fs, io, path::Path, path::PathBuf};
use tracing::debug;

/// Upper bound on `rows * cols` accepted by `Config::validate`.
pub const MAX_GRID_CELLS: usize = 1 << 26;

/// Room extent and cell size, all in meters.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GridConfig {
    pub resolution: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            resolution: 0.1,
            width: 10.0,
            height: 10.0,
        }
    }
}

impl GridConfig {
    pub fn rows(&self) -> usize {
        (self.height / self.resolution).round() as usize
    }

    pub fn cols(&self) -> usize {
        (self.width / self.resolution).round() as usize
    }
}

/// Tuning of the Gaussian mixture background model.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SubtractorConfig {
    pub history: u32,
    pub mixtures: usize,
    /// Squared Mahalanobis distance under which a pixel counts as background.
    pub var_threshold: f32,
    /// Squared Mahalanobis distance under which a pixel updates an existing mode.
    pub var_threshold_gen: f32,
    pub background_ratio: f32,
    pub var_init: f32,
    pub var_min: f32,
    pub var_max: f32,
    pub complexity_reduction: f32,
    /// Fixed learning rate. `None` adapts it as `1 / min(2n, history)`.
    pub learning_rate: Option<f32>,
}

impl Default for SubtractorConfig {
    fn default() -> Self {
        Self {
            history: 500,
            mixtures: 5,
            var_threshold: 16.0,
            var_threshold_gen: 9.0,
            background_ratio: 0.9,
            var_init: 15.0,
            var_min: 4.0,
            var_max: 75.0,
            complexity_reduction: 0.05,
            learning_rate: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DetectionConfig {
    /// Bounding boxes smaller than this many pixels are ignored.
    pub min_area: u32,
    /// Frames that only train the background model.
    pub warmup_frames: u32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_area: 0,
            warmup_frames: 1,
        }
    }
}

/// The simulated room fed to the pipeline when no camera is used.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SyntheticConfig {
    pub width: u32,
    pub height: u32,
    /// Inclusive corners `[x0, y0, x1, y1]` of the simulated person.
    pub person: [i32; 4],
    /// Pixels the person moves per frame.
    pub velocity: [i32; 2],
    /// Leading frames showing the empty room.
    pub empty_frames: u32,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            person: [300, 200, 340, 240],
            velocity: [0, 0],
            empty_frames: 1,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub grid: GridConfig,
    pub subtractor: SubtractorConfig,
    pub detection: DetectionConfig,
    pub synthetic: SyntheticConfig,
    /// Frames processed per run, 0 for all the source provides.
    pub frames: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            subtractor: SubtractorConfig::default(),
            detection: DetectionConfig::default(),
            synthetic: SyntheticConfig::default(),
            frames: 30,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        let grid = &self.grid;
        for (name, value) in [
            ("grid.resolution", grid.resolution),
            ("grid.width", grid.width),
            ("grid.height", grid.height),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(MapperError::Config(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if grid.rows() == 0 || grid.cols() == 0 {
            return Err(MapperError::Config(
                "grid must contain at least one cell".into(),
            ));
        }
        match grid.rows().checked_mul(grid.cols()) {
            Some(cells) if cells <= MAX_GRID_CELLS => {}
            _ => {
                return Err(MapperError::Config(format!(
                    "grid of {} x {} cells exceeds {MAX_GRID_CELLS} cells",
                    grid.rows(),
                    grid.cols()
                )))
            }
        }

        let sub = &self.subtractor;
        if sub.mixtures == 0 {
            return Err(MapperError::Config("subtractor.mixtures must be >= 1".into()));
        }
        if sub.history == 0 {
            return Err(MapperError::Config("subtractor.history must be >= 1".into()));
        }
        if let Some(rate) = sub.learning_rate {
            if !(0.0..=1.0).contains(&rate) {
                return Err(MapperError::Config(format!(
                    "subtractor.learning_rate must be within [0, 1], got {rate}"
                )));
            }
        }
        if sub.var_min <= 0.0 || sub.var_min > sub.var_max {
            return Err(MapperError::Config(
                "subtractor.var_min must be positive and not above var_max".into(),
            ));
        }

        if self.synthetic.width == 0 || self.synthetic.height == 0 {
            return Err(MapperError::Config("synthetic frame must not be empty".into()));
        }
        Ok(())
    }
}

pub fn config_path() -> PathBuf {
    env::var_os("OCCUPANCY_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("occupancy.json"))
}

pub fn load_config(path: &Path) -> Result<Config> {
    match fs::read(path) {
        Ok(data) => {
            let cfg: Config = serde_json::from_slice(&data)?;
            debug!(path = %path.display(), "loaded configuration");
            Ok(cfg)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no configuration file, using defaults");
            Ok(Config::default())
        }
        Err(e) => Err(e.into()),
    }
}

pub fn save_config(path: &Path, cfg: &Config) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let data = serde_json::to_vec_pretty(cfg)?;
    fs::write(path, data)?;
    debug!(path = %path.display(), "configuration written");
    Ok(())
}
