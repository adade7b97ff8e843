// Runtime settings.
// `SimulationConfig` is read by the core every frame; the window loop edits it.
// `AppConfig` is parsed once from the command line.

use crate::error::Error;
use std::path::PathBuf;

/// Per-frame controls. Debugging only selects which image is shown.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
    pub threshold: f32,
    pub debugging: bool,
    pub population_cap: usize,
    /// Frames between word spawns (0 and 1 both mean every frame).
    pub spawn_interval: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self { threshold: 0.5, debugging: false, population_cap: 100, spawn_interval: 6 }
    }
}

impl SimulationConfig {
    pub fn clamped_threshold(&self) -> f32 {
        if self.threshold.is_nan() { 0.0 } else { self.threshold.clamp(0.0, 1.0) }
    }

    /// Slider step from the keyboard; the stored value stays in [0,1].
    pub fn nudge_threshold(&mut self, delta: f32) {
        self.threshold = (self.clamped_threshold() + delta).clamp(0.0, 1.0);
    }
}

/// Start-up options.
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub camera_index: u32,
    pub width: u32,
    pub height: u32,
    pub fallback_image: Option<PathBuf>,
    pub text_file: Option<PathBuf>,
    pub seed: Option<u64>,
    pub list_devices: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            camera_index: 0,
            width: 640,
            height: 480,
            fallback_image: None,
            text_file: None,
            seed: None,
            list_devices: false,
        }
    }
}

fn parse_num<T: std::str::FromStr>(flag: &str, value: Option<String>) -> Result<T, Error> {
    let v = value.ok_or_else(|| Error::InvalidArgument(format!("{flag} needs a value")))?;
    v.parse::<T>()
        .map_err(|_| Error::InvalidArgument(format!("{flag}: cannot parse '{v}'")))
}

fn parse_path(flag: &str, value: Option<String>) -> Result<PathBuf, Error> {
    value
        .map(PathBuf::from)
        .ok_or_else(|| Error::InvalidArgument(format!("{flag} needs a path")))
}

impl AppConfig {
    /// Parse flags (program name already stripped).
    pub fn from_args<I: IntoIterator<Item = String>>(args: I) -> Result<Self, Error> {
        let mut cfg = AppConfig::default();
        let mut it = args.into_iter();
        while let Some(flag) = it.next() {
            match flag.as_str() {
                "--camera" => cfg.camera_index = parse_num(&flag, it.next())?,
                "--width" => cfg.width = parse_num(&flag, it.next())?,
                "--height" => cfg.height = parse_num(&flag, it.next())?,
                "--seed" => cfg.seed = Some(parse_num(&flag, it.next())?),
                "--fallback" => cfg.fallback_image = Some(parse_path(&flag, it.next())?),
                "--text" => cfg.text_file = Some(parse_path(&flag, it.next())?),
                "--list-devices" => cfg.list_devices = true,
                other => return Err(Error::InvalidArgument(format!("unknown flag '{other}'"))),
            }
        }
        Ok(cfg)
    }
}
