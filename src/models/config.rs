use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

/// Default location of the settings file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/settings.yaml";

/// Distance metric used when matching image colors to swatches.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchMetric {
    #[default]
    Euclidean,
    Hyab,
}

impl From<MatchMetric> for swatch_match::DistanceMetric {
    fn from(metric: MatchMetric) -> Self {
        match metric {
            MatchMetric::Euclidean => swatch_match::DistanceMetric::Euclidean,
            MatchMetric::Hyab => swatch_match::DistanceMetric::HYAB_DEFAULT,
        }
    }
}

/// Run configuration loaded from settings.yaml.
///
/// Validated once by [`DrawConfig::validate`]; consumers read fields directly.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DrawConfig {
    // Canvas detection
    pub search_offset_y_ratio: f64,
    pub adaptive_thresh_block_size: u32,
    pub adaptive_thresh_c: f64,
    pub morph_kernel_size: u32,
    pub morph_iterations: u32,
    pub cell_min_aspect_ratio: f64,
    pub cell_max_aspect_ratio: f64,
    pub cell_min_width: u32,
    pub cell_max_width: u32,
    pub cell_min_height: u32,
    pub cell_max_height: u32,
    pub assume_portrait: bool,
    pub fallback_cell_size: u32,

    // Palette detection
    pub palette_search_width_ratio: f64,
    pub palette_search_height_ratio: f64,
    pub hough_dp: f64,
    pub hough_min_dist: f64,
    pub hough_param1: f64,
    pub hough_param2: f64,
    pub swatch_min_radius: u32,
    pub swatch_max_radius: u32,
    pub max_swatches: usize,
    pub palette_sample_points: usize,

    // Colors
    pub num_colors: usize,
    pub seed: Option<u64>,
    pub match_metric: MatchMetric,

    // Timing (seconds unless noted)
    pub click_delay: f64,
    pub color_change_delay: f64,
    pub clear_click_delay: f64,
    pub failsafe_delay: f64,
    pub countdown_secs: u32,
    pub pause_poll_ms: u64,

    // Output
    pub preview_path: PathBuf,
    pub preview_scale: u32,
    pub debug_dir: PathBuf,
}

impl Default for DrawConfig {
    fn default() -> Self {
        Self {
            search_offset_y_ratio: 0.3,
            adaptive_thresh_block_size: 11,
            adaptive_thresh_c: 2.0,
            morph_kernel_size: 3,
            morph_iterations: 1,
            cell_min_aspect_ratio: 0.8,
            cell_max_aspect_ratio: 1.2,
            cell_min_width: 5,
            cell_max_width: 100,
            cell_min_height: 5,
            cell_max_height: 100,
            assume_portrait: true,
            fallback_cell_size: 20,

            palette_search_width_ratio: 0.33,
            palette_search_height_ratio: 0.1,
            hough_dp: 1.2,
            hough_min_dist: 30.0,
            hough_param1: 50.0,
            hough_param2: 20.0,
            swatch_min_radius: 23,
            swatch_max_radius: 25,
            max_swatches: 10,
            palette_sample_points: 500,

            num_colors: 10,
            seed: None,
            match_metric: MatchMetric::Euclidean,

            click_delay: 0.5,
            color_change_delay: 0.08,
            clear_click_delay: 0.5,
            failsafe_delay: 0.01,
            countdown_secs: 5,
            pause_poll_ms: 100,

            preview_path: PathBuf::from("gridpaint-preview.png"),
            preview_scale: 8,
            debug_dir: PathBuf::from("debug"),
        }
    }
}

/// Replace `value` by `default` when `valid` is false, recording the field.
fn fallback<T: Copy + std::fmt::Debug>(
    field: &'static str,
    value: &mut T,
    default: T,
    valid: bool,
    replaced: &mut Vec<&'static str>,
) {
    if !valid {
        tracing::warn!(
            field,
            value = ?*value,
            default = ?default,
            "Config value out of range, using default"
        );
        *value = default;
        replaced.push(field);
    }
}

/// `check!(config, defaults, replaced, field, |v| valid)`
macro_rules! check {
    ($cfg:expr, $defaults:expr, $replaced:expr, $field:ident, |$v:ident| $valid:expr) => {{
        let $v = $cfg.$field;
        fallback(
            stringify!($field),
            &mut $cfg.$field,
            $defaults.$field,
            $valid,
            $replaced,
        );
    }};
}

/// Longest accepted per-click delay, in seconds.
pub const MAX_DELAY_SECS: f64 = 60.0;

fn is_delay(v: f64) -> bool {
    v.is_finite() && (0.0..=MAX_DELAY_SECS).contains(&v)
}

impl DrawConfig {
    /// Parse YAML and validate. Unknown keys are ignored.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes as unit; treat it like `{}`
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let mut config: Self = serde_yaml::from_str(content)?;
        config.validate();
        Ok(config)
    }

    /// Load from `path`, falling back to defaults when the file is missing
    /// or unreadable.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match Self::from_yaml_str(&content) {
                Ok(config) => {
                    tracing::info!(path = %path.display(), "Loaded configuration");
                    config
                }
                Err(e) => {
                    tracing::warn!(%e, path = %path.display(), "Failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(%e, path = %path.display(), "Failed to read config, using defaults");
                Self::default()
            }
        }
    }

    /// Substitute the default for every out-of-range value.
    ///
    /// Returns the names of the replaced fields.
    pub fn validate(&mut self) -> Vec<&'static str> {
        let d = Self::default();
        let mut replaced = Vec::new();

        check!(self, d, &mut replaced, search_offset_y_ratio, |v| (0.0..1.0).contains(&v));
        check!(self, d, &mut replaced, adaptive_thresh_block_size, |v| v >= 3 && v % 2 == 1);
        check!(self, d, &mut replaced, adaptive_thresh_c, |v| v.is_finite());
        check!(self, d, &mut replaced, morph_kernel_size, |v| v >= 1);

        let (lo, hi) = (self.cell_min_aspect_ratio, self.cell_max_aspect_ratio);
        let ok = lo.is_finite() && hi.is_finite() && lo > 0.0 && lo < hi;
        check!(self, d, &mut replaced, cell_min_aspect_ratio, |_v| ok);
        check!(self, d, &mut replaced, cell_max_aspect_ratio, |_v| ok);
        let ok = self.cell_min_width < self.cell_max_width;
        check!(self, d, &mut replaced, cell_min_width, |_v| ok);
        check!(self, d, &mut replaced, cell_max_width, |_v| ok);
        let ok = self.cell_min_height < self.cell_max_height;
        check!(self, d, &mut replaced, cell_min_height, |_v| ok);
        check!(self, d, &mut replaced, cell_max_height, |_v| ok);
        check!(self, d, &mut replaced, fallback_cell_size, |v| v >= 1);

        check!(self, d, &mut replaced, palette_search_width_ratio, |v| v > 0.0 && v <= 1.0);
        check!(self, d, &mut replaced, palette_search_height_ratio, |v| v > 0.0 && v <= 1.0);
        check!(self, d, &mut replaced, hough_dp, |v| v.is_finite() && v >= 1.0);
        check!(self, d, &mut replaced, hough_min_dist, |v| v.is_finite() && v > 0.0);
        check!(self, d, &mut replaced, hough_param1, |v| v.is_finite() && v > 0.0);
        check!(self, d, &mut replaced, hough_param2, |v| v.is_finite() && v > 0.0);
        let ok = self.swatch_min_radius >= 1 && self.swatch_min_radius <= self.swatch_max_radius;
        check!(self, d, &mut replaced, swatch_min_radius, |_v| ok);
        check!(self, d, &mut replaced, swatch_max_radius, |_v| ok);
        check!(self, d, &mut replaced, max_swatches, |v| v >= 1);
        check!(self, d, &mut replaced, palette_sample_points, |v| v >= 1);

        check!(self, d, &mut replaced, num_colors, |v| v >= 1);

        check!(self, d, &mut replaced, click_delay, |v| is_delay(v));
        check!(self, d, &mut replaced, color_change_delay, |v| is_delay(v));
        check!(self, d, &mut replaced, clear_click_delay, |v| is_delay(v));
        check!(self, d, &mut replaced, failsafe_delay, |v| is_delay(v));
        check!(self, d, &mut replaced, pause_poll_ms, |v| v >= 1);
        check!(self, d, &mut replaced, preview_scale, |v| (1..=64).contains(&v));

        replaced
    }

    pub fn click_delay(&self) -> Duration {
        Duration::from_secs_f64(self.click_delay)
    }

    pub fn color_change_delay(&self) -> Duration {
        Duration::from_secs_f64(self.color_change_delay)
    }

    pub fn clear_click_delay(&self) -> Duration {
        Duration::from_secs_f64(self.clear_click_delay)
    }

    pub fn failsafe_delay(&self) -> Duration {
        Duration::from_secs_f64(self.failsafe_delay)
    }

    pub fn pause_poll(&self) -> Duration {
        Duration::from_millis(self.pause_poll_ms)
    }
}
