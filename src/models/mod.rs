pub mod cell;
pub mod config;
pub mod geometry;

pub use cell::{DrawOp, ImageCell, PaletteSwatch};
pub use config::{DrawConfig, MatchMetric, DEFAULT_CONFIG_PATH};
pub use geometry::{GridSpec, Rect, ScreenPoint};
