//! Text rain: letters fall over a live camera image and pile up on anything dark.
//!
//! Core: `vision` (frame -> obstacle mask), `coords`, `rain` (drops + spawner),
//! `physics` (gravity, collision, escape, sliding) and `app` (one frame of all of it).
//! Edges: `camera`/`source` feed frames in, `draw` puts pixels on screen.

pub mod app;
pub mod camera;
pub mod config;
pub mod coords;
pub mod draw;
pub mod error;
pub mod physics;
pub mod rain;
pub mod source;
pub mod types;
pub mod vision;

pub use app::{RainApp, Sprite};
pub use config::{AppConfig, SimulationConfig};
pub use error::Error;
pub use types::{FrameBuffer, PixelBuffer};
