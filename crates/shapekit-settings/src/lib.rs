//! ShapeKit Settings Crate
//!
//! Handles the tunable parameters of the shape engine (constraint steps,
//! knob geometry, flattening tolerance) and their persistence.

pub mod config;
pub mod error;

pub use config::{ConstraintSettings, KnobSettings, RenderingSettings, ShapeSettings};
pub use error::{SettingsError, SettingsResult};
