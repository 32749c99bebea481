//! Client settings with RON persistence.
//!
//! Every field has a sensible default and the file is optional: a
//! missing config is created from defaults on first load, and unknown
//! or absent fields fall back per-field.

mod error;
mod settings;

pub use error::ConfigError;
pub use settings::{
    DecodeSettings, InterpolationSettings, Settings, TrackingSettings, default_config_dir,
};
