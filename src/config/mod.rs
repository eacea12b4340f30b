//! Configuration module for Vantage.
//!
//! Planner limits and registry storage settings, loaded from TOML.

mod settings;

pub use settings::{PlannerSettings, RegistrySettings, Settings, SettingsError};
