// src/config/mod.rs

//! Configuration loading and validation.
//!
//! - [`model`] holds the serde structs mapped from the TOML file.
//! - [`loader`] reads a file and deserializes it.
//! - [`validate`] turns the raw structs into a validated [`ConfigFile`].
//!
//! The validated config is immutable for the duration of a run and is passed
//! by reference into every component that needs it.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{
    ConfigFile, GlobalSection, ImageFormat, RawConfigFile, RenderSection, ToolSection,
    DEF_OUTPUT_PATTERN,
};
