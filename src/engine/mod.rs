//! Compose-specification engines
//!
//! All compose semantics (merging, interpolation, schema validation,
//! normalization) live behind [`ComposeEngine`]. The crate only ever hands
//! sources and an environment over and takes a project model back.

pub mod external;
pub mod logline;

pub use external::ExternalEngine;
pub use logline::{Diagnostic, Level};

use crate::compose::environment::Environment;
use crate::compose::source::LoadedSource;
use crate::error::Result;
use serde_json::Value;
use std::path::Path;

/// Everything an engine needs to load one project
#[derive(Debug, Clone, Copy)]
pub struct LoadRequest<'a> {
    /// Sources in merge order
    pub sources: &'a [LoadedSource],
    /// Project name
    pub project_name: &'a str,
    /// Explicit project directory, if one was given
    pub project_directory: Option<&'a Path>,
    /// Explicit env file, replacing the engine's default `.env` lookup
    pub env_file: Option<&'a Path>,
    /// Interpolation environment
    pub environment: &'a Environment,
}

/// Loads a compose project into its resolved JSON model
pub trait ComposeEngine {
    /// Load and resolve a project; the returned value is a JSON object
    fn load(&self, request: &LoadRequest<'_>) -> Result<Value>;
}
