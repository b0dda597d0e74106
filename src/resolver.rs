//! Source intake, environment propagation and engine delegation

use crate::cli::Invocation;
use crate::compose::environment::Environment;
use crate::compose::normalize::normalize;
use crate::compose::source::LoadedSource;
use crate::config::Settings;
use crate::engine::{ComposeEngine, LoadRequest};
use crate::error::Result;
use serde_json::Value;
use tracing::{debug, info};

/// Resolves an invocation into a compose project model
pub struct Resolver<E> {
    settings: Settings,
    engine: E,
}

impl<E: ComposeEngine> Resolver<E> {
    pub fn new(settings: Settings, engine: E) -> Self {
        Self { settings, engine }
    }

    /// Load every source, run it past the engine and shape the result
    pub fn resolve(&self, invocation: &Invocation, mut environment: Environment) -> Result<Value> {
        let sources = invocation
            .sources
            .iter()
            .map(|source| {
                let loaded = source.load()?;
                loaded.preflight()?;
                debug!(source = %loaded.name, bytes = loaded.content.len(), "compose source ready");
                Ok(loaded)
            })
            .collect::<Result<Vec<LoadedSource>>>()?;

        if let Some(env_file) = &self.settings.env_file {
            environment.merge_env_file(env_file)?;
        }

        let request = LoadRequest {
            sources: &sources,
            project_name: &invocation.project_name,
            project_directory: self
                .settings
                .explicit_project_directory
                .then_some(self.settings.project_directory.as_path()),
            env_file: invocation.env_file.as_deref(),
            environment: &environment,
        };

        info!(
            project = %invocation.project_name,
            sources = sources.len(),
            "loading compose project"
        );
        let mut project = self.engine.load(&request)?;

        if invocation.normalize {
            normalize(&mut project, &invocation.project_name);
        }

        Ok(project)
    }
}
