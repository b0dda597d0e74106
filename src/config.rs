//! Runtime settings derived from an invocation

use crate::cli::Invocation;
use crate::compose::environment::DEFAULT_ENV_FILE;
use crate::compose::source::ComposeSource;
use crate::engine::external::DEFAULT_ENGINE;
use crate::error::{ResolveError, Result};
use std::path::{Path, PathBuf};

/// Resolved settings for one run
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Engine command line
    pub engine: String,
    /// Directory `.env` is looked up in
    pub project_directory: PathBuf,
    /// Whether the directory was given explicitly and must be passed on
    pub explicit_project_directory: bool,
    /// Env file to merge, if any
    pub env_file: Option<PathBuf>,
}

impl Settings {
    /// Derive settings, using `cwd` when no other project directory applies
    pub fn from_invocation(invocation: &Invocation, cwd: &Path) -> Result<Self> {
        let engine = invocation
            .engine
            .clone()
            .unwrap_or_else(|| DEFAULT_ENGINE.to_string());

        let (project_directory, explicit_project_directory) =
            match &invocation.project_directory {
                Some(dir) => (dir.clone(), true),
                None => (first_file_directory(&invocation.sources, cwd), false),
            };

        let env_file = match &invocation.env_file {
            Some(path) if !path.is_file() => {
                return Err(ResolveError::Config(format!(
                    "Failed to create compose project options: env file {} not found",
                    path.display()
                )));
            }
            Some(path) => Some(path.clone()),
            None => Some(project_directory.join(DEFAULT_ENV_FILE)).filter(|p| p.is_file()),
        };

        Ok(Self {
            engine,
            project_directory,
            explicit_project_directory,
            env_file,
        })
    }
}

fn first_file_directory(sources: &[ComposeSource], cwd: &Path) -> PathBuf {
    sources
        .iter()
        .find_map(|s| match s {
            ComposeSource::File(path) => Some(path),
            _ => None,
        })
        .and_then(|p| p.parent())
        .filter(|p| !p.as_os_str().is_empty())
        .map(|p| cwd.join(p))
        .unwrap_or_else(|| cwd.to_path_buf())
}
