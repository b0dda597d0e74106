//! Interpolation environment handed to the engine

use crate::error::{ResolveError, Result};
use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::Path;
use tracing::debug;

/// Default env file name looked up in the project directory
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Variables available for interpolation
///
/// Names and values are kept as OS strings so that nothing inherited from
/// the process is lost on the way to the engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Environment {
    vars: BTreeMap<OsString, OsString>,
}

impl Environment {
    /// Snapshot of the current process environment
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars_os().collect(),
        }
    }

    /// Build from explicit pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<OsString>,
        V: Into<OsString>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Merge variables from an env file; variables already set keep their value
    pub fn merge_env_file(&mut self, path: &Path) -> Result<usize> {
        let iter = dotenvy::from_path_iter(path).map_err(|e| config_error(path, e))?;

        let mut added = 0;
        for item in iter {
            let (key, value) = item.map_err(|e| config_error(path, e))?;
            let key = OsString::from(key);
            if !self.vars.contains_key(&key) {
                self.vars.insert(key, value.into());
                added += 1;
            }
        }

        debug!(path = %path.display(), added, "loaded env file");
        Ok(added)
    }

    /// Look up a variable holding valid unicode
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(OsStr::new(key)).and_then(|v| v.to_str())
    }

    /// Iterate over all variables in key order
    pub fn iter(&self) -> impl Iterator<Item = (&OsStr, &OsStr)> {
        self.vars.iter().map(|(k, v)| (k.as_os_str(), v.as_os_str()))
    }
}

fn config_error(path: &Path, err: dotenvy::Error) -> ResolveError {
    ResolveError::Config(format!(
        "Failed to create compose project options: {}: {}",
        path.display(),
        err
    ))
}
