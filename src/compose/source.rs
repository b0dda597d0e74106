//! Compose sources and the YAML syntax gate

use crate::error::{ResolveError, Result};
use serde::Deserialize;
use std::io::Read;
use std::path::PathBuf;

/// File name reported for inline content
pub const INLINE_SOURCE_NAME: &str = "docker-compose.yml";

/// Where a compose document comes from
#[derive(Debug, Clone, PartialEq)]
pub enum ComposeSource {
    /// Compose file on disk
    File(PathBuf),
    /// Compose content read from stdin (`-f -`)
    Stdin,
    /// Compose content handed over directly, e.g. via `COMPOSE_CONTENT`
    Inline { name: String, content: String },
}

impl ComposeSource {
    /// Interpret a `-f` value
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            ComposeSource::Stdin
        } else {
            ComposeSource::File(PathBuf::from(arg))
        }
    }

    /// Whether the engine has to receive this source on its stdin
    pub fn is_streamed(&self) -> bool {
        !matches!(self, ComposeSource::File(_))
    }

    /// Display name used in messages
    pub fn name(&self) -> String {
        match self {
            ComposeSource::File(path) => path.display().to_string(),
            ComposeSource::Stdin => "-".to_string(),
            ComposeSource::Inline { name, .. } => name.clone(),
        }
    }

    /// Read the source content
    pub fn load(&self) -> Result<LoadedSource> {
        let content = match self {
            ComposeSource::File(path) => std::fs::read_to_string(path).map_err(|e| {
                parse_error(format!("open {}: {}", path.display(), e))
            })?,
            ComposeSource::Stdin => {
                let mut buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut buf)
                    .map_err(|e| parse_error(format!("read stdin: {}", e)))?;
                buf
            }
            ComposeSource::Inline { content, .. } => content.clone(),
        };

        Ok(LoadedSource {
            name: self.name(),
            path: match self {
                ComposeSource::File(path) => Some(path.clone()),
                _ => None,
            },
            content,
        })
    }
}

/// A compose source whose content has been read
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSource {
    /// Display name
    pub name: String,
    /// Path on disk, `None` for streamed content
    pub path: Option<PathBuf>,
    /// Raw YAML
    pub content: String,
}

impl LoadedSource {
    /// Check that the content is well-formed YAML with a mapping at the top
    ///
    /// Only syntax is checked here; compose semantics belong to the engine.
    pub fn preflight(&self) -> Result<()> {
        let mut documents = 0;

        for document in serde_yaml::Deserializer::from_str(&self.content) {
            let value = serde_yaml::Value::deserialize(document)
                .map_err(|e| parse_error(format!("{}: {}", self.name, e)))?;
            documents += 1;

            match value {
                serde_yaml::Value::Mapping(_) => {}
                serde_yaml::Value::Null => {
                    return Err(parse_error(format!("{}: empty compose file", self.name)));
                }
                _ => {
                    return Err(parse_error(format!(
                        "{}: top-level object must be a mapping",
                        self.name
                    )));
                }
            }
        }

        if documents == 0 {
            return Err(parse_error(format!("{}: empty compose file", self.name)));
        }

        Ok(())
    }
}

fn parse_error(detail: String) -> ResolveError {
    ResolveError::Parse(format!("Failed to parse compose file: {}", detail))
}
