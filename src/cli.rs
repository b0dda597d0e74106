//! Command-line intake
//!
//! Turns argv plus the relevant environment variables into an [`Invocation`].
//! Three entry points are supported:
//!
//! - `compose-resolve -f <file> [-f <file>...] <project-name>`
//! - `compose-resolve <file> <project-name>`
//! - no arguments, with `COMPOSE_FILE` or `COMPOSE_CONTENT` plus `PROJECT_NAME`

use crate::compose::source::{ComposeSource, INLINE_SOURCE_NAME};
use crate::error::{ResolveError, Result};
use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::Parser;
use std::path::PathBuf;

/// Usage text appended to every argument error
pub const USAGE: &str = "
Usage: compose-resolve -f <compose-file> [-f <compose-file>...] <project-name>

Parses one or more compose files and outputs a structured response.

Arguments:
  -f <compose-file>  Path to a compose file to parse (can be specified multiple times with later files overriding earlier ones)
  <project-name>     Name of the project to use for the parsed output. It is recommended to use a UUID, as any fields which include
                     the project name need to be removed for normalization.

Example:
  compose-resolve -f docker-compose.yml -f docker-compose.override.yml my-project-name
";

/// Environment variable holding a list of compose files
pub const COMPOSE_FILE_ENV: &str = "COMPOSE_FILE";
/// Environment variable overriding the `COMPOSE_FILE` separator
pub const COMPOSE_PATH_SEPARATOR_ENV: &str = "COMPOSE_PATH_SEPARATOR";
/// Environment variable holding inline compose content
pub const COMPOSE_CONTENT_ENV: &str = "COMPOSE_CONTENT";
/// Environment variables consulted for the project name, in order
pub const PROJECT_NAME_ENV: &[&str] = &["PROJECT_NAME", "COMPOSE_PROJECT_NAME"];

#[cfg(windows)]
const DEFAULT_PATH_SEPARATOR: &str = ";";
#[cfg(not(windows))]
const DEFAULT_PATH_SEPARATOR: &str = ":";

/// compose-resolve - resolve compose files into a JSON project model
#[derive(Parser, Debug)]
#[command(name = "compose-resolve")]
#[command(author = "Evoker Industries")]
#[command(version)]
#[command(about = "Resolve Docker/Podman Compose files into a single JSON project model", long_about = None)]
pub struct Cli {
    /// Compose file (repeatable, later files override earlier ones; `-` reads stdin)
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    pub files: Vec<String>,

    /// Environment file used for interpolation (defaults to `.env` in the project directory)
    #[arg(long, value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    /// Project working directory (defaults to the directory of the first compose file)
    #[arg(long, value_name = "DIR")]
    pub project_directory: Option<PathBuf>,

    /// Compose engine command
    #[arg(long, env = "COMPOSE_ENGINE", value_name = "CMD")]
    pub engine: Option<String>,

    /// Strip project-specific fields from the resolved model
    #[arg(long)]
    pub normalize: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,

    /// `<project-name>` or `<compose-file> <project-name>`
    #[arg(value_name = "ARGS")]
    pub args: Vec<String>,
}

/// A fully resolved request to load a compose project
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    /// Compose sources in merge order
    pub sources: Vec<ComposeSource>,
    /// Project name handed to the engine
    pub project_name: String,
    /// Explicit environment file
    pub env_file: Option<PathBuf>,
    /// Explicit project directory
    pub project_directory: Option<PathBuf>,
    /// Engine command override
    pub engine: Option<String>,
    /// Apply normalization to the engine output
    pub normalize: bool,
}

impl Invocation {
    /// Build an invocation from parsed arguments and an environment lookup
    pub fn from_cli<F>(cli: Cli, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let mut positionals = cli.args.into_iter();
        let mut files = cli.files;
        let mut project_name = None;

        match (files.is_empty(), positionals.len()) {
            (_, 0) => {}
            (_, 1) => project_name = positionals.next(),
            (true, 2) => {
                files.extend(positionals.next());
                project_name = positionals.next();
            }
            (_, n) => {
                return Err(argument_error(&format!(
                    "Unexpected arguments: expected a single project name, got {} values",
                    n
                )));
            }
        }

        let mut sources: Vec<ComposeSource> =
            files.iter().map(|f| ComposeSource::from_arg(f)).collect();

        if sources.is_empty() {
            if let Some(list) = lookup(COMPOSE_FILE_ENV) {
                let separator = lookup(COMPOSE_PATH_SEPARATOR_ENV)
                    .unwrap_or_else(|| DEFAULT_PATH_SEPARATOR.to_string());
                sources = list
                    .split(separator.as_str())
                    .filter(|p| !p.trim().is_empty())
                    .map(|p| ComposeSource::from_arg(p.trim()))
                    .collect();
            } else if let Some(content) = lookup(COMPOSE_CONTENT_ENV) {
                sources.push(ComposeSource::Inline {
                    name: INLINE_SOURCE_NAME.to_string(),
                    content,
                });
            }
        }

        if sources.is_empty() {
            return Err(argument_error(
                "At least one compose file must be specified with -f",
            ));
        }

        let streamed = sources.iter().filter(|s| s.is_streamed()).count();
        if streamed > 1 {
            return Err(argument_error(
                "Only one compose source may be read from stdin",
            ));
        }

        let project_name = project_name
            .filter(|p| !p.is_empty())
            .or_else(|| PROJECT_NAME_ENV.iter().find_map(|key| lookup(*key)))
            .ok_or_else(|| argument_error("Project name is required"))?;

        Ok(Self {
            sources,
            project_name,
            env_file: cli.env_file,
            project_directory: cli.project_directory,
            engine: cli.engine.filter(|e| !e.trim().is_empty()),
            normalize: cli.normalize,
        })
    }
}

/// Wrap a message into an argument error carrying the usage text
pub fn argument_error(message: &str) -> ResolveError {
    ResolveError::Argument(format!("{}\n{}", message, USAGE))
}

/// Convert a clap parse failure into an argument error
///
/// Help and version requests are not failures and should be handled by the
/// caller before reaching this point.
pub fn usage_error(err: &clap::Error) -> ResolveError {
    let missing_file = err.kind() == ErrorKind::InvalidValue
        && match err.get(ContextKind::InvalidArg) {
            Some(ContextValue::String(arg)) => arg.contains("--file") || arg.starts_with("-f"),
            _ => err.to_string().contains("--file"),
        };

    if missing_file {
        return argument_error("Missing file path after -f flag");
    }

    let rendered = err.render().to_string();
    let first_line = rendered
        .lines()
        .find(|l| !l.trim().is_empty())
        .unwrap_or("Invalid arguments")
        .trim_start_matches("error: ")
        .to_string();
    argument_error(&first_line)
}
