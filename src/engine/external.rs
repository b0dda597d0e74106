//! Engine backed by an external Compose CLI
//!
//! Runs `<engine> -f <file>... -p <name> config --format json`, which is what
//! `docker compose` (compose-go) and compatible tools understand. The
//! engine's stderr is relayed unchanged so its log lines reach the caller in
//! their original form.

use super::logline::Diagnostic;
use super::{ComposeEngine, LoadRequest};
use crate::error::{ResolveError, Result};
use serde_json::Value;
use std::ffi::OsString;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

/// Engine command used when none is configured
pub const DEFAULT_ENGINE: &str = "docker compose";

/// External Compose CLI engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalEngine {
    program: String,
    leading_args: Vec<String>,
}

impl ExternalEngine {
    /// Create from a command line such as `docker compose` or `podman compose`
    ///
    /// The command is split with shell quoting rules. A command that names an
    /// existing file as a whole is taken as the program even if it contains
    /// spaces.
    pub fn new(command: &str) -> Result<Self> {
        let command = command.trim();
        if !command.is_empty() && Path::new(command).is_file() {
            return Ok(Self {
                program: command.to_string(),
                leading_args: Vec::new(),
            });
        }

        let parts = shlex::split(command).ok_or_else(|| {
            ResolveError::Config(format!(
                "Compose engine command has unbalanced quotes: {}",
                command
            ))
        })?;
        let mut parts = parts.into_iter();
        let program = parts
            .next()
            .ok_or_else(|| ResolveError::Config("Compose engine command is empty".to_string()))?;

        Ok(Self {
            program,
            leading_args: parts.collect(),
        })
    }

    /// Arguments passed to the engine for a request
    pub fn args(&self, request: &LoadRequest<'_>) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.leading_args.iter().map(OsString::from).collect();

        for source in request.sources {
            args.push("-f".into());
            match &source.path {
                Some(path) => args.push(path.clone().into_os_string()),
                None => args.push("-".into()),
            }
        }

        args.push("-p".into());
        args.push(request.project_name.into());

        if let Some(dir) = request.project_directory {
            args.push("--project-directory".into());
            args.push(dir.as_os_str().to_os_string());
        }

        if let Some(env_file) = request.env_file {
            args.push("--env-file".into());
            args.push(env_file.as_os_str().to_os_string());
        }

        args.extend(["config", "--format", "json"].map(OsString::from));
        args
    }
}

impl ComposeEngine for ExternalEngine {
    fn load(&self, request: &LoadRequest<'_>) -> Result<Value> {
        let stdin_content = request
            .sources
            .iter()
            .find(|s| s.path.is_none())
            .map(|s| s.content.as_str());

        let args = self.args(request);
        debug!(program = %self.program, ?args, "running compose engine");

        let mut child = Command::new(&self.program)
            .args(&args)
            .env_clear()
            .envs(request.environment.iter())
            .stdin(if stdin_content.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                ResolveError::Config(format!(
                    "Failed to start compose engine `{}`: {}",
                    self.program, e
                ))
            })?;

        if let (Some(content), Some(mut stdin)) = (stdin_content, child.stdin.take()) {
            match stdin.write_all(content.as_bytes()) {
                // The engine closed stdin early; its exit status tells why.
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
                Err(e) => {
                    return Err(ResolveError::Config(format!(
                        "Failed to write to compose engine: {}",
                        e
                    )));
                }
                Ok(()) => {}
            }
        }

        let output = child.wait_with_output().map_err(|e| {
            ResolveError::Config(format!("Failed to wait for compose engine: {}", e))
        })?;

        if let Err(e) = relay(&output.stderr, std::io::stderr().lock()) {
            debug!(error = %e, "failed to relay engine stderr");
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let diagnostics = Diagnostic::parse_all(&stderr);
        trace_diagnostics(&diagnostics);

        if !output.status.success() {
            let reason = diagnostics
                .iter()
                .find(|d| d.is_failure())
                .or_else(|| diagnostics.last())
                .map(|d| d.message.clone())
                .unwrap_or_else(|| format!("compose engine exited with {}", output.status));
            return Err(ResolveError::Parse(format!(
                "Failed to parse compose file: {}",
                reason
            )));
        }

        parse_project(&output.stdout)
    }
}

/// Decode the engine's stdout into a project object
pub fn parse_project(stdout: &[u8]) -> Result<Value> {
    let project: Value = serde_json::from_slice(stdout).map_err(|e| {
        ResolveError::Parse(format!(
            "Failed to marshal compose project to JSON: {}",
            e
        ))
    })?;

    if !project.is_object() {
        return Err(ResolveError::Parse(
            "Failed to marshal compose project to JSON: expected an object".to_string(),
        ));
    }

    Ok(project)
}

/// Copy the engine's stderr through byte for byte
pub fn relay<W: Write>(stderr: &[u8], mut out: W) -> std::io::Result<()> {
    if stderr.is_empty() {
        return Ok(());
    }
    out.write_all(stderr)?;
    if !stderr.ends_with(b"\n") {
        out.write_all(b"\n")?;
    }
    out.flush()
}

fn trace_diagnostics(diagnostics: &[Diagnostic]) {
    for d in diagnostics {
        match d.level {
            Some(level) => debug!(level = %level, "engine: {}", d.message),
            None => debug!(line = %d.message, "engine stderr"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::environment::Environment;
    use crate::compose::source::LoadedSource;
    use std::path::{Path, PathBuf};

    fn file(path: &str) -> LoadedSource {
        LoadedSource {
            name: path.to_string(),
            path: Some(PathBuf::from(path)),
            content: "services: {}".to_string(),
        }
    }

    #[test]
    fn test_new_splits_command() {
        let engine = ExternalEngine::new("podman  compose").unwrap();
        assert_eq!(engine.program, "podman");
        assert_eq!(engine.leading_args, vec!["compose"]);

        let engine = ExternalEngine::new(DEFAULT_ENGINE).unwrap();
        assert_eq!(engine.program, "docker");
        assert_eq!(engine.leading_args, vec!["compose"]);
    }

    #[test]
    fn test_new_honours_quotes() {
        let engine = ExternalEngine::new(r#""/opt/my tools/docker" compose"#).unwrap();
        assert_eq!(engine.program, "/opt/my tools/docker");
        assert_eq!(engine.leading_args, vec!["compose"]);

        let err = ExternalEngine::new(r#""/opt/my tools/docker compose"#).unwrap_err();
        assert_eq!(err.name(), "ConfigError");
    }

    #[test]
    fn test_new_accepts_existing_path_with_spaces() {
        let dir = tempfile::tempdir().unwrap();
        let program = dir.path().join("my engine");
        std::fs::write(&program, "").unwrap();

        let engine = ExternalEngine::new(program.to_str().unwrap()).unwrap();
        assert_eq!(engine.program, program.to_str().unwrap());
        assert!(engine.leading_args.is_empty());
    }

    #[test]
    fn test_relay_is_verbatim() {
        let line = br#"time="2025-01-01T00:00:00Z" level=warning msg="the attribute `version` is obsolete""#;
        let mut out = Vec::new();
        relay(line, &mut out).unwrap();
        assert_eq!(&out[..line.len()], &line[..]);
        assert_eq!(out.len(), line.len() + 1);

        let mut out = Vec::new();
        relay(b"", &mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_new_rejects_empty_command() {
        let err = ExternalEngine::new("   ").unwrap_err();
        assert_eq!(err.name(), "ConfigError");
    }

    #[test]
    fn test_args() {
        let sources = vec![
            file("compose.yml"),
            LoadedSource {
                name: "-".into(),
                path: None,
                content: "services: {}".into(),
            },
        ];
        let env = Environment::default();
        let request = LoadRequest {
            sources: &sources,
            project_name: "demo",
            project_directory: Some(Path::new("/srv/app")),
            env_file: Some(Path::new("/srv/app/other.env")),
            environment: &env,
        };

        let args: Vec<String> = ExternalEngine::new(DEFAULT_ENGINE)
            .unwrap()
            .args(&request)
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert_eq!(
            args,
            vec![
                "compose", "-f", "compose.yml", "-f", "-", "-p", "demo",
                "--project-directory", "/srv/app", "--env-file", "/srv/app/other.env",
                "config", "--format", "json"
            ]
        );
    }

    #[test]
    fn test_missing_program() {
        let sources = vec![file("compose.yml")];
        let env = Environment::default();
        let request = LoadRequest {
            sources: &sources,
            project_name: "demo",
            project_directory: None,
            env_file: None,
            environment: &env,
        };

        let err = ExternalEngine::new("/nonexistent/compose-engine")
            .unwrap()
            .load(&request)
            .unwrap_err();
        assert_eq!(err.name(), "ConfigError");
        assert!(err.message().contains("/nonexistent/compose-engine"));
    }

    #[test]
    fn test_parse_project() {
        let project = parse_project(br#"{"name":"demo","services":{}}"#).unwrap();
        assert_eq!(project["name"], "demo");

        let err = parse_project(b"WARN not json").unwrap_err();
        assert_eq!(err.name(), "ParseError");
        assert!(parse_project(b"[1, 2]").is_err());
    }
}
