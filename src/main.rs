//! compose-resolve - resolve compose files into a JSON project model
//!
//! This is the CLI entry point. The resolved project is written to stdout as
//! `{"success":true,"data":...}`; any failure is written to stderr as
//! `{"success":false,"error":{"name":...,"message":...}}` with exit code 1.

use clap::error::ErrorKind;
use clap::Parser;
use compose_resolve::cli::{usage_error, Cli, Invocation};
use compose_resolve::compose::Environment;
use compose_resolve::config::Settings;
use compose_resolve::engine::ExternalEngine;
use compose_resolve::error::{ResolveError, Result};
use compose_resolve::resolver::Resolver;
use compose_resolve::response::Response;
use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(err) = run() {
        if let Err(encode) = Response::failure(&err).write_line(std::io::stderr().lock()) {
            eprintln!("{}: {}", err.name(), err.message());
            eprintln!("{}: {}", encode.name(), encode.message());
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => return Err(usage_error(&e)),
    };

    init_logging(cli.debug);

    let invocation = Invocation::from_cli(cli, |key| std::env::var(key).ok())?;

    let cwd = std::env::current_dir().map_err(|e| {
        ResolveError::Config(format!(
            "Failed to create compose project options: {}",
            e
        ))
    })?;
    let settings = Settings::from_invocation(&invocation, &cwd)?;
    let engine = ExternalEngine::new(&settings.engine)?;

    let resolver = Resolver::new(settings, engine);
    let project = resolver.resolve(&invocation, Environment::from_process())?;

    Response::success(project).write_line(std::io::stdout().lock())
}

/// Logs go to stderr; stdout carries nothing but the response
fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .init();
}
