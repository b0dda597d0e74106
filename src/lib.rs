//! compose-resolve - resolve Docker/Podman Compose files into JSON
//!
//! A thin adapter around an external compose-specification engine:
//!
//! - Argument and environment intake (`-f` files, `COMPOSE_FILE`, `COMPOSE_CONTENT`)
//! - `.env` propagation for interpolation
//! - Delegation to `docker compose config` or a compatible engine
//! - A single-line JSON envelope for success and failure

pub mod cli;
pub mod compose;
pub mod config;
pub mod engine;
pub mod error;
pub mod resolver;
pub mod response;

pub use error::{ResolveError, Result};
