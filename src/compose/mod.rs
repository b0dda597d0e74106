//! Compose-side plumbing
//!
//! Reading compose sources, building the interpolation environment and
//! shaping the resolved model. Loading itself is left to an engine.

pub mod environment;
pub mod normalize;
pub mod source;

pub use environment::Environment;
pub use source::{ComposeSource, LoadedSource};
