pub mod node;
pub mod types;

use anyhow::Result;
use serde_json::Value;
use std::path::Path;

pub use types::{Cue, Reply, Request, VttDocument};

/// The external WebVTT engine. Calls on one engine are strictly sequential.
pub trait Engine {
    /// Start the engine. May be slow (process launch, script load).
    fn initialize(&mut self) -> Result<()>;
    /// Feed one file through the grammar-level parser.
    fn parse(&mut self, path: &Path) -> Result<()>;
    /// Finish parsing and hand back the accumulated document.
    fn flush(&mut self) -> Result<VttDocument>;
    /// Run the full processing model over one file.
    fn process(&mut self, path: &Path) -> Result<Value>;
    /// Reset parser state without restarting the engine.
    fn clear(&mut self) -> Result<()>;
    /// Release engine resources. Must tolerate being called when not running.
    fn shutdown(&mut self) -> Result<()>;
}
