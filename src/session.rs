//! Lifecycle of one engine instance: created, initialized, reused across files
//! via `clear`, and shut down exactly once.

use crate::{
    convert::{Conversion, ParseMode},
    engine::{Engine, VttDocument},
};
use anyhow::{Context, Result, anyhow};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Created,
    Ready,
    ShutDown,
}

pub struct Session<E: Engine> {
    engine: E,
    state: SessionState,
}

impl<E: Engine> Session<E> {
    pub fn create(engine: E) -> Self {
        Self {
            engine,
            state: SessionState::Created,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Start the engine. On failure the session is already shut down when the
    /// error comes back.
    pub fn initialize(&mut self) -> Result<()> {
        match self.state {
            SessionState::Ready => return Ok(()),
            SessionState::ShutDown => return Err(anyhow!("session already shut down")),
            SessionState::Created => {}
        }
        if let Err(err) = self.engine.initialize() {
            self.shutdown();
            return Err(err.context("Unable to initialize the WebVTT engine"));
        }
        self.state = SessionState::Ready;
        debug!("session ready");
        Ok(())
    }

    fn ensure_ready(&self) -> Result<()> {
        match self.state {
            SessionState::Ready => Ok(()),
            SessionState::Created => Err(anyhow!("session used before initialize")),
            SessionState::ShutDown => Err(anyhow!("session already shut down")),
        }
    }

    /// Grammar-level parse followed by a flush.
    pub fn parse_file(&mut self, path: &Path) -> Result<VttDocument> {
        self.ensure_ready()?;
        self.engine
            .parse(path)
            .with_context(|| format!("parsing {}", path.display()))?;
        self.engine
            .flush()
            .with_context(|| format!("flushing parser for {}", path.display()))
    }

    pub fn process_file(&mut self, path: &Path) -> Result<Value> {
        self.ensure_ready()?;
        self.engine
            .process(path)
            .with_context(|| format!("running processing model on {}", path.display()))
    }

    pub fn convert(&mut self, mode: ParseMode, path: &Path) -> Result<Conversion> {
        match mode {
            ParseMode::Parser => self.parse_file(path).map(Conversion::Parsed),
            ParseMode::ProcessingModel => self.process_file(path).map(Conversion::Processed),
        }
    }

    pub fn clear(&mut self) -> Result<()> {
        self.ensure_ready()?;
        self.engine.clear().with_context(|| "resetting parser state")
    }

    /// Safe to call repeatedly; only the first call reaches the engine.
    pub fn shutdown(&mut self) {
        if self.state == SessionState::ShutDown {
            return;
        }
        self.state = SessionState::ShutDown;
        if let Err(err) = self.engine.shutdown() {
            warn!("engine shutdown failed: {:#}", err);
        }
        debug!("session shut down");
    }
}

impl<E: Engine> Drop for Session<E> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
