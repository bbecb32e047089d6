#![allow(dead_code)]

use anyhow::{Result, anyhow};
use cue2json::engine::{Cue, Engine, VttDocument};
use serde_json::{Map, Value, json};
use std::cell::RefCell;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Initialize,
    Parse(PathBuf),
    Flush,
    Process(PathBuf),
    Clear,
    Shutdown,
}

/// In-process stand-in for the vtt.js engine. Records every call.
#[derive(Clone, Default)]
pub struct ScriptedEngine {
    pub calls: Rc<RefCell<Vec<Call>>>,
    pub fail_init: bool,
    pub fail_clear: bool,
    pub fail_paths: HashSet<PathBuf>,
    pub pending: Rc<RefCell<Option<PathBuf>>>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(paths: &[&Path]) -> Self {
        Self {
            fail_paths: paths.iter().map(|p| p.to_path_buf()).collect(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls.borrow().iter().filter(|c| *c == call).count()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

pub fn document_for(path: &Path) -> VttDocument {
    VttDocument {
        regions: vec![],
        cues: vec![Cue {
            id: path.display().to_string(),
            start_time: 0.0,
            end_time: 1.5,
            text: "hello".into(),
            settings: Map::new(),
        }],
        errors: vec![],
    }
}

impl Engine for ScriptedEngine {
    fn initialize(&mut self) -> Result<()> {
        self.record(Call::Initialize);
        if self.fail_init {
            return Err(anyhow!("browser failed to launch"));
        }
        Ok(())
    }

    fn parse(&mut self, path: &Path) -> Result<()> {
        self.record(Call::Parse(path.to_path_buf()));
        if self.fail_paths.contains(path) {
            return Err(anyhow!("bad cue timings in {}", path.display()));
        }
        *self.pending.borrow_mut() = Some(path.to_path_buf());
        Ok(())
    }

    fn flush(&mut self) -> Result<VttDocument> {
        self.record(Call::Flush);
        let path = self
            .pending
            .borrow_mut()
            .take()
            .ok_or_else(|| anyhow!("flush without parse"))?;
        Ok(document_for(&path))
    }

    fn process(&mut self, path: &Path) -> Result<Value> {
        self.record(Call::Process(path.to_path_buf()));
        if self.fail_paths.contains(path) {
            return Err(anyhow!("processing failed for {}", path.display()));
        }
        Ok(json!([{ "source": path.display().to_string(), "html": "<div>hello</div>" }]))
    }

    fn clear(&mut self) -> Result<()> {
        self.record(Call::Clear);
        if self.fail_clear {
            return Err(anyhow!("engine went away"));
        }
        *self.pending.borrow_mut() = None;
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        self.record(Call::Shutdown);
        Ok(())
    }
}

pub fn write_file(path: &Path, body: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, body).unwrap();
}

pub const SIMPLE_VTT: &str = "WEBVTT\n\n00:00:00.000 --> 00:00:01.500\nhello\n";
