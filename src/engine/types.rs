use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// Parser output after a flush: everything vtt.js reported for one file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VttDocument {
    #[serde(default)]
    pub regions: Vec<Value>,
    #[serde(default)]
    pub cues: Vec<Cue>,
    #[serde(default)]
    pub errors: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cue {
    #[serde(default)]
    pub id: String,
    pub start_time: f64,
    pub end_time: f64,
    #[serde(default)]
    pub text: String,
    /// Cue settings (line, position, align, region, ...) passed through as-is.
    #[serde(flatten)]
    pub settings: Map<String, Value>,
}

/// One line on the runner's stdin.
#[derive(Debug, Serialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Request<'a> {
    Init { vtt_js: &'a Path },
    Parse { path: &'a Path },
    Flush,
    Process { path: &'a Path },
    Clear,
    Shutdown,
}

impl Request<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Request::Init { .. } => "init",
            Request::Parse { .. } => "parse",
            Request::Flush => "flush",
            Request::Process { .. } => "process",
            Request::Clear => "clear",
            Request::Shutdown => "shutdown",
        }
    }
}

/// One line on the runner's stdout. `id` echoes the request it answers.
#[derive(Debug, Clone, Deserialize)]
pub struct Reply {
    #[serde(default)]
    pub id: Option<u64>,
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}
