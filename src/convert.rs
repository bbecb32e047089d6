use crate::{
    engine::{Engine, VttDocument},
    output::write_output,
    session::Session,
    util::json_path_for,
};
use anyhow::Result;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// Parser output (cues, regions, errors).
    Parser,
    /// Output of the WebVTT processing model.
    ProcessingModel,
}

/// Invocation options, fixed for the whole run.
#[derive(Debug, Clone)]
pub struct Options {
    pub source: PathBuf,
    pub copy: bool,
    pub mode: ParseMode,
    pub create_new: bool,
}

impl Options {
    /// Directory runs always write files next to their sources.
    pub fn for_directory(&self) -> Self {
        Self {
            copy: true,
            ..self.clone()
        }
    }

    /// Where the JSON for `vtt` goes; `None` means stdout.
    pub fn destination(&self, vtt: &Path) -> Option<PathBuf> {
        if self.copy { json_path_for(vtt) } else { None }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Conversion {
    Parsed(VttDocument),
    Processed(Value),
}

/// Convert one `.vtt` file with a session of its own.
pub fn convert_file<E: Engine>(engine: E, path: &Path, opts: &Options) -> Result<()> {
    let mut session = Session::create(engine);
    session.initialize()?;

    let result = session.convert(opts.mode, path);
    let data = match result {
        Ok(data) => data,
        Err(err) => {
            session.shutdown();
            return Err(err);
        }
    };

    // A failed write is already logged; the run itself still succeeds.
    write_output(&data, opts.destination(path).as_deref());
    session.shutdown();
    Ok(())
}
