//! Directory mode: find the `.vtt` files that need JSON and convert them one
//! at a time through a single shared session.

use crate::{
    convert::Options,
    engine::Engine,
    output::write_output,
    report::BatchSummary,
    session::Session,
    util::{is_json, is_vtt, json_path_for, vtt_sibling_of},
};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Collect work items under `root`, in walk order.
///
/// A `.json` with a `.vtt` sibling queues that `.vtt` (refresh). With
/// `create_new`, a `.vtt` without a `.json` sibling is queued as well. No path
/// is queued twice.
pub fn discover(root: &Path, create_new: bool) -> Vec<PathBuf> {
    let mut items = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("skipping unreadable entry: {err}");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();

        if is_json(path) {
            if let Some(vtt) = vtt_sibling_of(path).filter(|p| p.is_file()) {
                debug!("refresh {}", vtt.display());
                items.push(vtt);
            }
        } else if create_new && is_vtt(path) {
            let has_json = json_path_for(path).is_some_and(|p| p.is_file());
            if !has_json {
                debug!("new {}", path.display());
                items.push(path.to_path_buf());
            }
        }
    }
    items
}

/// Convert every item through `session`, last discovered first.
///
/// A file that fails to convert or write is counted and skipped. The session
/// is cleared after each converted file; a failed clear aborts the batch.
pub fn process_batch<E: Engine>(
    session: &mut Session<E>,
    mut items: Vec<PathBuf>,
    opts: &Options,
) -> Result<BatchSummary> {
    let mut summary = BatchSummary::new(items.len());

    while let Some(file) = items.pop() {
        let data = match session.convert(opts.mode, &file) {
            Ok(data) => data,
            Err(err) => {
                summary.record_failure();
                warn!("Couldn't write {}. {:#}", file.display(), err);
                continue;
            }
        };

        if !write_output(&data, opts.destination(&file).as_deref()) {
            summary.record_failure();
        }
        session
            .clear()
            .with_context(|| format!("after converting {}", file.display()))?;
    }

    Ok(summary)
}

/// Run a whole directory: one session, every discovered file, one summary.
pub fn convert_tree<E: Engine>(engine: E, root: &Path, opts: &Options) -> Result<BatchSummary> {
    let opts = opts.for_directory();
    let mut session = Session::create(engine);
    session.initialize()?;

    let items = discover(root, opts.create_new);
    info!("{} file(s) to convert under {}", items.len(), root.display());

    let result = process_batch(&mut session, items, &opts);
    if let Ok(summary) = &result {
        println!("{summary}");
    }
    session.shutdown();
    result
}
