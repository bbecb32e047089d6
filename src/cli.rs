use crate::{
    config::Config,
    convert::{Options, ParseMode, convert_file},
    engine::node::NodeEngine,
    util::{ensure_dir, is_vtt},
    walk::convert_tree,
};
use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "cue2json", version)]
#[command(about = "Parse VTT files into JSON.")]
pub struct Args {
    /// Path to a VTT file or directory that contains VTT files to be processed.
    #[arg(short = 'v', long = "vtt", value_name = "PATH")]
    pub vtt: PathBuf,

    /// Copies output to a JSON file with the same name as the source VTT file.
    #[arg(short, long)]
    pub copy: bool,

    /// Generate JSON from running the WebVTT processing model instead of the parser.
    #[arg(short, long)]
    pub process: bool,

    /// Creates a new JSON file for any VTT file that does not have one (directory mode).
    #[arg(short, long)]
    pub new: bool,

    /// Path to config TOML. If omitted, uses ./cue2json.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Args {
    pub fn options(&self) -> Options {
        Options {
            source: self.vtt.clone(),
            copy: self.copy,
            mode: if self.process {
                ParseMode::ProcessingModel
            } else {
                ParseMode::Parser
            },
            create_new: self.new,
        }
    }
}

pub fn dispatch(args: Args) -> Result<()> {
    let cfg = match resolve_config_path(args.config.as_deref()) {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };
    let log_path = resolve_log_path(&cfg);
    let _guard = init_logging(&args, &cfg, log_path.as_deref())?;

    let vtt_js = cfg.vtt_js_path();
    if !vtt_js.exists() {
        bail!(
            "You must first build vtt.js by running `grunt build` (missing {})",
            vtt_js.display()
        );
    }

    let opts = args.options();
    run(&cfg, &opts)
}

fn run(cfg: &Config, opts: &Options) -> Result<()> {
    let source = &opts.source;
    let meta = std::fs::symlink_metadata(source)
        .with_context(|| format!("stat {}", source.display()))?;

    if meta.is_dir() {
        debug!("directory mode: {}", source.display());
        let engine = NodeEngine::new(cfg)?;
        convert_tree(engine, source, opts)?;
        return Ok(());
    }

    if !is_vtt(source) {
        bail!("File must be a VTT file: {}", source.display());
    }
    let engine = NodeEngine::new(cfg)?;
    convert_file(engine, source, opts)
}

fn resolve_config_path(user: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = user {
        return Some(p.to_path_buf());
    }
    let default = PathBuf::from("cue2json.toml");
    default.exists().then_some(default)
}

fn init_logging(args: &Args, cfg: &Config, file_path: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout is reserved for JSON and the batch summary.
    let stderr_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = if let Some(path) = file_path {
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        ensure_dir(parent)?;
        let file = std::fs::File::create(path)
            .with_context(|| format!("create log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn resolve_log_path(cfg: &Config) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }
    if cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from("cue2json.log"));
    }
    Some(PathBuf::from(&cfg.logging.file_path))
}
