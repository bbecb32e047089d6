use super::{Engine, Reply, Request, VttDocument};
use crate::config::Config;
use anyhow::{Context, Result, anyhow, bail};
use serde_json::Value;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// vtt.js hosted in a long-lived node process, one JSON request per line.
pub struct NodeEngine {
    cfg: Config,
    runner_script: PathBuf,
    node_exe: PathBuf,
    running: Option<Runner>,
    next_id: u64,
}

struct Runner {
    child: Child,
    stdin: ChildStdin,
    replies: Receiver<std::io::Result<String>>,
}

impl NodeEngine {
    pub fn new(cfg: &Config) -> Result<Self> {
        let runner_script = cfg.runner_script_path();
        if !runner_script.exists() {
            return Err(anyhow!(
                "missing engine runner script: {}",
                runner_script.display()
            ));
        }
        let node_exe = resolve_node_exe(&cfg.engine.node_exe);
        Ok(Self {
            cfg: cfg.clone(),
            runner_script,
            node_exe,
            running: None,
            next_id: 1,
        })
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    fn spawn(&self) -> Result<Runner> {
        debug!(
            "engine spawn {} {}",
            self.node_exe.display(),
            self.runner_script.display()
        );
        let mut cmd = Command::new(&self.node_exe);
        cmd.arg(&self.runner_script);
        cmd.stdin(Stdio::piped());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        for (k, v) in &self.cfg.engine.env {
            cmd.env(k, v);
        }

        let mut child = cmd.spawn().with_context(|| {
            format!(
                "spawning engine: {} {}",
                self.node_exe.display(),
                self.runner_script.display()
            )
        })?;
        let stdin = child.stdin.take().ok_or_else(|| anyhow!("no stdin"))?;
        let stdout = child.stdout.take().ok_or_else(|| anyhow!("no stdout"))?;
        let stderr = child.stderr.take().ok_or_else(|| anyhow!("no stderr"))?;

        // Both pipes are drained on their own threads so a chatty engine can't
        // block on a full buffer while we wait for a reply.
        let (tx, replies) = mpsc::channel();
        std::thread::spawn(move || {
            for line in BufReader::new(stdout).lines() {
                let failed = line.is_err();
                if tx.send(line).is_err() || failed {
                    break;
                }
            }
        });

        let keep_stderr = self.cfg.debug.keep_engine_stderr;
        std::thread::spawn(move || {
            for line in BufReader::new(stderr).lines().map_while(|l| l.ok()) {
                if keep_stderr {
                    debug!("engine stderr: {}", line.trim_end());
                }
            }
        });

        Ok(Runner {
            child,
            stdin,
            replies,
        })
    }

    /// Serialize `req` tagged with a fresh id.
    fn frame(&mut self, req: &Request<'_>) -> Result<(u64, String)> {
        let id = self.next_id;
        self.next_id += 1;
        let mut msg = serde_json::to_value(req)?;
        if let Value::Object(map) = &mut msg {
            map.insert("id".into(), Value::from(id));
        }
        let mut line = serde_json::to_string(&msg)?;
        line.push('\n');
        Ok((id, line))
    }

    fn request(&mut self, req: &Request<'_>) -> Result<Option<Value>> {
        let timeout = match self.cfg.engine.request_timeout_seconds {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        if self.running.is_none() {
            bail!("engine is not running");
        }
        let (id, line) = self.frame(req)?;
        let runner = self
            .running
            .as_mut()
            .ok_or_else(|| anyhow!("engine is not running"))?;

        debug!(cmd = req.name(), id, "engine request");
        let reply = match exchange(runner, id, &line, timeout) {
            Ok(reply) => reply,
            Err(err) => {
                // The process is unusable after a broken pipe or a missed reply.
                let status = self.kill();
                let err = match status {
                    Some(status) => err.context(format!("engine exited with {status}")),
                    None => err,
                };
                return Err(err.context(format!("engine {} failed", req.name())));
            }
        };

        if !reply.ok {
            let msg = reply
                .error
                .unwrap_or_else(|| format!("engine {} failed", req.name()));
            return Err(anyhow!(msg));
        }
        Ok(reply.data)
    }

    fn kill(&mut self) -> Option<ExitStatus> {
        let mut runner = self.running.take()?;
        drop(runner.stdin);
        if let Ok(Some(status)) = runner.child.try_wait() {
            return Some(status);
        }
        let _ = runner.child.kill();
        runner.child.wait().ok()
    }
}

/// Send one request and wait for the reply carrying its id. Any other stdout
/// line (console noise, a reply to an abandoned request) is skipped.
fn exchange(runner: &mut Runner, id: u64, line: &str, timeout: Option<Duration>) -> Result<Reply> {
    runner
        .stdin
        .write_all(line.as_bytes())
        .and_then(|_| runner.stdin.flush())
        .with_context(|| "writing to engine stdin")?;

    let deadline = timeout.map(|limit| Instant::now() + limit);
    loop {
        let received = match deadline {
            Some(deadline) => runner
                .replies
                .recv_timeout(deadline.saturating_duration_since(Instant::now())),
            None => runner
                .replies
                .recv()
                .map_err(|_| RecvTimeoutError::Disconnected),
        };
        let raw = match received {
            Ok(raw) => raw.with_context(|| "reading engine stdout")?,
            Err(RecvTimeoutError::Timeout) => {
                warn!("engine did not reply within {:?}", timeout.unwrap_or_default());
                bail!("engine reply timed out")
            }
            Err(RecvTimeoutError::Disconnected) => bail!("engine closed its output"),
        };

        match serde_json::from_str::<Reply>(&raw) {
            Ok(reply) if reply.id == Some(id) => return Ok(reply),
            _ => debug!("ignoring engine stdout: {}", raw.trim_end()),
        }
    }
}

fn resolve_node_exe(raw: &str) -> PathBuf {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("auto") {
        if let Ok(env_val) = std::env::var("CUE2JSON_NODE") {
            let p = expand_tilde(&env_val);
            if p.exists() {
                return p;
            }
        }
        return PathBuf::from("node");
    }
    expand_tilde(raw)
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Ok(home) = std::env::var("HOME")
    {
        return PathBuf::from(home).join(rest);
    }
    PathBuf::from(path)
}

impl Engine for NodeEngine {
    fn initialize(&mut self) -> Result<()> {
        if self.running.is_some() {
            return Ok(());
        }
        let vtt_js = self.cfg.vtt_js_path();
        let vtt_js = vtt_js
            .canonicalize()
            .with_context(|| format!("locating vtt.js build: {}", vtt_js.display()))?;

        self.running = Some(self.spawn()?);
        self.request(&Request::Init { vtt_js: &vtt_js })?;
        debug!("engine ready");
        Ok(())
    }

    fn parse(&mut self, path: &Path) -> Result<()> {
        self.request(&Request::Parse { path })?;
        Ok(())
    }

    fn flush(&mut self) -> Result<VttDocument> {
        let data = self
            .request(&Request::Flush)?
            .ok_or_else(|| anyhow!("engine flush returned no document"))?;
        serde_json::from_value(data).with_context(|| "decoding flushed document")
    }

    fn process(&mut self, path: &Path) -> Result<Value> {
        self.request(&Request::Process { path })?
            .ok_or_else(|| anyhow!("engine process returned no output: {}", path.display()))
    }

    fn clear(&mut self) -> Result<()> {
        self.request(&Request::Clear)?;
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        if self.running.is_none() {
            return Ok(());
        }
        let (_, line) = self.frame(&Request::Shutdown)?;
        let Some(mut runner) = self.running.take() else {
            return Ok(());
        };

        if let Err(err) = runner.stdin.write_all(line.as_bytes()) {
            debug!("engine shutdown request not delivered: {err}");
        }
        drop(runner.stdin);

        let grace = Duration::from_millis(self.cfg.engine.shutdown_grace_ms);
        let start = Instant::now();
        loop {
            if let Some(status) = runner.child.try_wait().with_context(|| "try_wait")? {
                debug!("engine exited with {status}");
                return Ok(());
            }
            if start.elapsed() > grace {
                warn!("engine still running after {:?}; killing it", grace);
                let _ = runner.child.kill();
                runner.child.wait().with_context(|| "wait after kill")?;
                return Ok(());
            }
            std::thread::sleep(Duration::from_millis(50));
        }
    }
}

impl Drop for NodeEngine {
    fn drop(&mut self) {
        self.kill();
    }
}
