use cue2json::config::Config;

#[test]
fn parse_example_config() {
    let raw = include_str!("../cue2json.example.toml");
    let cfg: Config = toml::from_str(raw).expect("parse TOML");
    assert_eq!(cfg.paths.vtt_js, "dist/vtt.min.js");
    assert_eq!(cfg.engine.request_timeout_seconds, 0);
    assert!(cfg.engine.env.is_empty());
}

#[test]
fn partial_config_keeps_defaults() {
    let cfg: Config = toml::from_str("[engine]\nnode_exe = \"/usr/bin/node\"\n").expect("parse TOML");
    assert_eq!(cfg.engine.node_exe, "/usr/bin/node");
    assert_eq!(cfg.engine.runner_script, "vtt_runner.js");
    assert_eq!(cfg.logging.level, "info");
    assert!(cfg.runner_script_path().ends_with("scripts/vtt_runner.js"));
}
