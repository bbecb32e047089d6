use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub const VTT_SUFFIX: &str = ".vtt";
pub const JSON_SUFFIX: &str = ".json";

pub fn ensure_dir(p: &Path) -> Result<()> {
    std::fs::create_dir_all(p).with_context(|| format!("create_dir_all {}", p.display()))
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}

pub fn is_vtt(path: &Path) -> bool {
    file_name(path).is_some_and(|n| n.ends_with(VTT_SUFFIX))
}

pub fn is_json(path: &Path) -> bool {
    file_name(path).is_some_and(|n| n.ends_with(JSON_SUFFIX))
}

fn swap_suffix(path: &Path, from: &str, to: &str) -> Option<PathBuf> {
    let stem = file_name(path)?.strip_suffix(from)?;
    Some(path.with_file_name(format!("{stem}{to}")))
}

/// `subs.vtt` -> `subs.json`. `None` when the name does not end in `.vtt`.
pub fn json_path_for(vtt: &Path) -> Option<PathBuf> {
    swap_suffix(vtt, VTT_SUFFIX, JSON_SUFFIX)
}

/// `subs.json` -> `subs.vtt`. `None` when the name does not end in `.json`.
pub fn vtt_sibling_of(json: &Path) -> Option<PathBuf> {
    swap_suffix(json, JSON_SUFFIX, VTT_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swaps_only_trailing_suffix() {
        assert_eq!(
            json_path_for(Path::new("a/subs.vtt.vtt")),
            Some(PathBuf::from("a/subs.vtt.json"))
        );
        assert_eq!(json_path_for(Path::new("a/subs.VTT")), None);
        assert_eq!(json_path_for(Path::new("a/vtt")), None);
        assert_eq!(
            vtt_sibling_of(Path::new("dir/x.json")),
            Some(PathBuf::from("dir/x.vtt"))
        );
    }

    #[test]
    fn hidden_names_still_match() {
        assert!(is_vtt(Path::new(".vtt")));
        assert_eq!(json_path_for(Path::new("d/.vtt")), Some(PathBuf::from("d/.json")));
        assert!(!is_json(Path::new("x.jsonl")));
    }
}
