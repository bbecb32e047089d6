use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use tracing::{error, info};

/// Pretty JSON with two-space indentation.
pub fn render_json<T: Serialize + ?Sized>(data: &T) -> Result<String> {
    serde_json::to_string_pretty(data).with_context(|| "Unable to jsonify data")
}

/// Print `data` as JSON to stdout, or write it to `dest` with a trailing
/// newline. Failures are logged and reported as `false`.
pub fn write_output<T: Serialize + ?Sized>(data: &T, dest: Option<&Path>) -> bool {
    let json = match render_json(data) {
        Ok(json) => json,
        Err(err) => {
            error!("{:#}", err);
            return false;
        }
    };

    let Some(path) = dest else {
        println!("{json}");
        return true;
    };

    info!("Writing {}", path.display());
    match std::fs::write(path, json + "\n") {
        Ok(()) => true,
        Err(err) => {
            error!("Unable to write output. {}: {}", path.display(), err);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::ser::Error as _;
    use serde_json::json;

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("cyclic"))
        }
    }

    #[test]
    fn writes_pretty_json_with_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        assert!(write_output(&json!({"cues": [1]}), Some(&path)));
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "{\n  \"cues\": [\n    1\n  ]\n}\n");
    }

    #[test]
    fn soft_fails_on_bad_destination() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.json");
        assert!(!write_output(&json!({}), Some(&path)));
        assert!(!path.exists());
    }

    #[test]
    fn soft_fails_on_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        assert!(!write_output(&Unserializable, Some(&path)));
        assert!(!path.exists());
    }
}
