use anyhow::{Context, Result};
use serde_json::Value;

use crate::Source;

/// Reads the whole data source and parses it as a single JSON document.
pub fn read_params(source: &Source) -> Result<Value> {
    let bytes = source
        .read()
        .with_context(|| format!("Error reading JSON data from {}", source))?;
    serde_json::from_slice(&bytes).with_context(|| format!("Error parsing JSON data from {}", source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn reads_nested_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, r#"{"name": "World", "tags": [1, true, null]}"#).unwrap();

        let params = read_params(&Source::File(path)).unwrap();
        assert_eq!(params, json!({"name": "World", "tags": [1, true, null]}));
    }

    #[test]
    fn scalar_documents_are_accepted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, "  42\n").unwrap();

        assert_eq!(read_params(&Source::File(path)).unwrap(), json!(42));
    }

    #[test]
    fn malformed_json_names_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, r#"{"name": "#).unwrap();

        let err = read_params(&Source::File(path)).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.starts_with("Error parsing JSON data from"), "{}", message);
        assert!(message.contains("broken.json"), "{}", message);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = TempDir::new().unwrap();
        let err = read_params(&Source::File(dir.path().join("nope.json"))).unwrap_err();
        assert!(err.to_string().starts_with("Error reading JSON data from"));
        assert!(err.downcast_ref::<std::io::Error>().is_some());
    }
}
