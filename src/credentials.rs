//! Reading and writing JSON credential and token files.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tempfile::NamedTempFile;

use crate::error::{IngestError, Result};

/// Read a JSON document from a credential file.
///
/// Every failure is a [`IngestError::ConfigError`] naming the file.
pub fn load_credential_json<P: AsRef<Path>>(path: P) -> Result<Value> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(IngestError::ConfigError(format!(
            "The `{}` file doesn't exist",
            path.display()
        )));
    }
    if !path.is_file() {
        return Err(IngestError::ConfigError(format!(
            "`{}` is not a file",
            path.display()
        )));
    }

    let content = fs::read_to_string(path).map_err(|e| {
        IngestError::ConfigError(format!("The `{}` file is not readable: {}", path.display(), e))
    })?;

    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Null) | Err(_) => Err(IngestError::ConfigError(format!(
            "The `{}` file content is not a valid JSON",
            path.display()
        ))),
        Ok(value) => Ok(value),
    }
}

/// Read a credential file and deserialize it into `T`.
pub fn load_credential<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let path = path.as_ref();
    let value = load_credential_json(path)?;
    serde_json::from_value(value).map_err(|e| {
        IngestError::ConfigError(format!(
            "The `{}` file has an unexpected structure: {}",
            path.display(),
            e
        ))
    })
}

/// Write `data` as pretty-printed JSON, replacing the file atomically.
///
/// The content goes to a temporary file in the target directory first and is
/// then renamed over `path`, so readers never see a half-written token.
pub fn save_credential_json<T: Serialize + ?Sized, P: AsRef<Path>>(path: P, data: &T) -> Result<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;

    let content = serde_json::to_string_pretty(data)?;

    let mut temp = NamedTempFile::new_in(&dir)?;
    temp.write_all(content.as_bytes())?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_save_then_load_preserves_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("token.json");
        let token = json!({
            "access_token": "ya29.token",
            "expires_in": 3599,
            "created": 1700000000,
            "refresh_token": "1//refresh",
            "note": "Zoë's token ✓"
        });

        save_credential_json(&path, &token).unwrap();
        let loaded = load_credential_json(&path).unwrap();

        assert_eq!(loaded, token);
    }

    #[test]
    fn test_save_is_pretty_and_unescaped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("token.json");

        save_credential_json(&path, &json!({"name": "Zoë"})).unwrap();
        let raw = fs::read_to_string(&path).unwrap();

        assert!(raw.contains("Zoë"));
        assert!(raw.contains('\n'));
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/deeper/token.json");

        save_credential_json(&path, &json!({"a": 1})).unwrap();
        assert!(path.is_file());
    }

    #[test]
    fn test_save_replaces_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("token.json");

        save_credential_json(&path, &json!({"access_token": "old"})).unwrap();
        save_credential_json(&path, &json!({"access_token": "new"})).unwrap();

        let loaded = load_credential_json(&path).unwrap();
        assert_eq!(loaded["access_token"], "new");
    }

    #[test]
    fn test_load_missing_file_names_path() {
        let err = load_credential_json("/nonexistent/secret.json").unwrap_err();
        assert!(matches!(err, IngestError::ConfigError(_)));
        assert!(err.to_string().contains("/nonexistent/secret.json"));
    }

    #[test]
    fn test_load_directory_is_rejected() {
        let dir = TempDir::new().unwrap();
        let err = load_credential_json(dir.path()).unwrap_err();
        assert!(err.to_string().contains("not a file"));
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "not valid json").unwrap();

        let err = load_credential_json(&path).unwrap_err();
        assert!(err.to_string().contains("not a valid JSON"));

        fs::write(&path, "null").unwrap();
        assert!(load_credential_json(&path).is_err());
    }
}
