use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// Failure to discover or load an input transcript
#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to list input directory {path:?}")]
    ListDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read file {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("file {path:?} is not valid UTF-8 (first bad byte at offset {offset})")]
    Encoding { path: PathBuf, offset: usize },
}

/// Which files in the input directory are transcripts
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// File extension to match, without the dot (case-insensitive)
    pub extension: String,
    /// File names to skip even when the extension matches
    pub exclude: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            extension: "raw".to_string(),
            exclude: vec!["example-meeting.raw".to_string()],
        }
    }
}

/// List transcript files in `dir`, sorted by path
pub fn discover_inputs(dir: &Path, config: &DiscoveryConfig) -> Result<Vec<PathBuf>, InputError> {
    let list_err = |source: std::io::Error| InputError::ListDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(list_err)? {
        let path = entry.map_err(list_err)?.path();
        if !path.is_file() {
            continue;
        }

        let extension_matches = path
            .extension()
            .is_some_and(|e| e.to_string_lossy().eq_ignore_ascii_case(&config.extension));
        if !extension_matches {
            continue;
        }

        let excluded = path
            .file_name()
            .is_some_and(|n| config.exclude.iter().any(|x| n.to_string_lossy() == x.as_str()));
        if excluded {
            debug!("Skipping excluded file {:?}", path);
            continue;
        }

        files.push(path);
    }

    files.sort();
    Ok(files)
}

/// Read a transcript file as UTF-8, dropping a leading byte-order mark
pub fn read_document(path: &Path) -> Result<String, InputError> {
    let bytes = std::fs::read(path).map_err(|source| InputError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    decode_document(path, bytes)
}

fn decode_document(path: &Path, bytes: Vec<u8>) -> Result<String, InputError> {
    let mut text = String::from_utf8(bytes).map_err(|e| InputError::Encoding {
        path: path.to_path_buf(),
        offset: e.utf8_error().valid_up_to(),
    })?;
    if text.starts_with('\u{feff}') {
        text.remove(0);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discover_inputs_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.raw", "a.RAW", "notes.txt", "example-meeting.raw"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.raw")).unwrap();

        let files = discover_inputs(dir.path(), &DiscoveryConfig::default()).unwrap();

        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.RAW", "b.raw"]);
    }

    #[test]
    fn test_discover_inputs_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let result = discover_inputs(&dir.path().join("nope"), &DiscoveryConfig::default());
        assert!(matches!(result, Err(InputError::ListDir { .. })));
    }

    #[test]
    fn test_read_document_strips_bom() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bom.raw");
        std::fs::write(&path, "\u{feff}<p>hi</p>").unwrap();

        assert_eq!(read_document(&path).unwrap(), "<p>hi</p>");
    }

    #[test]
    fn test_read_document_rejects_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.raw");
        std::fs::write(&path, [b'o', b'k', 0xff, b'!']).unwrap();

        match read_document(&path) {
            Err(InputError::Encoding { offset, .. }) => assert_eq!(offset, 2),
            other => panic!("expected encoding error, got {:?}", other),
        }
    }
}
