use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::models::{ChronologicalLog, Speaker, SpeakerGroup};

/// Suffix appended to the input stem for the by-speaker rendering
pub const BY_SPEAKER_SUFFIX: &str = "_by_speaker.txt";
/// Suffix appended to the input stem for the chronological rendering
pub const CHRONOLOGICAL_SUFFIX: &str = "_chronological.txt";
/// Suffix appended to the input stem for the machine-readable turns
pub const TURNS_JSON_SUFFIX: &str = "_turns.json";

/// Failure to write an output file
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to create output directory {path:?}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path:?}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize turns for {path:?}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Destination paths for one input document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub by_speaker: PathBuf,
    pub chronological: PathBuf,
    pub turns_json: PathBuf,
}

impl OutputPaths {
    /// Derive output names from the input's file stem
    pub fn for_input(input: &Path, output_dir: &Path) -> Self {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "transcript".to_string());

        Self {
            by_speaker: output_dir.join(format!("{}{}", stem, BY_SPEAKER_SUFFIX)),
            chronological: output_dir.join(format!("{}{}", stem, CHRONOLOGICAL_SUFFIX)),
            turns_json: output_dir.join(format!("{}{}", stem, TURNS_JSON_SUFFIX)),
        }
    }
}

/// Machine-readable output format
#[derive(Debug, Clone, Serialize)]
pub struct TurnsDocument {
    /// Name of the source file
    pub source: String,
    /// Resolved speaker names in first-occurrence order
    pub speakers: Vec<String>,
    /// Whether any turn had no resolved speaker
    pub has_unknown_speaker: bool,
    pub turns: Vec<TurnRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TurnRecord {
    /// 1-based line number, as in the chronological rendering
    pub number: usize,
    /// Declared block index, when it was valid
    pub source_index: Option<u64>,
    /// Speaker name, `null` when unresolved
    pub speaker: Speaker,
    pub text: String,
}

impl TurnsDocument {
    pub fn new(source: impl Into<String>, group: &SpeakerGroup, log: &ChronologicalLog) -> Self {
        let speakers: Vec<String> = group
            .speakers()
            .filter_map(|s| s.name().map(str::to_string))
            .collect();
        let has_unknown_speaker = speakers.len() < group.len();

        let turns = log
            .entries
            .iter()
            .map(|e| TurnRecord {
                number: e.number,
                source_index: e.turn.source_index,
                speaker: e.turn.speaker.clone(),
                text: e.turn.text.clone(),
            })
            .collect();

        Self {
            source: source.into(),
            speakers,
            has_unknown_speaker,
            turns,
        }
    }

    /// Pretty-printed JSON destined for `path`
    pub fn to_json(&self, path: &Path) -> Result<String, OutputError> {
        serde_json::to_string_pretty(self).map_err(|source| OutputError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write to a JSON file
    pub fn write_json(&self, path: &Path) -> Result<(), OutputError> {
        write_text(path, &self.to_json(path)?)
    }
}

/// Create the output directory if it does not exist
pub fn ensure_output_dir(dir: &Path) -> Result<(), OutputError> {
    std::fs::create_dir_all(dir).map_err(|source| OutputError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

/// Write rendered text to a file, replacing any previous contents
pub fn write_text(path: &Path, contents: &str) -> Result<(), OutputError> {
    std::fs::write(path, contents).map_err(|source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Write several files as a unit
///
/// When any write fails, the files already written by this call are removed
/// so a document never ends up with only part of its outputs.
pub fn write_all(files: &[(&Path, &str)]) -> Result<(), OutputError> {
    for (i, (path, contents)) in files.iter().enumerate() {
        if let Err(e) = write_text(path, contents) {
            for (written, _) in &files[..i] {
                if let Err(cleanup) = std::fs::remove_file(written) {
                    warn!("Failed to remove partial output {:?}: {}", written, cleanup);
                }
            }
            return Err(e);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Turn;
    use crate::stages::aggregate;

    #[test]
    fn test_output_paths_for_input() {
        let paths = OutputPaths::for_input(Path::new("in/team sync.raw"), Path::new("out"));

        assert_eq!(paths.by_speaker, Path::new("out/team sync_by_speaker.txt"));
        assert_eq!(paths.chronological, Path::new("out/team sync_chronological.txt"));
        assert_eq!(paths.turns_json, Path::new("out/team sync_turns.json"));
    }

    #[test]
    fn test_turns_document_json() {
        let turns = vec![
            Turn {
                index: 0,
                source_index: None,
                speaker: Speaker::Unknown,
                text: "hello?".to_string(),
            },
            Turn {
                index: 1,
                source_index: Some(4),
                speaker: Speaker::named("Ann"),
                text: "hi".to_string(),
            },
        ];
        let (group, log) = aggregate(&turns);

        let doc = TurnsDocument::new("call.raw", &group, &log);
        let value = serde_json::to_value(&doc).unwrap();

        assert_eq!(value["speakers"], serde_json::json!(["Ann"]));
        assert_eq!(value["has_unknown_speaker"], true);
        assert_eq!(value["turns"][0]["speaker"], serde_json::Value::Null);
        assert_eq!(value["turns"][1]["number"], 2);
        assert_eq!(value["turns"][1]["source_index"], 4);
    }

    #[test]
    fn test_write_json_roundtrips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.json");
        let (group, log) = aggregate(&[]);

        TurnsDocument::new("empty.raw", &group, &log)
            .write_json(&path)
            .unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["source"], "empty.raw");
        assert_eq!(value["turns"], serde_json::json!([]));
    }

    #[test]
    fn test_write_all_removes_earlier_files_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a_by_speaker.txt");
        let second = dir.path().join("a_chronological.txt");
        std::fs::create_dir(&second).unwrap();

        let result = write_all(&[(first.as_path(), "one"), (second.as_path(), "two")]);

        assert!(matches!(result, Err(OutputError::Write { .. })));
        assert!(!first.exists());
    }
}
