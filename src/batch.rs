use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::io::{
    discover_inputs, ensure_output_dir, read_document, write_all, DiscoveryConfig, InputError,
    OutputError, OutputPaths, TurnsDocument,
};
use crate::stages::{
    aggregate, extract, label_collides, render_by_speaker, render_chronological, ExtractConfig,
    RenderConfig, RenderHeader,
};

/// Configuration for a batch run
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Directory scanned for transcript files
    pub input_dir: PathBuf,
    /// Directory receiving the rendered files
    pub output_dir: PathBuf,
    pub discovery: DiscoveryConfig,
    pub extract: ExtractConfig,
    pub render: RenderConfig,
    /// Print a title block with the source name and generation time
    pub with_header: bool,
    /// Also write the machine-readable turns file
    pub write_json: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input"),
            output_dir: PathBuf::from("output"),
            discovery: DiscoveryConfig::default(),
            extract: ExtractConfig::default(),
            render: RenderConfig::default(),
            with_header: false,
            write_json: false,
        }
    }
}

/// Failure that stops a file, or the whole batch when it happens before any file
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Non-fatal condition worth telling the operator about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FileWarning {
    #[error("no transcript data found")]
    EmptyTranscript,
    #[error("no speakers found, every turn is unattributed")]
    NoSpeakersFound,
}

/// Result of processing one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Success,
    /// Outputs were written but something looks off
    Warning(FileWarning),
    /// Nothing was written for this file; holds the reason as text
    Failed(String),
}

/// What happened to a single input file
#[derive(Debug, Clone)]
pub struct FileReport {
    pub input: PathBuf,
    pub outcome: FileOutcome,
    /// Number of turns extracted
    pub turns: usize,
    /// Resolved speaker names in first-occurrence order
    pub speakers: Vec<String>,
    /// Files written, absent on failure
    pub outputs: Option<OutputPaths>,
}

/// Per-file outcomes of a batch run
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub reports: Vec<FileReport>,
}

impl BatchSummary {
    pub fn successful(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Success))
    }

    pub fn warnings(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Warning(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&FileOutcome) -> bool) -> usize {
        self.reports.iter().filter(|r| pred(&r.outcome)).count()
    }
}

/// Process every transcript in the input directory
///
/// Only discovery and output-directory creation can fail the batch. Each file
/// is then processed on its own and a failure is recorded in its report. A
/// file whose output names are already taken by an earlier input (`a.raw`
/// and `a.RAW`) fails instead of overwriting them.
pub fn process_batch(config: &BatchConfig) -> Result<BatchSummary, ProcessError> {
    let inputs = discover_inputs(&config.input_dir, &config.discovery)?;
    if inputs.is_empty() {
        warn!(
            "No .{} files found in {:?}",
            config.discovery.extension, config.input_dir
        );
        return Ok(BatchSummary::default());
    }

    ensure_output_dir(&config.output_dir)?;
    info!(
        "Found {} transcript file(s) in {:?}, writing to {:?}",
        inputs.len(),
        config.input_dir,
        config.output_dir
    );

    let mut summary = BatchSummary::default();
    let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::new();
    for input in inputs {
        let paths = OutputPaths::for_input(&input, &config.output_dir);
        if let Some(owner) = claimed.get(&paths.by_speaker) {
            let message = format!(
                "outputs {:?} are already taken by {:?}",
                paths.by_speaker, owner
            );
            warn!("Skipping {:?}: {}", input, message);
            summary.reports.push(FileReport {
                input,
                outcome: FileOutcome::Failed(message),
                turns: 0,
                speakers: vec![],
                outputs: None,
            });
            continue;
        }
        claimed.insert(paths.by_speaker, input.clone());

        let report = match process_file(&input, config) {
            Ok(report) => report,
            Err(e) => {
                let message = error_chain(&e);
                warn!("Error processing {:?}: {}", input, message);
                FileReport {
                    input,
                    outcome: FileOutcome::Failed(message),
                    turns: 0,
                    speakers: vec![],
                    outputs: None,
                }
            }
        };
        summary.reports.push(report);
    }

    info!(
        "Processing complete: {} successful, {} with warnings, {} failed",
        summary.successful(),
        summary.warnings(),
        summary.failed()
    );

    Ok(summary)
}

/// Extract, aggregate and render one file, writing its outputs
pub fn process_file(input: &Path, config: &BatchConfig) -> Result<FileReport, ProcessError> {
    info!("Processing: {:?}", input);
    let raw = read_document(input)?;

    let extraction = extract(&raw, &config.extract);
    let (group, log) = aggregate(&extraction.turns);

    let source_name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut render = config.render.clone();
    if config.with_header {
        render.header = Some(RenderHeader {
            source_name: source_name.clone(),
            generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        });
    }

    if label_collides(&group, &render) {
        warn!(
            "{:?}: a speaker is named {:?}, the same label used for unattributed turns",
            input, render.unknown_speaker_label
        );
    }

    let paths = OutputPaths::for_input(input, &config.output_dir);
    let by_speaker = render_by_speaker(&group, &render);
    let chronological = render_chronological(&log, &render);
    let json = if config.write_json {
        Some(TurnsDocument::new(source_name, &group, &log).to_json(&paths.turns_json)?)
    } else {
        None
    };

    let mut files = vec![
        (paths.by_speaker.as_path(), by_speaker.as_str()),
        (paths.chronological.as_path(), chronological.as_str()),
    ];
    if let Some(json) = &json {
        files.push((paths.turns_json.as_path(), json.as_str()));
    }
    write_all(&files)?;
    for (path, _) in &files {
        info!("Created: {:?}", path);
    }

    let speakers: Vec<String> = group
        .speakers()
        .filter_map(|s| s.name().map(str::to_string))
        .collect();

    let outcome = if extraction.turns.is_empty() {
        FileOutcome::Warning(FileWarning::EmptyTranscript)
    } else if speakers.is_empty() {
        FileOutcome::Warning(FileWarning::NoSpeakersFound)
    } else {
        FileOutcome::Success
    };

    match &outcome {
        FileOutcome::Warning(w) => warn!("{:?}: {}", input, w),
        _ => info!("Speakers found: {}", speakers.join(", ")),
    }

    Ok(FileReport {
        input: input.to_path_buf(),
        outcome,
        turns: extraction.turns.len(),
        speakers,
        outputs: Some(paths),
    })
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
