pub mod batch;
pub mod io;
pub mod models;
pub mod stages;

pub use batch::{
    process_batch, process_file, BatchConfig, BatchSummary, FileOutcome, FileReport, FileWarning,
    ProcessError,
};
pub use io::{discover_inputs, read_document, DiscoveryConfig, InputError, OutputError, OutputPaths};
pub use models::{ChronologicalLog, Speaker, SpeakerGroup, Turn, DEFAULT_UNKNOWN_SPEAKER};
pub use stages::{
    aggregate, extract, extract_turns, normalize_whitespace, render_by_speaker,
    render_chronological, BlockIssue, ExtractConfig, Extraction, RenderConfig, RenderHeader,
};
