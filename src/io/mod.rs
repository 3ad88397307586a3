pub mod input;
pub mod output;

pub use input::{discover_inputs, read_document, DiscoveryConfig, InputError};
pub use output::{
    ensure_output_dir, write_all, write_text, OutputError, OutputPaths, TurnRecord, TurnsDocument,
};
