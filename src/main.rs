use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use palaver::{
    aggregate, extract, process_batch, read_document, BatchConfig, DiscoveryConfig, ExtractConfig,
    RenderConfig, DEFAULT_UNKNOWN_SPEAKER,
};

#[derive(Parser)]
#[command(name = "palaver")]
#[command(author, version, about = "Meeting transcript markup cleaner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert every transcript in a directory into by-speaker and chronological text
    Process {
        /// Directory containing exported transcript files
        #[arg(short, long, default_value = "input")]
        input: PathBuf,

        /// Directory for the cleaned transcripts
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Extension of transcript files, without the dot
        #[arg(long, default_value = "raw")]
        extension: String,

        /// File name to skip (repeatable)
        #[arg(long, default_value = "example-meeting.raw")]
        exclude: Vec<String>,

        /// Label for turns spoken before any speaker is named
        #[arg(long, default_value = DEFAULT_UNKNOWN_SPEAKER)]
        unknown_label: String,

        /// Remove spaces left before punctuation when joining caption fragments
        #[arg(long)]
        tighten_punctuation: bool,

        /// Start each output with the source name and generation time
        #[arg(long)]
        header: bool,

        /// Also write the turns as JSON
        #[arg(long)]
        json: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Summarize a single transcript without writing anything
    Analyze {
        /// Transcript file to inspect
        #[arg(short, long)]
        input: PathBuf,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Process {
            input,
            output,
            extension,
            exclude,
            unknown_label,
            tighten_punctuation,
            header,
            json,
            verbose,
        } => {
            setup_logging(verbose);
            let config = BatchConfig {
                input_dir: input,
                output_dir: output,
                discovery: DiscoveryConfig { extension, exclude },
                extract: ExtractConfig {
                    tighten_punctuation,
                },
                render: RenderConfig {
                    unknown_speaker_label: unknown_label,
                    header: None,
                },
                with_header: header,
                write_json: json,
            };
            process_transcripts(&config)
        }
        Commands::Analyze { input, verbose } => {
            setup_logging(verbose);
            analyze_transcript(input)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn process_transcripts(config: &BatchConfig) -> Result<ExitCode> {
    let summary = process_batch(config).context("Failed to process transcripts")?;

    if summary.reports.is_empty() {
        return Ok(ExitCode::SUCCESS);
    }

    info!("Output files saved to {:?}", config.output_dir);

    if summary.failed() > 0 {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn analyze_transcript(input: PathBuf) -> Result<()> {
    info!("Analyzing transcript from {:?}", input);
    let raw = read_document(&input).context("Failed to read input transcript")?;
    let extraction = extract(&raw, &ExtractConfig::default());
    let (group, _) = aggregate(&extraction.turns);

    println!("Transcript Analysis");
    println!("==================");
    println!("Blocks: {}", extraction.blocks_seen);
    println!("Turns: {}", extraction.turns.len());
    println!("Speakers: {}", group.len());
    println!();

    println!("Speaker Statistics");
    println!("------------------");
    for (speaker, lines) in group.iter() {
        let words: usize = lines.iter().map(|l| l.split_whitespace().count()).sum();
        println!(
            "{}: {} turns, {} words",
            speaker.label(DEFAULT_UNKNOWN_SPEAKER),
            lines.len(),
            words
        );
    }

    if !extraction.issues.is_empty() {
        println!();
        println!("Block Issues");
        println!("------------");
        for issue in &extraction.issues {
            println!("{}", issue);
        }
    }

    Ok(())
}
