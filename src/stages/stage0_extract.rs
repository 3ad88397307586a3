use std::collections::HashSet;

use scraper::{ElementRef, Html};
use thiserror::Error;
use tracing::debug;

use crate::models::{Speaker, Turn};

/// Attribute that orders utterance blocks
const INDEX_ATTR: &str = "data-index";
/// Attribute flagging a speaker-name element
const SPEAKER_ATTR: &str = "data-speaker";
/// Attribute flagging a caption fragment
const CLIPPED_ATTR: &str = "data-clipped";

/// Configuration for Stage 0 extraction
#[derive(Debug, Clone, Default)]
pub struct ExtractConfig {
    /// Remove whitespace left in front of `. , ! ? ; :` after joining fragments
    pub tighten_punctuation: bool,
}

/// A recoverable problem found while reading a single block
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockIssue {
    #[error("block {position} has malformed index {value:?}, keeping document order")]
    MalformedIndex { position: usize, value: String },
    #[error("block {position} has no index, keeping document order")]
    MissingIndex { position: usize },
    #[error("block {position} repeats index {index}, keeping document order")]
    DuplicateIndex { position: usize, index: u64 },
}

/// Result of Stage 0 extraction
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Turns in processing order
    pub turns: Vec<Turn>,
    /// Number of blocks found, including those that yielded no turn
    pub blocks_seen: usize,
    /// Problems recovered from while ordering blocks
    pub issues: Vec<BlockIssue>,
}

impl Extraction {
    /// Whether any turn carries a speaker taken from a marker
    pub fn has_resolved_speaker(&self) -> bool {
        self.turns.iter().any(|t| t.speaker.is_resolved())
    }
}

/// What one block contributes before carry-forward is applied
#[derive(Debug, Clone)]
struct BlockContent {
    /// Processing-order key
    order: u64,
    /// Declared index when valid
    source_index: Option<u64>,
    speaker: Option<String>,
    fragments: Vec<String>,
}

/// Extract ordered turns from transcript markup
pub fn extract_turns(raw: &str, config: &ExtractConfig) -> Vec<Turn> {
    extract(raw, config).turns
}

/// Perform Stage 0: markup extraction
///
/// 1. Finds utterance blocks in document order
/// 2. Reads each block's speaker marker and caption fragments
/// 3. Orders blocks by index, ties and malformed indices keep document order
/// 4. Folds blocks into turns, carrying the last speaker forward
pub fn extract(raw: &str, config: &ExtractConfig) -> Extraction {
    let document = Html::parse_document(raw);
    let mut issues = Vec::new();

    let mut blocks = collect_blocks(&document, &mut issues);
    // Stable sort: equal keys stay in document order
    blocks.sort_by_key(|b| b.order);

    let blocks_seen = blocks.len();
    let (_, turns) = blocks.into_iter().fold(
        (Speaker::Unknown, Vec::new()),
        |(current, mut turns), block| {
            let speaker = block.speaker.map(Speaker::Named).unwrap_or(current);

            let mut text = normalize_whitespace(&block.fragments.join(" "));
            if config.tighten_punctuation {
                text = tighten_punctuation(&text);
            }

            if !text.is_empty() {
                turns.push(Turn {
                    index: turns.len(),
                    source_index: block.source_index,
                    speaker: speaker.clone(),
                    text,
                });
            }
            (speaker, turns)
        },
    );

    for issue in &issues {
        debug!("{}", issue);
    }

    Extraction {
        turns,
        blocks_seen,
        issues,
    }
}

/// Walk the document and read every block in document order
///
/// Blocks may nest, either because an indexed wrapper holds other blocks or
/// because an unclosed block swallowed its successors. Each block keeps only
/// its own marker and fragments. An element whose only content sits in
/// nested blocks is a container and is not a block itself.
fn collect_blocks(document: &Html, issues: &mut Vec<BlockIssue>) -> Vec<BlockContent> {
    let mut blocks = Vec::new();
    let mut seen_indices = HashSet::new();
    let mut last_order = 0u64;

    for element in document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
    {
        if !is_block(element) {
            continue;
        }

        let (speaker, fragments) = scan_block(element);
        if speaker.is_none() && fragments.is_empty() && contains_block(element) {
            continue;
        }

        let position = blocks.len();
        let source_index = match element.value().attr(INDEX_ATTR) {
            Some(value) => match value.trim().parse::<u64>() {
                Ok(index) => Some(index),
                Err(_) => {
                    issues.push(BlockIssue::MalformedIndex {
                        position,
                        value: value.to_string(),
                    });
                    None
                }
            },
            None => {
                issues.push(BlockIssue::MissingIndex { position });
                None
            }
        };

        if let Some(index) = source_index {
            if !seen_indices.insert(index) {
                issues.push(BlockIssue::DuplicateIndex { position, index });
            }
            last_order = index;
        }

        blocks.push(BlockContent {
            order: last_order,
            source_index,
            speaker,
            fragments,
        });
    }

    blocks
}

/// An indexed element, or an unindexed paragraph that still holds transcript content
fn is_block(element: ElementRef) -> bool {
    if element.value().attr(INDEX_ATTR).is_some() {
        return true;
    }
    element.value().name() == "p"
        && element
            .descendants()
            .filter_map(ElementRef::wrap)
            .any(|d| is_speaker_marker(d) || is_fragment(d))
}

fn contains_block(element: ElementRef) -> bool {
    element
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .any(is_block)
}

fn is_speaker_marker(element: ElementRef) -> bool {
    element
        .value()
        .attr(SPEAKER_ATTR)
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

fn is_fragment(element: ElementRef) -> bool {
    element.value().attr(CLIPPED_ATTR).is_some() && !is_speaker_marker(element)
}

/// Depth-first search of a block for its speaker and caption fragments
///
/// Speaker markers, fragments and nested blocks are not descended into, so
/// a fragment nested in another is only counted once, marker text never
/// leaks into the dialogue and a nested block keeps its own content.
fn scan_block(block: ElementRef) -> (Option<String>, Vec<String>) {
    let mut speaker = None;
    let mut fragments = Vec::new();
    let mut stack: Vec<ElementRef> = block.children().filter_map(ElementRef::wrap).collect();
    stack.reverse();

    while let Some(element) = stack.pop() {
        if is_block(element) {
            continue;
        }

        if is_speaker_marker(element) {
            let name = normalize_whitespace(&text_content(element));
            if speaker.is_none() && !name.is_empty() {
                speaker = Some(name);
            }
            continue;
        }

        if is_fragment(element) {
            fragments.push(text_content(element));
            continue;
        }

        let start = stack.len();
        stack.extend(element.children().filter_map(ElementRef::wrap));
        stack[start..].reverse();
    }

    (speaker, fragments)
}

fn text_content(element: ElementRef) -> String {
    element.text().collect()
}

/// Collapse every whitespace run to one space and trim both ends
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Drop spaces that precede sentence punctuation
pub fn tighten_punctuation(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '.' | ',' | '!' | '?' | ';' | ':') {
            while out.ends_with(char::is_whitespace) {
                out.pop();
            }
        }
        out.push(ch);
    }
    out
}
