use std::fmt::Write;

use crate::models::{ChronologicalLog, Speaker, SpeakerGroup, DEFAULT_UNKNOWN_SPEAKER};

/// Configuration for Stage 2 rendering
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Label printed for turns with no resolved speaker
    pub unknown_speaker_label: String,
    /// Optional title block printed above the transcript
    pub header: Option<RenderHeader>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            unknown_speaker_label: DEFAULT_UNKNOWN_SPEAKER.to_string(),
            header: None,
        }
    }
}

/// Title block for a rendered transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderHeader {
    /// Name of the source file
    pub source_name: String,
    /// Pre-formatted generation time
    pub generated_at: String,
}

/// Render the by-speaker view
///
/// One section per speaker: a name line followed by each utterance on its own
/// line. Sections are separated by a blank line.
pub fn render_by_speaker(group: &SpeakerGroup, config: &RenderConfig) -> String {
    let mut output = String::new();
    write_header(&mut output, "TRANSCRIPT", config);

    for (i, (speaker, lines)) in group.iter().enumerate() {
        if i > 0 {
            output.push('\n');
        }
        output.push_str(speaker.label(&config.unknown_speaker_label));
        output.push('\n');
        for line in lines {
            output.push_str(line);
            output.push('\n');
        }
    }

    output
}

/// Render the chronological view as `N. speaker: text` lines
pub fn render_chronological(log: &ChronologicalLog, config: &RenderConfig) -> String {
    let mut output = String::new();
    write_header(&mut output, "TRANSCRIPT (CHRONOLOGICAL)", config);

    for entry in &log.entries {
        let _ = writeln!(
            output,
            "{}. {}: {}",
            entry.number,
            entry.turn.speaker.label(&config.unknown_speaker_label),
            entry.turn.text
        );
    }

    output
}

/// Whether a named speaker would print exactly like the unknown sentinel
///
/// Both would then get a section headed by the same label in the by-speaker
/// view.
pub fn label_collides(group: &SpeakerGroup, config: &RenderConfig) -> bool {
    group.lines(&Speaker::Unknown).is_some()
        && group
            .speakers()
            .any(|s| s.name() == Some(config.unknown_speaker_label.as_str()))
}

fn write_header(output: &mut String, title: &str, config: &RenderConfig) {
    if let Some(header) = &config.header {
        let _ = writeln!(output, "{}: {}", title, header.source_name);
        let _ = writeln!(output, "Generated: {}", header.generated_at);
        output.push_str(&"=".repeat(80));
        output.push_str("\n\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Turn;
    use crate::stages::aggregate;

    fn turns() -> Vec<Turn> {
        [
            (Speaker::named("John"), "Hello there!"),
            (Speaker::named("Mary"), "Hi  John."),
            (Speaker::Unknown, "(inaudible)"),
            (Speaker::named("John"), "Shall we start?"),
        ]
        .into_iter()
        .enumerate()
        .map(|(i, (speaker, text))| Turn {
            index: i,
            source_index: Some(i as u64 * 2),
            speaker,
            text: text.to_string(),
        })
        .collect()
    }

    #[test]
    fn test_render_by_speaker() {
        let (group, _) = aggregate(&turns());

        let text = render_by_speaker(&group, &RenderConfig::default());

        assert_eq!(
            text,
            "John\nHello there!\nShall we start?\n\nMary\nHi  John.\n\nUnknown Speaker\n(inaudible)\n"
        );
    }

    #[test]
    fn test_render_chronological() {
        let (_, log) = aggregate(&turns());
        let config = RenderConfig {
            unknown_speaker_label: "???".to_string(),
            ..Default::default()
        };

        let text = render_chronological(&log, &config);

        assert_eq!(
            text,
            "1. John: Hello there!\n2. Mary: Hi  John.\n3. ???: (inaudible)\n4. John: Shall we start?\n"
        );
    }

    #[test]
    fn test_render_empty() {
        let (group, log) = aggregate(&[]);
        assert_eq!(render_by_speaker(&group, &RenderConfig::default()), "");
        assert_eq!(render_chronological(&log, &RenderConfig::default()), "");
    }

    #[test]
    fn test_render_header() {
        let (group, log) = aggregate(&turns()[..1]);
        let config = RenderConfig {
            header: Some(RenderHeader {
                source_name: "standup.raw".to_string(),
                generated_at: "2024-05-01 09:30:00".to_string(),
            }),
            ..Default::default()
        };

        let by_speaker = render_by_speaker(&group, &config);
        let chronological = render_chronological(&log, &config);

        let rule = "=".repeat(80);
        assert_eq!(
            by_speaker,
            format!(
                "TRANSCRIPT: standup.raw\nGenerated: 2024-05-01 09:30:00\n{}\n\nJohn\nHello there!\n",
                rule
            )
        );
        assert!(chronological.starts_with("TRANSCRIPT (CHRONOLOGICAL): standup.raw\n"));
        assert!(chronological.ends_with("\n\n1. John: Hello there!\n"));
    }

    #[test]
    fn test_label_collides() {
        let mut group = SpeakerGroup::new();
        group.push(&Speaker::named("Unknown Speaker"), "I am a real person");
        let config = RenderConfig::default();

        assert!(!label_collides(&group, &config));

        group.push(&Speaker::Unknown, "who said that?");
        assert!(label_collides(&group, &config));

        let renamed = RenderConfig {
            unknown_speaker_label: "(unattributed)".to_string(),
            ..Default::default()
        };
        assert!(!label_collides(&group, &renamed));
    }
}
