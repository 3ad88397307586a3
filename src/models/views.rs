use std::collections::HashMap;

use super::{Speaker, Turn};

/// Utterances keyed by speaker, in order of each speaker's first turn
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpeakerGroup {
    groups: Vec<(Speaker, Vec<String>)>,
    positions: HashMap<Speaker, usize>,
}

impl SpeakerGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line to `speaker`, creating its entry on first use
    pub fn push(&mut self, speaker: &Speaker, text: impl Into<String>) {
        let slot = match self.positions.get(speaker) {
            Some(&slot) => slot,
            None => {
                self.groups.push((speaker.clone(), Vec::new()));
                self.positions.insert(speaker.clone(), self.groups.len() - 1);
                self.groups.len() - 1
            }
        };
        self.groups[slot].1.push(text.into());
    }

    /// Lines spoken by `speaker`, if any
    pub fn lines(&self, speaker: &Speaker) -> Option<&[String]> {
        self.positions
            .get(speaker)
            .map(|&slot| self.groups[slot].1.as_slice())
    }

    /// Speakers in first-occurrence order
    pub fn speakers(&self) -> impl Iterator<Item = &Speaker> {
        self.groups.iter().map(|(speaker, _)| speaker)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Speaker, &[String])> {
        self.groups
            .iter()
            .map(|(speaker, lines)| (speaker, lines.as_slice()))
    }

    /// Total number of lines across all speakers
    pub fn line_count(&self) -> usize {
        self.groups.iter().map(|(_, lines)| lines.len()).sum()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// A turn with its user-visible, 1-based line number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberedTurn {
    pub number: usize,
    pub turn: Turn,
}

/// Every turn of a document in processing order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChronologicalLog {
    pub entries: Vec<NumberedTurn>,
}

impl ChronologicalLog {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speaker_group_keeps_first_occurrence_order() {
        let mut group = SpeakerGroup::new();
        group.push(&Speaker::named("Bo"), "one");
        group.push(&Speaker::named("Al"), "two");
        group.push(&Speaker::named("Bo"), "three");

        let order: Vec<_> = group.speakers().cloned().collect();
        assert_eq!(order, vec![Speaker::named("Bo"), Speaker::named("Al")]);
        assert_eq!(
            group.lines(&Speaker::named("Bo")).unwrap(),
            &["one".to_string(), "three".to_string()]
        );
        assert_eq!(group.line_count(), 3);
        assert!(group.lines(&Speaker::Unknown).is_none());
    }
}
