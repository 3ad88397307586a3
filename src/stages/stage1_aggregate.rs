use crate::models::{ChronologicalLog, NumberedTurn, SpeakerGroup, Turn};

/// Perform Stage 1: aggregation
///
/// Builds both views of a document's turns in one pass. Speakers are keyed in
/// order of their first turn, and log numbers run from 1 regardless of the
/// source indices.
pub fn aggregate(turns: &[Turn]) -> (SpeakerGroup, ChronologicalLog) {
    let mut group = SpeakerGroup::new();
    let mut entries = Vec::with_capacity(turns.len());

    for (i, turn) in turns.iter().enumerate() {
        group.push(&turn.speaker, turn.text.clone());
        entries.push(NumberedTurn {
            number: i + 1,
            turn: turn.clone(),
        });
    }

    (group, ChronologicalLog { entries })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Speaker;

    fn turn(index: usize, source_index: u64, speaker: Speaker, text: &str) -> Turn {
        Turn {
            index,
            source_index: Some(source_index),
            speaker,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_aggregate_groups_and_numbers() {
        let turns = vec![
            turn(0, 10, Speaker::named("Ann"), "hi"),
            turn(1, 20, Speaker::Unknown, "who?"),
            turn(2, 30, Speaker::named("Ann"), "me"),
            turn(3, 40, Speaker::named("Ben"), "ok"),
        ];

        let (group, log) = aggregate(&turns);

        let speakers: Vec<_> = group.speakers().cloned().collect();
        assert_eq!(
            speakers,
            vec![Speaker::named("Ann"), Speaker::Unknown, Speaker::named("Ben")]
        );
        assert_eq!(
            group.lines(&Speaker::named("Ann")).unwrap(),
            &["hi".to_string(), "me".to_string()]
        );

        let numbers: Vec<_> = log.entries.iter().map(|e| e.number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
        assert_eq!(log.entries[3].turn.text, "ok");
    }

    #[test]
    fn test_no_turn_is_lost() {
        let turns: Vec<Turn> = (0..7)
            .map(|i| {
                let speaker = Speaker::named(format!("S{}", i % 3));
                turn(i, i as u64, speaker, &format!("line {}", i))
            })
            .collect();

        let (group, log) = aggregate(&turns);

        assert_eq!(group.line_count(), turns.len());
        assert_eq!(log.len(), turns.len());
        assert_eq!(group.len(), 3);
    }

    #[test]
    fn test_aggregate_empty() {
        let (group, log) = aggregate(&[]);
        assert!(group.is_empty());
        assert!(log.is_empty());
    }
}
