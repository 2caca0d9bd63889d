//! Post-processing cap on phrase length.
//!
//! Splitting is a caller-applied policy, not part of the segmentation scan,
//! so "max phrase length" stays an independent knob from "min phrase
//! length".

use super::Phrase;

/// Remainders at or below this length are dropped rather than emitted as
/// degenerate near-zero segments, mirroring the segmenter's tail policy.
pub const MIN_REMAINDER_SECS: f64 = 0.1;

/// Split one phrase into consecutive sub-phrases no longer than
/// `max_duration` seconds.
///
/// Greedy: full-length chunks from `phrase.start` while more than
/// `max_duration` remains, then the remainder — kept only if it exceeds
/// [`MIN_REMAINDER_SECS`].
pub fn split_phrase(phrase: &Phrase, max_duration: f64) -> Vec<Phrase> {
    let mut parts = Vec::new();
    let mut cursor = phrase.start;

    while phrase.end - cursor > max_duration {
        parts.push(Phrase::new(cursor, cursor + max_duration));
        cursor += max_duration;
    }

    if phrase.end - cursor > MIN_REMAINDER_SECS {
        parts.push(Phrase::new(cursor, phrase.end));
    }

    parts
}

/// Apply [`split_phrase`] across a whole phrase list.
pub fn cap_phrase_durations(phrases: &[Phrase], max_duration: f64) -> Vec<Phrase> {
    phrases
        .iter()
        .flat_map(|phrase| split_phrase(phrase, max_duration))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_phrase_passes_through_whole() {
        let parts = split_phrase(&Phrase::new(2.0, 5.0), 10.0);
        assert_eq!(parts, vec![Phrase::new(2.0, 5.0)]);
    }

    #[test]
    fn long_phrase_splits_into_max_length_chunks() {
        let parts = split_phrase(&Phrase::new(0.0, 25.0), 10.0);
        assert_eq!(
            parts,
            vec![
                Phrase::new(0.0, 10.0),
                Phrase::new(10.0, 20.0),
                Phrase::new(20.0, 25.0),
            ]
        );
    }

    #[test]
    fn sub_phrases_reconstruct_the_original_range() {
        let phrase = Phrase::new(3.0, 27.5);
        let parts = split_phrase(&phrase, 7.0);

        assert_eq!(parts.first().unwrap().start, phrase.start);
        assert_eq!(parts.last().unwrap().end, phrase.end);
        for pair in parts.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        for part in &parts {
            assert!(part.duration <= 7.0 + 1e-12);
        }
    }

    #[test]
    fn tiny_remainder_is_dropped() {
        // 10.05 s phrase with a 10 s cap: the 0.05 s tail vanishes.
        let parts = split_phrase(&Phrase::new(0.0, 10.05), 10.0);
        assert_eq!(parts, vec![Phrase::new(0.0, 10.0)]);
    }

    #[test]
    fn phrase_exactly_at_cap_is_not_split() {
        let parts = split_phrase(&Phrase::new(0.0, 10.0), 10.0);
        assert_eq!(parts, vec![Phrase::new(0.0, 10.0)]);
    }

    #[test]
    fn degenerate_phrase_yields_nothing() {
        let parts = split_phrase(&Phrase::new(1.0, 1.05), 10.0);
        assert!(parts.is_empty());
    }

    #[test]
    fn cap_applies_across_the_whole_list() {
        let phrases = vec![Phrase::new(0.0, 4.0), Phrase::new(5.0, 30.0)];
        let capped = cap_phrase_durations(&phrases, 10.0);
        assert_eq!(capped.len(), 4);
        assert_eq!(capped[0], Phrase::new(0.0, 4.0));
        assert_eq!(capped[3].end, 30.0);
    }
}
