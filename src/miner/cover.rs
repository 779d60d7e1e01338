//! Greedy document cover over the admitted features.
//!
//! Once mining has produced the full feature list, the cover pass selects a
//! small subset whose substrings together touch every first-corpus document:
//! features are visited in descending log-odds order, each one claims the
//! documents it newly covers, and it is emitted only if that claim is large
//! enough.

use crate::miner::documents::document_ranges;
use crate::miner::scorer::Feature;
use anyhow::Result;
use memchr::memmem;
use std::cmp::Ordering;

/// Order features by descending log-odds; break ties toward longer, then
/// lexicographically smaller substrings so the selection is deterministic.
fn by_descending_score(a: &Feature, b: &Feature, buffer: &[u8]) -> Ordering {
    b.log_odds
        .partial_cmp(&a.log_odds)
        .unwrap_or(Ordering::Equal)
        .then_with(|| b.length.cmp(&a.length))
        .then_with(|| a.substring(buffer).cmp(b.substring(buffer)))
}

/// Run the greedy cover and emit each selected feature through `sink`.
///
/// The first count delivered to the sink is the number of documents the
/// feature newly covered, not its global hit count. Stops as soon as every
/// document is covered.
pub fn find_cover<F>(
    features: &mut [Feature],
    buffer: &[u8],
    input0_len: usize,
    separator: u8,
    cover_threshold: usize,
    sink: &mut F,
) -> Result<()>
where
    F: FnMut(usize, usize, f64, &[u8]) -> Result<()>,
{
    features.sort_by(|a, b| by_descending_score(a, b, buffer));

    let mut remaining = document_ranges(&buffer[..input0_len], separator);

    for feature in features.iter() {
        if remaining.is_empty() {
            break;
        }

        let substring = feature.substring(buffer);
        let before = remaining.len();

        remaining.retain(|doc| memmem::find(&buffer[doc.clone()], substring).is_none());

        let hits = before - remaining.len();
        if hits > cover_threshold {
            sink(hits, feature.input1_hits, feature.log_odds, substring)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature(buffer: &[u8], substring: &[u8], log_odds: f64) -> Feature {
        let offset = memmem::find(buffer, substring).expect("substring not in buffer");
        Feature {
            offset,
            length: substring.len(),
            log_odds,
            input0_hits: 0,
            input1_hits: 0,
            set_hash: 0,
        }
    }

    fn run_cover(
        features: &mut [Feature],
        buffer: &[u8],
        input0_len: usize,
        threshold: usize,
    ) -> Vec<(usize, Vec<u8>)> {
        let mut emitted = Vec::new();
        let mut sink = |hits: usize, _: usize, _: f64, substring: &[u8]| {
            emitted.push((hits, substring.to_vec()));
            Ok(())
        };
        find_cover(features, buffer, input0_len, 0, threshold, &mut sink).unwrap();
        emitted
    }

    #[test]
    fn claims_documents_in_score_order() {
        let buffer = b"aaa\0bab\0bbb\0";
        let mut features = vec![
            feature(buffer, b"b", 2.0),
            feature(buffer, b"aa", 3.0),
            feature(buffer, b"bbb", 1.0),
        ];

        let emitted = run_cover(&mut features, buffer, buffer.len(), 0);

        // "aa" takes the first document, "b" the remaining two; "bbb" finds
        // nothing left to cover.
        assert_eq!(
            emitted,
            vec![(1, b"aa".to_vec()), (2, b"b".to_vec())]
        );
    }

    #[test]
    fn threshold_suppresses_small_claims() {
        let buffer = b"aaa\0bab\0bbb\0";
        let mut features = vec![feature(buffer, b"aa", 3.0), feature(buffer, b"b", 2.0)];

        let emitted = run_cover(&mut features, buffer, buffer.len(), 1);

        // "aa" newly covers a single document, below the threshold; it still
        // claims the document, it is just not emitted.
        assert_eq!(emitted, vec![(2, b"b".to_vec())]);
    }

    #[test]
    fn removing_an_unemitted_feature_changes_nothing() {
        let buffer = b"aaa\0bab\0bbb\0";
        let mut with_redundant = vec![
            feature(buffer, b"aa", 3.0),
            feature(buffer, b"b", 2.0),
            feature(buffer, b"bbb", 1.0),
        ];
        let mut without_redundant = vec![
            feature(buffer, b"aa", 3.0),
            feature(buffer, b"b", 2.0),
        ];

        let full = run_cover(&mut with_redundant, buffer, buffer.len(), 0);
        let trimmed = run_cover(&mut without_redundant, buffer, buffer.len(), 0);

        assert_eq!(full, trimmed);
    }

    #[test]
    fn stops_once_everything_is_covered() {
        let buffer = b"xx\0xy\0";
        let mut features = vec![feature(buffer, b"x", 2.0), feature(buffer, b"y", 1.0)];

        let emitted = run_cover(&mut features, buffer, buffer.len(), 0);

        assert_eq!(emitted, vec![(2, b"x".to_vec())]);
    }
}
