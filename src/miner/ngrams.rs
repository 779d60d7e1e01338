//! Per-length n-gram denominators for the prior odds.
//!
//! For each substring length L the scorer needs a measure of how much
//! "room" a corpus offers for L-grams that do not straddle a document
//! boundary. The reference measure is run-based: every separator-delimited
//! run of length R contributes one count to each length 1..=R.

use memchr::memchr;

/// Build the n-gram count table for `text`.
///
/// `counts[length]` is the number of separator-delimited runs of at least
/// `length` bytes; `counts[0]` is unused. Lengths beyond the longest run are
/// simply absent, which the scorer reads as zero.
pub fn ngram_counts(text: &[u8], separator: u8) -> Vec<usize> {
    let mut counts: Vec<usize> = Vec::new();
    let mut start = 0;

    while start != text.len() {
        let end = memchr(separator, &text[start..])
            .map(|p| start + p)
            .unwrap_or(text.len());

        let run = end - start;
        if counts.len() <= run {
            counts.resize(run + 1, 0);
        }
        for length in 1..=run {
            counts[length] += 1;
        }

        if end == text.len() {
            break;
        }

        start = end + 1;
    }

    counts
}
