//! Candidate scoring and feature admission.
//!
//! A candidate that clears the count thresholds is scored by Bayesian
//! log-odds: the posterior odds of its per-corpus hit counts against the
//! prior odds of the per-corpus denominators, both smoothed by an additive
//! pseudocount. Admitted candidates land in the feature arena, where the
//! redundancy filter may suppress them or let them replace a weaker feature
//! covering the same ground.

use memchr::memmem;

/// An admitted candidate, held in the feature arena until emission.
///
/// The substring is a view into the combined buffer, never a copy.
#[derive(Debug, Clone, Copy)]
pub struct Feature {
    pub offset: usize,
    pub length: usize,
    pub log_odds: f64,
    pub input0_hits: usize,
    pub input1_hits: usize,
    /// Identity of the exact document set covered, for equal-set detection.
    /// Zero outside document mode.
    pub set_hash: u64,
}

impl Feature {
    #[inline]
    pub fn substring<'a>(&self, buffer: &'a [u8]) -> &'a [u8] {
        &buffer[self.offset..self.offset + self.length]
    }
}

/// Log-odds of corpus membership given the observed hit counts.
///
/// `prior_bias` is the additive pseudocount applied to all four terms. With
/// a zero bias a zero denominator makes the result non-finite; callers drop
/// such candidates.
pub fn log_odds(
    input0_hits: usize,
    input1_hits: usize,
    denom0: usize,
    denom1: usize,
    prior_bias: f64,
) -> f64 {
    let posterior = (input0_hits as f64 + prior_bias) / (input1_hits as f64 + prior_bias);
    let prior = (denom0 as f64 + prior_bias) / (denom1 as f64 + prior_bias);

    (posterior / prior).ln()
}

/// Convert a probability threshold into the equivalent log-odds magnitude.
pub fn threshold_log_odds(probability: f64) -> f64 {
    (probability / (1.0 - probability)).ln()
}

/// Cheap scalar identity for a document set.
///
/// Mixes each 32-bit bitmap word with a deterministic pseudorandom stream so
/// that different sets collide with negligible probability, while equal sets
/// always hash equally.
pub fn set_hash(words: &[u32]) -> u64 {
    let mut state: u32 = 123;
    let mut hash: u64 = 0;

    for &word in words {
        state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        hash = hash
            .wrapping_add((word ^ state) as u64)
            .wrapping_add((word as u64) << 24);
    }

    hash
}

/// Insert `candidate` into the arena, applying redundancy suppression.
///
/// Existing features with the same log-odds sign are scanned linearly:
///
/// - an equal document set (when `match_equal_sets`) keeps the shorter
///   substring, breaking length ties lexicographically;
/// - a feature sharing the candidate's start offset, or containing it, or
///   contained by it, survives only if it is the more predictive of the two
///   (ties keep the longer); otherwise the candidate replaces it in place.
///
/// Candidates that interact with no existing feature are appended.
pub fn insert_feature(
    features: &mut Vec<Feature>,
    candidate: Feature,
    buffer: &[u8],
    filter_redundant: bool,
    match_equal_sets: bool,
) {
    if !filter_redundant {
        features.push(candidate);
        return;
    }

    for feature in features.iter_mut() {
        if (feature.log_odds >= 0.0) != (candidate.log_odds >= 0.0) {
            continue;
        }

        let existing = feature.substring(buffer);
        let incoming = candidate.substring(buffer);

        if match_equal_sets && feature.set_hash == candidate.set_hash {
            if candidate.length < feature.length
                || (candidate.length == feature.length && incoming < existing)
            {
                *feature = candidate;
            }
            return;
        }

        let related = feature.offset == candidate.offset
            || memmem::find(existing, incoming).is_some()
            || memmem::find(incoming, existing).is_some();
        if !related {
            continue;
        }

        if feature.log_odds.abs() > candidate.log_odds.abs() {
            return;
        }
        if feature.log_odds.abs() == candidate.log_odds.abs() && feature.length > candidate.length
        {
            return;
        }

        *feature = candidate;
        return;
    }

    features.push(candidate);
}
