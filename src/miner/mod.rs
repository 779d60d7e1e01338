//! The substring mining engine.
//!
//! This module wires the pipeline together:
//!
//! - [`suffix`] - suffix array construction (external sort) and filtering
//! - [`lcp`] - separator-bounded longest-common-prefix array
//! - [`documents`] - document boundary index and per-candidate bitmap
//! - [`ngrams`] - per-length denominators for the prior odds
//! - [`counter`] - blockwise occurrence counting in the second corpus
//! - [`scorer`] - log-odds scoring and redundant-feature suppression
//! - [`cover`] - greedy document cover over the admitted features
//!
//! The driver itself walks the LCP array of the first corpus and emits every
//! maximal repeated substring, longest first within each widening window of
//! suffix-array entries. Everything an invocation builds lives on the stack
//! of [`Miner::run`]; the miner retains nothing between runs.

pub mod counter;
pub mod cover;
pub mod documents;
pub mod lcp;
pub mod ngrams;
pub mod scorer;
pub mod suffix;

pub use scorer::Feature;

use ahash::AHashSet;
use anyhow::{ensure, Result};
use counter::CounterInB;
use cover::find_cover;
use documents::{DocumentBitmap, DocumentIndex};
use lcp::build_lcp;
use ngrams::ngram_counts;
use scorer::{insert_feature, log_odds, set_hash, threshold_log_odds};
use std::sync::Mutex;
use suffix::{build_suffix_array, filter_suffixes};

/// Mining options. All fields may be set directly; the defaults reproduce
/// the plain counting mode.
#[derive(Debug, Clone)]
pub struct MinerConfig {
    /// Count each substring at most once per document, on both sides.
    pub document_mode: bool,
    /// Within a window, skip shorter prefixes whose count equals the count
    /// of the candidate just recorded.
    pub skip_samecount_prefixes: bool,
    /// Input is (class, byte) pairs: substrings must start at even offsets
    /// and have even lengths.
    pub color_pairs: bool,
    /// Reject substrings not bounded by whitespace on both sides.
    pub word_boundaries: bool,
    /// Run the greedy document cover instead of emitting features directly.
    /// Implies document mode.
    pub cover: bool,
    /// Suppress features made redundant by an overlapping, more predictive
    /// feature.
    pub filter_redundant: bool,
    /// Permit two features covering the exact same document set.
    pub allow_equal_sets: bool,
    /// Additive pseudocount applied to both sides of the odds.
    pub prior_bias: f64,
    /// Minimum probability for admission, converted to a log-odds magnitude.
    /// Zero disables the check.
    pub threshold: f64,
    /// Minimum occurrence (or document) count in the first corpus. Negative
    /// means unset: document mode then falls back to `threshold_percent`.
    pub threshold_count: i32,
    /// Minimum percentage of first-corpus documents containing the
    /// substring. Document mode only.
    pub threshold_percent: u32,
    /// Maximum occurrence (or document) count in the second corpus.
    pub input1_threshold: usize,
    /// Minimum number of newly covered documents for the cover pass to emit
    /// a feature.
    pub cover_threshold: usize,
    /// Hard cap on candidate length.
    pub max_suffix_size: usize,
    /// Document separator byte.
    pub separator: u8,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            document_mode: false,
            skip_samecount_prefixes: false,
            color_pairs: false,
            word_boundaries: false,
            cover: false,
            filter_redundant: true,
            allow_equal_sets: true,
            prior_bias: 1.0,
            threshold: 0.0,
            threshold_count: -1,
            threshold_percent: 5,
            input1_threshold: usize::MAX,
            cover_threshold: 0,
            max_suffix_size: 32,
            separator: 0,
        }
    }
}

/// A maximal repeated substring produced by the LCP walk, before scoring.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    /// Lowest occurrence offset across the window.
    offset: usize,
    length: usize,
    /// Occurrences in the window, or distinct documents in document mode.
    count: usize,
    /// Suffix-array window `[start, end)` whose entries all carry the
    /// substring.
    window: (usize, usize),
}

/// The mining context: both corpora in one buffer, plus the configuration.
///
/// Substring slices handed to the sink borrow the miner's buffer and are
/// valid for the duration of the sink call.
pub struct Miner {
    buffer: Vec<u8>,
    input0_len: usize,
    config: MinerConfig,
}

impl Miner {
    /// Copy both corpora into a contiguous buffer joined by the separator.
    ///
    /// Fails if the combined input does not fit the suffix sorter's signed
    /// 32-bit offsets.
    pub fn new(input0: &[u8], input1: &[u8], config: MinerConfig) -> Result<Self> {
        let total = input0.len() + 1 + input1.len();
        ensure!(
            total <= i32::MAX as usize,
            "combined input of {total} bytes exceeds the suffix sorter's index range"
        );

        let mut buffer = Vec::with_capacity(total);
        buffer.extend_from_slice(input0);
        buffer.push(config.separator);
        buffer.extend_from_slice(input1);

        Ok(Self {
            buffer,
            input0_len: input0.len(),
            config,
        })
    }

    /// Run the full pipeline, delivering every admitted feature to `sink` as
    /// `(input0_hits, input1_hits, log_odds, substring)`.
    ///
    /// Direct emissions arrive in LCP-traversal order; cover emissions in
    /// descending log-odds order. A sink error aborts the run and propagates
    /// unchanged.
    pub fn run<F>(&self, sink: &mut F) -> Result<()>
    where
        F: FnMut(usize, usize, f64, &[u8]) -> Result<()>,
    {
        let config = &self.config;
        debug_assert!(config.threshold_percent <= 100);
        debug_assert!(config.prior_bias >= 0.0);
        debug_assert!((0.0..1.0).contains(&config.threshold));

        let document_mode = config.document_mode || config.cover;
        let separator = config.separator;

        let input0 = &self.buffer[..self.input0_len];
        let input1 = &self.buffer[self.input0_len + 1..];

        let (mut suffixes0, mut suffixes1) = rayon::join(
            || build_suffix_array(input0),
            || build_suffix_array(input1),
        );

        filter_suffixes(&mut suffixes0, input0, separator, config.color_pairs);
        filter_suffixes(&mut suffixes1, input1, separator, config.color_pairs);

        // Rebase the second corpus's offsets into the combined buffer so
        // document lookups work on either side.
        let base = (self.input0_len + 1) as i32;
        for offset in &mut suffixes1 {
            *offset += base;
        }

        if suffixes0.is_empty() {
            return Ok(());
        }

        let shared_prefixes = build_lcp(input0, &suffixes0, separator, config.max_suffix_size);

        let ngrams0 = ngram_counts(input0, separator);
        let ngrams1 = ngram_counts(input1, separator);

        let docs = document_mode.then(|| DocumentIndex::build(&self.buffer, self.input0_len, separator));

        let input0_threshold = if config.threshold_count >= 0 {
            config.threshold_count as usize
        } else if let Some(docs) = &docs {
            docs.input0_docs() * config.threshold_percent as usize / 100
        } else {
            0
        };

        let features = Mutex::new(Vec::new());

        let mut pass = Pass {
            buffer: &self.buffer,
            input0_len: self.input0_len,
            config,
            document_mode,
            suffixes0: &suffixes0,
            counter: CounterInB::new(&self.buffer, &suffixes1),
            bitmap: docs
                .as_ref()
                .map(|d| DocumentBitmap::new(d.slot_count(), d.input1_partition())),
            docs: docs.as_ref(),
            ngrams0,
            ngrams1,
            input0_threshold,
            min_log_odds: (config.threshold > 0.0).then(|| threshold_log_odds(config.threshold)),
            features: &features,
        };

        self.enumerate(&shared_prefixes, &suffixes0, &mut pass)?;

        let mut features = features.into_inner().unwrap();

        if config.cover {
            find_cover(
                &mut features,
                &self.buffer,
                self.input0_len,
                separator,
                config.cover_threshold,
                sink,
            )?;
        } else {
            for feature in &features {
                sink(
                    feature.input0_hits,
                    feature.input1_hits,
                    feature.log_odds,
                    feature.substring(&self.buffer),
                )?;
            }
        }

        Ok(())
    }

    /// Walk the LCP array and feed every maximal repeated substring to the
    /// admission pass.
    ///
    /// Position `i` opens a window whenever the shared prefix of ranks
    /// `i - 1` and `i` exceeds the previous one: the window widens rightward
    /// while the LCP stays at or above the candidate length, and each time
    /// it drops, the window seen so far is exactly the occurrence set of one
    /// maximal substring. Shorter candidates are recorded as the length
    /// steps down, then the whole window is processed shortest-first so the
    /// candidate stream stays lexicographically ascending.
    fn enumerate(&self, shared_prefixes: &[u32], suffixes: &[i32], pass: &mut Pass) -> Result<()> {
        let config = &self.config;
        let total = suffixes.len();
        let step = if config.color_pairs { 2 } else { 1 };

        let mut previous_prefix = 0usize;
        let mut window_docs: AHashSet<u32> = AHashSet::new();
        let mut candidates: Vec<Candidate> = Vec::new();

        for i in 1..total {
            let prefix = shared_prefixes[i - 1] as usize;

            if prefix > previous_prefix {
                candidates.clear();

                if pass.document_mode {
                    window_docs.clear();
                    window_docs.insert(pass.doc_of(suffixes[i - 1]));
                    window_docs.insert(pass.doc_of(suffixes[i]));
                }

                let mut count = 2usize;
                let mut first_occurrence =
                    suffixes[i - 1].min(suffixes[i]) as usize;
                let mut j = i + 1;

                let mut length = if config.color_pairs {
                    prefix & !1
                } else {
                    prefix
                };

                while j <= total && length > previous_prefix {
                    if (shared_prefixes[j - 1] as usize) < length {
                        let admitted_count = if pass.document_mode {
                            window_docs.len()
                        } else {
                            count
                        };

                        let same_as_last = candidates
                            .last()
                            .is_some_and(|last| last.count == admitted_count);

                        if !(config.skip_samecount_prefixes && same_as_last) {
                            candidates.push(Candidate {
                                offset: first_occurrence,
                                length,
                                count: admitted_count,
                                window: (i - 1, j),
                            });
                        }

                        length -= step;
                        continue;
                    }

                    if pass.document_mode {
                        window_docs.insert(pass.doc_of(suffixes[j]));
                    }
                    first_occurrence = first_occurrence.min(suffixes[j] as usize);
                    count += 1;
                    j += 1;
                }

                for candidate in candidates.drain(..).rev() {
                    pass.admit(candidate)?;
                }
            }

            previous_prefix = prefix;
        }

        Ok(())
    }
}

/// Per-invocation admission state, threaded through the enumerator.
struct Pass<'a> {
    buffer: &'a [u8],
    input0_len: usize,
    config: &'a MinerConfig,
    document_mode: bool,
    suffixes0: &'a [i32],
    counter: CounterInB<'a>,
    bitmap: Option<DocumentBitmap>,
    docs: Option<&'a DocumentIndex>,
    ngrams0: Vec<usize>,
    ngrams1: Vec<usize>,
    input0_threshold: usize,
    min_log_odds: Option<f64>,
    features: &'a Mutex<Vec<Feature>>,
}

impl Pass<'_> {
    #[inline]
    fn doc_of(&self, offset: i32) -> u32 {
        self.docs
            .map(|docs| docs.doc_id(offset as usize) as u32)
            .unwrap_or(0)
    }

    /// Score one candidate and insert it into the feature arena if it
    /// survives the gates.
    fn admit(&mut self, candidate: Candidate) -> Result<()> {
        if candidate.count < self.input0_threshold {
            return Ok(());
        }

        let buffer = self.buffer;
        let pattern = &buffer[candidate.offset..candidate.offset + candidate.length];
        let range = self.counter.range(pattern);

        // Distinct-document counts come from one bitmap spanning both
        // corpora, rebuilt per candidate.
        let (input0_hits, input1_hits, hash) =
            if let (Some(docs), Some(bitmap)) = (self.docs, self.bitmap.as_mut()) {
                bitmap.clear();

                let (start, end) = candidate.window;
                for &offset in &self.suffixes0[start..end] {
                    bitmap.insert(docs.doc_id(offset as usize));
                }
                for position in range.clone() {
                    bitmap.insert(docs.doc_id(self.counter.suffix_at(position)));
                }

                (
                    bitmap.input0_hits(),
                    bitmap.input1_hits(),
                    set_hash(bitmap.words()),
                )
            } else {
                (candidate.count, range.len(), 0)
            };

        if input1_hits > self.config.input1_threshold {
            return Ok(());
        }

        if self.config.word_boundaries && !self.word_bounded(&candidate) {
            return Ok(());
        }

        let (denom0, denom1) = match self.docs {
            Some(docs) => (docs.input0_docs(), docs.input1_docs()),
            None => (
                self.ngrams0.get(candidate.length).copied().unwrap_or(0),
                self.ngrams1.get(candidate.length).copied().unwrap_or(0),
            ),
        };

        let odds = log_odds(
            input0_hits,
            input1_hits,
            denom0,
            denom1,
            self.config.prior_bias,
        );
        if !odds.is_finite() {
            return Ok(());
        }

        if let Some(min) = self.min_log_odds {
            if odds.abs() < min {
                return Ok(());
            }
        }

        let feature = Feature {
            offset: candidate.offset,
            length: candidate.length,
            log_odds: odds,
            input0_hits,
            input1_hits,
            set_hash: hash,
        };

        let mut features = self.features.lock().unwrap();
        insert_feature(
            &mut features,
            feature,
            self.buffer,
            self.config.filter_redundant,
            self.document_mode && !self.config.allow_equal_sets,
        );

        Ok(())
    }

    /// Whitespace on both sides of the first occurrence, within the first
    /// corpus.
    fn word_bounded(&self, candidate: &Candidate) -> bool {
        if candidate.offset > 0 && !self.buffer[candidate.offset - 1].is_ascii_whitespace() {
            return false;
        }

        let after = candidate.offset + candidate.length;
        if after < self.input0_len && !self.buffer[after].is_ascii_whitespace() {
            return false;
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(input0: &[u8], input1: &[u8], config: MinerConfig) -> Vec<(usize, usize, Vec<u8>)> {
        let miner = Miner::new(input0, input1, config).unwrap();
        let mut features = Vec::new();
        miner
            .run(&mut |hits0, hits1, _odds, substring| {
                features.push((hits0, hits1, substring.to_vec()));
                Ok(())
            })
            .unwrap();
        features
    }

    fn plain_config() -> MinerConfig {
        MinerConfig {
            filter_redundant: false,
            ..Default::default()
        }
    }

    #[test]
    fn counts_occurrences_on_both_sides() {
        let features = collect(b"abcabc", b"abx", plain_config());

        let abc = features.iter().find(|f| f.2 == b"abc").unwrap();
        assert_eq!((abc.0, abc.1), (2, 0));

        let ab = features.iter().find(|f| f.2 == b"ab").unwrap();
        assert_eq!((ab.0, ab.1), (2, 1));
    }

    #[test]
    fn emits_in_lcp_traversal_order() {
        let features = collect(b"abcabc", b"", plain_config());
        let substrings: Vec<&[u8]> = features.iter().map(|f| f.2.as_slice()).collect();

        // Per window, shortest first; windows in suffix order.
        assert_eq!(
            substrings,
            vec![
                b"a".as_slice(),
                b"ab",
                b"abc",
                b"b",
                b"bc",
                b"c"
            ]
        );
    }

    #[test]
    fn skip_samecount_drops_equal_count_prefixes() {
        let config = MinerConfig {
            skip_samecount_prefixes: true,
            ..plain_config()
        };
        let features = collect(b"abcabc", b"", config);
        let substrings: Vec<&[u8]> = features.iter().map(|f| f.2.as_slice()).collect();

        // "a" and "ab" carry the same count as "abc"; "b" the same as "bc".
        assert_eq!(substrings, vec![b"abc".as_slice(), b"bc", b"c"]);
    }

    #[test]
    fn max_suffix_size_caps_candidate_length() {
        let long = b"0123456789012345678901234567890123456789".repeat(2);
        let features = collect(&long, b"", plain_config());

        assert!(!features.is_empty());
        assert!(features.iter().all(|f| f.2.len() <= 32));
    }

    #[test]
    fn word_boundaries_reject_interior_matches() {
        let config = MinerConfig {
            word_boundaries: true,
            ..plain_config()
        };
        let features = collect(b"foo foobar foo", b"", config);
        let substrings: Vec<&[u8]> = features.iter().map(|f| f.2.as_slice()).collect();

        // "foo" occurs three times but only the space-bounded form survives;
        // "foob..." prefixes and "oo" interiors are rejected.
        assert!(substrings.contains(&b"foo".as_slice()));
        assert!(!substrings.contains(&b"fo".as_slice()));
        assert!(!substrings.contains(&b"oo".as_slice()));
    }

    #[test]
    fn sink_error_propagates() {
        let miner = Miner::new(b"abcabc", b"", plain_config()).unwrap();
        let result = miner.run(&mut |_, _, _, _| anyhow::bail!("sink failed"));

        assert_eq!(result.unwrap_err().to_string(), "sink failed");
    }

    #[test]
    fn empty_first_corpus_yields_nothing() {
        assert!(collect(b"", b"whatever", plain_config()).is_empty());
        assert!(collect(b"", b"", plain_config()).is_empty());
    }

    #[test]
    fn document_mode_counts_documents_once() {
        let config = MinerConfig {
            document_mode: true,
            ..plain_config()
        };
        // Three documents, one containing "zz" twice.
        let features = collect(b"zz azz\0zz\0qq", b"", config);

        let zz = features.iter().find(|f| f.2 == b"zz").unwrap();
        assert_eq!(zz.0, 2);
    }

    #[test]
    fn color_pairs_restrict_alignment_and_length() {
        let config = MinerConfig {
            color_pairs: true,
            ..plain_config()
        };
        // Tagged stream: pairs (A,a)(A,b)(A,a)(A,b).
        let features = collect(b"AaAbAaAb", b"", config);

        assert!(!features.is_empty());
        for (_, _, substring) in &features {
            assert_eq!(substring.len() % 2, 0);
        }
    }
}
