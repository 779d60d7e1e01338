//! Document boundary tracking for the concatenated input.
//!
//! The combined buffer is `input0 ++ separator ++ input1`, and each corpus
//! may itself contain separator bytes delimiting documents. This module
//! records every document start, answers `doc_id(offset)` lookups with a
//! fixed-iteration branch-minimal binary search, and provides the reusable
//! bitmap that candidate scoring uses to count distinct documents per side.

use memchr::{memchr, memchr_iter};
use std::ops::Range;

/// Index over the document structure of the combined buffer.
pub struct DocumentIndex {
    /// Start offset of every document, ascending. `starts[0] == 0`.
    starts: Vec<u32>,
    /// First document id belonging to the second corpus.
    input1_partition: usize,
    /// Number of documents in the first corpus.
    input0_docs: usize,
    /// Number of documents in the second corpus.
    input1_docs: usize,
    /// Initial probe distance for `doc_id`.
    first_step: usize,
    /// Fixed probe count for `doc_id`.
    iterations: u32,
}

impl DocumentIndex {
    /// Scan the combined buffer for separators and record document starts.
    ///
    /// `input0_len` is the length of the first corpus; the byte at that
    /// offset is the joining separator.
    pub fn build(buffer: &[u8], input0_len: usize, separator: u8) -> Self {
        let mut starts = vec![0u32];
        starts.extend(memchr_iter(separator, buffer).map(|p| (p + 1) as u32));

        let input1_partition = starts.partition_point(|&s| s as usize <= input0_len);
        let input0_docs = document_ranges(&buffer[..input0_len], separator).len();
        let input1_docs = document_ranges(&buffer[input0_len + 1..], separator).len();

        // ceil(log2(n)) probes with halving steps reach any index below n.
        let iterations = usize::BITS - (starts.len() - 1).leading_zeros();
        let first_step = if iterations > 0 {
            1 << (iterations - 1)
        } else {
            0
        };

        Self {
            starts,
            input1_partition,
            input0_docs,
            input1_docs,
            first_step,
            iterations,
        }
    }

    /// The document containing `offset`.
    ///
    /// Branch-minimal search: the probe count is fixed at build time and the
    /// step sizes are powers of two, so the loop body compiles to a bounds
    /// clamp, one comparison, and a conditional move.
    #[inline]
    pub fn doc_id(&self, offset: usize) -> usize {
        let top = self.starts.len() - 1;
        let mut idx = 0usize;
        let mut step = self.first_step;

        for _ in 0..self.iterations {
            let probe = (idx + step).min(top);
            if self.starts[probe] as usize <= offset {
                idx = probe;
            }
            step >>= 1;
        }

        idx
    }

    /// Total number of document slots, including degenerate empty ones
    /// around the corpus boundary.
    pub fn slot_count(&self) -> usize {
        self.starts.len()
    }

    /// First document id that belongs to the second corpus.
    pub fn input1_partition(&self) -> usize {
        self.input1_partition
    }

    /// Number of documents in the first corpus.
    pub fn input0_docs(&self) -> usize {
        self.input0_docs
    }

    /// Number of documents in the second corpus.
    pub fn input1_docs(&self) -> usize {
        self.input1_docs
    }
}

/// Byte ranges of the separator-delimited documents of `text`.
///
/// A trailing separator does not open an empty final document, matching the
/// document counts used as log-odds denominators.
pub fn document_ranges(text: &[u8], separator: u8) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut start = 0;

    while start != text.len() {
        let end = memchr(separator, &text[start..])
            .map(|p| start + p)
            .unwrap_or(text.len());

        ranges.push(start..end);

        if end == text.len() {
            break;
        }

        start = end + 1;
    }

    ranges
}

/// Reusable bitmap of documents touched by a single candidate.
///
/// Allocated once per mining pass and zero-filled between candidates. The
/// word layout is fixed at 32 bits because the set hash is defined over
/// 32-bit words.
pub struct DocumentBitmap {
    words: Vec<u32>,
    /// Document ids below this belong to the first corpus.
    split: usize,
}

impl DocumentBitmap {
    pub fn new(doc_count: usize, split: usize) -> Self {
        Self {
            words: vec![0u32; doc_count.div_ceil(32)],
            split,
        }
    }

    pub fn clear(&mut self) {
        self.words.fill(0);
    }

    #[inline]
    pub fn insert(&mut self, doc: usize) {
        self.words[doc / 32] |= 1 << (doc % 32);
    }

    /// Number of distinct first-corpus documents in the set.
    pub fn input0_hits(&self) -> usize {
        let full = self.split / 32;
        let mut hits: u32 = self.words[..full].iter().map(|w| w.count_ones()).sum();

        let tail_bits = self.split % 32;
        if tail_bits > 0 {
            hits += (self.words[full] & ((1 << tail_bits) - 1)).count_ones();
        }

        hits as usize
    }

    /// Number of distinct second-corpus documents in the set.
    pub fn input1_hits(&self) -> usize {
        let total: u32 = self.words.iter().map(|w| w.count_ones()).sum();
        total as usize - self.input0_hits()
    }

    /// The raw 32-bit words, for set hashing.
    pub fn words(&self) -> &[u32] {
        &self.words
    }
}
