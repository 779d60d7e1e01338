//! # Salient - Characteristic Substring Miner
//!
//! Salient identifies substrings (arbitrary byte sequences) that are
//! statistically characteristic of one corpus relative to another. Given two
//! byte blobs, each optionally partitioned into documents by a separator
//! byte, it enumerates every maximal repeated substring of the first corpus,
//! counts occurrences (or document coverage) in both corpora, scores each
//! candidate by Bayesian log-odds against a prior, and streams the surviving
//! features to a caller-supplied sink.
//!
//! ## Architecture
//!
//! The crate is organized into these main modules:
//!
//! - [`miner`] - The mining engine (suffix arrays, LCP walk, scoring, cover)
//! - [`output`] - Feature rendering (escaped, tagged-color, JSON)
//! - [`tagger`] - Byte-stream class tagger for RFC-822/HTML payloads
//! - [`concat`] - NUL-separated file concatenation for document-mode input
//!
//! ## Quick Start
//!
//! ```
//! use salient::miner::{Miner, MinerConfig};
//!
//! let config = MinerConfig {
//!     input1_threshold: 0, // keep only substrings absent from the second corpus
//!     filter_redundant: false,
//!     ..Default::default()
//! };
//!
//! let miner = Miner::new(b"aa aa", b"a", config).unwrap();
//!
//! let mut found = Vec::new();
//! miner
//!     .run(&mut |_hits0, _hits1, _log_odds, substring| {
//!         found.push(substring.to_vec());
//!         Ok(())
//!     })
//!     .unwrap();
//!
//! assert_eq!(found, vec![b"aa".to_vec()]);
//! ```
//!
//! ## Performance
//!
//! The engine builds one suffix array per corpus (via an external
//! suffix-sorting routine), derives a separator-bounded LCP array, and walks
//! it once. Candidate lookups in the second corpus reuse a monotonically
//! advancing lower bound and probe the suffix array in cache-sized blocks,
//! so a full mining pass stays close to linear in practice.

pub mod concat;
pub mod miner;
pub mod output;
pub mod tagger;
