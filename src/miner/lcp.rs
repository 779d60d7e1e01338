//! Longest-common-prefix array construction.
//!
//! Kasai's algorithm over a filtered suffix array, with two deviations from
//! the textbook version: the byte comparison stops at the first separator on
//! either side (so no shared prefix ever spans a document boundary), and it
//! stops at `max_prefix` (longer prefixes can never become candidates, so
//! measuring them is wasted work).

/// Build the LCP array for `suffixes` over `text`.
///
/// `result[i]` is the length of the longest common prefix of
/// `text[suffixes[i]..]` and `text[suffixes[i + 1]..]`, capped at
/// `max_prefix` and at the first separator byte. The last entry is zero.
///
/// `suffixes` may be shorter than `text` (filtered); positions missing from
/// it are skipped while keeping Kasai's carry-over bound valid, since the
/// carry only ever drops by one per text position.
pub fn build_lcp(text: &[u8], suffixes: &[i32], separator: u8, max_prefix: usize) -> Vec<u32> {
    let mut rank = vec![u32::MAX; text.len()];

    for (i, &offset) in suffixes.iter().enumerate() {
        rank[offset as usize] = i as u32;
    }

    let mut result = vec![0u32; suffixes.len()];
    let mut h = 0usize;

    for i in 0..text.len() {
        let x = rank[i];

        // Filtered-out position, or the lexicographically last suffix
        // (which has no successor to compare against).
        if x == u32::MAX || x as usize + 1 == suffixes.len() {
            h = h.saturating_sub(1);
            continue;
        }

        let j = suffixes[x as usize + 1] as usize;

        while h < max_prefix
            && i + h < text.len()
            && j + h < text.len()
            && text[i + h] != separator
            && text[i + h] == text[j + h]
        {
            h += 1;
        }

        result[x as usize] = h as u32;

        h = h.saturating_sub(1);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::miner::suffix::{build_suffix_array, filter_suffixes};

    fn lcp_of(text: &[u8], separator: u8, max_prefix: usize) -> (Vec<i32>, Vec<u32>) {
        let mut suffixes = build_suffix_array(text);
        filter_suffixes(&mut suffixes, text, separator, false);
        let lcp = build_lcp(text, &suffixes, separator, max_prefix);
        (suffixes, lcp)
    }

    /// Reference comparison, used to cross-check the Kasai carry-over.
    fn naive_lcp(text: &[u8], a: usize, b: usize, separator: u8, max_prefix: usize) -> u32 {
        let mut h = 0;
        while h < max_prefix
            && a + h < text.len()
            && b + h < text.len()
            && text[a + h] != separator
            && text[a + h] == text[b + h]
        {
            h += 1;
        }
        h as u32
    }

    #[test]
    fn matches_naive_computation() {
        let text = b"mississippi river missions";
        let (suffixes, lcp) = lcp_of(text, 0, 32);

        for i in 0..suffixes.len() - 1 {
            let expected = naive_lcp(text, suffixes[i] as usize, suffixes[i + 1] as usize, 0, 32);
            assert_eq!(lcp[i], expected, "mismatch at rank {i}");
        }
        assert_eq!(*lcp.last().unwrap(), 0);
    }

    #[test]
    fn shared_prefixes_really_match() {
        let text = b"abracadabra";
        let (suffixes, lcp) = lcp_of(text, 0, 32);

        for i in 0..suffixes.len() - 1 {
            let a = suffixes[i] as usize;
            let b = suffixes[i + 1] as usize;
            let h = lcp[i] as usize;

            assert_eq!(text[a..a + h], text[b..b + h]);
            // Maximality: the next byte differs or one side ends.
            if a + h < text.len() && b + h < text.len() {
                assert_ne!(text[a + h], text[b + h]);
            }
        }
    }

    #[test]
    fn comparison_stops_at_separator() {
        // Both suffixes continue identically past the separator; the shared
        // prefix must still be cut at it.
        let text = b"abc\0xyz abc\0xyz";
        let (suffixes, lcp) = lcp_of(text, 0, 32);

        for i in 0..suffixes.len() - 1 {
            let a = suffixes[i] as usize;
            let h = lcp[i] as usize;
            assert!(!text[a..a + h].contains(&0));
            assert!(h <= 4); // "xyz " is the longest separator-free repeat
        }
    }

    #[test]
    fn cap_bounds_reported_prefixes() {
        let text = b"aaaaaaaaaaaaaaaaaaaa";
        let (_, lcp) = lcp_of(text, 0, 5);
        assert!(lcp.iter().all(|&h| h <= 5));
        assert!(lcp.contains(&5));
    }
}
