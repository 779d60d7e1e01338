//! Suffix array construction and filtering.
//!
//! Construction is delegated to an external suffix-sorting routine
//! (`cdivsufsort`), treated as a black box that turns N bytes into N offsets
//! in ascending lexicographic suffix order. The filter then drops the
//! suffixes that can never start a useful candidate.

/// Build the suffix array for `text` using the external sorting routine.
///
/// Offsets are `i32` because that is the index type of the sorter; inputs
/// larger than `i32::MAX` bytes are rejected before this is reached.
pub fn build_suffix_array(text: &[u8]) -> Vec<i32> {
    let mut suffixes = vec![0i32; text.len()];
    if !text.is_empty() {
        cdivsufsort::sort_in_place(text, &mut suffixes);
    }
    suffixes
}

/// Compact `suffixes` in place, dropping entries that start:
///
/// - at a separator byte (candidates never contain one),
/// - at a UTF-8 continuation byte (substrings must not begin mid-codepoint),
/// - at an odd offset, in color-pair mode (tagged input is two bytes per
///   character and substrings must stay pair-aligned).
///
/// Relative order is preserved, so the result is still sorted.
pub fn filter_suffixes(suffixes: &mut Vec<i32>, text: &[u8], separator: u8, color_pairs: bool) {
    suffixes.retain(|&offset| {
        if color_pairs && offset & 1 != 0 {
            return false;
        }

        let ch = text[offset as usize];

        ch != separator && ch & 0xc0 != 0x80
    });
}
