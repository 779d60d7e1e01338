#![no_main]

use libfuzzer_sys::fuzz_target;
use salient::tagger::StreamTagger;

fuzz_target!(|data: &[u8]| {
    let mut tagger = StreamTagger::new();
    for &byte in data {
        let class = tagger.classify(byte);
        assert!(class <= 7);
    }
});
