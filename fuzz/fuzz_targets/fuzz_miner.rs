#![no_main]

use libfuzzer_sys::fuzz_target;
use salient::miner::{Miner, MinerConfig};

fuzz_target!(|data: &[u8]| {
    // Split the input into two corpora and exercise both counting modes.
    let split = data.first().copied().unwrap_or(0) as usize % (data.len().max(1));
    let (input0, input1) = data.split_at(split);

    for document_mode in [false, true] {
        let config = MinerConfig {
            document_mode,
            filter_redundant: data.len() % 2 == 0,
            skip_samecount_prefixes: data.len() % 3 == 0,
            ..Default::default()
        };

        let Ok(miner) = Miner::new(input0, input1, config) else {
            return;
        };
        let _ = miner.run(&mut |_, _, log_odds, substring| {
            assert!(log_odds.is_finite());
            assert!(!substring.is_empty());
            Ok(())
        });
    }
});
