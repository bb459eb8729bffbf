#![no_main]

use libfuzzer_sys::fuzz_target;
use namedex::index::build::AlphabetIndexer;
use namedex::record::data_line;

fuzz_target!(|data: &str| {
    let mut indexer = AlphabetIndexer::new();
    let mut offset = 0u64;
    for raw in data.split('\n') {
        if let Some(text) = data_line(raw) {
            indexer.observe(text, offset);
        }
        offset += raw.len() as u64 + 1;
    }

    let index = indexer.finish();
    let mut counted = 0;
    for (_, range) in index.iter() {
        assert!(range.start < range.end);
        assert!(range.end <= index.stats.total);
        assert!(range.count <= range.end - range.start);
        if range.contiguous {
            assert_eq!(range.count, range.end - range.start);
        }
        counted += range.count;
    }
    assert!(counted <= index.stats.total);
});
