#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use namedex::query::{LineMatcher, SubstringMatcher};
use namedex::record::parse_line;

#[derive(Arbitrary, Debug)]
struct Input {
    line: String,
    query: String,
}

fuzz_target!(|input: Input| {
    // The raw-line prefilter may pass lines that do not match, never the reverse
    let mut matcher = SubstringMatcher::new(&input.query);
    let Some(entry) = parse_line(&input.line, 1) else {
        return;
    };
    if matcher.accept(&entry) {
        assert!(matcher.prefilter(input.line.trim()));
    }
});
