#![no_main]

use libfuzzer_sys::fuzz_target;
use namedex::record::{CONTACT_DOMAIN, data_line, parse_line};

fuzz_target!(|data: &str| {
    // Data lines always parse, and the contact is always well formed
    match parse_line(data, 1) {
        Some(entry) => {
            assert!(data_line(data).is_some());
            assert!(entry.derived_contact.ends_with(CONTACT_DOMAIN));
            assert!(!entry.display_name.is_empty());
        }
        None => assert!(data_line(data).is_none()),
    }
});
