#![no_main]

use ccn_core::segmentation::{segment_index, segment_root};
use ccn_core::versioning::{version_as_timestamp, version_root};
use ccn_core::Name;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(uri) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(name) = Name::from_uri(uri) else {
        return;
    };
    let reparsed = Name::from_uri(&name.to_uri()).expect("rendered names must parse");
    assert_eq!(reparsed, name);
    let _ = segment_index(&name);
    let _ = segment_root(&name);
    let _ = version_root(&name);
    let _ = version_as_timestamp(&name);
});
