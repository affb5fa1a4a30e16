#![no_main]

use libfuzzer_sys::fuzz_target;
use serde_json::Value;
use treepath_core::find_in_value;

// Arbitrary JSON must never panic, and any match must be the path tail.
fuzz_target!(|data: &[u8]| {
    let Some((&key_len, rest)) = data.split_first() else {
        return;
    };
    let split = usize::from(key_len).min(rest.len());
    let (key, body) = rest.split_at(split);
    let Ok(key) = std::str::from_utf8(key) else {
        return;
    };
    let Ok(forest) = serde_json::from_slice::<Value>(body) else {
        return;
    };

    let mut calls = 0_usize;
    let found = find_in_value(&forest, key, |node| {
        calls += 1;
        node.is_number() && calls % 2 == 0
    });
    assert_eq!(found.target().is_some(), found.is_found());
    if let Some(target) = found.target() {
        assert!(target.is_number());
        assert!(found.path().iter().all(|node| !node.is_null()));
    }
});
