#![no_main]

use libfuzzer_sys::fuzz_target;
use treepath_core::matcher::Clause;

// Parsing is total: every input yields a clause or an error, and a parsed
// clause can be evaluated against any node.
fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(clause) = text.parse::<Clause>() {
        let _ = clause.matches(&serde_json::Value::Null);
        let _ = clause.matches(clause.value());
        let _ = clause.to_string();
    }
});
