// SPDX-License-Identifier: AGPL-3.0-or-later
#![no_main]

use libfuzzer_sys::fuzz_target;
use sparkpad_core::{snapshot, EditorState, RuleEngine};

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    // stored snapshots come from an untrusted store
    if let Ok(content) = snapshot::deserialize(input) {
        let json = snapshot::serialize(&content).expect("serialize restored content");
        assert_eq!(snapshot::deserialize(&json).ok().as_ref(), Some(&content));
    }

    let rules = RuleEngine::default();
    let mut state = EditorState::create_empty();
    for character in input.chars().take(256) {
        state = match rules.on_before_character(character, &state).into_state() {
            Some(next) => next,
            None => state.insert_text(character.encode_utf8(&mut [0u8; 4])),
        };
    }
});
