#![no_main]

use nova_style::{AppearanceMode, StyleToken};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Some(mode) = AppearanceMode::parse(text) {
        assert_eq!(text.trim().to_ascii_lowercase(), mode.as_str());
        assert_eq!(AppearanceMode::parse(mode.as_str()), Some(mode));
    }

    if let Some(token) = StyleToken::parse(text) {
        assert_eq!(StyleToken::parse(token.css_var()), Some(token));
    }
});
