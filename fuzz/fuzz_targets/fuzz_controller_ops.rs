#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use nova_runtime::{ManualPreference, MemoryStorage, MemorySurface, ThemeConfig, ThemeController};
use nova_style::{AppearanceMode, StyleTarget, StyleTokens};

#[derive(Debug, Arbitrary)]
enum Op {
    Initialize,
    Set(bool),
    Toggle,
    Clear,
    Os(Option<bool>),
    FailReads(bool),
    FailWrites(bool),
}

#[derive(Debug, Arbitrary)]
struct Input {
    stored: Option<String>,
    os_dark: Option<bool>,
    persist_resolved: bool,
    ops: Vec<Op>,
}

fuzz_target!(|input: Input| {
    let config = ThemeConfig::default().with_persist_resolved_mode(input.persist_resolved);
    let storage = match &input.stored {
        Some(value) => MemoryStorage::with_entry(&config.storage_key, value),
        None => MemoryStorage::new(),
    };
    let os = ManualPreference::new(input.os_dark);
    let surface = MemorySurface::new();
    let theme = ThemeController::builder()
        .config(config)
        .storage(storage.clone())
        .preference(os.clone())
        .surface(surface.clone())
        .build();
    let _follow = theme.on_external_preference_change(|_| {});

    for op in input.ops.into_iter().take(256) {
        match op {
            Op::Initialize => {
                theme.initialize();
            }
            Op::Set(dark) => theme.set_mode(AppearanceMode::from_prefers_dark(dark)),
            Op::Toggle => {
                theme.toggle();
            }
            Op::Clear => {
                theme.clear_preference();
            }
            Op::Os(value) => os.set(value),
            Op::FailReads(fail) => storage.fail_reads(fail),
            Op::FailWrites(fail) => storage.fail_writes(fail),
        }

        // Once the surface has been written it always mirrors the mode.
        if theme.is_ready() {
            let mode = theme.mode();
            for target in StyleTarget::ALL {
                assert_eq!(surface.markers(target), vec![mode.as_str().to_string()]);
            }
            let tokens = StyleTokens::for_mode(mode);
            for (name, value) in tokens.css_properties() {
                assert_eq!(surface.property(name), Some(value));
            }
        }
    }
});
