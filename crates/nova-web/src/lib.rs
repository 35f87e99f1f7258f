#![forbid(unsafe_code)]

//! Browser host for the Nova appearance controller.
//!
//! On `wasm32` this crate provides the three host seams backed by the DOM:
//!
//! - `LocalStorage`: [`PreferenceStore`](nova_runtime::PreferenceStore) over
//!   `window.localStorage`.
//! - `MediaQueryPreference`: the `prefers-color-scheme` media query and its
//!   `change` event.
//! - `DomSurface`: class lists of `<html>` and `<body>`, and inline style
//!   variables on `<html>`.
//!
//! `WebTheme` is the `wasm-bindgen` export that wires them into a
//! [`ThemeController`](nova_runtime::ThemeController) and re-broadcasts every
//! change as a `CustomEvent` on `window`:
//!
//! ```js
//! const theme = new WebTheme();
//! window.addEventListener("nova:appearance-change", (e) => {
//!   console.log(e.detail.mode); // "dark" | "light"
//! });
//! theme.toggle();
//! ```
//!
//! The payload format and query string live here so native tests can cover
//! them.

use nova_style::AppearanceMode;
use serde::{Deserialize, Serialize};

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::{DomSurface, LocalStorage, MediaQueryPreference, WebTheme};

/// Media query that matches when the OS prefers a dark appearance.
pub const PREFERS_DARK_QUERY: &str = "(prefers-color-scheme: dark)";

/// `detail` of the change event dispatched on `window`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEventDetail {
    pub mode: AppearanceMode,
}

/// JSON text of the change event detail for `mode`.
#[must_use]
pub fn change_event_detail(mode: AppearanceMode) -> String {
    serde_json::to_string(&ChangeEventDetail { mode })
        .unwrap_or_else(|_| format!(r#"{{"mode":"{}"}}"#, mode.as_str()))
}

/// Style variables for `mode` as a JSON object (`{"--background": "rgb(..)", ..}`).
#[must_use]
pub fn token_properties_json(mode: AppearanceMode) -> String {
    let properties: serde_json::Map<String, serde_json::Value> =
        nova_style::StyleTokens::for_mode(mode)
            .css_properties()
            .map(|(name, value)| (name.to_string(), serde_json::Value::String(value)))
            .collect();
    serde_json::Value::Object(properties).to_string()
}
