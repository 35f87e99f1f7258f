#![forbid(unsafe_code)]

//! DOM-backed host seams and the `wasm-bindgen` export.
//!
//! Only compiled on `wasm32` targets.

use js_sys::{JSON, Object, Reflect};
use nova_runtime::{
    PreferenceListener, PreferenceSource, PreferenceStore, PreferenceSubscription, StorageError,
    StorageResult, StyleSurface, Subscription, SurfaceError, ThemeConfig, ThemeController,
};
use nova_style::{AppearanceMode, StyleTarget};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    CustomEvent, CustomEventInit, Document, DomException, Element, HtmlElement, MediaQueryList,
    MediaQueryListEvent,
};

use crate::{PREFERS_DARK_QUERY, change_event_detail};

fn report(msg: &str) {
    #[cfg(feature = "tracing")]
    tracing::warn!(target: "nova_web", "{msg}");
    #[cfg(not(feature = "tracing"))]
    web_sys::console::warn_1(&JsValue::from_str(msg));
}

fn js_message(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    format!("{value:?}")
}

// ---------------------------------------------------------------------------
// LocalStorage
// ---------------------------------------------------------------------------

/// `window.localStorage`, looked up on every call.
///
/// Private browsing modes and sandboxed frames throw on access; those
/// surface as [`StorageError::Unavailable`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

impl LocalStorage {
    fn storage() -> StorageResult<web_sys::Storage> {
        let window = web_sys::window().ok_or_else(|| StorageError::Unavailable("no window".into()))?;
        window
            .local_storage()
            .map_err(|e| StorageError::Unavailable(js_message(&e)))?
            .ok_or_else(|| StorageError::Unavailable("localStorage disabled".into()))
    }

    fn write_error(err: JsValue) -> StorageError {
        match err.dyn_ref::<DomException>() {
            Some(dom) if dom.name() == "QuotaExceededError" => StorageError::QuotaExceeded,
            _ => StorageError::Unavailable(js_message(&err)),
        }
    }
}

impl PreferenceStore for LocalStorage {
    fn load(&self, key: &str) -> StorageResult<Option<String>> {
        Self::storage()?
            .get_item(key)
            .map_err(|e| StorageError::Unavailable(js_message(&e)))
    }

    fn store(&mut self, key: &str, value: &str) -> StorageResult<()> {
        Self::storage()?
            .set_item(key, value)
            .map_err(Self::write_error)
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        Self::storage()?
            .remove_item(key)
            .map_err(Self::write_error)
    }

    fn name(&self) -> &'static str {
        "localStorage"
    }
}

// ---------------------------------------------------------------------------
// MediaQueryPreference
// ---------------------------------------------------------------------------

/// The `(prefers-color-scheme: dark)` media query.
///
/// If `matchMedia` is unavailable the preference is undeterminable and
/// watching never fires.
#[derive(Debug, Clone)]
pub struct MediaQueryPreference {
    query: Option<MediaQueryList>,
}

impl MediaQueryPreference {
    #[must_use]
    pub fn new() -> Self {
        let query = web_sys::window().and_then(|w| w.match_media(PREFERS_DARK_QUERY).ok().flatten());
        Self { query }
    }
}

impl Default for MediaQueryPreference {
    fn default() -> Self {
        Self::new()
    }
}

impl PreferenceSource for MediaQueryPreference {
    fn prefers_dark(&self) -> Option<bool> {
        self.query.as_ref().map(MediaQueryList::matches)
    }

    fn watch(&self, listener: PreferenceListener) -> PreferenceSubscription {
        let Some(query) = self.query.clone() else {
            return PreferenceSubscription::inert();
        };
        let closure = Closure::<dyn FnMut(MediaQueryListEvent)>::new(
            move |event: MediaQueryListEvent| listener(event.matches()),
        );
        if let Err(e) =
            query.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref())
        {
            report(&format!("prefers-color-scheme listener not attached: {}", js_message(&e)));
            return PreferenceSubscription::inert();
        }
        PreferenceSubscription::new(move || {
            if let Err(e) =
                query.remove_event_listener_with_callback("change", closure.as_ref().unchecked_ref())
            {
                // Still registered, so the callback must outlive this guard.
                report(&format!("prefers-color-scheme listener not detached: {}", js_message(&e)));
                closure.forget();
                return;
            }
            drop(closure);
        })
    }

    fn name(&self) -> &'static str {
        "matchMedia"
    }
}

// ---------------------------------------------------------------------------
// DomSurface
// ---------------------------------------------------------------------------

/// `document.documentElement` and `document.body`.
#[derive(Debug, Clone)]
pub struct DomSurface {
    document: Option<Document>,
}

impl DomSurface {
    #[must_use]
    pub fn new() -> Self {
        Self {
            document: web_sys::window().and_then(|w| w.document()),
        }
    }

    fn element(&self, target: StyleTarget) -> Result<Element, SurfaceError> {
        let document = self
            .document
            .as_ref()
            .ok_or_else(|| SurfaceError::Rejected("no document".into()))?;
        let element = match target {
            StyleTarget::Root => document.document_element(),
            StyleTarget::Body => document.body().map(Element::from),
        };
        element.ok_or(SurfaceError::MissingTarget(target))
    }
}

impl Default for DomSurface {
    fn default() -> Self {
        Self::new()
    }
}

fn rejected(err: JsValue) -> SurfaceError {
    SurfaceError::Rejected(js_message(&err))
}

impl StyleSurface for DomSurface {
    fn add_marker(&mut self, target: StyleTarget, marker: &str) -> Result<(), SurfaceError> {
        self.element(target)?.class_list().add_1(marker).map_err(rejected)
    }

    fn remove_marker(&mut self, target: StyleTarget, marker: &str) -> Result<(), SurfaceError> {
        self.element(target)?
            .class_list()
            .remove_1(marker)
            .map_err(rejected)
    }

    fn set_property(&mut self, name: &str, value: &str) -> Result<(), SurfaceError> {
        let root = self
            .element(StyleTarget::Root)?
            .dyn_into::<HtmlElement>()
            .map_err(|_| SurfaceError::Rejected("root element has no inline style".into()))?;
        root.style().set_property(name, value).map_err(rejected)
    }
}

// ---------------------------------------------------------------------------
// WebTheme
// ---------------------------------------------------------------------------

fn dispatch_change(event_name: &str, mode: AppearanceMode) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let detail = JSON::parse(&change_event_detail(mode))?;
    let init = CustomEventInit::new();
    init.set_detail(&detail);
    let event = CustomEvent::new_with_event_init_dict(event_name, &init)?;
    window.dispatch_event(&event)?;
    Ok(())
}

/// Appearance controller for a browser page.
///
/// Construction resolves and applies the mode immediately, so create it as
/// early as possible (before first paint) to avoid a flash of the wrong
/// appearance.
#[wasm_bindgen]
pub struct WebTheme {
    controller: ThemeController,
    _changes: Subscription,
    _system: PreferenceSubscription,
}

#[wasm_bindgen]
impl WebTheme {
    /// `storageKey` and `eventName` default to `nova.appearance` and
    /// `nova:appearance-change`.
    #[wasm_bindgen(constructor)]
    pub fn new(storage_key: Option<String>, event_name: Option<String>) -> Result<WebTheme, JsValue> {
        let mut config = ThemeConfig::default();
        if let Some(key) = storage_key {
            config = config.with_storage_key(key);
        }
        if let Some(name) = event_name {
            config = config.with_event_name(name);
        }
        let config = config
            .validated()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let event_name = config.event_name.clone();

        let controller = ThemeController::builder()
            .config(config)
            .storage(LocalStorage)
            .preference(MediaQueryPreference::new())
            .surface(DomSurface::new())
            .build();
        let changes = controller.subscribe(move |mode| {
            if let Err(e) = dispatch_change(&event_name, mode) {
                report(&format!("{event_name} not dispatched: {}", js_message(&e)));
            }
        });
        controller.initialize();
        let system = controller.on_external_preference_change(|_| {});

        Ok(Self {
            controller,
            _changes: changes,
            _system: system,
        })
    }

    /// `"dark"` or `"light"`.
    pub fn mode(&self) -> String {
        self.controller.mode().as_str().to_string()
    }

    #[wasm_bindgen(js_name = isReady)]
    pub fn is_ready(&self) -> bool {
        self.controller.is_ready()
    }

    /// Throws on anything other than `dark`/`light` (case-insensitive).
    #[wasm_bindgen(js_name = setMode)]
    pub fn set_mode(&self, mode: &str) -> Result<(), JsValue> {
        let mode: AppearanceMode = mode
            .parse()
            .map_err(|e: nova_style::ParseModeError| JsValue::from_str(&e.to_string()))?;
        self.controller.set_mode(mode);
        Ok(())
    }

    pub fn toggle(&self) -> String {
        self.controller.toggle().as_str().to_string()
    }

    #[wasm_bindgen(js_name = clearPreference)]
    pub fn clear_preference(&self) -> String {
        self.controller.clear_preference().as_str().to_string()
    }

    #[wasm_bindgen(js_name = hasExplicitPreference)]
    pub fn has_explicit_preference(&self) -> bool {
        self.controller.has_explicit_preference()
    }

    /// Current style variables as `{ "--background": "rgb(..)", .. }`.
    pub fn tokens(&self) -> JsValue {
        let object = Object::new();
        for (name, value) in self.controller.tokens().css_properties() {
            if let Err(e) = Reflect::set(&object, &JsValue::from_str(name), &JsValue::from_str(&value)) {
                report(&format!("{name} not copied to tokens: {}", js_message(&e)));
            }
        }
        object.into()
    }
}
