#![forbid(unsafe_code)]

//! The appearance controller.
//!
//! [`ThemeController`] is the single owner of the current
//! [`AppearanceMode`]. It resolves the mode at startup, persists explicit
//! choices, keeps the styling surface in sync, follows the operating
//! system while the user has not chosen, and broadcasts every change.
//!
//! # Lifecycle
//!
//! 1. Build with [`ThemeController::builder`] or [`ThemeController::new`].
//!    Nothing is read or written yet; [`mode`](ThemeController::mode)
//!    reports the configured default and [`is_ready`](ThemeController::is_ready)
//!    is `false`.
//! 2. Call [`initialize`](ThemeController::initialize) once at startup. The
//!    mode is resolved from (in order) an explicit choice made earlier this
//!    session, the persisted value, the OS preference, and the configured
//!    default. The surface is synced, the controller becomes ready, and
//!    `on_ready` listeners run.
//! 3. Mutate with [`set_mode`](ThemeController::set_mode) /
//!    [`toggle`](ThemeController::toggle).
//!
//! Views that render mode-dependent output must wait for readiness
//! ([`ready_mode`](ThemeController::ready_mode) or
//! [`on_ready`](ThemeController::on_ready)); reading earlier observes the
//! default, which initialization may replace.
//!
//! # Failure handling
//!
//! Storage and surface failures are logged at `warn` and swallowed. The
//! in-memory mode is always authoritative, so callers never see an error.
//! Storage that cannot be read is never overwritten during initialization,
//! and it holds off OS-driven changes as if it held a choice.
//!
//! # Threading
//!
//! Single-threaded: state lives in `Rc<RefCell<..>>` and the controller is
//! `!Send`. No borrow is held while listeners run, so listeners may call
//! back into the controller.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use nova_style::{AppearanceMode, StyleTokens, render_mode};
use tracing::{debug, debug_span, info_span, warn};

use crate::config::ThemeConfig;
use crate::preference::{NoPreference, PreferenceSource, PreferenceSubscription};
use crate::reactive::{Observable, Subscription};
use crate::storage::{MemoryStorage, PreferenceStore, StorageError};
use crate::surface::{MemorySurface, StyleSurface, apply_render};

/// Which rule decided the mode during [`ThemeController::initialize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionSource {
    /// `set_mode` was called before initialization.
    Explicit,
    /// A valid value was found in storage.
    Persisted,
    /// The OS preference source answered.
    System,
    /// Nothing answered; the configured default was used.
    Default,
}

impl ResolutionSource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Explicit => "explicit",
            Self::Persisted => "persisted",
            Self::System => "system",
            Self::Default => "default",
        }
    }
}

/// Result of reading the persisted mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StoredMode {
    Valid(AppearanceMode),
    Absent,
    Unreadable,
}

/// Side-effect sinks, borrowed together for the duration of one update.
struct Effects {
    storage: Box<dyn PreferenceStore>,
    surface: Box<dyn StyleSurface>,
    /// Mode last written to the surface in full, `None` after a failed write.
    applied: Option<AppearanceMode>,
}

struct Shared {
    config: ThemeConfig,
    effects: RefCell<Effects>,
    preference: Box<dyn PreferenceSource>,
    mode: Observable<AppearanceMode>,
    ready_signal: Observable<bool>,
    ready: Cell<bool>,
    explicit: Cell<bool>,
    source: Cell<Option<ResolutionSource>>,
}

/// Shared handle to the appearance state.
///
/// Clones refer to the same controller, so the handle can be passed to
/// every view that needs the mode.
#[derive(Clone)]
pub struct ThemeController {
    shared: Rc<Shared>,
}

impl fmt::Debug for ThemeController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeController")
            .field("mode", &self.mode())
            .field("ready", &self.is_ready())
            .field("explicit", &self.shared.explicit.get())
            .field("storage_key", &self.shared.config.storage_key)
            .field("preference", &self.shared.preference.name())
            .finish_non_exhaustive()
    }
}

impl ThemeController {
    pub fn new(
        config: ThemeConfig,
        storage: impl PreferenceStore + 'static,
        preference: impl PreferenceSource + 'static,
        surface: impl StyleSurface + 'static,
    ) -> Self {
        Self::builder()
            .config(config)
            .storage(storage)
            .preference(preference)
            .surface(surface)
            .build()
    }

    #[must_use]
    pub fn builder() -> ThemeControllerBuilder {
        ThemeControllerBuilder::default()
    }

    #[must_use]
    pub fn config(&self) -> &ThemeConfig {
        &self.shared.config
    }

    /// Resolve, persist, and apply the starting mode.
    ///
    /// Only the first call does any work; later calls return the current
    /// mode unchanged.
    pub fn initialize(&self) -> AppearanceMode {
        if self.is_ready() {
            debug!(mode = self.mode().as_str(), "appearance already initialized");
            return self.mode();
        }

        let span = info_span!(
            "nova.theme.initialize",
            mode = tracing::field::Empty,
            source = tracing::field::Empty
        );
        let _entered = span.enter();

        let (mode, source, stored) = self.resolve();
        span.record("mode", mode.as_str());
        span.record("source", source.as_str());

        {
            let mut effects = self.shared.effects.borrow_mut();
            let unpersisted = matches!(source, ResolutionSource::System | ResolutionSource::Default);
            if unpersisted && self.shared.config.persist_resolved_mode {
                // An unreadable store may still hold a user choice.
                if stored == StoredMode::Unreadable {
                    debug!(mode = mode.as_str(), "storage unreadable; resolved appearance not written");
                } else {
                    self.persist(&mut effects, mode);
                }
            }
            self.apply(&mut effects, mode);
        }

        self.shared.source.set(Some(source));
        self.shared.ready.set(true);
        self.shared.mode.set(mode);
        self.shared.ready_signal.set(true);
        mode
    }

    /// Current mode. Before [`initialize`](Self::initialize) this is the
    /// configured default.
    #[must_use]
    pub fn mode(&self) -> AppearanceMode {
        self.shared.mode.get()
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.shared.ready.get()
    }

    /// The mode, once initialization has completed.
    #[must_use]
    pub fn ready_mode(&self) -> Option<AppearanceMode> {
        self.is_ready().then(|| self.mode())
    }

    /// How the starting mode was chosen, once initialized.
    #[must_use]
    pub fn resolution_source(&self) -> Option<ResolutionSource> {
        self.shared.source.get()
    }

    /// Token table for the current mode.
    #[must_use]
    pub fn tokens(&self) -> StyleTokens {
        StyleTokens::for_mode(self.mode())
    }

    /// Number of mode changes broadcast so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.shared.mode.version()
    }

    /// Set the mode as an explicit user choice.
    ///
    /// The choice is persisted (best effort), the surface is synced, and
    /// listeners are notified if the mode changed. Setting the current mode
    /// again only rewrites storage.
    pub fn set_mode(&self, mode: AppearanceMode) {
        self.shared.explicit.set(true);
        {
            let mut effects = self.shared.effects.borrow_mut();
            self.persist(&mut effects, mode);
            self.apply(&mut effects, mode);
        }
        if self.shared.mode.set(mode) {
            debug!(mode = mode.as_str(), "appearance set");
        }
    }

    /// Flip dark/light and return the new mode.
    pub fn toggle(&self) -> AppearanceMode {
        let next = self.mode().opposite();
        self.set_mode(next);
        next
    }

    /// Whether a user choice overrides OS signals: one was made this
    /// session, a valid value is persisted, or storage cannot be read (and
    /// so may hold one).
    #[must_use]
    pub fn has_explicit_preference(&self) -> bool {
        self.shared.explicit.get() || self.read_persisted() != StoredMode::Absent
    }

    /// Forget the user's choice.
    ///
    /// Removes the persisted value and, if the controller is ready and the
    /// OS preference is known, switches to it. Returns the resulting mode.
    pub fn clear_preference(&self) -> AppearanceMode {
        self.shared.explicit.set(false);
        {
            let key = self.shared.config.storage_key.as_str();
            let mut effects = self.shared.effects.borrow_mut();
            if let Err(e) = effects.storage.remove(key) {
                warn!(key, backend = effects.storage.name(), error = %e, "appearance preference not cleared from storage");
            }
        }
        debug!("appearance preference cleared");
        if let Some(prefers_dark) = self.shared.preference.prefers_dark() {
            self.follow_system(prefers_dark);
        }
        self.mode()
    }

    /// Run `callback` with the new mode after every change.
    pub fn subscribe(&self, callback: impl Fn(AppearanceMode) + 'static) -> Subscription {
        self.shared.mode.subscribe(move |mode| callback(*mode))
    }

    /// Run `callback` once, with the resolved mode, when initialization
    /// completes. If already initialized it runs before this returns.
    pub fn on_ready(&self, callback: impl FnOnce(AppearanceMode) + 'static) -> Subscription {
        if self.is_ready() {
            callback(self.mode());
            return Subscription::empty();
        }
        let slot = RefCell::new(Some(callback));
        let weak = Rc::downgrade(&self.shared);
        self.shared.ready_signal.subscribe(move |ready| {
            if !*ready {
                return;
            }
            let pending = slot.borrow_mut().take();
            if let (Some(callback), Some(shared)) = (pending, weak.upgrade()) {
                callback(shared.mode.get());
            }
        })
    }

    /// Follow OS preference changes while no explicit preference exists.
    ///
    /// The explicit-preference check runs each time the OS signal fires, so
    /// a choice made after registration still takes precedence. When the
    /// signal is adopted the surface is synced and listeners are notified,
    /// but nothing is persisted; then `callback` runs with the adopted mode.
    /// Signals arriving before [`initialize`](Self::initialize) are ignored.
    pub fn on_external_preference_change(
        &self,
        callback: impl Fn(AppearanceMode) + 'static,
    ) -> PreferenceSubscription {
        let weak: Weak<Shared> = Rc::downgrade(&self.shared);
        self.shared.preference.watch(Box::new(move |prefers_dark| {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let controller = ThemeController { shared };
            if let Some(mode) = controller.follow_system(prefers_dark) {
                callback(mode);
            }
        }))
    }

    // -- internals ----------------------------------------------------------

    fn resolve(&self) -> (AppearanceMode, ResolutionSource, StoredMode) {
        if self.shared.explicit.get() {
            return (self.mode(), ResolutionSource::Explicit, StoredMode::Absent);
        }
        let stored = self.read_persisted();
        if let StoredMode::Valid(mode) = stored {
            return (mode, ResolutionSource::Persisted, stored);
        }
        match self.shared.preference.prefers_dark() {
            Some(prefers_dark) => (
                AppearanceMode::from_prefers_dark(prefers_dark),
                ResolutionSource::System,
                stored,
            ),
            None => {
                debug!(
                    source = self.shared.preference.name(),
                    "OS appearance undeterminable, using default"
                );
                (self.shared.config.default_mode, ResolutionSource::Default, stored)
            }
        }
    }

    /// What storage holds. Invalid values and corrupt content count as absent.
    fn read_persisted(&self) -> StoredMode {
        let key = self.shared.config.storage_key.as_str();
        let effects = self.shared.effects.borrow();
        match effects.storage.load(key) {
            Ok(Some(value)) => match AppearanceMode::parse(&value) {
                Some(mode) => StoredMode::Valid(mode),
                None => {
                    warn!(key, value = %value, "ignoring invalid persisted appearance");
                    StoredMode::Absent
                }
            },
            Ok(None) => StoredMode::Absent,
            // Corrupt content holds no choice, same as an invalid value.
            Err(StorageError::Serialization(reason)) => {
                warn!(key, backend = effects.storage.name(), %reason, "ignoring corrupt appearance storage");
                StoredMode::Absent
            }
            Err(e) => {
                warn!(key, backend = effects.storage.name(), error = %e, "appearance storage unreadable");
                StoredMode::Unreadable
            }
        }
    }

    fn persist(&self, effects: &mut Effects, mode: AppearanceMode) {
        let key = self.shared.config.storage_key.as_str();
        if let Err(e) = effects.storage.store(key, mode.as_str()) {
            warn!(
                key,
                backend = effects.storage.name(),
                error = %e,
                "appearance not persisted; continuing in memory"
            );
        }
    }

    fn apply(&self, effects: &mut Effects, mode: AppearanceMode) {
        if effects.applied == Some(mode) {
            return;
        }
        let _span = debug_span!("nova.theme.apply", mode = mode.as_str()).entered();
        match apply_render(&mut *effects.surface, &render_mode(mode)) {
            Ok(()) => effects.applied = Some(mode),
            Err(e) => {
                warn!(error = %e, "style surface update incomplete");
                effects.applied = None;
            }
        }
    }

    fn follow_system(&self, prefers_dark: bool) -> Option<AppearanceMode> {
        let mode = AppearanceMode::from_prefers_dark(prefers_dark);
        if !self.is_ready() {
            debug!(mode = mode.as_str(), "OS appearance change before initialization ignored");
            return None;
        }
        if self.has_explicit_preference() {
            debug!(mode = mode.as_str(), "OS appearance change ignored; explicit preference set");
            return None;
        }
        {
            let mut effects = self.shared.effects.borrow_mut();
            self.apply(&mut effects, mode);
        }
        if self.shared.mode.set(mode) {
            debug!(mode = mode.as_str(), "appearance follows OS");
        }
        Some(mode)
    }
}

/// Builder for [`ThemeController`].
///
/// Unset seams default to [`MemoryStorage`], [`NoPreference`], and
/// [`MemorySurface`].
#[derive(Default)]
pub struct ThemeControllerBuilder {
    config: ThemeConfig,
    storage: Option<Box<dyn PreferenceStore>>,
    preference: Option<Box<dyn PreferenceSource>>,
    surface: Option<Box<dyn StyleSurface>>,
}

impl ThemeControllerBuilder {
    #[must_use]
    pub fn config(mut self, config: ThemeConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn storage(mut self, storage: impl PreferenceStore + 'static) -> Self {
        self.storage = Some(Box::new(storage));
        self
    }

    #[must_use]
    pub fn preference(mut self, preference: impl PreferenceSource + 'static) -> Self {
        self.preference = Some(Box::new(preference));
        self
    }

    #[must_use]
    pub fn surface(mut self, surface: impl StyleSurface + 'static) -> Self {
        self.surface = Some(Box::new(surface));
        self
    }

    #[must_use]
    pub fn build(self) -> ThemeController {
        let default_mode = self.config.default_mode;
        let effects = Effects {
            storage: self
                .storage
                .unwrap_or_else(|| Box::new(MemoryStorage::new())),
            surface: self
                .surface
                .unwrap_or_else(|| Box::new(MemorySurface::new())),
            applied: None,
        };
        ThemeController {
            shared: Rc::new(Shared {
                config: self.config,
                effects: RefCell::new(effects),
                preference: self.preference.unwrap_or_else(|| Box::new(NoPreference)),
                mode: Observable::new(default_mode),
                ready_signal: Observable::new(false),
                ready: Cell::new(false),
                explicit: Cell::new(false),
                source: Cell::new(None),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_STORAGE_KEY;
    use crate::preference::ManualPreference;
    use nova_style::StyleTarget;
    use tracing_test::traced_test;

    struct Harness {
        controller: ThemeController,
        storage: MemoryStorage,
        preference: ManualPreference,
        surface: MemorySurface,
    }

    fn harness(stored: Option<&str>, prefers_dark: Option<bool>) -> Harness {
        let storage = match stored {
            Some(value) => MemoryStorage::with_entry(DEFAULT_STORAGE_KEY, value),
            None => MemoryStorage::new(),
        };
        let preference = ManualPreference::new(prefers_dark);
        let surface = MemorySurface::new();
        let controller = ThemeController::new(
            ThemeConfig::default(),
            storage.clone(),
            preference.clone(),
            surface.clone(),
        );
        Harness {
            controller,
            storage,
            preference,
            surface,
        }
    }

    #[test]
    #[traced_test]
    fn unreadable_storage_skips_initial_write() {
        let h = harness(Some("light"), Some(true));
        h.storage.fail_reads(true);
        assert_eq!(h.controller.initialize(), AppearanceMode::Dark);
        assert_eq!(h.storage.get(DEFAULT_STORAGE_KEY).as_deref(), Some("light"));
        assert!(logs_contain("appearance storage unreadable"));
        assert!(logs_contain("resolved appearance not written"));
    }

    #[test]
    fn nothing_touched_before_initialize() {
        let h = harness(None, Some(false));
        assert!(!h.controller.is_ready());
        assert_eq!(h.controller.ready_mode(), None);
        assert_eq!(h.controller.mode(), AppearanceMode::Dark);
        assert_eq!(h.storage.write_count(), 0);
        assert_eq!(h.surface.operation_count(), 0);
    }

    #[test]
    fn initialize_is_idempotent() {
        let h = harness(None, Some(false));
        assert_eq!(h.controller.initialize(), AppearanceMode::Light);
        let ops = h.surface.operation_count();
        let writes = h.storage.write_count();

        h.preference.set(Some(true));
        assert_eq!(h.controller.initialize(), AppearanceMode::Light);
        assert_eq!(h.surface.operation_count(), ops);
        assert_eq!(h.storage.write_count(), writes);
    }

    #[test]
    fn set_mode_before_initialize_wins() {
        let h = harness(Some("dark"), Some(true));
        h.storage.fail_writes(true);
        h.controller.set_mode(AppearanceMode::Light);
        assert_eq!(h.controller.initialize(), AppearanceMode::Light);
        assert_eq!(
            h.controller.resolution_source(),
            Some(ResolutionSource::Explicit)
        );
    }

    #[test]
    fn redundant_set_skips_surface_but_persists() {
        let h = harness(None, None);
        h.controller.initialize();
        let ops = h.surface.operation_count();
        let version = h.controller.version();

        h.controller.set_mode(AppearanceMode::Dark);
        assert_eq!(h.surface.operation_count(), ops);
        assert_eq!(h.controller.version(), version);
        assert_eq!(h.storage.get(DEFAULT_STORAGE_KEY).as_deref(), Some("dark"));
    }

    #[test]
    fn surface_failure_retried_on_next_change() {
        let h = harness(None, None);
        h.surface.detach(StyleTarget::Body);
        h.controller.initialize();
        let ops = h.surface.operation_count();

        // Same mode, but the last write was incomplete, so it is redone.
        h.controller.set_mode(AppearanceMode::Dark);
        assert!(h.surface.operation_count() > ops);
        assert_eq!(h.controller.mode(), AppearanceMode::Dark);
    }

    #[test]
    fn on_ready_runs_once_with_resolved_mode() {
        let h = harness(Some("light"), None);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = Rc::clone(&seen);
        let _sub = h
            .controller
            .on_ready(move |mode| seen_clone.borrow_mut().push(mode));
        assert!(seen.borrow().is_empty());

        h.controller.initialize();
        h.controller.toggle();
        assert_eq!(*seen.borrow(), vec![AppearanceMode::Light]);
    }

    #[test]
    fn on_ready_after_initialize_runs_immediately() {
        let h = harness(None, Some(true));
        h.controller.initialize();
        let seen = Rc::new(Cell::new(None));
        let seen_clone = Rc::clone(&seen);
        let _sub = h.controller.on_ready(move |mode| seen_clone.set(Some(mode)));
        assert_eq!(seen.get(), Some(AppearanceMode::Dark));
    }

    #[test]
    fn listener_sees_ready_state_during_initial_broadcast() {
        let h = harness(None, Some(false));
        let observed = Rc::new(Cell::new(None));
        let observed_clone = Rc::clone(&observed);
        let controller = h.controller.clone();
        let _sub = h.controller.subscribe(move |_| {
            observed_clone.set(controller.ready_mode());
        });
        h.controller.initialize();
        assert_eq!(observed.get(), Some(AppearanceMode::Light));
    }

    #[test]
    fn listener_may_call_back_into_controller() {
        let h = harness(None, None);
        h.controller.initialize();
        let controller = h.controller.clone();
        let _sub = h.controller.subscribe(move |mode| {
            // Force light whenever dark comes back.
            if mode == AppearanceMode::Dark {
                controller.set_mode(AppearanceMode::Light);
            }
        });
        h.controller.set_mode(AppearanceMode::Light);
        h.controller.set_mode(AppearanceMode::Dark);
        assert_eq!(h.controller.mode(), AppearanceMode::Light);
        assert_eq!(h.surface.markers(StyleTarget::Root), vec!["light".to_string()]);
    }

    #[test]
    fn clear_preference_returns_to_os() {
        let h = harness(None, Some(true));
        h.controller.initialize();
        h.controller.set_mode(AppearanceMode::Light);
        assert!(h.controller.has_explicit_preference());

        assert_eq!(h.controller.clear_preference(), AppearanceMode::Dark);
        assert!(!h.controller.has_explicit_preference());
        assert_eq!(h.storage.get(DEFAULT_STORAGE_KEY), None);
    }

    #[test]
    fn os_listener_outliving_controller_is_harmless() {
        let h = harness(None, Some(true));
        let sub = h.controller.on_external_preference_change(|_| {});
        let preference = h.preference.clone();
        drop(h);
        preference.set(Some(false));
        drop(sub);
    }

    #[traced_test]
    #[test]
    fn storage_write_failure_is_logged_and_swallowed() {
        let h = harness(None, None);
        h.storage.fail_writes(true);
        h.controller.initialize();
        h.controller.set_mode(AppearanceMode::Light);

        assert_eq!(h.controller.mode(), AppearanceMode::Light);
        assert!(logs_contain("appearance not persisted"));
    }

    #[traced_test]
    #[test]
    fn invalid_persisted_value_is_logged() {
        let h = harness(Some("purple"), Some(false));
        assert_eq!(h.controller.initialize(), AppearanceMode::Light);
        assert_eq!(h.controller.resolution_source(), Some(ResolutionSource::System));
        assert!(logs_contain("ignoring invalid persisted appearance"));
    }

    #[test]
    fn debug_output_names_mode() {
        let h = harness(None, None);
        let dbg = format!("{:?}", h.controller);
        assert!(dbg.contains("ThemeController"));
        assert!(dbg.contains("Dark"));
    }
}
