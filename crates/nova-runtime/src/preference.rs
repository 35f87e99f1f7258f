#![forbid(unsafe_code)]

//! Operating-system dark/light preference signals.
//!
//! A [`PreferenceSource`] answers "does the environment prefer dark?" once
//! and lets callers watch for changes. `None` means the answer cannot be
//! determined; the controller then falls back to its default mode.
//!
//! # Sources
//!
//! - [`EnvPreference`]: reads `NOVA_APPEARANCE` (`dark`/`light`), then the
//!   terminal's `COLORFGBG` background index. Environment variables do not
//!   change at runtime, so watching it never fires.
//! - [`ManualPreference`]: host-driven. Whatever observes the real signal
//!   (a toolkit callback, a terminal OSC 11 reply) pushes it with
//!   [`ManualPreference::set`].
//! - [`NoPreference`]: always undeterminable.

use std::fmt;

use nova_style::AppearanceMode;

use crate::reactive::Observable;

/// Environment variable forcing the detected preference (`dark` or `light`).
pub const ENV_APPEARANCE: &str = "NOVA_APPEARANCE";
/// `fg;bg` color indices exported by several terminal emulators.
const ENV_COLORFGBG: &str = "COLORFGBG";

/// Listener invoked with the new "prefers dark" value.
pub type PreferenceListener = Box<dyn Fn(bool)>;

/// A source of the environment's dark/light preference.
pub trait PreferenceSource {
    /// Current preference, or `None` if it cannot be determined.
    fn prefers_dark(&self) -> Option<bool>;

    /// Call `listener` whenever the preference changes, until the returned
    /// subscription is cancelled or dropped.
    fn watch(&self, listener: PreferenceListener) -> PreferenceSubscription;

    /// Short source name for logs.
    fn name(&self) -> &'static str {
        "custom"
    }
}

/// Cancellable registration with a [`PreferenceSource`].
///
/// Dropping the subscription cancels it.
#[must_use = "dropping a PreferenceSubscription stops the listener"]
pub struct PreferenceSubscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl PreferenceSubscription {
    /// Wrap the teardown for a live registration.
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription with nothing to tear down.
    pub fn inert() -> Self {
        Self { cancel: None }
    }

    /// `false` once cancelled, and always for [`inert`](Self::inert).
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.cancel.is_some()
    }

    pub fn cancel(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for PreferenceSubscription {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl fmt::Debug for PreferenceSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreferenceSubscription")
            .field("active", &self.is_active())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// EnvPreference
// ---------------------------------------------------------------------------

/// Preference detected from environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvPreference {
    prefers_dark: Option<bool>,
}

impl EnvPreference {
    /// Detect from the process environment.
    #[must_use]
    pub fn detect() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Detect using a custom environment lookup (for tests).
    #[must_use]
    pub fn from_env_with<F>(get_env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let forced = get_env(ENV_APPEARANCE)
            .and_then(|value| AppearanceMode::parse(&value))
            .map(AppearanceMode::is_dark);
        let prefers_dark =
            forced.or_else(|| get_env(ENV_COLORFGBG).and_then(|v| colorfgbg_prefers_dark(&v)));
        Self { prefers_dark }
    }
}

impl PreferenceSource for EnvPreference {
    fn prefers_dark(&self) -> Option<bool> {
        self.prefers_dark
    }

    fn watch(&self, _listener: PreferenceListener) -> PreferenceSubscription {
        PreferenceSubscription::inert()
    }

    fn name(&self) -> &'static str {
        "env"
    }
}

/// `COLORFGBG` is `fg;bg` (some terminals insert a middle field). The last
/// field is the background index in the 16-color palette.
fn colorfgbg_prefers_dark(value: &str) -> Option<bool> {
    let bg: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
    match bg {
        0..=6 | 8 => Some(true),
        7 | 9..=15 => Some(false),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// ManualPreference
// ---------------------------------------------------------------------------

/// Host-driven preference. Clones share the same signal.
#[derive(Debug, Clone)]
pub struct ManualPreference {
    signal: Observable<Option<bool>>,
}

impl ManualPreference {
    #[must_use]
    pub fn new(prefers_dark: Option<bool>) -> Self {
        Self {
            signal: Observable::new(prefers_dark),
        }
    }

    /// Publish a new preference. Watchers run only when a determinate value
    /// changes.
    pub fn set(&self, prefers_dark: Option<bool>) {
        self.signal.set(prefers_dark);
    }
}

impl Default for ManualPreference {
    fn default() -> Self {
        Self::new(None)
    }
}

impl PreferenceSource for ManualPreference {
    fn prefers_dark(&self) -> Option<bool> {
        self.signal.get()
    }

    fn watch(&self, listener: PreferenceListener) -> PreferenceSubscription {
        let guard = self.signal.subscribe(move |value| {
            if let Some(prefers_dark) = *value {
                listener(prefers_dark);
            }
        });
        PreferenceSubscription::new(move || drop(guard))
    }

    fn name(&self) -> &'static str {
        "manual"
    }
}

// ---------------------------------------------------------------------------
// NoPreference
// ---------------------------------------------------------------------------

/// A source that never knows.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPreference;

impl PreferenceSource for NoPreference {
    fn prefers_dark(&self) -> Option<bool> {
        None
    }

    fn watch(&self, _listener: PreferenceListener) -> PreferenceSubscription {
        PreferenceSubscription::inert()
    }

    fn name(&self) -> &'static str {
        "none"
    }
}
