#![forbid(unsafe_code)]

//! Nova public facade crate.
//!
//! Re-exports the appearance controller and its seams, and offers a
//! prelude plus a one-call native setup.

use std::fmt;

// --- Style re-exports ------------------------------------------------------

pub use nova_style::{
    AppearanceMode, ModeRender, ParseModeError, Rgb, StyleTarget, StyleToken, StyleTokens,
    TargetMarkers, render_mode,
};

// --- Runtime re-exports ----------------------------------------------------

#[cfg(feature = "persistence")]
pub use nova_runtime::FileStorage;
pub use nova_runtime::{
    EnvPreference, ManualPreference, MemoryStorage, MemorySurface, NoPreference,
    PreferenceSource, PreferenceStore, PreferenceSubscription, ResolutionSource, StorageError,
    StyleSurface, Subscription, SurfaceError, ThemeConfig, ThemeConfigError, ThemeController,
    ThemeControllerBuilder,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for Nova setup.
///
/// The controller itself never fails; these come from configuration and
/// from probing a backend before handing it over.
#[derive(Debug)]
pub enum Error {
    Config(ThemeConfigError),
    Storage(StorageError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<ThemeConfigError> for Error {
    fn from(err: ThemeConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        Self::Storage(err)
    }
}

/// Standard result type for Nova setup APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Native setup ---------------------------------------------------------

/// Initialized controller for a native host.
///
/// The preference is persisted as JSON at `storage_path` and the OS
/// preference is read from the environment. The storage file is probed
/// first so a bad path is reported here instead of only being logged on
/// every write. A corrupt file is not an error: it is replaced on the
/// first write. Host styling goes through `surface`.
#[cfg(feature = "persistence")]
pub fn native_theme(
    config: ThemeConfig,
    storage_path: impl Into<std::path::PathBuf>,
    surface: impl StyleSurface + 'static,
) -> Result<ThemeController> {
    let config = config.validated()?;
    let storage = FileStorage::new(storage_path);
    match storage.load(&config.storage_key) {
        Ok(_) | Err(StorageError::Serialization(_)) => {}
        Err(e) => return Err(e.into()),
    }

    let preference = EnvPreference::detect();
    tracing::debug!(
        path = %storage.path().display(),
        os_prefers_dark = ?preference.prefers_dark(),
        "native appearance setup"
    );

    let theme = ThemeController::builder()
        .config(config)
        .storage(storage)
        .preference(preference)
        .surface(surface)
        .build();
    theme.initialize();
    Ok(theme)
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        AppearanceMode, Error, Result, StyleTarget, StyleToken, StyleTokens, Subscription,
        ThemeConfig, ThemeController,
    };

    pub use crate::{runtime, style};

    #[cfg(feature = "web")]
    pub use crate::web;
}

pub use nova_runtime as runtime;
pub use nova_style as style;
#[cfg(feature = "web")]
pub use nova_web as web;
