#![forbid(unsafe_code)]

//! Appearance runtime for Nova.
//!
//! [`ThemeController`] owns the dark/light mode for an application. It is
//! wired to three host seams:
//!
//! - [`PreferenceStore`]: where the user's choice is persisted
//!   ([`MemoryStorage`], or [`FileStorage`] with `state-persistence`).
//! - [`PreferenceSource`]: the operating system's preference and its change
//!   signal ([`EnvPreference`], [`ManualPreference`], [`NoPreference`]).
//! - [`StyleSurface`]: the styling targets that receive mode markers and
//!   token variables ([`MemorySurface`]; browser hosts use `nova-web`).
//!
//! # Example
//!
//! ```
//! use nova_runtime::{ManualPreference, MemorySurface, ThemeController};
//! use nova_style::{AppearanceMode, StyleTarget};
//!
//! let surface = MemorySurface::new();
//! let theme = ThemeController::builder()
//!     .preference(ManualPreference::new(Some(false)))
//!     .surface(surface.clone())
//!     .build();
//!
//! assert_eq!(theme.initialize(), AppearanceMode::Light);
//! assert_eq!(theme.toggle(), AppearanceMode::Dark);
//! assert_eq!(surface.markers(StyleTarget::Root), vec!["dark".to_string()]);
//! ```

pub mod config;
pub mod controller;
pub mod preference;
pub mod reactive;
pub mod storage;
pub mod surface;

pub use config::{DEFAULT_EVENT_NAME, DEFAULT_STORAGE_KEY, ThemeConfig, ThemeConfigError};
pub use controller::{ResolutionSource, ThemeController, ThemeControllerBuilder};
pub use preference::{
    ENV_APPEARANCE, EnvPreference, ManualPreference, NoPreference, PreferenceListener,
    PreferenceSource, PreferenceSubscription,
};
pub use reactive::{Observable, Subscription};
#[cfg(feature = "state-persistence")]
pub use storage::FileStorage;
pub use storage::{MemoryStorage, PreferenceStore, StorageError, StorageResult};
pub use surface::{MemorySurface, StyleSurface, SurfaceError, apply_render};
