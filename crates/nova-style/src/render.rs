#![forbid(unsafe_code)]

//! Pure mapping from an appearance mode to style-surface changes.
//!
//! [`render_mode`] describes everything a host must do to make its styling
//! surface reflect a mode: which marker to put on each classification
//! target, which stale markers to take off, and which token values to
//! write. Applying the plan is left to a thin host adapter, so the mapping
//! can be tested without a document.
//!
//! # Invariants
//!
//! 1. Every target receives exactly one marker to add.
//! 2. The marker being added never appears in that target's removal list.
//! 3. Removal lists name every other mode's marker, so applying a plan on
//!    top of any previous plan leaves exactly one marker per target.

use crate::mode::AppearanceMode;
use crate::tokens::StyleTokens;

/// A node whose class list scopes mode-specific rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StyleTarget {
    /// The document root (`<html>`).
    Root,
    /// The document body (`<body>`).
    Body,
}

impl StyleTarget {
    pub const ALL: [StyleTarget; 2] = [StyleTarget::Root, StyleTarget::Body];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Body => "body",
        }
    }
}

/// Marker changes for a single target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetMarkers {
    pub target: StyleTarget,
    /// Marker that must be present afterwards.
    pub add: &'static str,
    /// Markers that must be absent afterwards.
    pub remove: [&'static str; 1],
}

/// Complete description of the surface state for one mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeRender {
    pub mode: AppearanceMode,
    pub targets: [TargetMarkers; 2],
    pub tokens: StyleTokens,
}

impl ModeRender {
    /// Marker changes for `target`.
    #[must_use]
    pub fn markers_for(&self, target: StyleTarget) -> &TargetMarkers {
        match target {
            StyleTarget::Root => &self.targets[0],
            StyleTarget::Body => &self.targets[1],
        }
    }
}

/// Compute the surface plan for `mode`.
#[must_use]
pub fn render_mode(mode: AppearanceMode) -> ModeRender {
    tracing::trace!(mode = mode.as_str(), "render appearance");
    let add = mode.as_str();
    let remove = [mode.opposite().as_str()];
    ModeRender {
        mode,
        targets: StyleTarget::ALL.map(|target| TargetMarkers {
            target,
            add,
            remove,
        }),
        tokens: StyleTokens::for_mode(mode),
    }
}
