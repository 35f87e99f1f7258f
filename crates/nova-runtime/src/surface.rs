#![forbid(unsafe_code)]

//! Styling surface adapters.
//!
//! A [`StyleSurface`] is whatever the host styles with: a browser document,
//! a native toolkit's palette, or the recording [`MemorySurface`] used by
//! headless hosts and tests. [`apply_render`] turns a pure
//! [`ModeRender`] plan into surface calls.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use nova_style::{ModeRender, StyleTarget};

/// A surface operation failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    /// The target node does not exist (e.g. no `<body>` yet).
    MissingTarget(StyleTarget),
    /// The host rejected the operation.
    Rejected(String),
}

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingTarget(target) => write!(f, "style target {} missing", target.as_str()),
            Self::Rejected(msg) => write!(f, "surface rejected operation: {msg}"),
        }
    }
}

impl std::error::Error for SurfaceError {}

/// Host styling hooks.
pub trait StyleSurface {
    fn add_marker(&mut self, target: StyleTarget, marker: &str) -> Result<(), SurfaceError>;

    fn remove_marker(&mut self, target: StyleTarget, marker: &str) -> Result<(), SurfaceError>;

    /// Write one style variable (`name` includes the `--` prefix).
    fn set_property(&mut self, name: &str, value: &str) -> Result<(), SurfaceError>;
}

/// Apply `render` to `surface`.
///
/// Stale markers are removed before the current one is added, so a target
/// never carries both. Every step is attempted even after a failure; the
/// first error is returned.
pub fn apply_render(surface: &mut dyn StyleSurface, render: &ModeRender) -> Result<(), SurfaceError> {
    let mut first_error = None;
    let mut record = |result: Result<(), SurfaceError>| {
        if let Err(e) = result {
            first_error.get_or_insert(e);
        }
    };

    for markers in &render.targets {
        for stale in markers.remove {
            record(surface.remove_marker(markers.target, stale));
        }
        record(surface.add_marker(markers.target, markers.add));
    }
    for (name, value) in render.tokens.css_properties() {
        record(surface.set_property(name, &value));
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// MemorySurface
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct MemorySurfaceState {
    markers: BTreeMap<StyleTarget, Vec<String>>,
    properties: BTreeMap<String, String>,
    operations: u64,
    missing: Vec<StyleTarget>,
}

/// Recording surface. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    state: Rc<RefCell<MemorySurfaceState>>,
}

impl MemorySurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a target with unrelated classes.
    pub fn seed_marker(&self, target: StyleTarget, marker: &str) {
        self.state
            .borrow_mut()
            .markers
            .entry(target)
            .or_default()
            .push(marker.to_string());
    }

    /// Make operations on `target` fail with [`SurfaceError::MissingTarget`].
    pub fn detach(&self, target: StyleTarget) {
        self.state.borrow_mut().missing.push(target);
    }

    /// Markers on `target`, in insertion order.
    #[must_use]
    pub fn markers(&self, target: StyleTarget) -> Vec<String> {
        self.state
            .borrow()
            .markers
            .get(&target)
            .cloned()
            .unwrap_or_default()
    }

    #[must_use]
    pub fn property(&self, name: &str) -> Option<String> {
        self.state.borrow().properties.get(name).cloned()
    }

    #[must_use]
    pub fn property_count(&self) -> usize {
        self.state.borrow().properties.len()
    }

    /// Successful operations so far.
    #[must_use]
    pub fn operation_count(&self) -> u64 {
        self.state.borrow().operations
    }

    fn check(&self, target: StyleTarget) -> Result<(), SurfaceError> {
        if self.state.borrow().missing.contains(&target) {
            Err(SurfaceError::MissingTarget(target))
        } else {
            Ok(())
        }
    }
}

impl StyleSurface for MemorySurface {
    fn add_marker(&mut self, target: StyleTarget, marker: &str) -> Result<(), SurfaceError> {
        self.check(target)?;
        let mut state = self.state.borrow_mut();
        let list = state.markers.entry(target).or_default();
        if !list.iter().any(|m| m == marker) {
            list.push(marker.to_string());
        }
        state.operations += 1;
        Ok(())
    }

    fn remove_marker(&mut self, target: StyleTarget, marker: &str) -> Result<(), SurfaceError> {
        self.check(target)?;
        let mut state = self.state.borrow_mut();
        if let Some(list) = state.markers.get_mut(&target) {
            list.retain(|m| m != marker);
        }
        state.operations += 1;
        Ok(())
    }

    fn set_property(&mut self, name: &str, value: &str) -> Result<(), SurfaceError> {
        let mut state = self.state.borrow_mut();
        state.properties.insert(name.to_string(), value.to_string());
        state.operations += 1;
        Ok(())
    }
}
