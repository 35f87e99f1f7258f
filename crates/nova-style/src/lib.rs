#![forbid(unsafe_code)]

//! Appearance vocabulary for Nova.
//!
//! # Role in Nova
//! `nova-style` is the pure layer: it knows what dark and light look like
//! but never touches storage, the operating system, or a document. The
//! runtime crate owns the mutable mode and uses these types to compute
//! what must be written to the styling surface.
//!
//! # This crate provides
//! - [`AppearanceMode`], the two-valued dark/light setting.
//! - [`Rgb`] colors with WCAG contrast helpers.
//! - [`StyleToken`] / [`StyleTokens`], the per-mode color token table.
//! - [`render_mode`], the pure mode-to-surface plan ([`ModeRender`]).

/// sRGB colors and contrast utilities.
pub mod color;
/// The dark/light mode enum.
pub mod mode;
/// Pure mode rendering.
pub mod render;
/// Semantic color tokens.
pub mod tokens;

pub use color::{Rgb, WCAG_AA_LARGE_TEXT, WCAG_AA_NORMAL_TEXT};
pub use mode::{AppearanceMode, ParseModeError};
pub use render::{ModeRender, StyleTarget, TargetMarkers, render_mode};
pub use tokens::{StyleToken, StyleTokens};
