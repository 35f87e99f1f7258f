#![forbid(unsafe_code)]

//! sRGB colors and WCAG contrast helpers.

use std::fmt;

/// WCAG AA minimum contrast for normal text.
pub const WCAG_AA_NORMAL_TEXT: f64 = 4.5;
/// WCAG AA minimum contrast for large text.
pub const WCAG_AA_LARGE_TEXT: f64 = 3.0;

/// An opaque 8-bit sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// CSS functional notation, e.g. `rgb(15, 15, 25)`.
    #[must_use]
    pub fn to_css(self) -> String {
        self.to_string()
    }

    /// WCAG 2.x relative luminance in `[0, 1]`.
    #[must_use]
    pub fn relative_luminance(self) -> f64 {
        let r = srgb_to_linear(f64::from(self.r) / 255.0);
        let g = srgb_to_linear(f64::from(self.g) / 255.0);
        let b = srgb_to_linear(f64::from(self.b) / 255.0);
        0.2126 * r + 0.7152 * g + 0.0722 * b
    }

    /// WCAG contrast ratio against `other`, in `[1, 21]`.
    #[must_use]
    pub fn contrast_ratio(self, other: Rgb) -> f64 {
        let a = self.relative_luminance();
        let b = other.relative_luminance();
        let (lighter, darker) = if a >= b { (a, b) } else { (b, a) };
        (lighter + 0.05) / (darker + 0.05)
    }

    /// Whether `self` as text over `background` meets WCAG AA for normal text.
    #[must_use]
    pub fn meets_wcag_aa(self, background: Rgb) -> bool {
        self.contrast_ratio(background) >= WCAG_AA_NORMAL_TEXT
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::new(r, g, b)
    }
}

fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.03928 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}
