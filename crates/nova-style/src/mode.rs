#![forbid(unsafe_code)]

//! The two-valued appearance mode.
//!
//! [`AppearanceMode`] is the only state the appearance controller owns.
//! Everything else (markers, color tokens) is derived from it. There is no
//! "system" or "auto" member: following the operating system is a
//! resolution step, not a stored value.

use std::fmt;
use std::str::FromStr;

/// Dark or light display setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum AppearanceMode {
    /// Light text on a deep-space background (default).
    #[default]
    Dark,
    /// Dark text on a near-white background.
    Light,
}

impl AppearanceMode {
    /// Both modes, dark first.
    pub const ALL: [AppearanceMode; 2] = [AppearanceMode::Dark, AppearanceMode::Light];

    /// The persisted / marker spelling of this mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    /// The other mode.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    /// Map a "prefers dark" signal onto a mode.
    #[must_use]
    pub const fn from_prefers_dark(prefers_dark: bool) -> Self {
        if prefers_dark { Self::Dark } else { Self::Light }
    }

    #[must_use]
    pub const fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }

    /// Parse a stored value.
    ///
    /// Accepts `dark` or `light`, ignoring surrounding whitespace and ASCII
    /// case. Anything else, including the empty string, is `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("dark") {
            Some(Self::Dark)
        } else if value.eq_ignore_ascii_case("light") {
            Some(Self::Light)
        } else {
            None
        }
    }
}

impl fmt::Display for AppearanceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is neither `dark` nor `light`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseModeError {
    value: String,
}

impl ParseModeError {
    /// The rejected input.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for ParseModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid appearance mode {:?} (expected \"dark\" or \"light\")",
            self.value
        )
    }
}

impl std::error::Error for ParseModeError {}

impl FromStr for AppearanceMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| ParseModeError {
            value: s.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_dark() {
        assert_eq!(AppearanceMode::default(), AppearanceMode::Dark);
    }

    #[test]
    fn opposite_flips() {
        assert_eq!(AppearanceMode::Dark.opposite(), AppearanceMode::Light);
        assert_eq!(AppearanceMode::Light.opposite(), AppearanceMode::Dark);
    }

    #[test]
    fn parse_accepts_canonical_and_loose_spellings() {
        assert_eq!(AppearanceMode::parse("dark"), Some(AppearanceMode::Dark));
        assert_eq!(AppearanceMode::parse("light"), Some(AppearanceMode::Light));
        assert_eq!(AppearanceMode::parse("  Dark\n"), Some(AppearanceMode::Dark));
        assert_eq!(AppearanceMode::parse("LIGHT"), Some(AppearanceMode::Light));
    }

    #[test]
    fn parse_rejects_everything_else() {
        for bad in ["", " ", "auto", "system", "darkish", "true", "0"] {
            assert_eq!(AppearanceMode::parse(bad), None, "{bad:?} must be rejected");
        }
    }

    #[test]
    fn from_str_reports_rejected_value() {
        let err = "sepia".parse::<AppearanceMode>().unwrap_err();
        assert_eq!(err.value(), "sepia");
        assert!(err.to_string().contains("sepia"));
    }

    #[test]
    fn display_matches_as_str() {
        for mode in AppearanceMode::ALL {
            assert_eq!(mode.to_string(), mode.as_str());
            assert_eq!(AppearanceMode::parse(&mode.to_string()), Some(mode));
        }
    }

    #[test]
    fn prefers_dark_mapping() {
        assert_eq!(AppearanceMode::from_prefers_dark(true), AppearanceMode::Dark);
        assert_eq!(AppearanceMode::from_prefers_dark(false), AppearanceMode::Light);
        assert!(AppearanceMode::Dark.is_dark());
        assert!(!AppearanceMode::Light.is_dark());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&AppearanceMode::Light).unwrap();
        assert_eq!(json, "\"light\"");
        let back: AppearanceMode = serde_json::from_str("\"dark\"").unwrap();
        assert_eq!(back, AppearanceMode::Dark);
    }
}
