#![forbid(unsafe_code)]

//! Semantic color tokens and their per-mode values.
//!
//! [`StyleTokens`] is the computed token table for one [`AppearanceMode`].
//! It is a pure function of the mode: there is no way to mutate a single
//! slot, so the table can never drift from the mode it was built for.
//!
//! | token                  | dark               | light              |
//! |------------------------|--------------------|--------------------|
//! | `background`           | `rgb(15,15,25)`    | `rgb(250,252,255)` |
//! | `background-secondary` | `rgb(30,30,46)`    | `rgb(241,245,249)` |
//! | `text`                 | `rgb(255,255,255)` | `rgb(15,23,42)`    |
//! | `text-secondary`       | `rgb(203,213,225)` | `rgb(71,85,105)`   |
//! | `highlight`            | `rgb(59,130,246)`  | `rgb(37,99,235)`   |
//! | `accent`               | `rgb(34,197,94)`   | `rgb(22,163,74)`   |
//! | `primary`              | `rgb(99,102,241)`  | `rgb(79,70,229)`   |
//! | `secondary`            | `rgb(168,85,247)`  | `rgb(147,51,234)`  |
//! | `muted`                | `rgb(100,116,139)` | `rgb(148,163,184)` |
//! | `foreground`           | `rgb(226,232,240)` | `rgb(30,41,59)`    |
//!
//! Values are written out as [`Rgb::to_css`] spells them, with a space after
//! each comma (`rgb(15, 15, 25)`).

use crate::color::Rgb;
use crate::mode::AppearanceMode;

/// A named, mode-dependent color slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StyleToken {
    Background,
    BackgroundSecondary,
    Text,
    TextSecondary,
    Highlight,
    Accent,
    Primary,
    Secondary,
    Muted,
    Foreground,
}

impl StyleToken {
    /// Every token, in table order.
    pub const ALL: [StyleToken; 10] = [
        StyleToken::Background,
        StyleToken::BackgroundSecondary,
        StyleToken::Text,
        StyleToken::TextSecondary,
        StyleToken::Highlight,
        StyleToken::Accent,
        StyleToken::Primary,
        StyleToken::Secondary,
        StyleToken::Muted,
        StyleToken::Foreground,
    ];

    /// Number of tokens.
    pub const COUNT: usize = Self::ALL.len();

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Background => 0,
            Self::BackgroundSecondary => 1,
            Self::Text => 2,
            Self::TextSecondary => 3,
            Self::Highlight => 4,
            Self::Accent => 5,
            Self::Primary => 6,
            Self::Secondary => 7,
            Self::Muted => 8,
            Self::Foreground => 9,
        }
    }

    /// Kebab-case token name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Background => "background",
            Self::BackgroundSecondary => "background-secondary",
            Self::Text => "text",
            Self::TextSecondary => "text-secondary",
            Self::Highlight => "highlight",
            Self::Accent => "accent",
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::Muted => "muted",
            Self::Foreground => "foreground",
        }
    }

    /// CSS custom property name, e.g. `--background`.
    #[must_use]
    pub const fn css_var(self) -> &'static str {
        match self {
            Self::Background => "--background",
            Self::BackgroundSecondary => "--background-secondary",
            Self::Text => "--text",
            Self::TextSecondary => "--text-secondary",
            Self::Highlight => "--highlight",
            Self::Accent => "--accent",
            Self::Primary => "--primary",
            Self::Secondary => "--secondary",
            Self::Muted => "--muted",
            Self::Foreground => "--foreground",
        }
    }

    /// Look a token up by name. A leading `--` is accepted.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        let name = name.strip_prefix("--").unwrap_or(name);
        Self::ALL.into_iter().find(|token| token.name() == name)
    }
}

const DARK: [Rgb; StyleToken::COUNT] = [
    Rgb::new(15, 15, 25),
    Rgb::new(30, 30, 46),
    Rgb::new(255, 255, 255),
    Rgb::new(203, 213, 225),
    Rgb::new(59, 130, 246),
    Rgb::new(34, 197, 94),
    Rgb::new(99, 102, 241),
    Rgb::new(168, 85, 247),
    Rgb::new(100, 116, 139),
    Rgb::new(226, 232, 240),
];

const LIGHT: [Rgb; StyleToken::COUNT] = [
    Rgb::new(250, 252, 255),
    Rgb::new(241, 245, 249),
    Rgb::new(15, 23, 42),
    Rgb::new(71, 85, 105),
    Rgb::new(37, 99, 235),
    Rgb::new(22, 163, 74),
    Rgb::new(79, 70, 229),
    Rgb::new(147, 51, 234),
    Rgb::new(148, 163, 184),
    Rgb::new(30, 41, 59),
];

/// The computed token table for one mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StyleTokens {
    mode: AppearanceMode,
    colors: [Rgb; StyleToken::COUNT],
}

impl StyleTokens {
    #[must_use]
    pub const fn for_mode(mode: AppearanceMode) -> Self {
        let colors = match mode {
            AppearanceMode::Dark => DARK,
            AppearanceMode::Light => LIGHT,
        };
        Self { mode, colors }
    }

    /// The mode this table was computed for.
    #[must_use]
    pub const fn mode(&self) -> AppearanceMode {
        self.mode
    }

    #[must_use]
    pub const fn get(&self, token: StyleToken) -> Rgb {
        self.colors[token.index()]
    }

    /// `(token, color)` pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = (StyleToken, Rgb)> + '_ {
        StyleToken::ALL
            .into_iter()
            .map(move |token| (token, self.get(token)))
    }

    /// `(--name, "rgb(r, g, b)")` pairs ready to be written as style properties.
    pub fn css_properties(&self) -> impl Iterator<Item = (&'static str, String)> + '_ {
        self.iter().map(|(token, color)| (token.css_var(), color.to_css()))
    }
}

impl From<AppearanceMode> for StyleTokens {
    fn from(mode: AppearanceMode) -> Self {
        Self::for_mode(mode)
    }
}
