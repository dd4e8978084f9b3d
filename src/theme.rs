//! Two-state light/dark theme toggle.
//!
//! There is no theming engine: a theme is either [`Theme::Light`] or
//! [`Theme::Dark`], and each state carries fixed labels and a small terminal
//! palette used by the CLI.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Current colour scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }

    /// Icon on the toggle button: the symbol of the theme it switches to.
    pub fn toggle_icon(self) -> &'static str {
        match self {
            Theme::Light => "☾",
            Theme::Dark => "☀️",
        }
    }

    /// Text on the toggle button.
    pub fn toggle_text(self) -> &'static str {
        match self {
            Theme::Light => "Switch to Dark Mode",
            Theme::Dark => "Switch to Light Mode",
        }
    }

    /// Status line describing the current theme.
    pub fn status(self) -> &'static str {
        match self {
            Theme::Light => "☀️ Light Mode",
            Theme::Dark => "☾ Dark Mode",
        }
    }

    /// ANSI palette for terminal rendering.
    pub fn palette(self) -> Palette {
        match self {
            Theme::Light => Palette {
                accent: "\x1b[34m",
                success: "\x1b[32m",
                warning: "\x1b[33m",
                danger: "\x1b[31m",
                muted: "\x1b[2m",
            },
            Theme::Dark => Palette {
                accent: "\x1b[96m",
                success: "\x1b[92m",
                warning: "\x1b[93m",
                danger: "\x1b[91m",
                muted: "\x1b[37m",
            },
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        })
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme '{other}' (expected light or dark)")),
        }
    }
}

/// ANSI escape prefixes for one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub accent: &'static str,
    pub success: &'static str,
    pub warning: &'static str,
    pub danger: &'static str,
    pub muted: &'static str,
}

impl Palette {
    const RESET: &'static str = "\x1b[0m";

    pub fn paint(&self, colour: &str, s: &str) -> String {
        format!("{colour}{s}{}", Self::RESET)
    }
}

/// The toggle widget state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ThemeToggle {
    theme: Theme,
}

impl ThemeToggle {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Flip the theme and return the new one.
    pub fn toggle(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.theme
    }

    /// Keyboard activation: Enter and Space toggle, other keys are ignored.
    pub fn handle_key(&mut self, key: &str) -> bool {
        match key {
            "Enter" | " " => {
                self.toggle();
                true
            }
            _ => false,
        }
    }
}
