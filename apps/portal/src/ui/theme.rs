//! Light/dark palettes and accent colouring for terminal output.

use std::{fmt, str::FromStr};

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Icon of the toggle button: it shows the theme you would switch to.
    pub fn toggle_icon(self) -> &'static str {
        match self {
            Self::Dark => "[sun]",
            Self::Light => "[moon]",
        }
    }

    fn accent_code(self, accent: Accent) -> &'static str {
        match (self, accent) {
            (Self::Dark, Accent::Green) => "92",
            (Self::Dark, Accent::Blue) => "94",
            (Self::Dark, Accent::Yellow) => "93",
            (Self::Dark, Accent::Red) => "91",
            (Self::Dark, Accent::Purple) => "95",
            (Self::Light, Accent::Green) => "32",
            (Self::Light, Accent::Blue) => "34",
            (Self::Light, Accent::Yellow) => "33",
            (Self::Light, Accent::Red) => "31",
            (Self::Light, Accent::Purple) => "35",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Light => "light",
            Self::Dark => "dark",
        })
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(format!("unknown theme '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accent {
    Green,
    Blue,
    Yellow,
    Red,
    Purple,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub theme: Theme,
    pub color: bool,
}

impl Palette {
    pub fn paint(&self, accent: Accent, text: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{}m{text}\x1b[0m", self.theme.accent_code(accent))
    }
}
