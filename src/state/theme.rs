use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::IvError;

/// Color theme for exported documents and the gallery page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    #[default]
    Light,
}

impl Theme {
    /// Renderer layout template.
    pub fn plot_template(&self) -> &'static str {
        match self {
            Theme::Dark => "plotly_dark",
            Theme::Light => "plotly_white",
        }
    }

    pub fn page_bg(&self) -> &'static str {
        match self {
            Theme::Dark => "#141414",
            Theme::Light => "#ffffff",
        }
    }

    pub fn text_color(&self) -> &'static str {
        match self {
            Theme::Dark => "#e6e6e6",
            Theme::Light => "#1a1a1a",
        }
    }

    pub fn border_color(&self) -> &'static str {
        match self {
            Theme::Dark => "#555555",
            Theme::Light => "#aaaaaa",
        }
    }

    pub fn link_color(&self) -> &'static str {
        match self {
            Theme::Dark => "#7fb4ff",
            Theme::Light => "#1a5fb4",
        }
    }
}

impl FromStr for Theme {
    type Err = IvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            _ => Err(IvError::UnknownTheme(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert_eq!(" light ".parse::<Theme>().unwrap(), Theme::Light);
        assert!("sepia".parse::<Theme>().is_err());
        assert_eq!(Theme::Dark.plot_template(), "plotly_dark");
    }
}
