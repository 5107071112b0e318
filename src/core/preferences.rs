use crate::domain::ports::DurableStore;
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

pub const THEME_KEY: &str = "portfolio.theme";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(&self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    fn parse(value: &str) -> Option<Theme> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Theme choice kept in durable storage, across sessions.
pub struct ThemePreference<D: DurableStore> {
    store: Arc<D>,
}

impl<D: DurableStore> ThemePreference<D> {
    pub fn new(store: Arc<D>) -> Self {
        Self { store }
    }

    pub fn load(&self) -> Result<Theme> {
        let stored = self.store.get(THEME_KEY)?;
        Ok(match stored.as_deref().and_then(Theme::parse) {
            Some(theme) => theme,
            None => {
                if let Some(value) = stored {
                    tracing::debug!("Ignoring unknown theme value '{}'", value);
                }
                Theme::default()
            }
        })
    }

    pub fn set(&self, theme: Theme) -> Result<()> {
        self.store.set(THEME_KEY, theme.as_str())
    }

    pub fn toggle(&self) -> Result<Theme> {
        let next = self.load()?.toggled();
        self.set(next)?;
        Ok(next)
    }
}
