pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::adapters::{FileDurableStore, HttpContentApi, MemorySessionStore};
pub use crate::app::PortfolioApp;
pub use crate::config::SiteConfig;
pub use crate::core::store::{AppState, ContentStore, LoadPhase, LoadSettings};
pub use crate::core::welcome::{WelcomeGate, WelcomeState, WelcomeTimings};
pub use crate::utils::error::{ApiError, Result, SiteError};
