pub mod auth;
pub mod fallback;
pub mod fallback_data;
pub mod preferences;
pub mod retry;
pub mod store;
pub mod welcome;

pub use crate::domain::model::{ContentDomain, ContentPayload, DataSource, LoadResult};
pub use crate::domain::ports::{ConfigProvider, ContentApi, DurableStore, SessionStore};
pub use crate::utils::error::Result;
