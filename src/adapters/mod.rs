// Adapters layer: concrete implementations of the domain ports.

pub mod durable;
pub mod http;
pub mod session;

pub use durable::FileDurableStore;
pub use http::HttpContentApi;
pub use session::MemorySessionStore;
