// Application layer: wires the store and the welcome gate to one lifecycle.

pub mod portfolio;

pub use portfolio::PortfolioApp;
