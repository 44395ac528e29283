//! Client-side behavior layer for the Helios navigation page: loading-screen
//! dismissal, scroll progress, header show/hide, card navigation with a
//! domain allow-list, and viewport-triggered card reveals.

pub mod app;
pub mod config;
pub mod utils;

pub use app::App;
pub use config::Config;
