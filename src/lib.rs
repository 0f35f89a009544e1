pub mod components;
pub mod config;
pub mod error;
#[cfg(feature = "server")]
pub mod server;
pub mod shutdown;
pub mod startup;
pub mod utils;
