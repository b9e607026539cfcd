pub mod aggregate;
pub mod args;
mod backup;
pub mod commands;
mod config;
pub mod error;
pub mod model;
pub mod server;
pub mod store;
mod utils;

#[cfg(test)]
mod test;

pub use backup::Backup;
pub use config::{Config, Preferences, Theme};
pub use error::Error;
pub use error::Result;
