//! authfetch daemon: mock auth server and command line client

pub mod commands;
pub mod config;
pub mod console;
pub mod error;
pub mod server;

pub use config::Settings;
pub use error::{DaemonError, Result};
