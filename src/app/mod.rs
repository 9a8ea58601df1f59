mod config;
pub use self::config::*;

mod commands;
pub use commands::*;
