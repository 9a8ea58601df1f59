pub mod error;
pub use error::Error;

pub mod app;

pub mod middleware;

pub mod forms;

pub mod models;

pub mod services;

pub mod db;
