pub mod config;
pub mod content;
pub mod error;
pub mod schema;
pub mod services;

pub use error::Error;
