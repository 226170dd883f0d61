pub mod config;
pub mod context;
pub mod domains;
pub mod error;
pub mod factories;
pub mod gateway;
pub mod intent;
pub mod interfaces;
pub mod logging;
pub mod prompt;
pub mod providers;
pub mod services;

pub type Result<T> = std::result::Result<T, error::ConciergeError>;
