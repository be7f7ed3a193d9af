//! Configuration loading for relaybot.
//!
//! All settings come from the process environment (a `.env` file is loaded
//! by the binary before this runs). Required keys are validated together so
//! a misconfigured deployment reports every missing variable at once.

pub mod error;
pub mod loader;
pub mod schema;

pub use {
    error::{Error, Result},
    loader::{load_from_env, load_with},
    schema::{GeminiConfig, RelaybotConfig, ServerConfig, SlackConfig},
};
