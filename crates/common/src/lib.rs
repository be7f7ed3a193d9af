//! Error plumbing and small utilities shared by the relaybot crates.

pub mod error;
pub mod time;

pub use {error::FromMessage, time::unix_now};
