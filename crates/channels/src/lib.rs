//! Messaging-platform abstractions.
//!
//! The dispatcher only needs two things from a chat platform: the reply
//! history of a thread, and a way to post into a thread. Each platform crate
//! implements [`ThreadHistory`] and [`ChannelOutbound`] for its client.

pub mod error;
pub mod plugin;

pub use {
    error::{Error, Result},
    plugin::{ChannelOutbound, ThreadHistory, ThreadMessage},
};
