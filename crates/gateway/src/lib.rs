//! HTTP gateway: Slack Events API intake, duplicate suppression, and the
//! background reply pipeline.
//!
//! Inbound events are filtered synchronously by [`EventDispatcher`]; each
//! admitted event gets its own tokio task that fetches thread context,
//! generates a reply and posts it back into the thread.

pub mod dedup;
pub mod dispatch;
pub mod error;
pub mod server;
pub mod state;

pub use {
    dedup::DedupStore,
    dispatch::{DropReason, EventDispatcher},
    error::{Error, Result},
    server::{build_app, start_server},
    state::AppState,
};
