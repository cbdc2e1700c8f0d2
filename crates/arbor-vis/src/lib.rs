//! Arbor Tree Height Visualization
//!
//! Step-by-step playback of the recursive maximum-depth computation over a
//! binary tree given in level-order form.
//!
//! # Architecture
//!
//! - **Replay**: Cursor, speed and play state over a recorded trace
//! - **AutoPlay**: One tokio timer advancing the cursor while playing
//! - **WebSocket**: Streams the current frame to the frontend on every change
//! - **REST API**: Load trees, control playback, fetch layout and source
//!
//! # Usage
//!
//! ```ignore
//! let config = VisConfig::from_env()?;
//! let server = VisServer::new(config)?;
//! server.serve().await?;
//! ```

mod autoplay;
mod config;
mod error;
mod replay;
mod server;

pub use autoplay::AutoPlay;
pub use config::{VisConfig, DEFAULT_INPUT, DEFAULT_VIEWPORT};
pub use error::{Error, Result};
pub use replay::{
    PendingTick, PlaybackSpeed, Replay, ReplayCommand, ReplayStatus, TickAction, TickId,
    DEFAULT_SPEED, MIN_SPEED,
};
pub use server::{AppState, VisServer};
