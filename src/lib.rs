//! CoinMarketCap Top-N notifier
//!
//! Announces coins that enter (or leave) the CoinMarketCap Top-N ranking.
//! Messages are produced by a small percent-delimited template engine:
//! - Listing changes are assembled into a render context
//! - A prompt template is rendered for the text generation model
//! - Model output is used when present, otherwise the fallback template
//!   is rendered directly
//!
//! Market data, model calls, persistence and delivery live outside this
//! crate; they hand a context to the renderer and take back a string.

pub mod config;
pub mod context;
pub mod format;
pub mod message;
pub mod source;
pub mod template;

mod error;

// Re-export commonly used types
pub use config::Config;
pub use context::{Coin, ContextBuilder, RecentPost, Snapshot};
pub use error::{Error, Result};
pub use message::{Composer, Message, MessageSource};
pub use template::{lint, render, Map, Record, Renderer, Value};
