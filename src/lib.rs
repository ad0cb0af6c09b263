//! # Concierge
//!
//! Client-side session engine for a streaming chat widget: it sends the
//! visitor's message to a chat-completion backend, decodes the token stream
//! incrementally, reconstructs the reply for live display, enforces a
//! sliding-window rate limit, and persists the conversation across reloads.
//!
//! ## Architecture
//!
//! ```text
//! widget → ChatSession::send_message
//!            → RateLimiter (sliding window)
//!            → CompletionTransport (POST, full history)
//!            → StreamDecoder (line frames → deltas)
//!            → snapshots (watch channel) + ConversationStore (JSON record)
//! ```
//!
//! Everything here degrades gracefully: transport failures become a single
//! apology message, malformed stream frames are dropped, storage failures
//! are logged and the session keeps running in memory. No error in this
//! crate reaches the widget as a panic or an unhandled `Err`.

pub mod config;
pub mod history;
pub mod limit;
pub mod locale;
pub mod session;
pub mod stream;

pub use config::Config;
pub use history::{ConversationStore, Message, Role};
pub use limit::{RateLimitConfig, RateLimiter};
pub use locale::LocaleStrings;
pub use session::{
    ChatSession, CompletionTransport, HttpTransport, SessionSnapshot, SessionState, TransportError,
};
pub use stream::StreamDecoder;
