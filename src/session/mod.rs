//! One conversation's lifecycle: validate, rate-limit, stream, recover,
//! persist.

pub mod controller;
pub mod transport;

pub use controller::{ChatSession, SessionSnapshot, SessionState};
pub use transport::{CompletionTransport, HttpTransport, TransportError};
