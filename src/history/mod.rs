//! Conversation record: message model + durable store.

pub mod message;
pub mod store;
pub mod writer;

pub use message::{Message, Role};
pub use store::{ConversationStore, StoreError};
pub use writer::WriterHandle;

#[cfg(test)]
mod tests;
