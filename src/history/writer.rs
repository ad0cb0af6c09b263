//! Background writer: applies saves and clears in arrival order, off the
//! session's critical path. A slow disk can delay persistence but never the
//! stream loop.

use crate::history::store::ConversationStore;
use crate::history::Message;
use std::sync::mpsc::{channel, Sender};
use std::thread;
use tracing::warn;

enum WriteCmd {
    Save(Vec<Message>),
    Clear,
    Flush(Sender<()>),
}

/// Cloneable handle to the writer thread. Sends are fire-and-forget; write
/// failures are logged, never surfaced.
#[derive(Clone)]
pub struct WriterHandle(Sender<WriteCmd>);

impl WriterHandle {
    pub fn save(&self, messages: Vec<Message>) {
        let _ = self.0.send(WriteCmd::Save(messages));
    }

    pub fn clear(&self) {
        let _ = self.0.send(WriteCmd::Clear);
    }

    /// Block until every previously queued write has been applied. Manual
    /// drain for teardown.
    pub fn flush(&self) {
        let (tx, rx) = channel();
        if self.0.send(WriteCmd::Flush(tx)).is_ok() {
            let _ = rx.recv();
        }
    }
}

/// Move the store onto a writer thread. The thread exits once every handle
/// is dropped.
pub fn spawn(store: ConversationStore) -> WriterHandle {
    let (tx, rx) = channel::<WriteCmd>();
    thread::spawn(move || {
        while let Ok(cmd) = rx.recv() {
            let result = match cmd {
                WriteCmd::Save(messages) => store.save(&messages),
                WriteCmd::Clear => store.clear(),
                WriteCmd::Flush(ack) => {
                    let _ = ack.send(());
                    Ok(())
                }
            };
            if let Err(e) = result {
                warn!(error = %e, "history write failed");
            }
        }
    });
    WriterHandle(tx)
}
