//! The orchestrating state machine binding limiter, decoder, store and
//! transport into one conversation lifecycle.
//!
//! ```text
//! send_message → RateLimiter → transport.open → StreamDecoder → snapshots
//!                                                             ↘ store.save
//! ```
//!
//! Whatever way a stream terminates (exhaustion, read error, cancellation),
//! the session lands back in `Idle`. That guarantee is the one contract the
//! widget depends on.

use crate::config::Config;
use crate::history::{writer, ConversationStore, Message, WriterHandle};
use crate::limit::RateLimiter;
use crate::locale::LocaleStrings;
use crate::session::transport::{ChunkStream, CompletionTransport, HttpTransport, TransportError};
use crate::stream::StreamDecoder;
use futures::StreamExt;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// How long the rate-limit notice stays raised before it clears itself.
const RATE_LIMIT_NOTICE: Duration = Duration::from_millis(3000);

/// Where one turn currently stands. `Idle` is both the initial state and the
/// state every send returns to; a session takes unlimited turns until
/// explicitly cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Sending,
}

/// One consistent view of the session, published whole on every change.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub messages: Vec<Message>,
    pub state: SessionState,
    /// Transient: raised on a rate-limited send, clears itself after a
    /// fixed display duration.
    pub rate_limited: bool,
}

impl SessionSnapshot {
    pub fn is_sending(&self) -> bool {
        self.state == SessionState::Sending
    }

    /// Derived, never stored: the conversation has at least one message.
    pub fn has_interacted(&self) -> bool {
        !self.messages.is_empty()
    }
}

struct SessionInner {
    messages: Vec<Message>,
    pending_input: String,
    state: SessionState,
    limiter: RateLimiter,
    rate_limited: bool,
    cancel: CancellationToken,
    updates: watch::Sender<SessionSnapshot>,
}

impl SessionInner {
    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            messages: self.messages.clone(),
            state: self.state,
            rate_limited: self.rate_limited,
        }
    }

    /// Publish the current state as a full replacement, so every observer
    /// sees a consistent snapshot and never a half-mutated list.
    fn publish(&self) {
        self.updates.send_replace(self.snapshot());
    }
}

/// Cloneable handle to one conversation. All mutation happens in short
/// critical sections; the lock is never held across an await.
#[derive(Clone)]
pub struct ChatSession {
    inner: Arc<Mutex<SessionInner>>,
    transport: Arc<dyn CompletionTransport>,
    writer: WriterHandle,
    strings: Arc<LocaleStrings>,
}

impl ChatSession {
    /// Session over the real HTTP transport.
    pub fn new(config: &Config) -> Result<Self, TransportError> {
        let transport = Arc::new(HttpTransport::new(config.endpoint.clone())?);
        Ok(Self::with_transport(config, transport))
    }

    /// Session over any transport; the seam tests are written against.
    pub fn with_transport(config: &Config, transport: Arc<dyn CompletionTransport>) -> Self {
        let store = ConversationStore::new(&config.history_path);
        // History is restored here, before any save can possibly run, so a
        // first empty save can never clobber a previous conversation.
        let messages = store.load();
        let (updates, _) = watch::channel(SessionSnapshot {
            messages: messages.clone(),
            state: SessionState::Idle,
            rate_limited: false,
        });

        Self {
            inner: Arc::new(Mutex::new(SessionInner {
                messages,
                pending_input: String::new(),
                state: SessionState::Idle,
                limiter: RateLimiter::new(config.rate.clone()),
                rate_limited: false,
                cancel: CancellationToken::new(),
                updates,
            })),
            transport,
            writer: writer::spawn(store),
            strings: Arc::new(LocaleStrings::for_locale(&config.locale)),
        }
    }

    /// Observe the session: the receiver always holds the latest snapshot.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.lock().unwrap().updates.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.lock().unwrap().snapshot()
    }

    /// Stash the draft text on behalf of the widget. No validation.
    pub fn set_input(&self, text: impl Into<String>) {
        self.inner.lock().unwrap().pending_input = text.into();
    }

    pub fn input(&self) -> String {
        self.inner.lock().unwrap().pending_input.clone()
    }

    /// Send one message: the explicit argument when given, the pending draft
    /// otherwise. Rejections (empty text, a send already in flight, the rate
    /// limiter) are silent no-ops apart from the transient limit notice;
    /// nothing here ever surfaces an error to the caller.
    #[instrument(skip(self, text))]
    pub async fn send_message(&self, text: Option<&str>) {
        let request_id = Uuid::new_v4();

        let history = {
            let mut inner = self.inner.lock().unwrap();
            let effective = match text {
                Some(t) => t.trim().to_string(),
                None => inner.pending_input.trim().to_string(),
            };
            if effective.is_empty() {
                debug!("ignoring empty send");
                return;
            }
            if inner.state == SessionState::Sending {
                debug!("send already in flight, ignoring");
                return;
            }
            if !inner.limiter.try_acquire(Instant::now()) {
                inner.rate_limited = true;
                inner.publish();
                self.spawn_rate_limit_reset();
                return;
            }

            inner.pending_input.clear();
            inner.messages.push(Message::user(effective));
            inner.state = SessionState::Sending;
            inner.cancel = CancellationToken::new();
            inner.publish();
            self.persist(inner.messages.clone());
            inner.messages.clone()
        };

        info!(request_id = %request_id, turns = history.len(), "opening completion stream");

        match self.transport.open(&history).await {
            Ok(stream) => self.consume_stream(stream).await,
            Err(e) => {
                // The sole error-recovery path: one synthetic assistant
                // message, no retry.
                warn!(request_id = %request_id, error = %e, "completion request failed");
                let mut inner = self.inner.lock().unwrap();
                inner.messages.push(Message::assistant(self.strings.apology()));
                inner.publish();
                self.persist(inner.messages.clone());
            }
        }

        // Unconditional: every termination path of the block above funnels
        // through here. The widget must never be stuck on "sending".
        let mut inner = self.inner.lock().unwrap();
        inner.state = SessionState::Idle;
        inner.publish();
    }

    /// Read the body, feeding each chunk to the decoder and appending every
    /// delta to the placeholder under the lock, so deltas always land on the
    /// latest accumulated text.
    async fn consume_stream(&self, mut stream: ChunkStream) {
        let cancel = {
            let mut inner = self.inner.lock().unwrap();
            inner.messages.push(Message::assistant(""));
            inner.publish();
            inner.cancel.clone()
        };

        let mut decoder = StreamDecoder::new();
        loop {
            let next = tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("stream cancelled");
                    break;
                }
                next = stream.next() => next,
            };
            let chunk = match next {
                Some(Ok(chunk)) => chunk,
                Some(Err(e)) => {
                    warn!(error = %e, "stream read failed");
                    break;
                }
                None => break,
            };
            for delta in decoder.feed(&chunk) {
                let mut inner = self.inner.lock().unwrap();
                if let Some(last) = inner.messages.last_mut() {
                    last.content.push_str(&delta);
                }
                inner.publish();
                self.persist(inner.messages.clone());
            }
        }
    }

    /// Abort the in-flight read, if any. The send loop still finalizes the
    /// session back to `Idle`.
    pub fn cancel(&self) {
        self.inner.lock().unwrap().cancel.cancel();
    }

    /// Reset the conversation and delete the persisted record.
    #[instrument(skip(self))]
    pub fn clear_history(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.messages.clear();
        inner.publish();
        self.writer.clear();
        info!("conversation history cleared");
    }

    /// Drain pending history writes, e.g. before teardown.
    pub fn flush_history(&self) {
        self.writer.flush();
    }

    /// Fire-and-forget write of the full record; the writer thread applies
    /// saves and clears in order, so persistence never gates the send or
    /// receive path.
    fn persist(&self, messages: Vec<Message>) {
        self.writer.save(messages);
    }

    fn spawn_rate_limit_reset(&self) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(RATE_LIMIT_NOTICE).await;
            let mut inner = inner.lock().unwrap();
            inner.rate_limited = false;
            inner.publish();
        });
    }
}
