//! Wire shapes for the line-framed completion stream.
//! Every field defaults so a sparse frame still deserializes; the delta is
//! simply empty when the nested content field is absent.

use serde::Deserialize;

/// Prefix of every meaningful event line.
pub(crate) const EVENT_PREFIX: &str = "data: ";

/// Logical end-of-data marker. Recognized but carries no content; the read
/// loop still terminates on the transport's own end-of-stream.
pub(crate) const DONE_SENTINEL: &str = "[DONE]";

#[derive(Deserialize, Debug)]
pub struct CompletionChunk {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
}

#[derive(Deserialize, Debug)]
pub struct ChunkChoice {
    #[serde(default)]
    pub delta: ChunkDelta,
}

#[derive(Deserialize, Debug, Default)]
pub struct ChunkDelta {
    #[serde(default)]
    pub content: Option<String>,
}

impl CompletionChunk {
    /// The incremental text carried by this frame, empty when absent.
    pub fn delta_content(self) -> String {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.delta.content)
            .unwrap_or_default()
    }
}
