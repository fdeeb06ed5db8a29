//! OpenAI-compatible chat-completions client: JSON POST wire contract,
//! bearer auth, retry with exponential backoff, and SSE streaming.

mod client;
mod error;

pub use client::LlmClient;
pub use error::{LlmError, Result};
pub use trendcore_types::{ChatMessage, ChatResponse, Role, Usage};
