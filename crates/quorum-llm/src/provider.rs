//! Chat provider trait

use crate::{ChatRequest, ChatResponse, Result};
use async_trait::async_trait;

/// Trait implemented by chat-completion backends
///
/// Implementations perform exactly one attempt per call; retry policy is the
/// caller's concern (and out of scope for the analysis pipeline).
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Send a completion request and return the assistant response
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse>;

    /// Get the provider's name
    fn name(&self) -> &'static str;
}
