//! LLM client layer for quorum
//!
//! This crate provides the chat-completion abstraction used by the analysis
//! agents. It includes:
//!
//! - Message and request/response types for chat completions
//! - The `ChatProvider` trait for LLM implementations
//! - A Groq client (OpenAI-compatible wire format) with rate limiting
//!
//! Each agent step performs a single completion call; there is no retry or
//! backoff layer by design.

pub mod client;
pub mod error;
pub mod messages;
pub mod provider;

// Re-export main types
pub use client::{GroqClient, GroqConfig};
pub use error::{LlmError, Result};
pub use messages::{ChatRequest, ChatResponse, Message, Role, TokenUsage};
pub use provider::ChatProvider;
