//! OpenRouter reasoning-service adapter.

pub mod client;
pub mod types;

pub use client::{OpenRouterClient, OpenRouterConfig};
pub use types::{ChatMessage, ChatRequest, ChatResponse};
