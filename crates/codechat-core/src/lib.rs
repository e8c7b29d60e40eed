pub mod ai;
pub mod bridge;
pub mod config;
pub mod protocol;
pub mod state;

// Re-export main types for convenience
pub use ai::{CompletionError, GroqClient};
pub use bridge::{BridgeChannels, MessageBridge};
pub use config::Config;
pub use protocol::{ChatRequest, ChatResponse, RequestId};
pub use state::{ChatMessage, ChatRole};
