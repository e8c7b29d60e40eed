pub mod groq;

pub use groq::{CompletionError, GroqClient, NO_RESPONSE};
