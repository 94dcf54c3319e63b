pub mod aggregate;

pub use aggregate::{ChatMessage, ChatRole, MessageLog};
