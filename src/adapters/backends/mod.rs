//! Text-completion backends.

pub mod anthropic;
pub mod mock;

pub use anthropic::AnthropicBackend;
pub use mock::MockBackend;
