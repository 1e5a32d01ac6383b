// Claude streaming client and the LLM-backed group namer.

pub mod client;
pub mod naming;

#[cfg(test)]
mod test_support;

pub use client::{ClaudeClient, LlmError};
pub use naming::LlmGroupNamer;
