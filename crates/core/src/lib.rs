//! # ScoutClaw Core
//!
//! Domain types, traits, and error definitions for the ScoutClaw research
//! agent. This crate has **no framework dependencies**: it defines the model
//! that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every collaborator of the agent loop is a trait here. Implementations live
//! in their respective crates. This enables:
//! - Swapping LLM backends via configuration
//! - Easy testing with scripted providers and stub tools
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod message;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use message::{Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse};
pub use tool::{Tool, ToolArgs, ToolRegistry, ToolResult};
