// file: src/enhancer/mod.rs
// description: optional language-model enrichment of project records
// reference: internal module structure

pub mod client;
pub mod prompt;
pub mod provider;

pub use client::Enhancer;
pub use prompt::{Enhancement, build_prompt, parse_completion};
pub use provider::Provider;
