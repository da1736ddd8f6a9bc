// file: src/github/mod.rs
// description: upstream repository search client module exports
// reference: internal module structure

pub mod client;
pub mod parser;

pub use client::{FetchReport, FetchResult, GithubClient};
pub use parser::{SearchResponse, parse_item, parse_search_response};
