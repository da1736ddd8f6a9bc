// file: src/enhancer/provider.rs
// description: chat-completion provider presets
// reference: openai-compatible /chat/completions endpoints

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Qwen,
    Minimax,
    OpenAi,
    Anthropic,
    Other,
}

impl Provider {
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "qwen" => Provider::Qwen,
            "minimax" => Provider::Minimax,
            "openai" => Provider::OpenAi,
            "anthropic" => Provider::Anthropic,
            _ => Provider::Other,
        }
    }

    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Provider::Qwen => "https://dashscope.aliyuncs.com/compatible-mode/v1",
            Provider::Minimax => "https://api.minimax.chat/v1",
            Provider::OpenAi => "https://api.openai.com/v1",
            Provider::Anthropic => "https://api.anthropic.com/v1",
            Provider::Other => "https://api.example.com/v1",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Qwen => "qwen-plus",
            Provider::Minimax => "MiniMax-M2.1",
            Provider::OpenAi => "gpt-4",
            Provider::Anthropic => "claude-3-sonnet-20241022",
            Provider::Other => "default",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Provider::Qwen => "qwen",
            Provider::Minimax => "minimax",
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Other => "other",
        };
        f.write_str(name)
    }
}
