//! OKR tracker server: HTTP API, MCP server and the HTTP text-generation
//! provider, on top of [`okr_core`].

pub mod api;
pub mod config;
pub mod llm;
pub mod mcp;
