//! Muse - a terminal chat client for Gemini and the proxy that holds its key
//!
//! The client core is a pure request coordinator (`state_machine`) driven by
//! a single runtime task (`runtime`). The proxy (`api`) forwards provider
//! requests so the API key never reaches the client.

pub mod api;
pub mod chat;
pub mod config;
pub mod db;
pub mod llm;
pub mod reveal;
pub mod runtime;
pub mod state_machine;
pub mod tui;
