//! Command Module
//!
//! This module implements the command processing layer for stashkv.
//! It receives the parsed frames of a request line, validates them, executes
//! them against the store, and returns the reply to send back.
//!
//! ## Architecture
//!
//! ```text
//! Client Request
//!       │
//!       ▼
//! ┌─────────────────┐
//! │  Line Parser    │  (protocol module)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ CommandHandler  │  (this module)
//! │                 │
//! │  - Dispatch     │
//! │  - Validate     │
//! │  - Execute      │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │     Store       │  (storage module)
//! └─────────────────┘
//! ```
//!
//! ## Supported Commands
//!
//! - Item commands: `SET`, `APP`, `GET`, `DEL`, `GETVAL`, `DELVAL`
//! - Expiry commands: `EXP`, `TTL`
//! - Store commands: `HASKEY`, `PURGE`, `SAVE`, `LOAD`
//! - Connection commands: `PING` (and `EXIT`, handled by the connection layer)

pub mod handler;

// Re-export the main command handler
pub use handler::CommandHandler;
