//! Connection Module
//!
//! This module manages individual client connections to stashkv.
//! Each client connection is handled by its own async task, so many
//! concurrent clients contend only on the store's mutex, never on
//! each other's sockets.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     TCP Listener                            │
//! │                      (main.rs)                              │
//! └──────────────────────┬──────────────────────────────────────┘
//!                        │ accept()
//!                        ▼
//!           ┌────────────────────────┐
//!           │   For each client...   │
//!           └────────────┬───────────┘
//!                        │ spawn task
//!                        ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 ConnectionHandler                           │
//! │                                                             │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐     │
//! │  │ Read bytes  │───>│ Parse line  │───>│ Execute cmd │     │
//! │  └─────────────┘    └─────────────┘    └──────┬──────┘     │
//! │                                               ▼             │
//! │                                      ┌─────────────┐        │
//! │                                      │ Send reply  │        │
//! │                                      └─────────────┘        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Features
//!
//! - **Async I/O**: Uses Tokio for non-blocking network operations
//! - **Buffer Management**: BytesMut read buffer with a hard size cap
//! - **Pipelining**: Multiple request lines in a single TCP packet
//! - **Idle Timeout**: Optional per-connection read deadline
//! - **Statistics**: Tracks connection and command metrics

pub mod handler;

// Re-export commonly used types
pub use handler::{handle_connection, ConnectionError, ConnectionHandler, ConnectionStats};
