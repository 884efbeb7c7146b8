//! Line Protocol Implementation
//!
//! This module implements stashkv's line-oriented text protocol.
//!
//! ## Overview
//!
//! Requests are single CRLF-terminated lines with space-separated fields;
//! replies are single CRLF-terminated lines. The protocol is deliberately
//! simple enough to drive from `nc` or `telnet`.
//!
//! ## Modules
//!
//! - `parser`: Extracts complete request lines from a read buffer
//! - `types`: Defines the [`Reply`] enum and its wire rendering
//!
//! ## Example
//!
//! ```
//! use stashkv::protocol::{parse_line, Reply};
//! use bytes::{Bytes, BytesMut};
//!
//! let mut buf = BytesMut::from(&b"get name\r\n"[..]);
//! let frames = parse_line(&mut buf).unwrap();
//! assert_eq!(frames[0], Bytes::from("get"));
//!
//! let reply = Reply::values(vec![Bytes::from("ariz")]);
//! assert_eq!(reply.serialize(), Bytes::from("ariz\r\n"));
//! ```

pub mod parser;
pub mod types;

// Re-export commonly used types for convenience
pub use parser::parse_line;
pub use types::{Reply, CRLF};
