//! Line Protocol Reply Types
//!
//! This module defines the replies stashkv sends back to clients.
//! The wire protocol is line-oriented and text-based; every reply is a
//! single line terminated with CRLF.
//!
//! ## Reply Formats
//!
//! Flag (success): `OK\r\n`
//! Flag (failure): `ERR\r\n`
//! Error with message: `ERR <message>\r\n`
//! Pong: `PONG\r\n`
//! Integer: `42\r\n`
//! Values: `v1 v2 v3\r\n` (space-joined; an empty list is a bare `\r\n`)

use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;

/// The CRLF terminator ending every reply line
pub const CRLF: &[u8] = b"\r\n";

/// A reply to a single client command.
///
/// Covers every result shape a store operation can produce: a boolean
/// outcome, an error with a message, an integer, or a list of values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Boolean outcome of a command, rendered `OK` or `ERR`.
    Flag(bool),

    /// A failure with a diagnostic message, rendered `ERR <message>`.
    /// The message cannot contain CR or LF.
    Error(String),

    /// Reply to `PING`.
    Pong,

    /// A 64-bit signed integer, used for TTL results.
    Integer(i64),

    /// An ordered list of opaque values, space-joined on the wire.
    Values(Vec<Bytes>),
}

impl Reply {
    /// Creates a flag reply from a boolean outcome.
    pub fn flag(ok: bool) -> Self {
        Reply::Flag(ok)
    }

    /// Creates an error reply with a message.
    ///
    /// # Example
    /// ```
    /// use stashkv::protocol::Reply;
    /// let err = Reply::error("unknown command 'frob'");
    /// ```
    pub fn error(msg: impl Into<String>) -> Self {
        Reply::Error(msg.into())
    }

    /// Creates an integer reply.
    pub fn integer(n: i64) -> Self {
        Reply::Integer(n)
    }

    /// Creates a values reply.
    pub fn values(values: Vec<Bytes>) -> Self {
        Reply::Values(values)
    }

    /// Serializes this reply into its wire representation.
    pub fn serialize(&self) -> Bytes {
        let mut buf = BytesMut::new();
        match self {
            Reply::Flag(true) => buf.put_slice(b"OK"),
            Reply::Flag(false) => buf.put_slice(b"ERR"),
            Reply::Error(msg) => {
                buf.put_slice(b"ERR ");
                buf.put_slice(msg.as_bytes());
            }
            Reply::Pong => buf.put_slice(b"PONG"),
            Reply::Integer(n) => buf.put_slice(n.to_string().as_bytes()),
            Reply::Values(values) => {
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        buf.put_u8(b' ');
                    }
                    buf.put_slice(value);
                }
            }
        }
        buf.put_slice(CRLF);
        buf.freeze()
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Flag(true) => write!(f, "OK"),
            Reply::Flag(false) => write!(f, "ERR"),
            Reply::Error(msg) => write!(f, "ERR {}", msg),
            Reply::Pong => write!(f, "PONG"),
            Reply::Integer(n) => write!(f, "{}", n),
            Reply::Values(values) => write!(f, "<{} values>", values.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_flags() {
        assert_eq!(Reply::flag(true).serialize(), Bytes::from("OK\r\n"));
        assert_eq!(Reply::flag(false).serialize(), Bytes::from("ERR\r\n"));
    }

    #[test]
    fn test_serialize_error() {
        assert_eq!(
            Reply::error("wrong number of arguments").serialize(),
            Bytes::from("ERR wrong number of arguments\r\n")
        );
    }

    #[test]
    fn test_serialize_pong() {
        assert_eq!(Reply::Pong.serialize(), Bytes::from("PONG\r\n"));
    }

    #[test]
    fn test_serialize_integer() {
        assert_eq!(Reply::integer(42).serialize(), Bytes::from("42\r\n"));
        assert_eq!(Reply::integer(-7).serialize(), Bytes::from("-7\r\n"));
    }

    #[test]
    fn test_serialize_values() {
        let reply = Reply::values(vec![Bytes::from("a"), Bytes::from("b"), Bytes::from("c")]);
        assert_eq!(reply.serialize(), Bytes::from("a b c\r\n"));
    }

    #[test]
    fn test_serialize_empty_values() {
        assert_eq!(Reply::values(vec![]).serialize(), Bytes::from("\r\n"));
    }
}
