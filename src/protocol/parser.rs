//! Line Protocol Parser
//!
//! This module extracts complete request lines from a connection's read
//! buffer and splits them into frames.
//!
//! ## Request Format
//!
//! A request is a single line terminated by `\n` (an optional `\r` before it
//! is stripped), with fields separated by single spaces:
//!
//! ```text
//! set name ariz\r\n
//! app tags red green blue\r\n
//! getval tags 0 2\r\n
//! ```
//!
//! The first frame is the command name; the rest are arguments. Fields are
//! split on every space byte, so consecutive spaces produce empty frames --
//! values on this protocol are opaque but cannot themselves contain spaces
//! or newlines.
//!
//! ## Buffering
//!
//! TCP is a stream: a read may deliver a partial line or several lines at
//! once. [`parse_line`] consumes exactly one complete line from the buffer
//! per call and returns `None` when no full line has arrived yet, leaving
//! partial data in place for the next read.

use bytes::{Bytes, BytesMut};

/// Extracts the next complete request line from `buf` and splits it into
/// frames.
///
/// Consumes the line (including its terminator) from the buffer. The frames
/// share the consumed line's allocation; no bytes are copied.
///
/// # Returns
///
/// - `Some(frames)` when a complete line was available; a blank line yields
///   an empty frame list
/// - `None` when the buffer holds no complete line yet
pub fn parse_line(buf: &mut BytesMut) -> Option<Vec<Bytes>> {
    let newline = buf.iter().position(|&b| b == b'\n')?;

    let mut line = buf.split_to(newline + 1);
    line.truncate(newline);
    if line.last() == Some(&b'\r') {
        line.truncate(line.len() - 1);
    }

    Some(split_frames(line.freeze()))
}

/// Splits a line into space-separated frames, each a zero-copy slice of the
/// line.
fn split_frames(line: Bytes) -> Vec<Bytes> {
    if line.is_empty() {
        return Vec::new();
    }

    let mut frames = Vec::new();
    let mut start = 0;
    for (i, &b) in line.iter().enumerate() {
        if b == b' ' {
            frames.push(line.slice(start..i));
            start = i + 1;
        }
    }
    frames.push(line.slice(start..));
    frames
}
