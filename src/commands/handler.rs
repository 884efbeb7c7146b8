//! Command Handler Module
//!
//! This module implements stashkv's command surface. It receives the frames
//! of one parsed request line, validates argument counts and types, and
//! dispatches to the matching [`Store`] operation.
//!
//! ## Supported Commands
//!
//! - `PING` - Test connection
//! - `SET key value` - Replace a key's list with a single value
//! - `APP key value [value ...]` - Append values to a key's list
//! - `GET key` - Return a key's full value list
//! - `DEL key` - Delete a key
//! - `EXP key seconds` - Set a key's time-to-live
//! - `TTL key` - Remaining seconds before a key expires
//! - `HASKEY key` - Check whether a key exists
//! - `GETVAL key index [index]` - Return one value or a sub-range
//! - `DELVAL key value` - Remove every occurrence of a value
//! - `SAVE path` - Write a snapshot of the store to a file
//! - `LOAD path` - Replace the store's contents from a snapshot file
//! - `PURGE` - Delete everything
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     CommandHandler                          │
//! │                                                             │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐     │
//! │  │  execute()  │───>│  dispatch() │───>│  cmd_xxx()  │     │
//! │  └─────────────┘    └─────────────┘    └─────────────┘     │
//! │                                               │             │
//! │                                               ▼             │
//! │                                             Store           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Failures here are always plain `ERR` replies: a missing key is a boolean
//! or empty result, never an error, and snapshot I/O failures surface as the
//! store's boolean return. Nothing in this layer can take the process down.

use crate::protocol::Reply;
use crate::storage::Store;
use bytes::Bytes;
use std::sync::Arc;

/// Executes client commands by dispatching them to the store.
#[derive(Debug, Clone)]
pub struct CommandHandler {
    /// The store shared by every connection
    store: Arc<Store>,
}

impl CommandHandler {
    /// Creates a new command handler backed by the given store.
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Executes one request and returns the reply.
    ///
    /// # Arguments
    ///
    /// * `frames` - The request's fields; the first is the command name
    ///
    /// # Returns
    ///
    /// The reply to send back to the client.
    pub fn execute(&self, frames: &[Bytes]) -> Reply {
        let Some(name) = frames.first() else {
            return Reply::error("empty command");
        };

        let name = match std::str::from_utf8(name) {
            Ok(s) => s.to_uppercase(),
            Err(_) => return Reply::error("invalid command name"),
        };

        self.dispatch(&name, &frames[1..])
    }

    /// Dispatches a command to its handler.
    fn dispatch(&self, cmd: &str, args: &[Bytes]) -> Reply {
        match cmd {
            "PING" => Reply::Pong,
            "SET" => self.cmd_set(args),
            "APP" => self.cmd_app(args),
            "GET" => self.cmd_get(args),
            "DEL" => self.cmd_del(args),
            "EXP" => self.cmd_exp(args),
            "TTL" => self.cmd_ttl(args),
            "HASKEY" => self.cmd_haskey(args),
            "GETVAL" => self.cmd_getval(args),
            "DELVAL" => self.cmd_delval(args),
            "SAVE" => self.cmd_save(args),
            "LOAD" => self.cmd_load(args),
            "PURGE" => self.cmd_purge(args),
            _ => Reply::error(format!("unknown command '{}'", cmd)),
        }
    }

    // ========================================================================
    // Helper functions
    // ========================================================================

    /// Extracts a UTF-8 string (key or path) from a frame.
    fn get_str<'a>(&self, frame: &'a Bytes) -> Option<&'a str> {
        std::str::from_utf8(frame).ok()
    }

    /// Extracts an integer from a frame.
    fn get_integer(&self, frame: &Bytes) -> Option<i64> {
        std::str::from_utf8(frame).ok().and_then(|s| s.parse().ok())
    }

    fn wrong_arity(&self, cmd: &str) -> Reply {
        Reply::error(format!("wrong number of arguments for '{}' command", cmd))
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// SET key value
    fn cmd_set(&self, args: &[Bytes]) -> Reply {
        if args.len() != 2 {
            return self.wrong_arity("SET");
        }
        let Some(key) = self.get_str(&args[0]) else {
            return Reply::error("invalid key");
        };
        Reply::flag(self.store.set(key, args[1].clone()))
    }

    /// APP key value [value ...]
    fn cmd_app(&self, args: &[Bytes]) -> Reply {
        if args.len() < 2 {
            return self.wrong_arity("APP");
        }
        let Some(key) = self.get_str(&args[0]) else {
            return Reply::error("invalid key");
        };
        Reply::flag(self.store.append(key, args[1..].to_vec()))
    }

    /// GET key
    fn cmd_get(&self, args: &[Bytes]) -> Reply {
        if args.len() != 1 {
            return self.wrong_arity("GET");
        }
        let Some(key) = self.get_str(&args[0]) else {
            return Reply::error("invalid key");
        };
        Reply::values(self.store.get(key))
    }

    /// DEL key
    fn cmd_del(&self, args: &[Bytes]) -> Reply {
        if args.len() != 1 {
            return self.wrong_arity("DEL");
        }
        let Some(key) = self.get_str(&args[0]) else {
            return Reply::error("invalid key");
        };
        Reply::flag(self.store.delete(key))
    }

    /// EXP key seconds
    fn cmd_exp(&self, args: &[Bytes]) -> Reply {
        if args.len() != 2 {
            return self.wrong_arity("EXP");
        }
        let Some(key) = self.get_str(&args[0]) else {
            return Reply::error("invalid key");
        };
        let Some(secs) = self.get_integer(&args[1]) else {
            return Reply::error("value is not an integer or out of range");
        };
        Reply::flag(self.store.expire(key, secs))
    }

    /// TTL key
    fn cmd_ttl(&self, args: &[Bytes]) -> Reply {
        if args.len() != 1 {
            return self.wrong_arity("TTL");
        }
        let Some(key) = self.get_str(&args[0]) else {
            return Reply::error("invalid key");
        };
        Reply::integer(self.store.time_to_live(key))
    }

    /// HASKEY key
    fn cmd_haskey(&self, args: &[Bytes]) -> Reply {
        if args.len() != 1 {
            return self.wrong_arity("HASKEY");
        }
        let Some(key) = self.get_str(&args[0]) else {
            return Reply::error("invalid key");
        };
        Reply::flag(self.store.has_key(key))
    }

    /// GETVAL key index [index]
    ///
    /// With one index returns that single value; with two indices returns the
    /// half-open range. Out-of-range indices come back as an empty values
    /// line, not an error.
    fn cmd_getval(&self, args: &[Bytes]) -> Reply {
        if args.len() < 2 {
            return self.wrong_arity("GETVAL");
        }
        let Some(key) = self.get_str(&args[0]) else {
            return Reply::error("invalid key");
        };
        let mut indices = Vec::with_capacity(args.len() - 1);
        for frame in &args[1..] {
            match self.get_integer(frame) {
                Some(n) => indices.push(n),
                None => return Reply::error("value is not an integer or out of range"),
            }
        }
        Reply::values(self.store.get_range(key, &indices))
    }

    /// DELVAL key value
    fn cmd_delval(&self, args: &[Bytes]) -> Reply {
        if args.len() != 2 {
            return self.wrong_arity("DELVAL");
        }
        let Some(key) = self.get_str(&args[0]) else {
            return Reply::error("invalid key");
        };
        Reply::flag(self.store.delete_value(key, &args[1]))
    }

    /// SAVE path
    fn cmd_save(&self, args: &[Bytes]) -> Reply {
        if args.len() != 1 {
            return self.wrong_arity("SAVE");
        }
        let Some(path) = self.get_str(&args[0]) else {
            return Reply::error("invalid path");
        };
        Reply::flag(self.store.save_snapshot(path))
    }

    /// LOAD path
    fn cmd_load(&self, args: &[Bytes]) -> Reply {
        if args.len() != 1 {
            return self.wrong_arity("LOAD");
        }
        let Some(path) = self.get_str(&args[0]) else {
            return Reply::error("invalid path");
        };
        Reply::flag(self.store.load_snapshot(path))
    }

    /// PURGE
    fn cmd_purge(&self, args: &[Bytes]) -> Reply {
        if !args.is_empty() {
            return self.wrong_arity("PURGE");
        }
        Reply::flag(self.store.purge())
    }
}
