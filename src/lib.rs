//! # stashkv - An In-Memory Key to Value-List Store
//!
//! stashkv is a network-accessible, in-memory key-value store where each key
//! holds an ordered list of opaque byte-string values. Keys may carry a
//! time-to-live, enforced by a background sweeper, and the whole store can be
//! saved to and restored from a snapshot file on demand.
//!
//! ## Features
//!
//! - **Value Lists**: Each key maps to an ordered, duplicate-friendly list of
//!   byte strings, grown with `APP` and trimmed with `DELVAL`
//! - **TTL Support**: Per-key expiration in whole seconds with background
//!   eviction
//! - **Snapshots**: Operator-triggered `SAVE`/`LOAD` of the full mapping
//! - **Line Protocol**: A plain-text protocol simple enough for `nc`
//! - **Async I/O**: Built on Tokio; one task per connection
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                           stashkv                            │
//! │                                                              │
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐        │
//! │  │ TCP Server  │──>│ Connection  │──>│  Command    │        │
//! │  │ (Listener)  │   │  Handler    │   │  Handler    │        │
//! │  └─────────────┘   └─────────────┘   └──────┬──────┘        │
//! │                                             │                │
//! │                                             ▼                │
//! │  ┌─────────────┐   ┌──────────────────────────────────────┐ │
//! │  │ Line Parser │   │                Store                 │ │
//! │  │             │   │   Mutex( items map + expiry index )  │ │
//! │  └─────────────┘   └──────────────────────────────────────┘ │
//! │                            ▲                   ▲             │
//! │                            │                   │             │
//! │                   ┌────────┴───────┐   ┌───────┴─────────┐  │
//! │                   │    Sweeper     │   │ Snapshot codec  │  │
//! │                   │  (Tokio task)  │   │  (SAVE / LOAD)  │  │
//! │                   └────────────────┘   └─────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use stashkv::commands::CommandHandler;
//! use stashkv::connection::{handle_connection, ConnectionStats};
//! use stashkv::storage::{Store, Sweeper};
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() {
//!     // Create the store
//!     let store = Arc::new(Store::new());
//!
//!     // Start the background expiry sweeper
//!     let _sweeper = Sweeper::start(Arc::clone(&store), Duration::from_secs(5));
//!
//!     // Create connection statistics
//!     let stats = Arc::new(ConnectionStats::new());
//!
//!     // Start listening for connections
//!     let listener = TcpListener::bind("127.0.0.1:7070").await.unwrap();
//!
//!     loop {
//!         let (stream, addr) = listener.accept().await.unwrap();
//!         let handler = CommandHandler::new(Arc::clone(&store));
//!         let stats = Arc::clone(&stats);
//!
//!         tokio::spawn(handle_connection(stream, addr, handler, None, stats));
//!     }
//! }
//! ```
//!
//! ## Supported Commands
//!
//! ### Item Commands
//! - `SET key value` - replace the key's list with `[value]`
//! - `APP key value [value ...]` - append values, creating the key if absent
//! - `GET key` - return the full value list
//! - `DEL key` - delete the key (idempotent)
//! - `GETVAL key index [index]` - one value, or the half-open range `[a, b)`
//! - `DELVAL key value` - remove every occurrence of a value
//!
//! ### Expiry Commands
//! - `EXP key seconds` - set the key's time-to-live
//! - `TTL key` - remaining seconds (0 when no expiry is set)
//!
//! ### Store Commands
//! - `HASKEY key` - does the key exist
//! - `PURGE` - delete everything
//! - `SAVE path` - write a snapshot file
//! - `LOAD path` - replace the store's contents from a snapshot file
//!
//! ### Connection Commands
//! - `PING` - test the connection
//! - `EXIT` - close the connection
//!
//! ## Module Overview
//!
//! - [`protocol`]: Line protocol parsing and reply rendering
//! - [`storage`]: The store, the expiry sweeper, and the snapshot codec
//! - [`commands`]: Command dispatch and argument validation
//! - [`connection`]: Client connection management
//!
//! ## Design Highlights
//!
//! ### One Lock, Linearizable Operations
//!
//! The item mapping and the expiry index live behind a single mutex and are
//! always mutated together, so concurrent commands and the sweeper interleave
//! as some serial order and never observe a torn state. Operations hold the
//! lock only for an in-memory mutation; the exceptions are `SAVE`/`LOAD`,
//! which hold it for the whole file pass and deliberately stall other traffic
//! for the duration of the snapshot.
//!
//! ### Background Expiry
//!
//! Keys past their deadline are evicted by a periodic sweeper task, never
//! early, with the item and its expiry entry removed as one atomic step.

pub mod commands;
pub mod connection;
pub mod protocol;
pub mod storage;

// Re-export commonly used types for convenience
pub use commands::CommandHandler;
pub use connection::{handle_connection, ConnectionStats};
pub use protocol::{parse_line, Reply};
pub use storage::{SnapshotError, Store, Sweeper};

/// The default port stashkv listens on
pub const DEFAULT_PORT: u16 = 7070;

/// The default host stashkv binds to
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Version of stashkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
