//! Storage Module
//!
//! This module provides the core store for stashkv: a key to value-list
//! mapping with TTL support, a background expiry sweeper, and snapshot
//! persistence.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                   Store                     │
//! │  ┌───────────────────────────────────────┐  │
//! │  │               Mutex                   │  │
//! │  │  items map      +      expiry index   │  │
//! │  └───────────────────────────────────────┘  │
//! └─────────────────────────────────────────────┘
//!            ▲                     ▲
//!            │                     │
//! ┌──────────┴──────────┐  ┌───────┴────────────┐
//! │      Sweeper        │  │  Snapshot codec    │
//! │ (background task)   │  │  (save/load file)  │
//! └─────────────────────┘  └────────────────────┘
//! ```
//!
//! ## Features
//!
//! - **Value Lists**: Each key holds an ordered list of byte strings
//! - **Single Mutex**: Mapping and expiry index mutate together, so every
//!   operation is linearizable
//! - **TTL Support**: Keys carry an absolute expiration deadline
//! - **Active Expiry**: A background sweeper evicts keys past their deadline
//! - **Snapshots**: The full mapping can be saved to and loaded from a file
//!
//! ## Example
//!
//! ```
//! use stashkv::storage::Store;
//! use bytes::Bytes;
//!
//! let store = Store::new();
//!
//! store.set("fruit", Bytes::from("apple"));
//! store.append("fruit", vec![Bytes::from("pear")]);
//! assert_eq!(store.get("fruit").len(), 2);
//!
//! store.expire("fruit", 60);
//! assert!(store.time_to_live("fruit") > 0);
//! ```

pub mod snapshot;
pub mod store;
pub mod sweeper;

// Re-export commonly used types
pub use snapshot::SnapshotError;
pub use store::Store;
pub use sweeper::Sweeper;
