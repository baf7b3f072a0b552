//! In-memory response cache.
//!
//! Bounded, time-limited storage used by the client side to avoid redundant
//! upstream calls:
//!
//! - Per-entry TTL, checked lazily on read and by a periodic sweep
//! - Insertion-order eviction when the capacity is reached
//! - Cheap shared handles safe to use from concurrent tasks

pub mod ttl;

pub use ttl::TtlCache;
