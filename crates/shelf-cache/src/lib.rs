//! # shelf-cache
//!
//! A concurrent in-process key/value cache with per-entry time-to-live.
//! Expired entries are invisible to readers immediately and are reclaimed
//! either lazily on access or in bulk by [`TtlCache::purge_expired`].

pub mod entry;
pub mod ttl;

pub use entry::CacheEntry;
pub use ttl::TtlCache;
