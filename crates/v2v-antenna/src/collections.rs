//! Id-keyed hash collections.
//!
//! Keys are small integer newtypes, so the `fx-hash` feature swaps SipHash
//! for FxHash.  Always construct with `Default::default()` so both
//! configurations compile.

#[cfg(feature = "fx-hash")]
pub type IdMap<K, V> = rustc_hash::FxHashMap<K, V>;
#[cfg(not(feature = "fx-hash"))]
pub type IdMap<K, V> = std::collections::HashMap<K, V>;

#[cfg(feature = "fx-hash")]
pub type IdSet<T> = rustc_hash::FxHashSet<T>;
#[cfg(not(feature = "fx-hash"))]
pub type IdSet<T> = std::collections::HashSet<T>;
