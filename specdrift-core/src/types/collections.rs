//! Hash collections backed by FxHash — faster than SipHash for the
//! short string keys that dominate fact joins.

pub use rustc_hash::{FxHashMap, FxHashSet};
