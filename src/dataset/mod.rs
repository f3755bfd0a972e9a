//! Static dataset loading
//!
//! Per-sector distribution buckets and per-culture chord graphs are read once
//! from JSON files and never mutated afterwards. Every load is a single attempt:
//! on failure a fallback value is substituted and the failure is logged.

pub mod buckets;
pub mod chords;
pub mod loader;

pub use buckets::SectorDatasetIndex;
pub use chords::ChordLibrary;
pub use loader::{load_or_fallback, read_json, DataStatus, Loaded};
