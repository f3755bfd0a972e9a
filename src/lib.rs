//! Mood Harmony - mood wheel sector mapping and music-distribution charts
//!
//! A point on a circular mood wheel selects one of eight mood sectors; each
//! sector owns pre-aggregated gain, tempo and key distributions that are
//! rendered as charts. Data flows one way:
//! pointer input → sector geometry → dataset lookup → chart layout → SVG.
//!
//! ## Modules
//!
//! - **Geometry**: angle ↔ sector mapping under one canonical convention
//! - **Wheel**: drag/click/hover state machine with debounced previews
//! - **Dataset**: per-sector buckets and per-culture chord graphs
//! - **Views**: histogram, key puzzle, chord network and wheel charts

pub mod config;
pub mod dataset;
pub mod error;
pub mod gallery;
pub mod geometry;
pub mod stats;
pub mod types;
pub mod views;
pub mod wheel;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use config::GalleryConfig;
pub use dataset::{ChordLibrary, DataStatus, SectorDatasetIndex};
pub use error::HarmonyError;
pub use gallery::{MoodGallery, SectorPanel};
pub use geometry::{angle_to_sector, normalize_angle, sector_to_mid_angle, Point};
pub use types::{ChordGraph, DistributionBucket, MoodSample, Sector, SECTOR_COUNT};
pub use wheel::{MoodWheel, PointerEvent, PointerKind, WheelNotification, WheelSubscriber};

/// Library version, stamped into render manifests
pub const HARMONY_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for render manifests
pub const PRODUCER_NAME: &str = "mood-harmony";
