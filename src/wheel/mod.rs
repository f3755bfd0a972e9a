//! Mood wheel interaction surface
//!
//! Pointer events (down, move, up, leave, click, hover) drive a small state
//! machine that commits mood sectors and reports hover previews.
//!
//! Pipeline: PointerEvent → MoodWheel (Idle/Dragging) → Sector Geometry →
//! WheelNotification → subscribers

pub mod controller;
pub mod events;
pub mod hover;

pub use controller::{DragState, MoodWheel, WheelGeometry};
pub use events::{PointerEvent, PointerKind, WheelNotification, WheelSubscriber};
pub use hover::HoverDebouncer;
