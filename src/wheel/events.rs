//! Pointer input and wheel output types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::Point;
use crate::types::{MoodSample, Sector};

/// Kind of pointer interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerKind {
    Down,
    Move,
    Up,
    Leave,
    Click,
    Hover,
}

/// A pointer event in screen coordinates (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub kind: PointerKind,
    /// Ignored for `leave` and `up`
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    /// When the event happened; drives hover debouncing
    pub at: DateTime<Utc>,
}

impl PointerEvent {
    pub fn new(kind: PointerKind, point: Point, at: DateTime<Utc>) -> Self {
        Self {
            kind,
            x: point.x,
            y: point.y,
            at,
        }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Something a wheel reports to its subscribers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WheelNotification {
    /// The committed sector changed
    MoodChange {
        wheel_id: Uuid,
        at: DateTime<Utc>,
        previous: Sector,
        sample: MoodSample,
    },
    /// The hover preview settled on a sector, or cleared
    SectorHover {
        wheel_id: Uuid,
        at: DateTime<Utc>,
        sector: Option<Sector>,
    },
}

impl WheelNotification {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            WheelNotification::MoodChange { at, .. } | WheelNotification::SectorHover { at, .. } => *at,
        }
    }
}

/// Receiver of wheel notifications.
///
/// Both methods default to no-ops so views implement only what they need.
pub trait WheelSubscriber {
    fn on_mood_change(&mut self, _sample: &MoodSample) {}

    fn on_sector_hover(&mut self, _sector: Option<Sector>) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_event_from_ndjson_line() {
        let event: PointerEvent =
            serde_json::from_str(r#"{"kind":"leave","at":"2024-01-15T14:00:00Z"}"#).unwrap();
        assert_eq!(event.kind, PointerKind::Leave);
        assert_eq!(event.point(), Point::new(0.0, 0.0));
    }

    #[test]
    fn test_notification_is_tagged() {
        let note = WheelNotification::SectorHover {
            wheel_id: Uuid::nil(),
            at: "2024-01-15T14:00:00Z".parse().unwrap(),
            sector: Sector::new(2).ok(),
        };
        let value = serde_json::to_value(&note).unwrap();
        assert_eq!(value["type"], "sector_hover");
        assert_eq!(value["sector"], 2);
    }
}
