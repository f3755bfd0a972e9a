//! Mood wheel controller
//!
//! Owns the committed sector, the drag indicator angle and the hover preview
//! for one wheel instance. Two drag states:
//!
//! - **Idle** → **Dragging** on pointer-down within `drag_tolerance` of the
//!   indicator.
//! - **Dragging** → **Idle** on pointer-up or pointer-leave.
//!
//! While dragging, a sector change produces exactly one `MoodChange` per
//! boundary crossed, walking in the direction the pointer moved.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::config::WheelConfig;
use crate::geometry::{
    angle_to_sector, point_on_wheel, pointer_angle, sector_to_mid_angle, signed_delta, Point,
};
use crate::types::{MoodSample, Sector, SECTOR_COUNT};
use crate::wheel::events::{PointerEvent, PointerKind, WheelNotification, WheelSubscriber};
use crate::wheel::hover::HoverDebouncer;

/// Screen-space layout of a wheel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelGeometry {
    pub center: Point,
    pub inner_radius: f64,
    pub outer_radius: f64,
    /// Distance of the drag indicator from the center
    pub indicator_radius: f64,
    pub drag_tolerance: f64,
}

impl WheelGeometry {
    pub fn from_config(config: &WheelConfig) -> Self {
        let (inner, outer) = config.radius_range();
        Self {
            center: Point::new(config.size / 2.0, config.size / 2.0),
            inner_radius: inner,
            outer_radius: outer,
            indicator_radius: (inner + outer) / 2.0,
            drag_tolerance: config.drag_tolerance,
        }
    }

    /// Whether a point lies on the sector ring
    pub fn on_ring(&self, point: Point) -> bool {
        let r = point.distance(self.center);
        r >= self.inner_radius && r <= self.outer_radius
    }
}

impl Default for WheelGeometry {
    fn default() -> Self {
        Self::from_config(&WheelConfig::default())
    }
}

/// Drag state of the wheel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragState {
    Idle,
    /// `last_angle` is the pointer angle of the previous drag event
    Dragging { last_angle: f64 },
}

/// One independent mood wheel
pub struct MoodWheel {
    id: Uuid,
    geometry: WheelGeometry,
    state: DragState,
    indicator_angle: f64,
    committed: Sector,
    hover_target: Option<Sector>,
    debouncer: HoverDebouncer,
    subscribers: Vec<Box<dyn WheelSubscriber>>,
}

impl Default for MoodWheel {
    fn default() -> Self {
        Self::new(WheelGeometry::default(), HoverDebouncer::default())
    }
}

impl MoodWheel {
    /// Create a wheel with sector 0 committed
    pub fn new(geometry: WheelGeometry, debouncer: HoverDebouncer) -> Self {
        let committed = Sector::ALL[0];
        Self {
            id: Uuid::new_v4(),
            geometry,
            state: DragState::Idle,
            indicator_angle: sector_to_mid_angle(committed),
            committed,
            hover_target: None,
            debouncer,
            subscribers: Vec::new(),
        }
    }

    pub fn from_config(config: &WheelConfig) -> Self {
        Self::new(
            WheelGeometry::from_config(config),
            HoverDebouncer::new(Duration::milliseconds(config.hover_debounce_ms)),
        )
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn geometry(&self) -> &WheelGeometry {
        &self.geometry
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn committed(&self) -> Sector {
        self.committed
    }

    /// Settled hover preview, if any
    pub fn preview(&self) -> Option<Sector> {
        self.debouncer.reported()
    }

    /// Sector to highlight: the preview while hovering, else the committed one
    pub fn display_sector(&self) -> Sector {
        self.preview().unwrap_or(self.committed)
    }

    pub fn indicator_angle(&self) -> f64 {
        self.indicator_angle
    }

    pub fn indicator_position(&self) -> Point {
        point_on_wheel(
            self.geometry.center,
            self.geometry.indicator_radius,
            self.indicator_angle,
        )
    }

    /// When the pending hover preview will settle, if one is waiting
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.debouncer.due_at()
    }

    pub fn subscribe(&mut self, subscriber: Box<dyn WheelSubscriber>) {
        self.subscribers.push(subscriber);
    }

    /// Sync the committed sector from outside without notifying
    pub fn set_highlighted(&mut self, sector: Sector) {
        self.committed = sector;
        self.indicator_angle = sector_to_mid_angle(sector);
    }

    /// Feed one pointer event; returns (and dispatches) what it caused
    pub fn handle(&mut self, event: &PointerEvent) -> Vec<WheelNotification> {
        let mut out = Vec::new();
        self.poll_hover(event.at, &mut out);

        let point = event.point();
        match (event.kind, self.state) {
            (PointerKind::Down, DragState::Idle) => {
                let distance = point.distance(self.indicator_position());
                if distance <= self.geometry.drag_tolerance {
                    debug!(wheel = %self.id, "drag started");
                    self.state = DragState::Dragging {
                        last_angle: self.indicator_angle,
                    };
                    // A drag owns the highlight; withdraw any hover preview
                    self.hover_target = None;
                    if let Some(sector) = self.debouncer.clear() {
                        out.push(WheelNotification::SectorHover {
                            wheel_id: self.id,
                            at: event.at,
                            sector,
                        });
                    }
                }
            }
            (PointerKind::Down, DragState::Dragging { .. }) => {}
            (PointerKind::Move, DragState::Dragging { last_angle }) => {
                let angle = pointer_angle(self.geometry.center, point);
                self.drag_to(last_angle, angle, event.at, &mut out);
            }
            (PointerKind::Move, DragState::Idle) | (PointerKind::Hover, DragState::Idle) => {
                self.hover_at(point, event.at);
            }
            (PointerKind::Hover, DragState::Dragging { .. }) => {}
            (PointerKind::Up, _) => self.end_drag(),
            (PointerKind::Leave, _) => {
                self.end_drag();
                self.set_hover_target(None, event.at);
            }
            (PointerKind::Click, _) => self.click_at(point, event.at, &mut out),
        }

        self.dispatch(&out);
        out
    }

    /// Advance time without input, firing a due hover preview
    pub fn tick(&mut self, now: DateTime<Utc>) -> Vec<WheelNotification> {
        let mut out = Vec::new();
        self.poll_hover(now, &mut out);
        self.dispatch(&out);
        out
    }

    fn end_drag(&mut self) {
        if let DragState::Dragging { .. } = self.state {
            debug!(wheel = %self.id, sector = self.committed.index(), "drag ended");
            self.state = DragState::Idle;
        }
    }

    fn drag_to(
        &mut self,
        last_angle: f64,
        angle: f64,
        at: DateTime<Utc>,
        out: &mut Vec<WheelNotification>,
    ) {
        let delta = signed_delta(last_angle, angle);
        self.indicator_angle = angle;
        self.state = DragState::Dragging { last_angle: angle };

        let target = angle_to_sector(angle);
        let mut current = self.committed;
        let mut steps = 0;
        while current != target && steps < SECTOR_COUNT {
            let next = if delta >= 0.0 { current.next() } else { current.prev() };
            let sample = if next == target {
                MoodSample::from_angle(angle)
            } else {
                MoodSample::for_sector(next)
            };
            out.push(WheelNotification::MoodChange {
                wheel_id: self.id,
                at,
                previous: current,
                sample,
            });
            current = next;
            steps += 1;
        }

        if self.committed != target {
            debug!(
                wheel = %self.id,
                from = self.committed.index(),
                to = target.index(),
                crossed = steps,
                "sector committed by drag"
            );
            self.committed = target;
        }
    }

    fn click_at(&mut self, point: Point, at: DateTime<Utc>, out: &mut Vec<WheelNotification>) {
        if !self.geometry.on_ring(point) {
            return;
        }
        let sector = angle_to_sector(pointer_angle(self.geometry.center, point));
        self.indicator_angle = sector_to_mid_angle(sector);
        if sector == self.committed {
            return;
        }
        debug!(wheel = %self.id, from = self.committed.index(), to = sector.index(), "sector clicked");
        out.push(WheelNotification::MoodChange {
            wheel_id: self.id,
            at,
            previous: self.committed,
            sample: MoodSample::for_sector(sector),
        });
        self.committed = sector;
    }

    fn hover_at(&mut self, point: Point, at: DateTime<Utc>) {
        let target = if self.geometry.on_ring(point) {
            Some(angle_to_sector(pointer_angle(self.geometry.center, point)))
        } else {
            None
        };
        self.set_hover_target(target, at);
    }

    fn set_hover_target(&mut self, target: Option<Sector>, at: DateTime<Utc>) {
        if target != self.hover_target {
            self.hover_target = target;
            self.debouncer.schedule(target, at);
        }
    }

    fn poll_hover(&mut self, now: DateTime<Utc>, out: &mut Vec<WheelNotification>) {
        if let Some(sector) = self.debouncer.poll(now) {
            out.push(WheelNotification::SectorHover {
                wheel_id: self.id,
                at: now,
                sector,
            });
        }
    }

    fn dispatch(&mut self, notifications: &[WheelNotification]) {
        for note in notifications {
            for subscriber in self.subscribers.iter_mut() {
                match note {
                    WheelNotification::MoodChange { sample, .. } => subscriber.on_mood_change(sample),
                    WheelNotification::SectorHover { sector, .. } => subscriber.on_sector_hover(*sector),
                }
            }
        }
    }
}
