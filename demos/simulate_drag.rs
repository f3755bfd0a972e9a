//! Drag the indicator of a mood wheel half way around and print each mood change

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{Duration, Utc};
use mood_harmony::geometry::point_on_wheel;
use mood_harmony::{MoodSample, MoodWheel, PointerEvent, PointerKind, WheelSubscriber};

struct Printer {
    seen: Rc<RefCell<Vec<MoodSample>>>,
}

impl WheelSubscriber for Printer {
    fn on_mood_change(&mut self, sample: &MoodSample) {
        println!(
            "mood -> {} ({:.1} deg)",
            sample.sector.label(),
            sample.angle_degrees
        );
        self.seen.borrow_mut().push(*sample);
    }
}

fn main() {
    let mut wheel = MoodWheel::default();
    let seen = Rc::new(RefCell::new(Vec::new()));
    wheel.subscribe(Box::new(Printer { seen: seen.clone() }));

    let geometry = *wheel.geometry();
    let start = Utc::now();
    let at = |step: i64| start + Duration::milliseconds(step * 16);
    let event = |kind, degrees: f64, step| {
        let p = point_on_wheel(geometry.center, geometry.indicator_radius, degrees.to_radians());
        PointerEvent { kind, x: p.x, y: p.y, at: at(step) }
    };

    let handle = wheel.indicator_position();
    wheel.handle(&PointerEvent {
        kind: PointerKind::Down,
        x: handle.x,
        y: handle.y,
        at: at(0),
    });
    for (step, degrees) in (10..=200).step_by(10).enumerate() {
        wheel.handle(&event(PointerKind::Move, degrees as f64, step as i64 + 1));
    }
    wheel.handle(&event(PointerKind::Up, 200.0, 30));

    println!(
        "committed {} after {} notifications",
        wheel.committed().label(),
        seen.borrow().len()
    );
}
