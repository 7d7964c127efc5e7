use std::collections::HashSet;

use euclid::default::{Point2D, Rect, Size2D};
use euclid::rect;

use crate::constants::TOUCH_CODE_SHOT;

pub type TouchId = i32;

/// Raw input from the platform layer. Key codes use the DOM
/// `KeyboardEvent.code` vocabulary ("KeyZ", "ArrowLeft", ...) on every
/// target; the native driver translates its own key events into it.
#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    KeyDown(String),
    KeyUp(String),
    TouchStart { id: TouchId, pos: Point2D<f64> },
    TouchMove { id: TouchId, pos: Point2D<f64> },
    TouchEnd { id: TouchId },
    TouchCancel { id: TouchId },
}

/// Tracks held keys so OS auto-repeat collapses into a single edge.
#[derive(Default)]
pub struct Keyboard {
    held: HashSet<String>,
}

impl Keyboard {
    pub fn new() -> Keyboard {
        Keyboard::default()
    }

    /// Returns true only on the first press of a held key.
    pub fn press(&mut self, code: &str) -> bool {
        self.held.insert(code.to_string())
    }

    pub fn release(&mut self, code: &str) {
        self.held.remove(code);
    }
}

struct ActiveStick {
    id: TouchId,
    last_direction: i32,
}

/// Virtual horizontal stick. The first touch landing inside the area
/// owns the stick until it ends; its x position maps to -1/0/1 with a
/// dead zone of a sixth of the area width either side of center.
pub struct TouchStick {
    area: Rect<f64>,
    dead_zone_half_width: f64,
    active: Option<ActiveStick>,
}

impl TouchStick {
    pub fn new(area: Rect<f64>) -> TouchStick {
        TouchStick {
            area,
            dead_zone_half_width: area.size.width / 6.0,
            active: None,
        }
    }

    /// Direction for an x coordinate, clamped to the stick area first
    /// so a latched touch dragged outside keeps steering.
    pub fn direction_at(&self, x: f64) -> i32 {
        let clamped = x.max(self.area.min_x()).min(self.area.max_x());
        let offset = clamped - self.area.min_x();
        let center = self.area.size.width / 2.0;
        if offset <= center - self.dead_zone_half_width {
            -1
        } else if offset >= center + self.dead_zone_half_width {
            1
        } else {
            0
        }
    }

    /// Returns true when the touch was claimed.
    pub fn touch_start(&mut self, id: TouchId, pos: Point2D<f64>, out: &mut Vec<(i32, bool)>) -> bool {
        if self.active.is_some() || !self.area.contains(pos) {
            return false;
        }
        let direction = self.direction_at(pos.x);
        if direction != 0 {
            out.push((direction, true));
        }
        self.active = Some(ActiveStick {
            id,
            last_direction: direction,
        });
        true
    }

    pub fn touch_move(&mut self, id: TouchId, pos: Point2D<f64>, out: &mut Vec<(i32, bool)>) {
        let direction = self.direction_at(pos.x);
        if let Some(active) = self.active.as_mut() {
            if active.id != id || active.last_direction == direction {
                return;
            }
            active.last_direction = direction;
            if direction == 0 {
                out.push((0, false));
            } else {
                out.push((direction, true));
            }
        }
    }

    /// Returns true when the ending touch owned the stick. Always
    /// emits a single centering event in that case, even if the touch
    /// never left the dead zone.
    pub fn touch_end(&mut self, id: TouchId, out: &mut Vec<(i32, bool)>) -> bool {
        match self.active {
            Some(ref active) if active.id == id => {
                self.active = None;
                out.push((0, false));
                true
            }
            _ => false,
        }
    }
}

struct ActiveButton {
    id: TouchId,
    inside: bool,
}

/// Level-triggered on-screen button reporting a single action code.
pub struct TouchButton {
    area: Rect<f64>,
    code: i32,
    active: Option<ActiveButton>,
}

impl TouchButton {
    pub fn new(area: Rect<f64>, code: i32) -> TouchButton {
        TouchButton {
            area,
            code,
            active: None,
        }
    }

    pub fn touch_start(&mut self, id: TouchId, pos: Point2D<f64>, out: &mut Vec<(i32, bool)>) -> bool {
        if self.active.is_some() || !self.area.contains(pos) {
            return false;
        }
        self.active = Some(ActiveButton { id, inside: true });
        out.push((self.code, true));
        true
    }

    pub fn touch_move(&mut self, id: TouchId, pos: Point2D<f64>, out: &mut Vec<(i32, bool)>) {
        let inside = self.area.contains(pos);
        if let Some(active) = self.active.as_mut() {
            if active.id != id {
                return;
            }
            if active.inside && !inside {
                out.push((self.code, false));
            }
            active.inside = inside;
        }
    }

    /// The owning touch ending always releases, even if it already
    /// released by leaving the area; the end event tracks the touch,
    /// not the position.
    pub fn touch_end(&mut self, id: TouchId, out: &mut Vec<(i32, bool)>) -> bool {
        match self.active {
            Some(ref active) if active.id == id => {
                self.active = None;
                out.push((self.code, false));
                true
            }
            _ => false,
        }
    }
}

/// Touch overlay for the whole viewport: a steering strip on the lower
/// left and a shot button in the lower right corner.
pub struct TouchControls {
    stick: TouchStick,
    buttons: Vec<TouchButton>,
}

impl TouchControls {
    pub fn new(viewport: Size2D<f64>) -> TouchControls {
        let strip_height = viewport.height / 3.0;
        let strip_top = viewport.height - strip_height;
        let stick = TouchStick::new(rect(0.0, strip_top, viewport.width / 2.0, strip_height));
        let shot = TouchButton::new(
            rect(
                viewport.width * 0.75,
                strip_top,
                viewport.width * 0.25,
                strip_height,
            ),
            TOUCH_CODE_SHOT,
        );
        TouchControls {
            stick,
            buttons: vec![shot],
        }
    }

    /// Feeds one raw event through every control and collects the
    /// (code, pressed) transitions it produced.
    pub fn on_event(&mut self, event: &InputEvent) -> Vec<(i32, bool)> {
        let mut out = Vec::new();
        match *event {
            InputEvent::TouchStart { id, pos } => {
                if !self.stick.touch_start(id, pos, &mut out) {
                    for button in &mut self.buttons {
                        if button.touch_start(id, pos, &mut out) {
                            break;
                        }
                    }
                }
            }
            InputEvent::TouchMove { id, pos } => {
                self.stick.touch_move(id, pos, &mut out);
                for button in &mut self.buttons {
                    button.touch_move(id, pos, &mut out);
                }
            }
            InputEvent::TouchEnd { id } | InputEvent::TouchCancel { id } => {
                if !self.stick.touch_end(id, &mut out) {
                    for button in &mut self.buttons {
                        if button.touch_end(id, &mut out) {
                            break;
                        }
                    }
                }
            }
            InputEvent::KeyDown(_) | InputEvent::KeyUp(_) => {}
        }
        out
    }
}
