use std::sync::Arc;

use crate::audio::AudioChannels;
use crate::constants::{CH_SHOT, SE_SHOT, TOUCH_CODE_SHOT};

/// The opaque engine surface the shell drives. One `update` per fixed
/// tick, one `draw` per rendered frame; input arrives through the
/// `on_*` callbacks. Repeated reports of an unchanged state are
/// allowed, the engine has to tolerate them.
pub trait Engine {
    fn update(&mut self);
    fn draw(&mut self);
    fn on_key(&mut self, code: &str, down: bool);
    fn on_touch(&mut self, num: i32, down: bool);
    fn on_joystick_axis(&mut self, axis: u8, dir: i8);
    fn on_joystick_button(&mut self, button: u8, down: bool);
}

/// Placeholder engine wired up by `main` until a real game module takes
/// its place. Echoes input edges to the log, steers a direction value
/// and fires the shot sound so every input path is audible end to end.
pub struct EchoEngine {
    audio: Arc<AudioChannels>,
    ticks: u64,
    direction: i8,
    pad_direction: i8,
    pad_button: bool,
}

impl EchoEngine {
    pub fn new(audio: Arc<AudioChannels>) -> EchoEngine {
        EchoEngine {
            audio,
            ticks: 0,
            direction: 0,
            pad_direction: 0,
            pad_button: false,
        }
    }

    fn shoot(&self) {
        self.audio.play_se(CH_SHOT, SE_SHOT);
    }
}

impl Engine for EchoEngine {
    fn update(&mut self) {
        self.ticks += 1;
        if self.ticks % 600 == 0 {
            log::debug!("{} ticks, direction {}", self.ticks, self.direction);
        }
    }

    fn draw(&mut self) {}

    fn on_key(&mut self, code: &str, down: bool) {
        log::info!("key {} {}", code, if down { "down" } else { "up" });
        match code {
            "ArrowLeft" => self.direction = if down { -1 } else { 0 },
            "ArrowRight" => self.direction = if down { 1 } else { 0 },
            "Space" | "KeyZ" if down => self.shoot(),
            _ => {}
        }
    }

    fn on_touch(&mut self, num: i32, down: bool) {
        log::info!("touch {} {}", num, if down { "down" } else { "up" });
        if num == TOUCH_CODE_SHOT {
            if down {
                self.shoot();
            }
        } else {
            self.direction = if down { num as i8 } else { 0 };
        }
    }

    // The pad state is re-reported every tick, so only changes are
    // echoed and the button level is turned into a press edge here.
    fn on_joystick_axis(&mut self, axis: u8, dir: i8) {
        if axis != 0 || dir == self.pad_direction {
            return;
        }
        log::info!("joystick axis {}", dir);
        self.pad_direction = dir;
        self.direction = dir;
    }

    fn on_joystick_button(&mut self, button: u8, down: bool) {
        if button != 0 {
            return;
        }
        if down && !self.pad_button {
            log::info!("joystick button down");
            self.shoot();
        }
        self.pad_button = down;
    }
}
