use std::sync::Arc;

use crate::audio::AudioChannels;
use crate::clock::TickClock;
use crate::engine::Engine;
use crate::input::{InputEvent, Keyboard, TouchControls};
use crate::pad::PadPoller;
use crate::store::KvStore;

/// Runtime context tying the engine to the platform: the fixed-timestep
/// clock, the input components and the audio channels. The platform
/// driver feeds it raw events and one `on_frame` per display refresh;
/// everything else flows out through the engine callbacks.
pub struct Shell<E, P, S> {
    engine: E,
    clock: TickClock,
    keyboard: Keyboard,
    touch: Option<TouchControls>,
    pads: P,
    audio: Arc<AudioChannels>,
    store: S,
}

impl<E: Engine, P: PadPoller, S: KvStore> Shell<E, P, S> {
    /// `touch` is `None` on platforms without touch support; touch
    /// events are then ignored wholesale.
    pub fn new(
        engine: E,
        clock: TickClock,
        touch: Option<TouchControls>,
        pads: P,
        audio: Arc<AudioChannels>,
        store: S,
    ) -> Shell<E, P, S> {
        Shell {
            engine,
            clock,
            keyboard: Keyboard::new(),
            touch,
            pads,
            audio,
            store,
        }
    }

    /// One display refresh callback. Runs every due tick, pushing the
    /// current pad sample into the engine before each `update`, then
    /// renders once iff any tick ran. Re-arming the next callback is
    /// the caller's job.
    pub fn on_frame(&mut self, now_ms: f64) {
        let ticks = self.clock.ticks_due(now_ms);
        for _ in 0..ticks {
            let sample = self.pads.sample();
            self.engine.on_joystick_axis(0, sample.x_direction);
            self.engine.on_joystick_button(0, sample.button_pressed);
            self.engine.update();
        }
        if ticks > 0 {
            self.engine.draw();
        }
    }

    pub fn on_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyDown(code) => {
                if self.keyboard.press(code) {
                    self.engine.on_key(code, true);
                }
            }
            InputEvent::KeyUp(code) => {
                self.keyboard.release(code);
                self.engine.on_key(code, false);
            }
            _ => {
                if let Some(touch) = self.touch.as_mut() {
                    for (num, down) in touch.on_event(event) {
                        self.engine.on_touch(num, down);
                    }
                }
            }
        }
    }

    pub fn toggle_audio(&mut self) {
        let enabled = self.audio.toggle_enabled(&mut self.store);
        log::info!("audio {}", if enabled { "enabled" } else { "disabled" });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{CHANNEL_COUNT, KEY_AUDIO_ENABLED, TOUCH_CODE_SHOT};
    use crate::pad::{GamepadSample, NoPads};
    use crate::store::MemStore;
    use euclid::{point2, size2};

    #[derive(Debug, PartialEq, Clone)]
    enum Call {
        Update,
        Draw,
        Key(String, bool),
        Touch(i32, bool),
        Axis(u8, i8),
        Button(u8, bool),
    }

    #[derive(Default)]
    struct RecordingEngine {
        calls: Vec<Call>,
    }

    impl Engine for RecordingEngine {
        fn update(&mut self) {
            self.calls.push(Call::Update);
        }

        fn draw(&mut self) {
            self.calls.push(Call::Draw);
        }

        fn on_key(&mut self, code: &str, down: bool) {
            self.calls.push(Call::Key(code.to_string(), down));
        }

        fn on_touch(&mut self, num: i32, down: bool) {
            self.calls.push(Call::Touch(num, down));
        }

        fn on_joystick_axis(&mut self, axis: u8, dir: i8) {
            self.calls.push(Call::Axis(axis, dir));
        }

        fn on_joystick_button(&mut self, button: u8, down: bool) {
            self.calls.push(Call::Button(button, down));
        }
    }

    struct ScriptedPads {
        samples: Vec<GamepadSample>,
    }

    impl PadPoller for ScriptedPads {
        fn sample(&mut self) -> GamepadSample {
            if self.samples.is_empty() {
                GamepadSample::neutral()
            } else {
                self.samples.remove(0)
            }
        }
    }

    fn shell(with_touch: bool) -> Shell<RecordingEngine, NoPads, MemStore> {
        let store = MemStore::new();
        let audio = Arc::new(AudioChannels::new(CHANNEL_COUNT, &store));
        let touch = if with_touch {
            Some(TouchControls::new(size2(400.0, 600.0)))
        } else {
            None
        };
        Shell::new(
            RecordingEngine::default(),
            TickClock::new(0.0),
            touch,
            NoPads,
            audio,
            store,
        )
    }

    #[test]
    fn test_frame_runs_due_ticks_then_renders_once() {
        let mut shell = shell(false);
        shell.on_frame(33.4);
        assert_eq!(
            shell.engine.calls,
            vec![
                Call::Axis(0, 0),
                Call::Button(0, false),
                Call::Update,
                Call::Axis(0, 0),
                Call::Button(0, false),
                Call::Update,
                Call::Draw,
            ]
        );
    }

    #[test]
    fn test_early_frame_neither_ticks_nor_renders() {
        let mut shell = shell(false);
        shell.on_frame(5.0);
        assert!(shell.engine.calls.is_empty());
    }

    #[test]
    fn test_late_frame_clamps_catch_up() {
        let mut shell = shell(false);
        shell.on_frame(1000.0);
        let updates = shell
            .engine
            .calls
            .iter()
            .filter(|c| **c == Call::Update)
            .count();
        let draws = shell
            .engine
            .calls
            .iter()
            .filter(|c| **c == Call::Draw)
            .count();
        assert_eq!(updates, 5);
        assert_eq!(draws, 1);
        shell.engine.calls.clear();
        shell.on_frame(1016.7);
        let updates = shell
            .engine
            .calls
            .iter()
            .filter(|c| **c == Call::Update)
            .count();
        assert_eq!(updates, 1);
    }

    #[test]
    fn test_pad_sample_reaches_engine_before_update() {
        let store = MemStore::new();
        let audio = Arc::new(AudioChannels::new(CHANNEL_COUNT, &store));
        let pads = ScriptedPads {
            samples: vec![GamepadSample {
                x_direction: 1,
                button_pressed: true,
            }],
        };
        let mut shell = Shell::new(
            RecordingEngine::default(),
            TickClock::new(0.0),
            None,
            pads,
            audio,
            store,
        );
        shell.on_frame(16.7);
        assert_eq!(
            shell.engine.calls,
            vec![
                Call::Axis(0, 1),
                Call::Button(0, true),
                Call::Update,
                Call::Draw,
            ]
        );
    }

    #[test]
    fn test_key_auto_repeat_collapses_to_one_edge() {
        let mut shell = shell(false);
        shell.on_event(&InputEvent::KeyDown("KeyZ".to_string()));
        shell.on_event(&InputEvent::KeyDown("KeyZ".to_string()));
        shell.on_event(&InputEvent::KeyDown("KeyZ".to_string()));
        shell.on_event(&InputEvent::KeyUp("KeyZ".to_string()));
        shell.on_event(&InputEvent::KeyDown("KeyZ".to_string()));
        assert_eq!(
            shell.engine.calls,
            vec![
                Call::Key("KeyZ".to_string(), true),
                Call::Key("KeyZ".to_string(), false),
                Call::Key("KeyZ".to_string(), true),
            ]
        );
    }

    #[test]
    fn test_touch_transitions_reach_engine() {
        let mut shell = shell(true);
        shell.on_event(&InputEvent::TouchStart {
            id: 1,
            pos: point2(20.0, 550.0),
        });
        shell.on_event(&InputEvent::TouchEnd { id: 1 });
        shell.on_event(&InputEvent::TouchStart {
            id: 2,
            pos: point2(390.0, 550.0),
        });
        assert_eq!(
            shell.engine.calls,
            vec![
                Call::Touch(-1, true),
                Call::Touch(0, false),
                Call::Touch(TOUCH_CODE_SHOT, true),
            ]
        );
    }

    #[test]
    fn test_touch_without_capability_is_inert() {
        let mut shell = shell(false);
        shell.on_event(&InputEvent::TouchStart {
            id: 1,
            pos: point2(20.0, 550.0),
        });
        shell.on_event(&InputEvent::TouchMove {
            id: 1,
            pos: point2(30.0, 550.0),
        });
        shell.on_event(&InputEvent::TouchEnd { id: 1 });
        assert!(shell.engine.calls.is_empty());
    }

    #[test]
    fn test_toggle_audio_persists_to_store() {
        let mut shell = shell(false);
        shell.toggle_audio();
        assert_eq!(
            shell.store.get(KEY_AUDIO_ENABLED),
            Some("0".to_string())
        );
        shell.toggle_audio();
        assert_eq!(
            shell.store.get(KEY_AUDIO_ENABLED),
            Some("1".to_string())
        );
    }
}
