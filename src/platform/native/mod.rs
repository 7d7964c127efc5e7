mod store;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Error;
use glutin::event::{ElementState, KeyboardInput, VirtualKeyCode};

use crate::audio::{decode_ogg, AudioChannels, DecodeError};
use crate::clock::TickClock;
use crate::constants::{
    AUDIO_DIR, AUDIO_TOGGLE_KEY, CHANNEL_COUNT, SAVE_FILE_NAME, SE_NAMES, WINDOW_SIZE,
};
use crate::engine::Engine;
use crate::input::InputEvent;
use crate::pad::NoPads;
use crate::shell::Shell;

use store::FileStore;

pub fn run<E, F>(title: &str, make_engine: F) -> Result<(), Error>
where
    E: Engine + 'static,
    F: FnOnce(Arc<AudioChannels>) -> E + 'static,
{
    use glutin::{
        event,
        event::WindowEvent,
        event_loop::{ControlFlow, EventLoop},
    };
    use std::time::Instant;

    env_logger::init();

    let store = FileStore::open(SAVE_FILE_NAME);
    let mut audio = AudioChannels::new(CHANNEL_COUNT, &store);
    for name in SE_NAMES {
        audio.install(name, load_asset(name));
    }
    let audio = Arc::new(audio);

    {
        let audio = audio.clone();
        super::audio::start_audio_playback(move |out| audio.poll(out));
    }

    let engine = make_engine(audio.clone());

    let event_loop = EventLoop::new();
    let window = glutin::window::WindowBuilder::new()
        .with_title(title)
        .with_inner_size(glutin::dpi::LogicalSize::new(WINDOW_SIZE.0, WINDOW_SIZE.1))
        .with_resizable(false)
        .build(&event_loop)?;

    // No touch hardware to probe for and no pad backend wired up here,
    // so the shell runs on keyboard alone.
    let mut shell = Shell::new(engine, TickClock::new(0.0), None, NoPads, audio, store);

    let start = Instant::now();
    let mut audio_key_held = false;
    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Poll;
        match event {
            event::Event::MainEventsCleared => window.request_redraw(),
            event::Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            } => {
                *control_flow = ControlFlow::Exit;
            }
            event::Event::WindowEvent {
                event:
                    WindowEvent::KeyboardInput {
                        input:
                            KeyboardInput {
                                virtual_keycode: Some(key),
                                state,
                                ..
                            },
                        ..
                    },
                ..
            } => {
                if let Some(code) = key_code_str(key) {
                    match state {
                        ElementState::Pressed => {
                            if code == AUDIO_TOGGLE_KEY {
                                // OS auto-repeat would toggle back and
                                // forth while the key is held
                                if !audio_key_held {
                                    audio_key_held = true;
                                    shell.toggle_audio();
                                }
                            } else {
                                shell.on_event(&InputEvent::KeyDown(code.to_string()));
                            }
                        }
                        ElementState::Released => {
                            if code == AUDIO_TOGGLE_KEY {
                                audio_key_held = false;
                            } else {
                                shell.on_event(&InputEvent::KeyUp(code.to_string()));
                            }
                        }
                    }
                }
            }
            event::Event::RedrawRequested(_) => {
                let now_ms = start.elapsed().as_secs_f64() * 1000.0;
                shell.on_frame(now_ms);
            }
            _ => {}
        }
    })
}

fn load_asset(name: &str) -> Result<Vec<i16>, DecodeError> {
    let path = PathBuf::from(AUDIO_DIR).join(format!("{}.ogg", name));
    let bytes = std::fs::read(path)?;
    decode_ogg(&bytes)
}

/// Maps glutin keycodes onto the DOM `KeyboardEvent.code` strings the
/// engine expects, so both platforms speak one key vocabulary.
fn key_code_str(vk: VirtualKeyCode) -> Option<&'static str> {
    match vk {
        VirtualKeyCode::A => Some("KeyA"),
        VirtualKeyCode::B => Some("KeyB"),
        VirtualKeyCode::C => Some("KeyC"),
        VirtualKeyCode::D => Some("KeyD"),
        VirtualKeyCode::E => Some("KeyE"),
        VirtualKeyCode::F => Some("KeyF"),
        VirtualKeyCode::G => Some("KeyG"),
        VirtualKeyCode::H => Some("KeyH"),
        VirtualKeyCode::I => Some("KeyI"),
        VirtualKeyCode::J => Some("KeyJ"),
        VirtualKeyCode::K => Some("KeyK"),
        VirtualKeyCode::L => Some("KeyL"),
        VirtualKeyCode::M => Some("KeyM"),
        VirtualKeyCode::N => Some("KeyN"),
        VirtualKeyCode::O => Some("KeyO"),
        VirtualKeyCode::P => Some("KeyP"),
        VirtualKeyCode::Q => Some("KeyQ"),
        VirtualKeyCode::R => Some("KeyR"),
        VirtualKeyCode::S => Some("KeyS"),
        VirtualKeyCode::T => Some("KeyT"),
        VirtualKeyCode::U => Some("KeyU"),
        VirtualKeyCode::V => Some("KeyV"),
        VirtualKeyCode::W => Some("KeyW"),
        VirtualKeyCode::X => Some("KeyX"),
        VirtualKeyCode::Y => Some("KeyY"),
        VirtualKeyCode::Z => Some("KeyZ"),
        VirtualKeyCode::Key1 => Some("Digit1"),
        VirtualKeyCode::Key2 => Some("Digit2"),
        VirtualKeyCode::Key3 => Some("Digit3"),
        VirtualKeyCode::Key4 => Some("Digit4"),
        VirtualKeyCode::Key5 => Some("Digit5"),
        VirtualKeyCode::Key6 => Some("Digit6"),
        VirtualKeyCode::Key7 => Some("Digit7"),
        VirtualKeyCode::Key8 => Some("Digit8"),
        VirtualKeyCode::Key9 => Some("Digit9"),
        VirtualKeyCode::Key0 => Some("Digit0"),
        VirtualKeyCode::Space => Some("Space"),
        VirtualKeyCode::Return => Some("Enter"),
        VirtualKeyCode::Escape => Some("Escape"),
        VirtualKeyCode::Back => Some("Backspace"),
        VirtualKeyCode::Left => Some("ArrowLeft"),
        VirtualKeyCode::Up => Some("ArrowUp"),
        VirtualKeyCode::Right => Some("ArrowRight"),
        VirtualKeyCode::Down => Some("ArrowDown"),
        VirtualKeyCode::LShift => Some("ShiftLeft"),
        VirtualKeyCode::RShift => Some("ShiftRight"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_codes_match_dom_names() {
        assert_eq!(key_code_str(VirtualKeyCode::Z), Some("KeyZ"));
        assert_eq!(key_code_str(VirtualKeyCode::Left), Some("ArrowLeft"));
        assert_eq!(key_code_str(VirtualKeyCode::Return), Some("Enter"));
        assert_eq!(key_code_str(VirtualKeyCode::Key1), Some("Digit1"));
        assert_eq!(key_code_str(VirtualKeyCode::F1), None);
    }
}
