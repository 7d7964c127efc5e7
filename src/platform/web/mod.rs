use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use euclid::default::Point2D;
use euclid::{point2, size2};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlElement, KeyboardEvent, TouchEvent};

use crate::audio::{decode_ogg, AudioChannels, DecodeError};
use crate::clock::TickClock;
use crate::constants::{AUDIO_DIR, AUDIO_TOGGLE_KEY, CHANNEL_COUNT, SE_NAMES};
use crate::engine::Engine;
use crate::input::{InputEvent, TouchControls};
use crate::pad::{direction_from_axis, GamepadSample, PadPoller};
use crate::shell::Shell;
use crate::store::KvStore;

pub fn run<E, F>(title: &str, make_engine: F) -> Result<(), anyhow::Error>
where
    E: Engine + 'static,
    F: FnOnce(Arc<AudioChannels>) -> E + 'static,
{
    std::panic::set_hook(Box::new(console_error_panic_hook::hook));
    console_log::init_with_level(log::Level::Info).unwrap();

    let window = web_sys::window().expect("no global window");
    let document = window.document().expect("Cannot get document");
    document.set_title(title);

    let touch_supported =
        js_sys::Reflect::has(window.as_ref(), &JsValue::from_str("ontouchstart"))
            .unwrap_or(false);
    let viewport = size2(
        window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0),
        window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0),
    );

    wasm_bindgen_futures::spawn_local(async move {
        let store = LocalStore;
        let mut audio = AudioChannels::new(CHANNEL_COUNT, &store);

        // start every fetch before awaiting any, then install in order;
        // the loop below is the barrier the runtime waits behind
        let window = web_sys::window().expect("no global window");
        let pending: Vec<_> = SE_NAMES
            .iter()
            .map(|name| {
                JsFuture::from(window.fetch_with_str(&format!("{}/{}.ogg", AUDIO_DIR, name)))
            })
            .collect();
        for (name, fetch) in SE_NAMES.iter().zip(pending) {
            audio.install(name, fetch_asset(fetch).await);
        }
        let audio = Arc::new(audio);

        {
            let audio = audio.clone();
            super::audio::start_audio_playback(move |out| audio.poll(out));
        }

        let engine = make_engine(audio.clone());

        let touch = if touch_supported {
            log::info!("touch input enabled");
            Some(TouchControls::new(viewport))
        } else {
            None
        };
        let now_ms = window.performance().expect("no performance object").now();
        let mut shell = Shell::new(
            engine,
            TickClock::new(now_ms),
            touch,
            WebPads,
            audio,
            store,
        );

        let input_events = Rc::new(RefCell::new(Vec::new()));
        let touch_element = if touch_supported {
            Some(
                window
                    .document()
                    .and_then(|document| document.body())
                    .expect("Cannot get document body"),
            )
        } else {
            None
        };
        let event_stream = DomEventStream::new(touch_element, {
            let input_events = Rc::clone(&input_events);
            move |dom_event| match dom_event {
                DomEvent::KeyDown(key_event) => {
                    input_events
                        .borrow_mut()
                        .push(InputEvent::KeyDown(key_event.code()));
                }
                DomEvent::KeyUp(key_event) => {
                    input_events
                        .borrow_mut()
                        .push(InputEvent::KeyUp(key_event.code()));
                }
                DomEvent::TouchStart(touch_event) => {
                    push_touch_points(&input_events, &touch_event, |id, pos| {
                        InputEvent::TouchStart { id, pos }
                    });
                }
                DomEvent::TouchMove(touch_event) => {
                    push_touch_points(&input_events, &touch_event, |id, pos| {
                        InputEvent::TouchMove { id, pos }
                    });
                }
                DomEvent::TouchEnd(touch_event) => {
                    push_touch_ids(&input_events, &touch_event, |id| InputEvent::TouchEnd {
                        id,
                    });
                }
                DomEvent::TouchCancel(touch_event) => {
                    push_touch_ids(&input_events, &touch_event, |id| InputEvent::TouchCancel {
                        id,
                    });
                }
            }
        });

        let f: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
        let g = Rc::clone(&f);
        let mut audio_key_held = false;

        *g.borrow_mut() = Some(Closure::wrap(Box::new(move |time: f64| {
            // Keep the DOM listeners alive for the lifetime of the page
            let _ = &event_stream;

            for event in input_events.borrow_mut().drain(..) {
                match event {
                    InputEvent::KeyDown(ref code) if code.as_str() == AUDIO_TOGGLE_KEY => {
                        // key auto-repeat would toggle back and forth
                        if !audio_key_held {
                            audio_key_held = true;
                            shell.toggle_audio();
                        }
                    }
                    InputEvent::KeyUp(ref code) if code.as_str() == AUDIO_TOGGLE_KEY => {
                        audio_key_held = false;
                    }
                    event => shell.on_event(&event),
                }
            }
            shell.on_frame(time);

            web_sys::window()
                .expect("no global window")
                .request_animation_frame(f.borrow().as_ref().unwrap().as_ref().unchecked_ref())
                .expect("could not request animation frame");
        }) as Box<dyn FnMut(f64)>));

        web_sys::window()
            .expect("no global window")
            .request_animation_frame(g.borrow().as_ref().unwrap().as_ref().unchecked_ref())
            .expect("could not request animation frame");
    });

    Ok(())
}

async fn fetch_asset(fetch: JsFuture) -> Result<Vec<i16>, DecodeError> {
    let response = fetch
        .await
        .map_err(js_fetch_err)?
        .dyn_into::<web_sys::Response>()
        .map_err(js_fetch_err)?;
    if !response.ok() {
        return Err(DecodeError::Fetch(format!("status {}", response.status())));
    }
    let buffer = JsFuture::from(response.array_buffer().map_err(js_fetch_err)?)
        .await
        .map_err(js_fetch_err)?;
    let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
    decode_ogg(&bytes)
}

fn js_fetch_err(e: JsValue) -> DecodeError {
    DecodeError::Fetch(format!("{:?}", e))
}

fn push_touch_points<F: Fn(i32, Point2D<f64>) -> InputEvent>(
    out: &RefCell<Vec<InputEvent>>,
    touch_event: &TouchEvent,
    make: F,
) {
    let touches = touch_event.changed_touches();
    for i in 0..touches.length() {
        if let Some(touch) = touches.item(i) {
            out.borrow_mut().push(make(
                touch.identifier(),
                point2(touch.client_x() as f64, touch.client_y() as f64),
            ));
        }
    }
}

fn push_touch_ids<F: Fn(i32) -> InputEvent>(
    out: &RefCell<Vec<InputEvent>>,
    touch_event: &TouchEvent,
    make: F,
) {
    let touches = touch_event.changed_touches();
    for i in 0..touches.length() {
        if let Some(touch) = touches.item(i) {
            out.borrow_mut().push(make(touch.identifier()));
        }
    }
}

/// Store over window.localStorage. The browser can deny storage access;
/// that degrades to a store that reads empty and forgets on reload.
struct LocalStore;

impl KvStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        let storage = web_sys::window()?.local_storage().ok().flatten()?;
        storage.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) {
        if let Some(Ok(Some(storage))) = web_sys::window().map(|w| w.local_storage()) {
            if storage.set_item(key, value).is_err() {
                log::warn!("localStorage write failed for {}", key);
            }
        }
    }
}

/// Polls the first connected gamepad through navigator.getGamepads.
/// No pad, a disconnected slot or an API refusal all read as neutral.
struct WebPads;

impl PadPoller for WebPads {
    fn sample(&mut self) -> GamepadSample {
        let window = match web_sys::window() {
            Some(window) => window,
            None => return GamepadSample::neutral(),
        };
        let pads = match window.navigator().get_gamepads() {
            Ok(pads) => pads,
            Err(_) => return GamepadSample::neutral(),
        };
        for pad in pads.iter() {
            // disconnected slots are null entries and fail the cast
            let pad = match pad.dyn_into::<web_sys::Gamepad>() {
                Ok(pad) => pad,
                Err(_) => continue,
            };
            if !pad.connected() {
                continue;
            }
            let x_direction = pad
                .axes()
                .get(0)
                .as_f64()
                .map(direction_from_axis)
                .unwrap_or(0);
            let button_pressed = pad.buttons().iter().take(4).any(|button| {
                button
                    .dyn_into::<web_sys::GamepadButton>()
                    .map(|button| button.pressed())
                    .unwrap_or(false)
            });
            return GamepadSample {
                x_direction,
                button_pressed,
            };
        }
        GamepadSample::neutral()
    }
}

pub enum DomEvent {
    KeyDown(KeyboardEvent),
    KeyUp(KeyboardEvent),
    TouchStart(TouchEvent),
    TouchMove(TouchEvent),
    TouchEnd(TouchEvent),
    TouchCancel(TouchEvent),
}

/// Multiplexes window-level key events and element-level touch events
/// into a single callback, automatically removing and cleaning up event
/// handlers on drop.
pub struct DomEventStream {
    touch_element: Option<HtmlElement>,
    _on_key_down: Closure<dyn FnMut(KeyboardEvent)>,
    _on_key_up: Closure<dyn FnMut(KeyboardEvent)>,
    _touch: Option<TouchClosures>,
}

struct TouchClosures {
    _on_touch_start: Closure<dyn FnMut(TouchEvent)>,
    _on_touch_move: Closure<dyn FnMut(TouchEvent)>,
    _on_touch_end: Closure<dyn FnMut(TouchEvent)>,
    _on_touch_cancel: Closure<dyn FnMut(TouchEvent)>,
}

impl DomEventStream {
    /// Handled events will result in a call of the given callback until
    /// the stream is dropped. Key events are handled at the window
    /// level; touch events at the element level on `touch_element`, and
    /// not at all when it is `None`.
    pub fn new(
        touch_element: Option<HtmlElement>,
        callback: impl Fn(DomEvent) + 'static,
    ) -> DomEventStream {
        let callback = Rc::new(callback);

        let on_key_down = Closure::wrap(Box::new({
            let callback = Rc::clone(&callback);
            move |keyboard_event| {
                callback(DomEvent::KeyDown(keyboard_event));
            }
        }) as Box<dyn FnMut(KeyboardEvent)>);

        let on_key_up = Closure::wrap(Box::new({
            let callback = Rc::clone(&callback);
            move |keyboard_event| {
                callback(DomEvent::KeyUp(keyboard_event));
            }
        }) as Box<dyn FnMut(KeyboardEvent)>);

        let window = web_sys::window().unwrap();
        window.set_onkeydown(Some(on_key_down.as_ref().unchecked_ref()));
        window.set_onkeyup(Some(on_key_up.as_ref().unchecked_ref()));

        let touch = touch_element.as_ref().map(|element| {
            let on_touch_start = Closure::wrap(Box::new({
                let callback = Rc::clone(&callback);
                move |touch_event| {
                    callback(DomEvent::TouchStart(touch_event));
                }
            }) as Box<dyn FnMut(TouchEvent)>);

            let on_touch_move = Closure::wrap(Box::new({
                let callback = Rc::clone(&callback);
                move |touch_event: TouchEvent| {
                    // scrolling would hijack the gesture
                    touch_event.prevent_default();
                    callback(DomEvent::TouchMove(touch_event));
                }
            }) as Box<dyn FnMut(TouchEvent)>);

            let on_touch_end = Closure::wrap(Box::new({
                let callback = Rc::clone(&callback);
                move |touch_event| {
                    callback(DomEvent::TouchEnd(touch_event));
                }
            }) as Box<dyn FnMut(TouchEvent)>);

            let on_touch_cancel = Closure::wrap(Box::new({
                let callback = Rc::clone(&callback);
                move |touch_event| {
                    callback(DomEvent::TouchCancel(touch_event));
                }
            }) as Box<dyn FnMut(TouchEvent)>);

            element.set_ontouchstart(Some(on_touch_start.as_ref().unchecked_ref()));
            element.set_ontouchmove(Some(on_touch_move.as_ref().unchecked_ref()));
            element.set_ontouchend(Some(on_touch_end.as_ref().unchecked_ref()));
            element.set_ontouchcancel(Some(on_touch_cancel.as_ref().unchecked_ref()));

            TouchClosures {
                _on_touch_start: on_touch_start,
                _on_touch_move: on_touch_move,
                _on_touch_end: on_touch_end,
                _on_touch_cancel: on_touch_cancel,
            }
        });

        DomEventStream {
            touch_element,
            _on_key_down: on_key_down,
            _on_key_up: on_key_up,
            _touch: touch,
        }
    }
}

impl Drop for DomEventStream {
    fn drop(&mut self) {
        let window = web_sys::window().unwrap();
        window.set_onkeydown(None);
        window.set_onkeyup(None);
        if let Some(element) = self.touch_element.as_ref() {
            element.set_ontouchstart(None);
            element.set_ontouchmove(None);
            element.set_ontouchend(None);
            element.set_ontouchcancel(None);
        }
    }
}
