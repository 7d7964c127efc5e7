pub const TICK_RATE_HZ: f64 = 60.0;
pub const TICK_DURATION_MS: f64 = 1000.0 / TICK_RATE_HZ;
pub const MAX_CATCH_UP_TICKS: u32 = 5;

pub const CHANNEL_COUNT: usize = 3;
pub const CH_UI: u32 = 0;
pub const CH_SHOT: u32 = 0;
pub const CH_ATTACK: u32 = 1;
pub const CH_JINGLE: u32 = 2;

pub const SE_NAMES: &[&str] = &["se_ok", "se_shot", "se_explosion", "se_jingle"];
pub const SE_CONFIRM: &str = "se_ok";
pub const SE_SHOT: &str = "se_shot";

pub const AUDIO_DIR: &str = "assets/audio";
pub const BASE_VOLUME: f32 = 1.0 / 4.0;

pub const TOUCH_CODE_SHOT: i32 = 100;

pub const WINDOW_SIZE: (u32, u32) = (448, 576);
pub const AUDIO_TOGGLE_KEY: &str = "KeyM";

pub const KEY_AUDIO_ENABLED: &str = "cabinet.audioEnabled";
pub const SAVE_FILE_NAME: &str = ".cabinet-save.json";
