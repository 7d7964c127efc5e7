/// One poll of whatever physical gamepad is connected, already reduced to
/// the discrete directions and single fire button the engine understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GamepadSample {
    pub x_direction: i8,
    pub button_pressed: bool,
}

impl Default for GamepadSample {
    fn default() -> Self {
        Self { x_direction: 0, button_pressed: false }
    }
}

impl GamepadSample {
    pub fn neutral() -> Self {
        Self::default()
    }
}

pub trait PadPoller {
    fn sample(&mut self) -> GamepadSample;
}

/// Poller for platforms without gamepad support. Always neutral, so engine
/// input degrades to keyboard and touch without special cases upstream.
pub struct NoPads;

impl PadPoller for NoPads {
    fn sample(&mut self) -> GamepadSample {
        GamepadSample::neutral()
    }
}

/// Discretizes an analog stick axis. Half deflection either way counts as a
/// direction, anything inside that is the dead zone.
pub fn direction_from_axis(value: f64) -> i8 {
    if value <= -0.5 {
        -1
    } else if value >= 0.5 {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_thresholds() {
        assert_eq!(direction_from_axis(-1.0), -1);
        assert_eq!(direction_from_axis(-0.5), -1);
        assert_eq!(direction_from_axis(-0.49), 0);
        assert_eq!(direction_from_axis(0.0), 0);
        assert_eq!(direction_from_axis(0.49), 0);
        assert_eq!(direction_from_axis(0.5), 1);
        assert_eq!(direction_from_axis(1.0), 1);
    }

    #[test]
    fn test_no_pads_is_neutral() {
        let mut pads = NoPads;
        assert_eq!(pads.sample(), GamepadSample::neutral());
    }
}
