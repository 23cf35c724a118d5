/// Gamepad input tracker using gilrs.
///
/// Feeds the same router as the keyboard: every fresh left/right press
/// becomes one move request. The D-pad and left stick always steer;
/// extra buttons for left, right and quit come from `[gamepad]` in
/// config.toml (defaults: L1, R1, Select).

use std::collections::HashSet;

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;
use crate::sim::board::MoveDir;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

/// Inputs the pad can report. The stick counts as two buttons, one per
/// side of the deadzone.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
enum Btn {
    DPadLeft,
    DPadRight,
    StickLeft,
    StickRight,
    A,
    B,
    X,
    Y,
    L1,
    R1,
    Start,
    Select,
}

/// Names accepted in `[gamepad]` lists (case-insensitive).
const BUTTON_NAMES: [(&str, Btn); 11] = [
    ("A", Btn::A),
    ("B", Btn::B),
    ("X", Btn::X),
    ("Y", Btn::Y),
    ("L1", Btn::L1),
    ("LB", Btn::L1),
    ("R1", Btn::R1),
    ("RB", Btn::R1),
    ("Start", Btn::Start),
    ("Select", Btn::Select),
    ("Back", Btn::Select),
];

fn button_list(names: &[String], fallback: Btn) -> Vec<Btn> {
    let btns: Vec<Btn> = names
        .iter()
        .filter_map(|name| {
            BUTTON_NAMES
                .iter()
                .find(|(known, _)| known.eq_ignore_ascii_case(name))
                .map(|&(_, btn)| btn)
        })
        .collect();
    if btns.is_empty() { vec![fallback] } else { btns }
}

#[cfg(feature = "gamepad")]
fn from_gilrs(btn: Button) -> Option<Btn> {
    Some(match btn {
        Button::DPadLeft => Btn::DPadLeft,
        Button::DPadRight => Btn::DPadRight,
        Button::South => Btn::A,
        Button::East => Btn::B,
        Button::West => Btn::X,
        Button::North => Btn::Y,
        Button::LeftTrigger => Btn::L1,
        Button::RightTrigger => Btn::R1,
        Button::Start => Btn::Start,
        Button::Select => Btn::Select,
        _ => return None,
    })
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    held: HashSet<Btn>,
    /// Went down since the last `update()`.
    fresh: HashSet<Btn>,
    stick_x: f32,

    left: Vec<Btn>,
    right: Vec<Btn>,
    quit: Vec<Btn>,

    pub connected: bool,
}

impl GamepadState {
    /// Open the gamepad backend unless disabled in config. Button lists
    /// with no known names fall back to L1 / R1 / Select.
    pub fn new(cfg: &GamepadConfig) -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs, connected) = if cfg.enabled {
            match Gilrs::new() {
                Ok(g) => {
                    let has_pad = g.gamepads().next().is_some();
                    (Some(g), has_pad)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "gamepad backend unavailable");
                    (None, false)
                }
            }
        } else {
            (None, false)
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs,
            held: HashSet::new(),
            fresh: HashSet::new(),
            stick_x: 0.0,
            left: button_list(&cfg.left, Btn::L1),
            right: button_list(&cfg.right, Btn::R1),
            quit: button_list(&cfg.quit, Btn::Select),
            connected,
        }
    }

    /// Start a new frame: forget last frame's presses, then poll.
    pub fn update(&mut self) {
        self.fresh.clear();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    if let Some(b) = from_gilrs(btn) {
                        self.press(b);
                    }
                }
                EventType::ButtonReleased(btn, _) => {
                    if let Some(b) = from_gilrs(btn) {
                        self.release(b);
                    }
                }
                EventType::AxisChanged(Axis::LeftStickX, value, _) => {
                    self.stick_x = value;
                }
                EventType::Connected => {
                    self.connected = true;
                    tracing::info!("gamepad connected");
                }
                EventType::Disconnected => {
                    self.connected = false;
                    self.held.clear();
                    self.stick_x = 0.0;
                    tracing::info!("gamepad disconnected");
                }
                _ => {}
            }
        }

        self.update_stick();
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn press(&mut self, btn: Btn) {
        if self.held.insert(btn) {
            self.fresh.insert(btn);
        }
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release(&mut self, btn: Btn) {
        self.held.remove(&btn);
    }

    /// Crossing the deadzone is a press; coming back inside is a release.
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn update_stick(&mut self) {
        for (btn, active) in [
            (Btn::StickLeft, self.stick_x < -STICK_DEADZONE),
            (Btn::StickRight, self.stick_x > STICK_DEADZONE),
        ] {
            if active { self.press(btn) } else { self.release(btn) }
        }
    }

    fn any_fresh(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|b| self.fresh.contains(b))
    }

    /// Move requests from this frame's fresh presses.
    pub fn moves(&self) -> Vec<MoveDir> {
        let mut out = Vec::with_capacity(2);
        if self.any_fresh(&[Btn::DPadLeft, Btn::StickLeft]) || self.any_fresh(&self.left) {
            out.push(MoveDir::Left);
        }
        if self.any_fresh(&[Btn::DPadRight, Btn::StickRight]) || self.any_fresh(&self.right) {
            out.push(MoveDir::Right);
        }
        out
    }

    pub fn quit_pressed(&self) -> bool {
        self.any_fresh(&self.quit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disabled() -> GamepadConfig {
        GamepadConfig {
            enabled: false,
            left: vec!["L1".into()],
            right: vec!["R1".into()],
            quit: vec!["Select".into()],
        }
    }

    #[test]
    fn button_names_parse() {
        let names = |list: &[&str]| list.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert_eq!(button_list(&names(&["lb", "Back"]), Btn::A), vec![Btn::L1, Btn::Select]);
        assert_eq!(button_list(&names(&["Turbo"]), Btn::R1), vec![Btn::R1]);
    }

    #[test]
    fn mapped_buttons_produce_moves_once() {
        let mut pad = GamepadState::new(&disabled());
        pad.press(Btn::L1);
        assert_eq!(pad.moves(), vec![MoveDir::Left]);
        pad.update();
        // Still held, but no longer a fresh press.
        pad.press(Btn::L1);
        assert!(pad.moves().is_empty());
        pad.release(Btn::L1);
        pad.press(Btn::L1);
        assert_eq!(pad.moves(), vec![MoveDir::Left]);
    }

    #[test]
    fn stick_crossing_deadzone_is_an_edge() {
        let mut pad = GamepadState::new(&disabled());
        pad.stick_x = 0.9;
        pad.update_stick();
        assert_eq!(pad.moves(), vec![MoveDir::Right]);
        pad.update();
        pad.update_stick();
        assert!(pad.moves().is_empty());
        pad.stick_x = 0.1;
        pad.update_stick();
        assert!(!pad.held.contains(&Btn::StickRight));
    }

    #[test]
    fn config_overrides_quit_button() {
        let mut cfg = disabled();
        cfg.quit = vec!["Start".into(), "bogus".into()];
        let mut pad = GamepadState::new(&cfg);
        pad.press(Btn::Select);
        assert!(!pad.quit_pressed());
        pad.press(Btn::Start);
        assert!(pad.quit_pressed());
    }
}
