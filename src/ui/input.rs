/// Keyboard input.
///
///   - `InputState` drains pending terminal events once per frame.
///   - `KeyBindings` maps key codes to the two moves plus quit.
///   - `InputRouter` gates accepted moves: one key per open window,
///     anything else arriving meanwhile is dropped, never queued.
///
/// Terminal auto-repeat arrives as Press/Repeat events, so holding a key
/// produces a stream of discrete presses. Release events are ignored.

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::config::KeyConfig;
use crate::sim::board::MoveDir;

// ── Raw event drain ──

pub struct InputState {
    /// Key codes pressed (or auto-repeated) during the last drain, in order.
    presses: Vec<KeyCode>,

    /// Raw key events collected during drain, for modifier checks.
    raw_events: Vec<KeyEvent>,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
        }
    }

    /// Drain all pending terminal events without blocking.
    /// Call this once per frame, before routing.
    pub fn drain_events(&mut self) {
        self.presses.clear();
        self.raw_events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.push(key);
            }
        }
    }

    fn push(&mut self, key: KeyEvent) {
        self.raw_events.push(key);
        if key.kind != KeyEventKind::Release {
            self.presses.push(key.code);
        }
    }

    pub fn presses(&self) -> &[KeyCode] {
        &self.presses
    }

    /// Was any of these keys pressed this frame?
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        self.presses.iter().any(|c| codes.contains(c))
    }

    /// Check if any raw event this frame has Ctrl+C
    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}

// ── Bindings ──

pub struct KeyBindings {
    left: Vec<KeyCode>,
    right: Vec<KeyCode>,
    quit: Vec<KeyCode>,
}

/// Parse a key name from config. Single characters are taken literally
/// (case-sensitive); named keys are case-insensitive.
pub fn key_from_name(name: &str) -> Option<KeyCode> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(KeyCode::Char(c));
    }
    let lower = name.to_ascii_lowercase();
    match lower.as_str() {
        "left" => Some(KeyCode::Left),
        "right" => Some(KeyCode::Right),
        "up" => Some(KeyCode::Up),
        "down" => Some(KeyCode::Down),
        "esc" | "escape" => Some(KeyCode::Esc),
        "enter" | "return" => Some(KeyCode::Enter),
        "space" => Some(KeyCode::Char(' ')),
        "tab" => Some(KeyCode::Tab),
        "backspace" => Some(KeyCode::Backspace),
        _ => lower
            .strip_prefix('f')
            .and_then(|n| n.parse::<u8>().ok())
            .filter(|n| (1..=12).contains(n))
            .map(KeyCode::F),
    }
}

impl KeyBindings {
    /// Unknown names are skipped; a list that ends up empty falls back to
    /// the built-in keys for that action.
    pub fn from_config(cfg: &KeyConfig) -> Self {
        fn parse_list(names: &[String], fallback: &[KeyCode]) -> Vec<KeyCode> {
            let keys: Vec<KeyCode> = names.iter().filter_map(|s| key_from_name(s)).collect();
            if keys.is_empty() { fallback.to_vec() } else { keys }
        }
        KeyBindings {
            left: parse_list(&cfg.left, &[KeyCode::Left]),
            right: parse_list(&cfg.right, &[KeyCode::Right]),
            quit: parse_list(&cfg.quit, &[KeyCode::Esc]),
        }
    }

    pub fn direction(&self, code: KeyCode) -> Option<MoveDir> {
        if self.left.contains(&code) {
            Some(MoveDir::Left)
        } else if self.right.contains(&code) {
            Some(MoveDir::Right)
        } else {
            None
        }
    }

    pub fn quit_keys(&self) -> &[KeyCode] {
        &self.quit
    }
}

// ── Router ──

/// What the router did with one key press.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Routed {
    /// Accepted; apply this move to the board.
    Move(MoveDir),
    /// Accepted, but not a move key.
    Ignored,
    /// Dropped: input was closed or another key was already in flight.
    Slipped,
}

#[derive(Debug, Default)]
pub struct InputRouter {
    busy: bool,
    slipped: u64,
}

impl InputRouter {
    pub fn new() -> Self {
        InputRouter::default()
    }

    /// Offer one press (already mapped to a direction, if any).
    /// `allowed` is whether the board currently takes moves.
    pub fn offer(&mut self, dir: Option<MoveDir>, allowed: bool) -> Routed {
        if !allowed || self.is_busy() {
            self.slipped += 1;
            return Routed::Slipped;
        }
        self.busy = true;
        match dir {
            Some(d) => Routed::Move(d),
            None => Routed::Ignored,
        }
    }

    /// The accepted key has been fully processed; reopen the gate.
    pub fn finish(&mut self) {
        self.busy = false;
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Presses dropped so far.
    pub fn slipped(&self) -> u64 {
        self.slipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    // ── InputState ──

    #[test]
    fn releases_are_not_presses() {
        let mut s = InputState::new();
        s.push(press(KeyCode::Left));
        s.push(KeyEvent::new_with_kind(KeyCode::Left, KeyModifiers::NONE, KeyEventKind::Release));
        s.push(KeyEvent::new_with_kind(KeyCode::Right, KeyModifiers::NONE, KeyEventKind::Repeat));
        assert_eq!(s.presses(), &[KeyCode::Left, KeyCode::Right]);
        assert!(s.any_pressed(&[KeyCode::Right, KeyCode::Esc]));
        assert!(!s.any_pressed(&[KeyCode::Esc]));
    }

    #[test]
    fn ctrl_c_detected() {
        let mut s = InputState::new();
        s.push(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(s.ctrl_c_pressed());
    }

    // ── Bindings ──

    #[test]
    fn key_names_parse() {
        assert_eq!(key_from_name("Left"), Some(KeyCode::Left));
        assert_eq!(key_from_name("ESC"), Some(KeyCode::Esc));
        assert_eq!(key_from_name("a"), Some(KeyCode::Char('a')));
        assert_eq!(key_from_name("A"), Some(KeyCode::Char('A')));
        assert_eq!(key_from_name("space"), Some(KeyCode::Char(' ')));
        assert_eq!(key_from_name("F5"), Some(KeyCode::F(5)));
        assert_eq!(key_from_name("F13"), None);
        assert_eq!(key_from_name("Hyper"), None);
    }

    #[test]
    fn bindings_map_directions() {
        let cfg = KeyConfig {
            left: vec!["Left".into(), "a".into()],
            right: vec!["Right".into(), "nonsense".into()],
            quit: vec![],
        };
        let b = KeyBindings::from_config(&cfg);
        assert_eq!(b.direction(KeyCode::Char('a')), Some(MoveDir::Left));
        assert_eq!(b.direction(KeyCode::Right), Some(MoveDir::Right));
        assert_eq!(b.direction(KeyCode::Up), None);
        // Empty quit list falls back to Esc.
        assert_eq!(b.quit_keys(), &[KeyCode::Esc]);
    }

    // ── Router ──

    #[test]
    fn first_press_accepted_rest_slip_until_finish() {
        let mut r = InputRouter::new();
        assert_eq!(r.offer(Some(MoveDir::Left), true), Routed::Move(MoveDir::Left));
        assert!(r.is_busy());
        assert_eq!(r.offer(Some(MoveDir::Right), true), Routed::Slipped);
        assert_eq!(r.offer(Some(MoveDir::Right), true), Routed::Slipped);
        assert_eq!(r.slipped(), 2);

        r.finish();
        assert_eq!(r.offer(Some(MoveDir::Right), true), Routed::Move(MoveDir::Right));
    }

    #[test]
    fn closed_gate_drops_everything() {
        let mut r = InputRouter::new();
        assert_eq!(r.offer(Some(MoveDir::Left), false), Routed::Slipped);
        assert!(!r.is_busy());
        assert_eq!(r.slipped(), 1);
    }

    #[test]
    fn non_move_key_still_takes_the_window() {
        let mut r = InputRouter::new();
        assert_eq!(r.offer(None, true), Routed::Ignored);
        assert_eq!(r.offer(Some(MoveDir::Left), true), Routed::Slipped);
    }
}
