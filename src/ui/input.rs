/// Keyboard input tracker.
///
/// Tracks which keys are currently held down and which were freshly
/// pressed this frame. Steering and menu keys are edge-triggered; the name
/// prompt reads raw typed characters instead, so fast repeats of the same
/// letter are not swallowed by the hold detection.
///
/// Terminals without keyboard enhancement never send Release events, so a key
/// counts as released once it has been quiet for `HOLD_TIMEOUT`.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::direction::Direction;

/// After this duration without a Press/Repeat event, consider the key released.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

// ── Key Constants ──

pub const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
pub const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
pub const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
pub const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
pub const KEYS_PAUSE: &[KeyCode] = &[KeyCode::F(1), KeyCode::Char('p'), KeyCode::Char('P')];
pub const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];
pub const KEYS_SCORES: &[KeyCode] = &[KeyCode::Char('h'), KeyCode::Char('H')];
pub const KEYS_QUIT: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q')];

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Keys that went from "not held" to "held" during the most recent
    /// `drain_events()` call.
    fresh_presses: Vec<KeyCode>,

    /// Raw key events collected during drain, for meta-key handling.
    pub raw_events: Vec<KeyEvent>,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call this once per frame, before the simulation tick.
    pub fn drain_events(&mut self) {
        self.begin_frame();

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.record(key);
            }
        }

        // Expire keys that have gone quiet
        let now = Instant::now();
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    fn begin_frame(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();
    }

    fn record(&mut self, key: KeyEvent) {
        self.raw_events.push(key);
        if key.kind == KeyEventKind::Release {
            return;
        }
        let was_held = self.is_held(key.code);
        self.last_active.insert(key.code, Instant::now());
        if !was_held {
            self.fresh_presses.push(key.code);
        }
    }

    pub fn is_held(&self, code: KeyCode) -> bool {
        self.last_active
            .get(&code)
            .map(|t| t.elapsed() < HOLD_TIMEOUT)
            .unwrap_or(false)
    }

    /// Was this key freshly pressed this frame? (edge trigger)
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// Most recent steering key this frame, repeats of a held key included.
    pub fn steering(&self) -> Option<Direction> {
        self.raw_events
            .iter()
            .rev()
            .filter(|k| k.kind != KeyEventKind::Release)
            .find_map(|k| key_direction(k.code))
    }

    /// Printable characters typed this frame, in order.
    pub fn typed_chars(&self) -> impl Iterator<Item = char> + '_ {
        self.raw_events.iter().filter_map(|k| match (k.kind, k.code) {
            (KeyEventKind::Release, _) => None,
            (_, KeyCode::Char(c))
                if !k.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => Some(c),
            _ => None,
        })
    }

    /// Backspace presses this frame (raw, so holding it repeats).
    pub fn backspaces(&self) -> usize {
        self.raw_events
            .iter()
            .filter(|k| k.kind != KeyEventKind::Release && k.code == KeyCode::Backspace)
            .count()
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}

pub fn key_direction(code: KeyCode) -> Option<Direction> {
    if KEYS_LEFT.contains(&code) {
        Some(Direction::Left)
    } else if KEYS_RIGHT.contains(&code) {
        Some(Direction::Right)
    } else if KEYS_UP.contains(&code) {
        Some(Direction::Up)
    } else if KEYS_DOWN.contains(&code) {
        Some(Direction::Down)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn arrows_and_wasd_steer() {
        assert_eq!(key_direction(KeyCode::Up), Some(Direction::Up));
        assert_eq!(key_direction(KeyCode::Char('a')), Some(Direction::Left));
        assert_eq!(key_direction(KeyCode::Char('S')), Some(Direction::Down));
        assert_eq!(key_direction(KeyCode::Char('x')), None);
    }

    #[test]
    fn latest_fresh_press_steers() {
        let mut input = InputState::new();
        input.record(press(KeyCode::Up));
        input.record(press(KeyCode::Left));
        assert_eq!(input.steering(), Some(Direction::Left));
        assert!(input.any_pressed(KEYS_LEFT));
    }

    #[test]
    fn quick_zigzag_repeats_a_steer() {
        let mut input = InputState::new();
        for code in [KeyCode::Up, KeyCode::Right, KeyCode::Up] {
            input.begin_frame();
            input.record(press(code));
        }
        assert_eq!(input.steering(), Some(Direction::Up));
        assert!(!input.was_pressed(KeyCode::Up));
    }

    #[test]
    fn releases_do_not_steer() {
        let mut input = InputState::new();
        input.record(press(KeyCode::Left));
        input.record(KeyEvent::new_with_kind(KeyCode::Down, KeyModifiers::NONE, KeyEventKind::Release));
        assert_eq!(input.steering(), Some(Direction::Left));
    }

    #[test]
    fn held_key_is_not_a_fresh_press_again() {
        let mut input = InputState::new();
        input.record(press(KeyCode::Up));
        input.fresh_presses.clear();
        input.record(press(KeyCode::Up));
        assert!(!input.was_pressed(KeyCode::Up));
        assert!(input.is_held(KeyCode::Up));
    }

    #[test]
    fn typed_chars_skip_modified_keys() {
        let mut input = InputState::new();
        input.record(press(KeyCode::Char('a')));
        input.record(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        input.record(press(KeyCode::Char('a')));
        input.record(press(KeyCode::Backspace));
        assert_eq!(input.typed_chars().collect::<String>(), "aa");
        assert_eq!(input.backspaces(), 1);
        assert!(input.ctrl_c_pressed());
    }
}
