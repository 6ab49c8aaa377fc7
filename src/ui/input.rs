/// Keyboard input source.
///
/// Turns crossterm key events into lowercase key names (`"w"`, `"arrowup"`,
/// `"escape"`) with a held/released state, and hands controllers a
/// `KeyState` snapshot once per frame.
///
/// When the terminal supports keyboard enhancement, real Release events are
/// honored. Otherwise a key counts as released once no Press/Repeat has
/// arrived for `HOLD_TIMEOUT`.

use std::collections::HashMap;
use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::{execute, terminal};
use log::debug;

use crate::domain::keys::KeyState;

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

pub struct InputState {
    /// Timestamp of last Press/Repeat event per key name.
    last_active: HashMap<String, Instant>,

    /// Keys that went from "not held" → "held" during the latest drain.
    fresh_presses: Vec<String>,

    /// Raw key events collected during drain, for meta-key handling.
    pub raw_events: Vec<KeyEvent>,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,
}

/// Lowercase name for a key code, following browser `KeyboardEvent.key`
/// names. Keys the simulation never reads map to `None`.
pub fn key_name(code: KeyCode) -> Option<String> {
    let name = match code {
        KeyCode::Char(c) => return Some(c.to_lowercase().collect()),
        KeyCode::Up => "arrowup",
        KeyCode::Down => "arrowdown",
        KeyCode::Left => "arrowleft",
        KeyCode::Right => "arrowright",
        KeyCode::Esc => "escape",
        KeyCode::Enter => "enter",
        KeyCode::F(1) => "f1",
        _ => return None,
    };
    Some(name.to_string())
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Ask the terminal for press/release reporting. Call once, after raw mode.
    pub fn register(&mut self) -> io::Result<()> {
        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                io::stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            self.honor_release = true;
        }
        debug!("keyboard release events: {}", self.honor_release);
        Ok(())
    }

    /// Undo `register`. Safe to call when nothing was pushed.
    pub fn deregister(&mut self) -> io::Result<()> {
        if self.honor_release {
            execute!(io::stdout(), PopKeyboardEnhancementFlags)?;
            self.honor_release = false;
        }
        self.last_active.clear();
        self.fresh_presses.clear();
        Ok(())
    }

    /// Drain all pending terminal events and update key states.
    /// Call this once per loop iteration, before the simulation tick.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.raw_events.push(key);
                self.apply(key);
            }
        }

        if !self.honor_release {
            let now = Instant::now();
            self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
        }
    }

    /// Fold one key event into the held set (last write wins).
    pub fn apply(&mut self, key: KeyEvent) {
        let name = match key_name(key.code) {
            Some(n) => n,
            None => return,
        };
        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                self.last_active.remove(&name);
            }
            KeyEventKind::Release => {
                // Not trusted without enhancement; timeout handles it
            }
            _ => {
                if !self.is_held(&name) {
                    self.fresh_presses.push(name.clone());
                }
                self.last_active.insert(name, Instant::now());
            }
        }
    }

    pub fn is_held(&self, name: &str) -> bool {
        self.last_active.get(name)
            .map(|t| self.honor_release || t.elapsed() < HOLD_TIMEOUT)
            .unwrap_or(false)
    }

    /// Was this key freshly pressed this frame? (edge trigger)
    pub fn was_pressed(&self, name: &str) -> bool {
        self.fresh_presses.iter().any(|k| k == name)
    }

    pub fn any_pressed(&self, names: &[&str]) -> bool {
        names.iter().any(|n| self.was_pressed(n))
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }

    /// Read-only snapshot for controllers.
    pub fn snapshot(&self) -> KeyState {
        let mut keys = KeyState::new();
        for name in self.last_active.keys() {
            if self.is_held(name) {
                keys.set(name, true);
            }
        }
        keys
    }
}
