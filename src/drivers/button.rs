//! Polled button debouncer.
//!
//! The button task samples the pin every [`POLL_MS`] and feeds the level
//! in here. A new level is accepted only after it has been seen
//! continuously for the debounce window, so contact bounce collapses to a
//! single logical press and a single release.
//!
//! ```text
//!   raw   ‾‾|_|‾|____________________|‾|_|‾‾‾‾‾‾‾
//!   event          Pressed (after window)      Released
//! ```

/// Default debounce window.
pub const DEBOUNCE_MS: u32 = 50;
/// Button sampling period.
pub const POLL_MS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    Pressed,
    Released,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DebounceState {
    Stable,
    Settling { since_ms: u64 },
}

pub struct Debouncer {
    window_ms: u32,
    pressed: bool,
    state: DebounceState,
}

impl Debouncer {
    /// Starts in the released state.
    pub fn new(window_ms: u32) -> Self {
        Self {
            window_ms,
            pressed: false,
            state: DebounceState::Stable,
        }
    }

    /// Debounced level.
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Feed one raw sample taken at `now_ms`.
    pub fn update(&mut self, raw_pressed: bool, now_ms: u64) -> Option<ButtonEvent> {
        if raw_pressed == self.pressed {
            // Bounced back before the window elapsed.
            self.state = DebounceState::Stable;
            return None;
        }

        match self.state {
            DebounceState::Stable => {
                self.state = DebounceState::Settling { since_ms: now_ms };
                None
            }
            DebounceState::Settling { since_ms } => {
                if now_ms.saturating_sub(since_ms) < u64::from(self.window_ms) {
                    return None;
                }
                self.pressed = raw_pressed;
                self.state = DebounceState::Stable;
                Some(if raw_pressed {
                    ButtonEvent::Pressed
                } else {
                    ButtonEvent::Released
                })
            }
        }
    }
}
