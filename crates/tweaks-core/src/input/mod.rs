//! Keyboard state as seen by tweaks, and persisted key shortcuts.

mod shortcut;

#[cfg(test)]
pub mod mock;

pub use shortcut::KeyShortcut;

#[cfg(test)]
pub use mock::FrameInput;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Keys the host reports, named as the host names them.
///
/// The host's `LeftApple`/`RightApple` are aliases of the command keys and
/// are not listed separately.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    IntoStaticStr,
    Display,
)]
pub enum KeyCode {
    #[default]
    None,
    Backspace,
    Tab,
    Return,
    Escape,
    Space,
    Quote,
    Comma,
    Minus,
    Period,
    Slash,
    Alpha0,
    Alpha1,
    Alpha2,
    Alpha3,
    Alpha4,
    Alpha5,
    Alpha6,
    Alpha7,
    Alpha8,
    Alpha9,
    Semicolon,
    Equals,
    LeftBracket,
    Backslash,
    RightBracket,
    BackQuote,
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    Delete,
    Keypad0,
    Keypad1,
    Keypad2,
    Keypad3,
    Keypad4,
    Keypad5,
    Keypad6,
    Keypad7,
    Keypad8,
    Keypad9,
    KeypadEnter,
    UpArrow,
    DownArrow,
    RightArrow,
    LeftArrow,
    Insert,
    Home,
    End,
    PageUp,
    PageDown,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    RightShift,
    LeftShift,
    RightControl,
    LeftControl,
    RightAlt,
    LeftAlt,
    RightCommand,
    LeftCommand,
    Mouse0,
    Mouse1,
    Mouse2,
    Mouse3,
    Mouse4,
    Mouse5,
    Mouse6,
}

impl KeyCode {
    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            Self::LeftShift
                | Self::RightShift
                | Self::LeftControl
                | Self::RightControl
                | Self::LeftAlt
                | Self::RightAlt
                | Self::LeftCommand
                | Self::RightCommand
        )
    }

    pub fn is_mouse(self) -> bool {
        matches!(
            self,
            Self::Mouse0
                | Self::Mouse1
                | Self::Mouse2
                | Self::Mouse3
                | Self::Mouse4
                | Self::Mouse5
                | Self::Mouse6
        )
    }

    /// Whether a shortcut may be bound to this key
    pub fn is_bindable(self) -> bool {
        self != Self::None && !self.is_modifier() && !self.is_mouse()
    }
}

/// Input of the current host frame.
pub trait InputState {
    fn holding_control(&self) -> bool;

    fn holding_shift(&self) -> bool;

    fn holding_alt(&self) -> bool;

    /// Whether `key` went down during this frame
    fn key_down(&self, key: KeyCode) -> bool;
}
