use std::fmt;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use super::{InputState, KeyCode};
use crate::ui::SettingsUi;

/// A modifier+key combination checked once per frame.
///
/// Modifiers must match exactly: a Ctrl+A shortcut does not fire on
/// Ctrl+Shift+A.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KeyShortcut {
    pub press_ctrl: bool,
    pub press_shift: bool,
    pub press_alt: bool,
    pub press_key: KeyCode,
    #[serde(skip)]
    is_listening: bool,
}

impl KeyShortcut {
    pub fn new(press_key: KeyCode) -> Self {
        Self {
            press_key,
            ..Default::default()
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.press_ctrl = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.press_shift = true;
        self
    }

    pub fn alt(mut self) -> Self {
        self.press_alt = true;
        self
    }

    /// Whether the shortcut was triggered this frame.
    pub fn check(&self, input: &dyn InputState) -> bool {
        self.press_ctrl == input.holding_control()
            && self.press_shift == input.holding_shift()
            && self.press_alt == input.holding_alt()
            && input.key_down(self.press_key)
    }

    pub fn is_listening(&self) -> bool {
        self.is_listening
    }

    pub fn set_listening(&mut self, listening: bool) {
        self.is_listening = listening;
    }

    /// While listening, bind the key that went down this frame. Modifier and
    /// mouse keys are ignored. Returns whether the key changed.
    pub fn capture(&mut self, input: &dyn InputState) -> bool {
        if !self.is_listening {
            return false;
        }
        let Some(key) = KeyCode::iter()
            .rev()
            .find(|k| k.is_bindable() && input.key_down(*k))
        else {
            return false;
        };
        let changed = key != self.press_key;
        self.press_key = key;
        changed
    }

    /// Draw the modifier toggles, the bound key and the listen button.
    pub fn on_gui(&mut self, ui: &mut dyn SettingsUi, label: Option<&str>) {
        if let Some(label) = label.filter(|l| !l.is_empty()) {
            ui.label(label);
        }

        self.press_ctrl = ui.toggle("Control", self.press_ctrl);
        ui.label("+");
        self.press_shift = ui.toggle("Shift", self.press_shift);
        ui.label("+");
        self.press_alt = ui.toggle("Alt", self.press_alt);
        ui.label("+");
        ui.label(self.press_key.into());

        let text = if self.is_listening { "Done" } else { "Change key" };
        if ui.button(text) {
            self.is_listening = !self.is_listening;
        }

        self.capture(ui.input());
    }
}

impl fmt::Display for KeyShortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.press_ctrl {
            write!(f, "Ctrl+")?;
        }
        if self.press_shift {
            write!(f, "Shift+")?;
        }
        if self.press_alt {
            write!(f, "Alt+")?;
        }
        write!(f, "{}", self.press_key)
    }
}
