//! Scripted input for tests.

use super::{InputState, KeyCode};

/// Input of one frame: held modifiers and the keys that went down.
#[derive(Debug, Default, Clone)]
pub struct FrameInput {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub down: Vec<KeyCode>,
}

impl FrameInput {
    pub fn keys(down: &[KeyCode]) -> Self {
        Self {
            down: down.to_vec(),
            ..Default::default()
        }
    }
}

impl InputState for FrameInput {
    fn holding_control(&self) -> bool {
        self.ctrl
    }

    fn holding_shift(&self) -> bool {
        self.shift
    }

    fn holding_alt(&self) -> bool {
        self.alt
    }

    fn key_down(&self, key: KeyCode) -> bool {
        self.down.contains(&key)
    }
}
