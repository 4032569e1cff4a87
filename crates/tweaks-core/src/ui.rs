//! The slice of the host's immediate-mode GUI the framework draws through.

use crate::input::InputState;
use crate::settings::SettingsFlags;

/// Header row drawn above every tweak's settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TweakHeader<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub flags: SettingsFlags,
}

pub trait SettingsUi {
    /// Draw the header and return the flags after this frame's input.
    fn tweak_header(&mut self, header: &TweakHeader<'_>) -> SettingsFlags;

    /// Start an indented block holding one tweak's own settings
    fn begin_section(&mut self);

    fn end_section(&mut self);

    fn label(&mut self, text: &str);

    fn toggle(&mut self, label: &str, value: bool) -> bool;

    /// Returns whether the button was clicked this frame
    fn button(&mut self, text: &str) -> bool;

    /// Keyboard state of the frame being drawn
    fn input(&self) -> &dyn InputState;
}
