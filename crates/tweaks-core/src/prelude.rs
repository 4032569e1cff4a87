//! Prelude module for convenient imports
//!
//! ```ignore
//! use tweaks_core::prelude::*;
//! ```
//!
//! Brings in what a tweak author needs: the tweak and settings traits, the
//! patch builder types, the registration table and the plugin itself.

// Plugin
pub use crate::plugin::{Plugin, PluginConfig};

// Tweaks
pub use crate::tweak::{PatchBundle, Tweak, TweakRegistration, TweakTable};

// Settings
pub use crate::settings::{
    Language, SettingsConsumer, SettingsFlags, SettingsHandle, SettingsInjector, SettingsProfile,
    StaticConsumer, TweakSettings,
};

// Input
pub use crate::input::{InputState, KeyCode, KeyShortcut};

// Patches
pub use crate::patch::{CallFrame, InterceptionPort, PatchDescriptor};
pub use crate::ui::SettingsUi;
pub use crate::version::{HostVersion, VersionRange};

// Error handling
pub use crate::error::{Error, Result};
