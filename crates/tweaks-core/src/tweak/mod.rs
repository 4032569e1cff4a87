//! Tweaks, their registration table, and the runner driving each one.

mod registry;
mod runner;

pub use registry::{TweakDescriptor, TweakRegistration, TweakRegistry, TweakTable};
pub use runner::{RunnerState, TweakRunner};

use crate::input::InputState;
use crate::patch::PatchDescriptor;
use crate::settings::{SettingsConsumer, StaticConsumer};
use crate::ui::SettingsUi;

/// One independently toggleable feature.
///
/// Every lifecycle method has a no-op default. The fallible ones are logged
/// by the runner on failure; they never stop the lifecycle.
pub trait Tweak: SettingsConsumer {
    /// Name shown in the settings GUI
    fn name(&self) -> String;

    /// Description shown in the settings GUI
    fn description(&self) -> String;

    /// Draw the tweak's own settings, once per GUI frame.
    fn on_settings_gui(&mut self, _ui: &mut dyn SettingsUi) {}

    /// Called when the settings GUI is hidden or the tweak is collapsed.
    fn on_hide_gui(&mut self) {}

    /// Runs before the tweak's patches are applied.
    fn on_enable(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Runs after the tweak's patches are applied.
    fn on_patch(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Runs before the tweak's patches are removed.
    fn on_disable(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Runs after the tweak's patches are removed.
    fn on_unpatch(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called every host frame with the seconds since the previous one.
    fn on_update(&mut self, _delta_time: f32, _input: &dyn InputState) {}

    fn on_language_change(&mut self) {}
}

/// The patches of one tweak.
///
/// A bundle is a type without instances; hooks are plain functions, so any
/// settings they read are injected into statics through [`StaticConsumer`].
pub trait PatchBundle: StaticConsumer {
    fn patches() -> Vec<PatchDescriptor>;
}
