//! # tweaks-core
//!
//! Framework for toggleable game-plugin tweaks.
//!
//! This crate provides:
//! - An explicit tweak registration table and the ordered registry built from it
//! - Per-type settings records persisted as JSON, and a synchronizer that
//!   hands the live records to tweaks and patch bundles
//! - Version-gated patches installed through a host interception port
//! - Keyboard shortcuts checked against a host input port
//! - A runner per tweak driving its enable/disable lifecycle
//! - The [`Plugin`] orchestrator the host forwards its callbacks to

pub mod context;
pub mod error;
pub mod input;
pub mod logging;
pub mod patch;
pub mod plugin;
pub mod prelude;
pub mod settings;
pub mod tweak;
pub mod ui;
mod util;
pub mod version;

pub use context::TweakContext;
pub use error::{Error, Result};
pub use input::{InputState, KeyCode, KeyShortcut};
pub use patch::{
    CallFrame, ClassHandle, HookKind, HookSet, Instruction, InterceptionPort, InvalidReason,
    PatchDescriptor, PatchDispatcher, PatchHandle, PatchState, PatchTable, TargetHandle,
    TweakPatch,
};
pub use plugin::{Plugin, PluginConfig, PluginConfigBuilder};
pub use settings::{
    AnySettings, Consumer, ConsumerKey, GlobalSettings, Language, SettingsConsumer,
    SettingsFlags, SettingsHandle, SettingsInjector, SettingsKind, SettingsProfile, SettingsStore,
    SettingsSynchronizer, SharedConsumer, StaticConsumer, SyncFailure, SyncReport,
    TweakSettings,
};
pub use tweak::{
    PatchBundle, RunnerState, Tweak, TweakDescriptor, TweakRegistration, TweakRegistry,
    TweakRunner, TweakTable,
};
pub use ui::{SettingsUi, TweakHeader};
pub use version::{ASYNC_INPUT_RELEASE, HostCapabilities, HostVersion, RangeViolation, VersionRange};
