//! Settings records, their per-type files, and the synchronizer that hands
//! live records to the code depending on them.

mod global;
mod profile;
mod record;
mod store;
mod sync;

pub use global::{GlobalSettings, Language};
pub use profile::SettingsProfile;
pub use record::{AnySettings, SettingsFlags, SettingsHandle, SettingsKind, TweakSettings};
pub use store::SettingsStore;
pub use sync::{
    Consumer, ConsumerKey, SettingsConsumer, SettingsInjector, SettingsSynchronizer,
    SharedConsumer, StaticConsumer, SyncFailure, SyncReport,
};
