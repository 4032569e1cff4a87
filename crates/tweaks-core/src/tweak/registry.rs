use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use tracing::debug;

use super::{PatchBundle, Tweak};
use crate::error::{Error, Result};
use crate::patch::PatchDescriptor;
use crate::settings::{ConsumerKey, SettingsInjector, SettingsKind, SharedConsumer, TweakSettings};
use crate::util::short_type_name;

/// Metadata of a registered tweak.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TweakDescriptor {
    /// Unique ID, also used to name the tweak's patch owner
    pub id: &'static str,
    /// Type name, used to break priority ties
    pub name: &'static str,
    /// Lower priorities are listed first
    pub priority: i32,
    pub settings: &'static str,
    pub patch_bundle: &'static str,
}

/// A freshly built tweak, viewed both as a tweak and as a settings consumer.
pub(crate) struct TweakInstance {
    pub(crate) tweak: Rc<RefCell<dyn Tweak>>,
    pub(crate) consumer: SharedConsumer,
}

fn build<T: Tweak + Default + 'static>() -> TweakInstance {
    let tweak = Rc::new(RefCell::new(T::default()));
    TweakInstance {
        consumer: tweak.clone(),
        tweak,
    }
}

/// Everything the framework needs to know about one tweak type.
#[derive(Clone)]
pub struct TweakRegistration {
    descriptor: TweakDescriptor,
    settings: SettingsKind,
    tweak_key: ConsumerKey,
    bundle_key: ConsumerKey,
    build: fn() -> TweakInstance,
    patches: fn() -> Vec<PatchDescriptor>,
    bundle_sync: fn(&mut SettingsInjector<'_>),
}

impl TweakRegistration {
    /// Register tweak `T`, storing its settings in `S` and patching through `P`.
    pub fn new<T, S, P>(id: &'static str) -> Self
    where
        T: Tweak + Default + 'static,
        S: TweakSettings,
        P: PatchBundle,
    {
        Self {
            descriptor: TweakDescriptor {
                id,
                name: short_type_name::<T>(),
                priority: 0,
                settings: S::NAME,
                patch_bundle: short_type_name::<P>(),
            },
            settings: SettingsKind::of::<S>(),
            tweak_key: ConsumerKey::of::<T>(),
            bundle_key: ConsumerKey::of::<P>(),
            build: build::<T>,
            patches: P::patches,
            bundle_sync: P::sync_settings,
        }
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.descriptor.priority = priority;
        self
    }

    pub fn descriptor(&self) -> &TweakDescriptor {
        &self.descriptor
    }

    pub fn id(&self) -> &'static str {
        self.descriptor.id
    }

    pub fn settings_kind(&self) -> &SettingsKind {
        &self.settings
    }

    pub fn tweak_key(&self) -> ConsumerKey {
        self.tweak_key
    }

    pub fn bundle_key(&self) -> ConsumerKey {
        self.bundle_key
    }

    pub fn patches(&self) -> Vec<PatchDescriptor> {
        (self.patches)()
    }

    pub(crate) fn patch_source(&self) -> fn() -> Vec<PatchDescriptor> {
        self.patches
    }

    pub(crate) fn bundle_sync(&self) -> fn(&mut SettingsInjector<'_>) {
        self.bundle_sync
    }

    pub(crate) fn instantiate(&self) -> TweakInstance {
        (self.build)()
    }
}

/// Registration table filled in at startup, one entry per tweak.
#[derive(Default)]
pub struct TweakTable {
    entries: Vec<TweakRegistration>,
}

impl TweakTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, registration: TweakRegistration) -> &mut Self {
        self.entries.push(registration);
        self
    }

    pub fn with(mut self, registration: TweakRegistration) -> Self {
        self.entries.push(registration);
        self
    }

    /// Validate the table and order it by priority, then name.
    pub fn discover(self) -> Result<TweakRegistry> {
        let mut ids = HashSet::new();
        for entry in &self.entries {
            if !ids.insert(entry.id()) {
                return Err(Error::DuplicateTweakId(entry.id().to_string()));
            }
        }

        let mut entries = self.entries;
        entries.sort_by(|a, b| {
            a.descriptor
                .priority
                .cmp(&b.descriptor.priority)
                .then_with(|| a.descriptor.name.cmp(b.descriptor.name))
        });
        debug!(
            "Discovered tweaks: {:?}",
            entries.iter().map(|e| e.id()).collect::<Vec<_>>()
        );
        Ok(TweakRegistry { entries })
    }
}

/// The ordered tweaks, fixed for the rest of the process.
pub struct TweakRegistry {
    entries: Vec<TweakRegistration>,
}

impl TweakRegistry {
    pub fn iter(&self) -> impl Iterator<Item = &TweakRegistration> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&TweakRegistration> {
        self.entries.iter().find(|e| e.id() == id)
    }

    pub fn descriptors(&self) -> Vec<&TweakDescriptor> {
        self.entries.iter().map(|e| &e.descriptor).collect()
    }

    /// Distinct settings kinds, in tweak order.
    pub fn settings_kinds(&self) -> Vec<SettingsKind> {
        let mut kinds: Vec<SettingsKind> = Vec::new();
        for entry in &self.entries {
            if !kinds.contains(&entry.settings) {
                kinds.push(entry.settings);
            }
        }
        kinds
    }
}
