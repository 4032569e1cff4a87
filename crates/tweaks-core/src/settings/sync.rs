//! Keeps settings references synchronized across the codebase.
//!
//! Two things must happen before a consumer receives its settings:
//!
//! 1. The consumer type (or one instance of it) is registered through
//!    [`SettingsSynchronizer::register`] or one of its helpers.
//! 2. Its `sync_settings` implementation requests every slot it depends on
//!    from the [`SettingsInjector`].
//!
//! [`SettingsSynchronizer::sync`] then pushes the live handles into every
//! registered consumer.

use std::any::TypeId;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::{error, info, warn};

use super::record::typed_handle;
use super::{AnySettings, SettingsHandle, SettingsKind, SettingsStore, TweakSettings};
use crate::error::{Error, Result};
use crate::util::short_type_name;

/// A consumer instance with settings slots.
pub trait SettingsConsumer {
    fn sync_settings(&mut self, _injector: &mut SettingsInjector<'_>) {}
}

/// A consumer without an instance whose slots live in statics.
pub trait StaticConsumer: 'static {
    fn sync_settings(_injector: &mut SettingsInjector<'_>) {}
}

/// Identity of a consumer type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConsumerKey {
    id: TypeId,
    name: &'static str,
}

impl ConsumerKey {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: short_type_name::<T>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

pub type SharedConsumer = Rc<RefCell<dyn SettingsConsumer>>;

/// What is bound to a consumer key.
#[derive(Clone)]
pub enum Consumer {
    Static(fn(&mut SettingsInjector<'_>)),
    Instance(SharedConsumer),
}

#[derive(Debug)]
pub struct SyncFailure {
    pub consumer: &'static str,
    pub slot: &'static str,
    pub error: Error,
}

/// Outcome of one [`SettingsSynchronizer::sync`] pass.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub injected: usize,
    pub failures: Vec<SyncFailure>,
}

impl SyncReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Hands live settings to the slots of a single consumer.
pub struct SettingsInjector<'a> {
    settings: &'a HashMap<TypeId, Rc<dyn AnySettings>>,
    consumer: &'static str,
    report: &'a mut SyncReport,
}

impl SettingsInjector<'_> {
    pub fn consumer(&self) -> &'static str {
        self.consumer
    }

    pub fn handle<S: TweakSettings>(&self) -> Result<SettingsHandle<S>> {
        lookup(self.settings)
    }

    /// Set `target` to the live record of type `S`.
    pub fn inject<S: TweakSettings>(
        &mut self,
        slot: &'static str,
        target: &mut Option<SettingsHandle<S>>,
    ) {
        match lookup::<S>(self.settings) {
            Ok(handle) => {
                *target = Some(handle);
                self.report.injected += 1;
            }
            Err(e) => self.fail(slot, e),
        }
    }

    /// Hand the live record of type `S` to a setter that may reject it.
    pub fn inject_with<S, F>(&mut self, slot: &'static str, setter: F)
    where
        S: TweakSettings,
        F: FnOnce(SettingsHandle<S>) -> anyhow::Result<()>,
    {
        let result = lookup::<S>(self.settings)
            .and_then(|handle| setter(handle).map_err(|e| Error::SlotRejected(format!("{:#}", e))));
        match result {
            Ok(()) => self.report.injected += 1,
            Err(e) => self.fail(slot, e),
        }
    }

    fn fail(&mut self, slot: &'static str, error: Error) {
        warn!(
            "Unable to update slot {} in consumer {}: {}",
            slot, self.consumer, error
        );
        self.report.failures.push(SyncFailure {
            consumer: self.consumer,
            slot,
            error,
        });
    }
}

fn lookup<S: TweakSettings>(
    settings: &HashMap<TypeId, Rc<dyn AnySettings>>,
) -> Result<SettingsHandle<S>> {
    settings
        .get(&TypeId::of::<S>())
        .and_then(|s| typed_handle::<S>(s.as_ref()))
        .ok_or_else(|| Error::SettingsNotLoaded(S::NAME.to_string()))
}

fn same_instance(a: &SharedConsumer, b: &SharedConsumer) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

/// Registry of loaded settings and of the consumers depending on them.
#[derive(Default)]
pub struct SettingsSynchronizer {
    settings: HashMap<TypeId, Rc<dyn AnySettings>>,
    consumers: HashMap<ConsumerKey, Consumer>,
}

impl SettingsSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every settings kind from the store, substituting defaults for
    /// records that fail to load.
    pub fn load(&mut self, store: &SettingsStore, kinds: &[SettingsKind]) {
        self.settings.clear();
        for kind in kinds {
            info!("Loading: {}", kind.name);
            let settings = match (kind.load)(store) {
                Ok(s) => s,
                Err(e) => {
                    error!("Failed to read settings for {}: {}", kind.name, e);
                    (kind.fallback)()
                }
            };
            self.settings.insert(kind.id, settings);
        }
    }

    /// Save every loaded record. Returns how many were written.
    pub fn save(&self, store: &SettingsStore) -> usize {
        let mut saved = 0;
        for settings in self.settings.values() {
            info!("Saving: {}", settings.name());
            match settings.save(store) {
                Ok(()) => saved += 1,
                Err(e) => error!(
                    "Can't save {}: {}",
                    store.path_for_name(settings.name()).display(),
                    e
                ),
            }
        }
        saved
    }

    /// Install a record directly, replacing any loaded one.
    pub fn insert<S: TweakSettings>(&mut self, value: S) -> SettingsHandle<S> {
        let cell = super::record::SettingsCell::new(value);
        let handle = Rc::clone(&cell.handle);
        self.settings.insert(TypeId::of::<S>(), Rc::new(cell));
        handle
    }

    pub fn settings_for(&self, kind: &SettingsKind) -> Result<Rc<dyn AnySettings>> {
        self.settings
            .get(&kind.id)
            .cloned()
            .ok_or_else(|| Error::SettingsNotLoaded(kind.name.to_string()))
    }

    pub fn handle<S: TweakSettings>(&self) -> Result<SettingsHandle<S>> {
        lookup(&self.settings)
    }

    pub fn loaded_count(&self) -> usize {
        self.settings.len()
    }

    pub fn register(&mut self, key: ConsumerKey, consumer: Consumer) -> Result<()> {
        if self.consumers.contains_key(&key) {
            return Err(Error::ConsumerAlreadyRegistered(key.name.to_string()));
        }
        self.consumers.insert(key, consumer);
        Ok(())
    }

    pub fn register_static<T: StaticConsumer>(&mut self) -> Result<()> {
        self.register(ConsumerKey::of::<T>(), Consumer::Static(T::sync_settings))
    }

    pub fn register_instance<T: SettingsConsumer + 'static>(
        &mut self,
        instance: &Rc<RefCell<T>>,
    ) -> Result<()> {
        let shared: SharedConsumer = Rc::clone(instance) as SharedConsumer;
        self.register(ConsumerKey::of::<T>(), Consumer::Instance(shared))
    }

    /// Remove a binding. `instance` must be the bound instance, or `None`
    /// for a static consumer.
    pub fn unregister(&mut self, key: ConsumerKey, instance: Option<&SharedConsumer>) -> Result<()> {
        let bound = self
            .consumers
            .get(&key)
            .ok_or_else(|| Error::ConsumerNotRegistered(key.name.to_string()))?;

        let matches = match (bound, instance) {
            (Consumer::Static(_), None) => true,
            (Consumer::Instance(bound), Some(instance)) => same_instance(bound, instance),
            _ => false,
        };
        if !matches {
            return Err(Error::ConsumerMismatch(key.name.to_string()));
        }

        self.consumers.remove(&key);
        Ok(())
    }

    pub fn is_registered(&self, key: &ConsumerKey) -> bool {
        self.consumers.contains_key(key)
    }

    /// Inject the loaded settings into every registered consumer.
    pub fn sync(&self) -> SyncReport {
        let mut report = SyncReport::default();
        for (key, consumer) in &self.consumers {
            let mut injector = SettingsInjector {
                settings: &self.settings,
                consumer: key.name,
                report: &mut report,
            };
            match consumer {
                Consumer::Static(sync_settings) => sync_settings(&mut injector),
                Consumer::Instance(instance) => match instance.try_borrow_mut() {
                    Ok(mut instance) => instance.sync_settings(&mut injector),
                    Err(_) => injector.fail("*", Error::ConsumerBusy(key.name.to_string())),
                },
            }
        }
        report
    }
}
