use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::SettingsStore;
use crate::error::Result;

/// Shared handle to the one live instance of a settings type.
pub type SettingsHandle<S> = Rc<RefCell<S>>;

/// Flags every settings record carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SettingsFlags {
    /// Whether the tweak is enabled
    pub is_enabled: bool,
    /// Whether the tweak's settings are expanded in the settings GUI
    pub is_expanded: bool,
}

/// A persisted settings record.
///
/// Implementors usually embed [`SettingsFlags`] with `#[serde(flatten)]`
/// and mark transient fields with `#[serde(skip)]`.
pub trait TweakSettings: Serialize + DeserializeOwned + Default + 'static {
    /// File stem the record is stored under
    const NAME: &'static str;

    fn flags(&self) -> &SettingsFlags;

    fn flags_mut(&mut self) -> &mut SettingsFlags;
}

/// Type-erased view of a loaded settings record.
pub trait AnySettings {
    fn name(&self) -> &'static str;

    fn flags(&self) -> SettingsFlags;

    fn set_enabled(&self, enabled: bool);

    fn set_expanded(&self, expanded: bool);

    fn save(&self, store: &SettingsStore) -> Result<()>;

    fn as_any(&self) -> &dyn Any;
}

pub(crate) struct SettingsCell<S: TweakSettings> {
    pub(crate) handle: SettingsHandle<S>,
}

impl<S: TweakSettings> SettingsCell<S> {
    pub(crate) fn new(value: S) -> Self {
        Self {
            handle: Rc::new(RefCell::new(value)),
        }
    }
}

impl<S: TweakSettings> AnySettings for SettingsCell<S> {
    fn name(&self) -> &'static str {
        S::NAME
    }

    fn flags(&self) -> SettingsFlags {
        *self.handle.borrow().flags()
    }

    fn set_enabled(&self, enabled: bool) {
        self.handle.borrow_mut().flags_mut().is_enabled = enabled;
    }

    fn set_expanded(&self, expanded: bool) {
        self.handle.borrow_mut().flags_mut().is_expanded = expanded;
    }

    fn save(&self, store: &SettingsStore) -> Result<()> {
        store.save(&*self.handle.borrow())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Downcasts an erased record back to its typed handle.
pub(crate) fn typed_handle<S: TweakSettings>(settings: &dyn AnySettings) -> Option<SettingsHandle<S>> {
    settings
        .as_any()
        .downcast_ref::<SettingsCell<S>>()
        .map(|cell| Rc::clone(&cell.handle))
}

/// A settings type known to the loader.
#[derive(Clone, Copy)]
pub struct SettingsKind {
    pub id: TypeId,
    pub name: &'static str,
    pub(crate) load: fn(&SettingsStore) -> Result<Rc<dyn AnySettings>>,
    pub(crate) fallback: fn() -> Rc<dyn AnySettings>,
}

impl SettingsKind {
    pub fn of<S: TweakSettings>() -> Self {
        Self {
            id: TypeId::of::<S>(),
            name: S::NAME,
            load: load_kind::<S>,
            fallback: fallback_kind::<S>,
        }
    }
}

impl std::fmt::Debug for SettingsKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsKind").field("name", &self.name).finish()
    }
}

impl PartialEq for SettingsKind {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

fn load_kind<S: TweakSettings>(store: &SettingsStore) -> Result<Rc<dyn AnySettings>> {
    let value: S = store.load()?;
    Ok(Rc::new(SettingsCell::new(value)))
}

fn fallback_kind<S: TweakSettings>() -> Rc<dyn AnySettings> {
    Rc::new(SettingsCell::new(S::default()))
}
