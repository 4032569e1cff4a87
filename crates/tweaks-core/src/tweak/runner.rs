use std::cell::RefCell;
use std::rc::Rc;

use strum::{Display, IntoStaticStr};
use tracing::{debug, info, warn};

use super::registry::{TweakDescriptor, TweakRegistration};
use super::Tweak;
use crate::context::TweakContext;
use crate::input::InputState;
use crate::patch::{PatchDescriptor, PatchDispatcher};
use crate::settings::{AnySettings, SharedConsumer};
use crate::ui::{SettingsUi, TweakHeader};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
pub enum RunnerState {
    Stopped,
    Started,
    Enabled,
    Disabled,
}

/// Drives one tweak: its enable/disable lifecycle, its patches, and the
/// per-frame callbacks it receives while enabled.
pub struct TweakRunner {
    descriptor: TweakDescriptor,
    tweak: Rc<RefCell<dyn Tweak>>,
    consumer: SharedConsumer,
    settings: Rc<dyn AnySettings>,
    patch_source: fn() -> Vec<PatchDescriptor>,
    dispatcher: PatchDispatcher,
    state: RunnerState,
}

impl TweakRunner {
    pub fn new(registration: &TweakRegistration, settings: Rc<dyn AnySettings>, plugin_id: &str) -> Self {
        let instance = registration.instantiate();
        let descriptor = registration.descriptor().clone();
        let owner = format!("{}.{}", plugin_id, descriptor.id);
        Self {
            descriptor,
            tweak: instance.tweak,
            consumer: instance.consumer,
            settings,
            patch_source: registration.patch_source(),
            dispatcher: PatchDispatcher::new(owner),
            state: RunnerState::Stopped,
        }
    }

    pub fn id(&self) -> &'static str {
        self.descriptor.id
    }

    pub fn descriptor(&self) -> &TweakDescriptor {
        &self.descriptor
    }

    pub fn state(&self) -> RunnerState {
        self.state
    }

    /// The enabled flag stored in the tweak's settings
    pub fn is_enabled(&self) -> bool {
        self.settings.flags().is_enabled
    }

    pub fn is_active(&self) -> bool {
        self.state == RunnerState::Enabled
    }

    pub fn dispatcher(&self) -> &PatchDispatcher {
        &self.dispatcher
    }

    pub fn applied_patches(&self) -> usize {
        self.dispatcher.applied_count()
    }

    pub fn tweak(&self) -> &Rc<RefCell<dyn Tweak>> {
        &self.tweak
    }

    pub(crate) fn consumer(&self) -> &SharedConsumer {
        &self.consumer
    }

    pub fn start(&mut self, ctx: &mut TweakContext) {
        if self.state != RunnerState::Stopped {
            return;
        }
        self.state = RunnerState::Started;
        if self.is_enabled() {
            self.enable(ctx);
        }
    }

    pub fn enable(&mut self, ctx: &mut TweakContext) {
        if matches!(self.state, RunnerState::Stopped | RunnerState::Enabled) {
            return;
        }

        self.run_hook("on_enable", |t| t.on_enable());

        self.dispatcher.load((self.patch_source)());
        let valid = self.dispatcher.resolve_all(ctx.port.as_ref());
        let applied = self.dispatcher.apply_all(ctx.port.as_mut(), &mut ctx.patches);
        debug!(
            "{}: {} of {} patch(es) valid, {} applied",
            self.descriptor.id,
            valid,
            self.dispatcher.patches().len(),
            applied
        );

        self.run_hook("on_patch", |t| t.on_patch());
        self.state = RunnerState::Enabled;
        info!("Enabled tweak {}", self.descriptor.id);
    }

    pub fn disable(&mut self, ctx: &mut TweakContext) {
        if self.state != RunnerState::Enabled {
            return;
        }

        self.run_hook("on_disable", |t| t.on_disable());
        self.dispatcher
            .unapply_all(ctx.port.as_mut(), &mut ctx.patches);
        self.run_hook("on_unpatch", |t| t.on_unpatch());
        self.state = RunnerState::Disabled;
        info!("Disabled tweak {}", self.descriptor.id);
    }

    pub fn stop(&mut self, ctx: &mut TweakContext) {
        self.disable(ctx);
        self.state = RunnerState::Stopped;
    }

    /// Write the enabled flag and follow it.
    pub fn set_enabled(&mut self, ctx: &mut TweakContext, enabled: bool) {
        self.settings.set_enabled(enabled);
        if enabled {
            self.enable(ctx);
        } else {
            self.disable(ctx);
        }
    }

    pub fn update(&mut self, delta_time: f32, input: &dyn InputState) {
        if self.is_active() {
            self.tweak.borrow_mut().on_update(delta_time, input);
        }
    }

    pub fn on_hide_gui(&mut self) {
        if self.is_active() {
            self.tweak.borrow_mut().on_hide_gui();
        }
    }

    pub fn on_language_change(&mut self) {
        if self.is_active() {
            self.tweak.borrow_mut().on_language_change();
        }
    }

    /// Draw the header and, when expanded, the tweak's own settings.
    pub fn on_gui(&mut self, ctx: &mut TweakContext, ui: &mut dyn SettingsUi) {
        let flags = self.settings.flags();
        let (name, description) = {
            let tweak = self.tweak.borrow();
            (tweak.name(), tweak.description())
        };
        let mut input = ui.tweak_header(&TweakHeader {
            name: &name,
            description: &description,
            flags,
        });

        if input.is_enabled != flags.is_enabled {
            self.set_enabled(ctx, input.is_enabled);
            if input.is_enabled {
                input.is_expanded = true;
            }
        }

        if input.is_expanded != flags.is_expanded {
            self.settings.set_expanded(input.is_expanded);
            if !input.is_expanded && self.is_active() {
                self.tweak.borrow_mut().on_hide_gui();
            }
        }

        if input.is_expanded && self.is_active() {
            ui.begin_section();
            self.tweak.borrow_mut().on_settings_gui(ui);
            ui.end_section();
        }
    }

    fn run_hook<F>(&self, hook: &str, f: F)
    where
        F: FnOnce(&mut dyn Tweak) -> anyhow::Result<()>,
    {
        let mut tweak = self.tweak.borrow_mut();
        if let Err(e) = f(&mut *tweak) {
            warn!("{} failed in {}: {:#}", self.descriptor.id, hook, e);
        }
    }
}
