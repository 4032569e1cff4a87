//! Host-facing entry point of the framework.
//!
//! [`Plugin`] owns the tweak registry, the settings store and the shared
//! [`TweakContext`]. The host forwards its lifecycle callbacks to it:
//!
//! - `on_toggle` when the plugin is switched on or off
//! - `on_update` once per frame
//! - `on_gui` / `on_hide_gui` / `on_save_gui` around the settings window
//!
//! ## Example
//!
//! ```ignore
//! use tweaks_core::prelude::*;
//!
//! let table = TweakTable::new()
//!     .with(TweakRegistration::new::<KeyViewerTweak, KeyViewerSettings, KeyViewerPatches>("KeyViewer"));
//! let config = PluginConfig::builder().settings_dir("Mods/Tweaks").build();
//!
//! let mut plugin = Plugin::setup(config, table, Box::new(host))?;
//! plugin.on_toggle(true)?;
//! ```

mod config;

pub use config::{PluginConfig, PluginConfigBuilder};

use tracing::{debug, error, info, warn};

use crate::context::TweakContext;
use crate::error::Result;
use crate::input::InputState;
use crate::patch::InterceptionPort;
use crate::settings::{
    Consumer, ConsumerKey, GlobalSettings, Language, SettingsHandle, SettingsKind,
    SettingsStore, SettingsSynchronizer, SharedConsumer,
};
use crate::tweak::{TweakRegistration, TweakRegistry, TweakRunner, TweakTable};
use crate::ui::SettingsUi;

pub struct Plugin {
    config: PluginConfig,
    registry: TweakRegistry,
    store: SettingsStore,
    ctx: TweakContext,
    runners: Vec<TweakRunner>,
    global: SettingsHandle<GlobalSettings>,
    is_enabled: bool,
}

impl Plugin {
    /// Discover the registered tweaks and load every settings record they use.
    pub fn setup(
        config: PluginConfig,
        table: TweakTable,
        port: Box<dyn InterceptionPort>,
    ) -> Result<Self> {
        let registry = table.discover()?;
        let store = SettingsStore::new(&config.settings_dir);
        let mut ctx = TweakContext::new(port);

        let mut kinds = registry.settings_kinds();
        let global_kind = SettingsKind::of::<GlobalSettings>();
        if !kinds.contains(&global_kind) {
            kinds.push(global_kind);
        }
        ctx.settings.load(&store, &kinds);
        let global = ctx.settings.handle::<GlobalSettings>()?;

        info!(
            "Set up {} with {} tweak(s) for host {}",
            config.plugin_id,
            registry.len(),
            ctx.host_version()
        );
        debug!("Host capabilities: {:?}", ctx.capabilities());

        Ok(Self {
            config,
            registry,
            store,
            ctx,
            runners: Vec::new(),
            global,
            is_enabled: false,
        })
    }

    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    pub fn registry(&self) -> &TweakRegistry {
        &self.registry
    }

    pub fn store(&self) -> &SettingsStore {
        &self.store
    }

    pub fn context(&self) -> &TweakContext {
        &self.ctx
    }

    pub fn runners(&self) -> &[TweakRunner] {
        &self.runners
    }

    pub fn runner(&self, id: &str) -> Option<&TweakRunner> {
        self.runners.iter().find(|r| r.id() == id)
    }

    pub fn is_enabled(&self) -> bool {
        self.is_enabled
    }

    pub fn global_settings(&self) -> &SettingsHandle<GlobalSettings> {
        &self.global
    }

    pub fn language(&self) -> Language {
        self.global.borrow().language
    }

    /// Start or stop every tweak.
    pub fn on_toggle(&mut self, enabled: bool) -> Result<()> {
        if enabled == self.is_enabled {
            return Ok(());
        }
        if enabled {
            if let Err(e) = self.start() {
                if e.is_configuration() {
                    error!("Tweak configuration error: {}", e);
                }
                return Err(e);
            }
        } else {
            self.stop();
        }
        self.is_enabled = enabled;
        Ok(())
    }

    fn start(&mut self) -> Result<()> {
        let mut runners = Vec::with_capacity(self.registry.len());
        for registration in self.registry.iter() {
            let settings = self.ctx.settings.settings_for(registration.settings_kind())?;
            let runner = TweakRunner::new(registration, settings, &self.config.plugin_id);
            if let Err(e) = register_runner(&mut self.ctx.settings, registration, &runner) {
                for (registration, runner) in self.registry.iter().zip(&runners) {
                    unregister_runner(&mut self.ctx.settings, registration, runner);
                }
                return Err(e);
            }
            runners.push(runner);
        }

        let report = self.ctx.settings.sync();
        if !report.is_clean() {
            warn!(
                "Settings sync finished with {} failure(s)",
                report.failures.len()
            );
        }
        debug!("Injected {} settings slot(s)", report.injected);

        for runner in &mut runners {
            runner.start(&mut self.ctx);
        }
        self.runners = runners;
        Ok(())
    }

    fn stop(&mut self) {
        let runners = std::mem::take(&mut self.runners);
        for (registration, mut runner) in self.registry.iter().zip(runners) {
            runner.stop(&mut self.ctx);
            unregister_runner(&mut self.ctx.settings, registration, &runner);
        }
        self.save();
    }

    pub fn on_update(&mut self, delta_time: f32, input: &dyn InputState) {
        if !self.is_enabled {
            return;
        }
        for runner in &mut self.runners {
            runner.update(delta_time, input);
        }
    }

    /// Draw every tweak's header and, for expanded tweaks, its settings.
    pub fn on_gui(&mut self, ui: &mut dyn SettingsUi) {
        for runner in &mut self.runners {
            runner.on_gui(&mut self.ctx, ui);
        }
    }

    pub fn on_hide_gui(&mut self) {
        for runner in &mut self.runners {
            runner.on_hide_gui();
        }
        if self.config.save_on_hide_gui {
            self.save();
        }
    }

    pub fn on_save_gui(&mut self) {
        self.save();
    }

    /// Write every loaded settings record. Returns how many were written.
    pub fn save(&self) -> usize {
        self.ctx.settings.save(&self.store)
    }

    /// Switch the plugin language and tell every enabled tweak.
    pub fn set_language(&mut self, language: Language) {
        if self.language() == language {
            return;
        }
        self.global.borrow_mut().language = language;
        info!("Language changed to {}", language);
        for runner in &mut self.runners {
            runner.on_language_change();
        }
    }

    /// Enable or disable one tweak as if toggled in its header.
    pub fn set_tweak_enabled(&mut self, id: &str, enabled: bool) -> bool {
        match self.runners.iter_mut().find(|r| r.id() == id) {
            Some(runner) => {
                runner.set_enabled(&mut self.ctx, enabled);
                true
            }
            None => false,
        }
    }
}

fn register_runner(
    settings: &mut SettingsSynchronizer,
    registration: &TweakRegistration,
    runner: &TweakRunner,
) -> Result<()> {
    settings.register(
        registration.tweak_key(),
        Consumer::Instance(runner.consumer().clone()),
    )?;
    if let Err(e) = settings.register(
        registration.bundle_key(),
        Consumer::Static(registration.bundle_sync()),
    ) {
        unregister_consumer(settings, registration.tweak_key(), Some(runner.consumer()));
        return Err(e);
    }
    Ok(())
}

fn unregister_runner(
    settings: &mut SettingsSynchronizer,
    registration: &TweakRegistration,
    runner: &TweakRunner,
) {
    unregister_consumer(settings, registration.tweak_key(), Some(runner.consumer()));
    unregister_consumer(settings, registration.bundle_key(), None);
}

fn unregister_consumer(
    settings: &mut SettingsSynchronizer,
    key: ConsumerKey,
    instance: Option<&SharedConsumer>,
) {
    if let Err(e) = settings.unregister(key, instance) {
        warn!("Failed to unregister {}: {}", key.name(), e);
    }
}
