use crate::patch::{InterceptionPort, PatchTable};
use crate::settings::SettingsSynchronizer;
use crate::version::{HostCapabilities, HostVersion};

/// State shared by every runner: loaded settings and consumer bindings,
/// the applied-patch table, and the host's interception port.
///
/// The three are always mutated together from the host's main thread.
pub struct TweakContext {
    pub(crate) settings: SettingsSynchronizer,
    pub(crate) patches: PatchTable,
    pub(crate) port: Box<dyn InterceptionPort>,
}

impl TweakContext {
    pub fn new(port: Box<dyn InterceptionPort>) -> Self {
        Self {
            settings: SettingsSynchronizer::new(),
            patches: PatchTable::new(),
            port,
        }
    }

    pub fn host_version(&self) -> HostVersion {
        self.port.host_version()
    }

    pub fn capabilities(&self) -> HostCapabilities {
        HostCapabilities::for_version(self.host_version())
    }

    pub fn settings(&self) -> &SettingsSynchronizer {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut SettingsSynchronizer {
        &mut self.settings
    }

    pub fn patches(&self) -> &PatchTable {
        &self.patches
    }

    pub fn port(&self) -> &dyn InterceptionPort {
        self.port.as_ref()
    }

    pub fn port_mut(&mut self) -> &mut dyn InterceptionPort {
        self.port.as_mut()
    }
}
