use std::path::PathBuf;

/// Configuration for the Plugin
#[derive(Debug, Clone)]
pub struct PluginConfig {
    /// Directory holding one JSON file per settings record
    pub settings_dir: PathBuf,
    /// Prefix of every patch owner name, `<plugin_id>.<tweak_id>`
    pub plugin_id: String,
    /// Whether hiding the settings GUI also saves settings
    pub save_on_hide_gui: bool,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            settings_dir: PathBuf::from("Mods/Tweaks"),
            plugin_id: "tweaks".to_string(),
            save_on_hide_gui: true,
        }
    }
}

impl PluginConfig {
    /// Create a new configuration builder
    pub fn builder() -> PluginConfigBuilder {
        PluginConfigBuilder::default()
    }
}

/// Builder for PluginConfig
#[derive(Debug, Clone, Default)]
pub struct PluginConfigBuilder {
    settings_dir: Option<PathBuf>,
    plugin_id: Option<String>,
    save_on_hide_gui: Option<bool>,
}

impl PluginConfigBuilder {
    pub fn settings_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.settings_dir = Some(path.into());
        self
    }

    pub fn plugin_id(mut self, id: impl Into<String>) -> Self {
        self.plugin_id = Some(id.into());
        self
    }

    pub fn save_on_hide_gui(mut self, enabled: bool) -> Self {
        self.save_on_hide_gui = Some(enabled);
        self
    }

    pub fn build(self) -> PluginConfig {
        let default = PluginConfig::default();
        PluginConfig {
            settings_dir: self.settings_dir.unwrap_or(default.settings_dir),
            plugin_id: self.plugin_id.unwrap_or(default.plugin_id),
            save_on_hide_gui: self.save_on_hide_gui.unwrap_or(default.save_on_hide_gui),
        }
    }
}
