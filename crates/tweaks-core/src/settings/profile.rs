use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;

/// One of several alternative states kept inside a settings record, such as
/// a key layout or an opacity preset.
pub trait SettingsProfile: Serialize + DeserializeOwned {
    /// Deep copy through the persisted form. Transient fields come back at
    /// their defaults, exactly as after a save and reload.
    fn copy(&self) -> Result<Self> {
        let value = serde_json::to_value(self)?;
        Ok(serde_json::from_value(value)?)
    }
}
