use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use super::{SettingsFlags, TweakSettings};

/// Languages the plugin's strings are available in.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    IntoStaticStr,
    Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Language {
    #[default]
    English,
    Korean,
    Spanish,
    Polish,
    French,
    Vietnamese,
    ChineseSimplified,
}

/// Settings shared by the whole plugin rather than one tweak.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GlobalSettings {
    #[serde(flatten)]
    pub flags: SettingsFlags,
    pub language: Language,
}

impl TweakSettings for GlobalSettings {
    const NAME: &'static str = "GlobalSettings";

    fn flags(&self) -> &SettingsFlags {
        &self.flags
    }

    fn flags_mut(&mut self) -> &mut SettingsFlags {
        &mut self.flags
    }
}
