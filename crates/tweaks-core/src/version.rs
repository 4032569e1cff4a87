//! Host release numbers and the closed ranges patches are gated on.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Release number of the running host build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HostVersion(pub u32);

impl HostVersion {
    pub fn release(&self) -> u32 {
        self.0
    }

    pub fn at_least(&self, release: u32) -> bool {
        self.0 >= release
    }
}

/// First release shipping the asynchronous input system
pub const ASYNC_INPUT_RELEASE: u32 = 98;

/// Features of the running host that depend on its release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostCapabilities {
    /// Whether the asynchronous input types exist
    pub async_input: bool,
}

impl HostCapabilities {
    pub fn for_version(version: HostVersion) -> Self {
        Self {
            async_input: version.at_least(ASYNC_INPUT_RELEASE),
        }
    }
}

impl fmt::Display for HostVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// Inclusive release range; `None` on either end means unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRange {
    pub min: Option<u32>,
    pub max: Option<u32>,
}

impl VersionRange {
    /// Range matching every host version
    pub const ANY: VersionRange = VersionRange {
        min: None,
        max: None,
    };

    pub fn between(min: u32, max: u32) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn since(min: u32) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    pub fn until(max: u32) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    pub fn contains(&self, version: HostVersion) -> bool {
        self.check(version).is_ok()
    }

    /// Checks `version` against both bounds, reporting the first one it violates.
    pub fn check(&self, version: HostVersion) -> Result<(), RangeViolation> {
        if let Some(min) = self.min
            && version.0 < min
        {
            return Err(RangeViolation::BelowMin(min));
        }
        if let Some(max) = self.max
            && version.0 > max
        {
            return Err(RangeViolation::AboveMax(max));
        }
        Ok(())
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min, self.max) {
            (None, None) => write!(f, "any"),
            (Some(min), None) => write!(f, "r{}..", min),
            (None, Some(max)) => write!(f, "..=r{}", max),
            (Some(min), Some(max)) => write!(f, "r{}..=r{}", min, max),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeViolation {
    BelowMin(u32),
    AboveMax(u32),
}
