use std::fmt;

use super::HookSet;
use crate::error::Result;
use crate::version::HostVersion;

/// A class resolved in one of the host's modules.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassHandle {
    pub module: String,
    pub name: String,
}

/// One concrete method (overload) that can be intercepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetHandle {
    pub class: ClassHandle,
    pub method: String,
    /// Host-specific identity of the overload
    pub token: u64,
}

impl fmt::Display for TargetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}::{}.{}#{}",
            self.class.module, self.class.name, self.method, self.token
        )
    }
}

/// An installed interception.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatchHandle(pub u64);

/// Everything the framework needs from the host to patch it.
pub trait InterceptionPort {
    /// Release number of the running host build
    fn host_version(&self) -> HostVersion;

    /// Look a class up by name, in `module` or the host's main module.
    fn find_class(&self, module: Option<&str>, name: &str) -> Option<ClassHandle>;

    /// All overloads of `name` declared on `class`.
    fn find_methods(&self, class: &ClassHandle, name: &str) -> Vec<TargetHandle>;

    fn install(&mut self, target: &TargetHandle, hooks: &HookSet, owner: &str)
    -> Result<PatchHandle>;

    fn remove(&mut self, handle: PatchHandle) -> Result<()>;
}
