use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, IntoStaticStr};

use crate::version::VersionRange;

/// Arguments and return value of one intercepted call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallFrame {
    pub args: Vec<Value>,
    pub result: Value,
}

impl CallFrame {
    pub fn new(args: Vec<Value>) -> Self {
        Self {
            args,
            result: Value::Null,
        }
    }
}

/// One instruction of a method body, as handed to rewrite hooks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    pub opcode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operand: Option<Value>,
}

/// Runs before the original; returning `false` skips it.
pub type PrefixHook = fn(&mut CallFrame) -> bool;
/// Runs after the original.
pub type PostfixHook = fn(&mut CallFrame);
/// Rewrites the original body once, at install time.
pub type RewriteHook = fn(Vec<Instruction>) -> Vec<Instruction>;
/// Always runs last; receives the pending fault and returns the one to raise.
pub type FinalizerHook = fn(&mut CallFrame, Option<String>) -> Option<String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
pub enum HookKind {
    Prefix,
    Postfix,
    Rewrite,
    Finalizer,
}

/// The hooks one patch binds to each of its target methods.
#[derive(Debug, Clone, Copy, Default)]
pub struct HookSet {
    pub prefix: Option<PrefixHook>,
    pub postfix: Option<PostfixHook>,
    pub rewrite: Option<RewriteHook>,
    pub finalizer: Option<FinalizerHook>,
}

impl HookSet {
    pub fn kinds(&self) -> Vec<HookKind> {
        let mut kinds = Vec::with_capacity(4);
        if self.prefix.is_some() {
            kinds.push(HookKind::Prefix);
        }
        if self.postfix.is_some() {
            kinds.push(HookKind::Postfix);
        }
        if self.rewrite.is_some() {
            kinds.push(HookKind::Rewrite);
        }
        if self.finalizer.is_some() {
            kinds.push(HookKind::Finalizer);
        }
        kinds
    }

    pub fn is_empty(&self) -> bool {
        self.kinds().is_empty()
    }
}

/// Metadata for one interception point.
///
/// ```ignore
/// PatchDescriptor::new("RestrictGameplay.IsValidHit", "scrMisc", "IsValidHit")
///     .min_version(80)
///     .postfix(is_valid_hit_postfix)
/// ```
#[derive(Debug, Clone)]
pub struct PatchDescriptor {
    /// Unique patch ID
    pub id: String,
    /// Module to look the class up in; `None` means the host's main module
    pub module: Option<String>,
    pub class_name: String,
    pub method_name: String,
    pub versions: VersionRange,
    pub hooks: HookSet,
}

impl PatchDescriptor {
    pub fn new(
        id: impl Into<String>,
        class_name: impl Into<String>,
        method_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            module: None,
            class_name: class_name.into(),
            method_name: method_name.into(),
            versions: VersionRange::ANY,
            hooks: HookSet::default(),
        }
    }

    pub fn in_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn min_version(mut self, min: u32) -> Self {
        self.versions.min = Some(min);
        self
    }

    pub fn max_version(mut self, max: u32) -> Self {
        self.versions.max = Some(max);
        self
    }

    pub fn versions(mut self, versions: VersionRange) -> Self {
        self.versions = versions;
        self
    }

    pub fn prefix(mut self, hook: PrefixHook) -> Self {
        self.hooks.prefix = Some(hook);
        self
    }

    pub fn postfix(mut self, hook: PostfixHook) -> Self {
        self.hooks.postfix = Some(hook);
        self
    }

    pub fn rewrite(mut self, hook: RewriteHook) -> Self {
        self.hooks.rewrite = Some(hook);
        self
    }

    pub fn finalizer(mut self, hook: FinalizerHook) -> Self {
        self.hooks.finalizer = Some(hook);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skip_original(_frame: &mut CallFrame) -> bool {
        false
    }

    fn swallow_fault(_frame: &mut CallFrame, _fault: Option<String>) -> Option<String> {
        None
    }

    #[test]
    fn test_builder_sets_range_and_hooks() {
        let patch = PatchDescriptor::new("HideUi.Judgment", "scrHitTextMesh", "Show")
            .in_module("Assembly-CSharp")
            .min_version(72)
            .max_version(97)
            .prefix(skip_original)
            .finalizer(swallow_fault);

        assert_eq!(patch.module.as_deref(), Some("Assembly-CSharp"));
        assert_eq!(patch.versions, VersionRange::between(72, 97));
        assert_eq!(patch.hooks.kinds(), vec![HookKind::Prefix, HookKind::Finalizer]);
    }

    #[test]
    fn test_empty_hook_set() {
        let patch = PatchDescriptor::new("Empty", "scrController", "Update");
        assert!(patch.hooks.is_empty());
        assert!(patch.versions.is_unbounded());
    }
}
