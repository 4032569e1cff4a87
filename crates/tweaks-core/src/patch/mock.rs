//! In-memory host for tests.

use std::collections::{HashMap, HashSet};

use super::{
    CallFrame, ClassHandle, HookSet, Instruction, InterceptionPort, PatchHandle, TargetHandle,
};
use crate::error::{Error, Result};
use crate::version::HostVersion;

pub const MAIN_MODULE: &str = "Assembly-CSharp";

struct Installation {
    target: TargetHandle,
    hooks: HookSet,
    owner: String,
}

/// Host with a fixed class table that records installed hooks and can
/// replay calls through them.
pub struct MockHost {
    version: HostVersion,
    classes: HashMap<(String, String), Vec<String>>,
    installed: Vec<(PatchHandle, Installation)>,
    failing_tokens: HashSet<u64>,
    failing_handles: HashSet<u64>,
    next_handle: u64,
}

impl MockHost {
    pub fn new(version: u32) -> Self {
        Self {
            version: HostVersion(version),
            classes: HashMap::new(),
            installed: Vec::new(),
            failing_tokens: HashSet::new(),
            failing_handles: HashSet::new(),
            next_handle: 1,
        }
    }

    pub fn with_class(self, class: &str, methods: &[&str]) -> Self {
        self.with_module_class(MAIN_MODULE, class, methods)
    }

    pub fn with_module_class(mut self, module: &str, class: &str, methods: &[&str]) -> Self {
        self.classes.insert(
            (module.to_string(), class.to_string()),
            methods.iter().map(|m| m.to_string()).collect(),
        );
        self
    }

    /// Make installing on the overload with `token` fail
    pub fn fail_install_on_token(mut self, token: u64) -> Self {
        self.failing_tokens.insert(token);
        self
    }

    /// Make removing the installation with `handle` fail
    pub fn fail_remove_on_handle(mut self, handle: u64) -> Self {
        self.failing_handles.insert(handle);
        self
    }

    pub fn installed_count(&self) -> usize {
        self.installed.len()
    }

    pub fn installed_targets(&self) -> Vec<TargetHandle> {
        self.installed.iter().map(|(_, i)| i.target.clone()).collect()
    }

    pub fn installed_by(&self, owner: &str) -> usize {
        self.installed.iter().filter(|(_, i)| i.owner == owner).count()
    }

    /// Call `class.method` through every installed hook.
    pub fn invoke(
        &self,
        class: &str,
        method: &str,
        frame: &mut CallFrame,
        original: impl FnOnce(&mut CallFrame),
    ) -> std::result::Result<(), String> {
        let hooks: Vec<&HookSet> = self
            .installed
            .iter()
            .filter(|(_, i)| i.target.class.name == class && i.target.method == method)
            .map(|(_, i)| &i.hooks)
            .collect();

        let mut run_original = true;
        for prefix in hooks.iter().filter_map(|h| h.prefix) {
            run_original &= prefix(frame);
        }
        if run_original {
            original(frame);
        }
        for postfix in hooks.iter().filter_map(|h| h.postfix) {
            postfix(frame);
        }

        let mut fault = None;
        for finalizer in hooks.iter().filter_map(|h| h.finalizer) {
            fault = finalizer(frame, fault);
        }
        match fault {
            Some(f) => Err(f),
            None => Ok(()),
        }
    }

    /// Pass a method body through every installed rewrite hook.
    pub fn rewrite(&self, class: &str, method: &str, body: Vec<Instruction>) -> Vec<Instruction> {
        self.installed
            .iter()
            .filter(|(_, i)| i.target.class.name == class && i.target.method == method)
            .filter_map(|(_, i)| i.hooks.rewrite)
            .fold(body, |body, rewrite| rewrite(body))
    }
}

impl InterceptionPort for MockHost {
    fn host_version(&self) -> HostVersion {
        self.version
    }

    fn find_class(&self, module: Option<&str>, name: &str) -> Option<ClassHandle> {
        let module = module.unwrap_or(MAIN_MODULE);
        self.classes
            .contains_key(&(module.to_string(), name.to_string()))
            .then(|| ClassHandle {
                module: module.to_string(),
                name: name.to_string(),
            })
    }

    fn find_methods(&self, class: &ClassHandle, name: &str) -> Vec<TargetHandle> {
        let Some(methods) = self.classes.get(&(class.module.clone(), class.name.clone())) else {
            return Vec::new();
        };
        methods
            .iter()
            .enumerate()
            .filter(|(_, m)| m.as_str() == name)
            .map(|(token, m)| TargetHandle {
                class: class.clone(),
                method: m.clone(),
                token: token as u64,
            })
            .collect()
    }

    fn install(
        &mut self,
        target: &TargetHandle,
        hooks: &HookSet,
        owner: &str,
    ) -> Result<PatchHandle> {
        if self.failing_tokens.contains(&target.token) {
            return Err(Error::InstallFailed {
                target: target.to_string(),
                message: "method body could not be compiled".to_string(),
            });
        }

        let handle = PatchHandle(self.next_handle);
        self.next_handle += 1;
        self.installed.push((
            handle,
            Installation {
                target: target.clone(),
                hooks: *hooks,
                owner: owner.to_string(),
            },
        ));
        Ok(handle)
    }

    fn remove(&mut self, handle: PatchHandle) -> Result<()> {
        if self.failing_handles.contains(&handle.0) {
            return Err(Error::RemoveFailed {
                handle: handle.0,
                message: "method is on the call stack".to_string(),
            });
        }
        let Some(idx) = self.installed.iter().position(|(h, _)| *h == handle) else {
            return Err(Error::RemoveFailed {
                handle: handle.0,
                message: "not installed".to_string(),
            });
        };
        self.installed.remove(idx);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn double_first_arg(frame: &mut CallFrame) -> bool {
        if let Some(v) = frame.args.first().and_then(|v| v.as_i64()) {
            frame.args[0] = json!(v * 2);
        }
        true
    }

    fn block_original(_frame: &mut CallFrame) -> bool {
        false
    }

    fn force_result(frame: &mut CallFrame) {
        frame.result = json!(false);
    }

    fn swallow(_frame: &mut CallFrame, _fault: Option<String>) -> Option<String> {
        None
    }

    fn raise(_frame: &mut CallFrame, _fault: Option<String>) -> Option<String> {
        Some("overload".to_string())
    }

    fn strip_nops(body: Vec<Instruction>) -> Vec<Instruction> {
        body.into_iter().filter(|i| i.opcode != "nop").collect()
    }

    fn install(host: &mut MockHost, class: &str, method: &str, hooks: HookSet) -> PatchHandle {
        let class = host.find_class(None, class).unwrap();
        let target = host.find_methods(&class, method).remove(0);
        host.install(&target, &hooks, "tweaks.test").unwrap()
    }

    #[test]
    fn test_invoke_runs_hooks_in_order() {
        let mut host = MockHost::new(100).with_class("scrMisc", &["IsValidHit"]);
        install(
            &mut host,
            "scrMisc",
            "IsValidHit",
            HookSet {
                prefix: Some(double_first_arg),
                postfix: Some(force_result),
                ..Default::default()
            },
        );

        let mut frame = CallFrame::new(vec![json!(3)]);
        let mut seen = None;
        host.invoke("scrMisc", "IsValidHit", &mut frame, |f| {
            seen = f.args[0].as_i64();
            f.result = json!(true);
        })
        .unwrap();

        assert_eq!(seen, Some(6));
        assert_eq!(frame.result, json!(false));
    }

    #[test]
    fn test_prefix_can_skip_original() {
        let mut host = MockHost::new(100).with_class("scrController", &["ShowHitText"]);
        install(
            &mut host,
            "scrController",
            "ShowHitText",
            HookSet {
                prefix: Some(block_original),
                ..Default::default()
            },
        );

        let mut called = false;
        host.invoke("scrController", "ShowHitText", &mut CallFrame::default(), |_| called = true)
            .unwrap();
        assert!(!called);
    }

    #[test]
    fn test_finalizers_decide_fault() {
        let mut host = MockHost::new(100).with_class("scrCountdown", &["ShowOverload"]);
        install(
            &mut host,
            "scrCountdown",
            "ShowOverload",
            HookSet {
                finalizer: Some(raise),
                ..Default::default()
            },
        );
        let result = host.invoke("scrCountdown", "ShowOverload", &mut CallFrame::default(), |_| {});
        assert_eq!(result, Err("overload".to_string()));

        install(
            &mut host,
            "scrCountdown",
            "ShowOverload",
            HookSet {
                finalizer: Some(swallow),
                ..Default::default()
            },
        );
        let result = host.invoke("scrCountdown", "ShowOverload", &mut CallFrame::default(), |_| {});
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn test_rewrite_and_remove() {
        let mut host = MockHost::new(100).with_class("scrPlanet", &["Update_RefreshAngles"]);
        let handle = install(
            &mut host,
            "scrPlanet",
            "Update_RefreshAngles",
            HookSet {
                rewrite: Some(strip_nops),
                ..Default::default()
            },
        );

        let body = vec![
            Instruction {
                opcode: "nop".to_string(),
                operand: None,
            },
            Instruction {
                opcode: "ret".to_string(),
                operand: None,
            },
        ];
        assert_eq!(host.rewrite("scrPlanet", "Update_RefreshAngles", body.clone()).len(), 1);

        host.remove(handle).unwrap();
        assert_eq!(host.rewrite("scrPlanet", "Update_RefreshAngles", body).len(), 2);
        assert!(host.remove(handle).is_err());
    }
}
