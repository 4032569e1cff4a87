//! Version-gated patch dispatch.
//!
//! Every patch is resolved against the running host before it is applied.
//! Patches whose target class or method is missing, or whose version range
//! excludes the host, resolve to [`PatchState::Invalid`] and are skipped
//! without error, so one plugin build works across many host releases.

use std::collections::{HashMap, HashSet};
use std::fmt;

use tracing::{debug, info, warn};

use super::{InterceptionPort, PatchDescriptor, PatchHandle, TargetHandle};
use crate::error::{Error, Result};
use crate::version::{HostVersion, RangeViolation};

/// Why a patch does not apply to the running host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidReason {
    BelowMinVersion { min: u32, current: HostVersion },
    AboveMaxVersion { max: u32, current: HostVersion },
    ClassNotFound { class: String },
    MethodNotFound { class: String, method: String },
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BelowMinVersion { min, current } => {
                write!(f, "host {} is older than r{}", current, min)
            }
            Self::AboveMaxVersion { max, current } => {
                write!(f, "host {} is newer than r{}", current, max)
            }
            Self::ClassNotFound { class } => write!(f, "class {} not found", class),
            Self::MethodNotFound { class, method } => {
                write!(f, "method {}.{} not found", class, method)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchState {
    Unresolved,
    Valid,
    Invalid(InvalidReason),
    Applied,
    Unapplied,
}

/// One patch of a tweak, tracked through resolution and installation.
pub struct TweakPatch {
    descriptor: PatchDescriptor,
    targets: Vec<TargetHandle>,
    handles: Vec<PatchHandle>,
    state: PatchState,
}

impl TweakPatch {
    pub fn new(descriptor: PatchDescriptor) -> Self {
        Self {
            descriptor,
            targets: Vec::new(),
            handles: Vec::new(),
            state: PatchState::Unresolved,
        }
    }

    pub fn id(&self) -> &str {
        &self.descriptor.id
    }

    pub fn descriptor(&self) -> &PatchDescriptor {
        &self.descriptor
    }

    pub fn state(&self) -> &PatchState {
        &self.state
    }

    pub fn targets(&self) -> &[TargetHandle] {
        &self.targets
    }

    /// Whether the patch can be applied to the running host
    pub fn is_valid(&self) -> bool {
        matches!(
            self.state,
            PatchState::Valid | PatchState::Applied | PatchState::Unapplied
        )
    }

    pub fn is_applied(&self) -> bool {
        self.state == PatchState::Applied
    }

    /// Resolve the target methods and check the version range.
    ///
    /// Resolution never fails; an inapplicable patch becomes `Invalid`.
    pub fn resolve(&mut self, port: &dyn InterceptionPort) -> &PatchState {
        if self.is_applied() {
            return &self.state;
        }

        self.targets.clear();
        self.state = match self.check(port) {
            Ok(targets) => {
                self.targets = targets;
                PatchState::Valid
            }
            Err(reason) => {
                debug!(
                    "Patch {} is inapplicable: {} (range {}, class {}, method {})",
                    self.descriptor.id,
                    reason,
                    self.descriptor.versions,
                    self.descriptor.class_name,
                    self.descriptor.method_name
                );
                PatchState::Invalid(reason)
            }
        };
        &self.state
    }

    fn check(&self, port: &dyn InterceptionPort) -> std::result::Result<Vec<TargetHandle>, InvalidReason> {
        let d = &self.descriptor;
        let current = port.host_version();
        d.versions.check(current).map_err(|violation| match violation {
            RangeViolation::BelowMin(min) => InvalidReason::BelowMinVersion { min, current },
            RangeViolation::AboveMax(max) => InvalidReason::AboveMaxVersion { max, current },
        })?;

        let class = port
            .find_class(d.module.as_deref(), &d.class_name)
            .ok_or_else(|| InvalidReason::ClassNotFound {
                class: d.class_name.clone(),
            })?;

        let targets = port.find_methods(&class, &d.method_name);
        if targets.is_empty() {
            return Err(InvalidReason::MethodNotFound {
                class: d.class_name.clone(),
                method: d.method_name.clone(),
            });
        }
        Ok(targets)
    }

    /// Install the hooks on every resolved target. Returns `false` when the
    /// patch was skipped (invalid, unresolved, or already applied).
    pub fn apply(&mut self, port: &mut dyn InterceptionPort, owner: &str) -> Result<bool> {
        if !matches!(self.state, PatchState::Valid | PatchState::Unapplied) {
            return Ok(false);
        }

        debug!(
            "Applying patch {} with {:?}",
            self.descriptor.id,
            self.descriptor.hooks.kinds()
        );
        for target in &self.targets {
            match port.install(target, &self.descriptor.hooks, owner) {
                Ok(handle) => self.handles.push(handle),
                Err(e) => {
                    // Leave nothing half-installed
                    for handle in self.handles.drain(..) {
                        if let Err(undo) = port.remove(handle) {
                            warn!("Failed to roll back {:?}: {}", handle, undo);
                        }
                    }
                    return Err(e);
                }
            }
        }

        self.state = PatchState::Applied;
        Ok(true)
    }

    /// Remove every installed hook. Returns `false` when nothing was applied.
    pub fn unapply(&mut self, port: &mut dyn InterceptionPort) -> Result<bool> {
        if !self.is_applied() {
            return Ok(false);
        }

        debug!("Cancelling patch {}", self.descriptor.id);
        let mut first_error = None;
        let mut remaining = Vec::new();
        for handle in self.handles.drain(..) {
            if let Err(e) = port.remove(handle) {
                remaining.push(handle);
                first_error.get_or_insert(e);
            }
        }
        self.handles = remaining;

        match first_error {
            Some(e) => Err(e),
            None => {
                self.state = PatchState::Unapplied;
                Ok(true)
            }
        }
    }
}

/// Which owner currently holds each applied patch ID.
#[derive(Debug, Default)]
pub struct PatchTable {
    applied: HashMap<String, String>,
}

impl PatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claim(&mut self, patch_id: &str, owner: &str) -> Result<()> {
        match self.applied.get(patch_id) {
            Some(current) if current != owner => Err(Error::PatchConflict {
                patch_id: patch_id.to_string(),
                owner: current.clone(),
            }),
            Some(_) => Ok(()),
            None => {
                self.applied.insert(patch_id.to_string(), owner.to_string());
                Ok(())
            }
        }
    }

    pub fn release(&mut self, patch_id: &str, owner: &str) {
        if self.owner_of(patch_id) == Some(owner) {
            self.applied.remove(patch_id);
        }
    }

    pub fn owner_of(&self, patch_id: &str) -> Option<&str> {
        self.applied.get(patch_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.applied.len()
    }

    pub fn is_empty(&self) -> bool {
        self.applied.is_empty()
    }
}

/// The patches of one tweak.
pub struct PatchDispatcher {
    owner: String,
    patches: Vec<TweakPatch>,
}

impl PatchDispatcher {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            patches: Vec::new(),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn patches(&self) -> &[TweakPatch] {
        &self.patches
    }

    /// Replace the tracked patches. Patches still applied are kept; of two
    /// descriptors sharing an ID only the first is kept.
    pub fn load(&mut self, descriptors: Vec<PatchDescriptor>) {
        self.patches.retain(TweakPatch::is_applied);
        let mut seen: HashSet<String> = self.patches.iter().map(|p| p.id().to_string()).collect();

        for descriptor in descriptors {
            if !seen.insert(descriptor.id.clone()) {
                if !self.patches.iter().any(|p| p.is_applied() && p.id() == descriptor.id) {
                    warn!(
                        "Conflicting patch ID {} in {}; keeping the first declaration",
                        descriptor.id, self.owner
                    );
                }
                continue;
            }
            self.patches.push(TweakPatch::new(descriptor));
        }
    }

    /// Resolve every patch. Returns how many are valid.
    pub fn resolve_all(&mut self, port: &dyn InterceptionPort) -> usize {
        let mut valid = 0;
        for patch in &mut self.patches {
            if patch.resolve(port) == &PatchState::Valid {
                valid += 1;
            }
        }
        valid
    }

    /// Apply every valid patch; failures are logged and skipped.
    /// Returns how many were newly applied.
    pub fn apply_all(&mut self, port: &mut dyn InterceptionPort, table: &mut PatchTable) -> usize {
        let mut applied = 0;
        for patch in &mut self.patches {
            if !patch.is_valid() || patch.is_applied() {
                continue;
            }
            if let Err(e) = table.claim(patch.id(), &self.owner) {
                warn!("Skipping patch {}: {}", patch.id(), e);
                continue;
            }
            match patch.apply(port, &self.owner) {
                Ok(true) => applied += 1,
                Ok(false) => table.release(patch.id(), &self.owner),
                Err(e) => {
                    warn!("Failed to apply patch {}: {}", patch.id(), e);
                    table.release(patch.id(), &self.owner);
                }
            }
        }
        if applied > 0 {
            info!("Applied {} patch(es) for {}", applied, self.owner);
        }
        applied
    }

    /// Remove every applied patch. Returns how many were removed.
    pub fn unapply_all(&mut self, port: &mut dyn InterceptionPort, table: &mut PatchTable) -> usize {
        let mut removed = 0;
        for patch in &mut self.patches {
            match patch.unapply(port) {
                Ok(true) => {
                    table.release(patch.id(), &self.owner);
                    removed += 1;
                }
                Ok(false) => {}
                Err(e) => warn!("Failed to remove patch {}: {}", patch.id(), e),
            }
        }
        removed
    }

    pub fn applied_count(&self) -> usize {
        self.patches.iter().filter(|p| p.is_applied()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::mock::MockHost;
    use crate::patch::CallFrame;
    use crate::version::VersionRange;

    fn noop_postfix(_frame: &mut CallFrame) {}

    fn patch(id: &str, class: &str, method: &str, versions: VersionRange) -> PatchDescriptor {
        PatchDescriptor::new(id, class, method)
            .versions(versions)
            .postfix(noop_postfix)
    }

    fn host(version: u32) -> MockHost {
        MockHost::new(version).with_class("scrController", &["Update", "Fail2_Update"])
    }

    #[test]
    fn test_version_bounds_are_inclusive() {
        for (version, expected) in [(15, true), (10, true), (20, true), (9, false), (21, false)] {
            let host = host(version);
            let mut p = TweakPatch::new(patch("P", "scrController", "Update", VersionRange::between(10, 20)));
            p.resolve(&host);
            assert_eq!(p.is_valid(), expected, "host r{}", version);
        }
    }

    #[test]
    fn test_invalid_reasons() {
        let host = host(50);

        let mut below = TweakPatch::new(patch("A", "scrController", "Update", VersionRange::since(60)));
        assert_eq!(
            below.resolve(&host),
            &PatchState::Invalid(InvalidReason::BelowMinVersion {
                min: 60,
                current: HostVersion(50)
            })
        );

        let mut above = TweakPatch::new(patch("B", "scrController", "Update", VersionRange::until(40)));
        assert!(matches!(
            above.resolve(&host),
            PatchState::Invalid(InvalidReason::AboveMaxVersion { max: 40, .. })
        ));

        let mut no_class = TweakPatch::new(patch("C", "scnEditor", "Awake", VersionRange::ANY));
        assert!(matches!(
            no_class.resolve(&host),
            PatchState::Invalid(InvalidReason::ClassNotFound { .. })
        ));

        let mut no_method = TweakPatch::new(patch("D", "scrController", "Restart", VersionRange::ANY));
        assert!(matches!(
            no_method.resolve(&host),
            PatchState::Invalid(InvalidReason::MethodNotFound { .. })
        ));
    }

    #[test]
    fn test_unbounded_valid_when_target_exists() {
        for version in [0, 71, 130] {
            let host = host(version);
            let mut p = TweakPatch::new(patch("P", "scrController", "Fail2_Update", VersionRange::ANY));
            assert_eq!(p.resolve(&host), &PatchState::Valid);
        }
    }

    #[test]
    fn test_hookless_patch_resolves_valid() {
        let host = host(100);
        let mut p = TweakPatch::new(PatchDescriptor::new("P", "scrController", "Update"));
        assert_eq!(p.resolve(&host), &PatchState::Valid);
        assert_eq!(p.targets().len(), 1);
    }

    #[test]
    fn test_failed_remove_keeps_patch_applied() {
        let mut host = MockHost::new(100)
            .with_class("scrPlanet", &["SwitchChosen", "SwitchChosen"])
            .fail_remove_on_handle(2);
        let mut table = PatchTable::new();
        let mut dispatcher = PatchDispatcher::new("tweaks.planet");
        dispatcher.load(vec![patch("Planet.SwitchChosen", "scrPlanet", "SwitchChosen", VersionRange::ANY)]);
        dispatcher.resolve_all(&host);
        assert_eq!(dispatcher.apply_all(&mut host, &mut table), 1);

        assert_eq!(dispatcher.unapply_all(&mut host, &mut table), 0);
        assert!(dispatcher.patches()[0].is_applied());
        assert_eq!(host.installed_count(), 1);
        assert_eq!(table.owner_of("Planet.SwitchChosen"), Some("tweaks.planet"));
    }

    #[test]
    fn test_alternate_module_lookup() {
        let host = MockHost::new(100).with_module_class("RDTools", "RDInput", &["GetMain"]);
        let mut in_main = TweakPatch::new(patch("P", "RDInput", "GetMain", VersionRange::ANY));
        assert_ne!(in_main.resolve(&host), &PatchState::Valid);

        let mut in_module = TweakPatch::new(
            patch("P", "RDInput", "GetMain", VersionRange::ANY).in_module("RDTools"),
        );
        assert_eq!(in_module.resolve(&host), &PatchState::Valid);
    }

    #[test]
    fn test_apply_is_idempotent() {
        let mut host = host(100);
        let mut p = TweakPatch::new(patch("P", "scrController", "Update", VersionRange::ANY));
        p.resolve(&host);

        assert!(p.apply(&mut host, "tweaks.test").unwrap());
        assert!(!p.apply(&mut host, "tweaks.test").unwrap());
        assert_eq!(host.installed_count(), 1);

        assert!(p.unapply(&mut host).unwrap());
        assert!(!p.unapply(&mut host).unwrap());
        assert_eq!(host.installed_count(), 0);
        assert_eq!(p.state(), &PatchState::Unapplied);
    }

    #[test]
    fn test_apply_covers_every_overload() {
        let mut host = MockHost::new(100).with_class("scrPlanet", &["MoveToNextFloor", "MoveToNextFloor"]);
        let mut p = TweakPatch::new(patch("P", "scrPlanet", "MoveToNextFloor", VersionRange::ANY));
        p.resolve(&host);
        assert_eq!(p.targets().len(), 2);

        p.apply(&mut host, "tweaks.test").unwrap();
        assert_eq!(host.installed_count(), 2);
    }

    #[test]
    fn test_failed_install_rolls_back() {
        let mut host = MockHost::new(100)
            .with_class("scrPlanet", &["SwitchChosen", "SwitchChosen"])
            .fail_install_on_token(1);
        let mut p = TweakPatch::new(patch("P", "scrPlanet", "SwitchChosen", VersionRange::ANY));
        p.resolve(&host);

        assert!(p.apply(&mut host, "tweaks.test").is_err());
        assert_eq!(host.installed_count(), 0);
        assert_eq!(p.state(), &PatchState::Valid);
    }

    #[test]
    fn test_invalid_patch_is_skipped_on_apply() {
        let mut host = host(100);
        let mut p = TweakPatch::new(patch("P", "scnEditor", "Awake", VersionRange::ANY));
        p.resolve(&host);
        assert!(!p.apply(&mut host, "tweaks.test").unwrap());
        assert_eq!(host.installed_count(), 0);
    }

    #[test]
    fn test_dispatcher_keeps_first_duplicate() {
        let mut host = host(100);
        let mut table = PatchTable::new();
        let mut dispatcher = PatchDispatcher::new("tweaks.keyLimiter");
        dispatcher.load(vec![
            patch("KeyLimiter.Update", "scrController", "Update", VersionRange::ANY),
            patch("KeyLimiter.Update", "scrController", "Fail2_Update", VersionRange::ANY),
        ]);
        assert_eq!(dispatcher.patches().len(), 1);

        dispatcher.resolve_all(&host);
        assert_eq!(dispatcher.apply_all(&mut host, &mut table), 1);
        assert_eq!(host.installed_targets()[0].method, "Update");
    }

    #[test]
    fn test_dispatcher_partial_apply() {
        let mut host = host(100);
        let mut table = PatchTable::new();
        let mut dispatcher = PatchDispatcher::new("tweaks.restrict");
        dispatcher.load(vec![
            patch("Restrict.Update", "scrController", "Update", VersionRange::ANY),
            patch("Restrict.Missing", "scrMissing", "Update", VersionRange::ANY),
        ]);

        assert_eq!(dispatcher.resolve_all(&host), 1);
        assert_eq!(dispatcher.apply_all(&mut host, &mut table), 1);
        assert_eq!(dispatcher.applied_count(), 1);
        assert_eq!(table.owner_of("Restrict.Update"), Some("tweaks.restrict"));

        assert_eq!(dispatcher.unapply_all(&mut host, &mut table), 1);
        assert_eq!(dispatcher.applied_count(), 0);
        assert!(table.is_empty());
    }

    #[test]
    fn test_patch_table_conflict_across_owners() {
        let mut host = host(100);
        let mut table = PatchTable::new();
        let mut first = PatchDispatcher::new("tweaks.a");
        let mut second = PatchDispatcher::new("tweaks.b");
        first.load(vec![patch("Shared", "scrController", "Update", VersionRange::ANY)]);
        second.load(vec![patch("Shared", "scrController", "Update", VersionRange::ANY)]);

        first.resolve_all(&host);
        second.resolve_all(&host);
        assert_eq!(first.apply_all(&mut host, &mut table), 1);
        assert_eq!(second.apply_all(&mut host, &mut table), 0);
        assert_eq!(host.installed_by("tweaks.a"), 1);
        assert_eq!(host.installed_by("tweaks.b"), 0);
        assert!(matches!(
            table.claim("Shared", "tweaks.b"),
            Err(Error::PatchConflict { owner, .. }) if owner == "tweaks.a"
        ));
    }
}
