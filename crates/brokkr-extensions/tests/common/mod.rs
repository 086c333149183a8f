//! Shared fixtures for the planner and executor integration tests:
//! in-memory repositories, a recording handler, a recording notifier and a
//! counting progress listener.

#![allow(dead_code)]

use brokkr_core::error::{Error, Result};
use brokkr_core::types::{
    Extension, ExtensionId, InstalledExtension, LocalExtension, Namespace,
};
use brokkr_extensions::events::{EventEnvelope, EventNotifier};
use brokkr_extensions::handler::ExtensionHandler;
use brokkr_extensions::progress::ProgressListener;
use brokkr_extensions::repository::{InstalledExtensionRepository, LocalExtensionRepository};
use brokkr_extensions::request::ExtensionRequest;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub const SCRIPT: &str = "script";

/// Build an extension descriptor with the `script` type tag
pub fn extension(name: &str, version: &str) -> Extension {
    Extension::new(ExtensionId::parse(name, version).unwrap(), SCRIPT)
}

pub fn id(name: &str, version: &str) -> ExtensionId {
    ExtensionId::parse(name, version).unwrap()
}

/// Install a descriptor into the given concrete namespaces
pub fn installed_in(ext: Extension, namespaces: &[&str]) -> InstalledExtension {
    InstalledExtension::on_namespaces(
        ext,
        namespaces.iter().map(|ns| ns.to_string()),
        false,
    )
}

/// Install a descriptor on all namespaces
pub fn installed_global(ext: Extension) -> InstalledExtension {
    InstalledExtension::on_all_namespaces(ext, false)
}

// ---------------------------------------------------------------------------
// Local repository fake

/// In-memory local extension store
#[derive(Default)]
pub struct FakeLocalRepository {
    extensions: Mutex<BTreeMap<ExtensionId, LocalExtension>>,
}

impl FakeLocalRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, ext: Extension) {
        let local = LocalExtension::new(ext);
        self.extensions
            .lock()
            .unwrap()
            .insert(local.id().clone(), local);
    }
}

impl LocalExtensionRepository for FakeLocalRepository {
    fn resolve(&self, id: &ExtensionId) -> Result<LocalExtension> {
        self.extensions
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| Error::ResolveFailed {
                id: id.clone(),
                source: None,
            })
    }
}

// ---------------------------------------------------------------------------
// Installed repository fake

#[derive(Default)]
struct InstalledState {
    // Insertion order is the iteration order of backward-dependency
    // lookups, which the planner tests rely on.
    records: Vec<InstalledExtension>,
    uninstall_calls: usize,
    fail_uninstall_of: BTreeSet<ExtensionId>,
    fail_backward_dependencies: bool,
}

/// In-memory installed-extension registry
#[derive(Default)]
pub struct FakeInstalledRepository {
    state: Mutex<InstalledState>,
}

impl FakeInstalledRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, record: InstalledExtension) {
        self.state.lock().unwrap().records.push(record);
    }

    /// Make deregistration of the given release fail
    pub fn fail_uninstall_of(&self, id: ExtensionId) {
        self.state.lock().unwrap().fail_uninstall_of.insert(id);
    }

    /// Make every backward-dependency lookup fail
    pub fn fail_backward_dependencies(&self) {
        self.state.lock().unwrap().fail_backward_dependencies = true;
    }

    pub fn uninstall_calls(&self) -> usize {
        self.state.lock().unwrap().uninstall_calls
    }

    pub fn is_installed(&self, id: &ExtensionId) -> bool {
        self.state
            .lock()
            .unwrap()
            .records
            .iter()
            .any(|record| record.id() == id)
    }

    pub fn record_count(&self) -> usize {
        self.state.lock().unwrap().records.len()
    }

    fn present_in(record: &InstalledExtension, namespace: &Namespace) -> bool {
        match namespace {
            Namespace::All => true,
            Namespace::Scoped(name) => match &record.namespaces {
                None => true,
                Some(set) => set.contains(name),
            },
        }
    }

    fn depends_on(record: &InstalledExtension, id: &ExtensionId) -> bool {
        record.extension.dependencies.contains(&id.name)
    }
}

impl InstalledExtensionRepository for FakeInstalledRepository {
    fn install_extension(
        &self,
        extension: &LocalExtension,
        namespace: &Namespace,
        dependency: bool,
    ) -> Result<InstalledExtension> {
        let record = match namespace {
            Namespace::All => {
                InstalledExtension::on_all_namespaces(extension.extension.clone(), dependency)
            }
            Namespace::Scoped(name) => InstalledExtension::on_namespaces(
                extension.extension.clone(),
                [name.clone()],
                dependency,
            ),
        };
        self.state.lock().unwrap().records.push(record.clone());
        Ok(record)
    }

    fn uninstall_extension(
        &self,
        extension: &InstalledExtension,
        namespace: &Namespace,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.uninstall_calls += 1;

        if state.fail_uninstall_of.contains(extension.id()) {
            return Err(Error::uninstall_failed(
                extension.id().clone(),
                "registry refused the removal",
            ));
        }

        let position = state
            .records
            .iter()
            .position(|record| record.id() == extension.id())
            .ok_or_else(|| Error::uninstall_failed_bare(extension.id().clone()))?;

        match namespace {
            Namespace::All => {
                state.records.remove(position);
            }
            Namespace::Scoped(name) => {
                let record = &mut state.records[position];
                match &mut record.namespaces {
                    Some(set) => {
                        set.remove(name);
                        if set.is_empty() {
                            state.records.remove(position);
                        }
                    }
                    // A record installed on all namespaces cannot be
                    // removed from a single one.
                    None => {
                        return Err(Error::uninstall_failed_bare(extension.id().clone()));
                    }
                }
            }
        }

        Ok(())
    }

    fn installed_extension(
        &self,
        id: &ExtensionId,
        namespace: &Namespace,
    ) -> Option<InstalledExtension> {
        self.state
            .lock()
            .unwrap()
            .records
            .iter()
            .find(|record| record.id() == id && Self::present_in(record, namespace))
            .cloned()
    }

    fn backward_dependencies(
        &self,
        id: &ExtensionId,
        namespace: &str,
    ) -> Result<Vec<InstalledExtension>> {
        let state = self.state.lock().unwrap();
        if state.fail_backward_dependencies {
            return Err(Error::ResolveFailed {
                id: id.clone(),
                source: None,
            });
        }

        let namespace = Namespace::scoped(namespace);
        Ok(state
            .records
            .iter()
            .filter(|record| {
                Self::depends_on(record, id) && Self::present_in(record, &namespace)
            })
            .cloned()
            .collect())
    }

    fn backward_dependencies_all(
        &self,
        id: &ExtensionId,
    ) -> Result<BTreeMap<String, Vec<InstalledExtension>>> {
        let state = self.state.lock().unwrap();
        if state.fail_backward_dependencies {
            return Err(Error::ResolveFailed {
                id: id.clone(),
                source: None,
            });
        }

        let mut by_namespace: BTreeMap<String, Vec<InstalledExtension>> = BTreeMap::new();
        for record in state.records.iter().filter(|r| Self::depends_on(r, id)) {
            if let Some(namespaces) = &record.namespaces {
                for namespace in namespaces {
                    by_namespace
                        .entry(namespace.clone())
                        .or_default()
                        .push(record.clone());
                }
            }
        }
        Ok(by_namespace)
    }
}

// ---------------------------------------------------------------------------
// Recording handler

/// One observed handler invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerCall {
    Install(ExtensionId),
    Upgrade(ExtensionId, Vec<ExtensionId>),
    Uninstall(ExtensionId),
    CheckUninstall(ExtensionId),
}

/// Handler that records every invocation and can be told to fail
#[derive(Default)]
pub struct RecordingHandler {
    calls: Mutex<Vec<HandlerCall>>,
    deny_uninstall_reason: Mutex<Option<String>>,
    fail_install_of: Mutex<BTreeSet<ExtensionId>>,
    fail_uninstall_of: Mutex<BTreeSet<ExtensionId>>,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deny_uninstall(&self, reason: &str) {
        *self.deny_uninstall_reason.lock().unwrap() = Some(reason.to_string());
    }

    pub fn fail_install_of(&self, id: ExtensionId) {
        self.fail_install_of.lock().unwrap().insert(id);
    }

    pub fn fail_uninstall_of(&self, id: ExtensionId) {
        self.fail_uninstall_of.lock().unwrap().insert(id);
    }

    pub fn calls(&self) -> Vec<HandlerCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: HandlerCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl ExtensionHandler for RecordingHandler {
    fn install(
        &self,
        extension: &LocalExtension,
        _namespace: &Namespace,
        _request: &ExtensionRequest,
    ) -> Result<()> {
        self.record(HandlerCall::Install(extension.id().clone()));
        if self.fail_install_of.lock().unwrap().contains(extension.id()) {
            return Err(Error::install_failed(
                extension.id().clone(),
                "handler exploded",
            ));
        }
        Ok(())
    }

    fn upgrade(
        &self,
        previous: &[InstalledExtension],
        extension: &LocalExtension,
        _namespace: &Namespace,
        _request: &ExtensionRequest,
    ) -> Result<()> {
        self.record(HandlerCall::Upgrade(
            extension.id().clone(),
            previous.iter().map(|p| p.id().clone()).collect(),
        ));
        if self.fail_install_of.lock().unwrap().contains(extension.id()) {
            return Err(Error::install_failed(
                extension.id().clone(),
                "handler exploded",
            ));
        }
        Ok(())
    }

    fn uninstall(
        &self,
        extension: &InstalledExtension,
        _namespace: &Namespace,
        _request: &ExtensionRequest,
    ) -> Result<()> {
        self.record(HandlerCall::Uninstall(extension.id().clone()));
        if self
            .fail_uninstall_of
            .lock()
            .unwrap()
            .contains(extension.id())
        {
            return Err(Error::uninstall_failed(
                extension.id().clone(),
                "handler exploded",
            ));
        }
        Ok(())
    }

    fn check_uninstall(
        &self,
        extension: &InstalledExtension,
        _namespace: &Namespace,
        _request: &ExtensionRequest,
    ) -> Result<()> {
        self.record(HandlerCall::CheckUninstall(extension.id().clone()));
        if let Some(reason) = self.deny_uninstall_reason.lock().unwrap().as_ref() {
            return Err(Error::permission_denied(extension.id().clone(), reason));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Recording notifier

/// Notifier that buffers every emitted envelope
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<EventEnvelope>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<EventEnvelope> {
        self.events.lock().unwrap().clone()
    }
}

impl EventNotifier for RecordingNotifier {
    fn notify(&self, event: &EventEnvelope) {
        self.events.lock().unwrap().push(event.clone());
    }
}

// ---------------------------------------------------------------------------
// Counting progress listener

/// Listener counting push/step/pop transitions
#[derive(Default)]
pub struct CountingListener {
    pub pushes: AtomicUsize,
    pub pops: AtomicUsize,
    steps_by_depth: Mutex<BTreeMap<usize, usize>>,
}

impl CountingListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pushes(&self) -> usize {
        self.pushes.load(Ordering::SeqCst)
    }

    pub fn pops(&self) -> usize {
        self.pops.load(Ordering::SeqCst)
    }

    pub fn steps_at_depth(&self, depth: usize) -> usize {
        self.steps_by_depth
            .lock()
            .unwrap()
            .get(&depth)
            .copied()
            .unwrap_or(0)
    }
}

impl ProgressListener for CountingListener {
    fn level_pushed(&self, _total_steps: usize, _depth: usize) {
        self.pushes.fetch_add(1, Ordering::SeqCst);
    }

    fn stepped(&self, _done: usize, _total_steps: usize, depth: usize) {
        *self.steps_by_depth.lock().unwrap().entry(depth).or_insert(0) += 1;
    }

    fn level_popped(&self, _depth: usize) {
        self.pops.fetch_add(1, Ordering::SeqCst);
    }
}
