/// Central resource manager for the engine.
///
/// Owns the canonical instance of every resource, keyed by type and
/// normalized path, and drives the shared lifecycle protocol:
///
/// - **Reference counting**: `load` returns the cached instance (ref + 1) or
///   creates one and queues a read; `unload` at zero tears the resource down
///   and `remove_unreferenced` evicts it.
/// - **Dependencies**: `add_dependency(owner, dep)` counts `dep` against
///   `owner` while it is not READY and notifies `owner` on every transition.
/// - **Apply pass**: `update` applies completed reads on the calling thread;
///   decoding and readiness hooks run there, never on loader threads.
///
/// In-flight reads are never cancelled. Each (re)load bumps a per-entry
/// ticket, and a completion whose ticket or key generation no longer matches
/// is dropped.

use std::sync::Arc;
use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use crate::error::{Error, Result};
use crate::file_system::FileSystem;
use crate::renderer::Renderer;
use crate::resource::loader::{LoadCompletion, LoadRequest, Loader};
use crate::resource::shader::DEFAULT_SHADER_SOURCE;
use crate::resource::{
    Material, Resource, ResourceFactory, ResourceKey, ResourcePath, ResourceState,
    ResourceType, Shader, StateCallback, Texture,
};

/// Path under which the built-in default shader is registered
pub const DEFAULT_SHADER_PATH: &str = "engine/default.shd";

// ===== CONFIGURATION =====

/// Resource manager configuration
#[derive(Debug, Clone)]
pub struct ResourceManagerConfig {
    /// Number of loader threads; 0 reads files inline during `update()`
    pub loader_threads: usize,
    /// Path of the built-in default shader
    pub default_shader_path: String,
}

impl Default for ResourceManagerConfig {
    fn default() -> Self {
        Self {
            loader_threads: 2,
            default_shader_path: DEFAULT_SHADER_PATH.to_string(),
        }
    }
}

// ===== ENTRIES =====

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadState {
    Pending,
    Loaded,
    Failed,
}

struct ResourceHeader {
    path: ResourcePath,
    resource_type: ResourceType,
    ref_count: u32,
    state: ResourceState,
    load_state: LoadState,
    /// Dependency edges whose target is not READY
    dependency_count: u32,
    /// Dependency edges whose target is FAILURE
    failed_dependency_count: u32,
    /// Resources depending on this one, one entry per edge
    observers: Vec<ResourceKey>,
    callbacks: Vec<StateCallback>,
    load_ticket: u32,
    size: usize,
    last_error: Option<Error>,
}

impl ResourceHeader {
    fn new(path: ResourcePath, resource_type: ResourceType) -> Self {
        Self {
            path,
            resource_type,
            ref_count: 1,
            state: ResourceState::Empty,
            load_state: LoadState::Pending,
            dependency_count: 0,
            failed_dependency_count: 0,
            observers: Vec::new(),
            callbacks: Vec::new(),
            load_ticket: 0,
            size: 0,
            last_error: None,
        }
    }

    fn evaluate(&self) -> ResourceState {
        if self.load_state == LoadState::Failed || self.failed_dependency_count > 0 {
            ResourceState::Failure
        } else if self.load_state == LoadState::Loaded && self.dependency_count == 0 {
            ResourceState::Ready
        } else {
            ResourceState::Loading
        }
    }
}

struct ResourceEntry {
    header: ResourceHeader,
    /// `None` while checked out to run one of its hooks
    body: Option<Box<dyn Resource>>,
}

// ===== TYPED MANAGER =====

/// Per-type cache mapping normalized paths to resources
pub struct TypedManager {
    resource_type: ResourceType,
    factory: Box<dyn ResourceFactory>,
    resources: FxHashMap<ResourcePath, ResourceKey>,
}

impl TypedManager {
    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    /// Cached resource for `path`
    pub fn find(&self, path: &ResourcePath) -> Option<ResourceKey> {
        self.resources.get(path).copied()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &ResourcePath> {
        self.resources.keys()
    }
}

// ===== RESOURCE MANAGER =====

pub struct ResourceManager {
    renderer: Arc<Renderer>,
    loader: Loader,
    managers: Vec<TypedManager>,
    slots: SlotMap<ResourceKey, ResourceEntry>,
    deferred_checks: Vec<ResourceKey>,
    default_shader: ResourceKey,
}

impl ResourceManager {
    /// Create a resource manager with the built-in shader, texture and
    /// material types registered and the default shader loaded
    ///
    /// # Errors
    ///
    /// Fails if loader threads cannot be spawned or the default shader
    /// cannot be built.
    pub fn new(
        renderer: Arc<Renderer>,
        file_system: Arc<dyn FileSystem>,
        config: ResourceManagerConfig,
    ) -> Result<Self> {
        let loader = Loader::new(file_system, config.loader_threads)?;

        let mut rm = Self {
            renderer,
            loader,
            managers: Vec::new(),
            slots: SlotMap::with_key(),
            deferred_checks: Vec::new(),
            default_shader: ResourceKey::default(),
        };

        rm.register(ResourceType::SHADER, |key: ResourceKey, path: &ResourcePath| -> Box<dyn Resource> {
            Box::new(Shader::new(key, path.clone()))
        })?;

        let renderer = rm.renderer.clone();
        rm.register(ResourceType::TEXTURE, move |key: ResourceKey, path: &ResourcePath| -> Box<dyn Resource> {
            Box::new(Texture::new(key, path.clone(), renderer.clone()))
        })?;

        let default_shader = rm.load_from_memory(
            ResourceType::SHADER,
            &config.default_shader_path,
            DEFAULT_SHADER_SOURCE.as_bytes(),
        )?;
        if !rm.is_ready(default_shader) {
            return Err(Error::InitializationFailed(format!(
                "Default shader '{}' could not be built",
                config.default_shader_path
            )));
        }
        rm.default_shader = default_shader;

        rm.register(ResourceType::MATERIAL, move |key: ResourceKey, path: &ResourcePath| -> Box<dyn Resource> {
            Box::new(Material::new(key, path.clone(), default_shader))
        })?;

        crate::engine_info!(
            "nebula3d::ResourceManager",
            "ResourceManager created ({} loader threads)",
            rm.loader.thread_count()
        );

        Ok(rm)
    }

    /// Register a resource type
    pub fn register(
        &mut self,
        resource_type: ResourceType,
        factory: impl ResourceFactory + 'static,
    ) -> Result<()> {
        if self.managers.iter().any(|m| m.resource_type == resource_type) {
            crate::engine_bail!(
                "nebula3d::ResourceManager",
                "Resource type '{}' registered twice",
                resource_type.name()
            );
        }
        self.managers.push(TypedManager {
            resource_type,
            factory: Box::new(factory),
            resources: FxHashMap::default(),
        });
        Ok(())
    }

    /// Typed manager of a resource type
    pub fn manager(&self, resource_type: ResourceType) -> Option<&TypedManager> {
        self.managers.iter().find(|m| m.resource_type == resource_type)
    }

    fn manager_index(&self, resource_type: ResourceType) -> Result<usize> {
        self.managers
            .iter()
            .position(|m| m.resource_type == resource_type)
            .ok_or_else(|| crate::engine_err!(
                "nebula3d::ResourceManager",
                "Resource type '{}' is not registered",
                resource_type.name()
            ))
    }

    /// Cached resource of `resource_type` at `path`
    pub fn find(&self, resource_type: ResourceType, path: &str) -> Option<ResourceKey> {
        self.manager(resource_type)?.find(&ResourcePath::new(path))
    }

    pub fn renderer(&self) -> &Arc<Renderer> {
        &self.renderer
    }

    /// The engine default shader (always READY, never released)
    pub fn default_shader(&self) -> ResourceKey {
        self.default_shader
    }

    // ===== LOAD / UNLOAD =====

    /// Acquire the resource of `resource_type` at `path`
    ///
    /// Returns immediately. A new resource is LOADING until its read is
    /// applied by [`update`](Self::update).
    pub fn load(&mut self, resource_type: ResourceType, path: &str) -> Result<ResourceKey> {
        let (key, created) = self.acquire(resource_type, path)?;
        let revive = self.slots.get(key).is_some_and(|e| e.header.state == ResourceState::Empty);
        if created || revive {
            if let Some(request) = self.begin_load(key) {
                crate::engine_trace!("nebula3d::ResourceManager", "Queued read of {}", request.path);
                self.loader.request(request);
            }
        }
        Ok(key)
    }

    /// Acquire a resource whose content is already in memory
    ///
    /// Decodes synchronously. A cached, live resource is returned as is.
    pub fn load_from_memory(
        &mut self,
        resource_type: ResourceType,
        path: &str,
        data: &[u8],
    ) -> Result<ResourceKey> {
        let (key, created) = self.acquire(resource_type, path)?;
        let revive = self.slots.get(key).is_some_and(|e| e.header.state == ResourceState::Empty);
        if (created || revive) && self.begin_load(key).is_some() {
            self.decode(key, data);
            self.run_deferred_checks();
        }
        Ok(key)
    }

    /// Queue a fresh read of a live resource
    ///
    /// The resource goes back to LOADING (its dependents wait again) and any
    /// read already in flight is superseded.
    pub fn reload(&mut self, key: ResourceKey) -> Result<()> {
        let entry = self.slots.get(key).ok_or_else(|| crate::engine_err!(
            "nebula3d::ResourceManager",
            "Reload of an unknown resource {:?}",
            key
        ))?;
        if entry.header.ref_count == 0 {
            crate::engine_bail!(
                "nebula3d::ResourceManager",
                "Cannot reload unreferenced resource '{}'",
                entry.header.path
            );
        }
        if let Some(request) = self.begin_load(key) {
            crate::engine_trace!("nebula3d::ResourceManager", "Queued reload of {}", request.path);
            self.loader.request(request);
        }
        Ok(())
    }

    fn acquire(&mut self, resource_type: ResourceType, path: &str) -> Result<(ResourceKey, bool)> {
        let path = ResourcePath::new(path);
        if path.is_empty() {
            crate::engine_bail!(
                "nebula3d::ResourceManager",
                "Cannot load a {} from an empty path",
                resource_type.name()
            );
        }
        let index = self.manager_index(resource_type)?;

        if let Some(key) = self.managers[index].find(&path) {
            if let Some(entry) = self.slots.get_mut(key) {
                entry.header.ref_count += 1;
                return Ok((key, false));
            }
        }

        let manager = &mut self.managers[index];
        let key = self.slots.insert_with_key(|key| ResourceEntry {
            body: Some(manager.factory.create(key, &path)),
            header: ResourceHeader::new(path.clone(), resource_type),
        });
        manager.resources.insert(path, key);
        Ok((key, true))
    }

    fn begin_load(&mut self, key: ResourceKey) -> Option<LoadRequest> {
        let header = &mut self.slots.get_mut(key)?.header;
        header.load_ticket = header.load_ticket.wrapping_add(1);
        header.load_state = LoadState::Pending;
        header.last_error = None;
        let request = LoadRequest {
            key,
            ticket: header.load_ticket,
            path: header.path.clone(),
        };
        self.set_state(key, ResourceState::Loading);
        Some(request)
    }

    /// Release one reference
    ///
    /// At zero the resource is torn down (EMPTY) immediately and evicted by
    /// the next [`remove_unreferenced`](Self::remove_unreferenced).
    pub fn unload(&mut self, key: ResourceKey) -> Result<()> {
        let entry = self.slots.get_mut(key).ok_or_else(|| crate::engine_err!(
            "nebula3d::ResourceManager",
            "Unload of an unknown resource {:?}",
            key
        ))?;
        if entry.header.ref_count == 0 {
            crate::engine_bail!(
                "nebula3d::ResourceManager",
                "Resource '{}' unloaded more often than loaded",
                entry.header.path
            );
        }
        entry.header.ref_count -= 1;
        if entry.header.ref_count == 0 {
            self.teardown(key);
        }
        Ok(())
    }

    fn teardown(&mut self, key: ResourceKey) {
        match self.slots.get_mut(key).and_then(|e| e.body.take()) {
            Some(mut body) => {
                body.unload(self);
                if let Some(entry) = self.slots.get_mut(key) {
                    entry.body = Some(body);
                }
            }
            None => crate::engine_warn!(
                "nebula3d::ResourceManager",
                "Resource {:?} released while one of its hooks is running",
                key
            ),
        }

        let Some(entry) = self.slots.get_mut(key) else { return };
        let header = &mut entry.header;
        header.load_ticket = header.load_ticket.wrapping_add(1);
        header.load_state = LoadState::Pending;
        header.size = 0;
        header.last_error = None;
        if header.dependency_count > 0 {
            crate::engine_warn!(
                "nebula3d::ResourceManager",
                "Resource '{}' torn down with {} dependencies still registered",
                header.path,
                header.dependency_count
            );
        }
        crate::engine_debug!("nebula3d::ResourceManager", "Unloaded {}", header.path);
        self.set_state(key, ResourceState::Empty);
    }

    /// Evict every resource whose reference count is zero
    ///
    /// Returns the number of evicted resources.
    pub fn remove_unreferenced(&mut self) -> usize {
        let dead: Vec<ResourceKey> = self.slots
            .iter()
            .filter(|(_, e)| e.header.ref_count == 0 && e.body.is_some())
            .map(|(key, _)| key)
            .collect();

        for key in &dead {
            if let Some(entry) = self.slots.remove(*key) {
                if let Some(manager) = self.managers
                    .iter_mut()
                    .find(|m| m.resource_type == entry.header.resource_type)
                {
                    manager.resources.remove(&entry.header.path);
                }
                crate::engine_trace!("nebula3d::ResourceManager", "Evicted {}", entry.header.path);
            }
        }
        dead.len()
    }

    // ===== APPLY PASS =====

    /// Apply every completed read
    ///
    /// Decoding, dependency notifications and readiness hooks run here,
    /// synchronously. Returns the number of completions processed
    /// (stale ones included).
    pub fn update(&mut self) -> usize {
        let completions = self.loader.poll();
        let count = completions.len();
        for completion in completions {
            self.apply(completion);
        }
        self.run_deferred_checks();
        count
    }

    /// Block until every queued read (including reads queued while
    /// applying) has been applied
    pub fn flush(&mut self) {
        loop {
            self.run_deferred_checks();
            if self.loader.pending() == 0 {
                break;
            }
            for completion in self.loader.wait() {
                self.apply(completion);
            }
        }
    }

    /// Reads queued or in flight
    pub fn pending_loads(&self) -> usize {
        self.loader.pending()
    }

    fn apply(&mut self, completion: LoadCompletion) {
        let current = self.slots
            .get(completion.key)
            .is_some_and(|e| e.header.load_ticket == completion.ticket);
        if !current {
            crate::engine_trace!("nebula3d::ResourceManager", "Dropping stale read of {}", completion.path);
            return;
        }
        match completion.result {
            Ok(data) => self.decode(completion.key, &data),
            Err(error) => self.fail_load(completion.key, error),
        }
    }

    fn decode(&mut self, key: ResourceKey, data: &[u8]) {
        let Some(mut body) = self.slots.get_mut(key).and_then(|e| e.body.take()) else {
            self.fail_load(key, Error::InvalidResource(format!("Resource {:?} is busy", key)));
            return;
        };
        let result = body.load(self, data);
        if let Some(entry) = self.slots.get_mut(key) {
            entry.body = Some(body);
        }

        match result {
            Ok(()) => {
                if let Some(entry) = self.slots.get_mut(key) {
                    entry.header.load_state = LoadState::Loaded;
                    entry.header.size = data.len();
                }
                self.check_state(key);
            }
            Err(error) => self.fail_load(key, error),
        }
    }

    fn fail_load(&mut self, key: ResourceKey, error: Error) {
        let Some(entry) = self.slots.get_mut(key) else { return };
        crate::engine_error!(
            "nebula3d::ResourceManager",
            "Failed to load {} '{}': {}",
            entry.header.resource_type.name(),
            entry.header.path,
            error
        );
        entry.header.load_state = LoadState::Failed;
        entry.header.last_error = Some(error);
        self.check_state(key);
    }

    // ===== DEPENDENCIES =====

    /// Make `owner` wait for `dep`
    ///
    /// Counts against `owner` while `dep` is not READY; a FAILURE of `dep`
    /// fails `owner`. Each call adds one edge.
    pub fn add_dependency(&mut self, owner: ResourceKey, dep: ResourceKey) -> Result<()> {
        if owner == dep {
            crate::engine_bail!("nebula3d::ResourceManager", "Resource {:?} cannot depend on itself", owner);
        }
        let (dep_state, dep_path) = match self.slots.get(dep) {
            Some(entry) => (entry.header.state, entry.header.path.clone()),
            None => crate::engine_bail!("nebula3d::ResourceManager", "Unknown dependency {:?}", dep),
        };
        let Some(owner_entry) = self.slots.get_mut(owner) else {
            crate::engine_bail!("nebula3d::ResourceManager", "Unknown dependent {:?}", owner);
        };

        let header = &mut owner_entry.header;
        if dep_state != ResourceState::Ready {
            header.dependency_count += 1;
        }
        if dep_state == ResourceState::Failure {
            Self::mark_dependency_failed(header, &dep_path);
        }
        if let Some(dep_entry) = self.slots.get_mut(dep) {
            dep_entry.header.observers.push(owner);
        }
        self.check_state(owner);
        Ok(())
    }

    /// Remove one edge added by [`add_dependency`](Self::add_dependency)
    ///
    /// Must be called before `dep` is unloaded by the owner.
    pub fn remove_dependency(&mut self, owner: ResourceKey, dep: ResourceKey) -> Result<()> {
        let Some(dep_entry) = self.slots.get_mut(dep) else {
            crate::engine_bail!("nebula3d::ResourceManager", "Unknown dependency {:?}", dep);
        };
        let Some(position) = dep_entry.header.observers.iter().position(|k| *k == owner) else {
            crate::engine_bail!(
                "nebula3d::ResourceManager",
                "{:?} does not depend on '{}'",
                owner,
                dep_entry.header.path
            );
        };
        dep_entry.header.observers.swap_remove(position);
        let dep_state = dep_entry.header.state;

        if let Some(owner_entry) = self.slots.get_mut(owner) {
            let header = &mut owner_entry.header;
            if dep_state != ResourceState::Ready {
                header.dependency_count = header.dependency_count.saturating_sub(1);
            }
            if dep_state == ResourceState::Failure {
                header.failed_dependency_count = header.failed_dependency_count.saturating_sub(1);
            }
        }
        self.check_state(owner);
        Ok(())
    }

    fn mark_dependency_failed(header: &mut ResourceHeader, dependency: &ResourcePath) {
        header.failed_dependency_count += 1;
        if header.last_error.is_none() {
            crate::engine_error!(
                "nebula3d::ResourceManager",
                "Dependency '{}' of '{}' failed",
                dependency,
                header.path
            );
            header.last_error = Some(Error::DependencyFailure {
                path: header.path.to_string(),
                dependency: dependency.to_string(),
            });
        }
    }

    // ===== STATE MACHINE =====

    fn check_state(&mut self, key: ResourceKey) {
        let Some(entry) = self.slots.get(key) else { return };
        if entry.header.state == ResourceState::Empty {
            return;
        }
        let mut new_state = entry.header.evaluate();
        if new_state == entry.header.state {
            return;
        }

        if new_state == ResourceState::Ready {
            let Some(mut body) = self.slots.get_mut(key).and_then(|e| e.body.take()) else {
                self.deferred_checks.push(key);
                return;
            };
            body.on_before_ready(self);
            let Some(entry) = self.slots.get_mut(key) else { return };
            entry.body = Some(body);

            new_state = entry.header.evaluate();
            if new_state == entry.header.state {
                return;
            }
        }

        self.set_state(key, new_state);
    }

    fn set_state(&mut self, key: ResourceKey, new_state: ResourceState) {
        let Some(entry) = self.slots.get_mut(key) else { return };
        let old_state = entry.header.state;
        if old_state == new_state {
            return;
        }
        entry.header.state = new_state;
        crate::engine_debug!(
            "nebula3d::ResourceManager",
            "{} {:?} -> {:?}",
            entry.header.path,
            old_state,
            new_state
        );

        for callback in entry.header.callbacks.iter_mut() {
            callback(key, old_state, new_state);
        }

        let path = entry.header.path.clone();
        let observers = entry.header.observers.clone();
        let was_ready = old_state == ResourceState::Ready;
        let is_ready = new_state == ResourceState::Ready;
        let was_failed = old_state == ResourceState::Failure;
        let is_failed = new_state == ResourceState::Failure;

        for observer in observers {
            if let Some(entry) = self.slots.get_mut(observer) {
                let header = &mut entry.header;
                if was_ready && !is_ready {
                    header.dependency_count += 1;
                } else if !was_ready && is_ready {
                    header.dependency_count = header.dependency_count.saturating_sub(1);
                }
                if !was_failed && is_failed {
                    Self::mark_dependency_failed(header, &path);
                } else if was_failed && !is_failed {
                    header.failed_dependency_count = header.failed_dependency_count.saturating_sub(1);
                }
            }
            self.check_state(observer);
        }
    }

    fn run_deferred_checks(&mut self) {
        for key in std::mem::take(&mut self.deferred_checks) {
            self.check_state(key);
        }
    }

    /// Register a callback invoked on every state transition of `key`
    pub fn on_state_changed(
        &mut self,
        key: ResourceKey,
        callback: impl FnMut(ResourceKey, ResourceState, ResourceState) + Send + 'static,
    ) -> Result<()> {
        let entry = self.slots.get_mut(key).ok_or_else(|| crate::engine_err!(
            "nebula3d::ResourceManager",
            "Callback registered on an unknown resource {:?}",
            key
        ))?;
        entry.header.callbacks.push(Box::new(callback));
        Ok(())
    }

    // ===== TYPED ACCESS =====

    /// Borrow the body of `key` as `T`
    pub fn get<T: Resource>(&self, key: ResourceKey) -> Option<&T> {
        self.slots.get(key)?.body.as_ref()?.as_any().downcast_ref::<T>()
    }

    /// Mutably borrow the body of `key` as `T`
    pub fn get_mut<T: Resource>(&mut self, key: ResourceKey) -> Option<&mut T> {
        self.slots.get_mut(key)?.body.as_mut()?.as_any_mut().downcast_mut::<T>()
    }

    /// Run `f` on the body of `key` with access to the manager
    ///
    /// The body is checked out while `f` runs, so `f` may load, unload and
    /// register dependencies. State checks that need the body are replayed
    /// once it is back.
    pub fn modify<T: Resource, R>(
        &mut self,
        key: ResourceKey,
        f: impl FnOnce(&mut T, &mut ResourceManager) -> R,
    ) -> Result<R> {
        let entry = self.slots.get_mut(key).ok_or_else(|| crate::engine_err!(
            "nebula3d::ResourceManager",
            "Unknown resource {:?}",
            key
        ))?;
        let path = entry.header.path.clone();
        let mut body = entry.body.take().ok_or_else(|| crate::engine_err!(
            "nebula3d::ResourceManager",
            "Resource '{}' is already being modified",
            path
        ))?;

        let result = match body.as_any_mut().downcast_mut::<T>() {
            Some(resource) => Ok(f(resource, self)),
            None => Err(crate::engine_err!(
                "nebula3d::ResourceManager",
                "Resource '{}' is not a {}",
                path,
                std::any::type_name::<T>()
            )),
        };

        if let Some(entry) = self.slots.get_mut(key) {
            entry.body = Some(body);
        }
        self.run_deferred_checks();
        result
    }

    // ===== QUERIES =====

    pub fn state(&self, key: ResourceKey) -> Option<ResourceState> {
        self.slots.get(key).map(|e| e.header.state)
    }

    pub fn is_ready(&self, key: ResourceKey) -> bool {
        self.state(key) == Some(ResourceState::Ready)
    }

    pub fn is_failure(&self, key: ResourceKey) -> bool {
        self.state(key) == Some(ResourceState::Failure)
    }

    /// Reference count, 0 for unknown keys
    pub fn ref_count(&self, key: ResourceKey) -> u32 {
        self.slots.get(key).map_or(0, |e| e.header.ref_count)
    }

    /// Number of dependencies `key` is still waiting for
    pub fn dependency_count(&self, key: ResourceKey) -> u32 {
        self.slots.get(key).map_or(0, |e| e.header.dependency_count)
    }

    pub fn path(&self, key: ResourceKey) -> Option<&ResourcePath> {
        self.slots.get(key).map(|e| &e.header.path)
    }

    pub fn resource_type(&self, key: ResourceKey) -> Option<ResourceType> {
        self.slots.get(key).map(|e| e.header.resource_type)
    }

    /// Size in bytes of the last applied read
    pub fn size(&self, key: ResourceKey) -> usize {
        self.slots.get(key).map_or(0, |e| e.header.size)
    }

    /// Error that put `key` into FAILURE
    pub fn last_error(&self, key: ResourceKey) -> Option<&Error> {
        self.slots.get(key)?.header.last_error.as_ref()
    }

    /// Number of resources alive in the manager (evicted ones excluded)
    pub fn resource_count(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
#[path = "resource_manager_tests.rs"]
mod tests;
