/// Resource protocol shared by every resource type.
///
/// A resource is a reference-counted, path-identified asset with an
/// asynchronous readiness lifecycle:
///
/// ```text
///   EMPTY ──load()──▶ LOADING ──own load ok + no pending dependency──▶ READY
///                        │                                               │
///                        └──own load failed / dependency FAILURE──▶ FAILURE
/// ```
///
/// The bookkeeping (reference count, state, dependency counters, observers)
/// lives in the [`ResourceManager`]; a type only implements [`Resource`],
/// which turns bytes into a usable object and tears it down again.

use std::any::Any;
use slotmap::new_key_type;
use crate::error::Result;
use crate::resource::{ResourceManager, ResourcePath};

new_key_type! {
    /// Stable handle to a resource owned by the [`ResourceManager`]
    pub struct ResourceKey;
}

// ===== TYPE TAG =====

/// Resource type tag, used to pick the typed manager and factory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceType(pub &'static str);

impl ResourceType {
    pub const MATERIAL: ResourceType = ResourceType("material");
    pub const SHADER: ResourceType = ResourceType("shader");
    pub const TEXTURE: ResourceType = ResourceType("texture");

    pub fn name(self) -> &'static str {
        self.0
    }
}

// ===== STATE =====

/// Lifecycle state of a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceState {
    /// Not loaded (fresh or torn down)
    Empty,
    /// Own load or a dependency still pending
    Loading,
    /// Own load succeeded and every dependency is ready
    Ready,
    /// Own load failed or a dependency failed
    Failure,
}

/// Callback invoked on every state transition: `(key, old, new)`
pub type StateCallback = Box<dyn FnMut(ResourceKey, ResourceState, ResourceState) + Send>;

// ===== RESOURCE TRAIT =====

/// A loadable resource body
///
/// Hooks receive the manager mutably: the body is checked out of its slot
/// while a hook runs, so it may load, unload and register dependencies on
/// other resources. Its own header (state, counters) stays in the manager.
pub trait Resource: Any + Send {
    fn resource_type(&self) -> ResourceType;

    /// Decode `data`. Dependencies registered here keep the resource
    /// LOADING until they are ready.
    fn load(&mut self, rm: &mut ResourceManager, data: &[u8]) -> Result<()>;

    /// Release everything acquired by `load` and return to the empty state
    fn unload(&mut self, rm: &mut ResourceManager);

    /// Called once the resource is about to become READY
    fn on_before_ready(&mut self, _rm: &mut ResourceManager) {}

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

// ===== FACTORY =====

/// Creates empty resource bodies for one resource type
pub trait ResourceFactory: Send {
    fn create(&self, key: ResourceKey, path: &ResourcePath) -> Box<dyn Resource>;
}

impl<F> ResourceFactory for F
where
    F: Fn(ResourceKey, &ResourcePath) -> Box<dyn Resource> + Send,
{
    fn create(&self, key: ResourceKey, path: &ResourcePath) -> Box<dyn Resource> {
        self(key, path)
    }
}
