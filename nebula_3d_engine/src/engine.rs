/// Nebula3D Engine - Singleton manager for engine subsystems
///
/// This module provides global singleton management for the renderer registry
/// and the resource manager. It uses thread-safe static storage with RwLock
/// for safe concurrent access.

use std::sync::{OnceLock, RwLock, Arc, Mutex};
use std::time::SystemTime;
use crate::renderer::{Renderer, RendererDesc};
use crate::resource::{ResourceManager, ResourceManagerConfig};
use crate::file_system::FileSystem;
use crate::error::{Result, Error};
use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};

// ===== INTERNAL STATE =====

/// Global engine state storage
static ENGINE_STATE: OnceLock<EngineState> = OnceLock::new();

/// Global logger (initialized with DefaultLogger)
static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

/// Internal state structure holding all engine singletons
struct EngineState {
    /// Renderer registry (internally synchronized, read-mostly)
    renderer: RwLock<Option<Arc<Renderer>>>,
    /// Resource manager singleton
    resource_manager: RwLock<Option<Arc<Mutex<ResourceManager>>>>,
}

impl EngineState {
    fn new() -> Self {
        Self {
            renderer: RwLock::new(None),
            resource_manager: RwLock::new(None),
        }
    }
}

fn engine_state() -> Result<&'static EngineState> {
    ENGINE_STATE.get().ok_or_else(|| Engine::log_and_return_error(
        Error::InitializationFailed("Engine not initialized. Call Engine::initialize() first.".to_string())
    ))
}

// ===== PUBLIC API =====

/// Main engine singleton manager
///
/// Manages the lifecycle of the engine subsystems (renderer registry,
/// resource manager) and the per-tick update point where completed loads
/// are applied.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use nebula_3d_engine::nebula3d::{Engine, RendererDesc, DiskFileSystem};
/// use nebula_3d_engine::nebula3d::resource::ResourceManagerConfig;
///
/// Engine::initialize()?;
/// Engine::create_renderer(RendererDesc::default())?;
/// Engine::create_resource_manager(Arc::new(DiskFileSystem::new("assets")), ResourceManagerConfig::default())?;
///
/// loop {
///     Engine::update()?;
///     # break;
/// }
///
/// Engine::shutdown();
/// # Ok::<(), nebula_3d_engine::nebula3d::Error>(())
/// ```
pub struct Engine;

impl Engine {
    /// Helper to log errors before returning them (internal use)
    fn log_and_return_error(error: Error) -> Error {
        match &error {
            Error::InitializationFailed(msg) => {
                crate::engine_error!("nebula3d::Engine", "Initialization failed: {}", msg);
            }
            Error::LockPoisoned(msg) => {
                crate::engine_error!("nebula3d::Engine", "Lock poisoned: {}", msg);
            }
            _ => {
                crate::engine_error!("nebula3d::Engine", "Engine error: {}", error);
            }
        }
        error
    }

    /// Initialize the engine
    ///
    /// This must be called once at application startup before creating any subsystems.
    pub fn initialize() -> Result<()> {
        ENGINE_STATE.get_or_init(EngineState::new);
        Ok(())
    }

    /// Shutdown the entire engine and destroy all singletons
    ///
    /// The resource manager goes first: its textures release their handles
    /// back to the renderer when dropped.
    pub fn shutdown() {
        if let Some(state) = ENGINE_STATE.get() {
            if let Ok(mut rm) = state.resource_manager.write() {
                *rm = None;
            }
            if let Ok(mut renderer) = state.renderer.write() {
                *renderer = None;
            }
        }
    }

    // ===== RENDERER API =====

    /// Create and register the renderer registry singleton
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The engine is not initialized
    /// - A renderer already exists
    /// - The descriptor is invalid (too many or duplicated shader defines)
    pub fn create_renderer(desc: RendererDesc) -> Result<()> {
        let state = engine_state()?;

        let mut lock = state.renderer.write()
            .map_err(|_| Self::log_and_return_error(
                Error::LockPoisoned("Renderer lock poisoned".to_string())
            ))?;

        if lock.is_some() {
            return Err(Self::log_and_return_error(
                Error::InitializationFailed("Renderer already exists. Call Engine::destroy_renderer() first.".to_string())
            ));
        }

        let renderer = Renderer::new(desc).map_err(Self::log_and_return_error)?;
        *lock = Some(Arc::new(renderer));

        crate::engine_info!("nebula3d::Engine", "Renderer singleton created successfully");

        Ok(())
    }

    /// Get the renderer registry singleton
    ///
    /// # Errors
    ///
    /// Returns an error if the engine is not initialized or the renderer
    /// has not been created
    pub fn renderer() -> Result<Arc<Renderer>> {
        let state = engine_state()?;

        let lock = state.renderer.read()
            .map_err(|_| Self::log_and_return_error(
                Error::LockPoisoned("Renderer lock poisoned".to_string())
            ))?;

        lock.clone()
            .ok_or_else(|| Self::log_and_return_error(
                Error::InitializationFailed("Renderer not created. Call Engine::create_renderer() first.".to_string())
            ))
    }

    /// Destroy the renderer singleton
    ///
    /// Existing `Arc<Renderer>` clones (held by a resource manager) remain valid
    /// until dropped.
    pub fn destroy_renderer() -> Result<()> {
        let state = engine_state()?;

        let mut lock = state.renderer.write()
            .map_err(|_| Self::log_and_return_error(
                Error::LockPoisoned("Renderer lock poisoned".to_string())
            ))?;

        *lock = None;

        crate::engine_info!("nebula3d::Engine", "Renderer singleton destroyed");

        Ok(())
    }

    // ===== RESOURCE MANAGER API =====

    /// Create and register the resource manager singleton
    ///
    /// The renderer must exist: the manager shares it with shaders, textures
    /// and materials.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The engine is not initialized
    /// - The renderer has not been created
    /// - A resource manager already exists
    /// - Loader threads cannot be spawned or the default shader is invalid
    pub fn create_resource_manager(
        file_system: Arc<dyn FileSystem>,
        config: ResourceManagerConfig,
    ) -> Result<()> {
        let state = engine_state()?;
        let renderer = Self::renderer()?;

        let mut lock = state.resource_manager.write()
            .map_err(|_| Self::log_and_return_error(
                Error::LockPoisoned("ResourceManager lock poisoned".to_string())
            ))?;

        if lock.is_some() {
            return Err(Self::log_and_return_error(
                Error::InitializationFailed("ResourceManager already exists. Call Engine::destroy_resource_manager() first.".to_string())
            ));
        }

        let manager = ResourceManager::new(renderer, file_system, config)
            .map_err(Self::log_and_return_error)?;
        *lock = Some(Arc::new(Mutex::new(manager)));

        crate::engine_info!("nebula3d::Engine", "ResourceManager singleton created successfully");

        Ok(())
    }

    /// Get the resource manager singleton
    ///
    /// # Errors
    ///
    /// Returns an error if the engine is not initialized or the resource
    /// manager has not been created
    pub fn resource_manager() -> Result<Arc<Mutex<ResourceManager>>> {
        let state = engine_state()?;

        let lock = state.resource_manager.read()
            .map_err(|_| Self::log_and_return_error(
                Error::LockPoisoned("ResourceManager lock poisoned".to_string())
            ))?;

        lock.clone()
            .ok_or_else(|| Self::log_and_return_error(
                Error::InitializationFailed("ResourceManager not created. Call Engine::create_resource_manager() first.".to_string())
            ))
    }

    /// Destroy the resource manager singleton
    pub fn destroy_resource_manager() -> Result<()> {
        let state = engine_state()?;

        let mut lock = state.resource_manager.write()
            .map_err(|_| Self::log_and_return_error(
                Error::LockPoisoned("ResourceManager lock poisoned".to_string())
            ))?;

        *lock = None;

        crate::engine_info!("nebula3d::Engine", "ResourceManager singleton destroyed");

        Ok(())
    }

    // ===== UPDATE =====

    /// Per-tick update point
    ///
    /// Applies every completed load (decode, readiness callbacks) and then
    /// evicts resources whose reference count dropped to zero.
    pub fn update() -> Result<()> {
        let rm = Self::resource_manager()?;
        let mut rm = rm.lock()
            .map_err(|_| Self::log_and_return_error(
                Error::LockPoisoned("ResourceManager mutex poisoned".to_string())
            ))?;

        rm.update();
        rm.remove_unreferenced();

        Ok(())
    }

    /// Reset all singletons for testing (only available in test builds)
    #[cfg(test)]
    pub fn reset_for_testing() {
        if let Some(state) = ENGINE_STATE.get() {
            if let Ok(mut rm) = state.resource_manager.write() {
                *rm = None;
            }
            if let Ok(mut renderer) = state.renderer.write() {
                *renderer = None;
            }
        }
    }

    // ===== LOGGING API =====

    /// Set a custom logger
    ///
    /// Replace the default logger with a custom implementation (file logger,
    /// editor console, test capture, ...)
    ///
    /// # Example
    ///
    /// ```no_run
    /// use nebula_3d_engine::nebula3d::{Engine, log::{Logger, LogEntry}};
    ///
    /// struct FileLogger;
    /// impl Logger for FileLogger {
    ///     fn log(&self, entry: &LogEntry) {
    ///         // Write to file...
    ///     }
    /// }
    ///
    /// Engine::set_logger(FileLogger);
    /// ```
    pub fn set_logger<L: Logger + 'static>(logger: L) {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(mut lock) = logger_lock.write() {
            *lock = Box::new(logger);
        }
    }

    /// Reset logger to default (DefaultLogger)
    pub fn reset_logger() {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(mut lock) = logger_lock.write() {
            *lock = Box::new(DefaultLogger);
        }
    }

    /// Internal logging method (for simple logs without file:line)
    ///
    /// Used by macros like engine_info!, engine_warn!, etc.
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(lock) = logger_lock.read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: None,
                line: None,
            });
        }
    }

    /// Internal logging method with file:line information (for ERROR logs)
    ///
    /// Used by engine_error! and engine_err! to include source location.
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(lock) = logger_lock.read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: Some(file),
                line: Some(line),
            });
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
