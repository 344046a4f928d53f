//! Named engine registry and request routing.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;

use crate::engine::DiffEngine;
use crate::error::DispatchError;
use crate::options::{DiffOptions, DiffRequest};

type EngineMap = BTreeMap<String, Arc<dyn DiffEngine>>;

/// Target of [`DiffDispatcher::unregister`]: an engine name or an engine.
#[derive(Clone)]
pub enum EngineRef {
    Name(String),
    Engine(Arc<dyn DiffEngine>),
}

impl EngineRef {
    /// Registry key this reference resolves to.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Engine(engine) => engine.name(),
        }
    }
}

impl fmt::Debug for EngineRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.debug_tuple("Name").field(name).finish(),
            Self::Engine(engine) => f.debug_tuple("Engine").field(&engine.name()).finish(),
        }
    }
}

impl From<&str> for EngineRef {
    fn from(name: &str) -> Self {
        Self::Name(name.to_owned())
    }
}

impl From<String> for EngineRef {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<Arc<dyn DiffEngine>> for EngineRef {
    fn from(engine: Arc<dyn DiffEngine>) -> Self {
        Self::Engine(engine)
    }
}

impl TryFrom<&Value> for EngineRef {
    type Error = DispatchError;

    /// Only JSON strings name an engine.
    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(name) => Ok(Self::Name(name.clone())),
            other => Err(DispatchError::InvalidArgument(format!(
                "expected an engine name or engine, got {}",
                json_type_name(other)
            ))),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Registry of diff engines keyed by name.
///
/// Registration is first-wins: a second engine with a taken name is
/// ignored. Lookups take a read lock, clone the engine handle and run the
/// engine outside the lock, so a dispatch always sees the mapping as it was
/// when the name was looked up.
pub struct DiffDispatcher {
    engines: RwLock<EngineMap>,
}

impl DiffDispatcher {
    /// Create an empty dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self {
            engines: RwLock::new(BTreeMap::new()),
        }
    }

    /// Create a dispatcher and register `engines` in order.
    #[must_use]
    pub fn with_engines(engines: impl IntoIterator<Item = Arc<dyn DiffEngine>>) -> Self {
        let dispatcher = Self::new();
        for engine in engines {
            dispatcher.register(engine);
        }
        dispatcher
    }

    fn read(&self) -> RwLockReadGuard<'_, EngineMap> {
        self.engines.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, EngineMap> {
        self.engines.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register `engine` under its name unless the name is taken.
    ///
    /// Returns whether the engine was added.
    pub fn register(&self, engine: Arc<dyn DiffEngine>) -> bool {
        let name = engine.name().to_owned();
        let mut engines = self.write();
        if engines.contains_key(&name) {
            tracing::debug!(engine = %name, "Engine already registered, keeping the first");
            return false;
        }
        engines.insert(name.clone(), engine);
        tracing::info!(engine = %name, "Registered diff engine");
        true
    }

    /// Remove the engine registered under the target's name.
    ///
    /// Returns whether an engine was removed; removing twice is not an error.
    pub fn unregister(&self, target: impl Into<EngineRef>) -> bool {
        let target = target.into();
        let name = target.name();

        let removed = self.write().remove(name).is_some();
        if removed {
            tracing::info!(engine = %name, "Unregistered diff engine");
        }
        removed
    }

    /// Snapshot of the registered engines.
    #[must_use]
    pub fn list(&self) -> EngineMap {
        self.read().clone()
    }

    /// Engine registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn DiffEngine>> {
        self.read().get(name).map(Arc::clone)
    }

    /// Replace the whole mapping.
    pub fn replace_all(&self, engines: EngineMap) {
        let count = engines.len();
        *self.write() = engines;
        tracing::info!(count, "Replaced diff engines");
    }

    /// Diff `old` against `new` with the named engine and default options.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::UnknownEngine` if nothing is registered under
    /// `name`, or the engine's own error.
    pub fn dispatch(&self, name: &str, old: &str, new: &str) -> Result<String, DispatchError> {
        self.dispatch_with_options(name, old, new, &DiffOptions::default())
    }

    /// Diff `old` against `new` with the named engine.
    ///
    /// # Errors
    ///
    /// Same as [`dispatch`](Self::dispatch).
    pub fn dispatch_with_options(
        &self,
        name: &str,
        old: &str,
        new: &str,
        options: &DiffOptions,
    ) -> Result<String, DispatchError> {
        let engine = self
            .get(name)
            .ok_or_else(|| DispatchError::UnknownEngine {
                name: name.to_owned(),
            })?;

        tracing::debug!(engine = %name, old_len = old.len(), new_len = new.len(), "Dispatching diff");
        Ok(engine.diff(old, new, options)?)
    }

    /// Route a [`DiffRequest`].
    ///
    /// # Errors
    ///
    /// Same as [`dispatch`](Self::dispatch).
    pub fn dispatch_request(&self, request: &DiffRequest) -> Result<String, DispatchError> {
        self.dispatch_with_options(
            &request.engine,
            &request.html_old,
            &request.html_new,
            &request.options,
        )
    }
}

impl Default for DiffDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DiffDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiffDispatcher")
            .field("engines", &self.read().keys().collect::<Vec<_>>())
            .finish()
    }
}
