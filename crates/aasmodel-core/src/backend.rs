//! Pluggable backends and the scheme registry
//!
//! A backend moves element state between the model and an external store
//! addressed by a source locator (`file:...`, `couchdb:...`). Backends are
//! selected by the locator's URI scheme.

use regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};
use thiserror::Error;

use crate::errors::{AasError, Result};
use crate::model::ElementId;
use crate::ops::Model;

/// Failure reported by a backend
///
/// Opaque to the core; it is passed through to the caller unchanged.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct BackendError(Arc<dyn std::error::Error + Send + Sync + 'static>);

#[derive(Debug, Error)]
#[error("{0}")]
struct BackendMessage(String);

impl BackendError {
    pub fn new<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self(Arc::new(err))
    }

    pub fn msg(message: impl Into<String>) -> Self {
        Self(Arc::new(BackendMessage(message.into())))
    }

    /// The backend's own error, for downcasting
    pub fn inner(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self.0.as_ref()
    }
}

/// Commit/update capability for one kind of external store
///
/// `store_owner` is the element whose source is used; `relative_path` holds
/// the id_shorts from the store owner (inclusive) down to the element. The
/// path is empty when the element is its own store owner.
pub trait Backend: Send + Sync {
    /// Write the state of `committed` to the store of `store_owner`
    ///
    /// # Errors
    /// Any backend failure.
    fn commit_object(
        &self,
        model: &Model,
        committed: ElementId,
        store_owner: ElementId,
        relative_path: &[String],
    ) -> std::result::Result<(), BackendError>;

    /// Refresh `updated` from the store of `store_owner`
    ///
    /// Backends usually build a detached copy of the stored state and merge
    /// it with [`Model::update_from`].
    ///
    /// # Errors
    /// Any backend failure.
    fn update_object(
        &self,
        model: &mut Model,
        updated: ElementId,
        store_owner: ElementId,
        relative_path: &[String],
    ) -> std::result::Result<(), BackendError>;
}

fn scheme_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([a-zA-Z][a-zA-Z+\-.]*):").expect("valid scheme pattern"))
}

/// URI scheme of a source locator
///
/// # Errors
/// * `InvalidLocator` - If the locator doesn't start with `scheme:`
pub fn scheme_of(locator: &str) -> Result<&str> {
    scheme_pattern()
        .captures(locator)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| AasError::InvalidLocator {
            locator: locator.to_string(),
        })
}

/// Mapping from URI scheme to backend
#[derive(Clone, Default)]
pub struct BackendRegistry {
    backends: HashMap<String, Arc<dyn Backend>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self {
            backends: HashMap::new(),
        }
    }

    /// Register `backend` for `scheme`, replacing any previous one
    ///
    /// # Errors
    /// * `InvalidScheme` - If `scheme` could never be extracted from a locator
    pub fn register(
        &mut self,
        scheme: impl Into<String>,
        backend: Arc<dyn Backend>,
    ) -> Result<()> {
        let scheme = scheme.into();
        let locator = format!("{scheme}:");
        if scheme_of(&locator).ok() != Some(scheme.as_str()) {
            return Err(AasError::InvalidScheme { scheme });
        }
        tracing::debug!(scheme = %scheme, "backend registered");
        self.backends.insert(scheme, backend);
        Ok(())
    }

    /// Backend responsible for a source locator
    ///
    /// # Errors
    /// * `InvalidLocator` - If the locator has no scheme
    /// * `UnknownBackend` - If no backend is registered for the scheme
    pub fn resolve(&self, locator: &str) -> Result<Arc<dyn Backend>> {
        let scheme = scheme_of(locator)?;
        self.backends
            .get(scheme)
            .cloned()
            .ok_or_else(|| AasError::UnknownBackend {
                scheme: scheme.to_string(),
            })
    }

    pub fn schemes(&self) -> Vec<&str> {
        let mut schemes: Vec<&str> = self.backends.keys().map(String::as_str).collect();
        schemes.sort_unstable();
        schemes
    }
}

impl std::fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("schemes", &self.schemes())
            .finish()
    }
}

fn global_registry() -> &'static RwLock<BackendRegistry> {
    static REGISTRY: OnceLock<RwLock<BackendRegistry>> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(BackendRegistry::new()))
}

/// Register a backend in the process-wide registry
///
/// # Errors
/// Same as [`BackendRegistry::register`]
pub fn register_backend(scheme: impl Into<String>, backend: Arc<dyn Backend>) -> Result<()> {
    global_registry()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .register(scheme, backend)
}

/// Look up a backend in the process-wide registry
///
/// # Errors
/// Same as [`BackendRegistry::resolve`]
pub fn get_backend(locator: &str) -> Result<Arc<dyn Backend>> {
    global_registry()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .resolve(locator)
}

/// Copy of the process-wide registry
pub fn registry_snapshot() -> BackendRegistry {
    global_registry()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}
