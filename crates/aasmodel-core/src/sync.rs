//! Synchronization of elements with their external sources
//!
//! An element with an empty source inherits the source of its nearest
//! ancestor that has one. `update` pulls state in, `commit` pushes it out.
//! Backend errors abort the walk and are returned unchanged.

use chrono::Utc;
use std::time::Duration;

use crate::backend::{registry_snapshot, BackendRegistry};
use crate::errors::Result;
use crate::model::ElementId;
use crate::ops::Model;

impl Model {
    /// id_shorts from `store_owner` (inclusive) down to `element`
    fn relative_path(&self, store_owner: ElementId, element: ElementId) -> Result<Vec<String>> {
        let mut path = Vec::new();
        let mut current = element;
        loop {
            let el = self.get(current)?;
            if let Some(id_short) = el.id_short() {
                path.push(id_short.to_string());
            }
            if current == store_owner {
                break;
            }
            match el.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }
        path.reverse();
        Ok(path)
    }

    /// Element whose source applies to `element`, with the relative path
    ///
    /// Returns the element itself with an empty path if it has its own
    /// source, `None` if neither it nor any ancestor has one.
    ///
    /// # Errors
    /// * `ElementNotFound` - If the element or a parent doesn't exist
    pub fn find_source(&self, element: ElementId) -> Result<Option<(ElementId, Vec<String>)>> {
        if !self.get(element)?.source().is_empty() {
            return Ok(Some((element, Vec::new())));
        }
        for ancestor in self.ancestors(element)? {
            if !self.get(ancestor)?.source().is_empty() {
                let path = self.relative_path(ancestor, element)?;
                return Ok(Some((ancestor, path)));
            }
        }
        Ok(None)
    }
}

fn is_fresh(model: &Model, element: ElementId, max_age: Duration) -> Result<bool> {
    let Some(last_updated) = model.get(element)?.last_updated() else {
        return Ok(false);
    };
    let age = Utc::now().signed_duration_since(last_updated);
    Ok(age.to_std().is_ok_and(|age| age < max_age))
}

/// Refresh an element from its source, using the process-wide registry
///
/// # Errors
/// Same as [`update_with`]
pub fn update(
    model: &mut Model,
    element: ElementId,
    max_age: Duration,
    recursive: bool,
) -> Result<()> {
    let registry = registry_snapshot();
    update_with(model, &registry, element, max_age, recursive)
}

/// Refresh an element from its source
///
/// The element's own source is used if it has one, otherwise the nearest
/// ancestor's. Elements refreshed less than `max_age` ago are skipped. With
/// `recursive`, every id_short-indexed child is updated afterwards, each
/// looking up its own nearest source.
///
/// # Errors
/// * `InvalidLocator`, `UnknownBackend` - If the source has no usable backend
/// * `Backend` - If the backend fails
pub fn update_with(
    model: &mut Model,
    registry: &BackendRegistry,
    element: ElementId,
    max_age: Duration,
    recursive: bool,
) -> Result<()> {
    crate::log_op_start!("update", element_id = %element, recursive = recursive);
    let start = std::time::Instant::now();

    let result = update_element(model, registry, element, max_age, recursive);

    let duration = start.elapsed().as_millis() as u64;
    match &result {
        Ok(()) => crate::log_op_end!("update", duration_ms = duration),
        Err(err) => crate::log_op_error!("update", err.clone(), duration_ms = duration),
    }
    result
}

fn update_element(
    model: &mut Model,
    registry: &BackendRegistry,
    element: ElementId,
    max_age: Duration,
    recursive: bool,
) -> Result<()> {
    if is_fresh(model, element, max_age)? {
        tracing::debug!(element_id = %element, "element is fresh, skipping fetch");
    } else if let Some((store_owner, path)) = model.find_source(element)? {
        let source = model.get(store_owner)?.source().to_string();
        let backend = registry.resolve(&source)?;
        tracing::debug!(
            source = %source,
            store_owner_id = %store_owner,
            relative_path = ?path,
            "updating from source"
        );
        backend.update_object(model, element, store_owner, &path)?;
        model.get_mut(element)?.last_updated = Some(Utc::now());
    }

    if recursive {
        for child in model.referables(element)? {
            update_element(model, registry, child, max_age, true)?;
        }
    }
    Ok(())
}

/// Write an element to every applicable source, using the process-wide registry
///
/// # Errors
/// Same as [`commit_with`]
pub fn commit(model: &Model, element: ElementId) -> Result<()> {
    let registry = registry_snapshot();
    commit_with(model, &registry, element)
}

/// Write an element to every applicable source
///
/// Every ancestor with a source receives the element with the path from
/// that ancestor down. Then the element's own source (empty path), then
/// the own sources of all id_short-indexed descendants, depth first.
///
/// # Errors
/// * `InvalidLocator`, `UnknownBackend` - If a source has no usable backend
/// * `Backend` - If a backend fails; later commits are not attempted
pub fn commit_with(model: &Model, registry: &BackendRegistry, element: ElementId) -> Result<()> {
    crate::log_op_start!("commit", element_id = %element);
    let start = std::time::Instant::now();

    let result = commit_element(model, registry, element);

    let duration = start.elapsed().as_millis() as u64;
    match &result {
        Ok(()) => crate::log_op_end!("commit", duration_ms = duration),
        Err(err) => crate::log_op_error!("commit", err.clone(), duration_ms = duration),
    }
    result
}

fn commit_element(model: &Model, registry: &BackendRegistry, element: ElementId) -> Result<()> {
    for ancestor in model.ancestors(element)? {
        let source = model.get(ancestor)?.source();
        if source.is_empty() {
            continue;
        }
        let path = model.relative_path(ancestor, element)?;
        tracing::debug!(
            source = %source,
            store_owner_id = %ancestor,
            relative_path = ?path,
            "committing to ancestor source"
        );
        registry
            .resolve(source)?
            .commit_object(model, element, ancestor, &path)?;
    }
    commit_own_sources(model, registry, element)
}

fn commit_own_sources(model: &Model, registry: &BackendRegistry, element: ElementId) -> Result<()> {
    let source = model.get(element)?.source();
    if !source.is_empty() {
        tracing::debug!(source = %source, "committing to own source");
        registry
            .resolve(source)?
            .commit_object(model, element, element, &[])?;
    }
    for child in model.referables(element)? {
        commit_own_sources(model, registry, child)?;
    }
    Ok(())
}
