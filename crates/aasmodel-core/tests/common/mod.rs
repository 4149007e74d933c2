use std::sync::{Arc, Mutex};

use aasmodel_core::model::{ElementId, ElementKind, Identifier, IdentifierType};
use aasmodel_core::{Backend, BackendError, Model};

/// Create a Submodel with an IRI identifier
#[allow(dead_code)]
pub fn create_submodel(model: &mut Model, iri: &str, id_short: &str) -> ElementId {
    let identifier = Identifier::new(iri, IdentifierType::Iri).unwrap();
    model
        .create_identifiable(ElementKind::Submodel, identifier, Some(id_short))
        .unwrap()
}

#[allow(dead_code)]
pub fn create_property(model: &mut Model, id_short: &str) -> ElementId {
    model.create_referable(ElementKind::Property, id_short).unwrap()
}

#[allow(dead_code)]
pub fn create_collection(model: &mut Model, id_short: &str) -> ElementId {
    model
        .create_referable(ElementKind::SubmodelElementCollection, id_short)
        .unwrap()
}

/// Setup a simple tree: Submodel "sm" -> Collection "coll" -> Property "temp"
///
/// Returns (submodel, collection, property)
#[allow(dead_code)]
pub fn setup_simple_tree(model: &mut Model) -> (ElementId, ElementId, ElementId) {
    let sm = create_submodel(model, "urn:example:sm", "sm");
    let coll = create_collection(model, "coll");
    let temp = create_property(model, "temp");
    model.add_referable(sm, coll).unwrap();
    model.add_referable(coll, temp).unwrap();
    (sm, coll, temp)
}

#[allow(dead_code)]
pub fn id_shorts(model: &Model, ids: &[ElementId]) -> Vec<String> {
    ids.iter()
        .map(|id| model.get(*id).unwrap().id_short().unwrap_or_default().to_string())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallKind {
    Commit,
    Update,
}

/// One backend invocation as seen by a [`RecordingBackend`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub kind: CallKind,
    pub tag: String,
    pub element: ElementId,
    pub store_owner: ElementId,
    pub relative_path: Vec<String>,
}

/// Backend that records every call into a shared log
///
/// Several instances can share one log; `tag` tells them apart.
#[derive(Clone)]
pub struct RecordingBackend {
    tag: String,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    fail: bool,
}

#[allow(dead_code)]
impl RecordingBackend {
    pub fn new(tag: &str, calls: Arc<Mutex<Vec<RecordedCall>>>) -> Self {
        Self {
            tag: tag.to_string(),
            calls,
            fail: false,
        }
    }

    pub fn failing(tag: &str, calls: Arc<Mutex<Vec<RecordedCall>>>) -> Self {
        Self {
            tag: tag.to_string(),
            calls,
            fail: true,
        }
    }

    fn record(
        &self,
        kind: CallKind,
        element: ElementId,
        store_owner: ElementId,
        relative_path: &[String],
    ) -> Result<(), BackendError> {
        self.calls.lock().unwrap().push(RecordedCall {
            kind,
            tag: self.tag.clone(),
            element,
            store_owner,
            relative_path: relative_path.to_vec(),
        });
        if self.fail {
            return Err(BackendError::msg(format!("{} is offline", self.tag)));
        }
        Ok(())
    }
}

impl Backend for RecordingBackend {
    fn commit_object(
        &self,
        _model: &Model,
        committed: ElementId,
        store_owner: ElementId,
        relative_path: &[String],
    ) -> Result<(), BackendError> {
        self.record(CallKind::Commit, committed, store_owner, relative_path)
    }

    fn update_object(
        &self,
        _model: &mut Model,
        updated: ElementId,
        store_owner: ElementId,
        relative_path: &[String],
    ) -> Result<(), BackendError> {
        self.record(CallKind::Update, updated, store_owner, relative_path)
    }
}

#[allow(dead_code)]
pub fn new_call_log() -> Arc<Mutex<Vec<RecordedCall>>> {
    Arc::new(Mutex::new(Vec::new()))
}
