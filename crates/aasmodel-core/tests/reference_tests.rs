#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use aasmodel_core::errors::AasError;
use aasmodel_core::model::{Key, KeyElements, KeyType};
use aasmodel_core::{AasReference, DictObjectProvider, Model};
use common::{create_property, create_submodel, setup_simple_tree};

fn sm_key() -> Key {
    Key::new(KeyElements::Submodel, "urn:example:sm", KeyType::Iri).unwrap()
}

fn id_short_key(kind: KeyElements, id_short: &str) -> Key {
    Key::new(kind, id_short, KeyType::IdShort).unwrap()
}

#[test]
fn test_resolve_nested_property() {
    let mut model = Model::new();
    let (sm, _, temp) = setup_simple_tree(&mut model);
    let mut provider = DictObjectProvider::new();
    provider.add(&model, sm).unwrap();

    let reference = AasReference::new(
        vec![
            sm_key(),
            id_short_key(KeyElements::SubmodelElementCollection, "coll"),
            id_short_key(KeyElements::Property, "TEMP"),
        ],
        KeyElements::Property,
    );

    assert_eq!(reference.resolve(&model, &provider).unwrap(), temp);
}

#[test]
fn test_resolve_through_model_scan() {
    let mut model = Model::new();
    let (sm, _, _) = setup_simple_tree(&mut model);

    let reference = AasReference::new(vec![sm_key()], KeyElements::Submodel);
    assert_eq!(reference.resolve(&model, &model).unwrap(), sm);
}

#[test]
fn test_abstract_target_accepts_concrete_kind() {
    let mut model = Model::new();
    let (_, _, temp) = setup_simple_tree(&mut model);

    let reference = AasReference::from_referable(&model, temp).unwrap();
    let as_data_element =
        AasReference::from_reference(reference.reference().clone(), KeyElements::DataElement);
    assert_eq!(as_data_element.resolve(&model, &model).unwrap(), temp);
}

#[test]
fn test_empty_reference() {
    let model = Model::new();
    let reference = AasReference::new(Vec::new(), KeyElements::Property);

    assert!(matches!(
        reference.resolve(&model, &model),
        Err(AasError::EmptyReference)
    ));
    assert!(matches!(
        reference.get_identifier(),
        Err(AasError::NoGlobalKey)
    ));
}

#[test]
fn test_local_only_reference() {
    let model = Model::new();
    let reference = AasReference::new(
        vec![id_short_key(KeyElements::Property, "temp")],
        KeyElements::Property,
    );

    assert!(matches!(
        reference.resolve(&model, &model),
        Err(AasError::LocalReferenceUnsupported)
    ));
}

#[test]
fn test_unknown_identifier() {
    let mut model = Model::new();
    setup_simple_tree(&mut model);
    let provider = DictObjectProvider::new();

    let reference = AasReference::new(vec![sm_key()], KeyElements::Submodel);
    match reference.resolve(&model, &provider) {
        Err(AasError::UnresolvedIdentifier { identifier }) => {
            assert_eq!(identifier, "IRI=urn:example:sm");
        }
        other => panic!("expected UnresolvedIdentifier, got {:?}", other),
    }
}

#[test]
fn test_key_below_non_namespace() {
    let mut model = Model::new();
    setup_simple_tree(&mut model);

    let reference = AasReference::new(
        vec![
            sm_key(),
            id_short_key(KeyElements::SubmodelElementCollection, "coll"),
            id_short_key(KeyElements::Property, "temp"),
            id_short_key(KeyElements::Property, "deeper"),
        ],
        KeyElements::Property,
    );

    match reference.resolve(&model, &model) {
        Err(AasError::NotANamespace { path }) => {
            assert_eq!(path, "IRI=urn:example:sm / IDSHORT=coll / IDSHORT=temp");
        }
        other => panic!("expected NotANamespace, got {:?}", other),
    }
}

#[test]
fn test_missing_id_short() {
    let mut model = Model::new();
    setup_simple_tree(&mut model);

    let reference = AasReference::new(
        vec![
            sm_key(),
            id_short_key(KeyElements::SubmodelElementCollection, "other"),
        ],
        KeyElements::SubmodelElementCollection,
    );

    match reference.resolve(&model, &model) {
        Err(AasError::UnresolvedIdShort { id_short, path }) => {
            assert_eq!(id_short, "other");
            assert_eq!(path, "IRI=urn:example:sm");
        }
        other => panic!("expected UnresolvedIdShort, got {:?}", other),
    }
}

#[test]
fn test_unexpected_type_carries_element() {
    let mut model = Model::new();
    let (_, coll, _) = setup_simple_tree(&mut model);

    let reference = AasReference::new(
        vec![
            sm_key(),
            id_short_key(KeyElements::SubmodelElementCollection, "coll"),
        ],
        KeyElements::Property,
    );

    let err = reference.resolve(&model, &model).unwrap_err();
    assert!(matches!(err, AasError::UnexpectedType { .. }));
    assert_eq!(err.unexpected_element(), Some(coll));
}

#[test]
fn test_resolution_starts_at_last_global_key() {
    let mut model = Model::new();
    let sm = create_submodel(&mut model, "urn:other", "other");
    let prop = create_property(&mut model, "p");
    model.add_referable(sm, prop).unwrap();

    let reference = AasReference::new(
        vec![
            Key::new(KeyElements::GlobalReference, "urn:unknown", KeyType::Iri).unwrap(),
            Key::new(KeyElements::Submodel, "urn:other", KeyType::Iri).unwrap(),
            id_short_key(KeyElements::Property, "p"),
        ],
        KeyElements::Property,
    );

    assert_eq!(
        reference.get_identifier().unwrap().id(),
        "urn:other"
    );
    assert_eq!(reference.resolve(&model, &model).unwrap(), prop);
}

#[test]
fn test_from_referable_round_trip() {
    let mut model = Model::new();
    let (sm, coll, temp) = setup_simple_tree(&mut model);

    let reference = AasReference::from_referable(&model, temp).unwrap();
    assert_eq!(reference.target(), KeyElements::Property);
    assert_eq!(reference.keys().len(), 3);
    assert_eq!(reference.keys()[0], sm_key());
    assert_eq!(
        reference.keys()[2],
        id_short_key(KeyElements::Property, "temp")
    );
    assert_eq!(reference.resolve(&model, &model).unwrap(), temp);

    for element in [sm, coll] {
        let reference = AasReference::from_referable(&model, element).unwrap();
        assert_eq!(reference.resolve(&model, &model).unwrap(), element);
    }
}

#[test]
fn test_from_referable_requires_identifiable_root() {
    let mut model = Model::new();
    let prop = create_property(&mut model, "loose");

    assert!(matches!(
        AasReference::from_referable(&model, prop),
        Err(AasError::NotEmbeddedInIdentifiable { .. })
    ));
}

#[test]
fn test_from_referable_rejects_qualifier() {
    let mut model = Model::new();
    let qualifier = model.create_qualifier("unit").unwrap();

    assert!(matches!(
        AasReference::from_referable(&model, qualifier),
        Err(AasError::NotReferable { .. })
    ));
}

#[test]
fn test_provider_rejects_duplicate_identifier() {
    let mut model = Model::new();
    let first = create_submodel(&mut model, "urn:dup", "first");
    let second = create_submodel(&mut model, "urn:dup", "second");
    let prop = create_property(&mut model, "p");
    let mut provider = DictObjectProvider::new();

    provider.add(&model, first).unwrap();
    provider.add(&model, first).unwrap();
    assert!(matches!(
        provider.add(&model, second),
        Err(AasError::Collision { .. })
    ));
    assert!(matches!(
        provider.add(&model, prop),
        Err(AasError::InvalidElementKind { .. })
    ));
    assert_eq!(provider.len(), 1);
}
