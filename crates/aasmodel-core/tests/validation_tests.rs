#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use aasmodel_core::model::ElementKind;
use aasmodel_core::rules::{invariants, validate_model};
use aasmodel_core::Model;
use common::{create_collection, create_property, create_submodel, setup_simple_tree};

#[test]
fn test_validate_model_succeeds_on_empty_model() {
    let model = Model::new();
    assert!(validate_model(&model).is_ok());
}

#[test]
fn test_validate_model_succeeds_on_tree() {
    let mut model = Model::new();
    setup_simple_tree(&mut model);
    assert!(validate_model(&model).is_ok());
}

#[test]
fn test_validate_model_after_mixed_operations() {
    let mut model = Model::new();
    let (sm, coll, temp) = setup_simple_tree(&mut model);

    let unit = model.create_qualifier("unit").unwrap();
    model.add_qualifier(temp, unit).unwrap();
    let ext = model.create_extension("vendor").unwrap();
    model.add_extension(sm, ext).unwrap();

    let entity = model.create_referable(ElementKind::Entity, "robot").unwrap();
    model.add_referable(sm, entity).unwrap();
    let arm = create_property(&mut model, "arm");
    model.add_referable(entity, arm).unwrap();

    model.set_id_short(temp, "temperature").unwrap();
    model.remove_referable(coll, "TEMPERATURE").unwrap();
    model.add_referable(entity, temp).unwrap();
    model.remove_qualifier_by_type(temp, "unit").unwrap();

    assert!(validate_model(&model).is_ok());
    assert!(invariants::find_orphans(&model).is_empty());
    assert!(invariants::find_unindexed_children(&model).is_empty());
    assert!(invariants::find_foreign_members(&model).is_empty());
    assert!(invariants::find_stale_entries(&model).is_empty());
    assert!(invariants::find_cross_set_duplicates(&model).is_empty());
    assert!(invariants::find_order_mismatches(&model).is_empty());
}

#[test]
fn test_validate_model_after_dispose() {
    let mut model = Model::new();
    let sm = create_submodel(&mut model, "urn:sm", "sm");
    let coll = create_collection(&mut model, "coll");
    for name in ["a", "b", "c"] {
        let prop = create_property(&mut model, name);
        model.add_referable(coll, prop).unwrap();
    }
    model.add_referable(sm, coll).unwrap();

    model.remove_referable(sm, "coll").unwrap();
    model.dispose(coll).unwrap();

    assert_eq!(model.len(), 1);
    assert_eq!(model.roots(), vec![sm]);
    assert!(validate_model(&model).is_ok());
}

#[test]
fn test_no_cycles_in_deep_chain() {
    let mut model = Model::new();
    let sm = create_submodel(&mut model, "urn:sm", "sm");
    let mut parent = sm;
    for depth in 0..20 {
        let coll = create_collection(&mut model, &format!("level{}", depth));
        model.add_referable(parent, coll).unwrap();
        parent = coll;
    }

    for element in model.list_elements() {
        assert!(!invariants::has_cycle(&model, element.id()));
    }
    assert_eq!(model.ancestors(parent).unwrap().len(), 20);
    assert!(validate_model(&model).is_ok());
}
