#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use aasmodel_core::errors::AasError;
use aasmodel_core::model::{Key, KeyElements, KeyType};
use aasmodel_core::rules::validate_model;
use aasmodel_core::Model;
use common::{create_property, create_submodel};
use proptest::prelude::*;

fn key_type() -> impl Strategy<Value = KeyType> {
    prop_oneof![
        Just(KeyType::Irdi),
        Just(KeyType::Iri),
        Just(KeyType::Custom),
        Just(KeyType::IdShort),
        Just(KeyType::FragmentId),
    ]
}

fn id_short() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9_]{0,15}"
}

#[derive(Debug, Clone)]
enum Step {
    Add(String),
    Remove(String),
    Rename(String, String),
}

fn step() -> impl Strategy<Value = Step> {
    let name = "[a-e]{1,2}";
    prop_oneof![
        name.prop_map(Step::Add),
        name.prop_map(Step::Remove),
        (name, name).prop_map(|(from, to)| Step::Rename(from, to)),
    ]
}

proptest! {
    #[test]
    fn prop_global_key_has_identifier(value in "[a-z:]{1,20}", id_type in key_type()) {
        let key = Key::new(KeyElements::Submodel, value.clone(), id_type).unwrap();
        let identifier = key.get_identifier();
        prop_assert_eq!(identifier.is_some(), !id_type.is_local());
        if let Some(identifier) = identifier {
            prop_assert_eq!(identifier.id(), value.as_str());
        }
    }

    #[test]
    fn prop_local_key_type_rejected_for_global_kinds(value in "[a-z]{1,10}", local in prop_oneof![Just(KeyType::IdShort), Just(KeyType::FragmentId)]) {
        let global = Key::new(KeyElements::GlobalReference, value.clone(), local);
        prop_assert!(
            matches!(global, Err(AasError::ConstraintViolation { constraint_id: 80, .. })),
            "expected AASd-080 violation"
        );
        let shell = Key::new(KeyElements::AssetAdministrationShell, value, local);
        prop_assert!(
            matches!(shell, Err(AasError::ConstraintViolation { constraint_id: 81, .. })),
            "expected AASd-081 violation"
        );
    }

    #[test]
    fn prop_case_variant_id_short_collides(name in id_short()) {
        let mut model = Model::new();
        let sm = create_submodel(&mut model, "urn:sm", "sm");
        let first = create_property(&mut model, &name);
        let second = create_property(&mut model, &name.to_uppercase());

        model.add_referable(sm, first).unwrap();
        let result = model.add_referable(sm, second);

        prop_assert!(matches!(result, Err(AasError::Collision { .. })), "expected collision");
        prop_assert_eq!(model.get(second).unwrap().parent(), None);
        prop_assert_eq!(model.get_referable(sm, &name.to_lowercase()).unwrap(), first);
    }

    #[test]
    fn prop_random_edits_keep_model_consistent(steps in prop::collection::vec(step(), 1..40)) {
        let mut model = Model::new();
        let sm = create_submodel(&mut model, "urn:sm", "sm");

        for step in steps {
            // failures are expected; they must leave the model consistent
            match step {
                Step::Add(name) => {
                    let prop = create_property(&mut model, &name);
                    let _ = model.add_referable(sm, prop);
                }
                Step::Remove(name) => {
                    let _ = model.remove_referable(sm, &name);
                }
                Step::Rename(from, to) => {
                    if let Ok(member) = model.get_referable(sm, &from) {
                        let _ = model.set_id_short(member, &to);
                    }
                }
            }
            prop_assert!(validate_model(&model).is_ok());
        }

        let mut names: Vec<String> = model
            .referables(sm)
            .unwrap()
            .iter()
            .map(|id| model.get(*id).unwrap().id_short().unwrap().to_uppercase())
            .collect();
        let total = names.len();
        names.sort();
        names.dedup();
        prop_assert_eq!(names.len(), total);
    }
}
