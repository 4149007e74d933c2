use aasmodel_core::errors::{AasError, ExError, ExErrorKind};
use aasmodel_core::BackendError;

#[test]
fn test_collision_verifiable_by_kind() {
    let err = AasError::Collision {
        attribute: "id_short".to_string(),
        value: "TEMP".to_string(),
        in_same_set: false,
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::Collision);
    assert_eq!(ex_err.code(), "ERR_COLLISION");
    assert_eq!(ex_err.attribute(), Some("id_short"));
    assert!(ex_err.message().contains("another set in the same namespace"));
}

#[test]
fn test_parent_conflict_carries_element() {
    let err = AasError::AlreadyHasParent {
        element_id: "child".to_string(),
        parent_id: "other".to_string(),
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::ParentConflict);
    assert_eq!(ex_err.element_id(), Some("child"));
}

#[test]
fn test_constraint_violation_structured_fields() {
    let err = AasError::constraint(2, "The id_short must start with a letter");

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::ConstraintViolation);
    assert_eq!(ex_err.code(), "ERR_CONSTRAINT_VIOLATION");
    assert_eq!(ex_err.constraint_id(), Some(2));
    assert!(ex_err.to_string().contains("(constraint: AASd-002)"));
}

#[test]
fn test_resolution_errors_are_distinct() {
    let unresolved: ExError = AasError::UnresolvedIdShort {
        id_short: "x".to_string(),
        path: "IRI=urn:sm".to_string(),
    }
    .into();
    let not_namespace: ExError = AasError::NotANamespace {
        path: "IRI=urn:sm / IDSHORT=p".to_string(),
    }
    .into();
    let empty: ExError = AasError::EmptyReference.into();
    let local: ExError = AasError::LocalReferenceUnsupported.into();

    assert_eq!(unresolved.kind(), ExErrorKind::NotFound);
    assert_eq!(not_namespace.kind(), ExErrorKind::TypeMismatch);
    assert_eq!(empty.kind(), ExErrorKind::EmptyPath);
    assert_eq!(local.kind(), ExErrorKind::NotImplemented);
}

#[test]
fn test_backend_error_passes_through() {
    let err: AasError = BackendError::msg("connection refused").into();
    assert_eq!(err.to_string(), "connection refused");

    let ex_err: ExError = err.into();
    assert_eq!(ex_err.kind(), ExErrorKind::Backend);
    assert_eq!(ex_err.message(), "connection refused");
}

#[test]
fn test_error_kind_code_mapping() {
    let kinds = vec![
        (ExErrorKind::InvalidInput, "ERR_INVALID_INPUT"),
        (ExErrorKind::ConstraintViolation, "ERR_CONSTRAINT_VIOLATION"),
        (ExErrorKind::Collision, "ERR_COLLISION"),
        (ExErrorKind::ParentConflict, "ERR_PARENT_CONFLICT"),
        (ExErrorKind::NotFound, "ERR_NOT_FOUND"),
        (ExErrorKind::TypeMismatch, "ERR_TYPE_MISMATCH"),
        (ExErrorKind::UnexpectedType, "ERR_UNEXPECTED_TYPE"),
        (ExErrorKind::EmptyPath, "ERR_EMPTY_PATH"),
        (ExErrorKind::IndexOutOfRange, "ERR_INDEX_OUT_OF_RANGE"),
        (ExErrorKind::NotImplemented, "ERR_NOT_IMPLEMENTED"),
        (ExErrorKind::Backend, "ERR_BACKEND"),
        (ExErrorKind::InvalidLocator, "ERR_INVALID_LOCATOR"),
        (ExErrorKind::UnknownBackend, "ERR_UNKNOWN_BACKEND"),
        (ExErrorKind::IntegrityViolation, "ERR_INTEGRITY_VIOLATION"),
        (ExErrorKind::Internal, "ERR_INTERNAL"),
    ];

    for (kind, expected_code) in kinds {
        assert_eq!(kind.code(), expected_code);
    }
}

#[test]
fn test_ex_error_builder_and_display() {
    let inner = ExError::new(ExErrorKind::Backend).with_message("disk full");
    let err = ExError::new(ExErrorKind::Internal)
        .with_op("commit")
        .with_element_id("e1")
        .with_message("write failed")
        .with_source(inner);

    assert_eq!(err.op(), Some("commit"));
    assert_eq!(
        err.to_string(),
        "[ERR_INTERNAL] in operation 'commit': write failed (element_id: e1)"
    );
    assert_eq!(err.source_error().map(ExError::code), Some("ERR_BACKEND"));
    assert!(std::error::Error::source(&err).is_some());
}
