use thiserror::Error;

use crate::backend::BackendError;
use crate::model::ElementId;

/// Result type alias using AasError
pub type Result<T> = std::result::Result<T, AasError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling and testing. Several `AasError` variants share a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Construction/Validation
    InvalidInput,
    ConstraintViolation,

    // Containers
    Collision,
    ParentConflict,
    NotFound,

    // Resolution
    TypeMismatch,
    UnexpectedType,
    EmptyPath,
    IndexOutOfRange,
    NotImplemented,

    // Synchronization
    Backend,
    InvalidLocator,
    UnknownBackend,

    // Integrity
    IntegrityViolation,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::ConstraintViolation => "ERR_CONSTRAINT_VIOLATION",
            ExErrorKind::Collision => "ERR_COLLISION",
            ExErrorKind::ParentConflict => "ERR_PARENT_CONFLICT",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::TypeMismatch => "ERR_TYPE_MISMATCH",
            ExErrorKind::UnexpectedType => "ERR_UNEXPECTED_TYPE",
            ExErrorKind::EmptyPath => "ERR_EMPTY_PATH",
            ExErrorKind::IndexOutOfRange => "ERR_INDEX_OUT_OF_RANGE",
            ExErrorKind::NotImplemented => "ERR_NOT_IMPLEMENTED",
            ExErrorKind::Backend => "ERR_BACKEND",
            ExErrorKind::InvalidLocator => "ERR_INVALID_LOCATOR",
            ExErrorKind::UnknownBackend => "ERR_UNKNOWN_BACKEND",
            ExErrorKind::IntegrityViolation => "ERR_INTEGRITY_VIOLATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Classification fields for programmatic handling plus context for debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    element_id: Option<String>,
    attribute: Option<String>,
    constraint_id: Option<u16>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            element_id: None,
            attribute: None,
            constraint_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add element ID context
    pub fn with_element_id(mut self, id: impl Into<String>) -> Self {
        self.element_id = Some(id.into());
        self
    }

    /// Add indexed attribute context
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    /// Add the numeric id of the violated metamodel constraint
    pub fn with_constraint_id(mut self, constraint_id: u16) -> Self {
        self.constraint_id = Some(constraint_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn element_id(&self) -> Option<&str> {
        self.element_id.as_deref()
    }

    pub fn attribute(&self) -> Option<&str> {
        self.attribute.as_deref()
    }

    pub fn constraint_id(&self) -> Option<u16> {
        self.constraint_id
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(element_id) = &self.element_id {
            write!(f, " (element_id: {})", element_id)?;
        }
        if let Some(attribute) = &self.attribute {
            write!(f, " (attribute: {})", attribute)?;
        }
        if let Some(constraint_id) = self.constraint_id {
            write!(f, " (constraint: AASd-{:03})", constraint_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Error taxonomy for object model operations
#[derive(Error, Debug, Clone)]
pub enum AasError {
    // ===== Validation Errors =====
    /// A required string was empty
    #[error("{field} is not allowed to be an empty string")]
    EmptyValue { field: String },

    /// The element kind cannot be used for the requested operation
    #[error("Element kind {kind} is invalid here: {reason}")]
    InvalidElementKind { kind: String, reason: String },

    /// The element does not carry an attribute that the target set indexes
    #[error("Element {element_id} has no value for indexed attribute '{attribute}'")]
    MissingAttribute { element_id: String, attribute: String },

    /// A numbered metamodel constraint was violated
    #[error("{message} (Constraint AASd-{constraint_id:03})")]
    ConstraintViolation { constraint_id: u16, message: String },

    /// Walking the parents never reached an Identifiable
    #[error("Element {element_id} is not embedded within an Identifiable element")]
    NotEmbeddedInIdentifiable { element_id: String },

    /// The reference has no key with a global key type
    #[error("Reference cannot be represented as an Identifier, since it does not contain a Key with global KeyType (IRDI, IRI, CUSTOM)")]
    NoGlobalKey,

    /// Only detached elements can be disposed
    #[error("Element {element_id} is still attached to parent {parent_id}")]
    StillAttached {
        element_id: String,
        parent_id: String,
    },

    // ===== Container Errors =====
    /// An indexed attribute value is already taken in this or a sibling set
    #[error("Object with attribute (name='{attribute}', value='{value}') is already present in {}", collision_scope(.in_same_set))]
    Collision {
        attribute: String,
        value: String,
        in_same_set: bool,
    },

    /// The element already belongs to a different namespace
    #[error("Element {element_id} already has parent {parent_id}; it must not be part of two namespaces")]
    AlreadyHasParent {
        element_id: String,
        parent_id: String,
    },

    /// Adding the element would make it its own ancestor
    #[error("Element {element_id} can't be added below itself")]
    CycleDetected { element_id: String },

    /// No set of the namespace can hold elements indexed by this attribute
    #[error("Element {element_id} can't be added to namespace {owner_id}: no set indexes '{attribute}'")]
    NoMatchingSet {
        element_id: String,
        owner_id: String,
        attribute: String,
    },

    // ===== Not Found Errors =====
    /// Element not present in the model
    #[error("Element not found: {element_id}")]
    ElementNotFound { element_id: String },

    /// Set handle does not point to a set of its owner
    #[error("Namespace set {set} not found on element {owner_id}")]
    SetNotFound { owner_id: String, set: String },

    /// Element is not a member of the given set
    #[error("Element {element_id} not found in set '{set_name}'")]
    NotInSet { element_id: String, set_name: String },

    /// Attribute lookup found nothing
    #[error("Object with {attribute} {value} not found")]
    AttributeNotFound { attribute: String, value: String },

    /// Provider has no Identifiable for this identifier
    #[error("Identifiable not found: {identifier}")]
    IdentifiableNotFound { identifier: String },

    /// The global key of a reference could not be resolved
    #[error("Could not resolve global reference key {identifier}")]
    UnresolvedIdentifier { identifier: String },

    /// A local key of a reference could not be resolved
    #[error("Could not resolve id_short {id_short} at {path}")]
    UnresolvedIdShort { id_short: String, path: String },

    // ===== Type Errors =====
    /// Position-based operation on a set without order
    #[error("Namespace set '{set_name}' is not ordered")]
    NotOrdered { set_name: String },

    /// An intermediate element on a reference path holds no referables
    #[error("Object retrieved at {path} is not a Namespace")]
    NotANamespace { path: String },

    /// The element is not Referable (no id_short)
    #[error("Element {element_id} of kind {kind} is not referable")]
    NotReferable { element_id: String, kind: String },

    /// The resolved element is not of the referenced type; the element is kept for inspection
    #[error("Retrieved object {element} of kind {actual} is not an instance of referenced type {expected}")]
    UnexpectedType {
        element: ElementId,
        expected: String,
        actual: String,
    },

    // ===== Index Errors =====
    /// Reference has no keys
    #[error("List of keys is empty")]
    EmptyReference,

    /// Position outside of an ordered set
    #[error("Index {index} out of range for ordered set of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    // ===== Not Implemented =====
    /// References without any global key are not resolvable
    #[error("Local-only references without global identifier keys are not supported")]
    LocalReferenceUnsupported,

    // ===== Synchronization Errors =====
    /// Opaque backend failure, passed through unchanged
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Locator has no URI scheme
    #[error("{locator} is not a valid URL with URI scheme")]
    InvalidLocator { locator: String },

    /// Scheme that no locator can ever carry
    #[error("'{scheme}' is not a valid URI scheme")]
    InvalidScheme { scheme: String },

    /// No backend registered for the scheme
    #[error("No backend registered for URI scheme '{scheme}'")]
    UnknownBackend { scheme: String },

    // ===== Integrity Errors =====
    /// Parent link points at an element that doesn't exist
    #[error("Element {element_id} has parent {parent_id} which does not exist")]
    OrphanedElement {
        element_id: String,
        parent_id: String,
    },

    /// Parent links and set indexes disagree
    #[error("Inconsistent index for element {element_id}: {reason}")]
    InconsistentIndex { element_id: String, reason: String },

    // ===== Generic Errors =====
    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

fn collision_scope(in_same_set: &bool) -> &'static str {
    if *in_same_set {
        "this set of objects"
    } else {
        "another set in the same namespace"
    }
}

impl AasError {
    /// Shorthand for a numbered constraint violation
    pub fn constraint(constraint_id: u16, message: impl Into<String>) -> Self {
        AasError::ConstraintViolation {
            constraint_id,
            message: message.into(),
        }
    }

    /// The wrongly typed element carried by `UnexpectedType`
    pub fn unexpected_element(&self) -> Option<ElementId> {
        match self {
            AasError::UnexpectedType { element, .. } => Some(*element),
            _ => None,
        }
    }
}

/// Conversion from AasError to ExError
impl From<AasError> for ExError {
    fn from(err: AasError) -> Self {
        let message = err.to_string();
        match err {
            AasError::EmptyValue { field } => ExError::new(ExErrorKind::InvalidInput)
                .with_attribute(field)
                .with_message(message),

            AasError::InvalidElementKind { .. } | AasError::NoGlobalKey => {
                ExError::new(ExErrorKind::InvalidInput).with_message(message)
            }

            AasError::MissingAttribute {
                element_id,
                attribute,
            } => ExError::new(ExErrorKind::InvalidInput)
                .with_element_id(element_id)
                .with_attribute(attribute)
                .with_message(message),

            AasError::NotEmbeddedInIdentifiable { element_id }
            | AasError::StillAttached { element_id, .. } => {
                ExError::new(ExErrorKind::InvalidInput)
                    .with_element_id(element_id)
                    .with_message(message)
            }

            AasError::ConstraintViolation { constraint_id, .. } => {
                ExError::new(ExErrorKind::ConstraintViolation)
                    .with_constraint_id(constraint_id)
                    .with_message(message)
            }

            AasError::Collision { attribute, .. } => ExError::new(ExErrorKind::Collision)
                .with_attribute(attribute)
                .with_message(message),

            AasError::AlreadyHasParent { element_id, .. } => {
                ExError::new(ExErrorKind::ParentConflict)
                    .with_element_id(element_id)
                    .with_message(message)
            }

            AasError::CycleDetected { element_id } => ExError::new(ExErrorKind::ParentConflict)
                .with_element_id(element_id)
                .with_message(message),

            AasError::NoMatchingSet {
                element_id,
                attribute,
                ..
            } => ExError::new(ExErrorKind::TypeMismatch)
                .with_element_id(element_id)
                .with_attribute(attribute)
                .with_message(message),

            AasError::ElementNotFound { element_id } | AasError::NotInSet { element_id, .. } => {
                ExError::new(ExErrorKind::NotFound)
                    .with_element_id(element_id)
                    .with_message(message)
            }

            AasError::SetNotFound { owner_id, .. } => ExError::new(ExErrorKind::NotFound)
                .with_element_id(owner_id)
                .with_message(message),

            AasError::AttributeNotFound { attribute, .. } => ExError::new(ExErrorKind::NotFound)
                .with_attribute(attribute)
                .with_message(message),

            AasError::IdentifiableNotFound { .. }
            | AasError::UnresolvedIdentifier { .. }
            | AasError::UnresolvedIdShort { .. } => {
                ExError::new(ExErrorKind::NotFound).with_message(message)
            }

            AasError::NotANamespace { .. } | AasError::NotOrdered { .. } => {
                ExError::new(ExErrorKind::TypeMismatch).with_message(message)
            }

            AasError::NotReferable { element_id, .. } => ExError::new(ExErrorKind::TypeMismatch)
                .with_element_id(element_id)
                .with_message(message),

            AasError::UnexpectedType { element, .. } => ExError::new(ExErrorKind::UnexpectedType)
                .with_element_id(element.to_string())
                .with_message(message),

            AasError::EmptyReference => {
                ExError::new(ExErrorKind::EmptyPath).with_message(message)
            }

            AasError::IndexOutOfRange { .. } => {
                ExError::new(ExErrorKind::IndexOutOfRange).with_message(message)
            }

            AasError::LocalReferenceUnsupported => {
                ExError::new(ExErrorKind::NotImplemented).with_message(message)
            }

            AasError::Backend(_) => ExError::new(ExErrorKind::Backend).with_message(message),

            AasError::InvalidLocator { .. } | AasError::InvalidScheme { .. } => {
                ExError::new(ExErrorKind::InvalidLocator).with_message(message)
            }

            AasError::UnknownBackend { .. } => {
                ExError::new(ExErrorKind::UnknownBackend).with_message(message)
            }

            AasError::OrphanedElement { element_id, .. }
            | AasError::InconsistentIndex { element_id, .. } => {
                ExError::new(ExErrorKind::IntegrityViolation)
                    .with_element_id(element_id)
                    .with_message(message)
            }

            AasError::Internal { .. } => ExError::new(ExErrorKind::Internal).with_message(message),
        }
    }
}
