//! Structural integrity checks over a whole model

pub mod invariants;
pub mod validation;

pub use validation::validate_model;
