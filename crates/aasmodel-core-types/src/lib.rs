//! Core types shared across aasmodel facilities
//!
//! This crate provides the canonical field keys and event names used by the
//! logging facility and the structured error facility of `aasmodel-core`.

pub mod schema;
