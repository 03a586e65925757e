//! Crate-level unit and behaviour tests for the facade.

pub(crate) mod support;
