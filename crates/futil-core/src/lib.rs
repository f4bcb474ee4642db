#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data for futil: the type binding registry and naming utilities.
//!
//! - [`TypeBindings`]: ordered `label -> concrete type` mapping, built from
//!   `label=Type` pairs and optionally the [`BASICS`] preset
//! - [`case`]: identifier case conversions used by template helpers

mod basics;
mod bindings;
pub mod case;


pub use basics::BASICS;
pub use bindings::{Binding, BindingError, TypeBindings};
