//! Generate typed Rust bindings for the structs and custom errors of a
//! contract ABI.
//!
//! The emitted code implements the runtime traits of `contract_abi`, so each
//! generated type can encode itself to and decode itself from the ABI wire
//! format, and custom errors can be recognized by selector.

pub mod builder;
pub mod config;
pub mod error;
pub mod generator;
pub mod naming;
pub mod type_mapper;

pub use builder::Builder;
pub use config::BindgenConfig;
pub use error::GeneratorError;
pub use generator::{generate, BindingKind, BindingSummary, GeneratedBindings};
pub use type_mapper::{HostType, TypeMapper};
