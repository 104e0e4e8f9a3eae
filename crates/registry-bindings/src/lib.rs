//! Typed bindings for the Hyperdrive registry contract.
//!
//! The struct and error types are generated by the build script from
//! `abi/HyperdriveRegistry.json`; [`schema`] loads the same ABI for routing
//! calldata, revert data and logs at runtime.

use contract_abi::{Schema, SchemaError};

mod generated {
    include!(concat!(env!("OUT_DIR"), "/hyperdrive_registry.rs"));
}

pub use generated::*;

pub const ABI_JSON: &str = include_str!("../abi/HyperdriveRegistry.json");

pub fn schema() -> Result<Schema, SchemaError> {
    Schema::from_json(ABI_JSON)
}
