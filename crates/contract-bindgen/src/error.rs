use contract_abi::SchemaError;
use thiserror::Error;

/// Reasons generation refuses to emit code.
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("ABI entry `{entry}` is invalid: {source}")]
    Schema {
        entry: String,
        #[source]
        source: SchemaError,
    },

    #[error("entry `{entry}`: field identifier `{field}` is still ambiguous after renaming")]
    IdentifierCollision { entry: String, field: String },

    #[error("type identifier `{name}` is produced by more than one struct or error")]
    TypeCollision { name: String },

    #[error("entry `{entry}`: anonymous tuple of {arity} fields has no Rust tuple mapping (max 8)")]
    UnsupportedTuple { entry: String, arity: usize },

    #[error("failed to render bindings: {0}")]
    Render(#[from] std::fmt::Error),
}

impl GeneratorError {
    pub(crate) fn from_schema(source: &SchemaError) -> Self {
        GeneratorError::Schema {
            entry: source.entry().unwrap_or("<abi>").to_string(),
            source: source.clone(),
        }
    }
}
