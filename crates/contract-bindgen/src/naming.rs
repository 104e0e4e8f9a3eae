//! Identifier renaming rules.
//!
//! Field identifiers:
//! 1. `snake_case` of the ABI name; an empty name (or one with no
//!    identifier characters) becomes `arg{index}`.
//! 2. Rust keywords get a trailing `_` (`type` -> `type_`, `self` -> `self_`).
//! 3. A field colliding with an earlier field of the same entry gets
//!    `_{index}` appended, `index` being its zero-based parameter position.
//! 4. A collision that survives step 3 is a
//!    [`GeneratorError::IdentifierCollision`].
//!
//! Type identifiers keep the ABI name with `$` replaced by `_`. Keywords and
//! names the generated code imports from the runtime get a trailing `_`.

use crate::error::GeneratorError;
use heck::{ToSnakeCase, ToUpperCamelCase};
use std::collections::BTreeSet;

const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "self", "Self", "static", "struct", "super", "trait", "true", "try", "type",
    "typeof", "union", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Names in scope in every generated file.
const RESERVED_TYPES: &[&str] = &[
    "AbiError", "AbiStruct", "AbiType", "AbiValue", "Address", "BigInt", "BigUint", "Box",
    "Bytes", "CodecError", "Err", "ErrorInfo", "ErrorParam", "FixedBytes", "FromAbiValue",
    "IntoAbiValue", "None", "Ok", "Option", "Param", "Result", "Selector", "Some", "String",
    "TupleReader", "TupleType", "Vec",
];

pub fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_') && name != "_"
}

/// Steps 1 and 2 for a single parameter.
pub fn field_ident(name: &str, index: usize) -> String {
    let snake = name.replace('$', "_").to_snake_case();
    if snake.is_empty() || !is_identifier(&snake) {
        return format!("arg{index}");
    }
    if is_keyword(&snake) {
        format!("{snake}_")
    } else {
        snake
    }
}

/// Field identifiers for all parameters of `entry`, in order.
pub fn field_idents<'a>(
    entry: &str,
    names: impl IntoIterator<Item = &'a str>,
) -> Result<Vec<String>, GeneratorError> {
    let mut used = BTreeSet::new();
    let mut idents = Vec::new();
    for (index, name) in names.into_iter().enumerate() {
        let mut ident = field_ident(name, index);
        if used.contains(&ident) {
            ident = format!("{ident}_{index}");
        }
        if !used.insert(ident.clone()) {
            return Err(GeneratorError::IdentifierCollision {
                entry: entry.to_string(),
                field: ident,
            });
        }
        idents.push(ident);
    }
    Ok(idents)
}

/// Rust type identifier for a struct or error name.
pub fn type_ident(name: &str) -> String {
    let ident = name.replace('$', "_");
    if is_keyword(&ident) || RESERVED_TYPES.contains(&ident.as_str()) {
        format!("{ident}_")
    } else {
        ident
    }
}

/// Contract names are kept when they are already identifiers
/// (`IHyperdriveRegistry`), otherwise converted to `UpperCamelCase`.
pub fn contract_ident(name: &str) -> String {
    let ident = if is_identifier(name) {
        name.to_string()
    } else {
        name.to_upper_camel_case()
    };
    if ident.is_empty() || !is_identifier(&ident) {
        return "Contract".to_string();
    }
    type_ident(&ident)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_ident_rules() {
        assert_eq!(field_ident("factoryAddress", 0), "factory_address");
        assert_eq!(field_ident("", 3), "arg3");
        assert_eq!(field_ident("type", 0), "type_");
        assert_eq!(field_ident("self", 1), "self_");
        assert_eq!(field_ident("_value", 0), "value");
        assert_eq!(field_ident("$", 2), "arg2");
    }

    #[test]
    fn test_collisions_get_position_suffix() {
        let idents = field_idents("Pair", ["amount", "Amount", "_amount"]).unwrap();
        assert_eq!(idents, ["amount", "amount_1", "amount_2"]);

        let idents = field_idents("Anon", ["", "", "arg0"]).unwrap();
        assert_eq!(idents, ["arg0", "arg1", "arg0_2"]);
    }

    #[test]
    fn test_unresolvable_collision() {
        let err = field_idents("Clash", ["a_2", "a", "a"]).unwrap_err();
        assert!(matches!(
            err,
            GeneratorError::IdentifierCollision { ref entry, ref field } if entry == "Clash" && field == "a_2"
        ));
    }

    #[test]
    fn test_type_ident() {
        assert_eq!(type_ident("FactoryInfo"), "FactoryInfo");
        assert_eq!(type_ident("Price$Feed"), "Price_Feed");
        assert_eq!(type_ident("Address"), "Address_");
        assert_eq!(type_ident("Self"), "Self_");
    }

    #[test]
    fn test_contract_ident() {
        assert_eq!(contract_ident("IHyperdriveRegistry"), "IHyperdriveRegistry");
        assert_eq!(contract_ident("erc20-token"), "Erc20Token");
        assert_eq!(contract_ident("123"), "Contract");
    }
}
