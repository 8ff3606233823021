//! Derives the EIP-712 `types` schema from the JSON shape of a flattened sign doc.
//!
//! Each `msg{i}` field is walked recursively: JSON primitives become `bool`, `int64` or
//! `string` fields, nested objects become their own type definitions named after the
//! path leading to them (`_.value.amount` => `TypeValueAmount`). Every type definition is
//! registered under its name plus the first free numeric suffix, unless an identical
//! definition already sits under one of those names, in which case it is shared.
//!
//! Object keys are visited in descending byte order. Changing the order changes the
//! generated type names, and therefore the signed hash.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    errors::{Error, Result},
    message::msg_field_for_index,
};

pub const ROOT_PREFIX: &str = "_";
pub const TYPE_PREFIX: &str = "Type";

pub const EIP712_DOMAIN_TYPE: &str = "EIP712Domain";
pub const TX_FIELD: &str = "Tx";
pub const FEE_TYPE: &str = "Fee";
pub const COIN_TYPE: &str = "Coin";

pub const ETH_BOOL: &str = "bool";
pub const ETH_INT64: &str = "int64";
pub const ETH_STRING: &str = "string";

/// The message field holding the amino type url, e.g. `cosmos-sdk/MsgSend`.
pub const MSG_TYPE: &str = "type";

pub const MAX_TYPEDEF_DUPLICATES: usize = 1000;

/// A field of an EIP-712 struct type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Type {
    pub name: String,
    #[serde(rename = "type")]
    pub r#type: String,
}

impl Type {
    pub fn new<N, T>(name: N, r#type: T) -> Self
    where
        N: Into<String>,
        T: Into<String>,
    {
        Self {
            name: name.into(),
            r#type: r#type.into(),
        }
    }
}

/// Type definitions keyed by type name.
pub type Types = BTreeMap<String, Vec<Type>>;

pub fn eip712_domain_type() -> Vec<Type> {
    vec![
        Type::new("name", ETH_STRING),
        Type::new("version", ETH_STRING),
        Type::new("chainId", "uint256"),
        Type::new("verifyingContract", ETH_STRING),
        Type::new("salt", ETH_STRING),
    ]
}

pub fn fee_type() -> Vec<Type> {
    vec![Type::new("amount", "Coin[]"), Type::new("gas", ETH_STRING)]
}

pub fn coin_type() -> Vec<Type> {
    vec![Type::new("denom", ETH_STRING), Type::new("amount", ETH_STRING)]
}

/// The constant part of every schema, before any message field is appended to `Tx`.
pub fn root_types() -> Types {
    let mut types = Types::new();

    types.insert(EIP712_DOMAIN_TYPE.to_owned(), eip712_domain_type());

    // timeout_height is left out, the legacy amino sign mode never fills it.
    types.insert(
        TX_FIELD.to_owned(),
        vec![
            Type::new("account_number", ETH_STRING),
            Type::new("chain_id", ETH_STRING),
            Type::new("fee", FEE_TYPE),
            Type::new("memo", ETH_STRING),
            Type::new("sequence", ETH_STRING),
        ],
    );

    types.insert(FEE_TYPE.to_owned(), fee_type());
    types.insert(COIN_TYPE.to_owned(), coin_type());

    types
}

/// Create the EIP-712 types of a flattened payload carrying `num_msgs` messages
/// under the fields `msg0..msg{num_msgs-1}`.
pub fn derive_types(payload: &Map<String, Value>, num_msgs: usize) -> Result<Types> {
    let mut types = root_types();

    for index in 0..num_msgs {
        let field = msg_field_for_index(index);

        let msg = match payload.get(&field) {
            Some(Value::Object(msg)) => msg,
            _ => {
                return Err(Error::InvalidRequest(format!(
                    "message {} is not valid JSON, cannot parse types",
                    field
                )))
            }
        };

        add_msg_types_to_root(&mut types, &field, msg)
            .map_err(|err| err.wrap(format!("failed to derive types of {}", field)))?;
    }

    Ok(types)
}

/// Add all types of `msg` to `types` and reference the message's root type from `Tx`.
fn add_msg_types_to_root(types: &mut Types, msg_field: &str, msg: &Map<String, Value>) -> Result<()> {
    let root_type = msg_root_type(msg)?;

    let msg_type_def = recursively_add_types_to_root(types, &root_type, ROOT_PREFIX, msg)?;

    log::trace!("{} => {}", msg_field, msg_type_def);

    types
        .entry(TX_FIELD.to_owned())
        .or_default()
        .push(Type::new(msg_field, msg_type_def));

    Ok(())
}

/// `cosmos-sdk/MsgSend` => `TypeMsgSend`
pub fn msg_root_type(msg: &Map<String, Value>) -> Result<String> {
    let msg_type = match msg.get(MSG_TYPE) {
        Some(Value::String(msg_type)) if !msg_type.is_empty() => msg_type,
        _ => {
            return Err(Error::InvalidType(
                "malformed message type value, expected type string".to_owned(),
            ))
        }
    };

    let signature = msg_type.rsplit('/').next().unwrap_or(msg_type);

    Ok(format!("{}{}", TYPE_PREFIX, signature))
}

/// Walk `payload`, registering a type definition for it and for every nested object.
///
/// Returns the name the definition of `payload` was registered under.
fn recursively_add_types_to_root(
    types: &mut Types,
    root_type: &str,
    prefix: &str,
    payload: &Map<String, Value>,
) -> Result<String> {
    let mut types_to_add = vec![];

    for field_name in sorted_json_keys(payload) {
        let mut field = match payload.get(field_name) {
            Some(field) => field,
            None => continue,
        };

        let mut is_collection = false;

        if let Value::Array(elements) = field {
            match elements.first() {
                Some(first) => {
                    field = first;
                    is_collection = true;
                }
                None => {
                    // The element type of an empty array is unknown.
                    types_to_add.push(Type::new(field_name.as_str(), "string[]"));
                    continue;
                }
            }
        }

        if let Some(eth_type) = eth_type_for_json(field) {
            let eth_type = if is_collection {
                format!("{}[]", eth_type)
            } else {
                eth_type.to_owned()
            };

            types_to_add.push(Type::new(field_name.as_str(), eth_type));

            continue;
        }

        // Nulls and arrays of arrays are dropped, EIP-712 has no nested arrays.
        if let Value::Object(sub_payload) = field {
            let sub_field_prefix = format!("{}.{}", prefix, field_name);

            let mut field_type_def = sanitize_typedef(&recursively_add_types_to_root(
                types,
                root_type,
                &sub_field_prefix,
                sub_payload,
            )?);

            if is_collection {
                field_type_def.push_str("[]");
            }

            types_to_add.push(Type::new(field_name.as_str(), field_type_def));
        }
    }

    let type_def = if prefix == ROOT_PREFIX {
        root_type.to_owned()
    } else {
        sanitize_typedef(prefix)
    };

    add_types_to_root(types, &type_def, types_to_add)
}

/// Register `fields` under `type_def{n}` for the smallest `n` that is either free or
/// already holds exactly `fields`, and return that name.
pub fn add_types_to_root(types: &mut Types, type_def: &str, fields: Vec<Type>) -> Result<String> {
    for num_duplicates in 0..MAX_TYPEDEF_DUPLICATES {
        let indexed_type_def = format!("{}{}", type_def, num_duplicates);

        match types.get(&indexed_type_def) {
            Some(existing) if *existing == fields => {
                log::trace!("reuse type definition {}", indexed_type_def);
                return Ok(indexed_type_def);
            }
            Some(_) => continue,
            None => {
                log::trace!(
                    "register type definition {}, fields={}",
                    indexed_type_def,
                    fields.len()
                );

                types.insert(indexed_type_def.clone(), fields);

                return Ok(indexed_type_def);
            }
        }
    }

    Err(Error::InvalidRequest(format!(
        "exceeded maximum number of duplicates for a single type definition {}",
        type_def
    )))
}

fn sorted_json_keys(payload: &Map<String, Value>) -> Vec<&String> {
    let mut keys = payload.keys().collect::<Vec<_>>();

    keys.sort_by(|lhs, rhs| rhs.cmp(lhs));

    keys
}

/// `_.foo_bar.baz` => `TypeFooBarBaz`
///
/// Geth does not tolerate complex EIP-712 type names.
pub fn sanitize_typedef(typedef: &str) -> String {
    let mut buf = String::with_capacity(typedef.len() + TYPE_PREFIX.len());

    for part in typedef.split('.') {
        if part == ROOT_PREFIX {
            buf.push_str(TYPE_PREFIX);
            continue;
        }

        for subpart in part.split(ROOT_PREFIX) {
            title_case_into(subpart, &mut buf);
        }
    }

    buf
}

/// Uppercase the first letter of every word, leaving the other letters untouched.
/// Words are split on any non-alphanumeric character: `foo-bar baz` => `Foo-Bar Baz`.
fn title_case_into(word: &str, buf: &mut String) {
    let mut word_start = true;

    for c in word.chars() {
        if word_start {
            buf.extend(c.to_uppercase());
        } else {
            buf.push(c);
        }

        word_start = !c.is_alphanumeric();
    }
}

/// Returns the EIP-712 primitive of a JSON value, or `None` for objects, arrays and null.
pub fn eth_type_for_json(value: &Value) -> Option<&'static str> {
    match value {
        Value::Bool(_) => Some(ETH_BOOL),
        Value::Number(_) => Some(ETH_INT64),
        Value::String(_) => Some(ETH_STRING),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
