//! Typed data for the legacy amino sign mode.
//!
//! Instead of flattening `msgs`, the legacy schema declares `msgs: Msg[]` with a single
//! `Msg { type, value: MsgValue }` shape, where `MsgValue` is derived from one message
//! encoded by an [`AminoJsonCodec`]. The `EIP712Domain`, `Fee` and `Coin` types are the
//! ones [`wrap_tx_to_typed_data`](crate::wrap_tx_to_typed_data) emits.

use serde_json::{Map, Value};

use crate::{
    domain::create_eip712_domain,
    errors::{Error, Result},
    json::parse_object,
    typed_data::{inject_fee_payer, FeeDelegationOptions, TypedData},
    types::{
        coin_type, eip712_domain_type, eth_type_for_json, fee_type, sanitize_typedef, Type, Types,
        COIN_TYPE, EIP712_DOMAIN_TYPE, ETH_STRING, FEE_TYPE, MSG_TYPE, ROOT_PREFIX, TX_FIELD,
    },
};

pub const MSG_FIELD: &str = "Msg";
pub const MSG_VALUE_FIELD: &str = "MsgValue";

/// The amino JSON field holding the message body.
pub const MSG_VALUE: &str = "value";

/// Encodes a transaction message into its amino JSON form, `{"type": ..., "value": {...}}`.
pub trait AminoJsonCodec {
    /// Message type this codec accepts.
    type Msg: ?Sized;

    fn marshal_json(&self, msg: &Self::Msg) -> Result<Vec<u8>>;
}

/// Codec for messages already held as amino JSON values.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl AminoJsonCodec for JsonCodec {
    type Msg = Value;

    fn marshal_json(&self, msg: &Self::Msg) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(msg)?)
    }
}

/// Create the legacy typed data of the amino JSON sign doc `data`.
///
/// The `MsgValue` type is derived from `msg`, so every message in the sign doc is
/// expected to share its shape.
pub fn legacy_wrap_tx_to_typed_data<C>(
    codec: &C,
    chain_id: u64,
    msg: &C::Msg,
    data: &[u8],
    fee_delegation: Option<&FeeDelegationOptions>,
) -> Result<TypedData>
where
    C: AminoJsonCodec,
{
    let mut message = parse_object(data)?;

    let domain = create_eip712_domain(chain_id)?;

    let mut types = legacy_msg_types(codec, msg)?;

    if let Some(fee_delegation) = fee_delegation {
        inject_fee_payer(&mut types, &mut message, fee_delegation)?;
    }

    log::debug!(
        "legacy wrap tx to typed data, chain_id={}, types={}",
        chain_id,
        types.len()
    );

    Ok(TypedData {
        types,
        primary_type: TX_FIELD.to_owned(),
        domain,
        message,
    })
}

/// The constant part of the legacy schema, `MsgValue` left empty.
pub fn legacy_root_types() -> Types {
    let mut types = Types::new();

    types.insert(EIP712_DOMAIN_TYPE.to_owned(), eip712_domain_type());

    types.insert(
        TX_FIELD.to_owned(),
        vec![
            Type::new("account_number", ETH_STRING),
            Type::new("chain_id", ETH_STRING),
            Type::new("fee", FEE_TYPE),
            Type::new("memo", ETH_STRING),
            Type::new("msgs", format!("{}[]", MSG_FIELD)),
            Type::new("sequence", ETH_STRING),
        ],
    );

    types.insert(FEE_TYPE.to_owned(), fee_type());
    types.insert(COIN_TYPE.to_owned(), coin_type());

    types.insert(
        MSG_FIELD.to_owned(),
        vec![
            Type::new(MSG_TYPE, ETH_STRING),
            Type::new(MSG_VALUE, MSG_VALUE_FIELD),
        ],
    );

    types.insert(MSG_VALUE_FIELD.to_owned(), vec![]);

    types
}

fn legacy_msg_types<C>(codec: &C, msg: &C::Msg) -> Result<Types>
where
    C: AminoJsonCodec,
{
    let bytes = codec.marshal_json(msg)?;

    let amino = parse_object(&bytes).map_err(|err| err.wrap("failed to decode amino message"))?;

    let value = match amino.get(MSG_VALUE) {
        Some(Value::Object(value)) => value,
        _ => {
            return Err(Error::InvalidRequest(format!(
                "amino message has no {} object",
                MSG_VALUE
            )))
        }
    };

    let mut types = legacy_root_types();

    let fields = walk_fields(&mut types, ROOT_PREFIX, value);

    types.insert(MSG_VALUE_FIELD.to_owned(), fields);

    Ok(types)
}

/// Returns the fields of `payload` in key order, registering the nested types on the way.
fn walk_fields(types: &mut Types, prefix: &str, payload: &Map<String, Value>) -> Vec<Type> {
    let mut fields = vec![];

    let mut keys = payload.keys().collect::<Vec<_>>();
    keys.sort();

    for key in keys {
        let mut field = &payload[key];
        let mut is_collection = false;

        if let Value::Array(elements) = field {
            match elements.first() {
                Some(first) => {
                    field = first;
                    is_collection = true;
                }
                None => {
                    fields.push(Type::new(key.as_str(), "string[]"));
                    continue;
                }
            }
        }

        let eth_type = match field {
            Value::Object(object) if is_coin(object) => COIN_TYPE.to_owned(),
            Value::Object(object) => {
                let path = format!("{}.{}", prefix, key);
                let type_name = sanitize_typedef(&path);

                let nested = walk_fields(types, &path, object);

                // first definition wins
                types.entry(type_name.clone()).or_insert(nested);

                type_name
            }
            value => match eth_type_for_json(value) {
                Some(eth_type) => eth_type.to_owned(),
                None => continue,
            },
        };

        let eth_type = if is_collection {
            format!("{}[]", eth_type)
        } else {
            eth_type
        };

        fields.push(Type::new(key.as_str(), eth_type));
    }

    fields
}

fn is_coin(object: &Map<String, Value>) -> bool {
    object.len() == 2
        && matches!(object.get("amount"), Some(Value::String(_)))
        && matches!(object.get("denom"), Some(Value::String(_)))
}
