use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    domain::{create_eip712_domain, Domain},
    errors::{Error, Result},
    hash::sign_hash,
    message::MessagePayload,
    primitives::H256,
    types::{derive_types, Type, Types, COIN_TYPE, ETH_STRING, FEE_TYPE, TX_FIELD},
};

pub const FEE_FIELD: &str = "fee";
pub const FEE_PAYER_FIELD: &str = "feePayer";

/// Sign the fee on behalf of another account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeDelegationOptions {
    /// Rendered address of the account paying the fee.
    pub fee_payer: String,
}

impl FeeDelegationOptions {
    pub fn new<P: Into<String>>(fee_payer: P) -> Self {
        Self {
            fee_payer: fee_payer.into(),
        }
    }
}

/// An EIP-712 typed data request, ready to be handed to an `eth_signTypedData_v4` signer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedData {
    pub types: Types,
    pub primary_type: String,
    pub domain: Domain,
    pub message: Map<String, Value>,
}

impl TypedData {
    /// Returns the EIP-712 digest the wallet signs.
    pub fn sign_hash(&self) -> Result<H256> {
        let domain = match serde_json::to_value(&self.domain)? {
            Value::Object(domain) => domain,
            other => {
                return Err(Error::InternalFault(format!(
                    "domain serialized to non-object value {}",
                    other
                )))
            }
        };

        sign_hash(&self.types, &self.primary_type, &domain, &self.message)
    }
}

/// Create the typed data of an amino JSON sign doc, whose messages sit in the `msgs` array.
///
/// The messages are flattened into `msg0..msgN` fields and the schema is derived from the
/// JSON shape of each one. With `fee_delegation` a `feePayer` field is added to `fee`.
pub fn wrap_tx_to_typed_data(
    chain_id: u64,
    data: &[u8],
    fee_delegation: Option<&FeeDelegationOptions>,
) -> Result<TypedData> {
    let payload = MessagePayload::from_bytes(data)?;

    let mut types = derive_types(&payload.payload, payload.num_payload_msgs)?;

    let domain = create_eip712_domain(chain_id)?;

    let mut message = payload.into_message();

    if let Some(fee_delegation) = fee_delegation {
        inject_fee_payer(&mut types, &mut message, fee_delegation)?;
    }

    log::debug!(
        "wrap tx to typed data, chain_id={}, types={}",
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

/// Writes `fee.feePayer` into `message` and declares it in the `Fee` type.
///
/// A missing `fee` is created, a `fee` that is not an object is rejected.
pub(crate) fn inject_fee_payer(
    types: &mut Types,
    message: &mut Map<String, Value>,
    fee_delegation: &FeeDelegationOptions,
) -> Result<()> {
    match message
        .entry(FEE_FIELD)
        .or_insert_with(|| Value::Object(Map::new()))
    {
        Value::Object(fee) => {
            fee.insert(
                FEE_PAYER_FIELD.to_owned(),
                Value::String(fee_delegation.fee_payer.clone()),
            );
        }
        _ => {
            return Err(Error::InvalidType(format!(
                "cannot parse fee from tx data, expected object to inject {}",
                FEE_PAYER_FIELD
            )))
        }
    }

    types.insert(
        FEE_TYPE.to_owned(),
        vec![
            Type::new(FEE_PAYER_FIELD, ETH_STRING),
            Type::new("amount", format!("{}[]", COIN_TYPE)),
            Type::new("gas", ETH_STRING),
        ],
    );

    log::trace!("inject fee payer {}", fee_delegation.fee_payer);

    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::errors::ErrorKind;

    use super::*;

    fn sign_doc() -> Value {
        json!({
            "account_number": "8",
            "chain_id": "evmos_9000-1",
            "fee": {
                "amount": [{ "amount": "2000", "denom": "aevmos" }],
                "gas": "200000"
            },
            "memo": "",
            "msgs": [{
                "type": "cosmos-sdk/MsgSend",
                "value": {
                    "amount": [{ "amount": "1", "denom": "aevmos" }],
                    "from_address": "evmos1qqqqhe5pnaq5qq39wqkn957aydnrm45sdn8583",
                    "to_address": "evmos1ssr5w8uyxwwvpqstj4nxyyfzk7qgfjqlxtw2qq"
                }
            }],
            "sequence": "1"
        })
    }

    fn wrap(value: Value, fee_delegation: Option<&FeeDelegationOptions>) -> Result<TypedData> {
        wrap_tx_to_typed_data(9000, value.to_string().as_bytes(), fee_delegation)
    }

    #[test]
    fn test_wrap_sign_doc() {
        let typed_data = wrap(sign_doc(), None).unwrap();

        assert_eq!(typed_data.primary_type, "Tx");
        assert_eq!(typed_data.domain.chain_id, 9000);
        assert!(!typed_data.message.contains_key("msgs"));
        assert_eq!(typed_data.message["msg0"], sign_doc()["msgs"][0]);

        assert_eq!(
            typed_data.types["TypeMsgSend0"],
            vec![
                Type::new("value", "TypeValue0"),
                Type::new("type", "string"),
            ]
        );

        assert_eq!(
            typed_data.types["TypeValue0"],
            vec![
                Type::new("to_address", "string"),
                Type::new("from_address", "string"),
                Type::new("amount", "TypeValueAmount0[]"),
            ]
        );

        assert_eq!(
            typed_data.types["TypeValueAmount0"],
            vec![Type::new("denom", "string"), Type::new("amount", "string")]
        );

        assert_eq!(
            typed_data.types["Tx"].last(),
            Some(&Type::new("msg0", "TypeMsgSend0"))
        );

        let hash = typed_data.sign_hash().unwrap();

        assert_eq!(hash, wrap(sign_doc(), None).unwrap().sign_hash().unwrap());
    }

    #[test]
    fn test_single_message_scenario() {
        let typed_data = wrap(
            json!({ "msgs": [{ "type": "cosmos-sdk/MsgSend", "value": { "amount": "1" } }] }),
            None,
        )
        .unwrap();

        assert_eq!(
            typed_data.types["TypeValue0"],
            vec![Type::new("amount", "string")]
        );

        assert!(typed_data.types["Tx"].contains(&Type::new("msg0", "TypeMsgSend0")));

        assert_eq!(
            typed_data.message["msg0"],
            json!({ "type": "cosmos-sdk/MsgSend", "value": { "amount": "1" } })
        );
    }

    #[test]
    fn test_fee_delegation() {
        let fee_payer = "evmos1ssr5w8uyxwwvpqstj4nxyyfzk7qgfjqlxtw2qq";

        let typed_data = wrap(sign_doc(), Some(&FeeDelegationOptions::new(fee_payer))).unwrap();

        assert_eq!(typed_data.message["fee"]["feePayer"], json!(fee_payer));
        assert_eq!(typed_data.types["Fee"][0], Type::new("feePayer", "string"));
        assert_eq!(typed_data.types["Fee"].len(), 3);

        let plain = wrap(sign_doc(), None).unwrap();

        assert_ne!(
            typed_data.sign_hash().unwrap(),
            plain.sign_hash().unwrap()
        );
    }

    #[test]
    fn test_fee_delegation_without_fee() {
        let fee_payer = FeeDelegationOptions::new("");

        let typed_data = wrap_tx_to_typed_data(
            0,
            br#"{"msgs": [{ "type": "MsgSend", "value": { "field": 10 } }] }"#,
            Some(&fee_payer),
        )
        .unwrap();

        assert!(!typed_data.types["TypeMsgSend0"].is_empty());
        assert_eq!(typed_data.message["fee"], json!({ "feePayer": "" }));
        assert_eq!(typed_data.types["Fee"][0], Type::new("feePayer", "string"));

        let typed_data = wrap_tx_to_typed_data(
            0,
            json!({
                "msgs": [
                    { "type": "msgType", "value": { "field1": 10 } },
                    { "type": "msgType", "value": { "field1": 20 } },
                ]
            })
            .to_string()
            .as_bytes(),
            Some(&fee_payer),
        )
        .unwrap();

        assert!(typed_data.types.get("TypemsgType1").is_none());

        let err = wrap(
            json!({ "msgs": [{ "type": "val1" }], "fee": "1000aevmos" }),
            Some(&fee_payer),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidType);
        assert!(err.to_string().contains("feePayer"));
    }

    #[test]
    fn test_typed_data_json() {
        let typed_data = wrap(sign_doc(), None).unwrap();

        let value = serde_json::to_value(&typed_data).unwrap();

        assert_eq!(value["primaryType"], json!("Tx"));
        assert_eq!(value["domain"]["chainId"], json!(9000));
        assert_eq!(value["types"]["Coin"][0], json!({ "name": "denom", "type": "string" }));

        let decoded: TypedData = serde_json::from_value(value).unwrap();

        assert_eq!(decoded, typed_data);
    }

    #[test]
    fn test_wrap_errors() {
        let fee_payer = FeeDelegationOptions::new("");

        let err = wrap_tx_to_typed_data(0, b"", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidJson);
        assert!(err.to_string().contains("invalid JSON"));

        let err = wrap(json!({ "msgs": 10 }), None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
        assert!(err.to_string().contains("array of messages"));

        let err = wrap(
            json!({ "msgs": [{ "type": "val1" }], "fee": [1, 2, 3] }),
            Some(&fee_payer),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidType);
        assert!(err.to_string().contains("feePayer"));

        let err = wrap(json!({ "msgs": [{ "type": 10 }] }), Some(&fee_payer)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidType);
        assert!(err.to_string().contains("message type value"));

        let msgs = (0..1001)
            .map(|i| json!({ "type": "msgType", "value": { format!("field{}", i): i } }))
            .collect::<Vec<_>>();

        let err = wrap(json!({ "msgs": msgs }), Some(&fee_payer)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
        assert!(err.to_string().contains("maximum number of duplicates"));

        let err = wrap_tx_to_typed_data(
            u64::MAX,
            json!({ "msgs": [{ "type": "val1" }] }).to_string().as_bytes(),
            Some(&fee_payer),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidChainId);
        assert!(err.to_string().contains("chainID"));
    }

    #[test]
    fn test_unsignable_extra_field() {
        let mut doc = sign_doc();
        doc["timeout_height"] = json!("100");

        let typed_data = wrap(doc, None).unwrap();

        let err = typed_data.sign_hash().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EncodeData);
    }
}
