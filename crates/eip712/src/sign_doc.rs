//! Helpers that take an amino JSON sign doc and read the chain id from the doc itself.

use regex::Regex;
use serde_json::Value;

use crate::{
    errors::{Error, Result},
    json::parse_object,
    primitives::H256,
    typed_data::{wrap_tx_to_typed_data, FeeDelegationOptions, TypedData},
};

/// The sign doc field holding the cosmos chain id, e.g. `evmos_9000-1`.
pub const CHAIN_ID_FIELD: &str = "chain_id";

const MAX_CHAIN_ID_LEN: usize = 48;

fn chain_id_regex() -> Result<Regex> {
    Regex::new(r"^([a-z]{1,})_{1}([1-9][0-9]*)-{1}([1-9][0-9]*)$")
        .map_err(|err| Error::InternalFault(format!("chain id pattern, {}", err)))
}

/// Parse the EIP-155 chain id out of a cosmos chain id: `evmos_9000-1` => `9000`.
pub fn parse_chain_id(chain_id: &str) -> Result<u64> {
    let chain_id = chain_id.trim();

    if chain_id.len() > MAX_CHAIN_ID_LEN {
        return Err(Error::InvalidChainId(format!(
            "chain-id '{}' cannot exceed {} chars",
            chain_id, MAX_CHAIN_ID_LEN
        )));
    }

    let captures = chain_id_regex()?.captures(chain_id).ok_or_else(|| {
        Error::InvalidChainId(format!(
            "{}: chain-id must be in the format {{identifier}}_{{EIP155}}-{{epoch}}",
            chain_id
        ))
    })?;

    captures[2].parse::<u64>().map_err(|err| {
        Error::InvalidChainId(format!(
            "EIP155 chain id {} must be a base 10 integer fitting 64 bits, {}",
            &captures[2], err
        ))
    })
}

/// Returns the EIP-155 chain id of the sign doc's `chain_id` field.
pub fn chain_id_of(sign_doc: &[u8]) -> Result<u64> {
    let payload = parse_object(sign_doc)?;

    match payload.get(CHAIN_ID_FIELD) {
        Some(Value::String(chain_id)) => parse_chain_id(chain_id),
        _ => Err(Error::InvalidRequest(format!(
            "sign doc has no string field {}",
            CHAIN_ID_FIELD
        ))),
    }
}

/// [`wrap_tx_to_typed_data`] with the chain id taken from the sign doc.
pub fn typed_data_for_sign_doc(
    sign_doc: &[u8],
    fee_delegation: Option<&FeeDelegationOptions>,
) -> Result<TypedData> {
    let chain_id = chain_id_of(sign_doc)?;

    wrap_tx_to_typed_data(chain_id, sign_doc, fee_delegation)
}

/// Returns the bytes a wallet signs for an amino JSON sign doc.
pub fn eip712_hash_for_sign_doc(
    sign_doc: &[u8],
    fee_delegation: Option<&FeeDelegationOptions>,
) -> Result<H256> {
    typed_data_for_sign_doc(sign_doc, fee_delegation)?.sign_hash()
}

#[cfg(feature = "legacy")]
mod amino {
    use crate::legacy::{legacy_wrap_tx_to_typed_data, JsonCodec};

    use super::*;

    /// Legacy typed data of a sign doc, the `MsgValue` type derived from `msgs[0]`.
    pub fn legacy_typed_data_for_sign_doc(
        sign_doc: &[u8],
        fee_delegation: Option<&FeeDelegationOptions>,
    ) -> Result<TypedData> {
        let payload = parse_object(sign_doc)?;

        let msg = payload
            .get(crate::message::PAYLOAD_MSGS_FIELD)
            .and_then(|msgs| msgs.get(0))
            .ok_or_else(|| {
                Error::InvalidRequest("sign doc has no first message to encode".to_owned())
            })?;

        let chain_id = chain_id_of(sign_doc)?;

        legacy_wrap_tx_to_typed_data(&JsonCodec, chain_id, msg, sign_doc, fee_delegation)
    }

    pub fn legacy_eip712_hash_for_sign_doc(
        sign_doc: &[u8],
        fee_delegation: Option<&FeeDelegationOptions>,
    ) -> Result<H256> {
        legacy_typed_data_for_sign_doc(sign_doc, fee_delegation)?.sign_hash()
    }
}

#[cfg(feature = "legacy")]
pub use amino::*;
