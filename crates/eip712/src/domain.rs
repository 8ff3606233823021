use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

pub const DOMAIN_NAME: &str = "Cosmos Web3";
pub const DOMAIN_VERSION: &str = "1.0.0";
pub const DOMAIN_VERIFYING_CONTRACT: &str = "cosmos";
pub const DOMAIN_SALT: &str = "0";

/// The `EIP712Domain` value of every cosmos typed data, see [`EIP712_DOMAIN_TYPE`](crate::types::EIP712_DOMAIN_TYPE)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    pub name: String,
    pub version: String,
    pub chain_id: u64,
    pub verifying_contract: String,
    pub salt: String,
}

/// Create the domain separator value for `chain_id`.
///
/// Chain ids above `i64::MAX` are rejected, wallets and signing libraries read the
/// domain chain id as a signed 64-bit number.
pub fn create_eip712_domain(chain_id: u64) -> Result<Domain> {
    if i64::try_from(chain_id).is_err() {
        return Err(Error::InvalidChainId(format!(
            "chainID {} overflows a signed 64-bit integer",
            chain_id
        )));
    }

    Ok(Domain {
        name: DOMAIN_NAME.to_owned(),
        version: DOMAIN_VERSION.to_owned(),
        chain_id,
        verifying_contract: DOMAIN_VERIFYING_CONTRACT.to_owned(),
        salt: DOMAIN_SALT.to_owned(),
    })
}
