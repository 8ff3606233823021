//! Derives [`EIP-712`](https://eips.ethereum.org/EIPS/eip-712) typed data from cosmos
//! amino JSON sign docs, so an ethereum wallet can sign any multi-message transaction.
//!
//! The `types` schema is not fixed ahead of time: it is inferred from the JSON shape of
//! every message in the sign doc.
//!
//! ```no_run
//! use cosmos_eip712::*;
//! use serde_json::json;
//!
//! let sign_doc = json!({
//!     "account_number": "8",
//!     "chain_id": "evmos_9000-1",
//!     "fee": { "amount": [{ "amount": "2000", "denom": "aevmos" }], "gas": "200000" },
//!     "memo": "",
//!     "msgs": [{ "type": "cosmos-sdk/MsgSend", "value": { "amount": "1" } }],
//!     "sequence": "1"
//! });
//!
//! let typed_data = wrap_tx_to_typed_data(9000, sign_doc.to_string().as_bytes(), None).unwrap();
//!
//! assert_eq!(typed_data.primary_type, "Tx");
//! assert!(typed_data.types.contains_key("TypeMsgSend0"));
//!
//! let hash = typed_data.sign_hash().unwrap();
//! println!("{}", hash);
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod domain;
pub mod errors;
pub mod hash;
pub mod json;
pub mod message;
pub mod primitives;
pub mod sign_doc;
pub mod typed_data;
pub mod types;

#[cfg(feature = "legacy")]
#[cfg_attr(docsrs, doc(cfg(feature = "legacy")))]
pub mod legacy;

pub use domain::{create_eip712_domain, Domain};
pub use errors::{Error, ErrorKind, Result};
pub use message::{flatten_payload_messages, MessagePayload};
pub use primitives::H256;
pub use sign_doc::*;
pub use typed_data::{wrap_tx_to_typed_data, FeeDelegationOptions, TypedData};
pub use types::{derive_types, Type, Types};

#[cfg(feature = "legacy")]
pub use legacy::{legacy_wrap_tx_to_typed_data, AminoJsonCodec, JsonCodec};
