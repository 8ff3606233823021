//! Rewrites the `msgs` array of a sign doc into individually keyed fields.
//!
//! `{"msgs": [m0, m1], "memo": ""}` becomes `{"msg0": m0, "msg1": m1, "memo": ""}`,
//! so every message gets its own field in the `Tx` schema and its own type definition.

use serde_json::{Map, Value};

use crate::{
    errors::{Error, Result},
    json::{json_kind, parse_object},
};

/// The sign doc field holding the transaction messages.
pub const PAYLOAD_MSGS_FIELD: &str = "msgs";

/// Returns the flattened field name of the message at `index`, e.g. `msg0`.
pub fn msg_field_for_index(index: usize) -> String {
    format!("msg{}", index)
}

/// A flattened sign doc together with the number of messages it carries.
#[derive(Debug, Clone, PartialEq)]
pub struct MessagePayload {
    /// The flattened sign doc object, which is also the typed data `message`.
    pub payload: Map<String, Value>,
    /// Count of `msg{i}` fields inserted by the flattening.
    pub num_payload_msgs: usize,
}

impl MessagePayload {
    /// Parse and flatten raw sign doc bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let basic_payload = parse_object(data)?;

        let (payload, num_payload_msgs) = flatten_payload_messages(&basic_payload)
            .map_err(|err| err.wrap("failed to flatten payload JSON messages"))?;

        Ok(Self {
            payload,
            num_payload_msgs,
        })
    }

    /// Returns the message object flattened at `index`, if any.
    pub fn msg(&self, index: usize) -> Option<&Value> {
        self.payload.get(&msg_field_for_index(index))
    }

    /// Consume the payload and return the typed data `message`.
    pub fn into_message(self) -> Map<String, Value> {
        self.payload
    }
}

/// Flatten the `msgs` array of `payload` into `msg{i}` fields.
///
/// Returns the new object and the number of messages moved. The input is not modified.
pub fn flatten_payload_messages(payload: &Map<String, Value>) -> Result<(Map<String, Value>, usize)> {
    let msgs = payload_messages(payload)?;

    let mut flattened = payload.clone();

    for (index, msg) in msgs.iter().enumerate() {
        let field = msg_field_for_index(index);

        if flattened.contains_key(&field) {
            return Err(Error::InvalidRequest(format!(
                "malformed payload received, did not expect to find key at field {}",
                field
            )));
        }

        if !msg.is_object() {
            return Err(Error::InvalidRequest(format!(
                "msg at index {} is not valid JSON: {}",
                index, msg
            )));
        }

        flattened.insert(field, msg.clone());
    }

    flattened.remove(PAYLOAD_MSGS_FIELD);

    log::trace!("flattened {} payload messages", msgs.len());

    Ok((flattened, msgs.len()))
}

fn payload_messages(payload: &Map<String, Value>) -> Result<&Vec<Value>> {
    match payload.get(PAYLOAD_MSGS_FIELD) {
        None => Err(Error::InvalidRequest(
            "no messages found in payload, unable to parse".to_owned(),
        )),
        Some(Value::Array(msgs)) => Ok(msgs),
        Some(other) => Err(Error::InvalidRequest(format!(
            "expected type array of messages, cannot parse {}",
            json_kind(other)
        ))),
    }
}
