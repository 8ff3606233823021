use cosmos_eip712::{derive_types, flatten_payload_messages};
use quickcheck::{quickcheck, Arbitrary, Gen};
use serde_json::{json, Map, Value};

#[derive(Clone, Debug)]
struct Payload(Map<String, Value>);

fn arbitrary_primitive(g: &mut Gen) -> Value {
    match u8::arbitrary(g) % 3 {
        0 => json!(bool::arbitrary(g)),
        1 => json!(i32::arbitrary(g)),
        _ => json!(String::arbitrary(g)),
    }
}

fn arbitrary_msg(g: &mut Gen) -> Value {
    let msg_type = *g
        .choose(&["cosmos-sdk/MsgSend", "cosmos-sdk/MsgVote", "msgType"])
        .unwrap_or(&"msgType");

    let mut value = Map::new();

    for _ in 0..(u8::arbitrary(g) % 4) {
        let key = *g.choose(&["amount", "voter", "option", "to_address"]).unwrap_or(&"amount");

        let field = if bool::arbitrary(g) {
            arbitrary_primitive(g)
        } else {
            json!([{ "denom": "aevmos", "amount": arbitrary_primitive(g) }])
        };

        value.insert(key.to_owned(), field);
    }

    json!({ "type": msg_type, "value": value })
}

impl Arbitrary for Payload {
    fn arbitrary(g: &mut Gen) -> Self {
        let mut payload = Map::new();

        for key in ["account_number", "chain_id", "memo", "sequence"] {
            if bool::arbitrary(g) {
                payload.insert(key.to_owned(), json!(String::arbitrary(g)));
            }
        }

        let msgs = (0..(u8::arbitrary(g) % 6))
            .map(|_| arbitrary_msg(g))
            .collect::<Vec<_>>();

        payload.insert("msgs".to_owned(), Value::Array(msgs));

        Self(payload)
    }
}

fn init() {
    _ = pretty_env_logger::try_init_timed();
}

quickcheck! {
    fn flatten_is_reversible(payload: Payload) -> bool {
        init();

        let (mut flattened, count) = flatten_payload_messages(&payload.0).unwrap();

        let msgs = (0..count)
            .map(|i| flattened.remove(&format!("msg{}", i)).unwrap())
            .collect::<Vec<_>>();

        flattened.insert("msgs".to_owned(), Value::Array(msgs));

        flattened == payload.0 && count == payload.0["msgs"].as_array().unwrap().len()
    }

    fn flatten_drops_msgs(payload: Payload) -> bool {
        let (flattened, _) = flatten_payload_messages(&payload.0).unwrap();

        !flattened.contains_key("msgs")
    }

    fn derive_types_is_deterministic(payload: Payload) -> bool {
        let (flattened, count) = flatten_payload_messages(&payload.0).unwrap();

        let lhs = derive_types(&flattened, count).unwrap();
        let rhs = derive_types(&flattened, count).unwrap();

        serde_json::to_string(&lhs).unwrap() == serde_json::to_string(&rhs).unwrap()
    }

    fn every_msg_is_referenced_by_tx(payload: Payload) -> bool {
        let (flattened, count) = flatten_payload_messages(&payload.0).unwrap();

        let types = derive_types(&flattened, count).unwrap();

        (0..count).all(|i| {
            types["Tx"]
                .iter()
                .find(|field| field.name == format!("msg{}", i))
                .map(|field| types.contains_key(&field.r#type))
                .unwrap_or(false)
        })
    }
}
