use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
pub struct Redacted;

pub trait MaskPolicy {
    fn mask(secret: &str) -> String;
}

impl MaskPolicy for Redacted {
    fn mask(secret: &str) -> String {
        let len = secret.len();
        if len > 4 {
            "*".repeat(len - 4) + &secret[len - 4..]
        } else {
            secret.to_string()
        }
    }
}

/// Return true if a key name likely holds a credential secret.
fn is_secret_key(key: &str) -> bool {
    let k = key.to_lowercase();
    k == "secret"
        || k.contains("client_secret")
        || k.contains("ephemeral_key")
        || k.ends_with("_key") && !k.ends_with("publishable_key")
        || k.contains("secret")
}

/// Return true if a key name holds a full credential header that must never
/// appear in logs, even truncated.
fn is_auth_key(key: &str) -> bool {
    let k = key.to_lowercase();
    k.contains("authorization") || k.contains("api_key") || k.contains("bearer")
}

pub fn secure_serializable(v: impl Serialize) -> serde_json::Value {
    let value = serde_json::to_value(v).expect("serialization is infallible");
    secure_value(&value)
}

pub fn secure_value(v: &serde_json::Value) -> serde_json::Value {
    use serde_json::Value;

    match v {
        Value::Object(map) => {
            let mut new = serde_json::Map::with_capacity(map.len());
            for (k, val) in map {
                let is_secret = is_secret_key(k);
                let is_auth = is_auth_key(k);
                let new_val = match val {
                    Value::String(_) if is_auth => Value::String("***".to_string()),
                    Value::String(s) if is_secret => Value::String(Redacted::mask(s)),
                    _ => secure_value(val),
                };
                new.insert(k.clone(), new_val);
            }
            Value::Object(new)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(secure_value).collect()),
        // primitives that are not objects: leave them as-is
        other => other.clone(),
    }
}
