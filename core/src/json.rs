//! JSON body helpers.

use serde_json::{Map, Value};

/// The body as a JSON object, or `None` if it is not valid JSON or not an
/// object.
pub fn decode_object(bytes: &[u8]) -> Option<Map<String, Value>> {
    match serde_json::from_slice(bytes).ok()? {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_objects() {
        let map = decode_object(br#"{"token":"abc","ttl":60}"#).unwrap();
        assert_eq!(map["token"], "abc");
        assert_eq!(map["ttl"], 60);
    }

    #[test]
    fn rejects_non_objects() {
        assert!(decode_object(b"[1,2,3]").is_none());
        assert!(decode_object(b"\"text\"").is_none());
        assert!(decode_object(b"{broken").is_none());
        assert!(decode_object(b"").is_none());
    }
}
