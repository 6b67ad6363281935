use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

use super::registry::{FieldKind, FieldSpec, Protocol};

/// Transmit-ready form of a stored code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncodedCommand {
    #[serde(skip)]
    pub protocol: Protocol,
    pub dispatch_target: &'static str,
    pub parameters: Map<String, Value>,
}

/// Turns the fields of a stored payload into the parameters of the protocol's transmit
/// operation.
///
/// Fields the descriptor does not list are dropped; listed fields that are missing and
/// have no default are left out, the transmit side validates its own requirements.
pub fn encode(protocol_name: &str, fields: &Map<String, Value>) -> Result<EncodedCommand> {
    let protocol = Protocol::from_name(protocol_name)
        .ok_or_else(|| Error::UnsupportedProtocol(protocol_name.to_string()))?;
    let descriptor = protocol.descriptor();

    let mut parameters = Map::new();
    for spec in descriptor.fields {
        match fields.get(spec.name) {
            Some(value) => {
                parameters.insert(spec.name.to_string(), coerce(spec, value)?);
            }
            None => {
                if let Some(default) = spec.default {
                    parameters.insert(spec.name.to_string(), Value::from(default));
                }
            }
        }
    }

    Ok(EncodedCommand {
        protocol,
        dispatch_target: descriptor.dispatch_target,
        parameters,
    })
}

fn coerce(spec: &FieldSpec, value: &Value) -> Result<Value> {
    match (spec.kind, value) {
        (FieldKind::Numeric, Value::String(text)) => match hex_digits(text) {
            Some(digits) => u64::from_str_radix(digits, 16).map(Value::from).map_err(|err| {
                Error::MalformedPayload(format!(
                    "field '{}' has invalid hex value '{text}': {err}",
                    spec.name
                ))
            }),
            None => Ok(value.clone()),
        },
        (FieldKind::Array, Value::String(text)) => parse_int_array(text)
            .map(Value::from)
            .map_err(|reason| {
                Error::MalformedPayload(format!(
                    "field '{}' is not an integer list ({reason}): '{text}'",
                    spec.name
                ))
            }),
        _ => Ok(value.clone()),
    }
}

fn hex_digits(text: &str) -> Option<&str> {
    let text = text.trim();
    text.strip_prefix("0x").or_else(|| text.strip_prefix("0X"))
}

/// Parses the textual list format receivers report, e.g. `[ 9000, -4500, 560 ]`.
pub fn parse_int_array(text: &str) -> std::result::Result<Vec<i64>, String> {
    let inner = text
        .trim()
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| "missing brackets".to_string())?
        .trim();

    if inner.is_empty() {
        return Ok(Vec::new());
    }

    inner
        .split(',')
        .map(|item| {
            let item = item.trim();
            item.parse::<i64>()
                .map_err(|_| format!("'{item}' is not an integer"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test fields must be an object"),
        }
    }

    #[test]
    fn test_nec_hex_fields_become_integers() {
        let encoded = encode(
            "NEC",
            &fields(json!({"protocol": "NEC", "address": "0x04", "command": "0x10"})),
        )
        .unwrap();

        assert_eq!(encoded.protocol, Protocol::Nec);
        assert_eq!(encoded.dispatch_target, "send_nec");
        assert_eq!(encoded.parameters.get("address"), Some(&json!(4)));
        assert_eq!(encoded.parameters.get("command"), Some(&json!(16)));
        assert_eq!(encoded.parameters.get("command_repeats"), Some(&json!(1)));
        assert!(!encoded.parameters.contains_key("protocol"));
    }

    #[test]
    fn test_unsupported_protocol() {
        let err = encode("Morse", &Map::new()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedProtocol(ref name) if name == "Morse"));
    }

    #[test]
    fn test_non_hex_values_pass_through() {
        let encoded = encode(
            "Sony",
            &fields(json!({"data": 2704, "nbits": 15})),
        )
        .unwrap();
        assert_eq!(encoded.parameters.get("data"), Some(&json!(2704)));
        assert_eq!(encoded.parameters.get("nbits"), Some(&json!(15)));

        let encoded = encode("JVC", &fields(json!({"data": "1234"}))).unwrap();
        assert_eq!(encoded.parameters.get("data"), Some(&json!("1234")));
    }

    #[test]
    fn test_missing_field_without_default_is_omitted() {
        let encoded = encode("RC5", &fields(json!({"address": "0x1F"}))).unwrap();
        assert_eq!(encoded.parameters.get("address"), Some(&json!(31)));
        assert!(!encoded.parameters.contains_key("command"));
    }

    #[test]
    fn test_default_applies_only_when_absent() {
        let encoded = encode("Samsung", &fields(json!({"data": "0xE0E040BF"}))).unwrap();
        assert_eq!(encoded.parameters.get("data"), Some(&json!(0xE0E0_40BFu64)));
        assert_eq!(encoded.parameters.get("nbits"), Some(&json!(32)));

        let encoded = encode(
            "Samsung",
            &fields(json!({"data": "0xE0E040BF", "nbits": 48})),
        )
        .unwrap();
        assert_eq!(encoded.parameters.get("nbits"), Some(&json!(48)));
    }

    #[test]
    fn test_array_field_parsing() {
        assert_eq!(parse_int_array("[ 1, 2, 3 ]").unwrap(), vec![1, 2, 3]);
        assert_eq!(parse_int_array("[9000,-4500, 560]").unwrap(), vec![9000, -4500, 560]);
        assert_eq!(parse_int_array("[ ]").unwrap(), Vec::<i64>::new());
        assert!(parse_int_array("1, 2, 3").is_err());
        assert!(parse_int_array("[ 1, two ]").is_err());
    }

    #[test]
    fn test_raw_code_string_is_decoded() {
        let encoded = encode("raw", &fields(json!({"code": "[ 1, 2, 3 ]"}))).unwrap();
        assert_eq!(encoded.dispatch_target, "send_raw");
        assert_eq!(encoded.parameters.get("code"), Some(&json!([1, 2, 3])));
        assert_eq!(encoded.parameters.get("carrier_frequency"), Some(&json!(38_000)));
    }

    #[test]
    fn test_array_already_structured_passes_through() {
        let encoded = encode("Midea", &fields(json!({"code": [161, 130, 72]}))).unwrap();
        assert_eq!(encoded.parameters.get("code"), Some(&json!([161, 130, 72])));
    }

    #[test]
    fn test_aeha_mixes_numeric_and_array_fields() {
        let encoded = encode(
            "AEHA",
            &fields(json!({"address": "0x2002", "data": "[ 128, 0, 20 ]"})),
        )
        .unwrap();
        assert_eq!(encoded.parameters.get("address"), Some(&json!(0x2002)));
        assert_eq!(encoded.parameters.get("data"), Some(&json!([128, 0, 20])));
    }

    #[test]
    fn test_pronto_data_is_not_hex_coerced() {
        let dump = "0000 006D 0022 0002";
        let encoded = encode("Pronto", &fields(json!({"data": dump}))).unwrap();
        assert_eq!(encoded.parameters.get("data"), Some(&json!(dump)));
    }

    #[test]
    fn test_invalid_hex_is_malformed() {
        let err = encode("NEC", &fields(json!({"address": "0xZZ"}))).unwrap_err();
        assert_eq!(err.kind(), "malformed_payload");
    }
}
