//! Conversion of DynamoDB items into plain JSON records.

use aws_sdk_dynamodb::types::AttributeValue;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use dynalookup_query::{DataError, RawRecord, Result};
use serde_json::{Number, Value};
use std::collections::HashMap;

/// Convert one DynamoDB item into a plain record
pub fn unmarshall(item: &HashMap<String, AttributeValue>) -> Result<RawRecord> {
    let mut record = RawRecord::new();
    for (name, value) in item {
        record.insert(name.clone(), attribute_to_json(value)?);
    }
    Ok(record)
}

/// Convert a single attribute value
pub fn attribute_to_json(value: &AttributeValue) -> Result<Value> {
    let json = match value {
        AttributeValue::S(s) => Value::String(s.clone()),
        AttributeValue::N(n) => number_to_json(n),
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::B(blob) => Value::String(STANDARD.encode(blob.as_ref())),
        AttributeValue::M(map) => Value::Object(unmarshall(map)?),
        AttributeValue::L(items) => Value::Array(
            items
                .iter()
                .map(attribute_to_json)
                .collect::<Result<Vec<_>>>()?,
        ),
        AttributeValue::Ss(items) => {
            Value::Array(items.iter().cloned().map(Value::String).collect())
        }
        AttributeValue::Ns(items) => Value::Array(items.iter().map(|n| number_to_json(n)).collect()),
        AttributeValue::Bs(items) => Value::Array(
            items
                .iter()
                .map(|blob| Value::String(STANDARD.encode(blob.as_ref())))
                .collect(),
        ),
        other => {
            return Err(DataError::SerializationError(format!(
                "Unsupported DynamoDB attribute value: {:?}",
                other
            )))
        }
    };

    Ok(json)
}

/// DynamoDB numbers arrive as strings. Integers stay exact, other values
/// become floats, and anything that fits neither is kept as a string.
fn number_to_json(n: &str) -> Value {
    if let Ok(i) = n.parse::<i64>() {
        return Value::Number(i.into());
    }
    if let Ok(u) = n.parse::<u64>() {
        return Value::Number(u.into());
    }
    n.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(n.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_dynamodb::primitives::Blob;
    use serde_json::json;

    fn item(pairs: Vec<(&str, AttributeValue)>) -> HashMap<String, AttributeValue> {
        pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    #[test]
    fn test_unmarshall_scalars() {
        let record = unmarshall(&item(vec![
            ("pk", AttributeValue::S("USER#1".to_string())),
            ("age", AttributeValue::N("36".to_string())),
            ("score", AttributeValue::N("9.5".to_string())),
            ("active", AttributeValue::Bool(true)),
            ("deleted", AttributeValue::Null(true)),
        ]))
        .unwrap();

        assert_eq!(
            Value::Object(record),
            json!({
                "pk": "USER#1",
                "age": 36,
                "score": 9.5,
                "active": true,
                "deleted": null
            })
        );
    }

    #[test]
    fn test_unmarshall_nested_documents() {
        let address = item(vec![("city", AttributeValue::S("London".to_string()))]);
        let record = unmarshall(&item(vec![
            ("address", AttributeValue::M(address)),
            (
                "history",
                AttributeValue::L(vec![
                    AttributeValue::N("1".to_string()),
                    AttributeValue::S("two".to_string()),
                ]),
            ),
        ]))
        .unwrap();

        assert_eq!(record["address"]["city"], json!("London"));
        assert_eq!(record["history"], json!([1, "two"]));
    }

    #[test]
    fn test_unmarshall_sets_and_binary() {
        let record = unmarshall(&item(vec![
            (
                "tags",
                AttributeValue::Ss(vec!["a".to_string(), "b".to_string()]),
            ),
            (
                "ids",
                AttributeValue::Ns(vec!["1".to_string(), "2.5".to_string()]),
            ),
            ("raw", AttributeValue::B(Blob::new(b"hi".to_vec()))),
            ("blobs", AttributeValue::Bs(vec![Blob::new(b"hi".to_vec())])),
        ]))
        .unwrap();

        assert_eq!(record["tags"], json!(["a", "b"]));
        assert_eq!(record["ids"], json!([1, 2.5]));
        assert_eq!(record["raw"], json!("aGk="));
        assert_eq!(record["blobs"], json!(["aGk="]));
    }

    #[test]
    fn test_oversized_number_kept_exact_as_string() {
        assert_eq!(number_to_json("18446744073709551615"), json!(18446744073709551615u64));
        assert_eq!(
            number_to_json("1e400"),
            json!("1e400"),
            "values outside f64 range stay as strings"
        );
    }
}
