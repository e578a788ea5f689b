//! Reading client records from JSON documents and JSON-lines files

use crate::error::{ChurnError, Result};
use crate::types::client::ClientRecord;
use crate::types::prediction::ChurnLabel;
use serde_json::Value;

/// Field holding the known outcome in labeled data
pub const LABEL_FIELD: &str = "Churn";

/// Parse a JSON array of records, a `{"clientes": [...]}` payload or JSON lines.
pub fn parse_records(text: &str) -> Result<Vec<ClientRecord>> {
    documents(text)?
        .into_iter()
        .enumerate()
        .map(|(index, value)| at_record(index, ClientRecord::from_json_value(value)))
        .collect()
}

/// Parse records that carry a `Churn` label ("Yes"/"No" or 1/0).
pub fn parse_labeled(text: &str) -> Result<Vec<(ClientRecord, ChurnLabel)>> {
    documents(text)?
        .into_iter()
        .enumerate()
        .map(|(index, value)| at_record(index, split_label(value)))
        .collect()
}

fn split_label(mut value: Value) -> Result<(ClientRecord, ChurnLabel)> {
    let label = value
        .as_object_mut()
        .and_then(|fields| fields.remove(LABEL_FIELD))
        .ok_or_else(|| ChurnError::Validation(format!("missing field `{}`", LABEL_FIELD)))?;

    let label = match &label {
        Value::String(s) if s == "Yes" => ChurnLabel::Yes,
        Value::String(s) if s == "No" => ChurnLabel::No,
        Value::Number(n) if n.as_u64() == Some(1) => ChurnLabel::Yes,
        Value::Number(n) if n.as_u64() == Some(0) => ChurnLabel::No,
        other => {
            return Err(ChurnError::Validation(format!(
                "`{}` must be \"Yes\", \"No\", 1 or 0, got {}",
                LABEL_FIELD, other
            )))
        }
    };

    Ok((ClientRecord::from_json_value(value)?, label))
}

fn documents(text: &str) -> Result<Vec<Value>> {
    // A whole document first, so pretty-printed input works
    if let Ok(document) = serde_json::from_str::<Value>(text) {
        return match document {
            Value::Array(records) => Ok(records),
            Value::Object(mut fields) if fields.contains_key("clientes") => {
                match fields.remove("clientes") {
                    Some(Value::Array(records)) => Ok(records),
                    _ => Err(ChurnError::Validation("`clientes` must be an array".to_string())),
                }
            }
            other => Ok(vec![other]),
        };
    }

    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str::<Value>(line).map_err(ChurnError::from))
        .collect()
}

fn at_record<T>(index: usize, result: Result<T>) -> Result<T> {
    result.map_err(|e| match e {
        ChurnError::Validation(message) => {
            ChurnError::Validation(format!("record {}: {}", index + 1, message))
        }
        other => other,
    })
}
