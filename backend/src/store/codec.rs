//! Record <-> document conversion
//!
//! Records serialize with their `id`; documents keep the id beside the
//! data, so it is stripped on the way in and re-injected on the way out.
//! Older documents may still use the earlier key names; updates clear them.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use super::{Document, StoreError};

/// Current key and the earlier name it replaced
const RENAMED_KEYS: &[(&str, &str)] = &[
    ("unitPrice", "price"),
    ("stockQuantity", "stock"),
    ("taxId", "ruc"),
    ("customerTaxId", "customerRUC"),
    ("tax", "vat"),
];

/// Turn update fields into a patch that also drops the earlier name of
/// every key it sets. Without this a merged document would carry both
/// names and fail to decode.
pub fn patch(fields: Value) -> Result<Value, StoreError> {
    let Value::Object(mut map) = fields else {
        return Err(StoreError::InvalidDocument(
            "update patch must be a JSON object".to_string(),
        ));
    };
    for (current, earlier) in RENAMED_KEYS {
        if map.contains_key(*current) {
            map.insert(earlier.to_string(), Value::Null);
        }
    }
    Ok(Value::Object(map))
}

pub fn encode<T: Serialize>(record: &T) -> Result<Value, StoreError> {
    let mut value = serde_json::to_value(record)?;
    match &mut value {
        Value::Object(map) => {
            map.remove("id");
            Ok(value)
        }
        _ => Err(StoreError::InvalidDocument(
            "records must serialize to a JSON object".to_string(),
        )),
    }
}

pub fn decode<T: DeserializeOwned>(document: &Document) -> Result<T, StoreError> {
    let mut value = document.data.clone();
    let Value::Object(map) = &mut value else {
        return Err(StoreError::InvalidDocument(format!(
            "document {} is not a JSON object",
            document.id
        )));
    };
    map.insert("id".to_string(), Value::String(document.id.to_string()));
    serde_json::from_value(value).map_err(|e| {
        StoreError::InvalidDocument(format!("document {}: {}", document.id, e))
    })
}

/// Decode every document, setting aside the ones that fail
pub fn decode_all<T: DeserializeOwned>(documents: &[Document]) -> (Vec<T>, Vec<StoreError>) {
    let mut records = Vec::with_capacity(documents.len());
    let mut failures = Vec::new();
    for document in documents {
        match decode(document) {
            Ok(record) => records.push(record),
            Err(e) => failures.push(e),
        }
    }
    (records, failures)
}
