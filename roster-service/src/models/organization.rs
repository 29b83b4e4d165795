//! Organizations are owned by another service; this service only reads them to
//! expand a role's `organizationId` reference.

use mongodb::bson::{Bson, Document};
use serde::Serialize;
use serde_json::{Map, Value};

/// A role's organization reference: the bare id, or the joined document.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum OrganizationRef {
    Id(String),
    Expanded(Value),
}

/// Renders a stored document as API JSON: `_id` becomes `id`, ObjectIds become hex
/// strings, datetimes become RFC 3339 strings and the mongoose `__v` key is dropped.
pub fn document_to_json(document: Document) -> Value {
    let mut object = Map::new();
    for (key, value) in document {
        match key.as_str() {
            "__v" => continue,
            "_id" => {
                object.insert("id".to_string(), bson_to_json(value));
            }
            _ => {
                object.insert(key, bson_to_json(value));
            }
        }
    }
    Value::Object(object)
}

fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => dt
            .try_to_rfc3339_string()
            .map(Value::String)
            .unwrap_or(Value::Null),
        Bson::Document(doc) => document_to_json(doc),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        other => other.into_relaxed_extjson(),
    }
}
