//! Request validation shared by every handler.
//!
//! Checks run before any store call; a failed check becomes a 400 response
//! carrying one of the named error kinds below.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use mongodb::bson::oid::ObjectId;
use serde_json::Value;
use service_core::error::AppError;

pub fn invalid_identifier(field: &str) -> AppError {
    AppError::InvalidIdentifier(field.to_string())
}

pub fn missing_field(field: &str) -> AppError {
    AppError::MissingField(field.to_string())
}

pub fn invalid_type(field: &str, expected: &'static str) -> AppError {
    AppError::InvalidType {
        field: field.to_string(),
        expected,
    }
}

/// True iff `candidate` is a 24-character hexadecimal ObjectId.
pub fn is_valid_identifier(candidate: &str) -> bool {
    ObjectId::parse_str(candidate).is_ok()
}

pub fn is_non_empty_string(value: &Value) -> bool {
    value.as_str().is_some_and(|s| !s.is_empty())
}

/// Parse an identifier taken from the path or the token subject.
pub fn parse_identifier(field: &str, candidate: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(candidate).map_err(|_| invalid_identifier(field))
}

fn field<'a>(body: &'a Value, name: &str) -> Option<&'a Value> {
    body.get(name).filter(|value| !value.is_null())
}

/// Body identifier: absent is `MissingField`, anything but a well-formed id string is
/// `InvalidIdentifier`.
pub fn require_identifier(body: &Value, name: &str) -> Result<ObjectId, AppError> {
    let value = field(body, name).ok_or_else(|| missing_field(name))?;
    value
        .as_str()
        .ok_or_else(|| invalid_identifier(name))
        .and_then(|candidate| parse_identifier(name, candidate))
}

/// Body string: absent or empty is `MissingField`, a non-string is `InvalidType`.
pub fn require_string(body: &Value, name: &str) -> Result<String, AppError> {
    let value = field(body, name).ok_or_else(|| missing_field(name))?;
    if !value.is_string() {
        return Err(invalid_type(name, "string"));
    }
    if !is_non_empty_string(value) {
        return Err(missing_field(name));
    }
    Ok(value.as_str().map(str::to_string).unwrap_or_default())
}

pub fn require_bool(body: &Value, name: &str) -> Result<bool, AppError> {
    let value = field(body, name).ok_or_else(|| missing_field(name))?;
    value.as_bool().ok_or_else(|| invalid_type(name, "boolean"))
}

/// Identifier carried by the delete-by-id routes: either the bare JSON string body
/// or an object with an `id` key.
pub fn identifier_from_body(body: &Value) -> Result<ObjectId, AppError> {
    match body {
        Value::String(candidate) => parse_identifier("id", candidate),
        Value::Object(_) => require_identifier(body, "id"),
        Value::Null => Err(missing_field("id")),
        _ => Err(invalid_identifier("id")),
    }
}

/// Raw JSON body. Unlike `axum::Json` an empty body is accepted (as `null`) and the
/// content type is not enforced, so that field checks report the precise error kind.
pub struct JsonBody(pub Value);

#[axum::async_trait]
impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|e| {
            AppError::BadRequest(anyhow::anyhow!("Failed to read request body: {}", e))
        })?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(JsonBody(Value::Null));
        }

        let value = serde_json::from_slice(&bytes)
            .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Json parse error: {}", e)))?;
        Ok(JsonBody(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const VALID: &str = "65a1f0c2e4b0a1b2c3d4e5f6";

    #[test]
    fn identifier_format() {
        assert!(is_valid_identifier(VALID));
        assert!(is_valid_identifier(&VALID.to_uppercase()));
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("65a1f0c2e4b0a1b2c3d4e5f"));
        assert!(!is_valid_identifier("65a1f0c2e4b0a1b2c3d4e5f6a"));
        assert!(!is_valid_identifier("zza1f0c2e4b0a1b2c3d4e5f6"));
    }

    #[test]
    fn non_empty_string_shape() {
        assert!(is_non_empty_string(&json!("admin")));
        assert!(!is_non_empty_string(&json!("")));
        assert!(!is_non_empty_string(&json!(123)));
        assert!(!is_non_empty_string(&Value::Null));
    }

    #[test]
    fn require_identifier_distinguishes_missing_from_malformed() {
        let body = json!({ "userId": VALID, "orgId": "nope", "eventId": 42 });

        assert_eq!(require_identifier(&body, "userId").unwrap().to_hex(), VALID);
        assert_eq!(
            require_identifier(&body, "orgId").unwrap_err().code(),
            "InvalidIdentifier"
        );
        assert_eq!(
            require_identifier(&body, "eventId").unwrap_err().code(),
            "InvalidIdentifier"
        );
        assert_eq!(
            require_identifier(&body, "roleId").unwrap_err().code(),
            "MissingField"
        );
    }

    #[test]
    fn require_string_checks_runtime_type() {
        assert_eq!(require_string(&json!({ "role": "admin" }), "role").unwrap(), "admin");
        assert_eq!(
            require_string(&json!({ "role": 123 }), "role").unwrap_err().code(),
            "InvalidType"
        );
        assert_eq!(
            require_string(&json!({ "role": "" }), "role").unwrap_err().code(),
            "MissingField"
        );
        assert_eq!(
            require_string(&json!({ "role": null }), "role").unwrap_err().code(),
            "MissingField"
        );
    }

    #[test]
    fn require_bool_checks_runtime_type() {
        assert!(!require_bool(&json!({ "rsvp": false }), "rsvp").unwrap());
        assert_eq!(
            require_bool(&json!({ "rsvp": "yes" }), "rsvp").unwrap_err().code(),
            "InvalidType"
        );
        assert_eq!(
            require_bool(&json!({}), "rsvp").unwrap_err().code(),
            "MissingField"
        );
    }

    #[test]
    fn delete_body_accepts_bare_or_wrapped_identifier() {
        assert_eq!(identifier_from_body(&json!(VALID)).unwrap().to_hex(), VALID);
        assert_eq!(
            identifier_from_body(&json!({ "id": VALID })).unwrap().to_hex(),
            VALID
        );
        assert_eq!(
            identifier_from_body(&json!("bad")).unwrap_err().code(),
            "InvalidIdentifier"
        );
        assert_eq!(
            identifier_from_body(&json!([VALID])).unwrap_err().code(),
            "InvalidIdentifier"
        );
        assert_eq!(
            identifier_from_body(&Value::Null).unwrap_err().code(),
            "MissingField"
        );
    }
}
