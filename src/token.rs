//! Session token decoding.
//!
//! The backend issues a compact JWS (`header.payload.signature`). The console
//! only reads the payload: the signature is not verified client-side because
//! the backend that issued the token is the one that checks it on every call.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::DecodeError;

/// Claim name the backend uses for the user's role.
pub const ROLE_CLAIM: &str = "http://schemas.microsoft.com/ws/2008/06/identity/claims/role";

const SALESPERSON_CLAIM: &str = "SalespersonId";
const NAME_CLAIM: &str = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/name";

/// Access tier derived from the token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    User,
    #[serde(untagged)]
    Other(String),
}

impl Role {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("admin") {
            Role::Admin
        } else if trimmed.eq_ignore_ascii_case("user") {
            Role::User
        } else {
            Role::Other(trimmed.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
            Role::Other(s) => s,
        }
    }
}

/// Decoded token payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub salesperson_id: Option<i64>,
    pub role: Option<Role>,
    pub subject: Option<String>,
    pub username: Option<String>,
    pub expires_at: Option<i64>,
    /// Every claim as received, including the ones mapped above.
    #[serde(skip)]
    pub raw: Map<String, Value>,
}

impl Claims {
    fn from_map(raw: Map<String, Value>) -> Self {
        let salesperson_id = raw.get(SALESPERSON_CLAIM).and_then(value_as_i64);
        let role = raw.get(ROLE_CLAIM).and_then(role_from_value);
        let subject = raw.get("sub").and_then(value_as_string);
        let username = ["unique_name", "name", NAME_CLAIM]
            .iter()
            .find_map(|k| raw.get(*k).and_then(value_as_string));
        let expires_at = raw.get("exp").and_then(value_as_i64);
        Self {
            salesperson_id,
            role,
            subject,
            username,
            expires_at,
            raw,
        }
    }
}

fn value_as_i64(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn value_as_string(v: &Value) -> Option<String> {
    v.as_str()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// A role claim may be a single string or an array of them. ADMIN wins over
/// USER; an unrecognised value is kept as `Other`.
fn role_from_value(v: &Value) -> Option<Role> {
    match v {
        Value::String(s) if !s.trim().is_empty() => Some(Role::parse(s)),
        Value::Array(items) => {
            let roles: Vec<Role> = items
                .iter()
                .filter_map(Value::as_str)
                .filter(|s| !s.trim().is_empty())
                .map(Role::parse)
                .collect();
            if roles.contains(&Role::Admin) {
                Some(Role::Admin)
            } else if roles.contains(&Role::User) {
                Some(Role::User)
            } else {
                roles.into_iter().next()
            }
        }
        _ => None,
    }
}

/// Decode the payload of a compact JWS into [`Claims`].
pub fn decode(credential: &str) -> Result<Claims, DecodeError> {
    let token = credential.trim();
    let token = token
        .strip_prefix("Bearer ")
        .or_else(|| token.strip_prefix("bearer "))
        .unwrap_or(token)
        .trim();
    if token.is_empty() {
        return Err(DecodeError::Empty);
    }

    let segments: Vec<&str> = token.split('.').collect();
    let payload = match segments.as_slice() {
        [_, payload, _] => *payload,
        other => return Err(DecodeError::Segments(other.len())),
    };
    if payload.is_empty() {
        return Err(DecodeError::Empty);
    }

    // Tolerate padded payloads even though JWS forbids them.
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| DecodeError::Base64(e.to_string()))?;
    let value: Value =
        serde_json::from_slice(&bytes).map_err(|e| DecodeError::Json(e.to_string()))?;
    match value {
        Value::Object(map) => Ok(Claims::from_map(map)),
        _ => Err(DecodeError::NotAnObject),
    }
}

/// Build an unsigned token around `payload`. Test helper shared across modules.
#[cfg(test)]
pub(crate) fn encode_for_test(payload: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{header}.{body}.c2lnbmF0dXJl")
}

#[cfg(test)]
pub(crate) fn token_for_role(role: &str, salesperson_id: i64) -> String {
    encode_for_test(&serde_json::json!({
        "SalespersonId": salesperson_id.to_string(),
        ROLE_CLAIM: role,
        "unique_name": "seller@orderit.app",
        "exp": 1_900_000_000,
    }))
}
