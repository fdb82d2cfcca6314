//! Canonical user record extracted from provider profile responses.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Normalized identity fields handed to the application's login logic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Provider's user identifier. Numeric ids (GitHub) are stringified in
    /// decimal, so `1` and `"1"` from different providers compare equal.
    pub id: String,
    pub email: String,
    /// Display name, taken from the provider's `name`.
    pub nick: String,
    /// Profile URL, empty when the provider has none.
    pub link: String,
    /// Empty when the provider has none.
    pub gender: String,
}

impl UserRecord {
    /// Build a record from a decoded profile body.
    ///
    /// Fields are only populated when the body carries a non-empty `email`;
    /// otherwise the record is empty (`None`). This also drops profiles whose
    /// email is private, e.g. GitHub users who hide their address.
    pub fn from_profile(raw: &Value) -> Option<Self> {
        let email = raw.get("email").and_then(scalar).filter(|e| !e.is_empty())?;

        Some(Self {
            id: field(raw, "id"),
            email,
            nick: field(raw, "name"),
            link: field(raw, "link"),
            gender: field(raw, "gender"),
        })
    }
}

fn field(raw: &Value, key: &str) -> String {
    raw.get(key).and_then(scalar).unwrap_or_default()
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
