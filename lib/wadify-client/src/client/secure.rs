use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Holder for the api key, the client secret, and OAuth2 tokens.
///
/// The value is zeroed in memory on drop and never rendered through `Debug`.
/// Serde is transparent because the persisted credential file stores the raw
/// token, not a redacted form.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct SecureString(String);

impl SecureString {
    /// Borrows the raw value, for the grant forms and the bearer header.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("SecureString(***)")
    }
}

impl From<String> for SecureString {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SecureString {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_not_leak_value_through_debug() {
        let token = SecureString::from("wadify-access-token");
        assert_eq!(format!("{token:?}"), "SecureString(***)");
    }

    #[test]
    fn should_serialize_transparently_for_the_persisted_format() {
        let token = SecureString::from("T1");
        assert_eq!(serde_json::to_string(&token).expect("serialize"), r#""T1""#);

        let back: SecureString = serde_json::from_str(r#""T1""#).expect("deserialize");
        assert_eq!(back, token);
        assert_eq!(back.as_str(), "T1");
    }

    #[test]
    fn should_serialize_as_plain_string_inside_objects() {
        // Token files written before this crate existed hold plain strings;
        // the wrapper must not change their shape.
        let json = serde_json::json!({"accessToken": SecureString::from("T1")});
        assert_eq!(json, serde_json::json!({"accessToken": "T1"}));
    }
}
