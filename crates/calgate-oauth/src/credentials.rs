//! Conversion between [`CredentialBundle`] and the stored session record.
//!
//! The record is a JSON object with exactly the keys `token`,
//! `refresh_token`, `token_uri`, `client_id`, `client_secret` and `scopes`.

use calgate_types::CredentialBundle;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::{OAuthError, Result};

/// Encode a bundle as a plain session record.
pub fn to_storable(bundle: &CredentialBundle) -> Value {
    json!({
        "token": bundle.access_token,
        "refresh_token": bundle.refresh_token,
        "token_uri": bundle.token_uri.as_str(),
        "client_id": bundle.client_id,
        "client_secret": bundle.client_secret,
        "scopes": bundle.scopes,
    })
}

/// Decode a session record. Unknown keys are ignored.
pub fn from_storable(value: &Value) -> Result<CredentialBundle> {
    if !value.is_object() {
        return Err(OAuthError::MalformedCredential(
            "stored credentials are not an object".to_string(),
        ));
    }
    CredentialBundle::deserialize(value).map_err(|e| OAuthError::MalformedCredential(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle(refresh: Option<&str>) -> CredentialBundle {
        CredentialBundle {
            access_token: "ya29.a0".to_string(),
            refresh_token: refresh.map(str::to_string),
            token_uri: "https://oauth2.googleapis.com/token".parse().unwrap(),
            client_id: "cid".to_string(),
            client_secret: "secret".to_string(),
            scopes: vec![
                "https://www.googleapis.com/auth/calendar".to_string(),
                "https://www.googleapis.com/auth/calendar.events".to_string(),
            ],
        }
    }

    #[test]
    fn test_round_trip_preserves_fields() {
        for original in [bundle(Some("1//refresh")), bundle(None)] {
            let stored = to_storable(&original);
            assert_eq!(stored.as_object().unwrap().len(), 6);
            assert_eq!(from_storable(&stored).unwrap(), original);
        }
    }

    #[test]
    fn test_missing_key_is_malformed() {
        let mut stored = to_storable(&bundle(None));
        stored.as_object_mut().unwrap().remove("token");
        assert!(matches!(
            from_storable(&stored),
            Err(OAuthError::MalformedCredential(_))
        ));
    }

    #[test]
    fn test_wrong_types_are_malformed() {
        let mut stored = to_storable(&bundle(None));
        stored["scopes"] = json!("calendar");
        assert!(from_storable(&stored).is_err());

        let mut stored = to_storable(&bundle(None));
        stored["token_uri"] = json!("not a url");
        assert!(from_storable(&stored).is_err());

        assert!(from_storable(&json!("token")).is_err());
        assert!(from_storable(&Value::Null).is_err());
    }

    #[test]
    fn test_extra_keys_ignored() {
        let mut stored = to_storable(&bundle(Some("r")));
        stored["expiry"] = json!("2025-01-01T00:00:00Z");
        assert_eq!(from_storable(&stored).unwrap(), bundle(Some("r")));
    }
}
