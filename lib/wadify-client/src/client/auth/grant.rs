use serde::Deserialize;

use super::credential::Credential;

/// Grant type URI of the Wadify api-key exchange.
pub(crate) const API_KEY_GRANT: &str = "http://api.wadify.com/grants/api-key";

/// Standard OAuth2 refresh-token grant type.
pub(crate) const REFRESH_TOKEN_GRANT: &str = "refresh_token";

/// Form body for the initial api-key grant. Credentials go in the request
/// body, not in an Authorization header.
pub(crate) fn api_key_grant_form(
    api_key: &str,
    client_id: &str,
    client_secret: &str,
) -> Vec<(&'static str, String)> {
    vec![
        ("grant_type", API_KEY_GRANT.to_string()),
        ("api_key", api_key.to_string()),
        ("client_id", client_id.to_string()),
        ("client_secret", client_secret.to_string()),
    ]
}

/// Form body for the refresh-token grant.
pub(crate) fn refresh_grant_form(
    refresh_token: &str,
    client_id: &str,
    client_secret: &str,
) -> Vec<(&'static str, String)> {
    vec![
        ("grant_type", REFRESH_TOKEN_GRANT.to_string()),
        ("refresh_token", refresh_token.to_string()),
        ("client_id", client_id.to_string()),
        ("client_secret", client_secret.to_string()),
    ]
}

/// Token endpoint response.
///
/// The endpoint reports expiry either as absolute epoch seconds (`expires`)
/// or as a relative lifetime (`expires_in`); refresh responses may omit the
/// refresh token when it is unchanged.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires: Option<i64>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
}

impl TokenResponse {
    /// Converts the wire response into a credential.
    ///
    /// Absolute `expires` wins when both expiry forms are present; a missing
    /// refresh token carries `previous_refresh` forward. Returns `None` when
    /// neither expiry form nor any refresh token is available.
    pub(crate) fn into_credential(
        self,
        now: i64,
        previous_refresh: Option<&str>,
    ) -> Option<Credential> {
        let expires = self
            .expires
            .or_else(|| self.expires_in.map(|lifetime| now + lifetime))?;
        let refresh_token = self
            .refresh_token
            .or_else(|| previous_refresh.map(str::to_string))?;
        Some(Credential::new(self.access_token, expires, refresh_token))
    }
}
