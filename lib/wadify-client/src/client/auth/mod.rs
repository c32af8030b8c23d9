//! The authenticated half of the request pipeline: bearer attachment, the
//! initial api-key grant, reactive refresh after 401, and persistence
//! hand-off to the token store.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;
use chrono::Utc;
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderValue, Method, StatusCode};
use tracing::{debug, warn};
use url::Url;

mod credential;
mod grant;

pub use self::credential::Credential;
pub(crate) use self::credential::CredentialCache;

use self::grant::TokenResponse;
use super::error::ApiError;
use super::secure::SecureString;
use super::store::TokenStore;
use super::transport::{Transport, TransportRequest, TransportResponse};

/// Bound on dispatch attempts per logical request, guarding against a
/// refresh exchange that keeps succeeding while the resource keeps
/// answering 401.
pub(crate) const DEFAULT_MAX_AUTH_ATTEMPTS: usize = 5;

/// Per-client authentication state: the credential cache, the grant
/// parameters, and the store handle for persistence.
#[derive(Debug)]
pub(crate) struct AuthSession {
    transport: Arc<dyn Transport>,
    store: Arc<dyn TokenStore>,
    cache: CredentialCache,
    token_url: Url,
    api_key: SecureString,
    client_id: String,
    client_secret: SecureString,
    max_auth_attempts: usize,
    /// Set when a grant or refresh produced a credential the store has not
    /// seen yet; cleared by a successful [`AuthSession::persist`].
    dirty: AtomicBool,
}

impl AuthSession {
    #[expect(clippy::too_many_arguments, reason = "assembled once, by the builder")]
    pub(crate) fn new(
        transport: Arc<dyn Transport>,
        store: Arc<dyn TokenStore>,
        cache: CredentialCache,
        token_url: Url,
        api_key: SecureString,
        client_id: String,
        client_secret: SecureString,
        max_auth_attempts: usize,
    ) -> Self {
        Self {
            transport,
            store,
            cache,
            token_url,
            api_key,
            client_id,
            client_secret,
            max_auth_attempts,
            dirty: AtomicBool::new(false),
        }
    }

    /// Sends the request with a bearer token attached, performing the
    /// initial grant when the cache is empty and a bounded
    /// refresh-and-retry when the server answers 401.
    pub(crate) async fn send(
        &self,
        request: TransportRequest,
    ) -> Result<TransportResponse, ApiError> {
        let mut credential = match self.cache.get().await {
            Some(credential) => {
                if credential.is_expired(Utc::now().timestamp()) {
                    debug!("cached access token is past its expiry, attaching it anyway");
                }
                credential
            }
            None => self.initial_grant().await?,
        };

        let mut attempts = 0;
        loop {
            let mut attempt = request.clone();
            attempt
                .headers
                .insert(AUTHORIZATION, bearer_value(&credential, &request)?);

            let response = self.transport.send(attempt).await?;
            if response.status != StatusCode::UNAUTHORIZED {
                return Ok(response);
            }

            attempts += 1;
            if attempts >= self.max_auth_attempts || credential.refresh_token().is_empty() {
                return Err(ApiError::from_response(
                    request.method.clone(),
                    request.url.to_string(),
                    response.status,
                    response.body_text(),
                ));
            }

            debug!(attempts, url = %request.url, "authentication failed, refreshing token");
            credential = self.refresh(&credential).await?;
        }
    }

    /// Writes the active credential to the store when a grant or refresh
    /// replaced it since the last write.
    ///
    /// A failed write is reported and leaves the session dirty so the next
    /// successful request retries it; it never fails the in-flight request.
    pub(crate) async fn persist(&self) {
        if !self.dirty.swap(false, Ordering::SeqCst) {
            return;
        }
        let Some(credential) = self.cache.get().await else {
            return;
        };
        if let Err(err) = self.store.set(&credential) {
            self.dirty.store(true, Ordering::SeqCst);
            warn!(error = %err, "failed to persist credential");
        }
    }

    async fn initial_grant(&self) -> Result<Credential, ApiError> {
        debug!("no cached credential, performing api-key grant");
        let form = grant::api_key_grant_form(
            self.api_key.as_str(),
            &self.client_id,
            self.client_secret.as_str(),
        );
        self.token_exchange(&form, None).await
    }

    async fn refresh(&self, current: &Credential) -> Result<Credential, ApiError> {
        let form = grant::refresh_grant_form(
            current.refresh_token(),
            &self.client_id,
            self.client_secret.as_str(),
        );
        self.token_exchange(&form, Some(current.refresh_token()))
            .await
    }

    /// One round against the token endpoint. The replacement credential is
    /// cached and the session marked dirty for the next persistence pass.
    async fn token_exchange(
        &self,
        form: &[(&'static str, String)],
        previous_refresh: Option<&str>,
    ) -> Result<Credential, ApiError> {
        let body = serde_urlencoded::to_string(form).map_err(|err| {
            ApiError::transport(Method::POST, self.token_url.to_string(), err.to_string())
        })?;

        let mut request = TransportRequest::new(Method::POST, self.token_url.clone())
            .with_body(Bytes::from(body));
        request.headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        request
            .headers
            .insert(ACCEPT, HeaderValue::from_static("application/json"));

        let response = self.transport.send(request).await?;
        if !response.status.is_success() {
            return Err(ApiError::from_response(
                Method::POST,
                self.token_url.to_string(),
                response.status,
                response.body_text(),
            ));
        }

        let token: TokenResponse = serde_json::from_slice(&response.body).map_err(|err| {
            ApiError::transport(
                Method::POST,
                self.token_url.to_string(),
                format!("invalid token response: {err}"),
            )
        })?;
        let credential = token
            .into_credential(Utc::now().timestamp(), previous_refresh)
            .ok_or_else(|| {
                ApiError::transport(
                    Method::POST,
                    self.token_url.to_string(),
                    "token response is missing an expiry or refresh token",
                )
            })?;

        self.cache.set(credential.clone()).await;
        self.dirty.store(true, Ordering::SeqCst);
        debug!("credential replaced");
        Ok(credential)
    }
}

fn bearer_value(
    credential: &Credential,
    request: &TransportRequest,
) -> Result<HeaderValue, ApiError> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", credential.access_token()))
        .map_err(|_| {
            ApiError::transport(
                request.method.clone(),
                request.url.to_string(),
                "access token contains invalid header characters",
            )
        })?;
    value.set_sensitive(true);
    Ok(value)
}
