use std::sync::Arc;

use tracing::{debug, warn};
use url::Url;

use super::auth::{AuthSession, CredentialCache, DEFAULT_MAX_AUTH_ATTEMPTS};
use super::error::ConfigError;
use super::links::LinkTable;
use super::secure::SecureString;
use super::store::{StoreError, TokenStore, TokenStoreConfig};
use super::transport::{HttpTransport, Transport};
use super::WadifyClient;

/// Production API endpoint.
const PRODUCTION_ENDPOINT: &str = "https://api.wadify.com";
/// Sandbox API endpoint, selected by [`WadifyClientBuilder::with_sandbox`].
const SANDBOX_ENDPOINT: &str = "https://api-sandbox.wadify.com";
/// OAuth2 token endpoint path, relative to the API endpoint.
const TOKEN_PATH: &str = "/oauth/v2/token";
/// Latest stable API version.
const DEFAULT_VERSION: &str = "0.0.1";

/// Builder for [`WadifyClient`] instances.
///
/// `api_key`, `client_id`, and `client_secret` are required; everything else
/// has a default. The token store and the transport are injectable for
/// custom persistence backends and for tests.
///
/// # Example
///
/// ```rust,no_run
/// use wadify_client::WadifyClient;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = WadifyClient::builder()
///     .with_api_key("my-api-key")
///     .with_client_id("my-client-id")
///     .with_client_secret("my-client-secret")
///     .with_sandbox(true)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct WadifyClientBuilder {
    api_key: Option<SecureString>,
    client_id: Option<String>,
    client_secret: Option<SecureString>,
    version: Option<String>,
    sandbox: bool,
    token_store_config: Option<TokenStoreConfig>,
    token_store: Option<Arc<dyn TokenStore>>,
    transport: Option<Arc<dyn Transport>>,
}

impl WadifyClientBuilder {
    /// Sets the API key used by the initial OAuth2 grant. Required.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<SecureString>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the OAuth2 client id. Required.
    #[must_use]
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Sets the OAuth2 client secret. Required.
    #[must_use]
    pub fn with_client_secret(mut self, client_secret: impl Into<SecureString>) -> Self {
        self.client_secret = Some(client_secret.into());
        self
    }

    /// Sets the API version negotiated with the server.
    ///
    /// Defaults to the latest stable version (`0.0.1`).
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Routes calls to the sandbox endpoint instead of production.
    ///
    /// Defaults to `false`.
    #[must_use]
    pub fn with_sandbox(mut self, sandbox: bool) -> Self {
        self.sandbox = sandbox;
        self
    }

    /// Selects a token store provider by configuration.
    ///
    /// Defaults to a filesystem provider at
    /// `{temp dir}/wadify/tokencache.json`.
    #[must_use]
    pub fn with_token_provider(mut self, config: TokenStoreConfig) -> Self {
        self.token_store_config = Some(config);
        self
    }

    /// Injects a custom token store, taking precedence over
    /// [`with_token_provider`](Self::with_token_provider).
    #[must_use]
    pub fn with_token_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.token_store = Some(store);
        self
    }

    /// Injects a custom transport. Defaults to [`HttpTransport`].
    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Builds the client.
    ///
    /// Seeds the in-memory credential cache from the token store: with a
    /// persisted credential the first request skips the initial grant,
    /// otherwise the cache starts empty and the first request triggers it.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a required option is missing or the
    /// endpoint configuration is invalid.
    pub fn build(self) -> Result<WadifyClient, ConfigError> {
        let Self {
            api_key,
            client_id,
            client_secret,
            version,
            sandbox,
            token_store_config,
            token_store,
            transport,
        } = self;

        let api_key = api_key.ok_or(ConfigError::MissingOption { name: "api_key" })?;
        let client_id = client_id.ok_or(ConfigError::MissingOption { name: "client_id" })?;
        let client_secret = client_secret.ok_or(ConfigError::MissingOption {
            name: "client_secret",
        })?;
        let version = version.unwrap_or_else(|| DEFAULT_VERSION.to_string());

        let endpoint = if sandbox {
            SANDBOX_ENDPOINT
        } else {
            PRODUCTION_ENDPOINT
        };
        let base_url = Url::parse(endpoint).map_err(|err| ConfigError::InvalidBaseUrl {
            url: endpoint.to_string(),
            reason: err.to_string(),
        })?;
        let token_url =
            base_url
                .join(TOKEN_PATH)
                .map_err(|err| ConfigError::InvalidBaseUrl {
                    url: format!("{endpoint}{TOKEN_PATH}"),
                    reason: err.to_string(),
                })?;

        let store = match token_store {
            Some(store) => store,
            None => token_store_config.unwrap_or_default().build(),
        };
        let transport: Arc<dyn Transport> =
            transport.unwrap_or_else(|| Arc::new(HttpTransport::new()));

        let seed = match store.get() {
            Ok(credential) => {
                debug!("seeding credential cache from token store");
                Some(credential)
            }
            Err(StoreError::NotFound) => {
                debug!("no persisted credential, first request will perform the initial grant");
                None
            }
            Err(err) => {
                warn!(error = %err, "ignoring unusable persisted credential");
                None
            }
        };

        let session = AuthSession::new(
            Arc::clone(&transport),
            store,
            CredentialCache::with(seed),
            token_url,
            api_key,
            client_id,
            client_secret,
            DEFAULT_MAX_AUTH_ATTEMPTS,
        );

        Ok(WadifyClient {
            session,
            links: LinkTable::default(),
            base_url,
            version,
        })
    }
}
