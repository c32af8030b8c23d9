use bytes::Bytes;
use http::header::{ACCEPT, CONTENT_TYPE, HeaderName};
use http::{HeaderMap, HeaderValue, Method};
use serde_json::Value;
use tracing::debug;
use url::Url;

mod auth;
pub use self::auth::Credential;

mod builder;
pub use self::builder::WadifyClientBuilder;

mod error;
pub use self::error::{ApiError, ApiErrorKind, ConfigError};

mod links;

mod secure;
pub use self::secure::SecureString;

pub mod store;

mod transport;
pub use self::transport::{HttpTransport, Transport, TransportRequest, TransportResponse};


use self::auth::AuthSession;
use self::links::LinkTable;

/// Client for the Wadify REST API.
///
/// Authentication (OAuth2 api-key grant, bearer attachment, reactive token
/// refresh, credential persistence) and hypermedia link tracking are handled
/// transparently; the public operations are thin wrappers over a single
/// request pipeline. Use [`WadifyClient::builder`] to create instances.
///
/// # Example
///
/// ```rust,no_run
/// use wadify_client::WadifyClient;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut client = WadifyClient::builder()
///     .with_api_key("my-api-key")
///     .with_client_id("my-client-id")
///     .with_client_secret("my-client-secret")
///     .build()?;
///
/// // The first call performs the api-key grant when no credential is
/// // cached; later calls reuse (and refresh) the persisted token.
/// let user = client.get_user().await?;
/// println!("{user}");
/// # Ok(())
/// # }
/// ```
///
/// # Concurrency
///
/// A client instance is designed for sequential use: operations take
/// `&mut self` because every call may update the hypermedia link table.
#[derive(Debug)]
pub struct WadifyClient {
    session: AuthSession,
    links: LinkTable,
    base_url: Url,
    version: String,
}

impl WadifyClient {
    /// Creates a builder.
    pub fn builder() -> WadifyClientBuilder {
        WadifyClientBuilder::default()
    }

    /// Fetches the current user.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ApiError`] for the failed call.
    pub async fn get_user(&mut self) -> Result<Value, ApiError> {
        self.execute(Method::GET, "user", None, None, HeaderMap::new())
            .await
    }

    /// Lists transactions.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ApiError`] for the failed call.
    pub async fn get_transactions(&mut self) -> Result<Value, ApiError> {
        self.execute(Method::GET, "transactions", None, None, HeaderMap::new())
            .await
    }

    /// Fetches one transaction by id.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ApiError`] for the failed call.
    pub async fn get_transaction(&mut self, id: &str) -> Result<Value, ApiError> {
        self.execute(Method::GET, "transactions", Some(id), None, HeaderMap::new())
            .await
    }

    /// Aborts one transaction by id.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ApiError`] for the failed call.
    pub async fn abort_transaction(&mut self, id: &str) -> Result<Value, ApiError> {
        let append = format!("{id}/abort");
        self.execute(
            Method::PATCH,
            "transactions",
            Some(&append),
            None,
            HeaderMap::new(),
        )
        .await
    }

    /// Creates a transaction from a data payload.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ApiError`] for the failed call.
    pub async fn create_transaction(&mut self, data: &Value) -> Result<Value, ApiError> {
        self.execute(
            Method::POST,
            "transactions",
            None,
            Some(data),
            HeaderMap::new(),
        )
        .await
    }

    /// One logical API call: header merge, link resolution, authenticated
    /// dispatch, error classification, link extraction, and credential
    /// persistence.
    ///
    /// Side-effect ordering matters: the link table update and the
    /// credential write both complete before the body is returned.
    async fn execute(
        &mut self,
        method: Method,
        resource: &str,
        append: Option<&str>,
        body: Option<&Value>,
        headers: HeaderMap,
    ) -> Result<Value, ApiError> {
        let url = self
            .links
            .resolve(&self.base_url, &self.version, resource, append)
            .map_err(|err| {
                ApiError::transport(
                    method.clone(),
                    format!("{}api/{}/{resource}", self.base_url, self.version),
                    format!("unresolvable target: {err}"),
                )
            })?;

        let mut request = TransportRequest::new(method.clone(), url.clone());
        request
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        request
            .headers
            .insert(ACCEPT, HeaderValue::from_static("application/json"));
        let version = HeaderValue::from_str(&self.version).map_err(|_| {
            ApiError::transport(
                method.clone(),
                url.to_string(),
                "version is not a valid header value",
            )
        })?;
        request
            .headers
            .insert(HeaderName::from_static("accept-version"), version);
        // Caller-supplied headers win on conflicting keys.
        for (name, value) in &headers {
            request.headers.insert(name.clone(), value.clone());
        }

        if let Some(payload) = body {
            let bytes = serde_json::to_vec(payload).map_err(|err| {
                ApiError::transport(
                    method.clone(),
                    url.to_string(),
                    format!("unserializable request body: {err}"),
                )
            })?;
            request = request.with_body(Bytes::from(bytes));
        }

        debug!(%method, %url, "executing request");
        let response = self.session.send(request).await?;
        if !response.status.is_success() {
            return Err(ApiError::from_response(
                method,
                url.to_string(),
                response.status,
                response.body_text(),
            ));
        }

        let mut value = if response.body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&response.body).map_err(|err| ApiError::Transport {
                method,
                url: url.to_string(),
                status: Some(response.status),
                message: format!("invalid response body: {err}"),
            })?
        };

        self.links.extract(&mut value);
        self.session.persist().await;
        Ok(value)
    }
}
