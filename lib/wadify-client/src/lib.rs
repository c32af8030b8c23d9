//! # Wadify API Client
//!
//! A Rust client for the Wadify REST API with OAuth2 api-key grant
//! authentication, transparent token refresh, and persistent credential
//! caching across process restarts.
//!
//! ## Features
//!
//! - **Authenticated request pipeline**: the initial api-key grant happens
//!   lazily on the first call; a 401 triggers a bounded refresh-token
//!   exchange and a retry before the error is surfaced
//! - **Durable credentials**: tokens are persisted through a pluggable
//!   [`TokenStore`] (filesystem by default) and reused on the next run
//! - **Hypermedia aware**: server-provided `_links` are tracked and
//!   preferred over statically constructed URIs, and stripped from returned
//!   bodies
//! - **Typed failures**: HTTP failures map onto [`ApiError`] with the
//!   original request and response context preserved
//!
//! ## Example
//!
//! ```rust,no_run
//! use wadify_client::WadifyClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = WadifyClient::builder()
//!         .with_api_key("my-api-key")
//!         .with_client_id("my-client-id")
//!         .with_client_secret("my-client-secret")
//!         .build()?;
//!
//!     let user = client.get_user().await?;
//!     println!("{user}");
//!
//!     let transaction = client
//!         .create_transaction(&serde_json::json!({"amount": 100, "currency": "EUR"}))
//!         .await?;
//!     println!("{transaction}");
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Testing against a mock transport
//!
//! The HTTP transport and the token store are both injectable, so request
//! behavior can be exercised without a network:
//!
//! ```rust,ignore
//! let client = WadifyClient::builder()
//!     .with_api_key("k")
//!     .with_client_id("c")
//!     .with_client_secret("s")
//!     .with_transport(my_scripted_transport)
//!     .with_token_store(std::sync::Arc::new(wadify_client::store::InMemoryStore::new()))
//!     .build()?;
//! ```

mod client;

pub use self::client::store;
pub use self::client::store::{
    FileSystemStore, InMemoryStore, StoreError, TokenStore, TokenStoreConfig,
};
pub use self::client::{
    ApiError, ApiErrorKind, ConfigError, Credential, HttpTransport, SecureString, Transport,
    TransportRequest, TransportResponse, WadifyClient, WadifyClientBuilder,
};
