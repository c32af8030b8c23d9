use http::{Method, StatusCode};

/// Semantic classification of a failed API call.
///
/// Exactly one kind is assigned per failure, derived from the HTTP status
/// code of the response (or `Transport` when no response was received).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// The request body or parameters were malformed (HTTP 400).
    BadRequest,
    /// Credentials are invalid or expired and could not be repaired (HTTP 401).
    AuthenticationFailed,
    /// Credentials are valid but lack permission for the resource (HTTP 403).
    AuthorizationFailed,
    /// Anything else: network failure, unexpected status, malformed response.
    Transport,
}

impl ApiErrorKind {
    /// Maps an HTTP status code to its semantic error kind.
    ///
    /// - 400 → [`ApiErrorKind::BadRequest`]
    /// - 401 → [`ApiErrorKind::AuthenticationFailed`]
    /// - 403 → [`ApiErrorKind::AuthorizationFailed`]
    /// - any other status → [`ApiErrorKind::Transport`]
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::BAD_REQUEST => Self::BadRequest,
            StatusCode::UNAUTHORIZED => Self::AuthenticationFailed,
            StatusCode::FORBIDDEN => Self::AuthorizationFailed,
            _ => Self::Transport,
        }
    }
}

/// Errors surfaced by API operations.
///
/// Every variant keeps the original request context (method, URL) and the
/// response status and body when one was received, so failures stay
/// actionable in logs and error reports.
#[derive(Debug, derive_more::Error, derive_more::Display)]
pub enum ApiError {
    /// The server rejected the request as malformed (HTTP 400).
    #[display("Bad request: {method} {url} returned {status}: {message}")]
    BadRequest {
        /// HTTP method of the failed request.
        method: Method,
        /// Full URL of the failed request.
        url: String,
        /// Status code returned by the server.
        status: StatusCode,
        /// Response body, preserved for diagnostics.
        message: String,
    },

    /// Authentication failed and a token refresh could not repair it (HTTP 401).
    #[display("Authentication failed: {method} {url} returned {status}: {message}")]
    AuthenticationFailed {
        /// HTTP method of the failed request.
        method: Method,
        /// Full URL of the failed request.
        url: String,
        /// Status code returned by the server.
        status: StatusCode,
        /// Response body, preserved for diagnostics.
        message: String,
    },

    /// The credentials are valid but not permitted to access the resource (HTTP 403).
    #[display("Authorization failed: {method} {url} returned {status}: {message}")]
    AuthorizationFailed {
        /// HTTP method of the failed request.
        method: Method,
        /// Full URL of the failed request.
        url: String,
        /// Status code returned by the server.
        status: StatusCode,
        /// Response body, preserved for diagnostics.
        message: String,
    },

    /// Any other failure: socket errors, unexpected statuses, unparseable bodies.
    #[display("Transport error: {method} {url}: {message}")]
    Transport {
        /// HTTP method of the failed request.
        method: Method,
        /// Full URL of the failed request.
        url: String,
        /// Status code, when a response was received.
        status: Option<StatusCode>,
        /// Description of the failure.
        message: String,
    },
}

impl ApiError {
    /// Builds the classified error for a non-success response.
    pub(crate) fn from_response(
        method: Method,
        url: String,
        status: StatusCode,
        message: String,
    ) -> Self {
        match ApiErrorKind::from_status(status) {
            ApiErrorKind::BadRequest => Self::BadRequest {
                method,
                url,
                status,
                message,
            },
            ApiErrorKind::AuthenticationFailed => Self::AuthenticationFailed {
                method,
                url,
                status,
                message,
            },
            ApiErrorKind::AuthorizationFailed => Self::AuthorizationFailed {
                method,
                url,
                status,
                message,
            },
            ApiErrorKind::Transport => Self::Transport {
                method,
                url,
                status: Some(status),
                message,
            },
        }
    }

    /// Builds a transport error for a failure without a usable response.
    pub(crate) fn transport(method: Method, url: String, message: impl Into<String>) -> Self {
        Self::Transport {
            method,
            url,
            status: None,
            message: message.into(),
        }
    }

    /// Returns the semantic kind of this error.
    pub fn kind(&self) -> ApiErrorKind {
        match self {
            Self::BadRequest { .. } => ApiErrorKind::BadRequest,
            Self::AuthenticationFailed { .. } => ApiErrorKind::AuthenticationFailed,
            Self::AuthorizationFailed { .. } => ApiErrorKind::AuthorizationFailed,
            Self::Transport { .. } => ApiErrorKind::Transport,
        }
    }

    /// Returns the HTTP status code, when a response was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::BadRequest { status, .. }
            | Self::AuthenticationFailed { status, .. }
            | Self::AuthorizationFailed { status, .. } => Some(*status),
            Self::Transport { status, .. } => *status,
        }
    }
}

/// Errors raised while constructing a [`WadifyClient`](crate::WadifyClient).
///
/// These only occur at build time; a successfully constructed client never
/// produces them.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Error, derive_more::Display)]
pub enum ConfigError {
    /// A required construction option was not provided.
    #[display("Missing required option: {name}")]
    MissingOption {
        /// Name of the missing option.
        name: &'static str,
    },

    /// The token provider identifier is not in the provider registry.
    #[display("Unknown token provider '{provider}' (known providers: filesystem, memory)")]
    UnknownTokenProvider {
        /// The unrecognized provider identifier.
        provider: String,
    },

    /// The configured base endpoint is not a valid URL.
    #[display("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl {
        /// The invalid URL.
        url: String,
        /// Description of why it failed to parse.
        reason: String,
    },
}
