//! Identity-provider client interface.
//!
//! The SAML protocol, signature validation and the SP session are owned by an
//! external service provider (SimpleSAMLphp or equivalent). The flow only
//! consumes this narrow interface.

use async_trait::async_trait;
use axum::http::HeaderMap;
use url::Url;

use super::assertion::AttributeMap;
use crate::settings::ServiceIdentifier;

/// Per-request context handed to the client.
#[derive(Debug, Clone, Copy)]
pub struct IdpRequest<'a> {
    /// Which SP service (authentication source) to use.
    pub service: ServiceIdentifier,
    /// Headers of the incoming browser request.
    pub headers: &'a HeaderMap,
}

impl<'a> IdpRequest<'a> {
    #[must_use]
    pub fn new(service: ServiceIdentifier, headers: &'a HeaderMap) -> Self {
        Self { service, headers }
    }
}

/// Result of [`IdentityProviderClient::require_auth`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthRequirement {
    /// The browser holds an SP session; attributes are available.
    Authenticated,
    /// The browser must be sent to the identity provider first. It comes back
    /// to the `return_to` URL afterwards.
    Redirect(Url),
}

/// Errors talking to the identity-provider client.
#[derive(Debug, thiserror::Error)]
pub enum IdpError {
    /// The SP is misconfigured or unreachable.
    #[error("Identity provider unavailable: {0}")]
    Unavailable(String),

    /// The SP released malformed attribute data.
    #[error("Malformed attributes: {0}")]
    MalformedAttributes(String),

    /// Failed to build an SP URL.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

/// Type alias for client results.
pub type IdpResult<T> = Result<T, IdpError>;

/// The external identity-provider client.
#[async_trait]
pub trait IdentityProviderClient: Send + Sync {
    /// Returns `true` if the browser holds an SP session.
    async fn is_authenticated(&self, request: IdpRequest<'_>) -> IdpResult<bool>;

    /// Ensures the browser is authenticated, or tells the caller where to
    /// send it.
    async fn require_auth(&self, request: IdpRequest<'_>, return_to: &Url)
    -> IdpResult<AuthRequirement>;

    /// Released attributes of the authenticated person.
    async fn attributes(&self, request: IdpRequest<'_>) -> IdpResult<AttributeMap>;

    /// URL ending the SP session, which then returns to `return_to`.
    async fn logout(&self, request: IdpRequest<'_>, return_to: &Url) -> IdpResult<Url>;
}
