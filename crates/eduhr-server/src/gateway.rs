//! SimpleSAMLphp gateway client.
//!
//! The SP runs next to this server behind a trusted fronting proxy. Browsers
//! are sent to its `as_login.php` / `as_logout.php` endpoints; once the SP
//! holds a session, the proxy injects the released attributes as request
//! headers (`{prefix}{attribute}`, multiple values separated by `;`).
//!
//! With a proxy secret configured, attribute headers are ignored unless the
//! request also carries the secret, so a browser talking to this server
//! directly cannot claim an identity.

use async_trait::async_trait;
use axum::http::HeaderMap;
use eduhr_auth::federation::attributes;
use eduhr_auth::federation::idp::IdpResult;
use eduhr_auth::{AttributeMap, AuthRequirement, IdentityProviderClient, IdpError, IdpRequest};
use tracing::{debug, warn};
use url::Url;

use crate::config::GatewayConfig;

const LOGIN_ENDPOINT: &str = "as_login.php";
const LOGOUT_ENDPOINT: &str = "as_logout.php";
const VALUE_SEPARATOR: char = ';';

/// Identity-provider client backed by SimpleSAMLphp endpoints and proxy
/// headers.
#[derive(Debug, Clone)]
pub struct SspGatewayClient {
    base_url: Url,
    header_prefix: String,
    proxy_secret: Option<(String, String)>,
}

impl SspGatewayClient {
    /// Creates a client for the SP at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not a valid URL.
    pub fn new(base_url: &str, header_prefix: &str) -> Result<Self, IdpError> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            base_url,
            header_prefix: header_prefix.to_ascii_lowercase(),
            proxy_secret: None,
        })
    }

    /// Only reads attribute headers from requests whose `header` equals
    /// `secret`.
    #[must_use]
    pub fn with_proxy_secret(mut self, header: &str, secret: impl Into<String>) -> Self {
        self.proxy_secret = Some((header.to_ascii_lowercase(), secret.into()));
        self
    }

    /// Creates a client from the gateway configuration section.
    pub fn from_config(cfg: &GatewayConfig) -> Result<Self, IdpError> {
        let client = Self::new(&cfg.base_url, &cfg.attribute_header_prefix)?;
        match &cfg.proxy_secret {
            Some(secret) => Ok(client.with_proxy_secret(&cfg.proxy_secret_header, secret.clone())),
            None => {
                warn!(
                    prefix = %cfg.attribute_header_prefix,
                    "No gateway.proxy_secret set; attribute headers are trusted as received"
                );
                Ok(client)
            }
        }
    }

    fn is_from_proxy(&self, headers: &HeaderMap) -> bool {
        let Some((header, secret)) = &self.proxy_secret else {
            return true;
        };
        let presented = headers
            .get(header.as_str())
            .is_some_and(|value| value.as_bytes() == secret.as_bytes());
        if !presented {
            debug!(header = %header, "Request did not pass through the proxy, ignoring attributes");
        }
        presented
    }

    fn header_name(&self, attribute: &str) -> String {
        format!("{}{}", self.header_prefix, attribute.to_ascii_lowercase())
    }

    fn values(&self, headers: &HeaderMap, attribute: &str) -> Vec<String> {
        if !self.is_from_proxy(headers) {
            return Vec::new();
        }
        headers
            .get_all(self.header_name(attribute).as_str())
            .iter()
            .flat_map(|value| {
                String::from_utf8_lossy(value.as_bytes())
                    .split(VALUE_SEPARATOR)
                    .map(|v| v.trim().to_string())
                    .collect::<Vec<_>>()
            })
            .filter(|v| !v.is_empty())
            .collect()
    }

    fn endpoint(&self, endpoint: &str, request: IdpRequest<'_>, return_to: &Url) -> IdpResult<Url> {
        let mut url = self.base_url.join(endpoint)?;
        url.query_pairs_mut()
            .append_pair("AuthId", request.service.as_str())
            .append_pair("ReturnTo", return_to.as_str());
        Ok(url)
    }
}

#[async_trait]
impl IdentityProviderClient for SspGatewayClient {
    async fn is_authenticated(&self, request: IdpRequest<'_>) -> IdpResult<bool> {
        Ok(!self.values(request.headers, attributes::UNIQUE_ID).is_empty())
    }

    async fn require_auth(
        &self,
        request: IdpRequest<'_>,
        return_to: &Url,
    ) -> IdpResult<AuthRequirement> {
        if self.is_authenticated(request).await? {
            return Ok(AuthRequirement::Authenticated);
        }
        let url = self.endpoint(LOGIN_ENDPOINT, request, return_to)?;
        debug!(service = %request.service.as_str(), "No SP session, redirecting to identity provider");
        Ok(AuthRequirement::Redirect(url))
    }

    async fn attributes(&self, request: IdpRequest<'_>) -> IdpResult<AttributeMap> {
        Ok(attributes::KNOWN
            .iter()
            .filter_map(|name| {
                let values = self.values(request.headers, name);
                (!values.is_empty()).then(|| ((*name).to_string(), values))
            })
            .collect())
    }

    async fn logout(&self, request: IdpRequest<'_>, return_to: &Url) -> IdpResult<Url> {
        self.endpoint(LOGOUT_ENDPOINT, request, return_to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use eduhr_auth::ServiceIdentifier;

    fn client() -> SspGatewayClient {
        SspGatewayClient::new("https://site.hr/simplesaml/module.php/core", "X-SAML-").unwrap()
    }

    fn headers(entries: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in entries {
            map.append(
                axum::http::HeaderName::try_from(*name).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    #[test]
    fn test_reads_released_attributes() {
        let headers = headers(&[
            ("x-saml-hredupersonuniqueid", "alice@uni.hr"),
            ("x-saml-mail", "alice@dept.uni.hr; alice@uni.hr"),
            ("x-saml-givenname", "Alice"),
            ("x-saml-unrelated", "ignored"),
        ]);
        let request = IdpRequest::new(ServiceIdentifier::DefaultSp, &headers);

        let attrs = tokio_test::block_on(client().attributes(request)).unwrap();
        assert_eq!(attrs.len(), 3);
        assert_eq!(attrs[attributes::UNIQUE_ID], vec!["alice@uni.hr"]);
        assert_eq!(attrs[attributes::MAIL], vec!["alice@dept.uni.hr", "alice@uni.hr"]);
        assert!(tokio_test::block_on(client().is_authenticated(request)).unwrap());
    }

    #[test]
    fn test_require_auth_redirects_without_session() {
        let headers = HeaderMap::new();
        let request = IdpRequest::new(ServiceIdentifier::FedlabSp, &headers);
        let return_to = Url::parse("https://site.hr/login").unwrap();

        let requirement =
            tokio_test::block_on(client().require_auth(request, &return_to)).unwrap();
        let AuthRequirement::Redirect(url) = requirement else {
            panic!("expected redirect");
        };
        assert_eq!(url.path(), "/simplesaml/module.php/core/as_login.php");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("AuthId".to_string(), "fedlab-sp".to_string()),
                ("ReturnTo".to_string(), "https://site.hr/login".to_string()),
            ]
        );
    }

    #[test]
    fn test_proxy_secret_gates_attribute_headers() {
        let client = client().with_proxy_secret("X-Eduhr-Proxy-Secret", "s3cret");

        let forged = headers(&[("x-saml-hredupersonuniqueid", "admin")]);
        let request = IdpRequest::new(ServiceIdentifier::DefaultSp, &forged);
        assert!(!tokio_test::block_on(client.is_authenticated(request)).unwrap());
        assert!(tokio_test::block_on(client.attributes(request)).unwrap().is_empty());

        let wrong = headers(&[
            ("x-saml-hredupersonuniqueid", "admin"),
            ("x-eduhr-proxy-secret", "guess"),
        ]);
        let request = IdpRequest::new(ServiceIdentifier::DefaultSp, &wrong);
        assert!(!tokio_test::block_on(client.is_authenticated(request)).unwrap());

        let proxied = headers(&[
            ("x-saml-hredupersonuniqueid", "alice@uni.hr"),
            ("x-eduhr-proxy-secret", "s3cret"),
        ]);
        let request = IdpRequest::new(ServiceIdentifier::DefaultSp, &proxied);
        assert!(tokio_test::block_on(client.is_authenticated(request)).unwrap());
        let attrs = tokio_test::block_on(client.attributes(request)).unwrap();
        assert_eq!(attrs[attributes::UNIQUE_ID], vec!["alice@uni.hr"]);
    }

    #[test]
    fn test_from_config_applies_proxy_secret() {
        let cfg = GatewayConfig {
            proxy_secret: Some("s3cret".to_string()),
            ..GatewayConfig::default()
        };
        let client = SspGatewayClient::from_config(&cfg).unwrap();

        let forged = headers(&[("x-saml-hredupersonuniqueid", "admin")]);
        let request = IdpRequest::new(ServiceIdentifier::DefaultSp, &forged);
        assert!(!tokio_test::block_on(client.is_authenticated(request)).unwrap());
    }

    #[test]
    fn test_logout_url() {
        let headers = headers(&[("x-saml-hredupersonuniqueid", "alice@uni.hr")]);
        let request = IdpRequest::new(ServiceIdentifier::DefaultSp, &headers);
        let return_to = Url::parse("https://site.hr/?code=logout").unwrap();

        let url = tokio_test::block_on(client().logout(request, &return_to)).unwrap();
        assert!(url.as_str().starts_with(
            "https://site.hr/simplesaml/module.php/core/as_logout.php?AuthId=default-sp&ReturnTo="
        ));
    }
}
