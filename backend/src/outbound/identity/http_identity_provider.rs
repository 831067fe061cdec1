//! Reqwest-backed identity provider adapter.
//!
//! Resolves a bearer token with `GET {base}/auth/v1/user`, forwarding the
//! caller's token alongside the project API key. Transport details stay here:
//! timeouts, status mapping and JSON decoding into identity claims.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use zeroize::Zeroizing;

use super::dto::AuthUserDto;
use crate::domain::BearerToken;
use crate::domain::ports::{IdentityClaims, IdentityProvider, IdentityProviderError};

const USER_PATH: &str = "auth/v1/user";
const API_KEY_HEADER: &str = "apikey";

/// Errors raised while building the adapter.
#[derive(Debug, thiserror::Error)]
pub enum HttpIdentityProviderBuildError {
    /// The reqwest client could not be constructed.
    #[error("failed to build identity client: {0}")]
    Client(#[from] reqwest::Error),
    /// The base URL cannot be extended with the user path.
    #[error("invalid identity provider URL: {0}")]
    Endpoint(#[from] url::ParseError),
}

/// Identity provider adapter that calls the hosted auth service.
pub struct HttpIdentityProvider {
    client: Client,
    endpoint: Url,
    api_key: Zeroizing<String>,
}

impl HttpIdentityProvider {
    /// Build an adapter for the auth service rooted at `base_url`.
    ///
    /// ```rust,ignore
    /// let provider = HttpIdentityProvider::new(base_url, api_key, Duration::from_secs(5))?;
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed or the
    /// user endpoint cannot be derived from `base_url`.
    pub fn new(
        base_url: Url,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, HttpIdentityProviderBuildError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: user_endpoint(base_url)?,
            api_key: Zeroizing::new(api_key.into()),
        })
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn resolve(&self, token: &BearerToken) -> Result<IdentityClaims, IdentityProviderError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .bearer_auth(token.expose())
            .header(API_KEY_HEADER, self.api_key.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        parse_claims(body.as_ref())
    }
}

fn user_endpoint(mut base_url: Url) -> Result<Url, url::ParseError> {
    if !base_url.path().ends_with('/') {
        let path = format!("{}/", base_url.path());
        base_url.set_path(&path);
    }
    base_url.join(USER_PATH)
}

fn parse_claims(body: &[u8]) -> Result<IdentityClaims, IdentityProviderError> {
    let decoded: AuthUserDto = serde_json::from_slice(body).map_err(|error| {
        IdentityProviderError::decode(format!("invalid user payload: {error}"))
    })?;
    if decoded.id.trim().is_empty() {
        return Err(IdentityProviderError::decode("user payload has an empty id"));
    }
    Ok(decoded.into_claims())
}

fn map_transport_error(error: reqwest::Error) -> IdentityProviderError {
    if error.is_timeout() {
        IdentityProviderError::connection(format!("request timed out: {error}"))
    } else {
        IdentityProviderError::connection(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> IdentityProviderError {
    let preview = body_preview(body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            IdentityProviderError::rejected(if preview.is_empty() {
                format!("status {}", status.as_u16())
            } else {
                preview
            })
        }
        _ => IdentityProviderError::upstream(status.as_u16(), preview),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 120;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        let preview: String = compact.chars().take(PREVIEW_CHAR_LIMIT).collect();
        format!("{preview}...")
    } else {
        compact
    }
}

#[cfg(test)]
mod tests {
    //! Coverage for the non-network mapping helpers.

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::bare("https://auth.example.test", "https://auth.example.test/auth/v1/user")]
    #[case::trailing_slash("https://auth.example.test/", "https://auth.example.test/auth/v1/user")]
    #[case::prefixed("https://gw.example.test/id", "https://gw.example.test/id/auth/v1/user")]
    fn derives_user_endpoint(#[case] base: &str, #[case] expected: &str) {
        let base = Url::parse(base).expect("valid base");
        let endpoint = user_endpoint(base).expect("endpoint derives");
        assert_eq!(endpoint.as_str(), expected);
    }

    #[rstest]
    fn parses_user_payload_into_claims() {
        let body = br#"{
            "id": "3fa85f64-5717-4562-b3fc-2c963f66afa6",
            "email": "sam@example.com",
            "app_metadata": { "role": "barber", "provider": "email" },
            "user_metadata": { "name": "Sam Cutter" }
        }"#;

        let claims = parse_claims(body).expect("payload decodes");

        assert_eq!(claims.user_id, "3fa85f64-5717-4562-b3fc-2c963f66afa6");
        assert_eq!(claims.email.as_deref(), Some("sam@example.com"));
        assert_eq!(claims.role.as_deref(), Some("barber"));
        assert_eq!(claims.name.as_deref(), Some("Sam Cutter"));
    }

    #[rstest]
    fn missing_metadata_leaves_claims_unset() {
        let claims = parse_claims(br#"{"id":"abc"}"#).expect("payload decodes");
        assert_eq!(claims.role, None);
        assert_eq!(claims.name, None);
        assert_eq!(claims.email, None);
    }

    #[rstest]
    #[case::not_json(b"<html>".as_slice())]
    #[case::blank_id(br#"{"id":"  "}"#.as_slice())]
    fn malformed_payloads_are_decode_errors(#[case] body: &[u8]) {
        let error = parse_claims(body).expect_err("decode fails");
        assert!(matches!(error, IdentityProviderError::Decode { .. }));
    }

    #[rstest]
    #[case::unauthorised(StatusCode::UNAUTHORIZED, true)]
    #[case::forbidden(StatusCode::FORBIDDEN, true)]
    #[case::server_error(StatusCode::INTERNAL_SERVER_ERROR, false)]
    #[case::bad_gateway(StatusCode::BAD_GATEWAY, false)]
    fn maps_statuses(#[case] status: StatusCode, #[case] rejected: bool) {
        let error = map_status_error(status, br#"{"msg":"invalid JWT"}"#);
        if rejected {
            assert!(matches!(error, IdentityProviderError::Rejected { .. }));
        } else {
            assert!(
                matches!(error, IdentityProviderError::Upstream { status: code, .. } if code == status.as_u16())
            );
        }
    }

    #[rstest]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(500);
        let preview = body_preview(body.as_bytes());
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), 123);
    }
}
