//! Client-credential authentication against the Port API.

use crate::error::{PortClientError, Result};
use crate::types::{AccessTokenRequest, AccessTokenResponse, Credentials};
use reqwest::Client;
use tracing::{debug, info, warn};

/// Authentication client for the Port API.
pub struct AuthClient<'a> {
    http: &'a Client,
    base_url: &'a str,
}

impl<'a> AuthClient<'a> {
    pub(crate) fn new(http: &'a Client, base_url: &'a str) -> Self {
        Self { http, base_url }
    }

    /// Exchange client credentials for a bearer token.
    pub async fn request_access_token(&self, credentials: &Credentials) -> Result<String> {
        let url = format!("{}/v1/auth/access_token", self.base_url);
        debug!(url = %url, client = %credentials.hint(), "Requesting access token");

        let request = AccessTokenRequest {
            client_id: &credentials.client_id,
            client_secret: &credentials.client_secret,
        };

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(PortClientError::from_send)?;

        let status = response.status();

        if status.is_success() {
            let body: AccessTokenResponse = response.json().await.map_err(|e| {
                PortClientError::ParseError(format!("Failed to parse token response: {}", e))
            })?;

            let expires_in = body.expires_in;
            let token = body.into_token().ok_or_else(|| {
                PortClientError::ParseError("Token response did not contain an access token".into())
            })?;

            info!(
                client = %credentials.hint(),
                expires_in = ?expires_in,
                "Authenticated with Port"
            );

            Ok(token)
        } else if status.as_u16() == 401 {
            let error_text = response.text().await.unwrap_or_default();
            warn!(
                status = %status,
                client = %credentials.hint(),
                error = %error_text,
                "Authentication failed: invalid credentials"
            );
            Err(PortClientError::AuthFailed(format!(
                "Please verify PORT_CLIENT_ID ({}) and PORT_CLIENT_SECRET. Response: {}",
                credentials.hint(),
                error_text
            )))
        } else {
            let error_text = response.text().await.unwrap_or_default();
            warn!(
                status = %status,
                client = %credentials.hint(),
                error = %error_text,
                "Authentication request rejected"
            );
            Err(PortClientError::ServerError {
                status: status.as_u16(),
                message: error_text,
            })
        }
    }
}
