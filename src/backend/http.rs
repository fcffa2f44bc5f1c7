//! `reqwest`-backed implementation of [`BackendApi`].

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, warn};

use super::{BackendApi, LoginEnvelope, endpoints};
use crate::config::ClientConfig;
use crate::dashboard::model::{Event, NewEvent};
use crate::error::BackendError;

/// HTTP client for the ticketing backend.
pub struct HttpBackend {
    base_url: String,
    client: Client,
    token: Option<SecretString>,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| BackendError::RequestFailed {
                endpoint: config.backend_url.clone(),
                reason: format!("Failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            base_url: config.backend_url.trim_end_matches('/').to_string(),
            client,
            token: None,
        })
    }

    /// Send `token` as a bearer credential on every request.
    pub fn with_token(mut self, token: Option<SecretString>) -> Self {
        self.token = token;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    async fn send(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> Result<Response, BackendError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| BackendError::RequestFailed {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(endpoint, %status, "Backend returned error status");
            return Err(BackendError::Status {
                endpoint: endpoint.to_string(),
                status,
                body,
            });
        }
        debug!(endpoint, %status, "Backend request ok");
        Ok(response)
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<Response, BackendError> {
        let request = self.client.post(self.url(endpoint)).json(body);
        self.send(endpoint, request).await
    }

    async fn decode<T: DeserializeOwned>(
        endpoint: &str,
        response: Response,
    ) -> Result<T, BackendError> {
        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::InvalidResponse {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })
    }

    /// Decode a list that the backend may send as `null`.
    async fn decode_list(endpoint: &str, response: Response) -> Result<Vec<Event>, BackendError> {
        let events: Option<Vec<Event>> = Self::decode(endpoint, response).await?;
        Ok(events.unwrap_or_default())
    }
}

#[async_trait]
impl BackendApi for HttpBackend {
    async fn wallet_login(&self, address: &str) -> Result<SecretString, BackendError> {
        let response = self
            .post(endpoints::WALLET_LOGIN, &json!({ "address": address }))
            .await?;
        let envelope: LoginEnvelope = Self::decode(endpoints::WALLET_LOGIN, response).await?;
        Ok(SecretString::from(envelope.data.token))
    }

    async fn submit_email(&self, email: &str) -> Result<(), BackendError> {
        self.post(endpoints::EMAIL, &json!({ "email": email })).await?;
        Ok(())
    }

    async fn submit_name(&self, name: &str) -> Result<(), BackendError> {
        self.post(endpoints::NAME, &json!({ "name": name })).await?;
        Ok(())
    }

    async fn verify_otp(&self, otp: &str) -> Result<(), BackendError> {
        self.post(endpoints::VERIFY, &json!({ "otp": otp })).await?;
        Ok(())
    }

    async fn list_events(&self) -> Result<Vec<Event>, BackendError> {
        let request = self.client.get(self.url(endpoints::EVENTS));
        let response = self.send(endpoints::EVENTS, request).await?;
        Self::decode_list(endpoints::EVENTS, response).await
    }

    async fn joined_events(&self, address: &str) -> Result<Vec<Event>, BackendError> {
        let request = self
            .client
            .get(self.url(endpoints::MY_TICKETS))
            .query(&[("address", address)]);
        let response = self.send(endpoints::MY_TICKETS, request).await?;
        Self::decode_list(endpoints::MY_TICKETS, response).await
    }

    async fn create_event(&self, event: &NewEvent) -> Result<Event, BackendError> {
        let response = self.post(endpoints::EVENTS, event).await?;
        Self::decode(endpoints::EVENTS, response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_base_and_path() {
        let config = ClientConfig {
            backend_url: "http://localhost:3000/".to_string(),
            ..ClientConfig::default()
        };
        let backend = HttpBackend::new(&config).unwrap();
        assert_eq!(backend.base_url(), "http://localhost:3000");
        assert_eq!(
            backend.url(endpoints::WALLET_LOGIN),
            "http://localhost:3000/api/wallet/login"
        );
    }
}
