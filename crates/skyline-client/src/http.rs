//! HTTP client for the inventory service

use std::time::Duration;

use reqwest::header::HeaderValue;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use skyline_api::UpdateRecord;
use skyline_api::responses::HealthResponse;

use crate::error::{ClientError, Result};

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const UPDATES_PATH: &str = "updates";

/// HTTP client authenticated as one host
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: Url,
    host_token: String,
}

impl HttpClient {
    /// Create a new HTTP client with the default timeout
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the token is not a
    /// valid header value.
    ///
    /// # Example
    /// ```no_run
    /// use skyline_client::HttpClient;
    ///
    /// let client = HttpClient::new("http://localhost:8080/api/", "token")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(base_url: impl AsRef<str>, host_token: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Self::with_client(base_url, host_token, client)
    }

    /// Create a new HTTP client with custom `reqwest::Client`
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the token is not a
    /// valid header value.
    pub fn with_client(
        base_url: impl AsRef<str>,
        host_token: impl Into<String>,
        client: Client,
    ) -> Result<Self> {
        let base_url = normalize_base_url(base_url.as_ref())?;
        let host_token = host_token.into();
        HeaderValue::from_str(&format!("Bearer {host_token}"))
            .map_err(|_| ClientError::InvalidToken)?;

        Ok(Self {
            client,
            base_url,
            host_token,
        })
    }

    /// Create a client whose requests give up after `timeout`
    ///
    /// # Errors
    /// Same as [`HttpClient::new`].
    pub fn with_timeout(
        base_url: impl AsRef<str>,
        host_token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Self::with_client(base_url, host_token, client)
    }

    /// Base URL every endpoint is resolved against
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build a full URL from a path relative to the base URL
    fn url(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).map_err(ClientError::Url)
    }

    /// URL addressing a single update by package name
    ///
    /// An empty name would resolve to the collection itself and is rejected.
    fn update_url(&self, package_name: &str) -> Result<Url> {
        if package_name.is_empty() {
            return Err(ClientError::InvalidPackageName(package_name.to_string()));
        }
        let mut url = self.url(UPDATES_PATH)?;
        url.path_segments_mut()
            .map_err(|()| ClientError::UnsupportedBaseUrl(self.base_url.to_string()))?
            .push(package_name);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(&self.host_token)
    }

    /// Turn a non-2xx response into `ClientError::Api`
    async fn check(response: Response) -> Result<Response> {
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Api { status, message });
        }

        Ok(response)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self.authorized(self.client.get(url)).send().await?;
        let response = Self::check(response).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Get inventory service health status
    ///
    /// # Errors
    /// Returns an error if the request fails or the service returns an error.
    pub async fn health(&self) -> Result<HealthResponse> {
        self.get(self.url("health")?).await
    }

    /// Create or refresh the update record for a package
    ///
    /// # Errors
    /// Returns an error if the request fails or the service returns an error.
    #[instrument(skip(self, update), fields(package = %update.package_name))]
    pub async fn create_update(&self, update: &UpdateRecord) -> Result<()> {
        let url = self.url(UPDATES_PATH)?;
        let response = self
            .authorized(self.client.post(url))
            .json(update)
            .send()
            .await?;
        Self::check(response).await?;

        debug!("update posted");
        Ok(())
    }

    /// List every update record the service holds for this host
    ///
    /// # Errors
    /// Returns an error if the request fails, the service returns an error,
    /// or the body is not a list of update records.
    #[instrument(skip(self))]
    pub async fn list_updates(&self) -> Result<Vec<UpdateRecord>> {
        let updates: Vec<UpdateRecord> = self.get(self.url(UPDATES_PATH)?).await?;
        debug!(count = updates.len(), "listed remote updates");
        Ok(updates)
    }

    /// Delete the update record for a package
    ///
    /// # Errors
    /// Returns an error if the request fails or the service returns an error.
    #[instrument(skip(self, update), fields(package = %update.package_name))]
    pub async fn delete_update(&self, update: &UpdateRecord) -> Result<()> {
        let url = self.update_url(&update.package_name)?;
        let response = self.authorized(self.client.delete(url)).send().await?;
        Self::check(response).await?;

        debug!("update deleted");
        Ok(())
    }
}

/// Parse a base URL and make sure relative joins keep its path
fn normalize_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw)?;
    if url.cannot_be_a_base() {
        return Err(ClientError::UnsupportedBaseUrl(raw.to_string()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client_for(server: &MockServer) -> HttpClient {
        HttpClient::new(format!("{}/api", server.uri()), "secret-token").unwrap()
    }

    #[test]
    fn test_client_creation() {
        assert!(HttpClient::new("http://localhost:8080", "t").is_ok());
    }

    #[test]
    fn test_invalid_url() {
        assert!(matches!(
            HttpClient::new("not a url", "t"),
            Err(ClientError::Url(_))
        ));
        assert!(matches!(
            HttpClient::new("mailto:ops@example.com", "t"),
            Err(ClientError::UnsupportedBaseUrl(_))
        ));
    }

    #[test]
    fn test_invalid_token() {
        let result = HttpClient::new("http://localhost:8080", "bad\ntoken");
        assert!(matches!(result, Err(ClientError::InvalidToken)));
    }

    #[test]
    fn test_url_building_keeps_base_path() {
        let client = HttpClient::new("http://localhost:8080/api/v1", "t").unwrap();

        assert_eq!(client.base_url().as_str(), "http://localhost:8080/api/v1/");
        assert_eq!(
            client.url(UPDATES_PATH).unwrap().as_str(),
            "http://localhost:8080/api/v1/updates"
        );
    }

    #[test]
    fn test_update_url_encodes_package_name() {
        let client = HttpClient::new("http://localhost:8080/", "t").unwrap();

        assert_eq!(
            client.update_url("libstdc++6").unwrap().as_str(),
            "http://localhost:8080/updates/libstdc++6"
        );
        assert_eq!(
            client.update_url("weird/name").unwrap().as_str(),
            "http://localhost:8080/updates/weird%2Fname"
        );
    }

    #[test]
    fn test_update_url_rejects_empty_name() {
        let client = HttpClient::new("http://localhost:8080/api", "t").unwrap();

        assert!(matches!(
            client.update_url(""),
            Err(ClientError::InvalidPackageName(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_with_empty_name_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(204))
            .expect(0)
            .mount(&server)
            .await;

        let update = UpdateRecord::new("", "1.0", "1.1", "focal [amd64]");
        let err = client_for(&server).delete_update(&update).await.unwrap_err();

        assert!(matches!(err, ClientError::InvalidPackageName(_)));
    }

    #[tokio::test]
    async fn test_create_update() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/updates"))
            .and(header("authorization", "Bearer secret-token"))
            .and(body_json(json!({
                "packageName": "libfoo",
                "currentVersion": "1.0",
                "newVersion": "1.1",
                "repository": "focal-security [amd64]",
                "security": true
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let update = UpdateRecord::new("libfoo", "1.0", "1.1", "focal-security [amd64]");
        client_for(&server).create_update(&update).await.unwrap();
    }

    #[tokio::test]
    async fn test_list_updates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/updates"))
            .and(header("authorization", "Bearer secret-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "packageName": "vim", "currentVersion": "8.1", "newVersion": "8.2",
                 "repository": "focal-updates", "security": false},
                {"id": 2, "packageName": "openssl", "newVersion": "1.1.1g",
                 "repository": "focal-security", "security": true}
            ])))
            .mount(&server)
            .await;

        let updates = client_for(&server).list_updates().await.unwrap();

        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].package_name, "vim");
        assert_eq!(updates[1].package_name, "openssl");
        assert!(updates[1].is_security);
    }

    #[tokio::test]
    async fn test_list_updates_invalid_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/updates"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).list_updates().await.unwrap_err();
        assert!(matches!(err, ClientError::Json(_)));
    }

    #[tokio::test]
    async fn test_delete_update() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/updates/vim"))
            .and(header("authorization", "Bearer secret-token"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let update = UpdateRecord::new("vim", "8.1", "8.2", "focal-updates");
        client_for(&server).delete_update(&update).await.unwrap();
    }

    #[tokio::test]
    async fn test_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/updates"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid host token"))
            .mount(&server)
            .await;

        let err = client_for(&server).list_updates().await.unwrap_err();

        match &err {
            ClientError::Api { status, message } => {
                assert_eq!(*status, 401);
                assert_eq!(message, "invalid host token");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_health() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .mount(&server)
            .await;

        let health = client_for(&server).health().await.unwrap();
        assert_eq!(health.status, "ok");
    }
}
