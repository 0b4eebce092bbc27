//! API client for the workload template endpoint

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize};
use template_lib::{PreloadedTemplate, TemplateResponse};
use tracing::debug;
use url::Url;

/// Path of the template catalog endpoint, relative to the API base URL
pub const TEMPLATES_PATH: &str = "api/workload-templates";

/// API client for the workload driver backend
pub struct ApiClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid API URL")?;

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;
        debug!(url = %url, "Sending request");

        let mut request = self.client.get(url).query(query);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            anyhow::bail!("API error ({}): {}", status, message);
        }

        response.json().await.context("Failed to parse response")
    }

    /// List the preloaded templates the backend knows about
    pub async fn list_templates(&self) -> Result<Vec<PreloadedTemplate>> {
        self.get(TEMPLATES_PATH, &[]).await
    }

    /// Fetch one template by key
    pub async fn fetch_template(&self, key: &str) -> Result<TemplateResponse> {
        self.get(TEMPLATES_PATH, &[("template", key)])
            .await
            .with_context(|| format!("Failed to fetch template '{}'", key))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const CATALOG_JSON: &str = r#"[
        {"display_name": "Small Demo", "key": "small", "filepath": "small.json",
         "num_sessions": 1, "num_training_events": 1, "large": false},
        {"display_name": "Production Trace", "key": "trace", "filepath": "/srv/trace.json",
         "num_sessions": 4000, "num_training_events": 120000, "large": true}
    ]"#;

    #[tokio::test]
    async fn test_list_templates() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/workload-templates")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(CATALOG_JSON)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url(), None).unwrap();
        let templates = client.list_templates().await.unwrap();

        mock.assert_async().await;
        assert_eq!(templates.len(), 2);
        assert!(templates[1].large);
    }

    #[tokio::test]
    async fn test_fetch_template_sends_key_and_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/workload-templates")
            .match_query(Matcher::UrlEncoded("template".into(), "trace".into()))
            .match_header("authorization", "Bearer secret")
            .with_status(200)
            .with_body(
                r#"{"preloaded_template": {"display_name": "Production Trace", "key": "trace",
                    "filepath": "/srv/trace.json", "num_sessions": 4000,
                    "num_training_events": 120000, "large": true}}"#,
            )
            .create_async()
            .await;

        let client = ApiClient::new(&server.url(), Some("secret".to_string())).unwrap();
        let response = client.fetch_template("trace").await.unwrap();

        mock.assert_async().await;
        assert!(matches!(
            response,
            TemplateResponse::PreloadedTemplate(t) if t.filepath == "/srv/trace.json"
        ));
    }

    #[tokio::test]
    async fn test_fetch_unknown_template_reports_backend_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/workload-templates")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(r#"{"error": "invalid workload template specified: \"nope\""}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url(), None).unwrap();
        let err = client.fetch_template("nope").await.unwrap_err();

        let message = format!("{:#}", err);
        assert!(message.contains("400"), "{}", message);
        assert!(message.contains("invalid workload template"), "{}", message);
    }
}
