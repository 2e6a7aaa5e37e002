// SPDX-FileCopyrightText: 2026 Outlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for an external reply-generation service.
//!
//! Contract: `POST {endpoint}` with `{text, category, visibility}` and a JSON
//! answer `{reply, riskLevel?}`. Any transport error, non-2xx status, timeout,
//! undecodable body or empty reply is a `Dependency` error. There is no retry.

use std::time::Duration;

use async_trait::async_trait;
use outlet_config::model::ReplyConfig;
use outlet_core::types::{AdapterType, GeneratedReply, HealthStatus, ReplyRequest};
use outlet_core::{OutletError, PluginAdapter, ReplyProvider};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::debug;

const SERVICE: &str = "reply";

/// Reply provider backed by an HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpReplyProvider {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpReplyProvider {
    pub fn new(config: &ReplyConfig) -> Result<Self, OutletError> {
        let endpoint = config
            .endpoint
            .clone()
            .ok_or_else(|| OutletError::Config("reply.endpoint is not set".into()))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = &config.api_key {
            let mut value = HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| OutletError::Config(format!("invalid reply.api_key: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| OutletError::dependency(SERVICE, e))?;

        Ok(Self {
            client,
            endpoint,
            timeout,
        })
    }

    /// Overrides the endpoint (for testing with wiremock).
    #[cfg(test)]
    pub fn with_endpoint(mut self, url: String) -> Self {
        self.endpoint = url;
        self
    }
}

#[async_trait]
impl PluginAdapter for HttpReplyProvider {
    fn name(&self) -> &str {
        "http"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Reply
    }

    async fn health_check(&self) -> Result<HealthStatus, OutletError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), OutletError> {
        Ok(())
    }
}

#[async_trait]
impl ReplyProvider for HttpReplyProvider {
    async fn generate(&self, request: ReplyRequest) -> Result<GeneratedReply, OutletError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OutletError::Dependency {
                        service: SERVICE.into(),
                        message: format!("timed out after {:?}", self.timeout),
                        source: Some(Box::new(e)),
                    }
                } else {
                    OutletError::dependency(SERVICE, e)
                }
            })?;

        let status = response.status();
        debug!(status = %status, "reply service responded");
        if !status.is_success() {
            return Err(OutletError::Dependency {
                service: SERVICE.into(),
                message: format!("reply service returned {status}"),
                source: None,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| OutletError::dependency(SERVICE, e))?;
        let reply: GeneratedReply =
            serde_json::from_slice(&body).map_err(|e| OutletError::dependency(SERVICE, e))?;

        if reply.reply.trim().is_empty() {
            return Err(OutletError::Dependency {
                service: SERVICE.into(),
                message: "reply service returned an empty reply".into(),
                source: None,
            });
        }
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use outlet_core::ErrorKind;
    use outlet_core::types::Visibility;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn provider(server: &MockServer, api_key: Option<&str>) -> HttpReplyProvider {
        let config = ReplyConfig {
            endpoint: Some("http://unused.invalid/".into()),
            api_key: api_key.map(str::to_string),
            timeout_secs: 2,
        };
        HttpReplyProvider::new(&config)
            .unwrap()
            .with_endpoint(format!("{}/reply", server.uri()))
    }

    fn request() -> ReplyRequest {
        ReplyRequest {
            text: "I'm overwhelmed".into(),
            category: Some("workload".into()),
            visibility: Visibility::Private,
        }
    }

    #[tokio::test]
    async fn returns_reply_and_reported_risk() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/reply"))
            .and(header("authorization", "Bearer rk-1"))
            .and(body_json(serde_json::json!({
                "text": "I'm overwhelmed",
                "category": "workload",
                "visibility": "private"
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"reply": "That sounds hard.", "riskLevel": 0})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let reply = provider(&server, Some("rk-1")).generate(request()).await.unwrap();
        assert_eq!(reply.reply, "That sounds hard.");
        assert_eq!(reply.risk_level, Some(0));
    }

    #[tokio::test]
    async fn risk_level_may_be_omitted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/reply"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"reply": "ok"})))
            .mount(&server)
            .await;

        let reply = provider(&server, None).generate(request()).await.unwrap();
        assert_eq!(reply.risk_level, None);
    }

    #[tokio::test]
    async fn server_error_is_dependency_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/reply"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let err = provider(&server, None).generate(request()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DependencyError);
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn malformed_body_is_dependency_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/reply"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = provider(&server, None).generate(request()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DependencyError);
    }

    #[tokio::test]
    async fn empty_reply_is_dependency_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/reply"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"reply": "  "})))
            .mount(&server)
            .await;

        let err = provider(&server, None).generate(request()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DependencyError);
    }

    #[tokio::test]
    async fn slow_service_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/reply"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"reply": "late"}))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let err = provider(&server, None).generate(request()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DependencyError);
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn missing_endpoint_is_config_error() {
        let err = HttpReplyProvider::new(&ReplyConfig::default()).unwrap_err();
        assert!(matches!(err, OutletError::Config(_)));
    }
}
