// SPDX-FileCopyrightText: 2026 Outlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock reply generator for deterministic testing.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use outlet_core::types::{AdapterType, GeneratedReply, HealthStatus, ReplyRequest, RiskLevel};
use outlet_core::{OutletError, PluginAdapter, ReplyProvider};

/// A mock reply generator.
///
/// Replies are popped from a FIFO queue; an empty queue yields
/// "mock reply". Failure mode makes every call return a `Dependency` error.
pub struct MockReplyProvider {
    replies: Arc<Mutex<VecDeque<String>>>,
    requests: Arc<Mutex<Vec<ReplyRequest>>>,
    risk_level: Arc<Mutex<Option<RiskLevel>>>,
    failing: AtomicBool,
    delay: Mutex<Option<Duration>>,
    calls: AtomicUsize,
}

impl MockReplyProvider {
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            risk_level: Arc::new(Mutex::new(None)),
            failing: AtomicBool::new(false),
            delay: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_replies(replies: Vec<String>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::from(replies))),
            ..Self::new()
        }
    }

    pub async fn add_reply(&self, text: impl Into<String>) {
        self.replies.lock().await.push_back(text.into());
    }

    /// Make every subsequent call fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Risk level reported alongside every reply.
    pub async fn set_risk_level(&self, level: Option<RiskLevel>) {
        *self.risk_level.lock().await = level;
    }

    /// Sleep this long before answering.
    pub async fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock().await = delay;
    }

    /// Number of `generate` calls so far, failed ones included.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Requests received so far.
    pub async fn requests(&self) -> Vec<ReplyRequest> {
        self.requests.lock().await.clone()
    }
}

impl Default for MockReplyProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
struct InjectedFailure;

impl std::fmt::Display for InjectedFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("injected reply failure")
    }
}

impl std::error::Error for InjectedFailure {}

#[async_trait]
impl PluginAdapter for MockReplyProvider {
    fn name(&self) -> &str {
        "mock-reply"
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
impl ReplyProvider for MockReplyProvider {
    async fn generate(&self, request: ReplyRequest) -> Result<GeneratedReply, OutletError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().await.push(request);

        let delay = *self.delay.lock().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(OutletError::dependency("mock-reply", InjectedFailure));
        }

        let reply = self
            .replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| "mock reply".to_string());
        Ok(GeneratedReply {
            reply,
            risk_level: *self.risk_level.lock().await,
        })
    }
}

#[cfg(test)]
mod tests {
    use outlet_core::types::Visibility;

    use super::*;

    fn request() -> ReplyRequest {
        ReplyRequest {
            text: "hello".into(),
            category: None,
            visibility: Visibility::Private,
        }
    }

    #[tokio::test]
    async fn queued_replies_then_default() {
        let provider = MockReplyProvider::with_replies(vec!["first".into()]);
        assert_eq!(provider.generate(request()).await.unwrap().reply, "first");
        assert_eq!(provider.generate(request()).await.unwrap().reply, "mock reply");
        assert_eq!(provider.call_count(), 2);
        assert_eq!(provider.requests().await.len(), 2);
    }

    #[tokio::test]
    async fn failure_mode_returns_dependency_error() {
        let provider = MockReplyProvider::new();
        provider.set_failing(true);
        let err = provider.generate(request()).await.unwrap_err();
        assert!(matches!(err, OutletError::Dependency { .. }));
        provider.set_failing(false);
        assert!(provider.generate(request()).await.is_ok());
    }

    #[tokio::test]
    async fn reports_configured_risk() {
        let provider = MockReplyProvider::new();
        provider.set_risk_level(Some(2)).await;
        assert_eq!(provider.generate(request()).await.unwrap().risk_level, Some(2));
    }
}
