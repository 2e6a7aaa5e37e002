// SPDX-FileCopyrightText: 2026 Outlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local reply generator with fixed supportive text.
//!
//! Reports the classifier's score as its risk level so a deployment without
//! a reply service still gets the same escalation behaviour.

use async_trait::async_trait;
use outlet_core::types::{AdapterType, GeneratedReply, HealthStatus, ReplyRequest};
use outlet_core::{OutletError, PluginAdapter, ReplyProvider};
use outlet_risk::RiskClassifier;

const CRISIS_REPLY: &str = "Thank you for telling me. What you're feeling matters, and you \
    don't have to carry it alone. Please reach out to someone you trust or to your employee \
    assistance program. If you are in immediate danger, contact your local emergency number now.";

const GENERAL_REPLY: &str = "Thanks for sharing that. I'm here to listen. \
    Would you like to say more about what's been going on?";

#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateReplyProvider {
    classifier: RiskClassifier,
}

impl TemplateReplyProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn compose(&self, request: &ReplyRequest) -> GeneratedReply {
        let assessment = self.classifier.assess(&request.text);
        let reply = if assessment.should_escalate() {
            CRISIS_REPLY.to_string()
        } else {
            match request.category.as_deref().map(str::trim) {
                Some(category) if !category.is_empty() => format!(
                    "{GENERAL_REPLY} You filed this under \"{category}\", so we can keep the focus there."
                ),
                _ => GENERAL_REPLY.to_string(),
            }
        };
        GeneratedReply {
            reply,
            risk_level: Some(assessment.level),
        }
    }
}

#[async_trait]
impl PluginAdapter for TemplateReplyProvider {
    fn name(&self) -> &str {
        "template"
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
impl ReplyProvider for TemplateReplyProvider {
    async fn generate(&self, request: ReplyRequest) -> Result<GeneratedReply, OutletError> {
        Ok(self.compose(&request))
    }
}

#[cfg(test)]
mod tests {
    use outlet_core::types::Visibility;

    use super::*;

    fn request(text: &str, category: Option<&str>) -> ReplyRequest {
        ReplyRequest {
            text: text.into(),
            category: category.map(str::to_string),
            visibility: Visibility::Private,
        }
    }

    #[tokio::test]
    async fn calm_message_gets_general_reply() {
        let reply = TemplateReplyProvider::new()
            .generate(request("I'm overwhelmed", None))
            .await
            .unwrap();
        assert_eq!(reply.reply, GENERAL_REPLY);
        assert_eq!(reply.risk_level, Some(0));
    }

    #[tokio::test]
    async fn category_is_acknowledged() {
        let reply = TemplateReplyProvider::new()
            .generate(request("busy week", Some("workload")))
            .await
            .unwrap();
        assert!(reply.reply.contains("\"workload\""));
    }

    #[tokio::test]
    async fn risky_message_gets_crisis_reply() {
        let reply = TemplateReplyProvider::new()
            .generate(request("I want to kill myself", Some("workload")))
            .await
            .unwrap();
        assert_eq!(reply.reply, CRISIS_REPLY);
        assert_eq!(reply.risk_level, Some(2));
    }
}
