use std::sync::Arc;

use review_flow_shared::CommentRecord;
use serde_json::Value;
use thiserror::Error;

/// The submission could not be handed to the automation workflow. Nothing
/// local was mutated, so there is nothing to roll back.
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("comment must not be empty")]
    EmptyComment,
    #[error("comment webhook is not configured")]
    NotConfigured,
    #[error("webhook request failed: {0}")]
    Transport(String),
    #[error("webhook rejected the submission with status {0}")]
    Rejected(u16),
}

/// Outcome of forwarding a generation request; status is passed through to
/// the caller untouched.
#[derive(Debug)]
pub struct GenerationAck {
    pub status: u16,
    pub body: Value,
}

/// Fire-and-forget gateway to the external automation webhooks.
///
/// A successful submit means the webhook acknowledged receipt, nothing
/// more: the workflow appends the row to the tabular store on its own
/// schedule, with no completion signal back to us. The client-side
/// reconciliation loop papers over that gap.
#[derive(Clone)]
pub struct CommentGateway {
    inner: Arc<GatewayInner>,
}

struct GatewayInner {
    client: reqwest::Client,
    comments_webhook_url: Option<String>,
    generate_webhook_url: Option<String>,
}

impl CommentGateway {
    pub fn new(
        client: reqwest::Client,
        comments_webhook_url: Option<String>,
        generate_webhook_url: Option<String>,
    ) -> Self {
        Self {
            inner: Arc::new(GatewayInner {
                client,
                comments_webhook_url,
                generate_webhook_url,
            }),
        }
    }

    /// Forwards one comment to the workflow. Only `comment` is validated
    /// (non-empty after trimming); every other field passes through
    /// uninspected. The wire shape is a single-element array. No retry.
    pub async fn submit(&self, record: &CommentRecord) -> Result<(), SubmissionError> {
        if record.comment.trim().is_empty() {
            return Err(SubmissionError::EmptyComment);
        }
        let url = self
            .inner
            .comments_webhook_url
            .as_deref()
            .ok_or(SubmissionError::NotConfigured)?;

        let response = self
            .inner
            .client
            .post(url)
            .json(&[record])
            .send()
            .await
            .map_err(|err| SubmissionError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SubmissionError::Rejected(status.as_u16()));
        }

        // Response body is best-effort parsed and otherwise ignored; the
        // status alone is the acknowledgement.
        let _ = response.json::<Value>().await;
        tracing::info!(
            comment_id = %record.id,
            product_id = %record.product_id,
            section = %record.section,
            "comment forwarded to workflow"
        );
        Ok(())
    }

    /// Proxies a generation trigger to its workflow, passing the upstream
    /// status straight through.
    pub async fn trigger_generation(&self, payload: &Value) -> Result<GenerationAck, SubmissionError> {
        let url = self
            .inner
            .generate_webhook_url
            .as_deref()
            .ok_or(SubmissionError::NotConfigured)?;

        let response = self
            .inner
            .client
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(|err| SubmissionError::Transport(err.to_string()))?;

        let status = response.status().as_u16();
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        Ok(GenerationAck {
            status,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{
        matchers::{body_partial_json, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;

    fn record() -> CommentRecord {
        CommentRecord {
            id: "c-1".to_string(),
            product_id: "P1".to_string(),
            section: "name".to_string(),
            current_text: "Old".to_string(),
            comment: "please fix the name".to_string(),
            page_url: "http://app/products/P1".to_string(),
            time_stamp: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    fn gateway(server: &MockServer) -> CommentGateway {
        CommentGateway::new(
            reqwest::Client::new(),
            Some(format!("{}/hook/comments", server.uri())),
            Some(format!("{}/hook/generate", server.uri())),
        )
    }

    #[tokio::test]
    async fn submit_posts_a_single_element_array() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook/comments"))
            .and(body_partial_json(json!([{ "id": "c-1", "section": "name" }])))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "received": true })))
            .expect(1)
            .mount(&server)
            .await;

        gateway(&server).submit(&record()).await.expect("submit");
    }

    #[tokio::test]
    async fn empty_comment_is_rejected_without_a_network_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut bad = record();
        bad.comment = "   ".to_string();
        let err = gateway(&server).submit(&bad).await.expect_err("must fail");
        assert!(matches!(err, SubmissionError::EmptyComment));
    }

    #[tokio::test]
    async fn non_success_status_surfaces_as_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook/comments"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = gateway(&server).submit(&record()).await.expect_err("must fail");
        assert!(matches!(err, SubmissionError::Rejected(503)));
    }

    #[tokio::test]
    async fn missing_webhook_url_is_a_configuration_error() {
        let gateway = CommentGateway::new(reqwest::Client::new(), None, None);
        let err = gateway.submit(&record()).await.expect_err("must fail");
        assert!(matches!(err, SubmissionError::NotConfigured));
    }

    #[tokio::test]
    async fn generation_status_is_passed_through() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook/generate"))
            .respond_with(ResponseTemplate::new(202).set_body_json(json!({ "queued": true })))
            .mount(&server)
            .await;

        let ack = gateway(&server)
            .trigger_generation(&json!({ "source": "dashboard" }))
            .await
            .expect("trigger");
        assert_eq!(ack.status, 202);
        assert_eq!(ack.body, json!({ "queued": true }));
    }
}
