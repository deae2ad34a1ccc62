//! Outbound submission of draft and final text.

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

use crate::{domain::session::ChatId, protocol::submission::SubmitPayload};

use super::chat_endpoint;

const SUBMIT_REJECTED: &str = "BACKEND_SUBMIT_REJECTED";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("backend url cannot address chat {chat_id}")]
    InvalidEndpoint { chat_id: String },
    #[error("submission transport failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("submission rejected with status {status}")]
    Rejected { status: u16 },
}

/// Performs exactly one network write per call. No retry, no deduplication.
#[async_trait]
pub trait BackendGateway: Send + Sync {
    async fn submit(&self, chat_id: &ChatId, text: &str, is_final: bool)
        -> Result<(), GatewayError>;
}

#[derive(Debug, Clone)]
pub struct HttpGateway {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpGateway {
    pub fn new(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }
}

#[async_trait]
impl BackendGateway for HttpGateway {
    async fn submit(
        &self,
        chat_id: &ChatId,
        text: &str,
        is_final: bool,
    ) -> Result<(), GatewayError> {
        let url = chat_endpoint(&self.base_url, chat_id, "").ok_or_else(|| {
            GatewayError::InvalidEndpoint {
                chat_id: chat_id.to_string(),
            }
        })?;

        let response = self
            .http
            .post(url)
            .json(&SubmitPayload { text, is_final })
            .send()
            .await
            .map_err(GatewayError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                code = SUBMIT_REJECTED,
                status = status.as_u16(),
                is_final,
                "backend rejected submission"
            );
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
            });
        }

        Ok(())
    }
}
