use std::time::{Duration, Instant};

use reqwest::{RequestBuilder, header};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use url::form_urlencoded;

use super::error::{ApiError, ApiResult};
use super::types::{
    AskResponse, ConversationDetail, ConversationList, ConversationSummary, NewConversation,
};
use crate::config::Config;
use crate::message::Message;
use crate::search::{PolicySearchRequest, PolicySearchResponse, SearchEnvelope};

/// Standard User-Agent header for ieum API requests.
pub const USER_AGENT: &str = concat!("ieum/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the chat backend.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct BackendClient {
    base_url: String,
    http: reqwest::Client,
    timeout: Option<Duration>,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http: reqwest::Client::new(),
            timeout: None,
        }
    }

    /// Builds a client from the effective base URL and timeout of `config`.
    ///
    /// # Errors
    /// Returns an error if the configured base URL is invalid.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self::new(config.effective_base_url()?).with_timeout(config.request_timeout()))
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends a question and waits for the answer.
    ///
    /// Resolves to a `Cancelled` error as soon as `cancel` fires; the
    /// in-flight HTTP request is dropped.
    pub async fn ask(&self, question: &str, cancel: CancellationToken) -> ApiResult<AskResponse> {
        let request = self
            .http
            .post(self.endpoint("/chat/ask/"))
            .form(&[("question", question)]);

        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(ApiError::cancelled()),
            result = self.execute_json(request, "POST /chat/ask/") => result,
        }
    }

    pub async fn create_conversation(&self) -> ApiResult<NewConversation> {
        let request = self.http.post(self.endpoint("/chat/new/"));
        self.execute_json(request, "POST /chat/new/").await
    }

    pub async fn list_conversations(&self) -> ApiResult<Vec<ConversationSummary>> {
        let request = self.http.get(self.endpoint("/chat/list/"));
        let list: ConversationList = self.execute_json(request, "GET /chat/list/").await?;
        Ok(list.conversations)
    }

    pub async fn load_conversation(&self, id: &str) -> ApiResult<Vec<Message>> {
        let request = self.http.get(self.conversation_endpoint(id, None));
        let detail: ConversationDetail = self.execute_json(request, "GET /chat/{id}/").await?;
        Ok(detail.messages.into_iter().map(Message::from).collect())
    }

    pub async fn rename_conversation(&self, id: &str, title: &str) -> ApiResult<()> {
        let request = self
            .http
            .post(self.conversation_endpoint(id, Some("rename")))
            .form(&[("title", title)]);
        self.execute(request, "POST /chat/{id}/rename/").await?;
        Ok(())
    }

    pub async fn delete_conversation(&self, id: &str) -> ApiResult<()> {
        let request = self
            .http
            .post(self.conversation_endpoint(id, Some("delete")));
        self.execute(request, "POST /chat/{id}/delete/").await?;
        Ok(())
    }

    pub async fn search_policies(
        &self,
        search: &PolicySearchRequest,
    ) -> ApiResult<PolicySearchResponse> {
        let request = self
            .http
            .post(self.endpoint("/chat/search-policy/"))
            .json(search);
        let envelope: SearchEnvelope = self
            .execute_json(request, "POST /chat/search-policy/")
            .await?;
        envelope.into_result()
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn conversation_endpoint(&self, id: &str, action: Option<&str>) -> String {
        let id: String = form_urlencoded::byte_serialize(id.as_bytes()).collect();
        match action {
            Some(action) => format!("{}/chat/{id}/{action}/", self.base_url),
            None => format!("{}/chat/{id}/", self.base_url),
        }
    }

    async fn execute(&self, request: RequestBuilder, label: &str) -> ApiResult<String> {
        let request = match self.timeout {
            Some(timeout) => request.timeout(timeout),
            None => request,
        };
        let started = Instant::now();

        let response = request
            .header(header::USER_AGENT, USER_AGENT)
            .send()
            .await
            .map_err(|e| ApiError::transport(&e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| ApiError::transport(&e))?;

        tracing::debug!(
            request = label,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "backend responded"
        );

        if !status.is_success() {
            return Err(ApiError::http_status(status.as_u16(), &body));
        }
        Ok(body)
    }

    async fn execute_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        label: &str,
    ) -> ApiResult<T> {
        let body = self.execute(request, label).await?;
        serde_json::from_str(&body).map_err(|e| ApiError::parse(&e, &body))
    }
}
