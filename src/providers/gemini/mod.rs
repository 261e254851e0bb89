use crate::client::Client;
use crate::config::ApiKey;
use crate::traffic_log;
use crate::{ChatMessage, ChatModel, ChatRequest, ModelProvider};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::header;
use std::sync::Arc;

mod api;
use api::{GenerateContentRequest, GenerateContentResponse};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiProvider {
    client: Client,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(base_url: &str, api_key: &ApiKey) -> anyhow::Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        let mut key = header::HeaderValue::from_str(api_key.expose())
            .context("API key contains characters not allowed in a header")?;
        key.set_sensitive(true);
        headers.insert("x-goog-api-key", key);
        Ok(GeminiProvider {
            client: Client::with_headers(headers)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl ModelProvider for GeminiProvider {
    fn create_chat_model(&self, model_name: &str) -> Option<Arc<dyn ChatModel + Send + Sync>> {
        let model_name = model_name.trim();
        if model_name.is_empty() {
            return None;
        }
        let model_name = if model_name.starts_with("models/") {
            model_name.to_string()
        } else {
            format!("models/{}", model_name)
        };
        Some(Arc::new(GeminiChatModel::new(
            self.client.clone(),
            self.base_url.clone(),
            model_name,
        )))
    }
}

pub struct GeminiChatModel {
    client: Client,
    base_url: String,
    model_name: String,
}

impl GeminiChatModel {
    pub fn new(client: Client, base_url: String, model_name: String) -> Self {
        GeminiChatModel {
            client,
            base_url,
            model_name,
        }
    }
}

#[async_trait]
impl ChatModel for GeminiChatModel {
    fn name(&self) -> &str {
        &self.model_name
    }

    async fn chat(&self, request: &ChatRequest) -> anyhow::Result<ChatMessage> {
        let url = format!("{}/{}:generateContent", self.base_url, self.model_name);

        let api_request = GenerateContentRequest::try_from(request)?;
        traffic_log::log_request(&self.model_name, &api_request);

        match self
            .client
            .post::<_, _, GenerateContentResponse>(url, &api_request)
            .await
        {
            Ok(response) => {
                traffic_log::log_response(&self.model_name, &response);
                ChatMessage::try_from(response)
            }
            Err(e) => {
                traffic_log::log_error(&self.model_name, &e.to_string());
                Err(e)
            }
        }
    }
}
