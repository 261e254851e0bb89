use async_trait::async_trait;
use std::sync::Arc;

pub mod api;
pub mod catalog;
mod client;
pub mod config;
pub mod persona;
pub mod providers;
pub mod session;
mod traffic_log;

pub use api::*;
pub use catalog::{Catalog, Cell};
pub use catalog::context::{CatalogContext, DEFAULT_ROW_LIMIT, build_catalog_context};
pub use session::{SalesSession, SessionError};

/// A stateless request/response language model.
///
/// Given the full ordered message list it returns exactly one assistant
/// message. Timeouts and transport concerns belong to the implementation.
#[async_trait]
pub trait ChatModel {
    fn name(&self) -> &str;

    async fn chat(&self, request: &ChatRequest) -> anyhow::Result<ChatMessage>;
}

pub trait ModelProvider {
    /// Create a chat model by name, returned as Arc for sharing with the session
    fn create_chat_model(&self, model_name: &str) -> Option<Arc<dyn ChatModel + Send + Sync>>;
}
