//! Conversation session
//!
//! One `SalesSession` per operator session. It owns the chat turns, the
//! persona instructions, the current catalog context and the model handle.
//! Turns are append-only; the persona and catalog context are prepended to
//! every request instead of being stored as turns, so a re-uploaded catalog
//! applies from the next turn on.

use crate::api::{ChatMessage, ChatRequest, Role};
use crate::catalog::Catalog;
use crate::catalog::context::{CatalogContext, build_catalog_context};
use crate::ChatModel;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Errors that halt a user submission.
#[derive(Debug)]
pub enum SessionError {
    /// No API key has been submitted, so there is no model to call
    MissingCredential,

    /// The submitted message was blank
    EmptyMessage,

    /// The model call failed; the user turn stays in history
    Model(anyhow::Error),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::MissingCredential => {
                write!(f, "No API key submitted; enter one before chatting")
            }
            SessionError::EmptyMessage => write!(f, "Message is empty"),
            SessionError::Model(err) => write!(f, "Model call failed: {:#}", err),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Model(err) => Some(&**err),
            _ => None,
        }
    }
}

pub struct SalesSession {
    persona: String,
    catalog: Option<CatalogContext>,
    turns: Vec<ChatMessage>,
    model: Option<Arc<dyn ChatModel + Send + Sync>>,
}

impl SalesSession {
    pub fn new(persona: impl Into<String>) -> Self {
        SalesSession {
            persona: persona.into(),
            catalog: None,
            turns: Vec::new(),
            model: None,
        }
    }

    /// Attach (or replace) the model used for subsequent turns.
    pub fn attach_model(&mut self, model: Arc<dyn ChatModel + Send + Sync>) {
        info!(model = model.name(), "Model attached");
        self.model = Some(model);
    }

    pub fn model_name(&self) -> Option<&str> {
        self.model.as_ref().map(|m| m.name())
    }

    /// Build and install the context for a freshly uploaded catalog.
    pub fn load_catalog(&mut self, catalog: &Catalog, limit: usize) -> &CatalogContext {
        self.catalog.insert(build_catalog_context(catalog, limit))
    }

    pub fn catalog_context(&self) -> Option<&CatalogContext> {
        self.catalog.as_ref()
    }

    /// All chat turns, oldest first.
    pub fn turns(&self) -> &[ChatMessage] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Messages for the next model call: persona, catalog context if any,
    /// then every turn in order.
    pub fn outgoing_messages(&self) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(self.turns.len() + 2);
        messages.push(ChatMessage::system(self.persona.clone()));
        if let Some(context) = &self.catalog {
            messages.push(ChatMessage::system(context.as_str()));
        }
        messages.extend(self.turns.iter().cloned());
        messages
    }

    /// Submit a user message and wait for the assistant reply.
    pub async fn send(&mut self, text: &str) -> Result<&ChatMessage, SessionError> {
        self.send_with(text, |_| {}).await
    }

    /// Like [`send`](Self::send), calling `render` on the user turn right
    /// after it is appended and on the assistant turn once it arrives.
    #[instrument(level = "debug", skip_all)]
    pub async fn send_with<F>(&mut self, text: &str, mut render: F) -> Result<&ChatMessage, SessionError>
    where
        F: FnMut(&ChatMessage),
    {
        if text.trim().is_empty() {
            return Err(SessionError::EmptyMessage);
        }
        let model = self.model.clone().ok_or(SessionError::MissingCredential)?;

        self.turns.push(ChatMessage::user(text));
        render(&self.turns[self.turns.len() - 1]);

        let request = ChatRequest::new(&self.outgoing_messages());
        debug!(messages = request.messages().len(), "Calling model");
        let reply = model.chat(&request).await.map_err(SessionError::Model)?;

        self.turns.push(ChatMessage::new(Role::Assistant, reply.content));
        debug!(turns = self.turns.len(), "Assistant turn appended");
        let last = &self.turns[self.turns.len() - 1];
        render(last);
        Ok(last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Cell;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingModel {
        requests: Mutex<Vec<Vec<ChatMessage>>>,
    }

    #[async_trait]
    impl ChatModel for RecordingModel {
        fn name(&self) -> &str {
            "recording"
        }

        async fn chat(&self, request: &ChatRequest) -> anyhow::Result<ChatMessage> {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.messages().to_vec());
            Ok(ChatMessage::assistant(format!("balasan {}", requests.len())))
        }
    }

    struct FailingModel;

    #[async_trait]
    impl ChatModel for FailingModel {
        fn name(&self) -> &str {
            "failing"
        }

        async fn chat(&self, _request: &ChatRequest) -> anyhow::Result<ChatMessage> {
            Err(anyhow::anyhow!("quota exceeded"))
        }
    }

    struct WrongRoleModel;

    #[async_trait]
    impl ChatModel for WrongRoleModel {
        fn name(&self) -> &str {
            "wrong-role"
        }

        async fn chat(&self, _request: &ChatRequest) -> anyhow::Result<ChatMessage> {
            Ok(ChatMessage::user("halo"))
        }
    }

    #[tokio::test]
    async fn test_turns_alternate_after_successful_replies() {
        let mut session = SalesSession::new("persona");
        session.attach_model(Arc::new(RecordingModel::default()));

        for i in 0..3 {
            let reply = session.send(&format!("pesan {}", i)).await.unwrap();
            assert_eq!(reply.content, format!("balasan {}", i + 1));
        }

        assert_eq!(session.len(), 6);
        for (i, turn) in session.turns().iter().enumerate() {
            let expected = if i % 2 == 0 { Role::User } else { Role::Assistant };
            assert_eq!(turn.role, expected);
        }
    }

    #[tokio::test]
    async fn test_request_layout() {
        let model = Arc::new(RecordingModel::default());
        let mut session = SalesSession::new("persona");
        session.attach_model(model.clone());
        let catalog = Catalog::new(["Nama", "Harga"], vec![vec![Cell::from("Bakso"), Cell::from(30000i64)]]);
        session.load_catalog(&catalog, 60);

        session.send("halo").await.unwrap();
        session.send("ada bakso?").await.unwrap();

        let requests = model.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        let second = &requests[1];
        assert_eq!(second.len(), 5);
        assert_eq!(second[0], ChatMessage::system("persona"));
        assert_eq!(second[1].role, Role::System);
        assert!(second[1].content.contains("- Nama: Bakso | Harga: Rp 30.000"));
        assert_eq!(second[2], ChatMessage::user("halo"));
        assert_eq!(second[3], ChatMessage::assistant("balasan 1"));
        assert_eq!(second[4], ChatMessage::user("ada bakso?"));
    }

    #[tokio::test]
    async fn test_without_catalog_only_persona_is_prepended() {
        let model = Arc::new(RecordingModel::default());
        let mut session = SalesSession::new("persona");
        session.attach_model(model.clone());

        session.send("halo").await.unwrap();

        let requests = model.requests.lock().unwrap();
        assert_eq!(
            requests[0],
            vec![ChatMessage::system("persona"), ChatMessage::user("halo")]
        );
    }

    #[tokio::test]
    async fn test_reupload_applies_to_next_turn() {
        let model = Arc::new(RecordingModel::default());
        let mut session = SalesSession::new("persona");
        session.attach_model(model.clone());

        let first = Catalog::new(["Nama", "Harga"], vec![vec![Cell::from("Bakso"), Cell::from(1i64)]]);
        session.load_catalog(&first, 60);
        session.send("a").await.unwrap();

        let second = Catalog::new(["Nama", "Harga"], vec![vec![Cell::from("Dimsum"), Cell::from(2i64)]]);
        session.load_catalog(&second, 60);
        session.send("b").await.unwrap();

        let requests = model.requests.lock().unwrap();
        assert!(requests[0][1].content.contains("Bakso"));
        assert!(requests[1][1].content.contains("Dimsum"));
        assert!(!requests[1][1].content.contains("Bakso"));
        // history was not replayed or rewritten
        assert_eq!(session.len(), 4);
    }

    #[tokio::test]
    async fn test_missing_credential_halts_without_appending() {
        let mut session = SalesSession::new("persona");
        let err = session.send("halo").await.unwrap_err();
        assert!(matches!(err, SessionError::MissingCredential));
        assert!(session.is_empty());
    }

    #[tokio::test]
    async fn test_model_failure_keeps_user_turn() {
        let mut session = SalesSession::new("persona");
        session.attach_model(Arc::new(FailingModel));

        let err = session.send("halo").await.unwrap_err();
        assert!(matches!(err, SessionError::Model(_)));
        assert!(err.to_string().contains("quota exceeded"));
        assert_eq!(session.turns(), [ChatMessage::user("halo")]);
    }

    #[tokio::test]
    async fn test_blank_message_is_rejected() {
        let mut session = SalesSession::new("persona");
        session.attach_model(Arc::new(RecordingModel::default()));
        assert!(matches!(session.send("  ").await, Err(SessionError::EmptyMessage)));
        assert!(session.is_empty());
    }

    #[tokio::test]
    async fn test_user_text_is_stored_as_submitted() {
        let model = Arc::new(RecordingModel::default());
        let mut session = SalesSession::new("persona");
        session.attach_model(model.clone());

        session.send("  ada nugget?  ").await.unwrap();
        assert_eq!(session.turns()[0], ChatMessage::user("  ada nugget?  "));
        let requests = model.requests.lock().unwrap();
        assert_eq!(requests[0][1], ChatMessage::user("  ada nugget?  "));
    }

    #[test]
    fn test_model_name_reflects_attached_model() {
        let mut session = SalesSession::new("persona");
        assert_eq!(session.model_name(), None);
        session.attach_model(Arc::new(FailingModel));
        assert_eq!(session.model_name(), Some("failing"));
    }

    #[tokio::test]
    async fn test_reply_is_stored_as_assistant() {
        let mut session = SalesSession::new("persona");
        session.attach_model(Arc::new(WrongRoleModel));
        let reply = session.send("halo").await.unwrap();
        assert_eq!(reply.role, Role::Assistant);
    }

    #[tokio::test]
    async fn test_render_sees_user_then_assistant() {
        let mut session = SalesSession::new("persona");
        session.attach_model(Arc::new(RecordingModel::default()));

        let mut rendered = Vec::new();
        session
            .send_with("halo", |turn| rendered.push(turn.role))
            .await
            .unwrap();
        assert_eq!(rendered, vec![Role::User, Role::Assistant]);
    }

    #[tokio::test]
    async fn test_render_on_failure_sees_only_user() {
        let mut session = SalesSession::new("persona");
        session.attach_model(Arc::new(FailingModel));

        let mut rendered = Vec::new();
        let _ = session.send_with("halo", |turn| rendered.push(turn.role)).await;
        assert_eq!(rendered, vec![Role::User]);
    }
}
