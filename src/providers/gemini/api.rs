use serde::{Deserialize, Serialize};

use crate::ChatRequest;

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl TryFrom<crate::Role> for Role {
    type Error = anyhow::Error;

    fn try_from(value: crate::Role) -> Result<Self, Self::Error> {
        match value {
            crate::Role::User => Ok(Role::User),
            crate::Role::Assistant => Ok(Role::Model),
            crate::Role::System => Err(anyhow::anyhow!(
                "Gemini does not support system messages directly."
            )),
        }
    }
}

impl From<Role> for crate::Role {
    fn from(value: Role) -> Self {
        match value {
            Role::User => crate::Role::User,
            Role::Model => crate::Role::Assistant,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub(crate) struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) thought: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) text: Option<String>,
}

impl Part {
    pub fn new_text(text: impl Into<String>) -> Self {
        Part {
            thought: None,
            text: Some(text.into()),
        }
    }
}

// Gemini representation of messages.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub(crate) struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) role: Option<Role>,

    #[serde(default)]
    pub(crate) parts: Vec<Part>,
}

impl Content {
    /// Concatenated answer text, skipping thought summaries.
    fn answer_text(&self) -> String {
        self.parts
            .iter()
            .filter(|p| p.thought != Some(true))
            .filter_map(|p| p.text.as_deref())
            .collect()
    }
}

impl TryFrom<&crate::ChatMessage> for Content {
    type Error = anyhow::Error;

    fn try_from(msg: &crate::ChatMessage) -> Result<Self, Self::Error> {
        Ok(Content {
            role: Some(msg.role.try_into()?),
            parts: vec![Part::new_text(msg.content.clone())],
        })
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub(crate) struct GenerateContentRequest {
    pub(crate) contents: Vec<Content>,

    #[serde(rename = "systemInstruction")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) system_instruction: Option<Content>,
}

impl TryFrom<&ChatRequest> for GenerateContentRequest {
    type Error = anyhow::Error;

    fn try_from(request: &ChatRequest) -> Result<Self, Self::Error> {
        // System messages go into systemInstruction, one part each, in order.
        let system_parts = request
            .messages
            .iter()
            .filter(|m| m.role == crate::Role::System)
            .map(|m| Part::new_text(m.content.clone()))
            .collect::<Vec<Part>>();
        let system_instruction = if system_parts.is_empty() {
            None
        } else {
            Some(Content {
                role: None,
                parts: system_parts,
            })
        };

        let contents = request
            .messages
            .iter()
            .filter(|m| m.role != crate::Role::System)
            .map(Content::try_from)
            .collect::<anyhow::Result<Vec<Content>>>()?;

        Ok(GenerateContentRequest {
            contents,
            system_instruction,
        })
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub(crate) struct Candidate {
    pub(crate) content: Option<Content>,

    #[serde(rename = "finishReason")]
    pub(crate) finish_reason: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub(crate) candidates: Vec<Candidate>,
}

impl TryFrom<GenerateContentResponse> for crate::ChatMessage {
    type Error = anyhow::Error;

    fn try_from(response: GenerateContentResponse) -> Result<Self, Self::Error> {
        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("Gemini returned no candidates"))?;
        let content = candidate.content.ok_or_else(|| {
            anyhow::anyhow!(
                "Gemini candidate has no content (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )
        })?;
        Ok(crate::ChatMessage::assistant(content.answer_text()))
    }
}
