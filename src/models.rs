use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One citation attached to a bot reply. Both fields are guaranteed
/// non-empty; extraction drops anything that fails that check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub uri: String,
    pub title: String,
}

/// The orchestrator's unified output, regardless of which path produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotReply {
    pub text: String,
    pub sources: Vec<Source>,
}

impl BotReply {
    /// A reply carrying plain text and no citations.
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sources: Vec::new(),
        }
    }
}

/// A rendered message as the UI layer holds it. Immutable once rendered.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub text: String,
    pub is_bot: bool,
    pub sources: Vec<Source>,
}

/// Opaque handle to one rendered message. The background upgrade carries the
/// id of the exact message it is allowed to rewrite, so it never races with
/// messages rendered after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId(Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// --- Wire types for the generateContent endpoint ---

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Part {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// Request tool entry. `google_search: {}` switches on search grounding.
#[derive(Debug, Clone, Serialize)]
pub struct Tool {
    pub google_search: serde_json::Value,
}

impl Tool {
    pub fn google_search() -> Self {
        Self {
            google_search: serde_json::json!({}),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    pub contents: Vec<Content>,
    pub tools: Vec<Tool>,
    #[serde(rename = "systemInstruction")]
    pub system_instruction: Content,
}

impl GenerateRequest {
    pub fn new(query: &str, system_instruction: &str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: query.to_string(),
                }],
            }],
            tools: vec![Tool::google_search()],
            system_instruction: Content {
                parts: vec![Part {
                    text: system_instruction.to_string(),
                }],
            },
        }
    }
}

// Every inbound field is optional or defaulted so a malformed body degrades
// field by field during extraction instead of failing deserialization.

#[derive(Debug, Clone, Deserialize, Default)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(rename = "groundingMetadata", default)]
    pub grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct GroundingMetadata {
    #[serde(rename = "groundingAttributions", default)]
    pub grounding_attributions: Vec<GroundingAttribution>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct GroundingAttribution {
    #[serde(default)]
    pub web: Option<WebSource>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct WebSource {
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub title: String,
}
