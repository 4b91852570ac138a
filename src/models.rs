//! Wire and domain types for planning items and suggestions.

use serde::{Deserialize, Serialize};

pub const DEFAULT_QUESTION: &str = "What should my top 3 actions be today?";
pub const DEFAULT_TIME_WINDOW: &str = "today";
pub const DEFAULT_MAX_ITEMS: i64 = 3;
pub const MAX_ITEMS_LIMIT: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Outcome,
    Action,
    Note,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Outcome => "outcome",
            ItemType::Action => "action",
            ItemType::Note => "note",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Energy {
    Energizing,
    Draining,
    Neutral,
}

impl Energy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Energy::Energizing => "energizing",
            Energy::Draining => "draining",
            Energy::Neutral => "neutral",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Size {
    S,
    M,
    L,
}

impl Size {
    pub fn as_str(&self) -> &'static str {
        match self {
            Size::S => "S",
            Size::M => "M",
            Size::L => "L",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Open,
    Done,
    Archived,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Open => "open",
            Status::Done => "done",
            Status::Archived => "archived",
        }
    }
}

/// A user's planning unit as stored by the external document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub energy: Option<Energy>,
    #[serde(default)]
    pub size: Option<Size>,
    #[serde(default)]
    pub status: Status,
    /// ISO 8601 timestamp, passed through uninterpreted.
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertItemRequest {
    pub user_id: String,
    pub item: Item,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteItemRequest {
    pub user_id: String,
    pub item_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionRequest {
    pub user_id: String,
    #[serde(default)]
    pub question: Option<String>,
    /// Advisory only; not part of the prompt.
    #[serde(default)]
    pub time_window: Option<String>,
    /// Signed so that negative values reach range validation instead of a decode rejection.
    #[serde(default = "default_max_items")]
    pub max_items: i64,
}

fn default_max_items() -> i64 {
    DEFAULT_MAX_ITEMS
}

impl SuggestionRequest {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            question: None,
            time_window: Some(DEFAULT_TIME_WINDOW.to_string()),
            max_items: DEFAULT_MAX_ITEMS,
        }
    }

    /// The question to embed and ask, falling back to the canned prompt when blank.
    pub fn effective_question(&self) -> &str {
        match self.question.as_deref().map(str::trim) {
            Some(q) if !q.is_empty() => q,
            _ => DEFAULT_QUESTION,
        }
    }

    /// `max_items` clamped into `0..=MAX_ITEMS_LIMIT`.
    pub fn limit(&self) -> usize {
        self.max_items.clamp(0, MAX_ITEMS_LIMIT) as usize
    }
}

/// One ranked suggestion produced by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub item_id: String,
    pub reason: String,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl Default for SuccessResponse {
    fn default() -> Self {
        Self { success: true }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Top3Response {
    pub success: bool,
    pub top3: Vec<Recommendation>,
}

impl Top3Response {
    pub fn new(top3: Vec<Recommendation>) -> Self {
        Self {
            success: true,
            top3,
        }
    }
}
