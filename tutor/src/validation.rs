//! Boundary validators.
//!
//! Raw payloads arrive exactly as callers send them; `validate()` turns each into the
//! normalized parameters a component works with, or rejects it before any model work.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::model::{AnalysisKind, ChatRole, ContentKind, HistoryTurn, QuizDifficulty};

pub const MAX_CHAT_MESSAGE_CHARS: usize = 10_000;
pub const MAX_ANALYSIS_TEXT_CHARS: usize = 50_000;
pub const HISTORY_WINDOW: usize = 10;
pub const DEFAULT_NUM_QUESTIONS: u32 = 5;
pub const MIN_NUM_QUESTIONS: u32 = 1;
pub const MAX_NUM_QUESTIONS: u32 = 20;
pub const DEFAULT_LANGUAGE: &str = "es";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("{field} is too long ({actual} characters, maximum {max})")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    #[error("Invalid content type '{0}'. Valid types: summary, material, explanation, exercises")]
    InvalidContentKind(String),

    #[error("Invalid analysis type '{0}'. Valid types: key_points, difficulty, topics, questions")]
    InvalidAnalysisKind(String),
}

type Result<T> = std::result::Result<T, ValidationError>;

/// Raw body of a generate request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub topic: Option<String>,
    pub additional_context: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerateParams {
    pub kind: ContentKind,
    pub topic: String,
    pub additional_context: Option<String>,
    pub language: String,
}

impl GenerateRequest {
    pub fn new(kind: ContentKind, topic: impl Into<String>) -> Self {
        Self {
            kind: Some(kind.as_str().to_string()),
            topic: Some(topic.into()),
            ..Self::default()
        }
    }

    pub fn validate(self) -> Result<GenerateParams> {
        let kind = require("type", self.kind)?;
        let topic = require("topic", self.topic)?;
        let kind = kind
            .parse::<ContentKind>()
            .map_err(|_| ValidationError::InvalidContentKind(kind))?;

        Ok(GenerateParams {
            kind,
            topic,
            additional_context: non_empty(self.additional_context),
            language: language_or_default(self.language),
        })
    }
}

/// Raw body of a quiz request. Loosely typed fields are soft-defaulted, never rejected.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizRequest {
    pub topic: Option<String>,
    pub num_questions: Option<Value>,
    pub difficulty: Option<Value>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuizParams {
    pub topic: String,
    pub num_questions: u32,
    pub difficulty: QuizDifficulty,
    pub language: String,
}

impl QuizRequest {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: Some(topic.into()),
            ..Self::default()
        }
    }

    pub fn validate(self) -> Result<QuizParams> {
        Ok(QuizParams {
            topic: require("topic", self.topic)?,
            num_questions: clamp_num_questions(self.num_questions.as_ref()),
            difficulty: soft_difficulty(self.difficulty.as_ref()),
            language: language_or_default(self.language),
        })
    }
}

/// Raw body of a chat request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
    pub message: Option<String>,
    pub context: Option<String>,
    pub history: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatParams {
    pub message: String,
    pub context: Option<String>,
    pub history: Vec<HistoryTurn>,
}

impl ChatRequest {
    pub fn validate(self) -> Result<ChatParams> {
        Ok(ChatParams {
            message: validate_chat_message(self.message)?,
            context: non_empty(self.context),
            history: filter_history(self.history.as_ref()),
        })
    }
}

/// Raw body of an analyze request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub text: Option<String>,
    pub analysis_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzeParams {
    pub text: String,
    pub kind: AnalysisKind,
}

impl AnalyzeRequest {
    pub fn new(text: impl Into<String>, kind: AnalysisKind) -> Self {
        Self {
            text: Some(text.into()),
            analysis_type: Some(kind.as_str().to_string()),
        }
    }

    pub fn validate(self) -> Result<AnalyzeParams> {
        let text = require("text", self.text)?;
        check_length("text", &text, MAX_ANALYSIS_TEXT_CHARS)?;

        let raw_kind = self.analysis_type.unwrap_or_default();
        let kind = raw_kind
            .parse::<AnalysisKind>()
            .map_err(|_| ValidationError::InvalidAnalysisKind(raw_kind))?;

        Ok(AnalyzeParams { text, kind })
    }
}

/// Checks a chat message: present, non-blank and within the length ceiling.
pub fn validate_chat_message(message: Option<String>) -> Result<String> {
    let message = require("message", message)?;
    check_length("message", &message, MAX_CHAT_MESSAGE_CHARS)?;
    Ok(message)
}

/// Effective question count: numbers (or numeric strings) are floored and clamped into
/// `[1, 20]`; absent or non-numeric values use the default of 5.
pub fn clamp_num_questions(raw: Option<&Value>) -> u32 {
    let requested = match raw {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite());

    match requested {
        Some(n) => n
            .floor()
            .clamp(MIN_NUM_QUESTIONS as f64, MAX_NUM_QUESTIONS as f64) as u32,
        None => DEFAULT_NUM_QUESTIONS,
    }
}

/// Effective quiz difficulty: anything outside the closed set becomes `mixed`.
pub fn soft_difficulty(raw: Option<&Value>) -> QuizDifficulty {
    raw.and_then(Value::as_str)
        .map(QuizDifficulty::parse_or_mixed)
        .unwrap_or_default()
}

/// Keeps well-formed `{role: user|model, content: string}` entries, then the last 10.
pub fn filter_history(raw: Option<&Value>) -> Vec<HistoryTurn> {
    let Some(Value::Array(entries)) = raw else {
        return Vec::new();
    };

    let turns: Vec<HistoryTurn> = entries
        .iter()
        .filter_map(|entry| {
            let role = entry.get("role")?.as_str().and_then(ChatRole::parse)?;
            let content = entry.get("content")?.as_str()?.to_string();
            Some(HistoryTurn { role, content })
        })
        .collect();

    window(&turns).to_vec()
}

/// The most recent `HISTORY_WINDOW` entries of a history.
pub fn window<T>(history: &[T]) -> &[T] {
    &history[history.len().saturating_sub(HISTORY_WINDOW)..]
}

fn require(field: &'static str, value: Option<String>) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ValidationError::MissingField(field)),
    }
}

fn check_length(field: &'static str, value: &str, max: usize) -> Result<()> {
    let actual = value.chars().count();
    if actual > max {
        return Err(ValidationError::TooLong { field, max, actual });
    }
    Ok(())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn language_or_default(language: Option<String>) -> String {
    non_empty(language)
        .map(|l| l.trim().to_string())
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string())
}
