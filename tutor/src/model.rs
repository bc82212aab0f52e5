//! Data model shared by every tutor operation.

use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Prose content the generator can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Summary,
    Material,
    Explanation,
    Exercises,
}

impl ContentKind {
    pub const ALL: [ContentKind; 4] = [
        ContentKind::Summary,
        ContentKind::Material,
        ContentKind::Explanation,
        ContentKind::Exercises,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Summary => "summary",
            ContentKind::Material => "material",
            ContentKind::Explanation => "explanation",
            ContentKind::Exercises => "exercises",
        }
    }
}

impl FromStr for ContentKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or(())
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directive applied to a passage by the text analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    KeyPoints,
    Difficulty,
    Topics,
    Questions,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 4] = [
        AnalysisKind::KeyPoints,
        AnalysisKind::Difficulty,
        AnalysisKind::Topics,
        AnalysisKind::Questions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::KeyPoints => "key_points",
            AnalysisKind::Difficulty => "difficulty",
            AnalysisKind::Topics => "topics",
            AnalysisKind::Questions => "questions",
        }
    }
}

impl FromStr for AnalysisKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnalysisKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or(())
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requested difficulty for a whole quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QuizDifficulty {
    Easy,
    Medium,
    Hard,
    #[default]
    Mixed,
}

impl QuizDifficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuizDifficulty::Easy => "easy",
            QuizDifficulty::Medium => "medium",
            QuizDifficulty::Hard => "hard",
            QuizDifficulty::Mixed => "mixed",
        }
    }

    /// Parses a difficulty, falling back to `Mixed` for anything outside the closed set.
    pub fn parse_or_mixed(s: &str) -> Self {
        match s {
            "easy" => QuizDifficulty::Easy,
            "medium" => QuizDifficulty::Medium,
            "hard" => QuizDifficulty::Hard,
            _ => QuizDifficulty::Mixed,
        }
    }
}

/// Difficulty of an individual question. `mixed` only exists at quiz level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionDifficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice,
    TrueFalse,
    FillBlank,
}

/// Kind-specific part of a question. Holding the options and the answer together
/// keeps an out-of-range multiple choice answer unrepresentable once validated.
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    MultipleChoice { options: Vec<String>, correct: usize },
    TrueFalse(bool),
    FillBlank(String),
}

impl Answer {
    pub fn kind(&self) -> QuestionKind {
        match self {
            Answer::MultipleChoice { .. } => QuestionKind::MultipleChoice,
            Answer::TrueFalse(_) => QuestionKind::TrueFalse,
            Answer::FillBlank(_) => QuestionKind::FillBlank,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuizQuestion {
    pub id: u32,
    pub question: String,
    pub answer: Answer,
    pub explanation: String,
    pub difficulty: QuestionDifficulty,
}

impl QuizQuestion {
    pub fn kind(&self) -> QuestionKind {
        self.answer.kind()
    }

    pub fn options(&self) -> Option<&[String]> {
        match &self.answer {
            Answer::MultipleChoice { options, .. } => Some(options),
            _ => None,
        }
    }
}

// Wire shape: {id, question, type, options?, correctAnswer, explanation, difficulty}
// with correctAnswer an index, the literal "true"/"false", or free text.
impl Serialize for QuizQuestion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("QuizQuestion", 7)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("question", &self.question)?;
        state.serialize_field("type", &self.kind())?;
        match &self.answer {
            Answer::MultipleChoice { options, correct } => {
                state.serialize_field("options", options)?;
                state.serialize_field("correctAnswer", correct)?;
            }
            Answer::TrueFalse(value) => {
                state.skip_field("options")?;
                state.serialize_field("correctAnswer", if *value { "true" } else { "false" })?;
            }
            Answer::FillBlank(text) => {
                state.skip_field("options")?;
                state.serialize_field("correctAnswer", text)?;
            }
        }
        state.serialize_field("explanation", &self.explanation)?;
        state.serialize_field("difficulty", &self.difficulty)?;
        state.end()
    }
}

/// A validated quiz. `total_questions` always equals `questions.len()`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub title: String,
    pub topic: String,
    pub total_questions: usize,
    pub questions: Vec<QuizQuestion>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

impl ChatRole {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(ChatRole::User),
            "model" => Some(ChatRole::Model),
            _ => None,
        }
    }
}

/// One entry of a chat session's display log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn to_turn(&self) -> HistoryTurn {
        HistoryTurn {
            role: self.role,
            content: self.content.clone(),
        }
    }
}

/// A chat turn as forwarded to the model: role and content, no timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryTurn {
    pub role: ChatRole,
    pub content: String,
}

/// Generated prose together with what it was generated for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedContent {
    #[serde(rename = "type")]
    pub kind: ContentKind,
    pub topic: String,
    pub content: String,
}

/// Model answer to a chat message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatReply {
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub analysis: String,
    pub analysis_type: AnalysisKind,
    pub text_length: usize,
}
