//! Quiz synthesis: prompt the model for a JSON quiz, then extract, parse and validate it.
//!
//! Model output is accepted only if it yields a well-formed [`Quiz`]: ids are `1..=N`
//! without repeats and every answer matches its question kind. A multiple choice answer
//! always indexes into at least two options.

use mentoria_core::ModelGatewayRef;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, error, warn};

use crate::error::{TutorError, TutorResult};
use crate::model::{Answer, QuestionDifficulty, QuestionKind, Quiz, QuizDifficulty, QuizQuestion};
use crate::prompts;
use crate::validation::QuizParams;

#[derive(Clone)]
pub struct QuizSynthesizer {
    gateway: ModelGatewayRef,
}

impl QuizSynthesizer {
    pub fn new(gateway: ModelGatewayRef) -> Self {
        Self { gateway }
    }

    pub fn build_prompt(params: &QuizParams) -> String {
        let difficulty = match params.difficulty {
            QuizDifficulty::Mixed => "variada (fácil, media, difícil)",
            other => other.as_str(),
        };
        let contract = prompts::QUIZ_JSON_CONTRACT
            .replace("{count}", &params.num_questions.to_string())
            .replace("{topic}", &params.topic);

        format!(
            "{}\n\nGenera un cuestionario sobre: \"{}\"\n\
             Número de preguntas: {}\nDificultad: {}\nIdioma: {}\n\n{}",
            prompts::QUIZ_INSTRUCTION,
            params.topic,
            params.num_questions,
            difficulty,
            prompts::language_label(&params.language),
            contract
        )
    }

    pub async fn generate_quiz(&self, params: &QuizParams) -> TutorResult<Quiz> {
        let prompt = Self::build_prompt(params);
        debug!(
            num_questions = params.num_questions,
            difficulty = params.difficulty.as_str(),
            "Generating quiz"
        );

        let raw = self.gateway.complete(&prompt).await?;
        let quiz = parse_quiz(&raw, &params.topic).map_err(|e| {
            error!(error = %e, output_len = raw.len(), "Model output rejected as quiz");
            e
        })?;

        if quiz.total_questions != params.num_questions as usize {
            warn!(
                requested = params.num_questions,
                received = quiz.total_questions,
                "Quiz question count differs from request"
            );
        }
        Ok(quiz)
    }
}

/// Span from the first `{` to the last `}` of the text, if there is one.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

/// Turns raw model output into a validated quiz.
///
/// Fails with [`TutorError::QuizFormat`] when no JSON object can be extracted or parsed,
/// and with [`TutorError::QuizSchema`] when the JSON does not describe a valid quiz.
/// `fallback_topic` is used when the model omits the topic.
pub fn parse_quiz(raw: &str, fallback_topic: &str) -> TutorResult<Quiz> {
    let json = extract_json_object(raw)
        .ok_or_else(|| TutorError::QuizFormat("no JSON object found in model output".to_string()))?;

    let value: Value = serde_json::from_str(json)
        .map_err(|e| TutorError::QuizFormat(format!("invalid JSON: {}", e)))?;

    let draft: QuizDraft =
        serde_json::from_value(value).map_err(|e| TutorError::QuizSchema(e.to_string()))?;

    draft.validate(fallback_topic)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuizDraft {
    title: String,
    #[serde(default)]
    topic: Option<String>,
    #[serde(default)]
    total_questions: Option<Value>,
    questions: Vec<QuestionDraft>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionDraft {
    id: Value,
    question: String,
    #[serde(rename = "type")]
    kind: QuestionKind,
    #[serde(default)]
    options: Option<Vec<String>>,
    correct_answer: Value,
    explanation: String,
    difficulty: QuestionDifficulty,
}

fn schema_error(message: String) -> TutorError {
    TutorError::QuizSchema(message)
}

impl QuizDraft {
    fn validate(self, fallback_topic: &str) -> TutorResult<Quiz> {
        if self.title.trim().is_empty() {
            return Err(schema_error("title is empty".to_string()));
        }
        if self.questions.is_empty() {
            return Err(schema_error("quiz has no questions".to_string()));
        }

        let total = self.questions.len();
        if let Some(reported) = self.total_questions.as_ref().and_then(Value::as_u64) {
            if reported as usize != total {
                debug!(reported, actual = total, "Ignoring reported totalQuestions");
            }
        }

        let mut seen = HashSet::with_capacity(total);
        let mut questions = Vec::with_capacity(total);
        for (position, draft) in self.questions.into_iter().enumerate() {
            let question = draft.validate(position + 1)?;
            if question.id as usize > total {
                return Err(schema_error(format!(
                    "question id {} is outside 1..={}",
                    question.id, total
                )));
            }
            if !seen.insert(question.id) {
                return Err(schema_error(format!("duplicate question id {}", question.id)));
            }
            questions.push(question);
        }

        let topic = self
            .topic
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| fallback_topic.to_string());

        Ok(Quiz {
            title: self.title,
            topic,
            total_questions: questions.len(),
            questions,
        })
    }
}

impl QuestionDraft {
    /// `position` is 1-based and only used to point at the offending entry.
    fn validate(self, position: usize) -> TutorResult<QuizQuestion> {
        let id = parse_id(&self.id).ok_or_else(|| {
            schema_error(format!(
                "question #{}: id must be a positive integer",
                position
            ))
        })?;
        let at = |message: &str| schema_error(format!("question {}: {}", id, message));

        if self.question.trim().is_empty() {
            return Err(at("question text is empty"));
        }
        if self.explanation.trim().is_empty() {
            return Err(at("explanation is empty"));
        }

        let answer = match self.kind {
            QuestionKind::MultipleChoice => {
                let options = self
                    .options
                    .filter(|o| o.len() >= 2)
                    .ok_or_else(|| at("multiple_choice needs at least two options"))?;
                let correct = parse_index(&self.correct_answer)
                    .ok_or_else(|| at("correctAnswer must be a non-negative option index"))?;
                if correct >= options.len() {
                    return Err(at(&format!(
                        "correctAnswer {} is out of range for {} options",
                        correct,
                        options.len()
                    )));
                }
                Answer::MultipleChoice { options, correct }
            }
            QuestionKind::TrueFalse => Answer::TrueFalse(
                parse_bool(&self.correct_answer)
                    .ok_or_else(|| at("correctAnswer must be \"true\" or \"false\""))?,
            ),
            QuestionKind::FillBlank => {
                let text = match &self.correct_answer {
                    Value::String(s) => s.trim().to_string(),
                    Value::Number(n) => n.to_string(),
                    _ => String::new(),
                };
                if text.is_empty() {
                    return Err(at("fill_blank needs a non-empty correctAnswer"));
                }
                Answer::FillBlank(text)
            }
        };

        Ok(QuizQuestion {
            id,
            question: self.question,
            answer,
            explanation: self.explanation,
            difficulty: self.difficulty,
        })
    }
}

fn parse_id(value: &Value) -> Option<u32> {
    let id = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }?;
    u32::try_from(id).ok().filter(|&id| id >= 1)
}

fn parse_index(value: &Value) -> Option<usize> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|i| usize::try_from(i).ok()),
        Value::String(s) => s.trim().parse::<usize>().ok(),
        _ => None,
    }
}

fn parse_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "verdadero" => Some(true),
            "false" | "falso" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
